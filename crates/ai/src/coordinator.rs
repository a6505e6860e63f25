use std::time::{Duration, Instant};

use engine::{Move, RulesEngine};
use tracing::{debug, info};

use crate::error::{SearchError, SearchResult};
use crate::types::{DifficultyTier, SearchLimits, DEFAULT_MOVE_TIME};

/// Something that can pick a move for a position given as FEN.
pub trait MoveSearcher {
    fn set_skill_level(&mut self, level: u8) -> SearchResult<()>;

    fn new_game(&mut self) -> SearchResult<()>;

    /// Best move in coordinate notation, or `None` if the engine has none.
    fn best_move(&mut self, fen: &str, limits: SearchLimits) -> SearchResult<Option<String>>;
}

/// Drives one search per computer turn at the strength of the chosen tier.
pub struct DifficultyCoordinator<S: MoveSearcher> {
    searcher: S,
    tier: Option<DifficultyTier>,
    tier_locked: bool,
    configured_skill: Option<u8>,
    move_time: Duration,
}

impl<S: MoveSearcher> DifficultyCoordinator<S> {
    pub fn new(searcher: S) -> Self {
        Self::with_move_time(searcher, DEFAULT_MOVE_TIME)
    }

    pub fn with_move_time(searcher: S, move_time: Duration) -> Self {
        Self {
            searcher,
            tier: None,
            tier_locked: false,
            configured_skill: None,
            move_time,
        }
    }

    pub fn tier(&self) -> Option<DifficultyTier> {
        self.tier
    }

    pub fn searcher(&self) -> &S {
        &self.searcher
    }

    /// Chooses the strength for the coming match. Fails once the match has
    /// asked for its first move, until [`release_tier`](Self::release_tier).
    pub fn select_tier(&mut self, tier: DifficultyTier) -> SearchResult<()> {
        if self.tier_locked && self.tier != Some(tier) {
            return Err(SearchError::TierLocked);
        }
        info!(%tier, "difficulty selected");
        self.tier = Some(tier);
        Ok(())
    }

    /// Ends the match's hold on the tier so the next match may pick again.
    pub fn release_tier(&mut self) {
        self.tier_locked = false;
    }

    pub fn new_game(&mut self) -> SearchResult<()> {
        self.release_tier();
        self.searcher.new_game()
    }

    /// Asks the engine for its move in `position` and checks it is legal.
    pub fn request_move<R: RulesEngine>(
        &mut self,
        rules: &R,
        position: &R::Position,
    ) -> SearchResult<Move> {
        let tier = self.tier.ok_or(SearchError::NoTier)?;
        if rules.is_game_over(position) {
            return Err(SearchError::GameOver);
        }
        self.tier_locked = true;

        let skill = tier.skill_level();
        if self.configured_skill != Some(skill) {
            self.searcher.set_skill_level(skill)?;
            self.configured_skill = Some(skill);
        }

        let fen = rules.fen(position);
        let started = Instant::now();
        let reply = self
            .searcher
            .best_move(&fen, tier.limits(self.move_time))?
            .ok_or(SearchError::NoMove)?;

        let illegal = || SearchError::IllegalMove {
            mv: reply.clone(),
            fen: fen.clone(),
        };
        let mv = Move::from_uci(&reply).map_err(|_| illegal())?;
        if !rules.is_legal(position, &mv) {
            return Err(illegal());
        }

        debug!(%mv, ?tier, elapsed_ms = started.elapsed().as_millis() as u64, "engine move");
        Ok(mv)
    }
}
