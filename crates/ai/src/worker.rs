//! Runs the coordinator on its own thread so the frame loop keeps drawing
//! while the engine thinks. At most one move request is in flight.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use engine::{Move, RulesEngine};
use tracing::{debug, error};

use crate::coordinator::{DifficultyCoordinator, MoveSearcher};
use crate::error::{SearchError, SearchResult};
use crate::types::DifficultyTier;

enum Command<P> {
    SelectTier(DifficultyTier),
    NewGame,
    RequestMove(P),
}

#[derive(Debug)]
pub enum WorkerEvent {
    MoveReady { mv: Move, elapsed: Duration },
    Failed(SearchError),
}

/// An event plus whether it settles the outstanding move request.
struct Reply {
    event: WorkerEvent,
    answers_request: bool,
}

pub struct SearchWorker<R: RulesEngine> {
    commands: Option<Sender<Command<R::Position>>>,
    events: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    outstanding: bool,
}

impl<R> SearchWorker<R>
where
    R: RulesEngine + Send + 'static,
    R::Position: Send + 'static,
{
    pub fn spawn<S>(rules: R, coordinator: DifficultyCoordinator<S>) -> SearchResult<Self>
    where
        S: MoveSearcher + Send + 'static,
    {
        let (command_tx, command_rx) = crossbeam_channel::unbounded::<Command<R::Position>>();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name("search-worker".to_string())
            .spawn(move || run(rules, coordinator, command_rx, event_tx))?;

        Ok(Self {
            commands: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
            outstanding: false,
        })
    }

    pub fn select_tier(&self, tier: DifficultyTier) -> SearchResult<()> {
        self.send(Command::SelectTier(tier))
    }

    /// Tells the engine a new game starts and unlocks the tier.
    pub fn new_game(&self) -> SearchResult<()> {
        self.send(Command::NewGame)
    }

    pub fn request_move(&mut self, position: R::Position) -> SearchResult<()> {
        if self.outstanding {
            return Err(SearchError::RequestOutstanding);
        }
        self.send(Command::RequestMove(position))?;
        self.outstanding = true;
        Ok(())
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Non-blocking check for a finished request or a failure.
    pub fn poll(&mut self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(self.settle(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.stopped(),
        }
    }

    /// Blocks up to `timeout` for the next event.
    pub fn wait(&mut self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(self.settle(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => self.stopped(),
        }
    }

    fn settle(&mut self, reply: Reply) -> WorkerEvent {
        if reply.answers_request {
            self.outstanding = false;
        }
        reply.event
    }

    fn stopped(&mut self) -> Option<WorkerEvent> {
        if std::mem::take(&mut self.outstanding) {
            Some(WorkerEvent::Failed(SearchError::WorkerStopped))
        } else {
            None
        }
    }

    fn send(&self, command: Command<R::Position>) -> SearchResult<()> {
        self.commands
            .as_ref()
            .ok_or(SearchError::WorkerStopped)?
            .send(command)
            .map_err(|_| SearchError::WorkerStopped)
    }
}

impl<R: RulesEngine> Drop for SearchWorker<R> {
    fn drop(&mut self) {
        // closing the command channel ends the thread, which drops the engine
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("search worker panicked");
            }
        }
    }
}

fn run<R, S>(
    rules: R,
    mut coordinator: DifficultyCoordinator<S>,
    commands: Receiver<Command<R::Position>>,
    events: Sender<Reply>,
) where
    R: RulesEngine,
    S: MoveSearcher,
{
    for command in commands {
        let (result, answers_request) = match command {
            Command::SelectTier(tier) => (coordinator.select_tier(tier).map(|()| None), false),
            Command::NewGame => (coordinator.new_game().map(|()| None), false),
            Command::RequestMove(position) => {
                let started = Instant::now();
                let result = coordinator
                    .request_move(&rules, &position)
                    .map(|mv| Some(WorkerEvent::MoveReady { mv, elapsed: started.elapsed() }));
                (result, true)
            }
        };
        let event = match result {
            Ok(None) => continue,
            Ok(Some(event)) => event,
            Err(e) => {
                error!(error = %e, "search failed");
                WorkerEvent::Failed(e)
            }
        };
        if events.send(Reply { event, answers_request }).is_err() {
            break;
        }
    }
    debug!("search worker stopped");
}
