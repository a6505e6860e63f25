//! Whole-game flows through `MatchSession`, the surface the UI drives.

use engine::{
    Color, EngineError, EngineResult, MatchResult, MatchSession, Move, Opponent, Outcome, Piece,
    RulesEngine, SelectionState, ShakmatyRules, Square,
};

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn play(session: &mut MatchSession, from: &str, to: &str) -> Outcome {
    let first = session.on_square_clicked(sq(from)).unwrap();
    assert_eq!(first, Outcome::Reselected(sq(from)), "selecting {from}");
    session.on_square_clicked(sq(to)).unwrap()
}

fn play_uci(session: &mut MatchSession, moves: &[&str]) {
    for text in moves {
        let mv = Move::from_uci(text).unwrap();
        let outcome = play(session, &mv.from.to_string(), &mv.to.to_string());
        assert!(
            matches!(outcome, Outcome::MoveApplied(_)),
            "{text} was not applied: {outcome:?}"
        );
    }
}

#[test]
fn king_pawn_opening_flips_the_turn() {
    let mut session = MatchSession::standard(Opponent::Human);

    assert_eq!(
        session.on_square_clicked(sq("e2")).unwrap(),
        Outcome::Reselected(sq("e2"))
    );
    assert_eq!(
        session.current_highlight_set(),
        [sq("e3"), sq("e4")].into_iter().collect()
    );
    assert_eq!(
        session.on_square_clicked(sq("e4")).unwrap(),
        Outcome::MoveApplied(Move::new(sq("e2"), sq("e4")))
    );

    assert_eq!(session.selected(), None);
    assert!(session.current_highlight_set().is_empty());
    assert_eq!(session.side_to_move(), Color::Black);
    assert_eq!(session.moves(), &[Move::new(sq("e2"), sq("e4"))]);
}

#[test]
fn empty_square_without_selection_is_a_no_op() {
    let mut session = MatchSession::standard(Opponent::Human);
    assert_eq!(session.on_square_clicked(sq("d5")).unwrap(), Outcome::NoOp);
    assert_eq!(session.selected(), None);
    assert_eq!(session.side_to_move(), Color::White);
}

#[test]
fn hot_seat_lets_each_side_click_in_turn() {
    let mut session = MatchSession::standard(Opponent::Human);
    // Black cannot move first
    assert_eq!(session.on_square_clicked(sq("e7")).unwrap(), Outcome::NoOp);
    play_uci(&mut session, &["e2e4", "e7e5", "g1f3", "b8c6"]);
    assert_eq!(session.side_to_move(), Color::White);
}

#[test]
fn fools_mate_is_counted_once() {
    let mut session = MatchSession::standard(Opponent::Human);
    play_uci(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);

    assert!(session.is_over());
    assert_eq!(session.result(), Some(MatchResult::BlackWin));
    assert_eq!(session.match_tally(), (0, 1));

    assert_eq!(session.observe_if_terminal(), Some(MatchResult::BlackWin));
    assert_eq!(session.observe_if_terminal(), Some(MatchResult::BlackWin));
    assert_eq!(session.match_tally(), (0, 1));
    assert!(session.log().log_buffer.contains("Black Won! (0-1)"));
}

#[test]
fn clicks_are_ignored_once_the_game_is_over() {
    let mut session = MatchSession::standard(Opponent::Human);
    play_uci(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(session.on_square_clicked(sq("a2")).unwrap(), Outcome::NoOp);
    assert_eq!(session.selected(), None);
}

#[test]
fn replay_resets_the_board_but_not_the_tally() {
    let mut session = MatchSession::standard(Opponent::Human);
    play_uci(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert!(session.on_replay_requested().is_some());

    assert!(!session.is_over());
    assert_eq!(session.result(), None);
    assert!(session.moves().is_empty());
    assert_eq!(session.side_to_move(), Color::White);
    assert_eq!(session.match_tally(), (0, 1));

    // selection is cleared too
    session.on_square_clicked(sq("b1")).unwrap();
    assert!(session.on_replay_requested().is_some());
    assert_eq!(session.selected(), None);
    assert_eq!(session.match_tally(), (0, 1));
}

#[test]
fn shortest_stalemate_is_detected_exactly() {
    let mut session = MatchSession::standard(Opponent::Human);
    let line = [
        "e2e3", "a7a5", "d1h5", "a8a6", "h5a5", "h7h5", "h2h4", "a6h6", "a5c7", "f7f6", "c7d7",
        "e8f7", "d7b7", "d8d3", "b7b8", "d3h7", "b8c8", "f7g6",
    ];
    play_uci(&mut session, &line);
    assert!(!session.is_over());

    play_uci(&mut session, &["c8e6"]);
    assert!(session.is_over());
    assert!(session.rules().legal_moves(session.position()).is_empty());
    assert_eq!(session.result(), Some(MatchResult::Draw));
    assert_eq!(session.match_tally(), (0, 0));
}

#[test]
fn computer_side_cannot_be_clicked() {
    let mut session = MatchSession::standard(Opponent::Computer { color: Color::White });
    assert!(session.computer_to_move());
    assert_eq!(session.on_square_clicked(sq("e2")).unwrap(), Outcome::NoOp);
    assert_eq!(session.on_square_clicked(sq("e7")).unwrap(), Outcome::NoOp);
}

#[test]
fn engine_turn_alternates_with_human_clicks() {
    let mut session = MatchSession::standard(Opponent::Computer { color: Color::Black });
    assert!(!session.computer_to_move());
    assert!(session.begin_engine_request().is_none());

    play_uci(&mut session, &["e2e4"]);
    assert!(session.computer_to_move());

    let position = session.begin_engine_request().expect("computer is due");
    assert_eq!(session.rules().side_to_move(&position), Color::Black);
    // a second request is refused while one is in flight
    assert!(session.begin_engine_request().is_none());
    // no clicks and no replay while the engine thinks
    assert_eq!(session.on_square_clicked(sq("d2")).unwrap(), Outcome::NoOp);
    assert!(session.on_replay_requested().is_none());

    let reply = Move::from_uci("e7e5").unwrap();
    assert_eq!(session.apply_engine_move(reply).unwrap(), None);
    assert!(!session.engine_request_outstanding());
    assert_eq!(session.side_to_move(), Color::White);
    assert_eq!(session.moves().len(), 2);
    assert!(session.log().log_buffer.contains("2. e7-e5 (Computer move"));

    assert_eq!(
        session.on_square_clicked(sq("g1")).unwrap(),
        Outcome::Reselected(sq("g1"))
    );
}

#[test]
fn engine_moves_need_an_outstanding_request() {
    let mut session = MatchSession::standard(Opponent::Computer { color: Color::Black });
    play_uci(&mut session, &["d2d4"]);
    let err = session
        .apply_engine_move(Move::from_uci("d7d5").unwrap())
        .unwrap_err();
    assert!(matches!(err, EngineError::NoRequestOutstanding));
}

#[test]
fn illegal_engine_move_is_rejected() {
    let mut session = MatchSession::standard(Opponent::Computer { color: Color::Black });
    play_uci(&mut session, &["d2d4"]);
    session.begin_engine_request().unwrap();

    let err = session
        .apply_engine_move(Move::from_uci("d7d4").unwrap())
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalMove { .. }));
    assert!(session.engine_request_outstanding());
    assert_eq!(session.side_to_move(), Color::Black);
}

#[test]
fn computer_win_is_tallied() {
    let mut session = MatchSession::standard(Opponent::Computer { color: Color::Black });
    let script = [("f2f3", "e7e5"), ("g2g4", "d8h4")];
    let mut last = None;
    for (human, computer) in script {
        play_uci(&mut session, &[human]);
        session.begin_engine_request().unwrap();
        last = session
            .apply_engine_move(Move::from_uci(computer).unwrap())
            .unwrap();
    }
    assert_eq!(last, Some(MatchResult::BlackWin));
    assert!(!session.computer_to_move());
    assert_eq!(session.match_tally(), (0, 1));
}

#[test]
fn selection_state_is_exposed_through_the_machine() {
    let mut machine = engine::SelectionStateMachine::new();
    let rules = engine::ShakmatyRules::new();
    let start = rules.start();
    machine
        .handle_click(&rules, &start, sq("b1"), Color::White)
        .unwrap();
    assert_eq!(machine.state(), SelectionState::Selected(sq("b1")));
}

#[test]
fn fivefold_repetition_ends_the_game_in_a_draw() {
    let mut session = MatchSession::standard(Opponent::Human);
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for _ in 0..3 {
        play_uci(&mut session, &shuffle);
    }
    play_uci(&mut session, &shuffle[..3]);
    assert!(!session.is_over());
    assert_eq!(session.result(), None);

    // the start position appears for the fifth time
    play_uci(&mut session, &shuffle[3..]);
    assert!(session.is_over());
    assert_eq!(session.result(), Some(MatchResult::Draw));
    assert_eq!(session.match_tally(), (0, 0));
    assert!(session.log().log_buffer.contains("Draw! (1/2-1/2)"));
    assert_eq!(session.on_square_clicked(sq("e2")).unwrap(), Outcome::NoOp);

    // a new game starts counting from scratch
    assert!(session.on_replay_requested().is_some());
    play_uci(&mut session, &shuffle);
    assert!(!session.is_over());
}

#[test]
fn replay_hands_back_the_abandoned_game_record() {
    let mut session = MatchSession::standard(Opponent::Human);
    play_uci(&mut session, &["e2e4"]);

    let finished = session.on_replay_requested().expect("nothing in flight");
    assert_eq!(finished.move_count(), 1);
    assert!(finished.log_buffer.contains("1. e2-e4 (Human move"));
    assert!(finished.log_buffer.contains("Game finished abruptly - replay requested"));

    assert_eq!(session.log().move_count(), 0);
    assert!(!session.log().log_buffer.contains("abruptly"));
}

#[test]
fn replay_after_a_finished_game_is_not_an_abort() {
    let mut session = MatchSession::standard(Opponent::Human);
    play_uci(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);

    let finished = session.on_replay_requested().unwrap();
    assert!(finished.log_buffer.contains("Black Won! (0-1)"));
    assert!(!finished.log_buffer.contains("abruptly"));
}

/// Real rules, but reports a result string nobody recognises.
#[derive(Clone, Copy)]
struct Abandoned(ShakmatyRules);

impl RulesEngine for Abandoned {
    type Position = <ShakmatyRules as RulesEngine>::Position;

    fn start(&self) -> Self::Position {
        self.0.start()
    }

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move> {
        self.0.legal_moves(position)
    }

    fn apply(&self, position: &Self::Position, mv: &Move) -> EngineResult<Self::Position> {
        self.0.apply(position, mv)
    }

    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<Piece> {
        self.0.piece_at(position, square)
    }

    fn side_to_move(&self, position: &Self::Position) -> Color {
        self.0.side_to_move(position)
    }

    fn is_game_over(&self, position: &Self::Position) -> bool {
        self.0.is_game_over(position)
    }

    fn result(&self, _position: &Self::Position) -> String {
        "abandoned".to_string()
    }

    fn fen(&self, position: &Self::Position) -> String {
        self.0.fen(position)
    }
}

#[test]
fn unrecognised_result_still_ends_the_game() {
    let mut session = MatchSession::new(Abandoned(ShakmatyRules::new()), Opponent::Human);
    for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        let mv = Move::from_uci(text).unwrap();
        session.on_square_clicked(mv.from).unwrap();
        session.on_square_clicked(mv.to).unwrap();
    }

    assert!(session.is_over());
    assert_eq!(session.result(), Some(MatchResult::Unknown));
    assert_eq!(session.observe_if_terminal(), Some(MatchResult::Unknown));
    assert_eq!(session.match_tally(), (0, 0));
    assert!(session.log().log_buffer.contains("Game Over! (abandoned)"));
    assert_eq!(session.on_square_clicked(sq("a2")).unwrap(), Outcome::NoOp);
}
