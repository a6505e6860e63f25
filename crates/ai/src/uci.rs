//! Line protocol client for UCI engines such as Stockfish.
//!
//! [`UciEngine`] speaks the protocol over any writer plus a channel of
//! incoming lines, so every wait can carry a deadline. [`UciProcess`] owns
//! the spawned engine and always shuts it down when dropped.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace, warn};

use crate::coordinator::MoveSearcher;
use crate::error::{SearchError, SearchResult};
use crate::types::SearchLimits;

/// Deadline for handshake and `isready` replies.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the engine gets to exit after `quit` before it is killed.
const QUIT_GRACE: Duration = Duration::from_millis(500);

pub struct UciEngine<W: Write> {
    writer: W,
    lines: Receiver<String>,
    response_timeout: Duration,
    name: Option<String>,
}

impl<W: Write> UciEngine<W> {
    pub fn new(writer: W, lines: Receiver<String>, response_timeout: Duration) -> Self {
        Self {
            writer,
            lines,
            response_timeout,
            name: None,
        }
    }

    /// Engine name from `id name`, once the handshake has run.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// `uci` → `uciok`, then `isready` → `readyok`.
    pub fn handshake(&mut self) -> SearchResult<()> {
        self.send("uci")?;
        let deadline = Instant::now() + self.response_timeout;
        loop {
            let line = self.read_line("uciok", deadline)?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.trim().to_string());
            } else if line.trim() == "uciok" {
                break;
            }
        }
        self.sync()
    }

    pub fn sync(&mut self) -> SearchResult<()> {
        self.send("isready")?;
        self.wait_for("readyok")
    }

    pub fn quit(&mut self) -> SearchResult<()> {
        self.send("quit")
    }

    fn send(&mut self, command: &str) -> SearchResult<()> {
        trace!(command, "uci >");
        writeln!(self.writer, "{command}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self, expected: &'static str, deadline: Instant) -> SearchResult<String> {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(timeout) {
            Ok(line) => {
                trace!(line = line.as_str(), "uci <");
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(SearchError::Unresponsive { expected, timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(SearchError::EngineExited),
        }
    }

    fn wait_for(&mut self, token: &'static str) -> SearchResult<()> {
        let deadline = Instant::now() + self.response_timeout;
        while self.read_line(token, deadline)?.trim() != token {}
        Ok(())
    }
}

impl<W: Write> MoveSearcher for UciEngine<W> {
    fn set_skill_level(&mut self, level: u8) -> SearchResult<()> {
        self.send(&format!("setoption name Skill Level value {level}"))?;
        self.sync()
    }

    fn new_game(&mut self) -> SearchResult<()> {
        self.send("ucinewgame")?;
        self.sync()
    }

    fn best_move(&mut self, fen: &str, limits: SearchLimits) -> SearchResult<Option<String>> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!(
            "go depth {} movetime {}",
            limits.depth,
            limits.move_time.as_millis()
        ))?;

        let deadline = Instant::now() + limits.move_time + self.response_timeout;
        loop {
            let line = self.read_line("bestmove", deadline)?;
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("bestmove") {
                continue;
            }
            return match tokens.next() {
                Some("(none)") => Ok(None),
                Some(mv) => Ok(Some(mv.to_string())),
                None => Err(SearchError::Protocol(format!("malformed reply {line:?}"))),
            };
        }
    }
}

/// A running engine process. Dropping it sends `quit` and reaps the child,
/// killing it if it does not exit promptly.
pub struct UciProcess {
    child: Child,
    engine: UciEngine<BufWriter<ChildStdin>>,
    reader: Option<JoinHandle<()>>,
}

impl UciProcess {
    pub fn spawn(path: &str, response_timeout: Duration) -> SearchResult<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SearchError::Spawn {
                path: path.to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (tx, rx) = crossbeam_channel::unbounded();

        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SearchError::Protocol("engine pipes unavailable".to_string()));
        };

        let mut process = Self {
            child,
            engine: UciEngine::new(BufWriter::new(stdin), rx, response_timeout),
            reader: None,
        };

        let reader = thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;
        process.reader = Some(reader);

        process.engine.handshake()?;
        debug!(
            path,
            name = process.engine.name().unwrap_or("unknown"),
            "engine ready"
        );
        Ok(process)
    }

    pub fn name(&self) -> Option<&str> {
        self.engine.name()
    }
}

impl MoveSearcher for UciProcess {
    fn set_skill_level(&mut self, level: u8) -> SearchResult<()> {
        self.engine.set_skill_level(level)
    }

    fn new_game(&mut self) -> SearchResult<()> {
        self.engine.new_game()
    }

    fn best_move(&mut self, fen: &str, limits: SearchLimits) -> SearchResult<Option<String>> {
        self.engine.best_move(fen, limits)
    }
}

impl Drop for UciProcess {
    fn drop(&mut self) {
        let _ = self.engine.quit();

        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "engine exited");
                    break;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => {
                    warn!("engine ignored quit, killing it");
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    break;
                }
            }
        }

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Sender;

    fn scripted(lines: &[&str]) -> (UciEngine<Vec<u8>>, Sender<String>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        (UciEngine::new(Vec::new(), rx, Duration::from_millis(200)), tx)
    }

    fn sent(engine: &UciEngine<Vec<u8>>) -> Vec<String> {
        String::from_utf8(engine.writer().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn handshake_records_the_engine_name() {
        let (mut engine, _tx) = scripted(&[
            "Stockfish 16 by the Stockfish developers",
            "id name Stockfish 16",
            "id author the Stockfish developers",
            "option name Skill Level type spin default 20 min 0 max 20",
            "uciok",
            "readyok",
        ]);
        engine.handshake().unwrap();
        assert_eq!(engine.name(), Some("Stockfish 16"));
        assert_eq!(sent(&engine), ["uci", "isready"]);
    }

    #[test]
    fn best_move_skips_info_lines() {
        let (mut engine, _tx) = scripted(&[
            "info depth 1 seldepth 1 score cp 20 pv e7e5",
            "info depth 3 seldepth 4 score cp 31 pv e7e5 g1f3 b8c6",
            "bestmove e7e5 ponder g1f3",
        ]);
        let limits = SearchLimits {
            depth: 3,
            move_time: Duration::from_millis(100),
        };
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let mv = engine.best_move(fen, limits).unwrap();

        assert_eq!(mv.as_deref(), Some("e7e5"));
        assert_eq!(
            sent(&engine),
            [format!("position fen {fen}"), "go depth 3 movetime 100".to_string()]
        );
    }

    #[test]
    fn bestmove_none_means_no_move() {
        let (mut engine, _tx) = scripted(&["bestmove (none)"]);
        let limits = SearchLimits {
            depth: 1,
            move_time: Duration::from_millis(10),
        };
        assert_eq!(engine.best_move("7k/8/8/8/8/8/8/K7 w - - 0 1", limits).unwrap(), None);
    }

    #[test]
    fn skill_level_is_confirmed_with_isready() {
        let (mut engine, _tx) = scripted(&["readyok"]);
        engine.set_skill_level(5).unwrap();
        assert_eq!(sent(&engine), ["setoption name Skill Level value 5", "isready"]);
    }

    #[test]
    fn silent_engine_times_out() {
        let (mut engine, _tx) = scripted(&[]);
        let err = engine.sync().unwrap_err();
        assert!(matches!(err, SearchError::Unresponsive { expected: "readyok", .. }));
    }

    #[test]
    fn closed_stream_means_the_engine_exited() {
        let (mut engine, tx) = scripted(&["info string booting"]);
        drop(tx);
        let err = engine.handshake().unwrap_err();
        assert!(matches!(err, SearchError::EngineExited));
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let err = UciProcess::spawn("./definitely-not-a-chess-engine", DEFAULT_RESPONSE_TIMEOUT)
            .err()
            .expect("spawn should fail");
        assert!(matches!(err, SearchError::Spawn { .. }));
    }
}
