use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai::{DifficultyTier, SearchWorker, WorkerEvent};
use egui::{Align2, Color32, FontId, Rect, Sense, Stroke, Vec2};
use engine::{GameLog, MatchSession, Opponent, ShakmatyRules, Square};
use tracing::{debug, error, info, warn};

/// How often to look for the engine's reply while it is thinking.
const ENGINE_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Fatal diagnostic handed back to `main` once the window has closed.
pub type FatalSlot = Arc<Mutex<Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    DifficultyMenu,
    Playing,
}

pub struct ChessApp {
    session: MatchSession,
    worker: Option<SearchWorker<ShakmatyRules>>,
    /// Tier given on the command line; otherwise the menu asks every game.
    fixed_tier: Option<DifficultyTier>,
    screen: Screen,
    log_dir: Option<PathBuf>,
    log_saved: bool,
    fatal: FatalSlot,
    stopping: bool,
}

impl ChessApp {
    pub fn new(
        opponent: Opponent,
        worker: Option<SearchWorker<ShakmatyRules>>,
        fixed_tier: Option<DifficultyTier>,
        log_dir: Option<PathBuf>,
        fatal: FatalSlot,
    ) -> Self {
        let mut app = Self {
            session: MatchSession::standard(opponent),
            worker,
            fixed_tier,
            screen: Screen::Playing,
            log_dir,
            log_saved: false,
            fatal,
            stopping: false,
        };
        app.enter_game();
        app
    }

    /// Shows the menu when a computer game still needs a tier.
    fn enter_game(&mut self) {
        if self.worker.is_none() {
            self.screen = Screen::Playing;
            return;
        }
        match self.fixed_tier {
            Some(tier) => self.choose_tier(tier),
            None => self.screen = Screen::DifficultyMenu,
        }
    }

    fn fail(&mut self, message: String) {
        error!(%message, "stopping");
        self.session.log_mut().log_game_aborted(&message);
        self.save_log("engine failure");
        if let Ok(mut slot) = self.fatal.lock() {
            slot.get_or_insert(message);
        }
        // dropping the worker shuts the engine process down
        self.worker = None;
        self.stopping = true;
    }

    fn save_log(&mut self, reason: &str) {
        if let Some(dir) = &self.log_dir {
            write_log(self.session.log_mut(), dir, reason);
        }
    }

    fn drive_engine(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };

        match worker.poll() {
            Some(WorkerEvent::MoveReady { mv, elapsed }) => {
                info!(%mv, elapsed_ms = elapsed.as_millis() as u64, "computer played");
                if let Err(e) = self.session.apply_engine_move(mv) {
                    self.fail(format!("engine move rejected: {e}"));
                    return;
                }
            }
            Some(WorkerEvent::Failed(e)) => {
                self.fail(format!("chess engine failed: {e}"));
                return;
            }
            None => {}
        }

        if self.screen != Screen::Playing {
            return;
        }
        if let Some(position) = self.session.begin_engine_request() {
            let Some(worker) = self.worker.as_mut() else {
                return;
            };
            if let Err(e) = worker.request_move(position) {
                self.fail(format!("could not reach the engine: {e}"));
            }
        }
    }

    fn replay(&mut self) {
        let Some(mut finished) = self.session.on_replay_requested() else {
            return;
        };
        // finished games were saved when they ended
        if let (Some(dir), false) = (&self.log_dir, self.log_saved) {
            if finished.move_count() > 0 {
                write_log(&mut finished, dir, "replay requested");
            }
        }
        self.log_saved = false;
        if let Some(worker) = &self.worker {
            if let Err(e) = worker.new_game() {
                self.fail(format!("could not reset the engine: {e}"));
                return;
            }
        }
        self.enter_game();
    }

    fn handle_square_click(&mut self, clicked_square: Square) {
        match self.session.on_square_clicked(clicked_square) {
            Ok(outcome) => debug!(square = %clicked_square, ?outcome, "click"),
            Err(e) => warn!(error = %e, "click rejected"),
        }
    }

    fn difficulty_menu(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Select Difficulty");
                ui.add_space(40.0);
                for tier in DifficultyTier::ALL {
                    let button = egui::Button::new(egui::RichText::new(tier.to_string()).size(24.0));
                    if ui.add_sized([220.0, 60.0], button).clicked() {
                        self.choose_tier(tier);
                    }
                    ui.add_space(20.0);
                }
            });
        });
    }

    fn choose_tier(&mut self, tier: DifficultyTier) {
        let Some(worker) = &self.worker else {
            return;
        };
        if let Err(e) = worker.select_tier(tier) {
            self.fail(format!("could not configure the engine: {e}"));
            return;
        }
        self.screen = Screen::Playing;
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("⟲ Replay").clicked() {
                    self.replay();
                }
                ui.label(self.status_text());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (white_wins, black_wins) = self.session.match_tally();
                    ui.label(format!("Black: {black_wins} - White: {white_wins}"));
                });
            });
        });
    }

    fn status_text(&self) -> String {
        if let Some(result) = self.session.result() {
            return result.to_string();
        }
        if self.session.engine_request_outstanding() {
            return "Computer is thinking…".to_string();
        }
        format!("{} to move", self.session.side_to_move())
    }

    fn game_over_window(&mut self, ctx: &egui::Context) {
        let Some(result) = self.session.observe_if_terminal() else {
            return;
        };
        if !self.log_saved {
            self.save_log("game over");
            self.log_saved = true;
        }

        egui::Window::new("Game Over")
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(result.message());
                    ui.add_space(12.0);
                    let button = egui::Button::new(egui::RichText::new("Play Again").size(24.0));
                    if ui.add_sized([200.0, 60.0], button).clicked() {
                        self.replay();
                    }
                });
            });
    }

    fn board(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let available_size = ui.available_size();
            let board_size = available_size.x.min(available_size.y) - 20.0;
            let square_size = board_size / 8.0;

            let board_rect = Rect::from_min_size(ui.cursor().min, Vec2::splat(board_size));

            let response = ui.allocate_rect(board_rect, Sense::click());

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let relative_pos = pos - board_rect.min;
                    if let Some(clicked_square) =
                        Square::from_coords(relative_pos.x, relative_pos.y, square_size)
                    {
                        self.handle_square_click(clicked_square);
                    }
                }
            }

            self.draw_board(ui, board_rect, square_size);
        });
    }

    fn draw_board(&self, ui: &mut egui::Ui, board_rect: Rect, square_size: f32) {
        let painter = ui.painter();
        let targets = self.session.current_highlight_set();
        let selected = self.session.selected();

        for square in Square::all() {
            let (file, rank) = (square.file(), square.rank());
            let is_light = (file + rank) % 2 == 1;

            let square_rect = Rect::from_min_size(
                board_rect.min
                    + Vec2::new(
                        file as f32 * square_size,
                        (7 - rank) as f32 * square_size,
                    ),
                Vec2::splat(square_size),
            );

            let base_color = if is_light {
                Color32::from_rgb(240, 217, 181)
            } else {
                Color32::from_rgb(181, 136, 99)
            };
            let square_color = if Some(square) == selected {
                Color32::from_rgb(120, 200, 80)
            } else {
                base_color
            };
            painter.rect_filled(square_rect, 0.0, square_color);

            let piece = self.session.piece_at(square);
            if targets.contains(&square) {
                let center = square_rect.center();
                let marker = Color32::from_rgba_unmultiplied(128, 128, 128, 179);
                if piece.is_some() {
                    // capture: donut
                    painter.circle_filled(center, square_size * 0.4, marker);
                    painter.circle_filled(center, square_size * 0.3, square_color);
                } else {
                    painter.circle_filled(center, square_size * 0.15, marker);
                }
            }

            if let Some(piece) = piece {
                painter.text(
                    square_rect.center(),
                    Align2::CENTER_CENTER,
                    piece.glyph(),
                    FontId::proportional(square_size * 0.8),
                    Color32::BLACK,
                );
            }
        }

        painter.rect_stroke(board_rect, 0.0, Stroke::new(2.0, Color32::BLACK));
    }
}

fn write_log(log: &mut GameLog, dir: &Path, reason: &str) {
    match log.save_to_file(dir, reason) {
        Ok(path) => info!(path = %path.display(), "game log saved"),
        Err(e) => warn!(error = %e, "could not save game log"),
    }
}

impl eframe::App for ChessApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.stopping {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.drive_engine();
        if self.stopping {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        match self.screen {
            Screen::DifficultyMenu => self.difficulty_menu(ctx),
            Screen::Playing => {
                self.status_bar(ctx);
                self.board(ctx);
                self.game_over_window(ctx);
            }
        }

        if self.session.engine_request_outstanding() {
            ctx.request_repaint_after(ENGINE_POLL_INTERVAL);
        } else if self.session.computer_to_move() && self.screen == Screen::Playing {
            ctx.request_repaint();
        }
    }
}
