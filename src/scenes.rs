//! # Scene Management System
//!
//! A centralized system for moving between the title card, the hub menu, a
//! running game and the ending screen.
//!
//! The manager is headless: keys are pushed in with [`SceneManager::handle_key`],
//! time moves with [`SceneManager::update`], and [`SceneManager::render`]
//! returns the current screen as text.

use crate::config::FRAME_MS;
use crate::{
    ArcadeHub, ArcadeResult, AsciiDisplay, Autopilot, GameKind, GenerationConfig,
    InputHandler, Key, MenuInput, Minigame, Session, UI,
};
use log::{debug, info};

/// Represents the current scene in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    /// The title card, shown for a few seconds at startup
    Title,
    /// The hub's game grid
    Menu,
    /// Normal gameplay
    Playing(GameKind),
    /// Ending screen of the last game
    GameOver {
        kind: GameKind,
        score: u64,
        new_best: bool,
    },
}

/// The main scene manager that coordinates all game scenes
#[derive(Debug)]
pub struct SceneManager {
    current_scene: SceneType,
    hub: ArcadeHub,
    session: Session,
    input_handler: InputHandler,
    display: AsciiDisplay,
    ui: UI,
    autopilot: Autopilot,
    quit_requested: bool,
}

impl SceneManager {
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_session(Session::new(config))
    }

    /// Wraps an existing session, for example one with loaded high scores.
    pub fn with_session(session: Session) -> Self {
        let mut display = AsciiDisplay::new();
        display.add_message("Welcome to the Arcade Hub!".to_string());
        let mut autopilot = Autopilot::new();
        autopilot.enabled = false;

        Self {
            current_scene: SceneType::Title,
            hub: ArcadeHub::new(),
            session,
            input_handler: InputHandler::new(),
            display,
            ui: UI::new(),
            autopilot,
            quit_requested: false,
        }
    }

    pub fn current_scene(&self) -> SceneType {
        self.current_scene
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn hub(&self) -> &ArcadeHub {
        &self.hub
    }

    /// Set once Escape is pressed on the menu.
    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// Hands control of the running game to the autopilot, or takes it back.
    pub fn toggle_autopilot(&mut self) -> bool {
        let enabled = self.autopilot.toggle();
        if enabled {
            self.display.add_message("Autopilot enabled".to_string());
        } else {
            self.display.add_message("Autopilot disabled".to_string());
        }
        enabled
    }

    /// Routes one key press to the current scene.
    pub fn handle_key(&mut self, key: Key) -> ArcadeResult<()> {
        match self.current_scene {
            SceneType::Title => {
                if self.input_handler.menu_input(key) == Some(MenuInput::Select) {
                    self.hub.skip_title();
                    self.current_scene = SceneType::Menu;
                }
            }
            SceneType::Menu => self.handle_menu_key(key)?,
            SceneType::Playing(kind) => self.handle_playing_key(kind, key)?,
            SceneType::GameOver { kind, .. } => match key {
                Key::R => self.start_game(kind)?,
                Key::Escape | Key::Enter | Key::Space => self.current_scene = SceneType::Menu,
                _ => {}
            },
        }
        Ok(())
    }

    fn handle_menu_key(&mut self, key: Key) -> ArcadeResult<()> {
        match self.input_handler.menu_input(key) {
            Some(MenuInput::Navigate(direction)) => self.hub.navigate(direction),
            Some(MenuInput::Select) => match self.hub.select() {
                Some(kind) => self.start_game(kind)?,
                None => debug!("Slot {} is empty", self.hub.selection),
            },
            Some(MenuInput::Back) => self.quit_requested = true,
            Some(MenuInput::Restart) | None => {}
        }
        Ok(())
    }

    fn handle_playing_key(&mut self, kind: GameKind, key: Key) -> ArcadeResult<()> {
        match key {
            Key::Escape => {
                self.session.abandon_game();
                self.display.add_message(format!("Left {}", kind.title()));
                self.current_scene = SceneType::Menu;
            }
            Key::R => {
                self.session.restart()?;
                self.display.add_message(format!("{} restarted", kind.title()));
            }
            _ => {
                if let Some(input) = self.input_handler.translate(kind, key) {
                    self.session.apply_input(&input)?;
                }
            }
        }
        Ok(())
    }

    fn start_game(&mut self, kind: GameKind) -> ArcadeResult<()> {
        self.session.start_game(kind)?;
        self.display.add_message(format!("Playing {}", kind.title()));
        self.current_scene = SceneType::Playing(kind);
        Ok(())
    }

    /// Advances the current scene by one frame.
    pub fn update(&mut self) -> ArcadeResult<()> {
        match self.current_scene {
            SceneType::Title => {
                self.hub.update(FRAME_MS);
                if !self.hub.showing_title() {
                    self.current_scene = SceneType::Menu;
                }
            }
            SceneType::Playing(kind) => self.update_playing(kind)?,
            SceneType::Menu | SceneType::GameOver { .. } => {}
        }
        Ok(())
    }

    fn update_playing(&mut self, kind: GameKind) -> ArcadeResult<()> {
        let input = self
            .session
            .active
            .as_ref()
            .and_then(|game| self.autopilot.next_input(game));
        if let Some(input) = input {
            self.session.apply_input(&input)?;
        }
        self.session.tick()?;

        let finished = self.session.active.as_ref().is_some_and(|game| game.is_over());
        if finished {
            let prior_best = self.session.scores.best_score(kind);
            if let Some((kind, score)) = self.session.finish_game() {
                let new_best = prior_best.map_or(true, |best| score > best);
                info!("{} over with score {}", kind.title(), score);
                self.display
                    .add_message(format!("{} over: {} points", kind.title(), score));
                self.current_scene = SceneType::GameOver {
                    kind,
                    score,
                    new_best,
                };
            }
        }
        Ok(())
    }

    /// The current screen as text.
    pub fn render(&self) -> String {
        match self.current_scene {
            SceneType::Title => self.ui.title_screen(),
            SceneType::Menu => self.ui.menu_screen(&self.hub, &self.session.scores),
            SceneType::Playing(_) => match &self.session.active {
                Some(game) => {
                    let mut text = self.display.render_game(game);
                    for message in self.display.recent_messages(3) {
                        text.push('\n');
                        text.push_str(message);
                    }
                    text
                }
                None => String::new(),
            },
            SceneType::GameOver {
                kind,
                score,
                new_best,
            } => self.ui.ending_screen(kind, score, new_best),
        }
    }
}
