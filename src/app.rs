use std::sync::mpsc::Sender;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::game::{Outcome, Session, SessionContext};
use crate::reporter::ResultReporter;
use crate::runtime::{AppEvent, FixedTicker, SessionId, SessionTimer};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    /// The end-of-game modal is open.
    Results,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    /// The modal was dismissed: leave and open the games list.
    Navigate(String),
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub context: SessionContext,
    pub vocabulary: Vocabulary,
    pub games_list_url: String,
}

/// Owns the live session and the timer that drives it.
pub struct App {
    pub session: Session,
    pub state: AppState,
    settings: AppSettings,
    events: Sender<AppEvent>,
    ticker: FixedTicker,
    timer: Option<SessionTimer>,
    session_id: SessionId,
}

impl App {
    pub fn new(
        settings: AppSettings,
        reporter: Arc<dyn ResultReporter>,
        events: Sender<AppEvent>,
        ticker: FixedTicker,
    ) -> Self {
        let session = Session::start(&settings.vocabulary, settings.context.clone(), reporter);
        let timer = SessionTimer::start(0, &ticker, events.clone());

        Self {
            session,
            state: AppState::Playing,
            settings,
            events,
            ticker,
            timer: Some(timer),
            session_id: 0,
        }
    }

    /// Start a fresh session, cancelling the previous session's timer.
    pub fn reset(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        self.session_id += 1;
        self.session.restart(&self.settings.vocabulary);
        self.timer = Some(SessionTimer::start(
            self.session_id,
            &self.ticker,
            self.events.clone(),
        ));
        self.state = AppState::Playing;
        info!(session = self.session_id, "new game");
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Tick(id) if id == self.session_id => {
                self.session.tick();
                Control::Continue
            }
            AppEvent::Tick(id) => {
                debug!(stale = id, current = self.session_id, "dropping stale tick");
                Control::Continue
            }
            AppEvent::Resize => Control::Continue,
            AppEvent::Key(key) => self.handle_key(key),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Char('c'), true) | (KeyCode::Esc, _) => return Control::Quit,
            (KeyCode::Char('r'), true) => {
                self.reset();
                return Control::Continue;
            }
            _ => {}
        }

        match self.state {
            AppState::Playing => {
                if let KeyCode::Char(c) = key.code {
                    if !ctrl {
                        self.session.guess(c);
                        if self.session.is_over() {
                            self.finish();
                        }
                    }
                }
                Control::Continue
            }
            AppState::Results => match key.code {
                KeyCode::Enter => Control::Navigate(self.settings.games_list_url.clone()),
                KeyCode::Char('r') | KeyCode::Char('n') => {
                    self.reset();
                    Control::Continue
                }
                KeyCode::Char('q') => Control::Quit,
                _ => Control::Continue,
            },
        }
    }

    fn finish(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.state = AppState::Results;
    }

    pub fn modal_message(&self) -> Option<&'static str> {
        match self.session.outcome()? {
            Outcome::Won => Some("Congratulations! You won!"),
            Outcome::Lost => Some("Game Over!"),
        }
    }

    pub fn games_list_url(&self) -> &str {
        &self.settings.games_list_url
    }
}
