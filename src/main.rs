use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use physman::{
    app::{App, AppSettings, Control},
    app_dirs::AppDirs,
    config::{player_id_from_page_url, Config, ConfigStore, FileConfigStore},
    logging::init_logging,
    reporter::{HttpReporter, LogReporter, ResultReporter},
    runtime::{spawn_terminal_input, AppEventSource, ChannelEventSource, FixedTicker, Runner},
    ui,
    vocabulary::Vocabulary,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc, Arc},
    time::Duration,
};
use tracing::{info, warn};
use webbrowser::Browser;

const POLL_INTERVAL_MS: u64 = 250;

/// physics-vocabulary hangman for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guess physics words letter by letter before the gallows is complete. Finished games are reported to a scoring service."
)]
pub struct Cli {
    /// player id submitted with results
    #[clap(short = 'u', long, env = "PHYSMAN_USER_ID")]
    user_id: Option<String>,

    /// hosting page url; its user_id query parameter identifies the player
    #[clap(long)]
    page_url: Option<String>,

    /// game id submitted with results
    #[clap(long)]
    game_id: Option<u32>,

    /// endpoint that receives finished games
    #[clap(long)]
    report_url: Option<String>,

    /// page opened after dismissing the end-of-game notice
    #[clap(long)]
    games_url: Option<String>,

    /// only log results instead of submitting them
    #[clap(long)]
    offline: bool,

    /// play a fixed word instead of a random physics word
    #[clap(short = 'w', long)]
    word: Option<String>,

    /// config file to use instead of the platform default
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// log file (default: ~/.local/state/physman/physman.log)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// more logging; repeat for more detail
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layer command line flags over the loaded config.
    /// `--user-id` beats `--page-url`, which beats the config file.
    fn apply(&self, mut cfg: Config) -> physman::Result<Config> {
        if let Some(page_url) = &self.page_url {
            if let Some(id) = player_id_from_page_url(page_url)? {
                cfg.player_id = Some(id);
            }
        }
        if let Some(id) = &self.user_id {
            cfg.player_id = Some(id.clone());
        }
        if let Some(game_id) = self.game_id {
            cfg.game_id = game_id;
        }
        if let Some(url) = &self.report_url {
            cfg.report_url = url.clone();
        }
        if let Some(url) = &self.games_url {
            cfg.games_list_url = url.clone();
        }
        if self.offline {
            cfg.report_results = false;
        }
        Ok(cfg)
    }

    fn vocabulary(&self) -> physman::Result<Vocabulary> {
        match &self.word {
            Some(word) => Vocabulary::new("custom", vec![word.clone()]),
            None => Vocabulary::physics(),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        init_logging(&log_path, cli.verbose)?;
    }

    let store = cli.config_store();
    let config = cli.apply(store.load())?;
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let vocabulary = cli.vocabulary()?;
    let reporter: Arc<dyn ResultReporter> = if config.report_results {
        Arc::new(HttpReporter::new(config.report_url.clone())?)
    } else {
        Arc::new(LogReporter)
    };

    let settings = AppSettings {
        context: config.session_context(),
        vocabulary,
        games_list_url: config.games_list_url.clone(),
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    spawn_terminal_input(tx.clone());
    let mut app = App::new(settings, Arc::clone(&reporter), tx, FixedTicker::seconds());
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    let outcome = start_tui(&mut terminal, &mut app, &runner);
    // stops the session timer
    drop(app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    reporter.flush();

    if let Control::Navigate(url) = outcome? {
        open_games_list(&url);
    }

    Ok(())
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<Control, Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let event = match runner.step() {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(_) => return Ok(Control::Quit),
        };

        match app.handle_event(event) {
            Control::Continue => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            exit => return Ok(exit),
        }
    }
}

fn open_games_list(url: &str) {
    info!(%url, "opening games list");
    if Browser::is_available() {
        if let Err(e) = webbrowser::open(url) {
            warn!(error = %e, %url, "could not open browser");
            println!("games list: {url}");
        }
    } else {
        println!("games list: {url}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use physman::app::AppState;
    use physman::config::{DEFAULT_GAMES_LIST_URL, DEFAULT_REPORT_URL};
    use physman::game::GAME_ID;
    use physman::runtime::AppEvent;
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["physman"]);

        assert_eq!(cli.page_url, None);
        assert_eq!(cli.game_id, None);
        assert_eq!(cli.word, None);
        assert!(!cli.offline);
        assert!(!cli.save_config);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_verbosity_counts() {
        let cli = Cli::parse_from(["physman", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_apply_defaults_unchanged() {
        let cli = Cli::parse_from(["physman", "--user-id", "9"]);
        let cfg = cli.apply(Config::default()).unwrap();

        assert_eq!(cfg.player_id.as_deref(), Some("9"));
        assert_eq!(cfg.game_id, GAME_ID);
        assert_eq!(cfg.report_url, DEFAULT_REPORT_URL);
        assert_eq!(cfg.games_list_url, DEFAULT_GAMES_LIST_URL);
        assert!(cfg.report_results);
    }

    #[test]
    fn test_apply_page_url() {
        let cli = Cli::parse_from([
            "physman",
            "--page-url",
            "http://127.0.0.1:8000/hangman?user_id=31",
        ]);
        let cfg = cli.apply(Config::default()).unwrap();
        assert_eq!(cfg.player_id.as_deref(), Some("31"));
    }

    #[test]
    fn test_user_id_beats_page_url() {
        let cli = Cli::parse_from([
            "physman",
            "--page-url",
            "http://host/?user_id=31",
            "--user-id",
            "5",
        ]);
        let cfg = cli.apply(Config::default()).unwrap();
        assert_eq!(cfg.player_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_page_url_without_player_keeps_config() {
        let cli = Cli::parse_from(["physman", "--page-url", "http://host/hangman"]);
        let base = Config {
            player_id: Some("stored".into()),
            ..Config::default()
        };
        let cfg = cli.apply(base).unwrap();
        assert_eq!(cfg.player_id.as_deref(), Some("stored"));
    }

    #[test]
    fn test_bad_page_url_is_error() {
        let cli = Cli::parse_from(["physman", "--page-url", "::"]);
        assert_matches!(
            cli.apply(Config::default()),
            Err(physman::Error::InvalidPageUrl { .. })
        );
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "physman",
            "--game-id",
            "7",
            "--report-url",
            "http://scores.local/api/",
            "--games-url",
            "http://scores.local/games",
            "--offline",
        ]);
        let cfg = cli.apply(Config::default()).unwrap();

        assert_eq!(cfg.game_id, 7);
        assert_eq!(cfg.report_url, "http://scores.local/api/");
        assert_eq!(cfg.games_list_url, "http://scores.local/games");
        assert!(!cfg.report_results);
    }

    #[test]
    fn test_custom_word_vocabulary() {
        let cli = Cli::parse_from(["physman", "--word", "joule"]);
        let vocab = cli.vocabulary().unwrap();
        assert_eq!(vocab.words(), &["joule".to_string()]);

        let cli = Cli::parse_from(["physman", "--word", "two words"]);
        assert_matches!(cli.vocabulary(), Err(physman::Error::InvalidWord(_)));
    }

    #[test]
    fn test_default_vocabulary_is_physics() {
        let cli = Cli::parse_from(["physman"]);
        assert_eq!(cli.vocabulary().unwrap().name, "physics");
    }

    #[test]
    fn test_config_flag_selects_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("physman.json");
        let cli = Cli::parse_from(["physman", "--config", path.to_str().unwrap()]);

        assert_eq!(cli.config_store().path(), path.as_path());
    }

    fn test_app(word: &str) -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let settings = AppSettings {
            context: Config::default().session_context(),
            vocabulary: Vocabulary::new("test", vec![word.to_string()]).unwrap(),
            games_list_url: DEFAULT_GAMES_LIST_URL.to_string(),
        };
        let app = App::new(
            settings,
            Arc::new(LogReporter),
            tx.clone(),
            FixedTicker::new(Duration::from_secs(3600)),
        );
        (app, tx, rx)
    }

    fn key(c: char) -> AppEvent {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_start_tui_quits_on_esc() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let (mut app, tx, rx) = test_app("ohm");
        tx.send(key('o')).unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();

        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let outcome = start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(outcome, Control::Quit);
        assert_eq!(app.session.guessed_letters(), &['O']);
    }

    #[test]
    fn test_start_tui_navigates_after_game() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let (mut app, tx, rx) = test_app("ohm");
        for c in "ohm".chars() {
            tx.send(key(c)).unwrap();
        }
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            .unwrap();

        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let outcome = start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(
            outcome,
            Control::Navigate(DEFAULT_GAMES_LIST_URL.to_string())
        );
        assert_eq!(app.state, AppState::Results);
    }
}
