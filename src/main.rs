pub mod audio;
pub mod clock;
pub mod config;
pub mod game;
pub mod opponents;
pub mod result;
pub mod runtime;
pub mod session;
pub mod store;
pub mod text_gen;
pub mod ui;
pub mod util;

use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::{
    config::{Config, ConfigStore, FileConfigStore, GameOptions, SessionSnapshot, SnapshotStore,
        DURATIONS},
    game::{Game, GameKind},
    result::ResultRecord,
    runtime::{AppEvent, CrosstermEventSource, Runner},
    store::{FileScoreStore, HistoryEntry, HistoryLog, ScoreStore},
    text_gen::TextMode,
};

const TICK_RATE_MS: u64 = 50;

/// terminal typing arcade with six challenges sharing one measurement core
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing arcade: classic sprints, untimed zen, lives-based survival, a ghost replaying your personal best, a car race against simulated rivals, and a one-word rush against a shrinking countdown."
)]
pub struct Cli {
    /// jump straight into a game, skipping the menu
    #[clap(short, long, value_enum)]
    game: Option<GameKind>,

    /// seconds on the clock for duration-bound games (15, 30, 60 or 120)
    #[clap(short, long)]
    duration: Option<u64>,

    /// flavor of text to type against
    #[clap(short, long, value_enum)]
    text: Option<TextMode>,

    /// sprinkle punctuation onto generated words
    #[clap(long)]
    punctuation: bool,

    /// mix numerals into generated words
    #[clap(long)]
    numbers: bool,

    /// practice your own text instead of generated words
    #[clap(short, long)]
    custom: Option<String>,

    /// start with sound off
    #[clap(long)]
    mute: bool,

    /// ignore any saved mid-session pointer
    #[clap(long)]
    fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Game,
    Results,
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub options: GameOptions,
    pub selected: usize,
    pub game: Option<Game>,
    pub last_kind: Option<GameKind>,
    pub result: Option<ResultRecord>,
    pub result_is_pb: bool,
    pub history: Vec<HistoryEntry>,
    pub sound: bool,
    bests: FileScoreStore,
    history_log: HistoryLog,
    config_store: FileConfigStore,
    snapshots: SnapshotStore,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        Self::with_stores(
            cli,
            FileScoreStore::new(),
            HistoryLog::new(),
            FileConfigStore::new(),
            SnapshotStore::new(),
        )
    }

    pub fn with_stores(
        cli: &Cli,
        bests: FileScoreStore,
        history_log: HistoryLog,
        config_store: FileConfigStore,
        snapshots: SnapshotStore,
    ) -> Self {
        let mut cfg = config_store.load();
        if let Some(duration) = cli.duration {
            cfg.options.duration_secs = duration;
        }
        if let Some(text) = cli.text {
            cfg.options.text_mode = text;
        }
        if cli.punctuation {
            cfg.options.punctuation = true;
        }
        if cli.numbers {
            cfg.options.numbers = true;
        }
        if let Some(custom) = &cli.custom {
            cfg.options.text_mode = TextMode::Custom;
            cfg.options.custom_text = custom.clone();
        }
        if cli.mute {
            cfg.sound = false;
        }
        audio::init(cfg.sound);

        let history = history_log.load();
        let mut app = Self {
            state: AppState::Home,
            options: cfg.options,
            selected: 0,
            game: None,
            last_kind: None,
            result: None,
            result_is_pb: false,
            history,
            sound: cfg.sound,
            bests,
            history_log,
            config_store,
            snapshots,
        };

        if let Some(kind) = cli.game {
            app.launch(kind);
        } else if !cli.fresh {
            // A saved pointer only ever describes a session about to run,
            // never a finished one.
            if let Some(snapshot) = app.snapshots.load() {
                app.options = snapshot.options.clone();
                app.launch(snapshot.game);
            }
        }
        app
    }

    pub fn launch(&mut self, kind: GameKind) {
        self.game = Some(Game::launch(kind, &self.options, &self.bests));
        self.last_kind = Some(kind);
        self.result = None;
        self.result_is_pb = false;
        self.state = AppState::Game;
        self.snapshots.save(&SessionSnapshot {
            game: kind,
            options: self.options.clone(),
        });
    }

    pub fn go_home(&mut self) {
        // Dropping the game releases its timers and cancels any emission
        // still waiting out a celebration delay.
        self.game = None;
        self.result = None;
        self.state = AppState::Home;
        self.snapshots.clear();
    }

    /// Handle one key event; false means quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        match self.state {
            AppState::Home => self.handle_home_key(key.code),
            AppState::Game => {
                match key.code {
                    KeyCode::Esc => self.go_home(),
                    // Tab restarts, intercepted before any game logic sees it
                    KeyCode::Tab => {
                        if let Some(kind) = self.last_kind {
                            self.launch(kind);
                        }
                    }
                    code => {
                        if let Some(game) = self.game.as_mut() {
                            game.on_key(code);
                        }
                    }
                }
                true
            }
            AppState::Results => {
                match key.code {
                    KeyCode::Esc => self.go_home(),
                    KeyCode::Char('q') => return false,
                    KeyCode::Char('r') => {
                        if let Some(kind) = self.last_kind {
                            self.launch(kind);
                        }
                    }
                    _ => {}
                }
                true
            }
        }
    }

    fn handle_home_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.checked_sub(1).unwrap_or(GameKind::ALL.len() - 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % GameKind::ALL.len();
            }
            KeyCode::Enter => self.launch(GameKind::ALL[self.selected]),
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.selected = idx;
                self.launch(GameKind::ALL[idx]);
            }
            KeyCode::Char('d') => {
                self.options.cycle_duration();
                self.persist_config();
            }
            KeyCode::Char('t') => {
                self.options.cycle_text_mode();
                self.persist_config();
            }
            KeyCode::Char('p') => {
                self.options.punctuation = !self.options.punctuation;
                self.persist_config();
            }
            KeyCode::Char('n') => {
                self.options.numbers = !self.options.numbers;
                self.persist_config();
            }
            KeyCode::Char('s') => {
                self.sound = !self.sound;
                audio::set_enabled(self.sound);
                self.persist_config();
            }
            KeyCode::Char('c') => {
                self.history_log.clear();
                self.history.clear();
            }
            _ => {}
        }
        true
    }

    /// Move any emitted ResultRecord into the results screen.
    pub fn drain_result(&mut self) {
        if self.state != AppState::Game {
            return;
        }
        let Some(record) = self.game.as_mut().and_then(Game::poll_result) else {
            return;
        };

        let prev = self.bests.get(&record.pb_key).unwrap_or(0.0);
        self.result_is_pb = record.score as f64 > prev;
        if self.result_is_pb {
            self.bests.set(&record.pb_key, record.score as f64);
        }

        let accuracy = record
            .stats
            .iter()
            .find(|s| s.lbl == "Accuracy")
            .map(|s| s.val.clone())
            .unwrap_or_else(|| "—".to_string());
        let game_name = record
            .label
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_string();
        self.history = self.history_log.push(HistoryEntry {
            score: record.score,
            accuracy,
            game: game_name,
            text_mode: self.options.text_mode.to_string(),
            date: Local::now().to_rfc3339(),
        });

        self.game = None;
        self.result = Some(record);
        self.state = AppState::Results;
        self.snapshots.clear();
    }

    fn persist_config(&self) {
        let _ = self.config_store.save(&Config {
            options: self.options.clone(),
            sound: self.sound,
        });
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }
    if let Some(duration) = cli.duration {
        if !DURATIONS.contains(&duration) {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::InvalidValue,
                format!("duration must be one of {:?}", DURATIONS),
            )
            .exit();
        }
    }
    // Reject blank custom text up front; the session core never sees it.
    if let Some(custom) = &cli.custom {
        if custom.trim().is_empty() {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, "custom text must not be blank")
                .exit();
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let event = runner.step();

        // Wall-clock time advances on every event, so the logical timers
        // stay smooth even while keystrokes crowd out idle ticks.
        let dt = last_tick.elapsed();
        last_tick = Instant::now();
        if let Some(game) = app.game.as_mut() {
            game.on_tick(dt);
        }

        match event {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.handle_key(key) {
                    break;
                }
            }
        }

        app.drain_result();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_app(cli: &Cli) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let app = App::with_stores(
            cli,
            FileScoreStore::with_path(dir.path().join("bests.json")),
            HistoryLog::with_path(dir.path().join("history.csv")),
            FileConfigStore::with_path(dir.path().join("config.json")),
            SnapshotStore::with_path(dir.path().join("session.json")),
        );
        (app, dir)
    }

    fn bare_cli() -> Cli {
        Cli::parse_from(["typeforge", "--fresh"])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["typeforge"]);
        assert_eq!(cli.game, None);
        assert_eq!(cli.duration, None);
        assert_eq!(cli.text, None);
        assert!(!cli.punctuation);
        assert!(!cli.numbers);
        assert_eq!(cli.custom, None);
        assert!(!cli.mute);
    }

    #[test]
    fn test_cli_game_selection() {
        let cli = Cli::parse_from(["typeforge", "--game", "classic"]);
        assert_eq!(cli.game, Some(GameKind::Classic));
        let cli = Cli::parse_from(["typeforge", "-g", "word-rush"]);
        assert_eq!(cli.game, Some(GameKind::WordRush));
        let cli = Cli::parse_from(["typeforge", "-g", "car-race"]);
        assert_eq!(cli.game, Some(GameKind::CarRace));
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from([
            "typeforge",
            "-d",
            "60",
            "-t",
            "quotes",
            "--punctuation",
            "--numbers",
            "--mute",
        ]);
        assert_eq!(cli.duration, Some(60));
        assert_eq!(cli.text, Some(TextMode::Quotes));
        assert!(cli.punctuation);
        assert!(cli.numbers);
        assert!(cli.mute);
    }

    #[test]
    fn app_starts_on_the_menu() {
        let (app, _dir) = test_app(&bare_cli());
        assert_eq!(app.state, AppState::Home);
        assert!(app.game.is_none());
        assert_eq!(app.options, GameOptions::default());
    }

    #[test]
    fn cli_game_flag_skips_the_menu() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Zen);
        let (app, _dir) = test_app(&cli);
        assert_eq!(app.state, AppState::Game);
        assert_eq!(app.last_kind, Some(GameKind::Zen));
    }

    #[test]
    fn custom_flag_switches_text_mode() {
        let mut cli = bare_cli();
        cli.custom = Some("the cat sat".to_string());
        let (app, _dir) = test_app(&cli);
        assert_eq!(app.options.text_mode, TextMode::Custom);
        assert_eq!(app.options.custom_text, "the cat sat");
    }

    #[test]
    fn menu_navigation_wraps() {
        let (mut app, _dir) = test_app(&bare_cli());
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected, GameKind::ALL.len() - 1);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn enter_launches_the_selected_game() {
        let (mut app, _dir) = test_app(&bare_cli());
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Game);
        assert_eq!(app.last_kind, Some(GameKind::Zen));
    }

    #[test]
    fn digit_keys_launch_directly() {
        let (mut app, _dir) = test_app(&bare_cli());
        app.handle_key(key(KeyCode::Char('6')));
        assert_eq!(app.state, AppState::Game);
        assert_eq!(app.last_kind, Some(GameKind::WordRush));
    }

    #[test]
    fn escape_from_game_returns_home_and_drops_the_session() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Classic);
        let (mut app, _dir) = test_app(&cli);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Home);
        assert!(app.game.is_none());
    }

    #[test]
    fn tab_restarts_with_a_fresh_session() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Classic);
        cli.custom = Some("hello world".to_string());
        let (mut app, _dir) = test_app(&cli);

        app.handle_key(key(KeyCode::Char('x'))); // reveal
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Game);
        match app.game.as_ref().unwrap() {
            Game::Classic(g) => assert_eq!(g.session().cursor_idx(), 0),
            _ => panic!("expected classic"),
        }
    }

    #[test]
    fn finished_game_lands_on_results_with_history() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Zen);
        cli.custom = Some("hi".to_string());
        let (mut app, _dir) = test_app(&cli);

        app.handle_key(key(KeyCode::Char('x'))); // reveal
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        app.drain_result();

        assert_eq!(app.state, AppState::Results);
        let result = app.result.as_ref().unwrap();
        assert_eq!(result.label, "zen · untimed");
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].game, "zen");
    }

    #[test]
    fn first_score_is_a_personal_best() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Zen);
        cli.custom = Some("hello there".to_string());
        let (mut app, _dir) = test_app(&cli);

        app.handle_key(key(KeyCode::Char('x')));
        for c in "hello there".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.drain_result();

        assert!(app.result_is_pb);
        assert!(app.bests.get("zen").is_some());
    }

    #[test]
    fn replay_from_results_relaunches_the_same_game() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Zen);
        cli.custom = Some("hi".to_string());
        let (mut app, _dir) = test_app(&cli);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        app.drain_result();
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Game);
        assert_eq!(app.last_kind, Some(GameKind::Zen));
    }

    #[test]
    fn snapshot_restores_into_the_game_not_results() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotStore::with_path(dir.path().join("session.json"));
        snapshots.save(&SessionSnapshot {
            game: GameKind::Survivor,
            options: GameOptions::default(),
        });

        let cli = Cli::parse_from(["typeforge"]);
        let app = App::with_stores(
            &cli,
            FileScoreStore::with_path(dir.path().join("bests.json")),
            HistoryLog::with_path(dir.path().join("history.csv")),
            FileConfigStore::with_path(dir.path().join("config.json")),
            snapshots,
        );
        assert_eq!(app.state, AppState::Game);
        assert_eq!(app.last_kind, Some(GameKind::Survivor));
    }

    #[test]
    fn fresh_flag_ignores_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotStore::with_path(dir.path().join("session.json"));
        snapshots.save(&SessionSnapshot {
            game: GameKind::Survivor,
            options: GameOptions::default(),
        });

        let cli = Cli::parse_from(["typeforge", "--fresh"]);
        let app = App::with_stores(
            &cli,
            FileScoreStore::with_path(dir.path().join("bests.json")),
            HistoryLog::with_path(dir.path().join("history.csv")),
            FileConfigStore::with_path(dir.path().join("config.json")),
            snapshots,
        );
        assert_eq!(app.state, AppState::Home);
    }

    #[test]
    fn option_toggles_persist_to_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        {
            let cli = bare_cli();
            let mut app = App::with_stores(
                &cli,
                FileScoreStore::with_path(dir.path().join("bests.json")),
                HistoryLog::with_path(dir.path().join("history.csv")),
                FileConfigStore::with_path(&config_path),
                SnapshotStore::with_path(dir.path().join("session.json")),
            );
            app.handle_key(key(KeyCode::Char('d'))); // 30 -> 60
            app.handle_key(key(KeyCode::Char('p')));
        }
        let cfg = FileConfigStore::with_path(&config_path).load();
        assert_eq!(cfg.options.duration_secs, 60);
        assert!(cfg.options.punctuation);
    }

    #[test]
    fn clear_history_empties_the_log() {
        let mut cli = bare_cli();
        cli.game = Some(GameKind::Zen);
        cli.custom = Some("hi".to_string());
        let (mut app, _dir) = test_app(&cli);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        app.drain_result();
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.history.len(), 1);

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.history.is_empty());
        assert!(app.history_log.load().is_empty());
    }

    #[test]
    fn ctrl_c_always_quits() {
        let (mut app, _dir) = test_app(&bare_cli());
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!app.handle_key(ev));
    }

    #[test]
    fn ui_renders_every_state() {
        use ratatui::backend::TestBackend;

        let mut cli = bare_cli();
        cli.game = Some(GameKind::Classic);
        cli.custom = Some("hello world".to_string());
        let (mut app, _dir) = test_app(&cli);

        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        // game screen, idle then running
        terminal.draw(|f| ui::draw(&app, f)).unwrap();
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('h')));
        terminal.draw(|f| ui::draw(&app, f)).unwrap();

        // every other game renders too
        for kind in GameKind::ALL {
            app.launch(kind);
            app.handle_key(key(KeyCode::Char('x')));
            terminal.draw(|f| ui::draw(&app, f)).unwrap();
        }

        // results screen
        app.options.text_mode = TextMode::Custom;
        app.options.custom_text = "hi".to_string();
        app.launch(GameKind::Zen);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        app.drain_result();
        assert_eq!(app.state, AppState::Results);
        terminal.draw(|f| ui::draw(&app, f)).unwrap();

        // home screen with history
        app.handle_key(key(KeyCode::Esc));
        terminal.draw(|f| ui::draw(&app, f)).unwrap();
    }
}
