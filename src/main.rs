mod ui;

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
use squarebrick::{
    app_dirs::AppDirs,
    config::{FileSettingsStore, MemorySettingsStore, Settings, SettingsStore},
    events::{GameEvent, Resolution},
    game::Game,
    judge::Outcome,
    leaderboard::{FileLeaderboardStore, Leaderboard, LeaderboardStore, MemoryLeaderboardStore},
    logging,
    mode::{ConfigError, GameConfig, Hardness, SpeedMode, CUSTOM_MAX_RANGE, CUSTOM_SPEED_RANGE, LIVES_RANGE},
    runtime::{BrickEvent, CrosstermEventSource, FixedTicker, Runner},
    session::Phase,
    stats::SessionSummary,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Instant,
};

/// Longest answer the input line accepts; 9999 squared has eight digits
const MAX_ANSWER_LEN: usize = 10;

/// square the falling bricks before they land
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A mental math drill for the terminal: numbers fall as bricks and you type their square before they hit the ground. Scores per speed and hardness are kept on a local leaderboard."
)]
pub struct Cli {
    /// how fast bricks fall
    #[clap(short = 's', long, value_enum, conflicts_with = "custom_speed")]
    speed: Option<SpeedMode>,

    /// range of numbers to square
    #[clap(short = 'd', long, value_enum, conflicts_with = "custom_max")]
    hardness: Option<Hardness>,

    /// seconds a brick takes to fall (selects the custom speed)
    #[clap(long, value_parser = clap::value_parser!(i64).range(CUSTOM_SPEED_RANGE))]
    custom_speed: Option<i64>,

    /// largest number to square (selects the custom hardness)
    #[clap(long, value_parser = clap::value_parser!(i64).range(CUSTOM_MAX_RANGE))]
    custom_max: Option<i64>,

    /// lives per game, saved as the new default (only 3 lives reach the leaderboard)
    #[clap(short = 'l', long, value_parser = clap::value_parser!(i64).range(LIVES_RANGE))]
    lives: Option<i64>,

    /// make bricks fall 10% faster every 10 levels, saved as the new default
    #[clap(long)]
    speed_increase: bool,

    /// skip the menu and start playing right away
    #[clap(short = 'p', long)]
    play: bool,

    /// keep settings and scores in memory only
    #[clap(long)]
    ephemeral: bool,

    /// log at debug level
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn speed_mode(&self) -> SpeedMode {
        if self.custom_speed.is_some() {
            SpeedMode::Custom
        } else {
            self.speed.unwrap_or(SpeedMode::Beginner)
        }
    }

    fn hardness(&self) -> Hardness {
        if self.custom_max.is_some() {
            Hardness::Custom
        } else {
            self.hardness.unwrap_or(Hardness::Medium)
        }
    }

    fn game_config(&self) -> Result<GameConfig, ConfigError> {
        GameConfig::resolve(
            self.speed_mode(),
            self.hardness(),
            self.custom_speed,
            self.custom_max,
        )
    }

    /// Settings to persist when the command line asks for them
    fn settings_override(&self, current: Settings) -> Result<Option<Settings>, ConfigError> {
        if self.lives.is_none() && !self.speed_increase {
            return Ok(None);
        }
        let lives = self.lives.unwrap_or(i64::from(current.lives));
        Settings::new(lives, self.speed_increase || current.speed_increase).map(Some)
    }

    fn stores(&self) -> (Box<dyn SettingsStore>, Box<dyn LeaderboardStore>) {
        if self.ephemeral {
            (
                Box::new(MemorySettingsStore::new(Settings::default())),
                Box::new(MemoryLeaderboardStore::new()),
            )
        } else {
            (
                Box::new(FileSettingsStore::new()),
                Box::new(FileLeaderboardStore::new()),
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    CustomDialog,
    Settings,
    Leaderboard,
    Playing,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuColumn {
    Speed,
    Hardness,
}

#[derive(Debug)]
pub struct MenuState {
    pub speed: SpeedMode,
    pub hardness: Hardness,
    pub column: MenuColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomField {
    Speed,
    MaxNumber,
}

#[derive(Debug)]
pub struct CustomForm {
    pub speed_text: String,
    pub max_text: String,
    pub focus: CustomField,
    pub error: Option<String>,
}

impl Default for CustomForm {
    fn default() -> Self {
        Self {
            speed_text: "10".to_string(),
            max_text: "100".to_string(),
            focus: CustomField::Speed,
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct SettingsForm {
    pub lives_text: String,
    pub speed_increase: bool,
    pub error: Option<String>,
}

impl SettingsForm {
    fn from_settings(settings: Settings) -> Self {
        Self {
            lives_text: settings.lives.to_string(),
            speed_increase: settings.speed_increase,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub game: Game,
    pub state: AppState,
    pub menu: MenuState,
    pub custom_form: CustomForm,
    pub settings_form: SettingsForm,
    pub leaderboard: Leaderboard,
    pub leaderboard_tab: usize,
    pub answer: String,
    pub last_resolution: Option<Resolution>,
    pub summary: Option<SessionSummary>,
    pub config: GameConfig,
    pub now: Instant,
}

impl App {
    pub fn new(game: Game, now: Instant) -> Self {
        let leaderboard = game.leaderboard();
        let settings_form = SettingsForm::from_settings(game.settings());
        Self {
            game,
            state: AppState::Menu,
            menu: MenuState {
                speed: SpeedMode::Beginner,
                hardness: Hardness::Medium,
                column: MenuColumn::Speed,
            },
            custom_form: CustomForm::default(),
            settings_form,
            leaderboard,
            leaderboard_tab: 1,
            answer: String::new(),
            last_resolution: None,
            summary: None,
            config: GameConfig::default(),
            now,
        }
    }

    /// Preselect the menu from the command line
    fn preselect(&mut self, cli: &Cli) {
        self.menu.speed = cli.speed_mode();
        self.menu.hardness = cli.hardness();
        if let Some(secs) = cli.custom_speed {
            self.custom_form.speed_text = secs.to_string();
        }
        if let Some(max) = cli.custom_max {
            self.custom_form.max_text = max.to_string();
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.now = now;
        if self.state == AppState::Playing {
            self.game.on_tick(now);
            self.process_events();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        self.now = now;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        let flow = match self.state {
            AppState::Menu => self.on_menu_key(key),
            AppState::CustomDialog => self.on_custom_key(key),
            AppState::Settings => self.on_settings_key(key),
            AppState::Leaderboard => self.on_leaderboard_key(key),
            AppState::Playing => self.on_playing_key(key),
            AppState::Stats => self.on_stats_key(key),
        };
        self.process_events();
        flow
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') => {
                self.menu.column = match self.menu.column {
                    MenuColumn::Speed => MenuColumn::Hardness,
                    MenuColumn::Hardness => MenuColumn::Speed,
                };
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('s') => {
                self.settings_form = SettingsForm::from_settings(self.game.settings());
                self.state = AppState::Settings;
            }
            KeyCode::Char('l') => {
                self.leaderboard = self.game.leaderboard();
                self.leaderboard_tab = SpeedMode::PRESETS
                    .iter()
                    .position(|m| *m == self.menu.speed)
                    .unwrap_or(0);
                self.state = AppState::Leaderboard;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn move_selection(&mut self, forward: bool) {
        match self.menu.column {
            MenuColumn::Speed => {
                self.menu.speed = cycle(&SpeedMode::ALL, self.menu.speed, forward);
            }
            MenuColumn::Hardness => {
                self.menu.hardness = cycle(&Hardness::ALL, self.menu.hardness, forward);
            }
        }
    }

    fn open_selected(&mut self) {
        let (speed, hardness) = (self.menu.speed, self.menu.hardness);
        if GameConfig::needs_dialog(speed, hardness) {
            self.custom_form.error = None;
            self.custom_form.focus = if speed.is_custom() {
                CustomField::Speed
            } else {
                CustomField::MaxNumber
            };
            self.state = AppState::CustomDialog;
            return;
        }
        match GameConfig::resolve(speed, hardness, None, None) {
            Ok(config) => self.start(config),
            Err(e) => log::error!("preset {speed}/{hardness} did not resolve: {e}"),
        }
    }

    fn on_custom_key(&mut self, key: KeyEvent) -> Flow {
        let both = self.menu.speed.is_custom() && self.menu.hardness.is_custom();
        let form = &mut self.custom_form;
        match key.code {
            KeyCode::Esc => self.state = AppState::Menu,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down if both => {
                form.focus = match form.focus {
                    CustomField::Speed => CustomField::MaxNumber,
                    CustomField::MaxNumber => CustomField::Speed,
                };
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let field = focused_text(form);
                if field.len() < 4 {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                focused_text(form).pop();
            }
            KeyCode::Enter => {
                match GameConfig::from_dialog(
                    self.menu.speed,
                    self.menu.hardness,
                    &form.speed_text,
                    &form.max_text,
                ) {
                    Ok(config) => self.start(config),
                    Err(e) => form.error = Some(e.to_string()),
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_settings_key(&mut self, key: KeyEvent) -> Flow {
        let form = &mut self.settings_form;
        match key.code {
            KeyCode::Esc => self.state = AppState::Menu,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if form.lives_text.len() < 2 {
                    form.lives_text.push(c);
                }
            }
            KeyCode::Backspace => {
                form.lives_text.pop();
            }
            KeyCode::Char(' ') => form.speed_increase = !form.speed_increase,
            KeyCode::Char('d') => *form = SettingsForm::from_settings(Settings::default()),
            KeyCode::Enter => match Settings::from_dialog(&form.lives_text, form.speed_increase) {
                Ok(settings) => {
                    self.game.update_settings(settings);
                    self.state = AppState::Menu;
                }
                Err(e) => form.error = Some(e.to_string()),
            },
            _ => {}
        }
        Flow::Continue
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) -> Flow {
        let tabs = SpeedMode::PRESETS.len();
        match key.code {
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.leaderboard_tab = (self.leaderboard_tab + 1) % tabs;
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.leaderboard_tab = (self.leaderboard_tab + tabs - 1) % tabs;
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.state = AppState::Menu,
            _ => {}
        }
        Flow::Continue
    }

    fn on_playing_key(&mut self, key: KeyEvent) -> Flow {
        let now = self.now;
        let phase = self.game.session().map(|s| s.phase());
        match (phase, key.code) {
            (_, KeyCode::Esc) | (None, _) => self.back_to_menu(),
            (Some(Phase::GameOver), KeyCode::Char(' ') | KeyCode::Enter) => self.show_stats(),
            (Some(Phase::Active | Phase::Paused), KeyCode::Char(' ')) => {
                self.game.on_pause_toggle(now);
            }
            (Some(Phase::Active), KeyCode::Char(c)) if c.is_ascii_digit() || c == '-' => {
                if self.answer.len() < MAX_ANSWER_LEN {
                    self.answer.push(c);
                }
            }
            (Some(Phase::Active), KeyCode::Backspace) => {
                self.answer.pop();
            }
            (Some(Phase::Active), KeyCode::Enter) => {
                if self.game.on_submit(&self.answer, now) == Outcome::Correct {
                    self.answer.clear();
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_stats_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => self.start(self.config),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => self.back_to_menu(),
            _ => {}
        }
        Flow::Continue
    }

    fn start(&mut self, config: GameConfig) {
        self.config = config;
        self.answer.clear();
        self.last_resolution = None;
        self.summary = None;
        self.game.on_session_start(config, self.now);
        self.state = AppState::Playing;
    }

    fn show_stats(&mut self) {
        self.summary = self.game.on_stats_requested();
        self.leaderboard = self.game.leaderboard();
        self.state = AppState::Stats;
    }

    fn back_to_menu(&mut self) {
        self.game.close_session();
        self.answer.clear();
        self.summary = None;
        self.leaderboard = self.game.leaderboard();
        self.state = AppState::Menu;
    }

    fn process_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::LivesChanged(_) => self.answer.clear(),
                GameEvent::RoundResolved(resolution) => self.last_resolution = Some(resolution),
                GameEvent::LeaderboardCommitted { category, rank, .. } => {
                    log::debug!("{} leaderboard rank {:?}", category.key(), rank);
                }
                _ => {}
            }
        }
    }
}

fn focused_text(form: &mut CustomForm) -> &mut String {
    match form.focus {
        CustomField::Speed => &mut form.speed_text,
        CustomField::MaxNumber => &mut form.max_text,
    }
}

fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
    let idx = items.iter().position(|i| *i == current).unwrap_or(0);
    let len = items.len();
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    items[next]
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = if cli.ephemeral {
        None
    } else {
        AppDirs::log_path()
    };
    logging::init(cli.verbose, log_path.as_deref());

    let config = match cli.game_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let (settings_store, leaderboard_store) = cli.stores();
    let mut game = Game::new(settings_store, leaderboard_store);
    match cli.settings_override(game.settings()) {
        Ok(Some(settings)) => game.update_settings(settings),
        Ok(None) => {}
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    }

    let mut app = App::new(game, Instant::now());
    app.preselect(&cli);
    if cli.play {
        app.start(config);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let (event, now) = runner.step_timed();
        match event {
            BrickEvent::Tick => app.on_tick(now),
            BrickEvent::Resize => {}
            BrickEvent::Key(key) => {
                if app.on_key(key, now) == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use squarebrick::judge::square;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(settings: Settings) -> (App, Instant) {
        let now = Instant::now();
        let game = Game::new(
            Box::new(MemorySettingsStore::new(settings)),
            Box::new(MemoryLeaderboardStore::new()),
        );
        (App::new(game, now), now)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)), now);
        }
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["squarebrick"]);
        assert!(!cli.play);
        assert!(!cli.ephemeral);
        let config = cli.game_config().unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(cli.settings_override(Settings::default()), Ok(None));
    }

    #[test]
    fn test_cli_presets() {
        let cli = Cli::parse_from(["squarebrick", "--speed", "expert", "--hardness", "insane"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.speed_secs, 4);
        assert_eq!(config.max_number, 1000);
    }

    #[test]
    fn test_cli_custom_values_select_custom_presets() {
        let cli = Cli::parse_from(["squarebrick", "--custom-speed", "30", "--hardness", "hard"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.speed_mode, SpeedMode::Custom);
        assert_eq!(config.speed_secs, 30);
        assert_eq!(config.hardness, Hardness::Hard);
        assert_eq!(config.max_number, 500);
    }

    #[test]
    fn test_cli_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["squarebrick", "--custom-speed", "0"]).is_err());
        assert!(Cli::try_parse_from(["squarebrick", "--custom-max", "10000"]).is_err());
        assert!(Cli::try_parse_from(["squarebrick", "--lives", "11"]).is_err());
        assert!(Cli::try_parse_from(["squarebrick", "--speed", "custom"]).is_err());
        assert!(
            Cli::try_parse_from(["squarebrick", "--speed", "expert", "--custom-speed", "5"]).is_err()
        );
    }

    #[test]
    fn test_cli_settings_override_keeps_unset_fields() {
        let current = Settings {
            lives: 3,
            speed_increase: true,
        };
        let cli = Cli::parse_from(["squarebrick", "--lives", "5"]);
        assert_eq!(
            cli.settings_override(current),
            Ok(Some(Settings {
                lives: 5,
                speed_increase: true
            }))
        );

        let cli = Cli::parse_from(["squarebrick", "--speed-increase"]);
        assert_eq!(
            cli.settings_override(Settings::default()),
            Ok(Some(Settings {
                lives: 3,
                speed_increase: true
            }))
        );
    }

    #[test]
    fn test_menu_starts_a_preset_game() {
        let (mut app, now) = test_app(Settings::default());
        assert_eq!(app.state, AppState::Menu);

        app.on_key(key(KeyCode::Down), now);
        app.on_key(key(KeyCode::Enter), now);

        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.config.speed_mode, SpeedMode::Intermediate);
        assert_eq!(app.config.hardness, Hardness::Medium);
        assert!(app.game.session().unwrap().current_number().is_some());
    }

    #[test]
    fn test_correct_answer_clears_input_and_levels_up() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Enter), now);

        let n = app.game.session().unwrap().current_number().unwrap();
        type_text(&mut app, &square(n).to_string(), now);
        assert_eq!(app.answer, square(n).to_string());

        app.on_key(key(KeyCode::Enter), now + Duration::from_secs(1));
        assert!(app.answer.is_empty());
        assert_eq!(app.game.session().unwrap().level(), 1);
        assert!(matches!(
            app.last_resolution,
            Some(Resolution::Answered { number, .. }) if number == n
        ));
    }

    #[test]
    fn test_wrong_answer_keeps_input() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Enter), now);

        let n = app.game.session().unwrap().current_number().unwrap();
        let wrong = (square(n) + 1).to_string();
        type_text(&mut app, &wrong, now);
        app.on_key(key(KeyCode::Enter), now);

        assert_eq!(app.answer, wrong);
        let session = app.game.session().unwrap();
        assert_eq!(session.level(), 0);
        assert_eq!(session.lives(), 3);
    }

    #[test]
    fn test_custom_dialog_validates_before_starting() {
        let (mut app, now) = test_app(Settings::default());
        app.menu.speed = SpeedMode::Custom;
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.state, AppState::CustomDialog);

        app.custom_form.speed_text.clear();
        type_text(&mut app, "0", now);
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.state, AppState::CustomDialog);
        assert_eq!(
            app.custom_form.error.as_deref(),
            Some("Speed must be between 1 and 99 seconds")
        );
        assert!(app.game.session().is_none());

        app.on_key(key(KeyCode::Backspace), now);
        type_text(&mut app, "5", now);
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.config.speed_secs, 5);
        assert_eq!(app.config.max_number, 250);
    }

    #[test]
    fn test_custom_dialog_switches_fields_when_both_are_custom() {
        let (mut app, now) = test_app(Settings::default());
        app.menu.speed = SpeedMode::Custom;
        app.menu.hardness = Hardness::Custom;
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.custom_form.focus, CustomField::Speed);

        app.on_key(key(KeyCode::Tab), now);
        assert_eq!(app.custom_form.focus, CustomField::MaxNumber);
        app.custom_form.max_text.clear();
        type_text(&mut app, "12345", now);
        assert_eq!(app.custom_form.max_text, "1234");

        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.config.speed_secs, 10);
        assert_eq!(app.config.max_number, 1234);
    }

    #[test]
    fn test_settings_dialog_saves_valid_values_only() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Char('s')), now);
        assert_eq!(app.state, AppState::Settings);

        app.on_key(key(KeyCode::Backspace), now);
        type_text(&mut app, "11", now);
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.state, AppState::Settings);
        assert_eq!(
            app.settings_form.error.as_deref(),
            Some("Lives must be between 1 and 10")
        );
        assert_eq!(app.game.settings(), Settings::default());

        app.on_key(key(KeyCode::Backspace), now);
        app.on_key(key(KeyCode::Backspace), now);
        type_text(&mut app, "7 ", now);
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.state, AppState::Menu);
        assert_eq!(
            app.game.settings(),
            Settings {
                lives: 7,
                speed_increase: true
            }
        );
    }

    #[test]
    fn test_pause_blocks_typing() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Enter), now);
        app.on_key(key(KeyCode::Char(' ')), now);
        assert_eq!(app.game.session().unwrap().phase(), Phase::Paused);

        type_text(&mut app, "42", now);
        assert!(app.answer.is_empty());

        app.on_key(key(KeyCode::Char(' ')), now);
        assert_eq!(app.game.session().unwrap().phase(), Phase::Active);
    }

    #[test]
    fn test_game_over_to_stats_and_back() {
        let (mut app, now) = test_app(Settings {
            lives: 1,
            speed_increase: false,
        });
        app.on_key(key(KeyCode::Enter), now);
        type_text(&mut app, "1", now);

        app.on_tick(now + Duration::from_secs(13));
        let session = app.game.session().unwrap();
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(app.answer.is_empty());

        app.on_key(key(KeyCode::Char(' ')), now + Duration::from_secs(14));
        assert_eq!(app.state, AppState::Stats);
        let summary = app.summary.as_ref().unwrap();
        assert_eq!(summary.level, 0);
        assert_eq!(summary.failed_numbers.len(), 1);
        assert!(!summary.eligible);

        app.on_key(key(KeyCode::Esc), now + Duration::from_secs(15));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.game.session().is_none());
    }

    #[test]
    fn test_leaderboard_tabs_wrap() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Char('l')), now);
        assert_eq!(app.state, AppState::Leaderboard);
        assert_eq!(app.leaderboard_tab, 1);

        app.on_key(key(KeyCode::Left), now);
        app.on_key(key(KeyCode::Left), now);
        assert_eq!(app.leaderboard_tab, 3);
        app.on_key(key(KeyCode::Esc), now);
        assert_eq!(app.state, AppState::Menu);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, now) = test_app(Settings::default());
        assert_eq!(app.on_key(key(KeyCode::Char('q')), now), Flow::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.on_key(key(KeyCode::Enter), now);
        assert_eq!(app.on_key(ctrl_c, now), Flow::Quit);
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(cycle(&SpeedMode::ALL, SpeedMode::Custom, true), SpeedMode::Newbie);
        assert_eq!(cycle(&SpeedMode::ALL, SpeedMode::Newbie, false), SpeedMode::Custom);
    }

    #[test]
    fn test_ui_renders_menu() {
        let (app, _) = test_app(Settings::default());
        let content = render(&app);
        assert!(content.contains("SQUARE THE BRICK"));
        assert!(content.contains("Beginner"));
        assert!(content.contains("Medium"));
    }

    #[test]
    fn test_ui_renders_playfield_number() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Enter), now);
        let n = app.game.session().unwrap().current_number().unwrap();
        let content = render(&app);
        assert!(content.contains(&n.to_string()));
        assert!(content.contains("Lives"));
    }

    #[test]
    fn test_ui_renders_dialogs_and_stats() {
        let (mut app, now) = test_app(Settings::default());
        app.on_key(key(KeyCode::Char('s')), now);
        assert!(render(&app).contains("Lives"));

        app.on_key(key(KeyCode::Esc), now);
        app.on_key(key(KeyCode::Char('l')), now);
        assert!(render(&app).contains("Leaderboard"));

        app.on_key(key(KeyCode::Esc), now);
        app.menu.hardness = Hardness::Custom;
        app.on_key(key(KeyCode::Enter), now);
        assert!(render(&app).contains("Max number"));

        app.on_key(key(KeyCode::Enter), now);
        for i in 1..=3 {
            app.on_tick(now + Duration::from_secs(13 * i));
        }
        app.on_key(key(KeyCode::Enter), now + Duration::from_secs(40));
        assert_eq!(app.state, AppState::Stats);
        let content = render(&app);
        assert!(content.contains("Level reached"));
        assert!(content.contains("N/A"));
    }
}
