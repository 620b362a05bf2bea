use ratatui::Frame;

use crate::{ui, App, AppState};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_menu(app, f);
    }
}

/// Custom speed / max number entry, drawn over the menu
pub struct CustomDialogScreen;

impl Screen for CustomDialogScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_menu(app, f);
        ui::render_custom_dialog(app, f);
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_menu(app, f);
        ui::render_settings(app, f);
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_leaderboard(app, f);
    }
}

/// Playfield, including the paused and game over overlays
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_playing(app, f);
    }
}

pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        ui::render_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::CustomDialog => Box::new(CustomDialogScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Stats => Box::new(StatsScreen),
    }
}
