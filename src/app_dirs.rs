use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "squarebrick";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn settings_path() -> PathBuf {
        match Self::project_dirs() {
            Some(pd) => pd.config_dir().join("settings.json"),
            None => PathBuf::from("squarebrick_settings.json"),
        }
    }

    pub fn leaderboard_path() -> PathBuf {
        match Self::project_dirs() {
            Some(pd) => pd.data_dir().join("leaderboard.json"),
            None => PathBuf::from("squarebrick_leaderboard.json"),
        }
    }

    /// Log file lives under $HOME/.local/state like other state files
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("squarebrick.log"))
        } else {
            Self::project_dirs().map(|pd| pd.data_local_dir().join("squarebrick.log"))
        }
    }
}
