use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::game::{SessionContext, GAME_ID};

pub const DEFAULT_REPORT_URL: &str = "http://127.0.0.1:8000/api/game-results/";
pub const DEFAULT_GAMES_LIST_URL: &str = "http://127.0.0.1:8000/games";

/// Query parameter on the hosting page URL that carries the player id.
pub const USER_ID_PARAM: &str = "user_id";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub player_id: Option<String>,
    pub game_id: u32,
    pub report_url: String,
    pub games_list_url: String,
    pub report_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_id: None,
            game_id: GAME_ID,
            report_url: DEFAULT_REPORT_URL.to_string(),
            games_list_url: DEFAULT_GAMES_LIST_URL.to_string(),
            report_results: true,
        }
    }
}

impl Config {
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            player_id: self.player_id.clone(),
            game_id: self.game_id,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "physman") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("physman_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no config file, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable config file, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// Extract the `user_id` query parameter from a page URL.
///
/// An absent or empty parameter is an unknown player, not an error.
pub fn player_id_from_page_url(page_url: &str) -> Result<Option<String>> {
    let url = reqwest::Url::parse(page_url).map_err(|e| Error::InvalidPageUrl {
        url: page_url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(url
        .query_pairs()
        .find(|(k, _)| k == USER_ID_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty()))
}
