//! Application-level configuration loading, including the room catalog.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SVALBARD_BACK_CONFIG_PATH";

/// Default mission duration used to seed the shared countdown (one hour).
const DEFAULT_MISSION_DURATION_MS: i64 = 60 * 60 * 1000;
/// Default grace after the deadline before an abandoned session is swept.
const DEFAULT_SWEEP_GRACE_MS: i64 = 2 * 60 * 60 * 1000;

/// One entry of the room catalog: display name plus background asset key.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSpec {
    /// Room display name, unique within the catalog.
    pub name: String,
    /// Background asset key the frontend resolves to an image.
    pub bg: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    rooms: Vec<RoomSpec>,
    mission_duration_ms: i64,
    sweep_grace_ms: i64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        rooms = app_config.rooms.len(),
                        "loaded room catalog from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// The room catalog used to seed each session's play order.
    pub fn room_catalog(&self) -> Vec<(String, String)> {
        self.rooms
            .iter()
            .map(|room| (room.name.clone(), room.bg.clone()))
            .collect()
    }

    /// Mission duration used to seed the shared countdown at game start.
    pub fn mission_duration_ms(&self) -> i64 {
        self.mission_duration_ms
    }

    /// Grace period after the deadline before the sweeper drops a session.
    pub fn sweep_grace_ms(&self) -> i64 {
        self.sweep_grace_ms
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rooms: default_rooms(),
            mission_duration_ms: DEFAULT_MISSION_DURATION_MS,
            sweep_grace_ms: DEFAULT_SWEEP_GRACE_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    rooms: Option<Vec<RoomSpec>>,
    mission_duration_ms: Option<i64>,
    sweep_grace_ms: Option<i64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            rooms: value.rooms.unwrap_or(defaults.rooms),
            mission_duration_ms: value
                .mission_duration_ms
                .unwrap_or(defaults.mission_duration_ms),
            sweep_grace_ms: value.sweep_grace_ms.unwrap_or(defaults.sweep_grace_ms),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in complex layout shipped with the binary.
fn default_rooms() -> Vec<RoomSpec> {
    [
        ("Système de survie", "survival"),
        ("Débarras", "storage"),
        ("Biosphère", "biosphere"),
        ("Grainothèque", "seedbank"),
        ("Centrale électrique", "power"),
        ("Salle de traitement", "water"),
    ]
    .into_iter()
    .map(|(name, bg)| RoomSpec {
        name: name.to_string(),
        bg: bg.to_string(),
    })
    .collect()
}
