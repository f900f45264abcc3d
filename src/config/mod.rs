use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_STROKE_WIDTH, MIN_OVERLAY_WIDTH, OVERLAY_WIDTH_MARGIN};
use crate::session::SessionSettings;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

fn default_frame_width() -> f32 {
    300.0
}

fn default_frame_height() -> f32 {
    400.0
}

fn default_container_width() -> f32 {
    390.0
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

fn default_autosave_interval() -> u64 {
    2
}

fn default_pull_interval() -> u64 {
    60
}

fn default_profile_email() -> String {
    "me@photo-diary.local".to_string()
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryConfigData {
    /// Photo frame size in logical pixels
    #[serde(default = "default_frame_width")]
    pub frame_width: f32,
    #[serde(default = "default_frame_height")]
    pub frame_height: f32,

    /// Width of the view hosting the photo (bounds overlay widths)
    #[serde(default = "default_container_width")]
    pub container_width: f32,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,

    /// Undo checkpoints kept per entry (unbounded when absent)
    #[serde(default)]
    pub max_undo_depth: Option<usize>,

    /// Seconds between local saves of edited entries
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u64,

    /// Seconds between pulls of remote changes
    #[serde(default = "default_pull_interval")]
    pub pull_interval_secs: u64,

    /// Folder used as the remote store. Sync is disabled without one.
    #[serde(default)]
    pub remote_dir: Option<PathBuf>,

    /// Account signed up on first launch
    #[serde(default = "default_profile_email")]
    pub local_profile_email: String,
}

impl Default for DiaryConfigData {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            container_width: default_container_width(),
            stroke_width: default_stroke_width(),
            max_undo_depth: None,
            autosave_interval_secs: default_autosave_interval(),
            pull_interval_secs: default_pull_interval(),
            remote_dir: None,
            local_profile_email: default_profile_email(),
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct DiaryConfig {
    /// The persisted configuration data
    pub data: DiaryConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            data: DiaryConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

impl DiaryConfig {
    /// Photo frame centered on the origin, in world coordinates
    pub fn frame(&self) -> Rect {
        Rect::from_center_size(
            Vec2::ZERO,
            Vec2::new(self.data.frame_width, self.data.frame_height),
        )
    }

    pub fn session_settings(&self) -> SessionSettings {
        // The width bound must leave room for the minimum overlay width
        let container_width = self
            .data
            .container_width
            .max(MIN_OVERLAY_WIDTH + OVERLAY_WIDTH_MARGIN);
        SessionSettings {
            container_width,
            stroke_width: self.data.stroke_width,
            max_undo_depth: self.data.max_undo_depth,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether the reset has not been acknowledged yet
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: DiaryConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Parse config JSON, falling back to defaults with a reason
fn parse_config(json: &str) -> LoadConfigResult {
    match serde_json::from_str(json) {
        Ok(data) => LoadConfigResult {
            data,
            reset_reason: None,
        },
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            LoadConfigResult {
                data: DiaryConfigData::default(),
                reset_reason: Some(format!("Configuration file was corrupted: {}", e)),
            }
        }
    }
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: DiaryConfigData::default(),
            reset_reason: None,
        };
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => {
            let result = parse_config(&json);
            if result.reset_reason.is_none() {
                info!("Loaded config from {:?}", config_path);
            }
            result
        }
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            LoadConfigResult {
                data: DiaryConfigData::default(),
                reset_reason: Some(format!("Could not read configuration file: {}", e)),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(config: &DiaryConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<DiaryConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    let config_path = get_config_path();
    let existed = config_path.exists();
    let result = load_config(&config_path);
    config.data = result.data;
    config.config_path = config_path;
    config.dirty = false;

    if let Some(reason) = result.reset_reason {
        warn!("Configuration reset to defaults: {}", reason);
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }

    // Write the defaults out so they can be edited by hand
    if !existed {
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<DiaryConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DiaryConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                save_config_system.run_if(on_message::<SaveConfigRequest>),
            );
    }
}
