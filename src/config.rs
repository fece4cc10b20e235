use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const MIN_SLOTS: usize = 3;
pub const MAX_SLOTS: usize = 9;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, Deref, From, Into,
    AsRef,
)]
#[serde(transparent)]
pub struct PersistenceKey(String);

crate::impl_string_newtype!(PersistenceKey);

impl From<&str> for PersistenceKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which hit-test maps pointer direction onto a slot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    /// `slot_count` equal sectors, or the custom `slot_angles`.
    #[strum(to_string = "angle", serialize = "radial")]
    Angle,
    /// Fixed 8 compass sectors around a 3x3 grid.
    #[default]
    #[strum(to_string = "grid", serialize = "fixed8")]
    Grid,
}

/// What the event bus does with a structural event published from inside
/// another structural event's handler.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ReentryPolicy {
    #[default]
    #[strum(serialize = "drop")]
    Drop,
    #[strum(serialize = "queue")]
    Queue,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WheelConfig {
    pub slot_count: usize,
    pub cell_size: f64,
    pub spacing: f64,
    pub radius: f64,
    pub slot_angles: Option<Vec<f64>>,
    pub dead_zone_radius: f64,
    pub enable_drag_swap: bool,
    pub enable_click_select: bool,
    pub hover_scale: f64,
    pub animation_duration: f64,
    pub selection: SelectionKind,
    pub reentry: ReentryPolicy,
    pub enable_persistence: bool,
    pub persistence_key: PersistenceKey,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            slot_count: MAX_SLOTS,
            cell_size: 40.0,
            spacing: 5.0,
            radius: 120.0,
            slot_angles: None,
            dead_zone_radius: 40.0,
            enable_drag_swap: true,
            enable_click_select: true,
            hover_scale: 1.15,
            animation_duration: 0.2,
            selection: SelectionKind::Grid,
            reentry: ReentryPolicy::Drop,
            enable_persistence: false,
            persistence_key: PersistenceKey::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("persistence_key is required when enable_persistence is true")]
    MissingPersistenceKey,
    #[error("slot_count must be between 3 and 9, got {0}")]
    SlotCount(usize),
    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("slot_angles has {actual} entries but slot_count is {expected}")]
    SlotAnglesLength { expected: usize, actual: usize },
    #[error("slot_angles[{0}] is not a finite angle")]
    SlotAngleNotFinite(usize),
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails here too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enable_persistence && self.persistence_key.is_blank() {
            return Err(ConfigError::MissingPersistenceKey);
        }
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&self.slot_count) {
            return Err(ConfigError::SlotCount(self.slot_count));
        }

        positive("cell_size", self.cell_size)?;
        non_negative("spacing", self.spacing)?;
        positive("radius", self.radius)?;
        non_negative("dead_zone_radius", self.dead_zone_radius)?;
        positive("hover_scale", self.hover_scale)?;
        non_negative("animation_duration", self.animation_duration)?;

        if let Some(angles) = &self.slot_angles {
            if angles.len() != self.slot_count {
                return Err(ConfigError::SlotAnglesLength {
                    expected: self.slot_count,
                    actual: angles.len(),
                });
            }
            if let Some(i) = angles.iter().position(|a| !a.is_finite()) {
                return Err(ConfigError::SlotAngleNotFinite(i));
            }
        }
        Ok(())
    }

    /// Persistence is live only when enabled and keyed.
    pub fn persistence_key(&self) -> Option<&PersistenceKey> {
        (self.enable_persistence && !self.persistence_key.is_blank())
            .then_some(&self.persistence_key)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(s.try_deserialize()?)
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "quickwheel", "quickwheel")
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = project_dirs().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config_from(path: &std::path::Path) -> Result<WheelConfig, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("QUICKWHEEL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_config() -> Result<WheelConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Loads the user config, falling back to defaults when it is missing or
/// unreadable.
pub fn load_or_default() -> WheelConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default wheel config: {}", e);
            WheelConfig::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
