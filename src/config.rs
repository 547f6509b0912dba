/// TOML configuration for the bridge and the lights it drives.
/// Every field has a default, so only the bridge address has to be set.

use crate::error::{Error, Result};
use crate::geometry::{GAMUT_A, GAMUT_B, GAMUT_C, Gamut, Point2};
use crate::profile::FixtureProfile;
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub defaults: FixtureConfig,
    /// Light ids to drive. Empty means every light on the bridge.
    pub lights: Vec<String>,
    /// Per-light gamut overrides, keyed by light id.
    pub light_gamuts: HashMap<String, GamutConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub address: String,
    /// Where the registered API username is stored.
    pub username_file: String,
    /// Name this client registers under (`app#device`).
    pub device_type: String,
}

/// Settings shared by every light unless overridden.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub gamut: GamutConfig,
    pub gamma_correct: bool,
    /// Deciseconds.
    pub transition_time: u16,
}

/// Either a preset name ("A", "B", "C") or explicit corners.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GamutConfig {
    Preset(String),
    Corners {
        red: [f64; 2],
        green: [f64; 2],
        blue: [f64; 2],
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            defaults: FixtureConfig::default(),
            lights: Vec::new(),
            light_gamuts: HashMap::new(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            username_file: "bridge_username.txt".into(),
            device_type: "hue_lamp#cli".into(),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            gamut: GamutConfig::Preset("B".into()),
            gamma_correct: true,
            transition_time: FixtureProfile::HUE_TRANSITION_TIME,
        }
    }
}

impl GamutConfig {
    /// Resolve to a validated gamut.
    pub fn gamut(&self) -> Result<Gamut> {
        match self {
            GamutConfig::Preset(name) => match name.to_ascii_uppercase().as_str() {
                "A" => Ok(GAMUT_A),
                "B" => Ok(GAMUT_B),
                "C" => Ok(GAMUT_C),
                other => Err(Error::Config(format!("unknown gamut preset \"{other}\""))),
            },
            GamutConfig::Corners { red, green, blue } => Gamut::new(
                Point2::from(*red),
                Point2::from(*green),
                Point2::from(*blue),
            ),
        }
    }
}

impl Config {
    /// Load config from the default config file path, or return defaults if not found.
    pub fn load() -> Self {
        let config_path = config_file_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {config_path}");
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {config_path}: {e}. Using defaults.");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found at {config_path}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Unlike `load`, a missing or broken
    /// file is an error.
    pub fn load_from(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{path}: {e}")))?;
        log::info!("Loaded config from {path}");
        Ok(config)
    }

    /// Build the profile for light `id`, applying any gamut override.
    pub fn profile_for(&self, id: &str) -> Result<FixtureProfile> {
        let gamut = self
            .light_gamuts
            .get(id)
            .unwrap_or(&self.defaults.gamut)
            .gamut()?;
        Ok(FixtureProfile {
            gamut,
            gamma_correct: self.defaults.gamma_correct,
            default_transition_time: self.defaults.transition_time,
            ..FixtureProfile::hue(gamut)
        })
    }
}

fn config_file_path() -> String {
    if let Ok(path) = std::env::var("HUE_LAMP_CONFIG") {
        path
    } else {
        "hue_lamp.toml".into()
    }
}
