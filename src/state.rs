/// Last-known lamp state, tracked optimistically from the commands we send.
///
/// Two ways in:
///   replace → authoritative snapshot from the bridge (open, resync)
///   merge   → fields of a command the bridge just accepted

use crate::command::Command;
use crate::geometry::Point2;
use serde::Deserialize;

/// Which control channel last determined the lamp's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ColorMode {
    Xy,
    Ct,
    /// Hue/saturation, or a lamp that reports no color mode at all.
    Other,
}

impl From<String> for ColorMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "xy" => ColorMode::Xy,
            "ct" => ColorMode::Ct,
            _ => ColorMode::Other,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Xy => f.write_str("xy"),
            ColorMode::Ct => f.write_str("ct"),
            ColorMode::Other => f.write_str("other"),
        }
    }
}

/// Bridge response for a single light.
#[derive(Debug, Clone, Deserialize)]
pub struct LightInfo {
    pub name: String,
    pub state: LightSnapshot,
}

/// The `state` object of a light. White-only and on/off lamps omit the
/// color fields, so everything but `on` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct LightSnapshot {
    pub on: bool,
    #[serde(default)]
    pub bri: Option<u8>,
    #[serde(default)]
    pub xy: Option<Point2>,
    #[serde(default)]
    pub ct: Option<u16>,
    #[serde(default)]
    pub colormode: Option<ColorMode>,
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

fn default_reachable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureState {
    pub on: bool,
    pub brightness: u8,
    pub chromaticity: Point2,
    /// Mireds.
    pub color_temperature: u16,
    pub color_mode: ColorMode,
    /// Configured default fade, deciseconds.
    pub transition_time: u16,
}

impl FixtureState {
    pub fn from_snapshot(snapshot: &LightSnapshot, transition_time: u16) -> Self {
        let mut state = Self {
            on: false,
            brightness: 0,
            chromaticity: Point2::default(),
            color_temperature: 0,
            color_mode: ColorMode::Other,
            transition_time,
        };
        state.replace(snapshot);
        state
    }

    /// Overwrite everything the bridge reported. The configured transition
    /// time is ours, not the lamp's, and is kept.
    pub fn replace(&mut self, snapshot: &LightSnapshot) {
        self.on = snapshot.on;
        self.brightness = snapshot.bri.unwrap_or(0);
        self.chromaticity = snapshot.xy.unwrap_or_default();
        self.color_temperature = snapshot.ct.unwrap_or(0);
        self.color_mode = snapshot.colormode.unwrap_or(ColorMode::Other);
    }

    /// Apply the fields of an accepted command.
    pub fn merge(&mut self, sent: &Command, color_mode: ColorMode) {
        if let Some(on) = sent.on {
            self.on = on;
        }
        if let Some(bri) = sent.bri {
            self.brightness = bri;
        }
        if let Some(xy) = sent.xy {
            self.chromaticity = xy;
        }
        if let Some(ct) = sent.ct {
            self.color_temperature = ct;
        }
        self.color_mode = color_mode;
    }
}
