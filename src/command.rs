/// Lamp command payload: the subset of state keys a single PUT may carry.

use crate::geometry::Point2;
use serde::Serialize;

/// A state change request. `None` fields are left alone by the lamp and are
/// omitted from the JSON body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Command {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xy: Option<Point2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    /// Deciseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transitiontime: Option<u16>,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    pub fn with_bri(mut self, bri: u8) -> Self {
        self.bri = Some(bri);
        self
    }

    pub fn with_xy(mut self, xy: Point2) -> Self {
        self.xy = Some(xy);
        self
    }

    pub fn with_ct(mut self, ct: u16) -> Self {
        self.ct = Some(ct);
        self
    }

    pub fn with_transition_time(mut self, deciseconds: Option<u16>) -> Self {
        self.transitiontime = deciseconds;
        self
    }

    /// True if the command changes anything. `transitiontime` alone does not.
    pub fn is_effective(&self) -> bool {
        self.on.is_some() || self.bri.is_some() || self.xy.is_some() || self.ct.is_some()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
