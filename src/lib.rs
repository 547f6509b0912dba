//! Drive Hue lamps with as little traffic as possible.
//!
//! Colors are converted into each lamp's reachable gamut, and every request is
//! filtered against the lamp's last known state so only the fields that
//! actually change go over the wire.

pub mod bridge;
pub mod coalesce;
pub mod command;
pub mod config;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod fixture;
pub mod geometry;
pub mod profile;
pub mod state;
pub mod transport;

pub use bridge::Bridge;
pub use command::Command;
pub use convert::{ColorSample, Rgb, convert};
pub use error::{Error, Result};
pub use fixture::Fixture;
pub use geometry::{GAMUT_A, GAMUT_B, GAMUT_C, Gamut, Point2};
pub use profile::{CtRange, FixtureProfile};
pub use state::{ColorMode, FixtureState};
pub use transport::{Transport, TransportError};
