/// The seam between fixture logic and whatever carries commands to the lamp.

use crate::command::Command;
use crate::state::LightInfo;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The lamp rejected a state change because it is switched off.
    #[error("Light {fixture} is switched off")]
    PoweredOff { fixture: String },

    /// Any other error object returned by the bridge.
    #[error("Bridge error {kind} at {address}: {description}")]
    Bridge {
        kind: u16,
        address: String,
        description: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Malformed bridge response: {0}")]
    Decode(String),
}

/// Query and command access to lamps, addressed by bridge light id.
///
/// Calls block until the bridge answers.
pub trait Transport {
    fn query(&self, fixture: &str) -> Result<LightInfo, TransportError>;

    fn send(&self, fixture: &str, command: &Command) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn query(&self, fixture: &str) -> Result<LightInfo, TransportError> {
        (**self).query(fixture)
    }

    fn send(&self, fixture: &str, command: &Command) -> Result<(), TransportError> {
        (**self).send(fixture, command)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn query(&self, fixture: &str) -> Result<LightInfo, TransportError> {
        (**self).query(fixture)
    }

    fn send(&self, fixture: &str, command: &Command) -> Result<(), TransportError> {
        (**self).send(fixture, command)
    }
}
