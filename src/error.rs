/// Crate-wide error type.

use crate::geometry::Point2;
use crate::transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Gamut corners lie on one line, so containment is undefined.
    #[error("Degenerate gamut: corners {red}, {green}, {blue} are collinear")]
    DegenerateGamut {
        red: Point2,
        green: Point2,
        blue: Point2,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bridge credentials: {0}")]
    Credentials(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True if the lamp refused the command because it is switched off.
    pub fn is_powered_off(&self) -> bool {
        matches!(self, Error::Transport(TransportError::PoweredOff { .. }))
    }
}
