use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RailError {
    #[error("Hex not on the map: {0}")]
    UnknownHex(String),

    #[error("Invalid hex coordinate: {0}")]
    BadCoordinate(String),

    #[error("No token slot available")]
    NoTokenSlot,

    #[error("Route must have at least 2 stops, found {stops}")]
    RouteTooShort { stops: usize },

    #[error("{stops} is too many stops for a {distance} train")]
    RouteTooLong { stops: usize, distance: usize },
}

pub type Result<T> = std::result::Result<T, RailError>;
