pub mod error;
pub mod types;

pub use error::{RailError, Result};
pub use types::CorporationId;
