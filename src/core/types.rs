//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for corporations (the companies that place tokens
/// and run trains)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorporationId(pub u32);

impl CorporationId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}
