//! The connection graph: hexes, maximal track runs, and the lay protocol

pub mod connection;
pub mod events;
pub mod hex;
mod layable;
pub mod map;

pub use connection::{Connection, ConnectionId};
pub use events::NetworkEvent;
pub use hex::Hex;
pub use map::{LayOutcome, TrackMap};
