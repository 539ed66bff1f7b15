//! Railnet - incremental track-network connectivity for hex-tile rail games

pub mod core;
pub mod grid;
pub mod network;
pub mod route;
pub mod tile;
