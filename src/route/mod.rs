//! Simplified route and revenue layer
//!
//! A route is a chain of finished connections a train runs over. Scoring
//! here is flat node revenue; phase and bonus rules belong to the game
//! layer above this crate.

use serde::{Deserialize, Serialize};

use crate::core::error::{RailError, Result};
use crate::network::{ConnectionId, TrackMap};
use crate::tile::{NodeId, PathId};

/// A train with a stop capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub distance: usize,
}

impl Train {
    pub fn new(distance: usize) -> Self {
        Self { distance }
    }
}

/// A chain of connections a train runs over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub connections: Vec<ConnectionId>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&mut self, id: ConnectionId) {
        self.connections.push(id);
    }

    pub fn reset(&mut self) {
        self.connections.clear();
    }

    /// De-duplicated stops across the whole chain, in traversal order.
    /// Connections no longer in the arena contribute nothing.
    pub fn stops(&self, map: &TrackMap) -> Vec<NodeId> {
        let mut stops = Vec::new();
        for &id in &self.connections {
            let Some(connection) = map.connection(id) else {
                continue;
            };
            for node in connection.stops(map) {
                if !stops.contains(&node) {
                    stops.push(node);
                }
            }
        }
        stops
    }

    /// The subset of `paths` this route actually runs over, in route order
    pub fn paths_for(&self, map: &TrackMap, paths: &[PathId]) -> Vec<PathId> {
        let mut used = Vec::new();
        for &id in &self.connections {
            let Some(connection) = map.connection(id) else {
                continue;
            };
            for path in &connection.paths {
                if paths.contains(path) && !used.contains(path) {
                    used.push(*path);
                }
            }
        }
        used
    }

    /// Total revenue of the chain's stops, after validating the stop count
    /// against the train
    pub fn revenue(&self, map: &TrackMap, train: &Train) -> Result<u32> {
        let stops = self.stops(map);
        if stops.len() < 2 {
            return Err(RailError::RouteTooShort { stops: stops.len() });
        }
        if stops.len() > train.distance {
            return Err(RailError::RouteTooLong {
                stops: stops.len(),
                distance: train.distance,
            });
        }
        Ok(stops
            .iter()
            .filter_map(|&node| map.node(node))
            .map(|node| node.revenue())
            .sum())
    }
}
