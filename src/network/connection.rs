//! Connections: maximal contiguous runs of track

use serde::{Deserialize, Serialize};

use crate::core::types::CorporationId;
use crate::grid::HexCoord;
use crate::tile::{NodeId, PathId};

use super::map::TrackMap;

/// Handle into the map's connection arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// A maximal run of track with up to two terminal endpoints.
///
/// A run missing an endpoint is dangling: it reached a map edge or an empty
/// hex and can still grow. Paths are kept in discovery order, so walking
/// them visits hexes the way track was laid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub node_a: Option<NodeId>,
    pub node_b: Option<NodeId>,
    pub paths: Vec<PathId>,
}

impl Connection {
    pub fn new(node_a: Option<NodeId>, node_b: Option<NodeId>, paths: Vec<PathId>) -> Self {
        Self {
            node_a,
            node_b,
            paths,
        }
    }

    /// True when both endpoints are terminated
    pub fn closed(&self) -> bool {
        self.node_a.is_some() && self.node_b.is_some()
    }

    /// Hexes touched by this run, in path order
    pub fn hexes(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.paths.iter().map(|path| path.hex)
    }

    /// Sibling run where every path on `fork.hex` is replaced by `fork`.
    ///
    /// Used when a multi-path tile lands on a hex the run already crosses:
    /// the original keeps its old way through, the sibling takes the new
    /// one.
    pub fn branch(&self, fork: PathId) -> Connection {
        let mut paths: Vec<PathId> = self
            .paths
            .iter()
            .copied()
            .filter(|path| path.hex != fork.hex)
            .collect();
        paths.push(fork);
        Connection {
            node_a: self.node_a,
            node_b: self.node_b,
            paths,
        }
    }

    /// Terminate the first open endpoint slot
    pub(crate) fn attach_node(&mut self, node: NodeId) {
        if self.node_a.is_none() {
            self.node_a = Some(node);
        } else {
            self.node_b = Some(node);
        }
    }

    /// De-duplicated terminal nodes along this run, in path order
    pub fn stops(&self, map: &TrackMap) -> Vec<NodeId> {
        let mut stops = Vec::new();
        for &path in &self.paths {
            if let Some(node) = map.path_node(path) {
                if !stops.contains(&node) {
                    stops.push(node);
                }
            }
        }
        stops
    }

    /// True if either endpoint is a city holding the corporation's token
    pub fn tokened_by(&self, map: &TrackMap, corporation: CorporationId) -> bool {
        [self.node_a, self.node_b]
            .into_iter()
            .flatten()
            .any(|node| {
                map.node(node)
                    .is_some_and(|node| node.tokened_by(corporation))
            })
    }
}
