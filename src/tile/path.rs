//! Printed track paths and laid-path addressing

use serde::{Deserialize, Serialize};

use crate::grid::{Edge, HexCoord};

use super::TileId;

/// One piece of printed track on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackPath {
    /// Runs from one edge to a terminal node printed on the same tile
    Terminal { exit: Edge, node: usize },
    /// Crosses the tile between two edges without stopping
    Through { exits: [Edge; 2] },
}

impl TrackPath {
    /// Edges this path touches
    pub fn exits(&self) -> &[Edge] {
        match self {
            Self::Terminal { exit, .. } => std::slice::from_ref(exit),
            Self::Through { exits } => exits,
        }
    }

    /// Index of the terminal node, if the path ends at one
    pub fn node_index(&self) -> Option<usize> {
        match self {
            Self::Terminal { node, .. } => Some(*node),
            Self::Through { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    /// The same path turned clockwise by `turns` sixths of a rotation
    pub(crate) fn rotated(self, turns: u8) -> Self {
        let turns = turns % 6;
        match self {
            Self::Terminal { exit, node } => Self::Terminal {
                exit: (exit + turns) % 6,
                node,
            },
            Self::Through { exits: [a, b] } => Self::Through {
                exits: [(a + turns) % 6, (b + turns) % 6],
            },
        }
    }
}

/// Address of one laid path: the hex it sits on, the tile instance printing
/// it, and its index among that tile's paths.
///
/// The tile id pins the address to a particular lay. After an upgrade the
/// old tile's path ids no longer resolve, which is how stale graph entries
/// are told apart from live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathId {
    pub hex: HexCoord,
    pub tile: TileId,
    pub index: usize,
}
