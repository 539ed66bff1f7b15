//! Structured trace of connection changes during a lay

use crate::grid::HexCoord;
use crate::tile::PathId;

use super::connection::ConnectionId;

/// One change to the connection graph, in the order it happened
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A new run started dangling from a terminal or map edge
    Created {
        connection: ConnectionId,
        hex: HexCoord,
    },
    /// An existing run gained a path
    Extended {
        connection: ConnectionId,
        path: PathId,
    },
    /// Two runs met across a shared boundary and were unioned
    Merged {
        left: ConnectionId,
        right: ConnectionId,
        into: ConnectionId,
        hex: HexCoord,
    },
    /// A revisited hex forked a sibling run
    Branched {
        original: ConnectionId,
        branch: ConnectionId,
        hex: HexCoord,
    },
    /// A replaced tile's paths were stripped from a run
    Disconnected {
        connection: ConnectionId,
        hex: HexCoord,
        removed_paths: usize,
    },
}
