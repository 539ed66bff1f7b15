//! One cell of the hex map

use crate::grid::{Edge, HexCoord, EDGE_COUNT};
use crate::tile::Tile;

use super::connection::ConnectionId;

/// A map cell holding exactly one tile at a time.
///
/// Each edge carries the ids of every connection whose track crosses or
/// dead-ends at that boundary. Neighbor slots stay `None` at map borders.
#[derive(Debug, Clone)]
pub struct Hex {
    coord: HexCoord,
    location_name: Option<String>,
    tile: Tile,
    neighbors: [Option<HexCoord>; EDGE_COUNT],
    connections: [Vec<ConnectionId>; EDGE_COUNT],
}

impl Hex {
    pub(crate) fn new(coord: HexCoord, mut tile: Tile, location_name: Option<String>) -> Self {
        tile.location_name = location_name.clone();
        Self {
            coord,
            location_name,
            tile,
            neighbors: [None; EDGE_COUNT],
            connections: std::array::from_fn(|_| Vec::new()),
        }
    }

    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location_name.as_deref()
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub(crate) fn tile_mut(&mut self) -> &mut Tile {
        &mut self.tile
    }

    pub(crate) fn swap_tile(&mut self, tile: Tile) -> Tile {
        std::mem::replace(&mut self.tile, tile)
    }

    pub fn neighbor(&self, edge: Edge) -> Option<HexCoord> {
        self.neighbors[edge as usize]
    }

    pub fn neighbors(&self) -> &[Option<HexCoord>; EDGE_COUNT] {
        &self.neighbors
    }

    pub(crate) fn set_neighbor(&mut self, edge: Edge, coord: HexCoord) {
        self.neighbors[edge as usize] = Some(coord);
    }

    /// Connections registered at one edge
    pub fn connections_at(&self, edge: Edge) -> &[ConnectionId] {
        &self.connections[edge as usize]
    }

    pub fn connections(&self) -> &[Vec<ConnectionId>; EDGE_COUNT] {
        &self.connections
    }

    /// Every connection touching this hex. A run registered on two edges
    /// appears once per edge.
    pub fn all_connections(&self) -> Vec<ConnectionId> {
        self.connections.iter().flatten().copied().collect()
    }

    pub(crate) fn push_connection(&mut self, edge: Edge, id: ConnectionId) {
        self.connections[edge as usize].push(id);
    }

    pub(crate) fn clear_edge(&mut self, edge: Edge) {
        self.connections[edge as usize].clear();
    }

    pub(crate) fn clear_all_edges(&mut self) {
        for edge in &mut self.connections {
            edge.clear();
        }
    }
}
