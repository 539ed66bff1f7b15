//! Tile surface: the printed track layouts that occupy hexes

pub mod node;
pub mod path;

use serde::{Deserialize, Serialize};

use crate::grid::Edge;

pub use node::{City, Node, NodeId, Offboard, Token, Town};
pub use path::{PathId, TrackPath};

/// Unique identifier for a laid tile instance.
///
/// Minted by the map when the tile lands on a hex. Two lays of the same
/// printed layout get distinct ids, so path and node addresses never
/// collide across an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// A printed track layout occupying one hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub name: String,
    pub paths: Vec<TrackPath>,
    pub nodes: Vec<Node>,
    pub location_name: Option<String>,
}

impl Tile {
    /// A tile awaiting placement. The id is provisional until the map
    /// stamps a real one at lay time.
    pub fn new(name: impl Into<String>, paths: Vec<TrackPath>, nodes: Vec<Node>) -> Self {
        Self {
            id: TileId(0),
            name: name.into(),
            paths,
            nodes,
            location_name: None,
        }
    }

    /// A tile with no printed track
    pub fn blank() -> Self {
        Self::new("blank", Vec::new(), Vec::new())
    }

    /// The same layout turned clockwise by `turns` sixths of a rotation
    pub fn rotate(mut self, turns: u8) -> Self {
        for path in &mut self.paths {
            *path = path.rotated(turns);
        }
        self
    }

    /// Every edge touched by a printed path, in path order without
    /// duplicates
    pub fn exits(&self) -> Vec<Edge> {
        let mut exits = Vec::new();
        for path in &self.paths {
            for &edge in path.exits() {
                if !exits.contains(&edge) {
                    exits.push(edge);
                }
            }
        }
        exits
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Address of the node at `index`, valid once the tile is laid
    pub fn node_id(&self, index: usize) -> NodeId {
        NodeId {
            tile: self.id,
            index,
        }
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.nodes.iter().filter_map(Node::as_city)
    }

    pub fn cities_mut(&mut self) -> impl Iterator<Item = &mut City> {
        self.nodes.iter_mut().filter_map(Node::as_city_mut)
    }

    /// The `index`-th city, counting cities only
    pub fn city(&self, index: usize) -> Option<&City> {
        self.cities().nth(index)
    }

    pub fn city_mut(&mut self, index: usize) -> Option<&mut City> {
        self.cities_mut().nth(index)
    }
}
