//! The track map: hex grid plus a connection arena
//!
//! Connections live in one arena keyed by id, and hexes refer to them by id
//! from their edge lists. A run spanning five hexes is a single arena entry
//! that every touched hex points at, so growing it is one write.
//!
//! Laying a tile is a fixed sequence: carry tokens and reservations onto
//! the incoming tile, strip the outgoing tile's paths from every touching
//! run, swap tiles, grow the graph outward from the new printed paths, and
//! reap runs no hex references anymore.

use ahash::{AHashMap, AHashSet};

use crate::core::error::{RailError, Result};
use crate::grid::{invert, Edge, HexCoord, Layout, EDGE_COUNT};
use crate::tile::{Node, NodeId, PathId, Tile, TileId, TrackPath};

use super::connection::{Connection, ConnectionId};
use super::events::NetworkEvent;
use super::hex::Hex;

/// What a lay did: the tile that came off the hex plus the graph changes
#[derive(Debug, Clone)]
pub struct LayOutcome {
    pub replaced: Tile,
    pub events: Vec<NetworkEvent>,
}

/// The hex map and its connection graph
#[derive(Debug, Clone)]
pub struct TrackMap {
    layout: Layout,
    hexes: AHashMap<HexCoord, Hex>,
    connections: AHashMap<ConnectionId, Connection>,
    tile_index: AHashMap<TileId, HexCoord>,
    next_connection: u64,
    next_tile: u32,
}

impl TrackMap {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            hexes: AHashMap::new(),
            connections: AHashMap::new(),
            tile_index: AHashMap::new(),
            next_connection: 0,
            next_tile: 0,
        }
    }

    /// Add a cell to the grid, wiring neighbor links in both directions.
    /// Returns false when the coordinate is already occupied.
    pub fn add_hex(
        &mut self,
        coord: HexCoord,
        mut tile: Tile,
        location_name: Option<&str>,
    ) -> bool {
        if self.hexes.contains_key(&coord) {
            return false;
        }
        tile.id = self.mint_tile_id();
        self.tile_index.insert(tile.id, coord);

        let mut hex = Hex::new(coord, tile, location_name.map(str::to_string));
        for edge in 0..EDGE_COUNT as Edge {
            let adjacent = coord.neighbor(self.layout, edge);
            if let Some(other) = self.hexes.get_mut(&adjacent) {
                hex.set_neighbor(edge, adjacent);
                other.set_neighbor(invert(edge), coord);
            }
        }
        self.hexes.insert(coord, hex);
        true
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn hex(&self, coord: HexCoord) -> Option<&Hex> {
        self.hexes.get(&coord)
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.hexes.get(&coord).map(Hex::tile)
    }

    pub fn tile_mut(&mut self, coord: HexCoord) -> Option<&mut Tile> {
        self.hexes.get_mut(&coord).map(Hex::tile_mut)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.connections
            .iter()
            .map(|(&id, connection)| (id, connection))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Resolve a node address against the tile that printed it. Addresses
    /// from replaced tiles give None.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let coord = self.tile_index.get(&id.tile)?;
        let tile = self.hexes.get(coord)?.tile();
        if tile.id != id.tile {
            return None;
        }
        tile.node(id.index)
    }

    /// Resolve a path address. Addresses from replaced tiles give None.
    pub fn path(&self, id: PathId) -> Option<TrackPath> {
        let tile = self.hexes.get(&id.hex)?.tile();
        if tile.id != id.tile {
            return None;
        }
        tile.paths.get(id.index).copied()
    }

    /// Terminal node address at the end of a path, if it has one
    pub(crate) fn path_node(&self, id: PathId) -> Option<NodeId> {
        self.path(id)?.node_index().map(|index| NodeId {
            tile: id.tile,
            index,
        })
    }

    /// True when some single run touches both hexes
    pub fn connected(&self, a: HexCoord, b: HexCoord) -> bool {
        let Some(hex) = self.hexes.get(&a) else {
            return false;
        };
        hex.all_connections().iter().any(|id| {
            self.connections
                .get(id)
                .is_some_and(|connection| connection.hexes().any(|hex| hex == b))
        })
    }

    /// True when `a`'s tile prints an exit on the edge facing `b`
    pub fn targeting(&self, a: HexCoord, b: HexCoord) -> bool {
        let Some(hex) = self.hexes.get(&a) else {
            return false;
        };
        match a.direction_to(&b, self.layout) {
            Some(edge) => hex.tile().exits().contains(&edge),
            None => false,
        }
    }

    /// Lay `tile` on the hex at `coord`, rebuilding the connection graph
    /// around it. Returns the replaced tile and the trace of graph changes.
    pub fn lay(&mut self, coord: HexCoord, mut tile: Tile) -> Result<LayOutcome> {
        if !self.hexes.contains_key(&coord) {
            return Err(RailError::UnknownHex(coord.label()));
        }
        tile.id = self.mint_tile_id();

        let mut events = Vec::new();
        self.carry_tokens(coord, &mut tile);
        self.disconnect(coord, &mut events);

        let Some(hex) = self.hexes.get_mut(&coord) else {
            return Err(RailError::UnknownHex(coord.label()));
        };
        tile.location_name = hex.location_name().map(str::to_string);
        let mut replaced = hex.swap_tile(tile);
        replaced.location_name = None;
        let incoming = hex.tile().id;
        self.tile_index.remove(&replaced.id);
        self.tile_index.insert(incoming, coord);

        self.connect(coord, None, &mut events);
        self.sweep_orphans();

        Ok(LayOutcome { replaced, events })
    }

    /// Move tokens and reservations from the hex's current cities onto the
    /// incoming tile, pairing cities by index
    fn carry_tokens(&mut self, coord: HexCoord, incoming: &mut Tile) {
        let Some(hex) = self.hexes.get_mut(&coord) else {
            return;
        };
        let outgoing = hex.tile_mut();
        for (old_city, new_city) in outgoing.cities_mut().zip(incoming.cities_mut()) {
            new_city.reservations = old_city.reservations.clone();
            for token in old_city.tokens.iter().flatten() {
                if new_city.exchange_token(*token).is_err() {
                    tracing::debug!("no slot for {:?} token at {}", token.corporation, coord);
                }
            }
            old_city.remove_tokens();
            old_city.reservations.clear();
        }
    }

    /// Strip the current tile's paths out of every run touching this hex,
    /// demoting endpoints that lived on that tile
    fn disconnect(&mut self, coord: HexCoord, events: &mut Vec<NetworkEvent>) {
        let Some(hex) = self.hexes.get(&coord) else {
            return;
        };
        let outgoing = hex.tile().id;
        let touching = hex.all_connections();
        if !touching.is_empty() {
            tracing::debug!("disconnecting {} run entries at {}", touching.len(), coord);
        }
        for id in touching {
            let Some(connection) = self.connections.get_mut(&id) else {
                continue;
            };
            let before = connection.paths.len();
            connection.paths.retain(|path| path.tile != outgoing);
            if connection.node_a.is_some_and(|node| node.tile == outgoing) {
                connection.node_a = connection.node_b.take();
            } else if connection.node_b.is_some_and(|node| node.tile == outgoing) {
                connection.node_b = None;
            }
            let removed = before - connection.paths.len();
            if removed > 0 {
                events.push(NetworkEvent::Disconnected {
                    connection: id,
                    hex: coord,
                    removed_paths: removed,
                });
            }
        }
        // Stale entries here would double-register the surviving runs when
        // an identical layout is laid again.
        if let Some(hex) = self.hexes.get_mut(&coord) {
            hex.clear_all_edges();
        }
    }

    /// Grow the graph from the hex's printed paths. With `through` set,
    /// only paths exiting that edge are walked (re-entry from a neighbor).
    fn connect(&mut self, coord: HexCoord, through: Option<Edge>, events: &mut Vec<NetworkEvent>) {
        let Some(hex) = self.hexes.get(&coord) else {
            return;
        };
        let tile = hex.tile();
        let stamped = tile.id;
        let selected: Vec<(PathId, TrackPath)> = tile
            .paths
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, path)| through.map_or(true, |edge| path.exits().contains(&edge)))
            .map(|(index, path)| {
                let id = PathId {
                    hex: coord,
                    tile: stamped,
                    index,
                };
                (id, path)
            })
            .collect();

        for (id, path) in selected {
            match path {
                TrackPath::Terminal { exit, node } => {
                    self.connect_node(coord, id, exit, node, events)
                }
                TrackPath::Through { exits } => self.connect_edge(coord, id, exits, events),
            }
        }
    }

    /// Walk a terminal path outward: adopt the runs waiting across the
    /// exit, or start a new dangling run and keep walking into the neighbor
    fn connect_node(
        &mut self,
        coord: HexCoord,
        id: PathId,
        exit: Edge,
        node_index: usize,
        events: &mut Vec<NetworkEvent>,
    ) {
        let node = NodeId {
            tile: id.tile,
            index: node_index,
        };
        let Some(neighbor) = self.hexes.get(&coord).and_then(|hex| hex.neighbor(exit)) else {
            // Map border: the run starts here and dangles.
            let run = self.insert_connection(Connection::new(Some(node), None, vec![id]));
            self.register(coord, exit, run);
            events.push(NetworkEvent::Created {
                connection: run,
                hex: coord,
            });
            return;
        };

        let opposing = invert(exit);
        let waiting: Vec<ConnectionId> = self
            .hexes
            .get(&neighbor)
            .map(|hex| hex.connections_at(opposing).to_vec())
            .unwrap_or_default();

        if waiting.is_empty() {
            let run = self.insert_connection(Connection::new(Some(node), None, vec![id]));
            self.register(coord, exit, run);
            events.push(NetworkEvent::Created {
                connection: run,
                hex: coord,
            });
            self.connect(neighbor, Some(opposing), events);
        } else {
            for run in waiting {
                if let Some(connection) = self.connections.get_mut(&run) {
                    connection.attach_node(node);
                    connection.paths.push(id);
                }
                self.register(coord, exit, run);
                events.push(NetworkEvent::Extended {
                    connection: run,
                    path: id,
                });
            }
        }
    }

    /// Walk a through path: union the runs waiting on both sides, extend
    /// the side that exists, or do nothing on an isolated lay
    fn connect_edge(
        &mut self,
        coord: HexCoord,
        id: PathId,
        exits: [Edge; 2],
        events: &mut Vec<NetworkEvent>,
    ) {
        let [edge_a, edge_b] = exits;
        let (side_a, side_b) = {
            let Some(hex) = self.hexes.get(&coord) else {
                return;
            };
            let waiting = |edge: Edge| -> Vec<ConnectionId> {
                hex.neighbor(edge)
                    .and_then(|neighbor| self.hexes.get(&neighbor))
                    .map(|neighbor| neighbor.connections_at(invert(edge)).to_vec())
                    .unwrap_or_default()
            };
            (waiting(edge_a), waiting(edge_b))
        };

        let merged: Vec<ConnectionId> = if !side_a.is_empty() && !side_b.is_empty() {
            tracing::debug!(
                "merging {}x{} runs across {} at {}",
                side_a.len(),
                side_b.len(),
                edge_a,
                coord
            );
            let mut products = Vec::new();
            for &left_id in &side_a {
                for &right_id in &side_b {
                    let (Some(left), Some(right)) = (
                        self.connections.get(&left_id),
                        self.connections.get(&right_id),
                    ) else {
                        continue;
                    };
                    let mut paths = left.paths.clone();
                    for &path in &right.paths {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                    let product =
                        Connection::new(left.node_a, right.node_b.or(right.node_a), paths);
                    let product_id = self.insert_connection(product);
                    events.push(NetworkEvent::Merged {
                        left: left_id,
                        right: right_id,
                        into: product_id,
                        hex: coord,
                    });
                    products.push(product_id);
                }
            }
            products
        } else {
            let mut runs = side_a;
            runs.extend(side_b);
            runs
        };

        // Clear pass: vacate every edge registration held by the merged
        // runs' paths. Superseded originals go with them.
        let mut stale: Vec<(HexCoord, Edge)> = Vec::new();
        for &run in &merged {
            let Some(connection) = self.connections.get(&run) else {
                continue;
            };
            for &path in &connection.paths {
                if let Some(track) = self.path(path) {
                    for &exit in track.exits() {
                        stale.push((path.hex, exit));
                    }
                }
            }
        }
        for (hex, edge) in stale {
            self.clear_edge(hex, edge);
        }

        // Branch-or-extend pass: a run already through this hex forks into
        // a sibling taking the new path; everything else absorbs it.
        let mut resulting: Vec<ConnectionId> = Vec::new();
        for run in merged {
            let Some(connection) = self.connections.get(&run) else {
                continue;
            };
            if connection.hexes().any(|hex| hex == coord) {
                let sibling = connection.branch(id);
                let sibling_id = self.insert_connection(sibling);
                tracing::debug!("branched run {} into {} at {}", run.0, sibling_id.0, coord);
                events.push(NetworkEvent::Branched {
                    original: run,
                    branch: sibling_id,
                    hex: coord,
                });
                resulting.push(run);
                resulting.push(sibling_id);
            } else {
                if let Some(connection) = self.connections.get_mut(&run) {
                    connection.paths.push(id);
                }
                events.push(NetworkEvent::Extended {
                    connection: run,
                    path: id,
                });
                resulting.push(run);
            }
        }

        // Register pass: every resulting run lands on every exit of every
        // path it now carries.
        let mut registrations: Vec<(HexCoord, Edge, ConnectionId)> = Vec::new();
        for &run in &resulting {
            let Some(connection) = self.connections.get(&run) else {
                continue;
            };
            for &path in &connection.paths {
                if let Some(track) = self.path(path) {
                    for &exit in track.exits() {
                        registrations.push((path.hex, exit, run));
                    }
                }
            }
        }
        for (hex, edge, run) in registrations {
            self.register(hex, edge, run);
        }
    }

    fn register(&mut self, coord: HexCoord, edge: Edge, id: ConnectionId) {
        if let Some(hex) = self.hexes.get_mut(&coord) {
            hex.push_connection(edge, id);
        }
    }

    fn clear_edge(&mut self, coord: HexCoord, edge: Edge) {
        if let Some(hex) = self.hexes.get_mut(&coord) {
            hex.clear_edge(edge);
        }
    }

    fn insert_connection(&mut self, connection: Connection) -> ConnectionId {
        self.next_connection += 1;
        let id = ConnectionId(self.next_connection);
        self.connections.insert(id, connection);
        id
    }

    fn mint_tile_id(&mut self) -> TileId {
        self.next_tile += 1;
        TileId(self.next_tile)
    }

    /// Drop every run no hex references anymore
    fn sweep_orphans(&mut self) {
        let mut live: AHashSet<ConnectionId> = AHashSet::with_capacity(self.connections.len());
        for hex in self.hexes.values() {
            for edge in hex.connections() {
                live.extend(edge.iter().copied());
            }
        }
        let before = self.connections.len();
        self.connections.retain(|id, _| live.contains(id));
        let reaped = before - self.connections.len();
        if reaped > 0 {
            tracing::debug!("reaped {} orphaned runs", reaped);
        }
    }
}
