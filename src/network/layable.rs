//! Reachability sweep over the connection graph

use ahash::{AHashMap, AHashSet};

use crate::grid::{invert, Edge, HexCoord};
use crate::tile::PathId;

use super::connection::ConnectionId;
use super::map::TrackMap;

impl TrackMap {
    /// Hexes reachable from the seed runs, with the edges track can use.
    ///
    /// A hex carrying explored track reports every exit of its explored
    /// paths. A neighbor with nothing registered on the facing side of a
    /// shared boundary reports just that boundary edge, marking an open
    /// placement. The sweep fans out through every run touching an explored
    /// hex; each run and path is walked once, so loops terminate. Unknown
    /// seed ids are skipped, and hexes never reached are absent from the
    /// result.
    pub fn layable_hexes(&self, seeds: &[ConnectionId]) -> AHashMap<HexCoord, Vec<Edge>> {
        let mut reachable: AHashMap<HexCoord, Vec<Edge>> = AHashMap::new();
        let mut seen_runs: AHashSet<ConnectionId> = AHashSet::new();
        let mut seen_paths: AHashSet<PathId> = AHashSet::new();
        let mut queue: Vec<ConnectionId> = Vec::new();

        for &seed in seeds {
            if self.connection(seed).is_some() && seen_runs.insert(seed) {
                queue.push(seed);
            }
        }

        while let Some(run) = queue.pop() {
            let Some(connection) = self.connection(run) else {
                continue;
            };

            for &path in &connection.paths {
                if !seen_paths.insert(path) {
                    continue;
                }
                let Some(track) = self.path(path) else {
                    continue;
                };

                let edges = reachable.entry(path.hex).or_default();
                for &exit in track.exits() {
                    if !edges.contains(&exit) {
                        edges.push(exit);
                    }
                }

                for &exit in track.exits() {
                    let Some(neighbor) = self.hex(path.hex).and_then(|hex| hex.neighbor(exit))
                    else {
                        continue;
                    };
                    let opposing = invert(exit);
                    let open = self
                        .hex(neighbor)
                        .is_some_and(|hex| hex.connections_at(opposing).is_empty());
                    if open {
                        let edges = reachable.entry(neighbor).or_default();
                        if !edges.contains(&opposing) {
                            edges.push(opposing);
                        }
                    }
                }
            }

            // Fan out to every run sharing a hex with this one.
            for coord in connection.hexes() {
                let Some(hex) = self.hex(coord) else {
                    continue;
                };
                for adjacent in hex.all_connections() {
                    if self.connection(adjacent).is_some() && seen_runs.insert(adjacent) {
                        queue.push(adjacent);
                    }
                }
            }
        }

        reachable
    }
}
