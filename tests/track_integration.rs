//! Integration tests for the lay protocol
//!
//! These tests drive full lay sequences through the map and verify the
//! connection graph after each step:
//! - Dangling runs from freshly laid terminals
//! - Extension across boundaries and rotation mismatches
//! - Merging two networks into closed runs
//! - Idempotent re-lay of an identical tile
//! - Branching when an upgrade revisits a hex
//! - Token and reservation carry-over during upgrades
//! - Off-board discovery through preprinted track

use railnet::core::types::CorporationId;
use railnet::grid::{HexCoord, Layout};
use railnet::network::{ConnectionId, NetworkEvent, TrackMap};
use railnet::tile::{City, Node, Offboard, Tile, Token, TrackPath};

fn coord(label: &str) -> HexCoord {
    HexCoord::parse(label).unwrap()
}

fn blank_map(labels: &[&str]) -> TrackMap {
    let mut map = TrackMap::new(Layout::Flat);
    for label in labels {
        map.add_hex(coord(label), Tile::blank(), None);
    }
    map
}

fn city_tile(name: &str, revenue: u32, slots: usize, exits: &[u8]) -> Tile {
    let paths = exits
        .iter()
        .map(|&exit| TrackPath::Terminal { exit, node: 0 })
        .collect();
    Tile::new(name, paths, vec![Node::City(City::new(revenue, slots))])
}

fn straight(name: &str) -> Tile {
    Tile::new(name, vec![TrackPath::Through { exits: [0, 3] }], Vec::new())
}

/// Connection ids plus a stable rendering of the whole graph: every run's
/// endpoints and path positions, and every non-empty edge list
fn fingerprint(map: &TrackMap) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for (id, connection) in map.connections() {
        let span: Vec<String> = connection
            .paths
            .iter()
            .map(|path| format!("{}#{}", path.hex, path.index))
            .collect();
        lines.push(format!(
            "run {} {:?} {:?} [{}]",
            id.0,
            connection.node_a,
            connection.node_b,
            span.join(",")
        ));
    }
    for hex in map.hexes() {
        for (edge, ids) in hex.connections().iter().enumerate() {
            if !ids.is_empty() {
                let ids: Vec<String> = ids.iter().map(|id| id.0.to_string()).collect();
                lines.push(format!("edge {} {} [{}]", hex.coord(), edge, ids.join(",")));
            }
        }
    }
    lines.sort();
    lines
}

// ============================================================================
// Dangling Runs and Extension
// ============================================================================

/// A city tile laid on an interior hex starts one dangling run per printed
/// exit, including the exit that dead-ends at the map border
#[test]
fn test_city_tile_starts_dangling_runs() {
    let mut map = blank_map(&["A1", "A3"]);
    let outcome = map
        .lay(coord("A1"), city_tile("57", 20, 1, &[0, 3]))
        .unwrap();

    assert_eq!(map.connection_count(), 2, "one run per printed exit");
    for (_, connection) in map.connections() {
        assert!(!connection.closed(), "nothing to close against yet");
        assert!(connection.node_a.is_some(), "the city terminates each run");
        assert_eq!(connection.paths.len(), 1);
    }
    let created = outcome
        .events
        .iter()
        .filter(|event| matches!(event, NetworkEvent::Created { .. }))
        .count();
    assert_eq!(created, 2);
}

/// A pass-through tile laid across an existing dangling run extends that
/// same run instead of starting a new one
#[test]
fn test_straight_extends_a_dangling_run() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    let (original, _) = map.connections().next().unwrap();

    let outcome = map.lay(coord("A3"), straight("9")).unwrap();

    assert_eq!(map.connection_count(), 1, "still the same single run");
    let connection = map.connection(original).expect("the run survives the lay");
    assert_eq!(connection.paths.len(), 2);
    assert!(!connection.closed(), "the far end is still open");
    assert!(map.connected(coord("A1"), coord("A3")));
    assert!(outcome.events.iter().any(|event| matches!(
        event,
        NetworkEvent::Extended { connection, .. } if *connection == original
    )));
}

/// A single-exit city reaching over a diagonal boundary, then a pass tile
/// on the neighbor picking the run up at the inverted edge
#[test]
fn test_diagonal_exit_extends_across_the_boundary() {
    let mut map = blank_map(&["H7", "I8", "J9"]);
    map.lay(coord("H7"), city_tile("5", 20, 1, &[5])).unwrap();

    let waiting = map.hex(coord("H7")).unwrap().connections_at(5);
    assert_eq!(waiting.len(), 1);
    let id = waiting[0];
    let run = map.connection(id).unwrap();
    assert!(run.node_a.is_some(), "anchored on the city");
    assert!(run.node_b.is_none());
    assert_eq!(run.paths.len(), 1);
    let endpoints = (run.node_a, run.node_b);

    map.lay(
        coord("I8"),
        Tile::new("8", vec![TrackPath::Through { exits: [2, 5] }], Vec::new()),
    )
    .unwrap();

    let run = map.connection(id).expect("the same run was extended");
    assert_eq!(run.paths.len(), 2);
    assert_eq!((run.node_a, run.node_b), endpoints, "endpoints unchanged");
    assert!(map.connected(coord("H7"), coord("I8")));
}

/// A pass-through tile rotated away from the waiting run touches nothing
#[test]
fn test_wrong_rotation_does_not_connect() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();

    // Exits 1 and 4 miss the boundary with A1 entirely.
    map.lay(coord("A3"), straight("9").rotate(1)).unwrap();

    assert_eq!(map.connection_count(), 1, "only the city dangler exists");
    assert!(!map.connected(coord("A1"), coord("A3")));
}

// ============================================================================
// Merging
// ============================================================================

/// A straight laid between two dangling city runs unions them into one
/// closed run and the superseded danglers are reaped
#[test]
fn test_merge_closes_two_city_runs() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    map.lay(coord("A5"), city_tile("58", 30, 1, &[3])).unwrap();
    let originals: Vec<ConnectionId> = map.connections().map(|(id, _)| id).collect();
    assert_eq!(originals.len(), 2);

    let outcome = map.lay(coord("A3"), straight("9")).unwrap();

    assert_eq!(map.connection_count(), 1, "the product replaces both runs");
    let (merged, connection) = map.connections().next().unwrap();
    assert!(connection.closed());
    assert_eq!(connection.paths.len(), 3);
    assert!(!originals.contains(&merged), "the product is a fresh run");
    for original in &originals {
        assert!(
            map.connection(*original).is_none(),
            "superseded danglers are swept"
        );
    }

    let endpoints: Vec<_> = [connection.node_a, connection.node_b]
        .into_iter()
        .flatten()
        .map(|node| node.tile)
        .collect();
    assert!(endpoints.contains(&map.tile(coord("A1")).unwrap().id));
    assert!(endpoints.contains(&map.tile(coord("A5")).unwrap().id));

    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, NetworkEvent::Merged { .. })));
    assert!(map.connected(coord("A1"), coord("A5")));
}

// ============================================================================
// Re-lay and Upgrade
// ============================================================================

/// Replacing a tile with an identical layout leaves the graph exactly as
/// it was: same run ids, same endpoints, same edge registrations
#[test]
fn test_identical_relay_is_idempotent() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    map.lay(coord("A3"), straight("9")).unwrap();
    let before = fingerprint(&map);

    let outcome = map.lay(coord("A3"), straight("9")).unwrap();

    assert_eq!(fingerprint(&map), before);
    assert!(
        outcome
            .events
            .iter()
            .any(|event| matches!(event, NetworkEvent::Disconnected { .. })),
        "the old tile's path was stripped first"
    );
}

/// Re-laying the identical tile that merged two runs must not duplicate
/// the merged run: the closed run waiting on both sides folds into one
/// fresh product and the superseded one is swept
#[test]
fn test_merge_relay_does_not_duplicate_runs() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    map.lay(coord("A5"), city_tile("58", 30, 1, &[3])).unwrap();
    map.lay(coord("A3"), straight("9")).unwrap();
    assert_eq!(map.connection_count(), 1);

    let outcome = map.lay(coord("A3"), straight("9")).unwrap();

    assert_eq!(map.connection_count(), 1, "one product, no duplicates");
    let (merged, connection) = map.connections().next().unwrap();
    assert!(connection.closed());
    assert_eq!(connection.paths.len(), 3);

    let endpoints: Vec<_> = [connection.node_a, connection.node_b]
        .into_iter()
        .flatten()
        .map(|node| node.tile)
        .collect();
    assert!(endpoints.contains(&map.tile(coord("A1")).unwrap().id));
    assert!(endpoints.contains(&map.tile(coord("A5")).unwrap().id));

    // The run sat on both sides of the relaid hex, so this went through
    // the merge, not a one-sided extension.
    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, NetworkEvent::Merged { .. })));

    assert_eq!(
        map.hex(coord("A3")).unwrap().connections_at(0),
        &[merged],
        "the product took over the relaid boundary"
    );
    for label in ["A1", "A3", "A5"] {
        for ids in map.hex(coord(label)).unwrap().connections() {
            assert!(ids.len() <= 1, "no edge at {} lists a run twice", label);
        }
    }
}

/// An upgrade whose second path re-enters the run's own hex forks a
/// sibling run; both stay registered on the shared boundary
#[test]
fn test_upgrade_branches_at_revisited_hex() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    let (original, _) = map.connections().next().unwrap();
    map.lay(coord("A3"), straight("9")).unwrap();

    // Same southern entry, a second way out.
    let fork = Tile::new(
        "23",
        vec![
            TrackPath::Through { exits: [3, 0] },
            TrackPath::Through { exits: [3, 1] },
        ],
        Vec::new(),
    );
    let outcome = map.lay(coord("A3"), fork).unwrap();

    assert_eq!(map.connection_count(), 2, "the original plus its sibling");
    let shared = map.hex(coord("A1")).unwrap().connections_at(0);
    assert_eq!(shared.len(), 2, "both runs sit on the city boundary");
    assert_eq!(shared[0], original, "the original keeps its identity");

    let sibling = shared[1];
    let sibling_run = map.connection(sibling).unwrap();
    let original_run = map.connection(original).unwrap();
    assert_eq!(original_run.paths.len(), 2);
    assert_eq!(sibling_run.paths.len(), 2);
    assert_eq!(
        original_run.paths[0], sibling_run.paths[0],
        "both runs share the city path"
    );
    assert_ne!(
        original_run.paths[1], sibling_run.paths[1],
        "each run takes its own way through the fork"
    );
    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, NetworkEvent::Branched { .. })));
}

/// Laying a blank strips the hex's paths from the run, reopening it; a
/// second blank on the terminal hex leaves nothing to reference
#[test]
fn test_blank_relay_disconnects_and_reaps() {
    let mut map = blank_map(&["A1", "A3", "A5"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    map.lay(coord("A3"), straight("9")).unwrap();
    let (run, _) = map.connections().next().unwrap();

    map.lay(coord("A3"), Tile::blank()).unwrap();
    let connection = map.connection(run).expect("the city still anchors it");
    assert_eq!(connection.paths.len(), 1);
    assert!(!map.connected(coord("A1"), coord("A3")));

    map.lay(coord("A1"), Tile::blank()).unwrap();
    assert_eq!(map.connection_count(), 0, "unreferenced runs are reaped");
}

// ============================================================================
// Token Carry-over
// ============================================================================

/// Upgrading a city preserves both placed tokens and outstanding
/// reservations, keeping the reserved slot ahead of later arrivals
#[test]
fn test_upgrade_preserves_tokens_and_reservations() {
    let awa = CorporationId(1);
    let iyo = CorporationId(2);

    let mut map = blank_map(&["A1", "A3"]);
    let green = city_tile("15", 30, 2, &[0]);
    let mut reserved = city_tile("57", 20, 2, &[0]);
    reserved.city_mut(0).unwrap().reservations = vec![awa];
    map.lay(coord("A1"), reserved).unwrap();

    map.tile_mut(coord("A1"))
        .and_then(|tile| tile.city_mut(0))
        .unwrap()
        .place_token(iyo)
        .unwrap();

    let outcome = map.lay(coord("A1"), green).unwrap();

    let city = map.tile(coord("A1")).unwrap().city(0).unwrap();
    assert_eq!(city.tokens[0], None, "slot 0 stays earmarked");
    assert_eq!(city.tokens[1], Some(Token { corporation: iyo }));
    assert_eq!(city.reservations, vec![awa]);

    let old_city = outcome.replaced.city(0).unwrap();
    assert!(old_city.tokens.iter().all(Option::is_none));
    assert!(old_city.reservations.is_empty());
}

/// Tokens that cannot fit on the replacement city are dropped rather than
/// blocking the lay
#[test]
fn test_token_carry_drops_overflow() {
    let awa = CorporationId(1);
    let iyo = CorporationId(2);

    let mut map = blank_map(&["A1", "A3"]);
    map.lay(coord("A1"), city_tile("14", 20, 2, &[0])).unwrap();
    {
        let city = map
            .tile_mut(coord("A1"))
            .and_then(|tile| tile.city_mut(0))
            .unwrap();
        city.place_token(awa).unwrap();
        city.place_token(iyo).unwrap();
    }

    map.lay(coord("A1"), city_tile("3", 10, 1, &[0])).unwrap();

    let city = map.tile(coord("A1")).unwrap().city(0).unwrap();
    assert_eq!(city.tokens, vec![Some(Token { corporation: awa })]);
    assert!(city.tokened_by(awa));
    assert!(!city.tokened_by(iyo));
}

// ============================================================================
// Preprinted Track and Shared Identity
// ============================================================================

/// A terminal path laid toward a preprinted off-board hex walks into its
/// track and closes the run against the off-board node
#[test]
fn test_offboard_closes_via_preprinted_track() {
    let mut map = TrackMap::new(Layout::Flat);
    let gateway = Tile::new(
        "gateway",
        vec![TrackPath::Terminal { exit: 0, node: 0 }],
        vec![Node::Offboard(Offboard::new(40))],
    );
    map.add_hex(coord("A1"), gateway, Some("Western Gateway"));
    map.add_hex(coord("A3"), Tile::blank(), None);
    map.add_hex(coord("A5"), Tile::blank(), None);

    map.lay(coord("A3"), city_tile("57", 20, 1, &[0, 3])).unwrap();

    let closed: Vec<_> = map
        .connections()
        .filter(|(_, connection)| connection.closed())
        .collect();
    assert_eq!(closed.len(), 1, "the southern spur finds the gateway");
    let (_, connection) = closed[0];
    let stops = connection.stops(&map);
    assert_eq!(stops.len(), 2);
    let revenue: u32 = stops
        .iter()
        .filter_map(|&node| map.node(node))
        .map(Node::revenue)
        .sum();
    assert_eq!(revenue, 60);
}

/// Every hex a run touches lists that run on at least one edge
#[test]
fn test_every_touched_hex_references_the_run() {
    let mut map = blank_map(&["A1", "A3", "A5", "A7"]);
    map.lay(coord("A1"), city_tile("57", 20, 1, &[0])).unwrap();
    map.lay(coord("A3"), straight("9")).unwrap();
    map.lay(coord("A7"), city_tile("58", 30, 1, &[3])).unwrap();
    map.lay(coord("A5"), straight("9")).unwrap();

    assert!(map.connected(coord("A1"), coord("A7")));
    for (id, connection) in map.connections() {
        for hex in connection.hexes() {
            assert!(
                map.hex(hex).unwrap().all_connections().contains(&id),
                "hex {} should reference run {}",
                hex,
                id.0
            );
        }
    }
}
