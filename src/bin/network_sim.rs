//! Track network demo
//! Lays a short sequence of tiles on a small map and walks through the
//! evolving connection graph: danglers, extension, branching, a token,
//! the reachability frontier, and a scored route.

use clap::Parser;

use railnet::core::types::CorporationId;
use railnet::grid::{HexCoord, Layout};
use railnet::network::{Connection, ConnectionId, TrackMap};
use railnet::route::{Route, Train};
use railnet::tile::{City, Node, Offboard, Tile, TrackPath};

#[derive(Parser, Debug)]
#[command(name = "network_sim")]
#[command(about = "Lay tiles on a demo map and trace the connection graph")]
struct Args {
    /// Print every graph event as it happens
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn coord(label: &str) -> HexCoord {
    HexCoord::parse(label).expect("demo labels are well-formed")
}

fn describe(id: ConnectionId, connection: &Connection) -> String {
    let span: Vec<String> = connection.hexes().map(|hex| hex.label()).collect();
    let state = if connection.closed() {
        "closed"
    } else {
        "dangling"
    };
    format!("run {} [{}] {}", id.0, span.join(" - "), state)
}

fn print_connections(map: &TrackMap) {
    let mut lines: Vec<String> = map
        .connections()
        .map(|(id, connection)| describe(id, connection))
        .collect();
    lines.sort();
    for line in lines {
        println!("    {}", line);
    }
}

fn main() {
    let args = Args::parse();
    let filter = if args.verbose {
        "railnet=debug"
    } else {
        "railnet=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║        RAILNET: TRACK NETWORK DEMO           ║");
    println!("╚══════════════════════════════════════════════╝\n");

    // A strip of countryside between an off-board gateway and two city
    // sites, with one side hex open for expansion.
    let mut map = TrackMap::new(Layout::Flat);
    let gateway = Tile::new(
        "gateway",
        vec![TrackPath::Terminal { exit: 0, node: 0 }],
        vec![Node::Offboard(Offboard::new(40))],
    );
    map.add_hex(coord("C1"), gateway, Some("Western Gateway"));
    map.add_hex(coord("C3"), Tile::blank(), Some("Ridgefield"));
    map.add_hex(coord("C5"), Tile::blank(), None);
    map.add_hex(coord("C7"), Tile::blank(), Some("Eastport"));
    map.add_hex(coord("D6"), Tile::blank(), None);
    println!("Map: {} hexes, off-board gateway at C1\n", map.hex_count());

    let awa = CorporationId(1);

    // 1. A city tile next to the gateway. Its southern spur walks into the
    //    preprinted off-board track and closes immediately.
    let city = Tile::new(
        "57",
        vec![
            TrackPath::Terminal { exit: 0, node: 0 },
            TrackPath::Terminal { exit: 3, node: 0 },
        ],
        vec![Node::City(City::new(20, 2))],
    );
    let outcome = map.lay(coord("C3"), city).unwrap();
    println!("1. City laid at Ridgefield ({} events)", outcome.events.len());
    if args.verbose {
        for event in &outcome.events {
            println!("    {:?}", event);
        }
    }
    print_connections(&map);

    // 2. Token the city.
    map.tile_mut(coord("C3"))
        .and_then(|tile| tile.city_mut(0))
        .expect("the laid tile has a city")
        .place_token(awa)
        .unwrap();
    println!("\n2. Corporation {} tokens Ridgefield", awa.0);

    // 3. A fork through the middle hex: one arm meets the city run, the
    //    second arm forces a branch toward the open side hex.
    let fork = Tile::new(
        "fork",
        vec![
            TrackPath::Through { exits: [3, 0] },
            TrackPath::Through { exits: [3, 5] },
        ],
        Vec::new(),
    );
    let outcome = map.lay(coord("C5"), fork).unwrap();
    println!("\n3. Fork laid at C5 ({} events)", outcome.events.len());
    if args.verbose {
        for event in &outcome.events {
            println!("    {:?}", event);
        }
    }
    print_connections(&map);

    // 4. A second city seals the northern arm.
    let east_city = Tile::new(
        "58",
        vec![TrackPath::Terminal { exit: 3, node: 0 }],
        vec![Node::City(City::new(30, 1))],
    );
    let outcome = map.lay(coord("C7"), east_city).unwrap();
    println!("\n4. City laid at Eastport ({} events)", outcome.events.len());
    print_connections(&map);

    // 5. Frontier: everything reachable from the tokened corporation.
    let seeds: Vec<ConnectionId> = map
        .connections()
        .filter(|(_, connection)| connection.tokened_by(&map, awa))
        .map(|(id, _)| id)
        .collect();
    let frontier = map.layable_hexes(&seeds);
    println!("\n5. Reachable from corporation {}:", awa.0);
    let mut reachable: Vec<String> = frontier
        .iter()
        .map(|(hex, edges)| format!("{} via edges {:?}", hex.label(), edges))
        .collect();
    reachable.sort();
    for line in reachable {
        println!("    {}", line);
    }

    // 6. Run a train over the two closed runs.
    let mut route = Route::new();
    for (id, connection) in map.connections() {
        if connection.closed() {
            route.add_connection(id);
        }
    }
    let train = Train::new(3);
    match route.revenue(&map, &train) {
        Ok(revenue) => println!(
            "\n6. A {}-train over {} stops earns {}",
            train.distance,
            route.stops(&map).len(),
            revenue
        ),
        Err(err) => println!("\n6. Route rejected: {}", err),
    }
}
