//! Hex grid topology: coordinates, edge numbering, and orientation
//!
//! Hexes are addressed with double coordinates. A map label like "H7" is
//! column letter plus 1-based row; the letter maps to x and the row to y.
//! Neighbor lookup is pure offset arithmetic against the layout's table and
//! never touches map state.

use std::fmt;

use nom::character::complete::{digit1, satisfy};
use nom::combinator::{all_consuming, map_res, verify};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

use crate::core::error::{RailError, Result};

/// Edge index on a hex, clockwise in 0..6
pub type Edge = u8;

/// Number of edges on a hex
pub const EDGE_COUNT: usize = 6;

/// The edge of the adjacent hex that touches `edge` on this one
pub fn invert(edge: Edge) -> Edge {
    (edge + 3) % 6
}

const FLAT_OFFSETS: [(i32, i32); EDGE_COUNT] =
    [(0, 2), (-1, 1), (-1, -1), (0, -2), (1, -1), (1, 1)];

const POINTY_OFFSETS: [(i32, i32); EDGE_COUNT] =
    [(1, 1), (-1, 1), (-2, 0), (-1, -1), (1, -1), (2, 0)];

/// Orientation of the hex grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    Flat,
    Pointy,
}

impl Layout {
    /// Coordinate offset to the neighbor across each edge
    pub fn offsets(&self) -> &'static [(i32, i32); EDGE_COUNT] {
        match self {
            Layout::Flat => &FLAT_OFFSETS,
            Layout::Pointy => &POINTY_OFFSETS,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Pointy
    }
}

/// Double-coordinate address of one hex cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub x: i32,
    pub y: i32,
}

impl HexCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parse a map label like "H7"
    pub fn parse(label: &str) -> Result<Self> {
        all_consuming(coord_body)
            .parse(label)
            .map(|(_, coord)| coord)
            .map_err(|_| RailError::BadCoordinate(label.to_string()))
    }

    /// Map label for this coordinate, or the raw pair when it falls outside
    /// the lettered range
    pub fn label(&self) -> String {
        if (0..26).contains(&self.x) && self.y >= 0 {
            format!("{}{}", (b'A' + self.x as u8) as char, self.y + 1)
        } else {
            format!("({},{})", self.x, self.y)
        }
    }

    /// The adjacent coordinate across `edge`
    pub fn neighbor(&self, layout: Layout, edge: Edge) -> HexCoord {
        let (dx, dy) = layout.offsets()[edge as usize];
        HexCoord::new(self.x + dx, self.y + dy)
    }

    /// The edge of `self` that faces `other`, if the two are adjacent
    pub fn direction_to(&self, other: &HexCoord, layout: Layout) -> Option<Edge> {
        let delta = (other.x - self.x, other.y - self.y);
        layout
            .offsets()
            .iter()
            .position(|&offset| offset == delta)
            .map(|edge| edge as Edge)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn coord_body(input: &str) -> IResult<&str, HexCoord> {
    let (rest, (letter, row)) = (
        satisfy(|c: char| c.is_ascii_uppercase()),
        verify(map_res(digit1, |s: &str| s.parse::<i32>()), |&row| row >= 1),
    )
        .parse(input)?;
    Ok((rest, HexCoord::new(letter as i32 - 'A' as i32, row - 1)))
}
