//! Terminal nodes: cities with token slots, towns, and off-board areas

use serde::{Deserialize, Serialize};

use crate::core::error::{RailError, Result};
use crate::core::types::CorporationId;

use super::TileId;

/// Address of a terminal node on a laid tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub tile: TileId,
    pub index: usize,
}

/// A station token placed by a corporation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub corporation: CorporationId,
}

/// A revenue city with a fixed number of token slots.
///
/// Reservations earmark empty slots in order: the corporation holding the
/// k-th reservation is owed the k-th empty slot, and everyone else seats
/// past the earmarked ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub revenue: u32,
    pub tokens: Vec<Option<Token>>,
    pub reservations: Vec<CorporationId>,
}

impl City {
    pub fn new(revenue: u32, slots: usize) -> Self {
        Self {
            revenue,
            tokens: vec![None; slots],
            reservations: Vec::new(),
        }
    }

    pub fn with_reservations(mut self, reservations: Vec<CorporationId>) -> Self {
        self.reservations = reservations;
        self
    }

    /// Slot the corporation may claim right now
    fn open_slot(&self, corporation: CorporationId) -> Option<usize> {
        let mut empty = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_none())
            .map(|(slot, _)| slot);
        match self.reservations.iter().position(|&held| held == corporation) {
            Some(rank) => empty.nth(rank),
            None => empty.nth(self.reservations.len()),
        }
    }

    /// Place a fresh token, consuming the corporation's reservation if it
    /// holds one
    pub fn place_token(&mut self, corporation: CorporationId) -> Result<()> {
        self.exchange_token(Token { corporation })
    }

    /// Seat an already-minted token, used when an upgrade carries tokens
    /// onto the replacement city
    pub fn exchange_token(&mut self, token: Token) -> Result<()> {
        let slot = self
            .open_slot(token.corporation)
            .ok_or(RailError::NoTokenSlot)?;
        self.reservations.retain(|&held| held != token.corporation);
        self.tokens[slot] = Some(token);
        Ok(())
    }

    pub fn remove_tokens(&mut self) {
        for slot in &mut self.tokens {
            *slot = None;
        }
    }

    pub fn tokened_by(&self, corporation: CorporationId) -> bool {
        self.tokens
            .iter()
            .flatten()
            .any(|token| token.corporation == corporation)
    }
}

/// A small revenue stop without token slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub revenue: u32,
}

impl Town {
    pub fn new(revenue: u32) -> Self {
        Self { revenue }
    }
}

/// An off-board destination at the edge of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offboard {
    pub revenue: u32,
}

impl Offboard {
    pub fn new(revenue: u32) -> Self {
        Self { revenue }
    }
}

/// A terminal point printed on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    City(City),
    Town(Town),
    Offboard(Offboard),
}

impl Node {
    pub fn revenue(&self) -> u32 {
        match self {
            Node::City(city) => city.revenue,
            Node::Town(town) => town.revenue,
            Node::Offboard(offboard) => offboard.revenue,
        }
    }

    pub fn is_city(&self) -> bool {
        matches!(self, Node::City(_))
    }

    pub fn as_city(&self) -> Option<&City> {
        match self {
            Node::City(city) => Some(city),
            _ => None,
        }
    }

    pub fn as_city_mut(&mut self) -> Option<&mut City> {
        match self {
            Node::City(city) => Some(city),
            _ => None,
        }
    }

    /// True when this is a city holding the corporation's token
    pub fn tokened_by(&self, corporation: CorporationId) -> bool {
        match self {
            Node::City(city) => city.tokened_by(corporation),
            _ => false,
        }
    }
}
