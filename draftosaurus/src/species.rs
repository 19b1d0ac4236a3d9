use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// The kind of a [piece](Piece). There are six of them, and they never change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Species {
    Triceratops,
    Stegosaurus,
    Brontosaurus,
    /// The apex species.
    #[serde(rename = "trex")]
    TRex,
    Velociraptor,
    Pteranodon,
}

/// The species targeted by the "no apex predator" die face, and the one a
/// player wants to dominate for the king of the jungle.
pub const APEX_SPECIES: Species = Species::TRex;

pub const NUM_SPECIES: usize = 6;

impl Species {
    pub const ALL: [Species; NUM_SPECIES] = [
        Species::Triceratops,
        Species::Stegosaurus,
        Species::Brontosaurus,
        Species::TRex,
        Species::Velociraptor,
        Species::Pteranodon,
    ];

    pub fn is_apex(self) -> bool {
        self == APEX_SPECIES
    }

    /// The identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Species::Triceratops => "triceratops",
            Species::Stegosaurus => "stegosaurus",
            Species::Brontosaurus => "brontosaurus",
            Species::TRex => "trex",
            Species::Velociraptor => "velociraptor",
            Species::Pteranodon => "pteranodon",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error type for the [`FromStr`] instance of [`Species`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSpecies(pub String);

impl std::error::Error for UnknownSpecies {}

impl std::fmt::Display for UnknownSpecies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a species", self.0)
    }
}

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|species| species.as_str() == s)
            .ok_or_else(|| UnknownSpecies(String::from(s)))
    }
}

/// A single dinosaur.
///
/// A piece is created when it is drafted. It gets a slot when it is placed
/// into a zone, and is not changed afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    pub species: Species,
    pub owner: PlayerId,
    /// The 1-based slot inside the zone. `None` until the piece is placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub slot: Option<u8>,
}

impl Piece {
    /// Creates a piece that has not been placed yet.
    pub fn new(id: u32, species: Species, owner: PlayerId) -> Self {
        Self {
            id,
            species,
            owner,
            slot: None,
        }
    }

    /// The same piece, placed into `slot` by `owner`.
    pub fn placed(self, owner: PlayerId, slot: u8) -> Self {
        Self {
            owner,
            slot: Some(slot),
            ..self
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{} #{} (slot {})", self.species, self.id, slot),
            None => write!(f, "{} #{}", self.species, self.id),
        }
    }
}
