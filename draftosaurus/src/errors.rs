use serde::{Deserialize, Serialize};

use crate::{PlayerId, Species, ZoneId};

/// The broad classes of things that can go wrong when validating a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The zone id is not in the rule table.
    ZoneError,
    /// The move breaks a capacity, species, ordering or die rule.
    RuleViolation,
    /// A required field is missing or the state is malformed.
    InputError,
    /// Something unexpected happened during evaluation.
    InternalError,
}

/// The error type for [`PlacementValidator::validate()`](crate::PlacementValidator::validate),
/// i.e. for the zone rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllegalPlacement {
    UnrecognizedZone { zone: ZoneId },
    ZoneFull { capacity: u8 },
    SpeciesMismatch { expected: Species, found: Species },
    DuplicateSpecies { species: Species },
    OutOfOrder { expected_slot: u8, slot: u8 },
    SlotOccupied { slot: u8 },
    SlotOutOfRange { slot: u8, capacity: u8 },
}

impl std::error::Error for IllegalPlacement {}

impl std::fmt::Display for IllegalPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalPlacement::UnrecognizedZone { zone } =>
                write!(f, "Unrecognized zone '{}'", zone),
            IllegalPlacement::ZoneFull { capacity } =>
                write!(f, "Zone is full (capacity {})", capacity),
            IllegalPlacement::SpeciesMismatch { expected, .. } =>
                write!(f, "Only {} allowed in this zone", expected),
            IllegalPlacement::DuplicateSpecies { species } =>
                write!(f, "Only different species allowed in this zone, and there already is a {}", species),
            IllegalPlacement::OutOfOrder { expected_slot, .. } =>
                write!(f, "Must place in slot {} (fill left-to-right)", expected_slot),
            IllegalPlacement::SlotOccupied { slot } =>
                write!(f, "Slot {} is already occupied", slot),
            IllegalPlacement::SlotOutOfRange { slot, capacity } =>
                write!(f, "Slot {} does not exist, the zone has slots 1 to {}", slot, capacity),
        }
    }
}

/// The error type for the die layer: the zone is not allowed by the die
/// rolled by another player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DieRestricted {
    pub zone: ZoneId,
    /// Explains the restriction, e.g. "Forest: Only zones in the forest area".
    pub message: String,
}

impl std::error::Error for DieRestricted {}

impl std::fmt::Display for DieRestricted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Die restriction: {}", self.message)
    }
}

/// A board that does not satisfy the zone invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedBoard {
    UnrecognizedZone { zone: ZoneId },
    OverCapacity { zone: ZoneId, pieces: usize, capacity: u8 },
    SpeciesRuleBroken { zone: ZoneId },
    GapInSequence { zone: ZoneId, slot: u8 },
    SlotOutOfRange { zone: ZoneId, slot: u8, capacity: u8 },
    SlotTakenTwice { zone: ZoneId, slot: u8 },
}

impl std::error::Error for MalformedBoard {}

impl std::fmt::Display for MalformedBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedBoard::UnrecognizedZone { zone } =>
                write!(f, "The board has pieces in the unrecognized zone '{}'", zone),
            MalformedBoard::OverCapacity { zone, pieces, capacity } =>
                write!(f, "Zone '{}' holds {} pieces, but its capacity is {}", zone, pieces, capacity),
            MalformedBoard::SpeciesRuleBroken { zone } =>
                write!(f, "The species in zone '{}' break its species rule", zone),
            MalformedBoard::GapInSequence { zone, slot } =>
                write!(f, "Zone '{}' must be filled left-to-right, but slot {} is misplaced", zone, slot),
            MalformedBoard::SlotOutOfRange { zone, slot, capacity } =>
                write!(f, "Zone '{}' has a piece in slot {}, but only slots 1 to {} exist", zone, slot, capacity),
            MalformedBoard::SlotTakenTwice { zone, slot } =>
                write!(f, "Zone '{}' has two pieces in slot {}", zone, slot),
        }
    }
}

/// The error type for everything that is not a rule violation: the move
/// could not be judged at all.
#[derive(Debug)]
pub enum ValidationError {
    UnrecognizedZone { zone: String },
    MissingBoard { player: PlayerId },
    MalformedBoard { player: PlayerId, err: MalformedBoard },
    /// The pieces passed in for the target zone break its rules.
    MalformedZone { err: MalformedBoard },
    MalformedRequest { message: String },
    Internal { message: String },
}

impl ValidationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ValidationError::UnrecognizedZone { .. } => ErrorCategory::ZoneError,
            ValidationError::MissingBoard { .. }
            | ValidationError::MalformedBoard { .. }
            | ValidationError::MalformedZone { .. }
            | ValidationError::MalformedRequest { .. } => ErrorCategory::InputError,
            ValidationError::Internal { .. } => ErrorCategory::InternalError,
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidationError::MalformedBoard { err, .. } | ValidationError::MalformedZone { err } => {
                Some(err)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnrecognizedZone { zone } => write!(f, "Unrecognized zone '{}'", zone),
            ValidationError::MissingBoard { player } => {
                write!(f, "The game state has no board for player {}", player)
            }
            ValidationError::MalformedBoard { player, err } => {
                write!(f, "The board of player {} is malformed: {}", player, err)
            }
            ValidationError::MalformedZone { err } => {
                write!(f, "The pieces in the zone are malformed: {}", err)
            }
            ValidationError::MalformedRequest { message } => {
                write!(f, "Malformed request: {}", message)
            }
            ValidationError::Internal { message } => {
                write!(f, "Internal validation error: {}", message)
            }
        }
    }
}
