use draftosaurus::{RestrictionKind, ValidationError, ZoneId};

#[derive(Debug)]
/// Error type for one turn.
pub enum IllegalMove {
    PieceNotInHand {
        piece_id: u32,
    },
    RejectedPlacement {
        zone: ZoneId,
        slot: u8,
        kind: RestrictionKind,
        reason: String,
    },
    /// The referee could not judge the move, so it is not accepted.
    Unjudgeable {
        zone: ZoneId,
        err: ValidationError,
    },
}

impl std::error::Error for IllegalMove {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IllegalMove::Unjudgeable { err, .. } => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::PieceNotInHand { piece_id } => {
                write!(f, "Tried to place piece #{}, which is not in the player's hand", piece_id)
            }
            IllegalMove::RejectedPlacement {
                zone,
                slot,
                kind,
                reason,
            } => write!(
                f,
                "Placement into slot {} of '{}' was rejected ({:?} rule): {}",
                slot, zone, kind, reason
            ),
            IllegalMove::Unjudgeable { zone, err: _ } => {
                write!(f, "Placement into '{}' could not be validated", zone)
            }
        }
    }
}
