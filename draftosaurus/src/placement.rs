use std::collections::BTreeSet;

use crate::{IllegalPlacement, OrderRule, Piece, SpeciesRule, ZoneId, ZoneRuleTable};

/// Evaluates the "passive" rules of a zone: capacity, species and ordering.
///
/// This knows nothing about the die or about other zones.
#[derive(Clone, Copy, Debug)]
pub struct PlacementValidator<'r> {
    zones: &'r ZoneRuleTable,
}

impl<'r> PlacementValidator<'r> {
    pub fn new(zones: &'r ZoneRuleTable) -> Self {
        Self { zones }
    }

    /// Checks whether `piece` may be placed into `zone`, which currently holds
    /// `pieces_in_zone`.
    ///
    /// If `slot` is `None`, the ordering rule is not checked, i.e. this answers
    /// whether the piece fits into the zone at all.
    ///
    /// The checks happen in a fixed order (capacity, species, ordering) and the
    /// first failure is returned.
    pub fn validate(
        &self,
        zone: ZoneId,
        pieces_in_zone: &[Piece],
        piece: &Piece,
        slot: Option<u8>,
    ) -> Result<(), IllegalPlacement> {
        let rule = self
            .zones
            .get(zone)
            .ok_or(IllegalPlacement::UnrecognizedZone { zone })?;

        if pieces_in_zone.len() >= rule.capacity as usize {
            return Err(IllegalPlacement::ZoneFull {
                capacity: rule.capacity,
            });
        }

        check_species(rule.species_rule, pieces_in_zone, piece)?;

        let Some(slot) = slot else {
            return Ok(());
        };
        match rule.order_rule {
            OrderRule::Sequential => {
                let expected_slot = pieces_in_zone.len() as u8 + 1;
                if slot != expected_slot {
                    return Err(IllegalPlacement::OutOfOrder {
                        expected_slot,
                        slot,
                    });
                }
            }
            OrderRule::Free => {
                if slot == 0 || slot > rule.capacity {
                    return Err(IllegalPlacement::SlotOutOfRange {
                        slot,
                        capacity: rule.capacity,
                    });
                }
                if pieces_in_zone.iter().any(|p| p.slot == Some(slot)) {
                    return Err(IllegalPlacement::SlotOccupied { slot });
                }
            }
        }
        Ok(())
    }

    /// All slots into which `piece` may currently be placed.
    ///
    /// Every slot in the result passes [`Self::validate()`].
    pub fn legal_slots(&self, zone: ZoneId, pieces_in_zone: &[Piece], piece: &Piece) -> BTreeSet<u8> {
        let Some(rule) = self.zones.get(zone) else {
            return BTreeSet::new();
        };
        if self.validate(zone, pieces_in_zone, piece, None).is_err() {
            return BTreeSet::new();
        }
        match rule.order_rule {
            OrderRule::Sequential => BTreeSet::from([pieces_in_zone.len() as u8 + 1]),
            OrderRule::Free => {
                let occupied: BTreeSet<u8> = pieces_in_zone.iter().filter_map(|p| p.slot).collect();
                (1..=rule.capacity)
                    .filter(|slot| !occupied.contains(slot))
                    .collect()
            }
        }
    }
}

fn check_species(
    species_rule: SpeciesRule,
    pieces_in_zone: &[Piece],
    piece: &Piece,
) -> Result<(), IllegalPlacement> {
    match species_rule {
        SpeciesRule::Any => Ok(()),
        SpeciesRule::AllSame => match pieces_in_zone.first() {
            Some(first) if first.species != piece.species => {
                Err(IllegalPlacement::SpeciesMismatch {
                    expected: first.species,
                    found: piece.species,
                })
            }
            _ => Ok(()),
        },
        SpeciesRule::AllDifferent => {
            if pieces_in_zone.iter().any(|p| p.species == piece.species) {
                Err(IllegalPlacement::DuplicateSpecies {
                    species: piece.species,
                })
            } else {
                Ok(())
            }
        }
    }
}
