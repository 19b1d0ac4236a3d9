use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    check_zone_pieces, Board, DieRestrictionEngine, GameState, Piece, PlacementValidator, PlayerId, Ruleset,
    ValidationError, ZoneId, ZoneRule,
};

/// Which layer produced a verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionKind {
    /// The zone rules. Also used for valid placements.
    Zone,
    /// The die rolled by another player.
    Die,
    /// The placement could not be judged, e.g. because the state is malformed.
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub reason: String,
    pub restriction_kind: RestrictionKind,
}

impl ValidationVerdict {
    fn accepted() -> Self {
        Self {
            valid: true,
            reason: String::from("Valid placement"),
            restriction_kind: RestrictionKind::Zone,
        }
    }

    fn rejected(restriction_kind: RestrictionKind, reason: String) -> Self {
        Self {
            valid: false,
            reason,
            restriction_kind,
        }
    }

    /// Turns an error into a verdict. This never accepts the placement.
    pub fn from_error(err: &ValidationError) -> Self {
        Self::rejected(RestrictionKind::Error, err.to_string())
    }
}

/// Combines the die layer and the zone layer into a single verdict.
///
/// The coordinator only holds the immutable ruleset, and every call is a pure
/// function of its arguments.
#[derive(Clone, Debug, Default)]
pub struct ValidationCoordinator {
    ruleset: Ruleset,
}

impl ValidationCoordinator {
    pub fn new(ruleset: Ruleset) -> Self {
        Self { ruleset }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn placement(&self) -> PlacementValidator<'_> {
        PlacementValidator::new(&self.ruleset.zones)
    }

    pub fn die_engine(&self) -> DieRestrictionEngine<'_> {
        DieRestrictionEngine::new(&self.ruleset.zones, &self.ruleset.die_faces)
    }

    /// Judges a placement of `piece` into `zone` by `player`.
    ///
    /// `pieces_in_zone` are the pieces that are already in the zone on the
    /// acting player's board. A missing `slot` means "any slot".
    pub fn validate(
        &self,
        zone: ZoneId,
        pieces_in_zone: &[Piece],
        piece: &Piece,
        slot: Option<u8>,
        player: PlayerId,
        state: &GameState,
    ) -> ValidationVerdict {
        self.try_validate(zone, pieces_in_zone, piece, slot, player, state)
            .unwrap_or_else(|err| ValidationVerdict::from_error(&err))
    }

    /// Like [`Self::validate()`], but returns the cases in which the placement
    /// cannot be judged as an error instead of a verdict.
    pub fn try_validate(
        &self,
        zone: ZoneId,
        pieces_in_zone: &[Piece],
        piece: &Piece,
        slot: Option<u8>,
        player: PlayerId,
        state: &GameState,
    ) -> Result<ValidationVerdict, ValidationError> {
        let rule = self.zone_rule(zone)?;
        let board = self.acting_board(player, state)?;
        self.check_pieces_in_zone(zone, pieces_in_zone)?;

        if let Err(err) = self.die_engine().check(zone, &state.die, board, player) {
            return Ok(ValidationVerdict::rejected(
                RestrictionKind::Die,
                err.to_string(),
            ));
        }
        Ok(
            match self.placement().validate(zone, pieces_in_zone, piece, slot) {
                Ok(()) => ValidationVerdict::accepted(),
                Err(err) => ValidationVerdict::rejected(
                    RestrictionKind::Zone,
                    format!("{}: {}", rule.name, err),
                ),
            },
        )
    }

    /// The slots of `zone` into which `player` may place `piece`. Empty if the
    /// die forbids the zone.
    pub fn legal_slots(
        &self,
        zone: ZoneId,
        pieces_in_zone: &[Piece],
        piece: &Piece,
        player: PlayerId,
        state: &GameState,
    ) -> Result<BTreeSet<u8>, ValidationError> {
        self.zone_rule(zone)?;
        let board = self.acting_board(player, state)?;
        self.check_pieces_in_zone(zone, pieces_in_zone)?;
        if !self.die_engine().zone_allowed(zone, &state.die, board, player) {
            return Ok(BTreeSet::new());
        }
        Ok(self.placement().legal_slots(zone, pieces_in_zone, piece))
    }

    /// The zones the die allows for `player` that still have a legal slot for
    /// `piece` on the player's board.
    pub fn legal_zones(
        &self,
        player: PlayerId,
        state: &GameState,
        piece: &Piece,
    ) -> Result<BTreeSet<ZoneId>, ValidationError> {
        let board = self.acting_board(player, state)?;
        let placement = self.placement();
        Ok(self
            .die_engine()
            .allowed_zones(&state.die, board, player)
            .into_iter()
            .filter(|&zone| !placement.legal_slots(zone, board.pieces(zone), piece).is_empty())
            .collect())
    }

    /// The zones the die allows for `player`, regardless of what is in them.
    pub fn allowed_zones(
        &self,
        player: PlayerId,
        state: &GameState,
    ) -> Result<BTreeSet<ZoneId>, ValidationError> {
        let board = self.acting_board(player, state)?;
        Ok(self.die_engine().allowed_zones(&state.die, board, player))
    }

    fn zone_rule(&self, zone: ZoneId) -> Result<&ZoneRule, ValidationError> {
        self.ruleset
            .zones
            .get(zone)
            .ok_or_else(|| ValidationError::UnrecognizedZone {
                zone: zone.to_string(),
            })
    }

    /// The pieces a caller claims are in the zone must satisfy its rules as well.
    fn check_pieces_in_zone(&self, zone: ZoneId, pieces: &[Piece]) -> Result<(), ValidationError> {
        check_zone_pieces(&self.ruleset.zones, zone, pieces)
            .map_err(|err| ValidationError::MalformedZone { err })
    }

    /// The acting player's board, which must satisfy the zone invariants.
    fn acting_board<'s>(
        &self,
        player: PlayerId,
        state: &'s GameState,
    ) -> Result<&'s Board, ValidationError> {
        let board = state
            .board(player)
            .ok_or(ValidationError::MissingBoard { player })?;
        board
            .check_invariants(&self.ruleset.zones)
            .map_err(|err| ValidationError::MalformedBoard { player, err })?;
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::GameInput;
    use crate::DieState;
    use crate::Species::*;

    fn state_with_die(face: &str, rolled_by: PlayerId) -> GameState {
        GameState {
            boards: BTreeMap::from([(1, Board::new()), (2, Board::new())]),
            die: DieState {
                active: true,
                face: String::from(face),
                rolled_by,
                round: 1,
            },
        }
    }

    quickcheck! {
        fn legal_slots_validate(input: GameInput) -> bool {
            let coordinator = ValidationCoordinator::default();
            let board = &input.state.boards[&input.player];
            input.available.iter().all(|piece| {
                ZoneId::ALL.into_iter().all(|zone| {
                    let pieces = board.pieces(zone);
                    let Ok(slots) = coordinator.legal_slots(zone, pieces, piece, input.player, &input.state) else {
                        return false;
                    };
                    slots.into_iter().all(|slot| {
                        coordinator
                            .validate(zone, pieces, piece, Some(slot), input.player, &input.state)
                            .valid
                    })
                })
            })
        }

        fn legal_zones_are_allowed_by_die(input: GameInput) -> bool {
            let coordinator = ValidationCoordinator::default();
            let Ok(allowed) = coordinator.allowed_zones(input.player, &input.state) else {
                return false;
            };
            input.available.iter().all(|piece| {
                coordinator
                    .legal_zones(input.player, &input.state, piece)
                    .map(|zones| zones.is_subset(&allowed))
                    .unwrap_or(false)
            })
        }
    }

    #[test]
    fn die_layer_comes_first() {
        let coordinator = ValidationCoordinator::default();
        let state = state_with_die("forest", 1);
        let piece = Piece::new(1, TRex, 2);

        let verdict = coordinator.validate(ZoneId::SolitaryIsland, &[], &piece, Some(1), 2, &state);
        assert_eq!(
            verdict,
            ValidationVerdict {
                valid: false,
                reason: String::from("Die restriction: Forest: Only zones in the forest area"),
                restriction_kind: RestrictionKind::Die,
            }
        );

        // The zone would be full too, but the die is checked first.
        let full = [Piece::new(7, Velociraptor, 2).placed(2, 1)];
        let verdict = coordinator.validate(ZoneId::SolitaryIsland, &full, &piece, None, 2, &state);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Die);

        // The rolling player is never rejected by the die.
        let verdict = coordinator.validate(ZoneId::SolitaryIsland, &[], &piece, Some(1), 1, &state);
        assert!(verdict.valid);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Zone);
    }

    #[test]
    fn river_is_always_allowed() {
        let coordinator = ValidationCoordinator::default();
        for face in ["forest", "plains", "restrooms", "cafeteria", "empty-zone", "no-trex"] {
            let state = state_with_die(face, 1);
            let verdict = coordinator.validate(ZoneId::River, &[], &Piece::new(1, TRex, 2), Some(1), 2, &state);
            assert!(verdict.valid, "{}: {:?}", face, verdict);
        }
    }

    #[test]
    fn zone_reasons_name_the_zone() {
        let coordinator = ValidationCoordinator::default();
        let state = state_with_die("forest", 1);
        let pieces = [Piece::new(1, Triceratops, 2).placed(2, 1)];
        let verdict = coordinator.validate(
            ZoneId::ForestOfSameness,
            &pieces,
            &Piece::new(2, Triceratops, 2),
            Some(3),
            2,
            &state,
        );
        assert_eq!(
            verdict,
            ValidationVerdict {
                valid: false,
                reason: String::from("Forest of Sameness: Must place in slot 2 (fill left-to-right)"),
                restriction_kind: RestrictionKind::Zone,
            }
        );
    }

    #[test]
    fn errors_become_verdicts() {
        let coordinator = ValidationCoordinator::default();
        let piece = Piece::new(1, TRex, 3);

        let state = state_with_die("forest", 1);
        let verdict = coordinator.validate(ZoneId::River, &[], &piece, Some(1), 3, &state);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Error);
        assert!(!verdict.valid);
        assert!(coordinator.legal_zones(3, &state, &piece).is_err());

        let mut malformed = state_with_die("forest", 1);
        let crowded = [
            Piece::new(1, TRex, 2).placed(2, 1),
            Piece::new(2, Pteranodon, 2).placed(2, 1),
        ];
        for piece in crowded {
            malformed
                .boards
                .entry(2)
                .or_default()
                .place(ZoneId::KingOfTheJungle, piece);
        }
        let verdict = coordinator.validate(ZoneId::River, &[], &piece, Some(1), 2, &malformed);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Error);
        assert_eq!(
            verdict.reason,
            "The board of player 2 is malformed: Zone 'king-of-the-jungle' holds 2 pieces, but its capacity is 1"
        );
    }

    #[test]
    fn malformed_pieces_in_zone_are_errors() {
        let coordinator = ValidationCoordinator::default();
        let state = state_with_die("forest", 1);

        let mixed = [
            Piece::new(1, TRex, 2).placed(2, 1),
            Piece::new(2, Pteranodon, 2).placed(2, 2),
        ];
        let verdict = coordinator.validate(
            ZoneId::ForestOfSameness,
            &mixed,
            &Piece::new(3, TRex, 2),
            Some(3),
            2,
            &state,
        );
        assert_eq!(
            verdict,
            ValidationVerdict {
                valid: false,
                reason: String::from(
                    "The pieces in the zone are malformed: The species in zone 'forest-of-sameness' break its species rule"
                ),
                restriction_kind: RestrictionKind::Error,
            }
        );

        // The rolling player is not restricted by the die, but the zone is still checked.
        let twice = [
            Piece::new(1, TRex, 1).placed(1, 2),
            Piece::new(2, Stegosaurus, 1).placed(1, 2),
        ];
        let piece = Piece::new(3, Triceratops, 1);
        let verdict = coordinator.validate(ZoneId::PrairieOfLove, &twice, &piece, Some(1), 1, &state);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Error);
        assert!(!verdict.valid);
        assert!(matches!(
            coordinator.legal_slots(ZoneId::PrairieOfLove, &twice, &piece, 1, &state),
            Err(ValidationError::MalformedZone {
                err: crate::MalformedBoard::SlotTakenTwice { slot: 2, .. }
            })
        ));
    }

    #[test]
    fn unrecognized_zone_in_custom_ruleset() {
        let mut ruleset = Ruleset::standard();
        let zones = ruleset
            .zones
            .iter()
            .filter(|(zone, _)| *zone != ZoneId::WoodyTrio)
            .map(|(zone, rule)| (zone, rule.clone()))
            .collect();
        ruleset.zones = crate::ZoneRuleTable::new(zones);
        let coordinator = ValidationCoordinator::new(ruleset);
        let state = state_with_die("forest", 1);
        let verdict = coordinator.validate(ZoneId::WoodyTrio, &[], &Piece::new(1, TRex, 2), None, 2, &state);
        assert_eq!(
            verdict,
            ValidationVerdict {
                valid: false,
                reason: String::from("Unrecognized zone 'woody-trio'"),
                restriction_kind: RestrictionKind::Error,
            }
        );
    }

    #[test]
    fn legal_zones_respect_die_and_rules() {
        let coordinator = ValidationCoordinator::default();
        let mut state = state_with_die("forest", 1);
        let board = state.boards.entry(2).or_default();
        board.place(ZoneId::ForestOfSameness, Piece::new(1, Stegosaurus, 2).placed(2, 1));
        board.place(ZoneId::KingOfTheJungle, Piece::new(2, Stegosaurus, 2).placed(2, 1));

        let zones = coordinator.legal_zones(2, &state, &Piece::new(3, TRex, 2)).unwrap();
        assert_eq!(zones, BTreeSet::from([ZoneId::WoodyTrio, ZoneId::River]));

        let zones = coordinator.legal_zones(2, &state, &Piece::new(4, Stegosaurus, 2)).unwrap();
        assert_eq!(
            zones,
            BTreeSet::from([ZoneId::ForestOfSameness, ZoneId::WoodyTrio, ZoneId::River])
        );

        assert!(coordinator
            .legal_slots(ZoneId::SolitaryIsland, &[], &Piece::new(5, TRex, 2), 2, &state)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn verdict_json() {
        let verdict = ValidationVerdict::accepted();
        assert_eq!(
            serde_json::to_string(&verdict).unwrap(),
            r#"{"valid":true,"reason":"Valid placement","restriction_kind":"zone"}"#
        );
    }
}
