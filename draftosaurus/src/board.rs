use std::collections::{BTreeMap, BTreeSet};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    DieState, MalformedBoard, OrderRule, Piece, Species, SpeciesRule, ZoneId, ZoneRuleTable,
    NUM_SPECIES,
};

/// Players are identified by their seat number, starting at 1.
pub type PlayerId = u32;

/// How many pieces of each species, indexed by `species as usize`.
pub type SpeciesCounts = [usize; NUM_SPECIES];

/// Counts the pieces of each species.
pub fn species_counts<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> SpeciesCounts {
    let mut counts = [0; NUM_SPECIES];
    for piece in pieces {
        counts[piece.species as usize] += 1;
    }
    counts
}

/// One player's park: the pieces in each zone, in placement order.
///
/// Zones without an entry are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(BTreeMap<ZoneId, Vec<Piece>>);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pieces in a zone, in placement order.
    pub fn pieces(&self, zone: ZoneId) -> &[Piece] {
        self.0.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_zone_empty(&self, zone: ZoneId) -> bool {
        self.pieces(zone).is_empty()
    }

    pub fn zone_contains(&self, zone: ZoneId, species: Species) -> bool {
        self.pieces(zone).iter().any(|p| p.species == species)
    }

    /// Iterates over the non-empty zones.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &[Piece])> + '_ {
        self.0
            .iter()
            .filter(|(_, pieces)| !pieces.is_empty())
            .map(|(&zone, pieces)| (zone, pieces.as_slice()))
    }

    /// All pieces in the park.
    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.0.values().flatten()
    }

    /// The total number of pieces in the park.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many pieces of this species are in the whole park.
    pub fn count_species(&self, species: Species) -> usize {
        self.all_pieces().filter(|p| p.species == species).count()
    }

    /// How many different species are in the whole park.
    pub fn distinct_species(&self) -> usize {
        species_counts(self.all_pieces())
            .iter()
            .filter(|&&count| count > 0)
            .count()
    }

    /// Appends a piece to a zone. The slot of the piece must already be set.
    ///
    /// This does not check any rules, see [`ValidationCoordinator`](crate::ValidationCoordinator) for that.
    pub fn place(&mut self, zone: ZoneId, piece: Piece) {
        self.0.entry(zone).or_default().push(piece);
    }

    /// A copy of this board with only the pieces placed by `player`.
    pub fn owned_by(&self, player: PlayerId) -> Board {
        Board(
            self.0
                .iter()
                .map(|(&zone, pieces)| {
                    let owned = pieces.iter().filter(|p| p.owner == player).copied();
                    (zone, owned.collect())
                })
                .collect(),
        )
    }

    /// Checks capacity, species and ordering of every zone.
    pub fn check_invariants(&self, table: &ZoneRuleTable) -> Result<(), MalformedBoard> {
        for (zone, pieces) in self.iter() {
            check_zone_pieces(table, zone, pieces)?;
        }
        Ok(())
    }
}

/// Checks capacity, species and ordering of the pieces in one zone.
pub fn check_zone_pieces(
    table: &ZoneRuleTable,
    zone: ZoneId,
    pieces: &[Piece],
) -> Result<(), MalformedBoard> {
    let rule = table
        .get(zone)
        .ok_or(MalformedBoard::UnrecognizedZone { zone })?;
    check_zone(zone, pieces, rule.capacity, rule.species_rule, rule.order_rule)
}

fn check_zone(
    zone: ZoneId,
    pieces: &[Piece],
    capacity: u8,
    species_rule: SpeciesRule,
    order_rule: OrderRule,
) -> Result<(), MalformedBoard> {
    if pieces.len() > capacity as usize {
        return Err(MalformedBoard::OverCapacity {
            zone,
            pieces: pieces.len(),
            capacity,
        });
    }

    let counts = species_counts(pieces);
    let species_ok = match species_rule {
        SpeciesRule::Any => true,
        SpeciesRule::AllSame => counts.iter().filter(|&&c| c > 0).count() <= 1,
        SpeciesRule::AllDifferent => counts.iter().all(|&c| c <= 1),
    };
    if !species_ok {
        return Err(MalformedBoard::SpeciesRuleBroken { zone });
    }

    match order_rule {
        OrderRule::Sequential => {
            // A piece without a slot is taken to be in its positional slot.
            for (idx, piece) in pieces.iter().enumerate() {
                let expected = idx as u8 + 1;
                if piece.slot.unwrap_or(expected) != expected {
                    return Err(MalformedBoard::GapInSequence {
                        zone,
                        slot: expected,
                    });
                }
            }
        }
        OrderRule::Free => {
            let mut seen = BTreeSet::new();
            for slot in pieces.iter().filter_map(|p| p.slot) {
                if slot == 0 || slot > capacity {
                    return Err(MalformedBoard::SlotOutOfRange {
                        zone,
                        slot,
                        capacity,
                    });
                }
                if !seen.insert(slot) {
                    return Err(MalformedBoard::SlotTakenTwice { zone, slot });
                }
            }
        }
    }
    Ok(())
}

impl FromIterator<(ZoneId, Vec<Piece>)> for Board {
    fn from_iter<T: IntoIterator<Item = (ZoneId, Vec<Piece>)>>(iter: T) -> Self {
        Board(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (zone, pieces) in self.iter() {
            write!(f, "{:>22} │", zone.as_str())?;
            for piece in pieces {
                write!(f, " {}", piece.species)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A snapshot of everything the rules need to know: the park of every
/// player, and the die.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(deserialize_with = "deserialize_player_map")]
    pub boards: BTreeMap<PlayerId, Board>,
    pub die: DieState,
}

impl GameState {
    pub fn board(&self, player: PlayerId) -> Option<&Board> {
        self.boards.get(&player)
    }
}

/// Reads a map keyed by player id.
///
/// JSON object keys are always strings. Inside an internally tagged enum serde
/// no longer turns them into numbers on its own, so they are parsed here.
pub(crate) fn deserialize_player_map<'de, D, T>(
    deserializer: D,
) -> Result<BTreeMap<PlayerId, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    BTreeMap::<String, T>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| match key.parse::<PlayerId>() {
            Ok(player) => Ok((player, value)),
            Err(_) => Err(D::Error::custom(format!("invalid player id '{}'", key))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Species::*;

    fn pieces(species: &[Species]) -> Vec<Piece> {
        species
            .iter()
            .enumerate()
            .map(|(idx, &s)| Piece::new(idx as u32, s, 1).placed(1, idx as u8 + 1))
            .collect()
    }

    #[test]
    fn counting() {
        let board: Board = [
            (ZoneId::ForestOfSameness, pieces(&[TRex, TRex])),
            (ZoneId::River, pieces(&[Pteranodon, TRex, Stegosaurus])),
            (ZoneId::WoodyTrio, vec![]),
        ]
        .into_iter()
        .collect();
        assert_eq!(board.len(), 5);
        assert_eq!(board.count_species(TRex), 3);
        assert_eq!(board.distinct_species(), 3);
        assert!(board.is_zone_empty(ZoneId::WoodyTrio));
        assert!(board.is_zone_empty(ZoneId::SolitaryIsland));
        assert!(board.zone_contains(ZoneId::River, Pteranodon));
        assert_eq!(board.iter().count(), 2);
    }

    #[test]
    fn owned_by_filters_other_players() {
        let mut board = Board::new();
        board.place(ZoneId::River, Piece::new(1, TRex, 1).placed(1, 1));
        board.place(ZoneId::River, Piece::new(2, TRex, 2).placed(2, 2));
        let owned = board.owned_by(2);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned.pieces(ZoneId::River)[0].id, 2);
    }

    #[test]
    fn invariants() {
        let table = ZoneRuleTable::standard();

        let ok: Board = [(ZoneId::ForestOfSameness, pieces(&[TRex, TRex]))]
            .into_iter()
            .collect();
        assert_eq!(ok.check_invariants(&table), Ok(()));

        let mixed: Board = [(ZoneId::ForestOfSameness, pieces(&[TRex, Pteranodon]))]
            .into_iter()
            .collect();
        assert_eq!(
            mixed.check_invariants(&table),
            Err(MalformedBoard::SpeciesRuleBroken {
                zone: ZoneId::ForestOfSameness
            })
        );

        let full: Board = [(
            ZoneId::SolitaryIsland,
            pieces(&[TRex, Pteranodon]),
        )]
        .into_iter()
        .collect();
        assert!(matches!(
            full.check_invariants(&table),
            Err(MalformedBoard::OverCapacity { pieces: 2, .. })
        ));

        let gap: Board = [(
            ZoneId::River,
            vec![Piece::new(1, TRex, 1).placed(1, 2)],
        )]
        .into_iter()
        .collect();
        assert_eq!(
            gap.check_invariants(&table),
            Err(MalformedBoard::GapInSequence {
                zone: ZoneId::River,
                slot: 1
            })
        );

        let twice: Board = [(
            ZoneId::PrairieOfLove,
            vec![
                Piece::new(1, TRex, 1).placed(1, 4),
                Piece::new(2, TRex, 1).placed(1, 4),
            ],
        )]
        .into_iter()
        .collect();
        assert_eq!(
            twice.check_invariants(&table),
            Err(MalformedBoard::SlotTakenTwice {
                zone: ZoneId::PrairieOfLove,
                slot: 4
            })
        );
    }

    #[test]
    fn game_state_json() {
        let json = r#"{"boards":{"1":{"river":[{"id":3,"species":"trex","owner":1,"slot":1}]},"2":{}},"die":{"active":false}}"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.board(1).unwrap().count_species(TRex), 1);
        assert!(state.board(2).unwrap().is_empty());
        assert!(state.board(3).is_none());
        assert!(!state.die.active);

        let roundtrip: GameState = serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();
        assert_eq!(roundtrip, state);

        // Without the die, nothing can be checked.
        assert!(serde_json::from_str::<GameState>(r#"{"boards":{"1":{}}}"#).is_err());
        assert!(serde_json::from_str::<GameState>(
            r#"{"boards":{"one":{}},"die":{"active":false}}"#
        )
        .is_err());
    }

    #[test]
    fn zone_pieces() {
        let table = ZoneRuleTable::standard();
        assert_eq!(
            check_zone_pieces(&table, ZoneId::WoodyTrio, &pieces(&[TRex, Pteranodon])),
            Ok(())
        );
        assert_eq!(
            check_zone_pieces(&table, ZoneId::MeadowOfDifferences, &pieces(&[TRex, TRex])),
            Err(MalformedBoard::SpeciesRuleBroken {
                zone: ZoneId::MeadowOfDifferences
            })
        );
    }
}
