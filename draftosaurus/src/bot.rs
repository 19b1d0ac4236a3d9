use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{GameState, Piece, PlayerId, ValidationCoordinator, ZoneId};

/// A placement chosen by a bot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub piece: Piece,
    pub zone: ZoneId,
    pub slot: u8,
}

/// A rule-following automated player.
///
/// It takes the first available piece that fits anywhere, puts it into the
/// first zone (in zone order) that has room for it, and picks one of the legal
/// slots of that zone at random.
#[derive(Clone, Copy, Debug)]
pub struct BotAgent<'c> {
    coordinator: &'c ValidationCoordinator,
}

impl<'c> BotAgent<'c> {
    pub fn new(coordinator: &'c ValidationCoordinator) -> Self {
        Self { coordinator }
    }

    /// Returns `None` if no available piece can be placed anywhere, which
    /// means the bot passes.
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        player: PlayerId,
        state: &GameState,
        available: &[Piece],
    ) -> Option<Move> {
        let Some(board) = state.board(player) else {
            warn!(player, "No board for bot, passing");
            return None;
        };
        for piece in available {
            let zones = match self.coordinator.legal_zones(player, state, piece) {
                Ok(zones) => zones,
                Err(err) => {
                    warn!(player, %err, "Bot cannot judge the game state, passing");
                    return None;
                }
            };
            for zone in zones {
                let pieces = board.pieces(zone);
                let slots: Vec<u8> = match self.coordinator.legal_slots(zone, pieces, piece, player, state) {
                    Ok(slots) => slots.into_iter().collect(),
                    Err(_) => continue,
                };
                if let Some(&slot) = slots.choose(rng) {
                    debug!(player, %piece, %zone, slot, "Bot chose a move");
                    return Some(Move {
                        piece: *piece,
                        zone,
                        slot,
                    });
                }
            }
        }
        debug!(player, available = available.len(), "Bot found no legal move");
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quickcheck::{quickcheck, TestResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::arbitrary::GameInput;
    use crate::{Board, DieState, RestrictionKind, Species::*};

    quickcheck! {
        fn bot_moves_validate(input: GameInput, seed: u64) -> bool {
            let coordinator = ValidationCoordinator::default();
            let bot = BotAgent::new(&coordinator);
            let mut rng = StdRng::seed_from_u64(seed);
            match bot.choose_move(&mut rng, input.player, &input.state, &input.available) {
                Some(mv) => {
                    let pieces = input.state.boards[&input.player].pieces(mv.zone);
                    coordinator
                        .validate(mv.zone, pieces, &mv.piece, Some(mv.slot), input.player, &input.state)
                        .valid
                }
                None => input.available.iter().all(|piece| {
                    coordinator
                        .legal_zones(input.player, &input.state, piece)
                        .map(|zones| zones.is_empty())
                        .unwrap_or(true)
                }),
            }
        }

        fn same_seed_same_move(input: GameInput, seed: u64) -> TestResult {
            if input.available.is_empty() {
                return TestResult::discard();
            }
            let coordinator = ValidationCoordinator::default();
            let bot = BotAgent::new(&coordinator);
            let first = bot.choose_move(&mut StdRng::seed_from_u64(seed), input.player, &input.state, &input.available);
            let second = bot.choose_move(&mut StdRng::seed_from_u64(seed), input.player, &input.state, &input.available);
            TestResult::from_bool(first == second)
        }
    }

    #[test]
    fn takes_first_fitting_piece_and_zone() {
        let coordinator = ValidationCoordinator::default();
        let bot = BotAgent::new(&coordinator);
        let state = GameState {
            boards: BTreeMap::from([(1, Board::new()), (2, Board::new())]),
            die: DieState {
                active: true,
                face: String::from("restrooms"),
                rolled_by: 1,
                round: 1,
            },
        };
        let available = [Piece::new(5, Brontosaurus, 2), Piece::new(6, TRex, 2)];
        let mv = bot
            .choose_move(&mut StdRng::seed_from_u64(1), 2, &state, &available)
            .unwrap();
        // Right of the river: meadow, king, island. The meadow comes first.
        assert_eq!(mv.piece.id, 5);
        assert_eq!(mv.zone, ZoneId::MeadowOfDifferences);
        assert_eq!(mv.slot, 1);
    }

    #[test]
    fn passes_when_nothing_fits() {
        let coordinator = ValidationCoordinator::default();
        let bot = BotAgent::new(&coordinator);
        let mut board = Board::new();
        for slot in 1..=7 {
            board.place(ZoneId::River, Piece::new(slot as u32, TRex, 2).placed(2, slot));
        }
        board.place(ZoneId::KingOfTheJungle, Piece::new(10, TRex, 2).placed(2, 1));
        board.place(ZoneId::SolitaryIsland, Piece::new(11, TRex, 2).placed(2, 1));
        board.place(ZoneId::MeadowOfDifferences, Piece::new(12, Brontosaurus, 2).placed(2, 1));
        let state = GameState {
            boards: BTreeMap::from([(1, Board::new()), (2, board)]),
            die: DieState {
                active: true,
                face: String::from("restrooms"),
                rolled_by: 1,
                round: 1,
            },
        };
        let available = [Piece::new(20, Brontosaurus, 2)];
        assert_eq!(
            bot.choose_move(&mut StdRng::seed_from_u64(1), 2, &state, &available),
            None
        );
        // The empty woody trio is on the other side of the river.
        let verdict = coordinator.validate(ZoneId::WoodyTrio, &[], &available[0], None, 2, &state);
        assert_eq!(verdict.restriction_kind, RestrictionKind::Die);
    }

    #[test]
    fn passes_on_malformed_state() {
        let coordinator = ValidationCoordinator::default();
        let bot = BotAgent::new(&coordinator);
        let state = GameState::default();
        assert_eq!(
            bot.choose_move(&mut StdRng::seed_from_u64(1), 1, &state, &[Piece::new(1, TRex, 1)]),
            None
        );
    }
}
