use std::collections::BTreeMap;

use draftosaurus::{
    Board, BotAgent, GameState, Move, Piece, PlayerId, ScoreCalculator, ScoreReport, Species,
    ValidationCoordinator,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::error::IllegalMove;
use crate::recording::{RecordedOutcome, Recorder, TurnRecord};

/// How many pieces of each species are in the bag.
pub const PIECES_PER_SPECIES: usize = 10;

/// How many pieces each player drafts at the start of a draft. A draft has as
/// many rounds as there are pieces in a hand.
pub const HAND_SIZE: usize = 6;

/// The shape of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub num_players: u32,
    pub num_drafts: u32,
}

impl GameConfig {
    pub fn new(num_players: u32, num_drafts: u32) -> anyhow::Result<Self> {
        if !(2..=3).contains(&num_players) {
            anyhow::bail!("A game needs 2 or 3 players, not {}", num_players);
        }
        let needed = num_players as usize * num_drafts as usize * HAND_SIZE;
        let available = PIECES_PER_SPECIES * Species::ALL.len();
        if needed > available {
            anyhow::bail!(
                "{} drafts with {} players need {} pieces, but the bag only has {}",
                num_drafts,
                num_players,
                needed,
                available
            );
        }
        Ok(Self {
            num_players,
            num_drafts,
        })
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        1..=self.num_players
    }
}

pub enum GameResult {
    Finished {
        state: GameState,
        scores: BTreeMap<PlayerId, ScoreReport>,
        /// More than one player if there is a tie.
        winners: Vec<PlayerId>,
    },
    IllegalMoveByPlayer {
        player: PlayerId,
        err: IllegalMove,
    },
}

/// A shuffled bag with every piece of the game.
pub fn fill_bag(rng: &mut StdRng) -> Vec<Piece> {
    let mut bag: Vec<Piece> = Species::ALL
        .into_iter()
        .flat_map(|species| std::iter::repeat(species).take(PIECES_PER_SPECIES))
        .zip(1..)
        .map(|(species, id)| Piece::new(id, species, 0))
        .collect();
    bag.shuffle(rng);
    bag
}

/// Checks a move against the rules, and applies it if it is legal.
///
/// The move is judged by the referee itself, whoever produced it, and it is
/// rejected whenever it cannot be judged.
pub fn apply_move(
    coordinator: &ValidationCoordinator,
    state: &mut GameState,
    hand: &mut Vec<Piece>,
    player: PlayerId,
    mv: Move,
) -> Result<(), IllegalMove> {
    let hand_idx = hand
        .iter()
        .position(|p| p.id == mv.piece.id)
        .ok_or(IllegalMove::PieceNotInHand {
            piece_id: mv.piece.id,
        })?;
    // Only the piece in the hand counts, not what the move claims it is.
    let piece = hand[hand_idx];

    let pieces_in_zone = state
        .board(player)
        .map(|board| board.pieces(mv.zone))
        .unwrap_or(&[]);
    let verdict = coordinator
        .try_validate(mv.zone, pieces_in_zone, &piece, Some(mv.slot), player, state)
        .map_err(|err| IllegalMove::Unjudgeable { zone: mv.zone, err })?;
    if !verdict.valid {
        return Err(IllegalMove::RejectedPlacement {
            zone: mv.zone,
            slot: mv.slot,
            kind: verdict.restriction_kind,
            reason: verdict.reason,
        });
    }

    hand.remove(hand_idx);
    state
        .boards
        .entry(player)
        .or_default()
        .place(mv.zone, piece.placed(player, mv.slot));
    Ok(())
}

/// Plays one game between bots.
///
/// Returns an error only if the recording cannot be written, not when an
/// illegal move is played.
pub fn play_game(
    rng: &mut StdRng,
    config: GameConfig,
    coordinator: &ValidationCoordinator,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<GameResult> {
    let bot = BotAgent::new(coordinator);
    let die_engine = coordinator.die_engine();
    let mut bag = fill_bag(rng);
    let mut state = GameState {
        boards: config.players().map(|player| (player, Board::new())).collect(),
        die: Default::default(),
    };

    let mut round = 0;
    for draft in 1..=config.num_drafts {
        // Every player draws a hand. GameConfig::new() ensures the bag is big enough.
        let mut hands: Vec<Vec<Piece>> = config
            .players()
            .map(|player| {
                let start = bag.len().saturating_sub(HAND_SIZE);
                bag.split_off(start)
                    .into_iter()
                    .map(|piece| Piece { owner: player, ..piece })
                    .collect()
            })
            .collect();
        debug!(draft, "Dealt hands");

        for _ in 0..HAND_SIZE {
            round += 1;
            state.die = die_engine.roll(rng, round, config.num_players);

            for (player, hand) in config.players().zip(hands.iter_mut()) {
                let mv = bot.choose_move(rng, player, &state, hand);
                if let Some(rec) = recorder {
                    rec.store_turn(TurnRecord {
                        round,
                        player,
                        die: state.die.clone(),
                        hand: hand.clone(),
                        mv,
                    });
                }
                match mv {
                    Some(mv) => {
                        if let Err(err) = apply_move(coordinator, &mut state, hand, player, mv) {
                            warn!(player, round, %err, "Rejected bot move");
                            if let Some(rec) = recorder {
                                rec.write_game_recording(RecordedOutcome::IllegalMove {
                                    player,
                                    error: err.to_string(),
                                })?;
                            }
                            return Ok(GameResult::IllegalMoveByPlayer { player, err });
                        }
                    }
                    None => {
                        // A pass still uses up a piece, so that hands keep the same size.
                        if !hand.is_empty() {
                            let discarded = hand.remove(0);
                            debug!(player, round, %discarded, "Player passed");
                        }
                    }
                }
            }

            // Pass every hand to the next seat.
            hands.rotate_right(1);
            for (player, hand) in config.players().zip(hands.iter_mut()) {
                for piece in hand.iter_mut() {
                    piece.owner = player;
                }
            }
        }
    }

    let scores = ScoreCalculator::new(&coordinator.ruleset().zones).score_all(&state.boards);
    let best = scores.values().map(|report| report.total).max().unwrap_or(0);
    let winners: Vec<PlayerId> = scores
        .values()
        .filter(|report| report.total == best)
        .map(|report| report.player)
        .collect();

    if let Some(rec) = recorder {
        rec.write_game_recording(RecordedOutcome::Finished {
            scores: &scores,
            winners: &winners,
        })?;
    }

    Ok(GameResult::Finished {
        state,
        scores,
        winners,
    })
}
