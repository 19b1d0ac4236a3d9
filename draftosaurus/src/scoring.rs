use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{species_counts, Board, Piece, PlayerId, ScoringRule, ZoneId, ZoneRuleTable};

/// Points by group size, for the same-species and all-different zones.
pub const SPECIES_TABLE: [u32; 7] = [0, 1, 3, 6, 10, 15, 21];

/// Points by number of pieces in the river. One step longer than
/// [`SPECIES_TABLE`] because the river holds seven pieces.
pub const SEQUENCE_TABLE: [u32; 8] = [0, 1, 3, 6, 10, 15, 21, 28];

/// A player needs this many completed zones for [`Bonus::CompletedZones`].
pub const COMPLETED_ZONES_THRESHOLD: usize = 5;
pub const COMPLETED_ZONES_POINTS: u32 = 10;

/// A player needs this many distinct species for [`Bonus::Diversity`].
pub const DIVERSITY_THRESHOLD: usize = 6;
pub const DIVERSITY_POINTS: u32 = 8;

/// Looks up `n` in a progressive table, clamping at the last entry.
fn progressive(table: &[u32], n: usize) -> u32 {
    table[n.min(table.len() - 1)]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bonus {
    CompletedZones,
    Diversity,
}

/// The final score of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub player: PlayerId,
    /// Points per zone. Every zone of the ruleset is listed, empty ones with 0.
    pub per_zone: BTreeMap<ZoneId, u32>,
    /// How many of the player's pieces are in each zone.
    pub pieces_per_zone: BTreeMap<ZoneId, usize>,
    /// Only the bonuses that were earned.
    pub bonuses: BTreeMap<Bonus, u32>,
    pub completed_zones: usize,
    /// The number of distinct species in the park.
    pub diversity: usize,
    pub total: u32,
}

impl ScoreReport {
    pub fn zone_points(&self) -> u32 {
        self.per_zone.values().sum()
    }

    pub fn bonus_points(&self) -> u32 {
        self.bonuses.values().sum()
    }
}

/// Computes final scores. Scoring never fails: empty, missing or unknown zones
/// are worth nothing.
#[derive(Clone, Copy, Debug)]
pub struct ScoreCalculator<'r> {
    zones: &'r ZoneRuleTable,
}

impl<'r> ScoreCalculator<'r> {
    pub fn new(zones: &'r ZoneRuleTable) -> Self {
        Self { zones }
    }

    /// Scores `board` for `player`.
    ///
    /// Only pieces owned by `player` count, so the board may be shared with
    /// other players. `all_boards` are the boards of every player, used by
    /// the zones that compare players. An entry for `player` in it is ignored.
    pub fn score_board(
        &self,
        board: &Board,
        player: PlayerId,
        all_boards: &BTreeMap<PlayerId, Board>,
    ) -> ScoreReport {
        let board = board.owned_by(player);
        let rivals: Vec<Board> = all_boards
            .iter()
            .filter(|(&id, _)| id != player)
            .map(|(&id, rival)| rival.owned_by(id))
            .collect();

        let mut per_zone = BTreeMap::new();
        let mut pieces_per_zone = BTreeMap::new();
        let mut completed_zones = 0;
        for (zone, rule) in self.zones.iter() {
            let pieces = board.pieces(zone);
            per_zone.insert(zone, zone_points(rule.scoring, pieces, &board, &rivals));
            pieces_per_zone.insert(zone, pieces.len());
            if is_completed(rule.scoring, pieces) {
                completed_zones += 1;
            }
        }

        let diversity = board.distinct_species();
        let mut bonuses = BTreeMap::new();
        if completed_zones >= COMPLETED_ZONES_THRESHOLD {
            bonuses.insert(Bonus::CompletedZones, COMPLETED_ZONES_POINTS);
        }
        if diversity >= DIVERSITY_THRESHOLD {
            bonuses.insert(Bonus::Diversity, DIVERSITY_POINTS);
        }

        let total = per_zone.values().sum::<u32>() + bonuses.values().sum::<u32>();
        ScoreReport {
            player,
            per_zone,
            pieces_per_zone,
            bonuses,
            completed_zones,
            diversity,
            total,
        }
    }

    /// Scores every board in `boards`.
    pub fn score_all(&self, boards: &BTreeMap<PlayerId, Board>) -> BTreeMap<PlayerId, ScoreReport> {
        boards
            .iter()
            .map(|(&player, board)| (player, self.score_board(board, player, boards)))
            .collect()
    }
}

/// `board` is the scorer's whole park, `rivals` the parks of all others.
fn zone_points(rule: ScoringRule, pieces: &[Piece], board: &Board, rivals: &[Board]) -> u32 {
    let counts = species_counts(pieces);
    match rule {
        ScoringRule::LargestGroup => {
            progressive(&SPECIES_TABLE, counts.iter().copied().max().unwrap_or(0))
        }
        ScoringRule::Variety => {
            progressive(&SPECIES_TABLE, counts.iter().filter(|&&c| c > 0).count())
        }
        ScoringRule::ExactCount { count, points } => {
            if pieces.len() == count {
                points
            } else {
                0
            }
        }
        ScoringRule::Pairs { points_per_pair } => {
            counts.iter().map(|&c| (c / 2) as u32).sum::<u32>() * points_per_pair
        }
        ScoringRule::Sequence => progressive(&SEQUENCE_TABLE, pieces.len()),
        ScoringRule::ApexOwnership { points } => match pieces {
            [piece] => {
                let mine = board.count_species(piece.species);
                // Ties go to the scorer.
                if rivals.iter().any(|rival| rival.count_species(piece.species) > mine) {
                    0
                } else {
                    points
                }
            }
            _ => 0,
        },
        ScoringRule::Uniqueness { points } => match pieces {
            [piece] if board.count_species(piece.species) == 1 => points,
            _ => 0,
        },
    }
}

fn is_completed(rule: ScoringRule, pieces: &[Piece]) -> bool {
    let counts = species_counts(pieces);
    match rule {
        ScoringRule::LargestGroup => pieces.len() >= 3,
        ScoringRule::Variety => counts.iter().filter(|&&c| c > 0).count() >= 3,
        ScoringRule::ExactCount { count, .. } => pieces.len() == count,
        ScoringRule::Pairs { .. } => counts.iter().any(|&c| c >= 2),
        ScoringRule::Sequence => pieces.len() >= 4,
        ScoringRule::ApexOwnership { .. } | ScoringRule::Uniqueness { .. } => pieces.len() == 1,
    }
}
