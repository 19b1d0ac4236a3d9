use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::deserialize_player_map;
use crate::{
    Board, Bonus, ErrorCategory, GameState, Move, Piece, PlayerId, ScoreReport,
    ValidationVerdict, ZoneId,
};

/// Request to the rules service. One request per line.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Is this placement legal?
    ///
    /// The response is a [`ValidationVerdict`].
    ValidatePlacement {
        /// The zone id. Kept as a string so that an unknown zone can be
        /// answered with a verdict instead of a parse error.
        zone: String,
        /// The pieces already in the zone, on the acting player's board.
        #[serde(default)]
        pieces_in_zone: Vec<Piece>,
        piece: Piece,
        /// When omitted, any slot is fine.
        #[serde(default)]
        slot: Option<u8>,
        player_id: PlayerId,
        state: GameState,
    },
    /// Which slots of this zone can the piece go into?
    ///
    /// The response is a [`LegalSlotsResponse`].
    GetLegalSlots {
        zone: String,
        #[serde(default)]
        pieces_in_zone: Vec<Piece>,
        piece: Piece,
        player_id: PlayerId,
        state: GameState,
    },
    /// Which zones can the piece go into?
    ///
    /// The response is a [`LegalZonesResponse`].
    GetLegalZones {
        piece: Piece,
        player_id: PlayerId,
        state: GameState,
    },
    /// The final score of a board.
    ///
    /// The response is a [`ScoreResponse`].
    ComputeScore {
        board: Board,
        player_id: PlayerId,
        #[serde(default, deserialize_with = "deserialize_player_map")]
        all_player_boards: BTreeMap<PlayerId, Board>,
    },
    /// Let the bot pick a move for this player.
    ///
    /// The response is a [`BotMoveResponse`].
    RequestBotMove {
        player_id: PlayerId,
        state: GameState,
        available_pieces: Vec<Piece>,
    },
    /// The service should shut down. There is no response.
    Bye,
}

/// Any of the responses, as written by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Verdict(ValidationVerdict),
    LegalSlots(LegalSlotsResponse),
    LegalZones(LegalZonesResponse),
    Score(ScoreResponse),
    BotMove(BotMoveResponse),
    Error(ErrorResponse),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalSlotsResponse {
    pub valid: bool,
    /// Sorted ascending.
    pub legal_slots: Vec<u8>,
    /// Why the slots could not be computed. Only present if not `valid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalZonesResponse {
    pub zones: Vec<ZoneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDetail {
    pub points: u32,
    pub pieces: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub player_id: PlayerId,
    pub total_score: u32,
    pub per_zone_details: BTreeMap<ZoneId, ZoneDetail>,
    pub bonus_details: BTreeMap<Bonus, u32>,
    pub completed_zones: usize,
    pub diversity: usize,
}

impl From<ScoreReport> for ScoreResponse {
    fn from(report: ScoreReport) -> Self {
        let per_zone_details = report
            .per_zone
            .iter()
            .map(|(&zone, &points)| {
                let pieces = report.pieces_per_zone.get(&zone).copied().unwrap_or(0);
                (zone, ZoneDetail { points, pieces })
            })
            .collect();
        Self {
            player_id: report.player,
            total_score: report.total,
            per_zone_details,
            bonus_details: report.bonuses,
            completed_zones: report.completed_zones,
            diversity: report.diversity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMoveResponse {
    /// `None` means the bot passes.
    #[serde(rename = "move")]
    pub mv: Option<Move>,
}

/// The answer to a request that could not be handled at all, e.g. because it
/// is not valid JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub category: ErrorCategory,
}
