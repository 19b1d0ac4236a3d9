use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use draftosaurus::{DieState, Move, Piece, PlayerId, ScoreReport};
use serde::Serialize;

/// Writes one JSON file per game into a directory.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
    turns: Vec<TurnRecord>,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: 1,
            directory,
            turns: Vec::new(),
        })
    }

    pub fn store_turn(&mut self, turn: TurnRecord) {
        self.turns.push(turn);
    }

    /// Writes the turns stored since the last recording, and the outcome.
    pub fn write_game_recording(&mut self, outcome: RecordedOutcome<'_>) -> anyhow::Result<PathBuf> {
        let filepath = self.directory.join(format!("game_{:0>6}.json", self.num));
        let writer = BufWriter::new(File::create(&filepath)?);
        let recording = GameRecording {
            turns: std::mem::take(&mut self.turns),
            outcome,
        };
        serde_json::to_writer_pretty(writer, &recording)?;
        self.num += 1;
        Ok(filepath)
    }
}

#[derive(Serialize)]
pub struct GameRecording<'a> {
    turns: Vec<TurnRecord>,
    outcome: RecordedOutcome<'a>,
}

/// What happened in one turn of one player.
#[derive(Clone, Debug, Serialize)]
pub struct TurnRecord {
    pub round: u32,
    pub player: PlayerId,
    pub die: DieState,
    /// The hand before the turn.
    pub hand: Vec<Piece>,
    /// `None` if the player passed.
    #[serde(rename = "move")]
    pub mv: Option<Move>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecordedOutcome<'a> {
    Finished {
        scores: &'a BTreeMap<PlayerId, ScoreReport>,
        winners: &'a [PlayerId],
    },
    IllegalMove {
        player: PlayerId,
        error: String,
    },
}
