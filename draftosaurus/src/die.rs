use std::collections::{BTreeMap, BTreeSet};

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Area, Board, DieRestricted, PlayerId, RiverSide, ZoneId, ZoneRuleTable, APEX_SPECIES};

/// The placement die of the current round.
///
/// `active` is required, and so are `face` and `rolled_by` for an active die.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DieStateFields")]
pub struct DieState {
    /// An inactive die restricts nobody.
    pub active: bool,
    /// The id of the face that was rolled, see [`DieFaceTable`].
    pub face: String,
    /// The player who rolled the die. They are exempt from it this round.
    pub rolled_by: PlayerId,
    pub round: u32,
}

#[derive(Deserialize)]
struct DieStateFields {
    active: bool,
    face: Option<String>,
    rolled_by: Option<PlayerId>,
    #[serde(default)]
    round: u32,
}

impl TryFrom<DieStateFields> for DieState {
    type Error = String;

    fn try_from(fields: DieStateFields) -> Result<Self, Self::Error> {
        match (fields.active, fields.face, fields.rolled_by) {
            (true, Some(face), Some(rolled_by)) => Ok(DieState {
                active: true,
                face,
                rolled_by,
                round: fields.round,
            }),
            (true, _, _) => Err(String::from("an active die needs a face and the player who rolled it")),
            (false, face, rolled_by) => Ok(DieState {
                active: false,
                face: face.unwrap_or_default(),
                rolled_by: rolled_by.unwrap_or_default(),
                round: fields.round,
            }),
        }
    }
}

impl DieState {
    /// Whether `player` may ignore the die.
    pub fn exempts(&self, player: PlayerId) -> bool {
        !self.active || self.rolled_by == player
    }
}

/// The shapes of restriction a die face can impose.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Restriction {
    /// Only zones in this area.
    Area { area: Area },
    /// Only zones on this side of the river.
    Side { side: RiverSide },
    /// Only zones without any piece.
    EmptyZone,
    /// Only zones without a piece of the apex species.
    NoApex,
}

/// One face of the die.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieFace {
    pub name: String,
    pub description: String,
    pub restriction: Restriction,
}

/// The faces of the die, keyed by face id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DieFaceTable(BTreeMap<String, DieFace>);

impl DieFaceTable {
    pub fn new(faces: BTreeMap<String, DieFace>) -> Self {
        Self(faces)
    }

    /// The six faces of the standard die.
    pub fn standard() -> Self {
        let face = |name: &str, description: &str, restriction| DieFace {
            name: String::from(name),
            description: String::from(description),
            restriction,
        };
        let faces = [
            (
                "forest",
                face(
                    "Forest",
                    "Only zones in the forest area",
                    Restriction::Area { area: Area::Forest },
                ),
            ),
            (
                "plains",
                face(
                    "Plains",
                    "Only zones in the plains area",
                    Restriction::Area { area: Area::Plains },
                ),
            ),
            (
                "restrooms",
                face(
                    "Restrooms",
                    "Only zones to the right of the river",
                    Restriction::Side {
                        side: RiverSide::Right,
                    },
                ),
            ),
            (
                "cafeteria",
                face(
                    "Cafeteria",
                    "Only zones to the left of the river",
                    Restriction::Side {
                        side: RiverSide::Left,
                    },
                ),
            ),
            (
                "empty-zone",
                face(
                    "Empty zone",
                    "Only zones without any dinosaur",
                    Restriction::EmptyZone,
                ),
            ),
            (
                "no-trex",
                face(
                    "Beware of the T-Rex",
                    "Only zones without a T-Rex",
                    Restriction::NoApex,
                ),
            ),
        ];
        Self(
            faces
                .into_iter()
                .map(|(id, face)| (String::from(id), face))
                .collect(),
        )
    }

    pub fn get(&self, face: &str) -> Option<&DieFace> {
        self.0.get(face)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DieFace)> + '_ {
        self.0.iter().map(|(id, face)| (id.as_str(), face))
    }
}

impl Default for DieFaceTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// The seat that rolls the die in a round: it rotates, starting with player 1.
pub fn rolling_player(round: u32, num_players: u32) -> PlayerId {
    (round.saturating_sub(1) % num_players.max(1)) + 1
}

/// Evaluates the "active" rules: which zones the die allows.
///
/// The engine only reads its inputs. The board passed to it is the board of
/// the acting player.
#[derive(Clone, Copy, Debug)]
pub struct DieRestrictionEngine<'r> {
    zones: &'r ZoneRuleTable,
    faces: &'r DieFaceTable,
}

impl<'r> DieRestrictionEngine<'r> {
    pub fn new(zones: &'r ZoneRuleTable, faces: &'r DieFaceTable) -> Self {
        Self { zones, faces }
    }

    /// Is the acting player allowed to target this zone?
    pub fn zone_allowed(
        &self,
        zone: ZoneId,
        die: &DieState,
        board: &Board,
        player: PlayerId,
    ) -> bool {
        self.allowed_zones(die, board, player).contains(&zone)
    }

    /// Like [`Self::zone_allowed()`], but explains the restriction.
    pub fn check(
        &self,
        zone: ZoneId,
        die: &DieState,
        board: &Board,
        player: PlayerId,
    ) -> Result<(), DieRestricted> {
        if self.zone_allowed(zone, die, board, player) {
            Ok(())
        } else {
            Err(DieRestricted {
                zone,
                message: self.restriction_message(die, player),
            })
        }
    }

    /// All zones the acting player may target. Wildcard zones are always included.
    pub fn allowed_zones(&self, die: &DieState, board: &Board, player: PlayerId) -> BTreeSet<ZoneId> {
        if die.exempts(player) {
            return self.zones.zones().collect();
        }
        let Some(face) = self.faces.get(&die.face) else {
            warn!(face = %die.face, round = die.round, "Unrecognized die face, allowing every zone");
            return self.zones.zones().collect();
        };

        let mut allowed: BTreeSet<ZoneId> = match face.restriction {
            Restriction::Area { area } => self.zones.zones_in_area(area).collect(),
            Restriction::Side { side } => self.zones.zones_on_side(side).collect(),
            Restriction::EmptyZone => self
                .zones
                .zones()
                .filter(|&zone| board.is_zone_empty(zone))
                .collect(),
            // This also keeps an apex piece out of a zone that already has one.
            Restriction::NoApex => self
                .zones
                .zones()
                .filter(|&zone| !board.zone_contains(zone, APEX_SPECIES))
                .collect(),
        };
        allowed.extend(self.zones.wildcards());
        allowed
    }

    /// A human-readable explanation of what the die means for `player`.
    pub fn restriction_message(&self, die: &DieState, player: PlayerId) -> String {
        if !die.active {
            return String::from("No die restriction this round");
        }
        if die.rolled_by == player {
            return String::from("You rolled the die - any zone is allowed");
        }
        match self.faces.get(&die.face) {
            Some(face) => format!("{}: {}", face.name, face.description),
            None => String::from("Unknown restriction"),
        }
    }

    /// Rolls the die for a new round. The face is chosen uniformly.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R, round: u32, num_players: u32) -> DieState {
        let face = self.faces.ids().choose(rng).map(String::from);
        DieState {
            // A die without faces cannot restrict anything.
            active: face.is_some(),
            face: face.unwrap_or_default(),
            rolled_by: rolling_player(round, num_players),
            round,
        }
    }
}
