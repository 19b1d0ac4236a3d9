use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one of the zones ("enclosures") of a player's park.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneId {
    ForestOfSameness,
    MeadowOfDifferences,
    PrairieOfLove,
    WoodyTrio,
    KingOfTheJungle,
    SolitaryIsland,
    River,
}

impl ZoneId {
    pub const ALL: [ZoneId; 7] = [
        ZoneId::ForestOfSameness,
        ZoneId::MeadowOfDifferences,
        ZoneId::PrairieOfLove,
        ZoneId::WoodyTrio,
        ZoneId::KingOfTheJungle,
        ZoneId::SolitaryIsland,
        ZoneId::River,
    ];

    /// The identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneId::ForestOfSameness => "forest-of-sameness",
            ZoneId::MeadowOfDifferences => "meadow-of-differences",
            ZoneId::PrairieOfLove => "prairie-of-love",
            ZoneId::WoodyTrio => "woody-trio",
            ZoneId::KingOfTheJungle => "king-of-the-jungle",
            ZoneId::SolitaryIsland => "solitary-island",
            ZoneId::River => "river",
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error type for the [`FromStr`] instance of [`ZoneId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownZone(pub String);

impl std::error::Error for UnknownZone {}

impl std::fmt::Display for UnknownZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unrecognized zone '{}'", self.0)
    }
}

impl FromStr for ZoneId {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneId::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| UnknownZone(String::from(s)))
    }
}

/// Which species may share a zone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeciesRule {
    Any,
    AllSame,
    AllDifferent,
}

/// In which order the slots of a zone are filled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderRule {
    /// Any unoccupied slot.
    Free,
    /// Left to right: the n-th piece goes into slot n.
    Sequential,
}

/// How a zone is scored at the end of the game.
///
/// See [`ScoreCalculator`](crate::ScoreCalculator) for the formulas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoringRule {
    /// Progressive points for the largest group of one species.
    LargestGroup,
    /// Progressive points for the number of distinct species.
    Variety,
    /// A fixed bonus for exactly `count` pieces.
    ExactCount { count: usize, points: u32 },
    /// Points for every two pieces of the same species.
    Pairs { points_per_pair: u32 },
    /// Progressive points for the number of pieces, one step longer than
    /// the species tables.
    Sequence,
    /// A fixed bonus unless a rival's park has strictly more of the species.
    ApexOwnership { points: u32 },
    /// A fixed bonus if the species appears nowhere else in the park.
    Uniqueness { points: u32 },
}

/// The two areas of the park, used by the area die faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Forest,
    Plains,
}

/// The two banks of the river, used by the side die faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiverSide {
    Left,
    Right,
}

/// Everything there is to know about one zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRule {
    /// Display name, used as a prefix of error messages.
    pub name: String,
    pub description: String,
    pub capacity: u8,
    pub species_rule: SpeciesRule,
    pub order_rule: OrderRule,
    pub scoring: ScoringRule,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub side: Option<RiverSide>,
    /// A wildcard zone can be selected regardless of the die.
    #[serde(default)]
    pub wildcard: bool,
}

/// The catalog of zones, keyed by id.
///
/// A zone that is missing from the table is treated as unrecognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneRuleTable(BTreeMap<ZoneId, ZoneRule>);

impl ZoneRuleTable {
    pub fn new(zones: BTreeMap<ZoneId, ZoneRule>) -> Self {
        Self(zones)
    }

    /// The zones of the standard park.
    pub fn standard() -> Self {
        let zone = |name: &str,
                    description: &str,
                    capacity: u8,
                    species_rule: SpeciesRule,
                    order_rule: OrderRule,
                    scoring: ScoringRule,
                    area: Option<Area>,
                    side: Option<RiverSide>| ZoneRule {
            name: String::from(name),
            description: String::from(description),
            capacity,
            species_rule,
            order_rule,
            scoring,
            area,
            side,
            wildcard: false,
        };

        let mut zones = BTreeMap::new();
        zones.insert(
            ZoneId::ForestOfSameness,
            zone(
                "Forest of Sameness",
                "All dinosaurs must be of the same species, placed from left to right",
                6,
                SpeciesRule::AllSame,
                OrderRule::Sequential,
                ScoringRule::LargestGroup,
                Some(Area::Forest),
                Some(RiverSide::Left),
            ),
        );
        zones.insert(
            ZoneId::MeadowOfDifferences,
            zone(
                "Meadow of Differences",
                "All dinosaurs must be of different species, placed from left to right",
                6,
                SpeciesRule::AllDifferent,
                OrderRule::Sequential,
                ScoringRule::Variety,
                Some(Area::Plains),
                Some(RiverSide::Right),
            ),
        );
        zones.insert(
            ZoneId::PrairieOfLove,
            zone(
                "Prairie of Love",
                "Any species, any empty slot; 5 points for every pair",
                6,
                SpeciesRule::Any,
                OrderRule::Free,
                ScoringRule::Pairs { points_per_pair: 5 },
                Some(Area::Plains),
                Some(RiverSide::Left),
            ),
        );
        zones.insert(
            ZoneId::WoodyTrio,
            zone(
                "Woody Trio",
                "At most 3 dinosaurs of any species; 7 points for exactly 3",
                3,
                SpeciesRule::Any,
                OrderRule::Free,
                ScoringRule::ExactCount {
                    count: 3,
                    points: 7,
                },
                Some(Area::Forest),
                Some(RiverSide::Left),
            ),
        );
        zones.insert(
            ZoneId::KingOfTheJungle,
            zone(
                "King of the Jungle",
                "A single dinosaur; 7 points if no rival has more of its species",
                1,
                SpeciesRule::Any,
                OrderRule::Free,
                ScoringRule::ApexOwnership { points: 7 },
                Some(Area::Forest),
                Some(RiverSide::Right),
            ),
        );
        zones.insert(
            ZoneId::SolitaryIsland,
            zone(
                "Solitary Island",
                "A single dinosaur; 7 points if it is the only one of its species in the park",
                1,
                SpeciesRule::Any,
                OrderRule::Free,
                ScoringRule::Uniqueness { points: 7 },
                Some(Area::Plains),
                Some(RiverSide::Right),
            ),
        );
        zones.insert(
            ZoneId::River,
            ZoneRule {
                wildcard: true,
                ..zone(
                    "River",
                    "Wildcard, always available; placed from left to right",
                    7,
                    SpeciesRule::Any,
                    OrderRule::Sequential,
                    ScoringRule::Sequence,
                    None,
                    None,
                )
            },
        );
        Self(zones)
    }

    pub fn get(&self, zone: ZoneId) -> Option<&ZoneRule> {
        self.0.get(&zone)
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        self.0.contains_key(&zone)
    }

    /// All zone ids, in a fixed order.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &ZoneRule)> + '_ {
        self.0.iter().map(|(&zone, rule)| (zone, rule))
    }

    /// The zones that are always selectable.
    pub fn wildcards(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.iter()
            .filter(|(_, rule)| rule.wildcard)
            .map(|(zone, _)| zone)
    }

    pub fn zones_in_area(&self, area: Area) -> impl Iterator<Item = ZoneId> + '_ {
        self.iter()
            .filter(move |(_, rule)| rule.area == Some(area))
            .map(|(zone, _)| zone)
    }

    pub fn zones_on_side(&self, side: RiverSide) -> impl Iterator<Item = ZoneId> + '_ {
        self.iter()
            .filter(move |(_, rule)| rule.side == Some(side))
            .map(|(zone, _)| zone)
    }
}

impl Default for ZoneRuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
