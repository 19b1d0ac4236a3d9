use std::collections::BTreeMap;

use quickcheck::{Arbitrary, Gen};

use crate::{
    Board, DieFaceTable, DieState, GameState, OrderRule, Piece, PlayerId, Species, SpeciesRule,
    ZoneId, ZoneRule, ZoneRuleTable,
};

/// The contents of one zone that satisfy its rules, and a candidate piece.
#[derive(Clone, Debug)]
pub struct ZoneInput {
    pub zone: ZoneId,
    pub pieces_in_zone: Vec<Piece>,
    pub piece: Piece,
}

impl Arbitrary for ZoneInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let zones = ZoneRuleTable::standard();
        let zone = ZoneId::arbitrary(g);
        let rule = zones.get(zone).expect("standard zone");
        let owner = 1;
        let mut next_id = 0;
        let pieces_in_zone = zone_pieces(g, rule, owner, &mut next_id);
        let piece = Piece::new(next_id, Species::arbitrary(g), owner);
        ZoneInput {
            zone,
            pieces_in_zone,
            piece,
        }
    }
}

/// A game state with well-formed boards for two or three players, the acting
/// player, and the pieces in their hand.
#[derive(Clone, Debug)]
pub struct GameInput {
    pub state: GameState,
    pub player: PlayerId,
    pub available: Vec<Piece>,
}

impl Arbitrary for GameInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let zones = ZoneRuleTable::standard();
        let num_players = 2 + u32::arbitrary(g) % 2;
        let mut next_id = 0;

        let mut boards = BTreeMap::new();
        for player in 1..=num_players {
            let mut board = Board::new();
            for (zone, rule) in zones.iter() {
                if bool::arbitrary(g) {
                    for piece in zone_pieces(g, rule, player, &mut next_id) {
                        board.place(zone, piece);
                    }
                }
            }
            boards.insert(player, board);
        }

        let faces: Vec<String> = DieFaceTable::standard()
            .ids()
            .map(String::from)
            .chain([String::from("meteor")])
            .collect();
        let die = DieState {
            active: u8::arbitrary(g) % 4 != 0,
            face: g.choose(&faces).cloned().unwrap_or_default(),
            rolled_by: 1 + u32::arbitrary(g) % num_players,
            round: 1 + u32::arbitrary(g) % 12,
        };

        let player = 1 + u32::arbitrary(g) % num_players;
        let available = (0..u8::arbitrary(g) % 4)
            .map(|_| {
                next_id += 1;
                Piece::new(next_id, Species::arbitrary(g), player)
            })
            .collect();

        GameInput {
            state: GameState { boards, die },
            player,
            available,
        }
    }
}

/// Between zero and `capacity` pieces that respect the species and ordering
/// rules of the zone.
fn zone_pieces(g: &mut Gen, rule: &ZoneRule, owner: PlayerId, next_id: &mut u32) -> Vec<Piece> {
    let len = usize::arbitrary(g) % (rule.capacity as usize + 1);
    let species: Vec<Species> = match rule.species_rule {
        SpeciesRule::Any => (0..len).map(|_| Species::arbitrary(g)).collect(),
        SpeciesRule::AllSame => vec![Species::arbitrary(g); len],
        SpeciesRule::AllDifferent => shuffled(g, Species::ALL.to_vec())
            .into_iter()
            .take(len)
            .collect(),
    };
    let slots: Vec<u8> = match rule.order_rule {
        OrderRule::Sequential => (1..=rule.capacity).collect(),
        OrderRule::Free => shuffled(g, (1..=rule.capacity).collect()),
    };
    species
        .into_iter()
        .zip(slots)
        .map(|(species, slot)| {
            *next_id += 1;
            Piece::new(*next_id, species, owner).placed(owner, slot)
        })
        .collect()
}

fn shuffled<T>(g: &mut Gen, mut items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    while !items.is_empty() {
        let idx = usize::arbitrary(g) % items.len();
        out.push(items.swap_remove(idx));
    }
    out
}

impl Arbitrary for Species {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&Species::ALL).unwrap()
    }
}

impl Arbitrary for ZoneId {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&ZoneId::ALL).unwrap()
    }
}
