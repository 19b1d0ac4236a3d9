use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DieFaceTable, SpeciesRule, ZoneRuleTable};

/// The complete static rules of the game: the zones of a park and the faces
/// of the die.
///
/// Both tables default to the standard game, so a ruleset file only needs to
/// list what it changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub zones: ZoneRuleTable,
    pub die_faces: DieFaceTable,
}

impl Ruleset {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Reads a ruleset from a JSON file and checks it.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let ruleset: Ruleset = serde_json::from_reader(reader)?;
        ruleset.check()?;
        Ok(ruleset)
    }

    /// Checks the invariants that the engine relies on: every zone has room
    /// for a piece, and there is exactly one wildcard zone, which accepts any
    /// species.
    pub fn check(&self) -> anyhow::Result<()> {
        for (zone, rule) in self.zones.iter() {
            if rule.capacity == 0 {
                anyhow::bail!("Zone '{}' has a capacity of zero", zone);
            }
        }
        let wildcards: Vec<_> = self.zones.wildcards().collect();
        match wildcards.as_slice() {
            [zone] => {
                if self.zones.get(*zone).map(|rule| rule.species_rule) != Some(SpeciesRule::Any) {
                    anyhow::bail!("The wildcard zone '{}' must accept any species", zone);
                }
            }
            _ => anyhow::bail!(
                "There must be exactly one wildcard zone, but there are {}",
                wildcards.len()
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZoneId;

    #[test]
    fn standard_ruleset_is_consistent() {
        assert!(Ruleset::standard().check().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_standard() {
        let ruleset: Ruleset = serde_json::from_str(
            r#"{"die_faces": {"forest": {"name": "Forest", "description": "Forest only", "restriction": {"kind": "area", "area": "forest"}}}}"#,
        )
        .unwrap();
        assert_eq!(ruleset.zones, ZoneRuleTable::standard());
        assert_eq!(ruleset.die_faces.ids().collect::<Vec<_>>(), vec!["forest"]);
        assert!(ruleset.check().is_ok());
    }

    #[test]
    fn rejects_missing_wildcard() {
        let mut ruleset = Ruleset::standard();
        let zones = ruleset
            .zones
            .iter()
            .filter(|(zone, _)| *zone != ZoneId::River)
            .map(|(zone, rule)| (zone, rule.clone()))
            .collect();
        ruleset.zones = ZoneRuleTable::new(zones);
        assert!(ruleset.check().is_err());
    }
}
