//! Product family lookup from catalogue sub-families.
//!
//! Import files often carry only the sub-family ("PLAQUETTES DE FREIN VL").
//! Family-scoped agreements are keyed on the family ("freinage"), so the
//! loader derives it here.

use serde::{Deserialize, Serialize};

/// Ordered family → sub-family list. The first family whose list matches wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyMapping {
    families: Vec<FamilyRule>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyRule {
    pub family: String,
    pub sub_families: Vec<String>,
}

impl FamilyMapping {
    pub fn new(families: Vec<FamilyRule>) -> Self {
        Self { families }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rules(&self) -> &[FamilyRule] {
        &self.families
    }

    /// Family whose sub-family list has an entry contained in `sub_family`,
    /// compared case-insensitively.
    pub fn family_for(&self, sub_family: &str) -> Option<&str> {
        let needle = sub_family.to_lowercase();
        self.families
            .iter()
            .find(|rule| {
                rule.sub_families
                    .iter()
                    .any(|candidate| needle.contains(&candidate.to_lowercase()))
            })
            .map(|rule| rule.family.as_str())
    }
}

impl Default for FamilyMapping {
    fn default() -> Self {
        let rule = |family: &str, subs: &[&str]| FamilyRule {
            family: family.to_string(),
            sub_families: subs.iter().map(|s| s.to_string()).collect(),
        };
        Self::new(vec![
            rule(
                "freinage",
                &[
                    "DISQUES DE FREIN AVEC RLTS",
                    "DISQUES DE FREIN SANS RLTS",
                    "KITS DE FREIN VL",
                    "PLAQUETTES DE FREIN VL",
                ],
            ),
            rule("embrayage", &["EMBRAYAGES", "KITS EMBRAYAGE"]),
            rule(
                "filtre",
                &[
                    "FILTRES A AIR VL",
                    "FILTRES D'HABITACLE VL",
                    "FILTRES GO VL",
                    "FILTRES HUILE VL ET MOTO",
                ],
            ),
            rule(
                "distribution",
                &["CHAINES DE DISTRIBUTION", "TENDERS DE CHAINE", "GUIDES CHAINE"],
            ),
            rule(
                "etancheite moteur",
                &["JOINTS", "JOINTS CULASSE", "JOINTS VILBREQUIN"],
            ),
            rule("thermique", &["THERMOSTATS", "RADIATEURS", "VENTILATEURS"]),
        ])
    }
}
