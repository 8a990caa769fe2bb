//! Tier schedule validation.
//!
//! A schedule is accepted only when it starts at 0, every bounded tier has
//! `maximum > minimum`, each tier starts exactly where the previous one ends,
//! the last tier (and only the last) is unbounded, and every percentage lies
//! in [0, 100]. Validation happens once per contract; the resolver only ever
//! sees a `ValidatedSchedule`.

use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::types::{StandardContract, Tier};

/// A tier list that passed validation. Cannot be built any other way.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedSchedule {
    tiers: Vec<Tier>,
}

impl ValidatedSchedule {
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }
}

/// Check one contract's tier list. Idempotent and side-effect free.
pub fn validate_schedule(
    contract_id: &str,
    tiers: &[Tier],
) -> Result<ValidatedSchedule, ConfigurationError> {
    let id = || contract_id.to_string();

    if tiers.is_empty() {
        return Err(ConfigurationError::EmptySchedule { contract_id: id() });
    }

    let last_index = tiers.len() - 1;
    for (tier_index, tier) in tiers.iter().enumerate() {
        if !tier.minimum.is_finite() {
            return Err(ConfigurationError::NonFiniteBound {
                contract_id: id(),
                tier_index,
                field: "minimum",
            });
        }
        if tier.maximum.is_some_and(|max| !max.is_finite()) {
            return Err(ConfigurationError::NonFiniteBound {
                contract_id: id(),
                tier_index,
                field: "maximum",
            });
        }
        for (field, value) in [
            ("rebate_percent", tier.rebate_percent),
            ("bonus_percent", tier.bonus_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigurationError::PercentOutOfRange {
                    contract_id: id(),
                    tier_index,
                    field,
                    value,
                });
            }
        }

        if tier_index == 0 {
            if tier.minimum != 0.0 {
                return Err(ConfigurationError::FirstTierNotAtZero {
                    contract_id: id(),
                    minimum: tier.minimum,
                });
            }
        } else {
            let previous = &tiers[tier_index - 1];
            match previous.maximum {
                None => {
                    return Err(ConfigurationError::UnboundedNotLast {
                        contract_id: id(),
                        tier_index: tier_index - 1,
                    })
                }
                Some(expected) if expected != tier.minimum => {
                    return Err(ConfigurationError::NotContiguous {
                        contract_id: id(),
                        tier_index,
                        expected,
                        got: tier.minimum,
                    })
                }
                Some(_) => {}
            }
        }

        match tier.maximum {
            Some(maximum) if maximum <= tier.minimum => {
                return Err(ConfigurationError::InvertedBounds {
                    contract_id: id(),
                    tier_index,
                    minimum: tier.minimum,
                    maximum,
                })
            }
            Some(_) if tier_index == last_index => {
                return Err(ConfigurationError::MissingUnboundedTier { contract_id: id() })
            }
            _ => {}
        }
    }

    Ok(ValidatedSchedule {
        tiers: tiers.to_vec(),
    })
}

/// A standard contract whose schedule has been validated.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedContract {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub schedule: ValidatedSchedule,
}

pub fn validate_contract(contract: &StandardContract) -> Result<ValidatedContract, ConfigurationError> {
    let schedule = validate_schedule(&contract.id, &contract.tiers)?;
    Ok(ValidatedContract {
        id: contract.id.clone(),
        name: contract.name.clone(),
        active: contract.active,
        schedule,
    })
}

/// Every standard contract of a configuration, validated once for the pass.
///
/// Read-only after construction, so clients computed in parallel share it.
#[derive(Clone, Debug, Default)]
pub struct ContractCatalog {
    contracts: BTreeMap<String, Result<ValidatedContract, ConfigurationError>>,
}

impl ContractCatalog {
    pub fn build(contracts: &[StandardContract]) -> Self {
        let mut catalog: BTreeMap<String, Result<ValidatedContract, ConfigurationError>> =
            BTreeMap::new();

        for contract in contracts {
            if catalog.contains_key(&contract.id) {
                log::warn!("standard contract id '{}' declared twice, blocking it", contract.id);
                catalog.insert(
                    contract.id.clone(),
                    Err(ConfigurationError::DuplicateContract {
                        contract_id: contract.id.clone(),
                    }),
                );
                continue;
            }
            let validated = validate_contract(contract);
            if let Err(ref error) = validated {
                log::warn!("standard contract '{}' blocked: {}", contract.id, error);
            }
            catalog.insert(contract.id.clone(), validated);
        }

        Self { contracts: catalog }
    }

    /// The validated contract, or the error that blocks it.
    pub fn get(&self, contract_id: &str) -> Result<&ValidatedContract, ConfigurationError> {
        match self.contracts.get(contract_id) {
            Some(Ok(contract)) => Ok(contract),
            Some(Err(error)) => Err(error.clone()),
            None => Err(ConfigurationError::UnknownContract {
                contract_id: contract_id.to_string(),
            }),
        }
    }

    /// Configuration errors in contract-id order.
    pub fn errors(&self) -> Vec<ConfigurationError> {
        self.contracts
            .values()
            .filter_map(|c| c.as_ref().err().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(minimum: f64, maximum: Option<f64>, rebate: f64, bonus: f64) -> Tier {
        Tier {
            minimum,
            maximum,
            rebate_percent: rebate,
            bonus_percent: bonus,
        }
    }

    fn two_tiers() -> Vec<Tier> {
        vec![
            tier(0.0, Some(50_000.0), 2.0, 1.0),
            tier(50_000.0, None, 3.0, 1.5),
        ]
    }

    #[test]
    fn accepts_contiguous_schedule() {
        let schedule = validate_schedule("std", &two_tiers()).unwrap();
        assert_eq!(schedule.tiers().len(), 2);
    }

    #[test]
    fn single_unbounded_tier_is_valid() {
        assert!(validate_schedule("flat", &[tier(0.0, None, 1.0, 0.0)]).is_ok());
    }

    #[test]
    fn validation_is_idempotent() {
        let first = validate_schedule("std", &two_tiers()).unwrap();
        let second = validate_schedule("std", first.tiers()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(
            validate_schedule("std", &[]),
            Err(ConfigurationError::EmptySchedule {
                contract_id: "std".into()
            })
        );
    }

    #[test]
    fn rejects_schedule_not_starting_at_zero() {
        let tiers = vec![tier(20_000.0, None, 1.0, 0.5)];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::FirstTierNotAtZero { minimum, .. }) if minimum == 20_000.0
        ));
    }

    #[test]
    fn rejects_gap_between_tiers() {
        let tiers = vec![
            tier(0.0, Some(50_000.0), 2.0, 1.0),
            tier(60_000.0, None, 3.0, 1.5),
        ];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::NotContiguous { tier_index: 1, .. })
        ));
    }

    #[test]
    fn rejects_unbounded_tier_before_last() {
        let tiers = vec![
            tier(0.0, None, 2.0, 1.0),
            tier(50_000.0, None, 3.0, 1.5),
        ];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::UnboundedNotLast { tier_index: 0, .. })
        ));
    }

    #[test]
    fn rejects_bounded_last_tier() {
        let tiers = vec![tier(0.0, Some(50_000.0), 2.0, 1.0)];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::MissingUnboundedTier { .. })
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let tiers = vec![
            tier(0.0, Some(0.0), 2.0, 1.0),
            tier(0.0, None, 3.0, 1.5),
        ];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::InvertedBounds { tier_index: 0, .. })
        ));
    }

    #[test]
    fn rejects_percent_out_of_range_naming_the_tier() {
        let tiers = vec![
            tier(0.0, Some(50_000.0), 2.0, 1.0),
            tier(50_000.0, None, 3.0, 101.0),
        ];
        let err = validate_schedule("std", &tiers).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::PercentOutOfRange {
                contract_id: "std".into(),
                tier_index: 1,
                field: "bonus_percent",
                value: 101.0,
            }
        );
        assert!(err.to_string().contains("tier 1"));
    }

    #[test]
    fn rejects_nan_percent() {
        let tiers = vec![tier(0.0, None, f64::NAN, 0.0)];
        assert!(matches!(
            validate_schedule("std", &tiers),
            Err(ConfigurationError::PercentOutOfRange { field: "rebate_percent", .. })
        ));
    }

    #[test]
    fn catalog_blocks_only_the_malformed_contract() {
        let good = StandardContract {
            id: "good".into(),
            name: "Good".into(),
            description: String::new(),
            tiers: two_tiers(),
            active: true,
        };
        let bad = StandardContract {
            id: "bad".into(),
            tiers: vec![tier(10.0, None, 1.0, 1.0)],
            ..good.clone()
        };
        let catalog = ContractCatalog::build(&[good, bad]);

        assert!(catalog.get("good").is_ok());
        assert_eq!(catalog.get("bad").unwrap_err().contract_id(), "bad");
        assert!(matches!(
            catalog.get("missing"),
            Err(ConfigurationError::UnknownContract { .. })
        ));
        assert_eq!(catalog.errors().len(), 1);
    }

    #[test]
    fn catalog_blocks_duplicate_ids() {
        let contract = StandardContract {
            id: "dup".into(),
            name: "Dup".into(),
            description: String::new(),
            tiers: two_tiers(),
            active: true,
        };
        let catalog = ContractCatalog::build(&[contract.clone(), contract]);
        assert!(matches!(
            catalog.get("dup"),
            Err(ConfigurationError::DuplicateContract { .. })
        ));
    }
}
