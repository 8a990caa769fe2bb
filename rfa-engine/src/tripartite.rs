//! Tripartite (three-party) agreement evaluation.
//!
//! An agreement pays `rebate_percent` of the whole scoped revenue once that
//! revenue reaches `revenue_threshold`, and nothing below it. A zero
//! threshold pays unconditionally. Agreements are additive: each one that
//! applies to a supplier is evaluated on its own and stacked on top of the
//! standard contract.

use crate::error::DataIntegrityError;
use crate::math::{percent_of, progress_percent};
use crate::report::RejectedRecord;
use crate::types::{ClientContractAssignment, TripartiteAgreement, TripartiteResult};

/// Reject agreements that cannot be evaluated deterministically.
pub fn check_agreement(agreement: &TripartiteAgreement) -> Result<(), DataIntegrityError> {
    let scope = || agreement.scope().to_string();

    if let (Some(brand), Some(family)) = (&agreement.brand, &agreement.product_family) {
        return Err(DataIntegrityError::AmbiguousScope {
            supplier: agreement.supplier.clone(),
            brand: brand.clone(),
            family: family.clone(),
        });
    }
    if !agreement.revenue_threshold.is_finite() {
        return Err(DataIntegrityError::NonFiniteThreshold {
            supplier: agreement.supplier.clone(),
            scope: scope(),
        });
    }
    if agreement.revenue_threshold < 0.0 {
        return Err(DataIntegrityError::NegativeThreshold {
            supplier: agreement.supplier.clone(),
            scope: scope(),
            threshold: agreement.revenue_threshold,
        });
    }
    if !(0.0..=100.0).contains(&agreement.rebate_percent) {
        return Err(DataIntegrityError::AgreementPercentOutOfRange {
            supplier: agreement.supplier.clone(),
            scope: scope(),
            value: agreement.rebate_percent,
        });
    }
    Ok(())
}

/// Evaluate one agreement on the revenue of its scope.
pub fn evaluate_agreement(
    scoped_revenue: f64,
    agreement: &TripartiteAgreement,
) -> Result<TripartiteResult, DataIntegrityError> {
    if scoped_revenue.is_nan() || scoped_revenue < 0.0 {
        return Err(DataIntegrityError::NegativeRevenue {
            amount: scoped_revenue,
        });
    }
    check_agreement(agreement)?;

    let qualified = scoped_revenue >= agreement.revenue_threshold;
    let rebate_amount = if qualified {
        percent_of(scoped_revenue, agreement.rebate_percent)
    } else {
        0.0
    };

    Ok(TripartiteResult {
        agreement: agreement.clone(),
        scoped_revenue,
        qualified,
        rebate_amount,
        progression_percent: progress_percent(scoped_revenue, agreement.revenue_threshold),
    })
}

/// The usable agreements of a configuration, checked once for the pass.
#[derive(Clone, Debug, Default)]
pub struct AgreementCatalog {
    agreements: Vec<TripartiteAgreement>,
}

impl AgreementCatalog {
    /// Keep active, well-formed agreements. Malformed ones, and active copies
    /// of an agreement already kept, are returned as rejected records indexed
    /// into `agreements`.
    pub fn build(agreements: &[TripartiteAgreement]) -> (Self, Vec<RejectedRecord>) {
        let mut usable = Vec::new();
        let mut rejected = Vec::new();

        for (index, agreement) in agreements.iter().enumerate() {
            if let Err(error) = check_agreement(agreement) {
                log::warn!("rejected tripartite agreement #{}: {}", index, error);
                rejected.push(RejectedRecord { index, error });
                continue;
            }
            if !agreement.active {
                log::debug!("skipping inactive agreement {}", agreement.label());
                continue;
            }
            if usable.iter().any(|kept: &TripartiteAgreement| kept.same_target(agreement)) {
                let error = DataIntegrityError::DuplicateAgreement {
                    supplier: agreement.supplier.clone(),
                    scope: agreement.scope().to_string(),
                };
                log::warn!("rejected tripartite agreement #{}: {}", index, error);
                rejected.push(RejectedRecord { index, error });
                continue;
            }
            usable.push(agreement.clone());
        }

        (Self { agreements: usable }, rejected)
    }

    /// Agreements the assignment holds an active reference to, in
    /// configuration order.
    pub fn applicable<'a>(
        &'a self,
        assignment: &'a ClientContractAssignment,
    ) -> impl Iterator<Item = &'a TripartiteAgreement> + 'a {
        self.agreements.iter().filter(move |agreement| {
            assignment
                .tripartites
                .iter()
                .any(|reference| reference.active && agreement.matches(reference))
        })
    }

    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripartiteReference;

    fn vernet(threshold: f64) -> TripartiteAgreement {
        TripartiteAgreement {
            supplier: "Alliance".into(),
            brand: Some("VERNET".into()),
            product_family: None,
            revenue_threshold: threshold,
            rebate_percent: 1.5,
            active: true,
        }
    }

    fn reference_to(agreement: &TripartiteAgreement, active: bool) -> TripartiteReference {
        TripartiteReference {
            supplier: agreement.supplier.clone(),
            brand: agreement.brand.clone(),
            product_family: agreement.product_family.clone(),
            active,
        }
    }

    #[test]
    fn qualifying_revenue_earns_rebate_on_whole_amount() {
        let result = evaluate_agreement(25_000.0, &vernet(20_000.0)).unwrap();
        assert!(result.qualified);
        assert!((result.rebate_amount - 375.0).abs() < 1e-9);
        assert_eq!(result.progression_percent, 100.0);
    }

    #[test]
    fn revenue_below_threshold_earns_nothing() {
        let result = evaluate_agreement(10_000.0, &vernet(20_000.0)).unwrap();
        assert!(!result.qualified);
        assert_eq!(result.rebate_amount, 0.0);
        assert!((result.progression_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_inclusive() {
        let result = evaluate_agreement(20_000.0, &vernet(20_000.0)).unwrap();
        assert!(result.qualified);
        assert!((result.rebate_amount - 300.0).abs() < 1e-9);
    }

    #[test]
    fn zero_threshold_pays_unconditionally() {
        let result = evaluate_agreement(0.0, &vernet(0.0)).unwrap();
        assert!(result.qualified);
        assert_eq!(result.progression_percent, 100.0);
        assert_eq!(result.rebate_amount, 0.0);

        let result = evaluate_agreement(1_000.0, &vernet(0.0)).unwrap();
        assert!((result.rebate_amount - 15.0).abs() < 1e-9);
    }

    #[test]
    fn negative_threshold_is_a_data_error() {
        assert!(matches!(
            evaluate_agreement(1_000.0, &vernet(-1.0)),
            Err(DataIntegrityError::NegativeThreshold { .. })
        ));
    }

    #[test]
    fn negative_revenue_is_rejected() {
        assert!(matches!(
            evaluate_agreement(-5.0, &vernet(20_000.0)),
            Err(DataIntegrityError::NegativeRevenue { .. })
        ));
    }

    #[test]
    fn agreement_naming_brand_and_family_is_ambiguous() {
        let mut agreement = vernet(20_000.0);
        agreement.product_family = Some("freinage".into());
        assert!(matches!(
            check_agreement(&agreement),
            Err(DataIntegrityError::AmbiguousScope { .. })
        ));
    }

    #[test]
    fn catalog_drops_inactive_and_reports_malformed() {
        let mut inactive = vernet(20_000.0);
        inactive.active = false;
        inactive.brand = Some("DELPHI".into());
        let mut broken = vernet(-10.0);
        broken.brand = Some("BREMBO".into());

        let (catalog, rejected) =
            AgreementCatalog::build(&[vernet(20_000.0), inactive, broken]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 2);
    }

    #[test]
    fn catalog_rejects_second_copy_of_an_agreement() {
        let mut paused_copy = vernet(10_000.0);
        paused_copy.active = false;

        let (catalog, rejected) = AgreementCatalog::build(&[
            paused_copy,
            vernet(20_000.0),
            vernet(20_000.0),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 2);
        assert!(matches!(
            rejected[0].error,
            DataIntegrityError::DuplicateAgreement { .. }
        ));

        let assignment = ClientContractAssignment {
            client_id: "C1".into(),
            standard_contract_id: None,
            tripartites: vec![reference_to(&vernet(20_000.0), true)],
        };
        assert_eq!(catalog.applicable(&assignment).count(), 1);
    }

    #[test]
    fn only_actively_referenced_agreements_apply() {
        let assigned = vernet(20_000.0);
        let mut unassigned = vernet(20_000.0);
        unassigned.brand = Some("SCHAEFFLER".into());
        let mut paused = vernet(20_000.0);
        paused.brand = Some("DELPHI".into());

        let (catalog, _) =
            AgreementCatalog::build(&[assigned.clone(), unassigned, paused.clone()]);
        let assignment = ClientContractAssignment {
            client_id: "C1".into(),
            standard_contract_id: None,
            tripartites: vec![reference_to(&assigned, true), reference_to(&paused, false)],
        };

        let applicable: Vec<_> = catalog.applicable(&assignment).collect();
        assert_eq!(applicable, vec![&assigned]);
    }
}
