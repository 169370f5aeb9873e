use crate::error::CommonSizeError;
use core_types::{CommonSizeStatement, Statement};
use std::collections::BTreeMap;

/// Converts a statement of reported values into common-size ratios against
/// `base_concept`.
///
/// Every concept present in the input appears in the output as
/// `value / base`; concepts absent from the input stay absent (no
/// interpolation, no zero-filling). The base concept itself maps to exactly
/// 1.0. A missing or zero base fails instead of silently dividing, so the
/// output can never contain `inf` or `NaN`.
pub fn normalize(
    statement: &Statement,
    base_concept: &str,
) -> Result<CommonSizeStatement, CommonSizeError> {
    let base = statement
        .value(base_concept)
        .ok_or_else(|| CommonSizeError::MissingBaseConcept(base_concept.to_string()))?;
    if base == 0.0 {
        return Err(CommonSizeError::InvalidBaseValue(base_concept.to_string()));
    }

    let mut ratios: BTreeMap<String, f64> = statement
        .items
        .iter()
        .map(|(concept, value)| (concept.clone(), value / base))
        .collect();
    // Pin the base ratio rather than trusting value/value round-tripping.
    ratios.insert(base_concept.to_string(), 1.0);

    Ok(CommonSizeStatement {
        base_concept: base_concept.to_string(),
        ratios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{PeriodType, StatementType};
    use proptest::prelude::*;

    fn balance_statement(items: &[(&str, f64)]) -> Statement {
        let mut statement = Statement::new(
            "0000000001",
            StatementType::Balance,
            PeriodType::Annual,
            "2023-12-31",
        );
        for (concept, value) in items {
            statement.set(*concept, *value);
        }
        statement
    }

    #[test]
    fn ratios_are_relative_to_base() {
        let statement = balance_statement(&[
            ("Assets", 1000.0),
            ("CashAndCashEquivalentsAtCarryingValue", 250.0),
        ]);
        let common = normalize(&statement, "Assets").unwrap();
        assert_eq!(common.ratio("Assets"), Some(1.0));
        assert_eq!(
            common.ratio("CashAndCashEquivalentsAtCarryingValue"),
            Some(0.25)
        );
    }

    #[test]
    fn missing_base_fails() {
        let statement = balance_statement(&[("Liabilities", 500.0)]);
        assert_eq!(
            normalize(&statement, "Assets"),
            Err(CommonSizeError::MissingBaseConcept("Assets".to_string()))
        );
    }

    #[test]
    fn zero_base_fails() {
        let statement = balance_statement(&[("Assets", 0.0), ("Liabilities", 500.0)]);
        assert_eq!(
            normalize(&statement, "Assets"),
            Err(CommonSizeError::InvalidBaseValue("Assets".to_string()))
        );
    }

    #[test]
    fn absent_concepts_stay_absent() {
        let statement = balance_statement(&[("Assets", 1000.0)]);
        let common = normalize(&statement, "Assets").unwrap();
        assert_eq!(common.ratio("Goodwill"), None);
        assert_eq!(common.ratios.len(), 1);
    }

    proptest! {
        #[test]
        fn base_maps_to_one_and_ratios_are_finite(
            base in prop_oneof![1e-3..1e12f64, -1e12f64..-1e-3],
            others in prop::collection::btree_map("[A-Z][a-z]{1,8}", -1e12f64..1e12f64, 0..8),
        ) {
            let mut statement = balance_statement(&[("Assets", base)]);
            for (concept, value) in &others {
                statement.set(concept.clone(), *value);
            }
            let common = normalize(&statement, "Assets").unwrap();
            prop_assert_eq!(common.ratio("Assets"), Some(1.0));
            for ratio in common.ratios.values() {
                prop_assert!(ratio.is_finite());
            }
        }
    }
}
