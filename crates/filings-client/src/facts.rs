//! Turns the raw `companyfacts` payload into a `Statement`: selecting the
//! most recent fact per concept for the requested period, applying unit
//! multipliers, and walking the layout's concept fallback chains.

use crate::responses::{CompanyFacts, FactItem};
use chrono::NaiveDate;
use common_size::{fill_derived_lines, layout_for};
use core_types::{PeriodType, Statement, StatementType};

/// Selects the most recent fact for `tag` matching `period`, together with
/// the unit it was reported in.
pub fn select_fact<'a>(
    facts: &'a CompanyFacts,
    tag: &str,
    period: PeriodType,
) -> Option<(&'a str, &'a FactItem)> {
    let tag_facts = facts.facts.us_gaap.get(tag)?;

    let mut best: Option<(NaiveDate, &str, &FactItem)> = None;
    for (unit, items) in &tag_facts.units {
        for item in items {
            if !matches_period(item, period) {
                continue;
            }
            let Some(end) = item.end.as_deref() else {
                continue;
            };
            let Ok(end_date) = NaiveDate::parse_from_str(end, "%Y-%m-%d") else {
                continue;
            };
            if best.is_none_or(|(current, _, _)| end_date > current) {
                best = Some((end_date, unit.as_str(), item));
            }
        }
    }
    best.map(|(_, unit, item)| (unit, item))
}

fn matches_period(item: &FactItem, period: PeriodType) -> bool {
    let form = item.form.as_deref().unwrap_or("");
    let fp = item.fp.as_deref().unwrap_or("");
    match period {
        PeriodType::Annual => form == "10-K" && matches!(fp, "FY" | "Q4" | "12M"),
        PeriodType::Quarterly => {
            matches!(form, "10-Q" | "10-K") && matches!(fp, "Q1" | "Q2" | "Q3" | "Q4")
        }
    }
}

/// The USD value of a fact, scaled by its unit of measure.
pub fn fact_value(unit: &str, item: &FactItem) -> Option<f64> {
    let value = item.val?;
    Some(value * unit_multiplier(unit))
}

fn unit_multiplier(unit: &str) -> f64 {
    let normalized = unit.to_ascii_lowercase();
    if normalized.contains("million") || normalized.ends_with('m') {
        1_000_000.0
    } else if normalized.contains("thousand") || normalized.ends_with('k') {
        1_000.0
    } else {
        1.0
    }
}

/// Builds a `Statement` from a company's facts by walking the layout for
/// `statement_type`: each row's concept chain is tried in order and the first
/// value found is stored under the row's canonical concept. Derived lines are
/// reconciled afterwards. A statement missing its base concept is still
/// returned; normalization is where that failure is surfaced.
pub fn build_statement(
    cik: &str,
    facts: &CompanyFacts,
    statement_type: StatementType,
    period_type: PeriodType,
) -> Statement {
    let layout = layout_for(statement_type);

    let mut fiscal_period = String::from("latest");
    if let Some(base_row) = layout.iter().find(|row| !row.is_header) {
        for tag in base_row.concepts {
            if let Some((_, item)) = select_fact(facts, tag, period_type) {
                if let Some(end) = &item.end {
                    fiscal_period = end.clone();
                }
                break;
            }
        }
    }

    let mut statement = Statement::new(cik, statement_type, period_type, fiscal_period);
    for row in layout {
        let Some(canonical) = row.canonical_concept() else {
            continue;
        };
        for tag in row.concepts {
            if let Some((unit, item)) = select_fact(facts, tag, period_type) {
                if let Some(value) = fact_value(unit, item) {
                    statement.set(canonical, value);
                    break;
                }
            }
        }
    }

    fill_derived_lines(&mut statement);
    statement
}
