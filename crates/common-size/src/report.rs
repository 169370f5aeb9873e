use crate::layout::layout_for;
use core_types::{CommonSizeStatement, Statement};
use serde::Serialize;

/// One renderable row of a common-size report: the layout label plus the
/// reported value, the company ratio, and (when a benchmark is available)
/// the industry ratio. `None` renders as a dash.
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    pub label: String,
    pub indent: u8,
    pub is_header: bool,
    pub value: Option<f64>,
    pub common_size: Option<f64>,
    pub industry_common_size: Option<f64>,
}

impl StatementLine {
    pub fn value_in_millions(&self) -> Option<f64> {
        self.value.map(|v| v / 1_000_000.0)
    }
}

/// Assembles report rows by walking the statement's layout. Concepts the
/// company never reported produce rows with empty value columns; the
/// industry column is filled per concept from `industry` when present.
pub fn build_lines(
    statement: &Statement,
    common: &CommonSizeStatement,
    industry: Option<&CommonSizeStatement>,
) -> Vec<StatementLine> {
    layout_for(statement.statement_type)
        .iter()
        .map(|row| {
            let concept = row.canonical_concept();
            StatementLine {
                label: row.label.to_string(),
                indent: row.indent,
                is_header: row.is_header,
                value: concept.and_then(|c| statement.value(c)),
                common_size: concept.and_then(|c| common.ratio(c)),
                industry_common_size: concept
                    .and_then(|c| industry.and_then(|b| b.ratio(c))),
            }
        })
        .collect()
}
