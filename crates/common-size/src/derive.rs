//! Fills in lines that companies frequently leave untagged but that follow
//! arithmetically from lines they did report (e.g. gross profit from revenue
//! and cost of revenue). A reported figure is only overwritten when it
//! disagrees with the derived one by more than `TOLERANCE` dollars.

use core_types::{Statement, StatementType};

const TOLERANCE: f64 = 1.0;

pub fn fill_derived_lines(statement: &mut Statement) {
    match statement.statement_type {
        StatementType::Income => fill_income_lines(statement),
        StatementType::Balance => fill_balance_lines(statement),
    }
}

fn reconcile(statement: &mut Statement, concept: &str, derived: f64) {
    match statement.value(concept) {
        Some(reported) if (reported - derived).abs() <= TOLERANCE => {}
        _ => statement.set(concept, derived),
    }
}

fn fill_income_lines(statement: &mut Statement) {
    let revenue = statement.value("Revenues");
    let cost = statement.value("CostOfRevenue");
    let gross = statement.value("GrossProfit");

    match (revenue, gross, cost) {
        (Some(revenue), Some(gross), _) => {
            reconcile(statement, "CostOfRevenue", revenue - gross);
        }
        (Some(revenue), None, Some(cost)) => {
            reconcile(statement, "GrossProfit", revenue - cost);
        }
        _ => {}
    }

    let components: Vec<f64> = [
        "ResearchAndDevelopmentExpense",
        "SellingGeneralAndAdministrativeExpense",
        "OtherOperatingExpenses",
    ]
    .iter()
    .filter_map(|concept| statement.value(concept))
    .collect();
    if !components.is_empty() {
        reconcile(statement, "OperatingExpenses", components.iter().sum());
    }

    if let (Some(gross), Some(total_ops)) = (
        statement.value("GrossProfit"),
        statement.value("OperatingExpenses"),
    ) {
        reconcile(statement, "OperatingIncomeLoss", gross - total_ops);
    }

    if let (Some(operating), Some(other)) = (
        statement.value("OperatingIncomeLoss"),
        statement.value("OtherNonoperatingIncomeExpense"),
    ) {
        let mut pretax = operating + other;
        if let Some(interest) = statement.value("InterestExpense") {
            pretax -= interest;
        }
        reconcile(
            statement,
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxes",
            pretax,
        );
    }

    if let (Some(pretax), Some(tax)) = (
        statement.value("IncomeLossFromContinuingOperationsBeforeIncomeTaxes"),
        statement.value("IncomeTaxExpenseBenefit"),
    ) {
        reconcile(statement, "NetIncomeLoss", pretax - tax);
    }
}

fn fill_balance_lines(statement: &mut Statement) {
    if let (Some(liabilities), Some(equity)) = (
        statement.value("Liabilities"),
        statement.value("StockholdersEquity"),
    ) {
        reconcile(
            statement,
            "LiabilitiesAndStockholdersEquity",
            liabilities + equity,
        );
    }

    // Balance sheets balance: total liabilities and equity defaults to
    // total assets when nothing else pinned it down.
    if statement.value("LiabilitiesAndStockholdersEquity").is_none() {
        if let Some(assets) = statement.value("Assets") {
            statement.set("LiabilitiesAndStockholdersEquity", assets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PeriodType;

    fn income_statement(items: &[(&str, f64)]) -> Statement {
        let mut statement = Statement::new(
            "0000000001",
            StatementType::Income,
            PeriodType::Annual,
            "2023-12-31",
        );
        for (concept, value) in items {
            statement.set(*concept, *value);
        }
        statement
    }

    #[test]
    fn gross_profit_derived_from_revenue_and_cost() {
        let mut statement =
            income_statement(&[("Revenues", 1000.0), ("CostOfRevenue", 600.0)]);
        fill_derived_lines(&mut statement);
        assert_eq!(statement.value("GrossProfit"), Some(400.0));
    }

    #[test]
    fn cost_of_revenue_derived_from_revenue_and_gross() {
        let mut statement = income_statement(&[("Revenues", 1000.0), ("GrossProfit", 400.0)]);
        fill_derived_lines(&mut statement);
        assert_eq!(statement.value("CostOfRevenue"), Some(600.0));
    }

    #[test]
    fn reported_figures_within_tolerance_are_kept() {
        let mut statement = income_statement(&[
            ("Revenues", 1000.0),
            ("GrossProfit", 400.0),
            ("CostOfRevenue", 600.5),
        ]);
        fill_derived_lines(&mut statement);
        assert_eq!(statement.value("CostOfRevenue"), Some(600.5));
    }

    #[test]
    fn net_income_derived_from_pretax_and_tax() {
        let mut statement = income_statement(&[
            ("IncomeLossFromContinuingOperationsBeforeIncomeTaxes", 500.0),
            ("IncomeTaxExpenseBenefit", 120.0),
        ]);
        fill_derived_lines(&mut statement);
        assert_eq!(statement.value("NetIncomeLoss"), Some(380.0));
    }

    #[test]
    fn liabilities_and_equity_fall_back_to_assets() {
        let mut statement = Statement::new(
            "0000000001",
            StatementType::Balance,
            PeriodType::Annual,
            "2023-12-31",
        );
        statement.set("Assets", 2000.0);
        fill_derived_lines(&mut statement);
        assert_eq!(
            statement.value("LiabilitiesAndStockholdersEquity"),
            Some(2000.0)
        );
    }
}
