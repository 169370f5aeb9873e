use core_types::StatementType;

/// One presentation row of a statement: a display label, the chain of
/// taxonomy concepts that can back it (companies tag the same line
/// differently, so later entries are fallbacks for the first), an indent
/// level, and whether the row is a section header with no value of its own.
///
/// The first concept in the chain is the canonical name a `Statement` stores
/// the selected value under.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRow {
    pub label: &'static str,
    pub concepts: &'static [&'static str],
    pub indent: u8,
    pub is_header: bool,
}

impl LayoutRow {
    const fn line(label: &'static str, concepts: &'static [&'static str], indent: u8) -> Self {
        Self {
            label,
            concepts,
            indent,
            is_header: false,
        }
    }

    const fn header(label: &'static str) -> Self {
        Self {
            label,
            concepts: &[],
            indent: 0,
            is_header: true,
        }
    }

    /// The canonical concept this row's value is stored under, if any.
    pub fn canonical_concept(&self) -> Option<&'static str> {
        self.concepts.first().copied()
    }
}

/// The base concept every other line is expressed against.
pub fn base_concept(statement_type: StatementType) -> &'static str {
    match statement_type {
        StatementType::Income => "Revenues",
        StatementType::Balance => "Assets",
    }
}

pub fn layout_for(statement_type: StatementType) -> &'static [LayoutRow] {
    match statement_type {
        StatementType::Income => income_layout(),
        StatementType::Balance => balance_layout(),
    }
}

pub fn income_layout() -> &'static [LayoutRow] {
    const ROWS: &[LayoutRow] = &[
        LayoutRow::line(
            "Revenue",
            &[
                "Revenues",
                "RevenueFromContractWithCustomerExcludingAssessedTax",
                "SalesRevenueNet",
                "SalesRevenueGoodsNet",
            ],
            0,
        ),
        LayoutRow::line(
            "Cost of revenue",
            &[
                "CostOfRevenue",
                "CostOfGoodsAndServicesSold",
                "CostOfSales",
                "CostOfGoodsSold",
            ],
            1,
        ),
        LayoutRow::line("Gross profit", &["GrossProfit", "GrossProfitLoss"], 0),
        LayoutRow::header("Operating expenses"),
        LayoutRow::line(
            "Research & development",
            &["ResearchAndDevelopmentExpense", "ResearchAndDevelopment"],
            1,
        ),
        LayoutRow::line(
            "Selling, general & administrative",
            &[
                "SellingGeneralAndAdministrativeExpense",
                "SellingGeneralAndAdministrativeExpenses",
            ],
            1,
        ),
        LayoutRow::line(
            "Other operating expenses",
            &["OtherOperatingExpenses", "OtherOperatingIncomeExpense"],
            1,
        ),
        LayoutRow::line(
            "Total operating expenses",
            &["OperatingExpenses", "OperatingCostsAndExpenses"],
            0,
        ),
        LayoutRow::line(
            "Operating income",
            &["OperatingIncomeLoss", "OperatingProfitLoss"],
            0,
        ),
        LayoutRow::line(
            "Interest expense",
            &["InterestExpense", "InterestExpenseDebt"],
            1,
        ),
        LayoutRow::line(
            "Other income (expense)",
            &["OtherNonoperatingIncomeExpense", "NonoperatingIncomeExpense"],
            1,
        ),
        LayoutRow::line(
            "Income before taxes",
            &[
                "IncomeLossFromContinuingOperationsBeforeIncomeTaxes",
                "IncomeBeforeIncomeTaxes",
            ],
            0,
        ),
        LayoutRow::line(
            "Income tax expense (benefit)",
            &[
                "IncomeTaxExpenseBenefit",
                "IncomeTaxExpenseBenefitContinuingOperations",
            ],
            1,
        ),
        LayoutRow::line("Net income", &["NetIncomeLoss", "ProfitLoss"], 0),
    ];
    ROWS
}

pub fn balance_layout() -> &'static [LayoutRow] {
    const ROWS: &[LayoutRow] = &[
        LayoutRow::line("Total assets", &["Assets"], 0),
        LayoutRow::header("Current assets"),
        LayoutRow::line(
            "Cash and cash equivalents",
            &[
                "CashAndCashEquivalentsAtCarryingValue",
                "CashCashEquivalentsAndShortTermInvestments",
            ],
            1,
        ),
        LayoutRow::line(
            "Short-term investments",
            &[
                "MarketableSecuritiesCurrent",
                "AvailableForSaleSecuritiesCurrent",
            ],
            1,
        ),
        LayoutRow::line(
            "Accounts receivable",
            &[
                "AccountsReceivableNetCurrent",
                "AccountsReceivableTradeNetCurrent",
            ],
            1,
        ),
        LayoutRow::line("Inventory", &["InventoryNet", "InventoryFinishedGoods"], 1),
        LayoutRow::line(
            "Other current assets",
            &[
                "OtherAssetsCurrent",
                "PrepaidExpenseAndOtherAssetsCurrent",
            ],
            1,
        ),
        LayoutRow::line(
            "Total current assets",
            &["AssetsCurrent", "CurrentAssets"],
            0,
        ),
        LayoutRow::header("Non-current assets"),
        LayoutRow::line(
            "Property, plant and equipment, net",
            &[
                "PropertyPlantAndEquipmentNet",
                "PropertyPlantAndEquipmentIncludingConstructionInProgress",
            ],
            1,
        ),
        LayoutRow::line("Goodwill", &["Goodwill"], 1),
        LayoutRow::line(
            "Intangible assets, net",
            &["IntangibleAssetsNetExcludingGoodwill", "IntangibleAssetsNet"],
            1,
        ),
        LayoutRow::line(
            "Other non-current assets",
            &["OtherAssetsNoncurrent", "OtherAssets"],
            1,
        ),
        LayoutRow::header("Current liabilities"),
        LayoutRow::line(
            "Accounts payable",
            &["AccountsPayableCurrent", "AccountsPayableTradeCurrent"],
            1,
        ),
        LayoutRow::line(
            "Accrued liabilities",
            &[
                "AccruedLiabilitiesCurrent",
                "AccruedExpensesAndOtherCurrentLiabilities",
            ],
            1,
        ),
        LayoutRow::line(
            "Short-term debt",
            &[
                "ShortTermBorrowings",
                "ShortTermDebtAndCurrentPortionOfLongTermDebt",
            ],
            1,
        ),
        LayoutRow::line(
            "Total current liabilities",
            &["LiabilitiesCurrent", "CurrentLiabilities"],
            0,
        ),
        LayoutRow::header("Non-current liabilities"),
        LayoutRow::line(
            "Long-term debt",
            &[
                "LongTermDebtNoncurrent",
                "LongTermDebtAndCapitalLeaseObligations",
            ],
            1,
        ),
        LayoutRow::line(
            "Other non-current liabilities",
            &[
                "OtherLiabilitiesNoncurrent",
                "OtherNoncurrentLiabilities",
            ],
            1,
        ),
        LayoutRow::line("Total liabilities", &["Liabilities"], 0),
        LayoutRow::header("Stockholders' equity"),
        LayoutRow::line(
            "Common stock",
            &["CommonStockValue", "CommonStockCapital"],
            1,
        ),
        LayoutRow::line(
            "Retained earnings",
            &["RetainedEarningsAccumulatedDeficit", "RetainedEarnings"],
            1,
        ),
        LayoutRow::line(
            "Total stockholders' equity",
            &[
                "StockholdersEquity",
                "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
            ],
            0,
        ),
        LayoutRow::line(
            "Total liabilities and equity",
            &[
                "LiabilitiesAndStockholdersEquity",
                "LiabilitiesAndShareholdersEquity",
            ],
            0,
        ),
    ];
    ROWS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_concepts_lead_their_layouts() {
        assert_eq!(
            income_layout()[0].canonical_concept(),
            Some(base_concept(StatementType::Income))
        );
        assert_eq!(
            balance_layout()[0].canonical_concept(),
            Some(base_concept(StatementType::Balance))
        );
    }

    #[test]
    fn headers_carry_no_concepts() {
        for row in income_layout().iter().chain(balance_layout()) {
            if row.is_header {
                assert!(row.concepts.is_empty());
            } else {
                assert!(!row.concepts.is_empty());
            }
        }
    }
}
