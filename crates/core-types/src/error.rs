use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown statement type '{0}', expected 'income' or 'balance'")]
    InvalidStatementType(String),

    #[error("Unknown period type '{0}', expected 'annual' or 'quarterly'")]
    InvalidPeriodType(String),
}
