use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommonSizeError {
    #[error("Base concept '{0}' is not present in the statement")]
    MissingBaseConcept(String),

    #[error("Base concept '{0}' is zero, common size ratios are undefined")]
    InvalidBaseValue(String),
}
