use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Cannot validate an empty table: no rows fall inside the reporting window")]
    EmptyTable,
}
