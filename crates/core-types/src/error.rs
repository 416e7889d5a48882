use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid timestamp: {0} ms since epoch")]
    InvalidTimestamp(i64),
}
