use thiserror::Error;
use tracetrail::QueryError;

pub type Result<T> = std::result::Result<T, NavError>;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    #[error("no breadcrumb node at position {0}")]
    UnknownNode(usize),

    #[error("breadcrumb node {0} is a separator; separators open the child menu instead")]
    NotNavigable(usize),

    #[error("record {0} is not mapped to any display row")]
    UnmappedRecord(usize),

    #[error("navigation sink failed: {0}")]
    Navigation(#[from] anyhow::Error),
}
