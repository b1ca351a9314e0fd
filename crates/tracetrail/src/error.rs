use crate::types::MethodId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("no record at index {0}")]
    UnknownRecord(usize),

    #[error("no method interned with id {0:?}")]
    UnknownMethod(MethodId),

    #[error("record {0} is not a method entry")]
    NotAnEntry(usize),

    #[error("caller chain from record {origin} exceeded {limit} links; ancestry is cyclic or corrupt")]
    AncestryCycle { origin: usize, limit: usize },

    #[error("record {record} names caller {caller}, which is not in the store")]
    DanglingCaller { record: usize, caller: usize },
}
