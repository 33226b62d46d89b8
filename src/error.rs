use thiserror::Error;

/// Errors raised while loading a map or exporting reports. Runtime
/// conditions of the simulation itself (invalid move, full inventory,
/// unreachable target) are ordinary outcomes, not errors.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("map is empty")]
    EmptyMap,

    #[error("map row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown cell code '{code}' at ({x}, {y})")]
    UnknownCellCode { code: char, x: usize, y: usize },

    #[error("map must contain exactly one start cell, found {0}")]
    StartCellCount(usize),

    #[error("map has no warehouse cell")]
    NoWarehouse,

    #[error("map has no recharge station")]
    NoRechargeStation,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
