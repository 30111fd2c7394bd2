use nearby_core::FacilityId;
use thiserror::Error;

use crate::types::Epoch;

/// Selecting a facility that is not in the current result set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("facility '{0}' is not in the current result set")]
    NotInResultSet(FacilityId),
}

/// A resolution batch finished after its search epoch was superseded.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("discarding road distances from epoch {result_epoch}; current epoch is {current_epoch}")]
pub struct StaleEpoch {
    pub result_epoch: Epoch,
    pub current_epoch: Epoch,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
