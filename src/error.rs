/// Failures reported by [`ClusterList`](crate::ClusterList) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("destination holds {available} elements but {needed} are required")]
    DestinationTooShort { needed: usize, available: usize },
    #[error("corrupted list: {0}")]
    Corrupted(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
