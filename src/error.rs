//! Error kinds returned by the edge-separator engine.

/// Failure modes of the partitioning pipeline.
///
/// `OutOfMemory` is retained for interface parity with the allocation-facade
/// model the algorithm was designed around, but no code path in this crate
/// raises it: ordinary `Vec` growth aborts the process on allocation
/// failure rather than returning a `Result`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An options field was outside its documented domain.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Allocation failed. Never produced by this implementation.
    #[error("out of memory")]
    OutOfMemory,

    /// The input graph has zero vertices.
    #[error("empty graph")]
    EmptyGraph,

    /// A debug-mode invariant check failed.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
