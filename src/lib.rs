//! Multilevel graph edge-separator engine: coarsen a graph by repeated
//! matching, find a balanced cut on the coarsest level, then uncoarsen
//! while refining the cut back onto the original graph with bounded-depth
//! FM local search and QP gradient-projection relaxation.
//!
//! # Example
//!
//! ```
//! use edgesep::{CscGraph, Options, edge_separator};
//!
//! // A simple 4-vertex path graph: 0-1-2-3
//! let csc = CscGraph::new(
//!     4,
//!     vec![0, 1, 3, 5, 6],
//!     vec![1, 0, 2, 1, 3, 2],
//!     vec![1.0; 6],
//!     vec![],
//! );
//!
//! let result = edge_separator(csc, &Options::default()).unwrap();
//! assert_eq!(result.partition.len(), 4);
//! ```

pub mod boundary_heap;
pub mod coarsen;
pub mod driver;
pub mod error;
pub mod fm;
pub mod graph;
pub mod initial_guess;
pub mod matching;
pub mod napsack;
pub mod options;
pub mod qp;
pub mod refine;
pub mod rng;
pub mod waterdance;

pub use driver::{edge_separator, PartitionResult};
pub use error::{Error, Result};
pub use graph::{CscGraph, Level, MatchType};
pub use options::{GuessCutType, MatchingStrategy, Options};
