//! Top-level multilevel driver: coarsen to the limit, guess a cut, then
//! uncoarsen while refining back to the original graph.

use crate::coarsen::multilevel_coarsen;
use crate::error::{Error, Result};
use crate::graph::{CscGraph, Level};
use crate::initial_guess::guess_cut;
use crate::options::Options;
use crate::refine::refine;
use crate::rng::seeded;
use crate::waterdance::waterdance;

/// The final partition and its cost metrics, finalized (undoubled cut
/// weight/size, absolute imbalance).
#[derive(Debug, Clone)]
pub struct PartitionResult {
    /// Partition side of each vertex in the original (finest) graph.
    pub partition: Vec<bool>,
    /// Number of edges crossing the cut.
    pub cut_size: usize,
    /// Total weight of edges crossing the cut.
    pub cut_cost: f64,
    /// `|target_split - w0/W|` for the final partition.
    pub imbalance: f64,
    /// Side-0 vertex weight sum.
    pub w0: f64,
    /// Side-1 vertex weight sum.
    pub w1: f64,
    /// `cut_cost * (1/w0 + 1/w1)`; `0.0` if either side is empty.
    pub normalized_cut: f64,
}

/// Halve the doubled bookkeeping accumulated while every cut edge is
/// counted from both its endpoints, and fold the imbalance back to its
/// absolute value.
fn finalize(level: &mut Level) {
    let mut cut_size = 0usize;
    for side in 0..2 {
        for &v in &level.bh_heap[side] {
            cut_size += level.external_degree[v];
        }
    }
    level.cut_size = cut_size / 2;
    level.cut_cost /= 2.0;
    level.imbalance = level.imbalance.abs();
}

/// Run the full multilevel pipeline: validate options, coarsen `csc` down
/// to `options.coarsen_limit`, guess an initial cut on the coarsest level,
/// then uncoarsen one level at a time, projecting the partition down and
/// running a waterdance at every level, finally reporting finalized
/// metrics for the original graph.
#[tracing::instrument(skip(csc, options), fields(n = csc.n, nz = csc.nz()))]
pub fn edge_separator(csc: CscGraph, options: &Options) -> Result<PartitionResult> {
    options.validate()?;

    if csc.n == 0 {
        return Err(Error::EmptyGraph);
    }

    let mut rng = seeded(options.random_seed);

    let mut root = Level::from_csc(csc);
    root.initialize();

    tracing::debug!("coarsening");
    let mut levels = multilevel_coarsen(root, options, &mut rng);
    tracing::debug!(levels = levels.len(), coarsest_n = levels.last().unwrap().n(), "coarsened");

    {
        let coarsest = levels.last_mut().unwrap();
        guess_cut(coarsest, options, &mut rng);
        waterdance(coarsest, options);
        tracing::debug!(cut_cost = coarsest.cut_cost, "initial cut guessed");
    }

    while levels.len() > 1 {
        let coarse = levels.pop().unwrap();
        let fine = levels.last_mut().unwrap();
        refine(fine, &coarse, options);
        waterdance(fine, options);
        tracing::trace!(n = fine.n(), cut_cost = fine.cut_cost, "uncoarsened one level");
    }

    let finest = levels.last_mut().unwrap();
    finalize(finest);
    let normalized_cut = if finest.w0 > 0.0 && finest.w1 > 0.0 {
        finest.cut_cost * (1.0 / finest.w0 + 1.0 / finest.w1)
    } else {
        0.0
    };
    tracing::info!(
        cut_size = finest.cut_size,
        cut_cost = finest.cut_cost,
        imbalance = finest.imbalance,
        normalized_cut,
        "partition finalized"
    );

    Ok(PartitionResult {
        partition: finest.partition.clone(),
        cut_size: finest.cut_size,
        cut_cost: finest.cut_cost,
        imbalance: finest.imbalance,
        w0: finest.w0,
        w1: finest.w1,
        normalized_cut,
    })
}
