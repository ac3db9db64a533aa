//! Graph coarsening: contract a matching into the next, coarser level.
//!
//! Builds the coarse adjacency by scattering each fine vertex's edges into
//! its coarse group's row using a "last seen this column" marker array
//! (`htable`), so no table is ever cleared between columns — only
//! overwritten by a later column's own entries.

use rand::rngs::StdRng;

use crate::graph::{CscGraph, Level};
use crate::matching::compute_matching;
use crate::options::Options;

/// The fine vertices folded into one coarse group, in matching-cycle order.
pub(crate) fn group_members(level: &Level, coarse: usize) -> [Option<usize>; 3] {
    let v0 = level.invmatchmap[coarse];
    let v1 = level.matching[v0];
    if v1 == v0 {
        [Some(v0), None, None]
    } else {
        let v2 = level.matching[v1];
        if v2 == v0 {
            [Some(v0), Some(v1), None]
        } else {
            [Some(v0), Some(v1), Some(v2)]
        }
    }
}

/// Contract `level`'s current matching into a coarse `CscGraph` and wrap it
/// in a fresh `Level`. `level` must already have a completed matching
/// (`level.cn` set, every vertex either paired or orphaned).
fn build_coarse_graph(level: &Level) -> Level {
    let cn = level.cn;

    // htable[cv] holds the write position of cv's entry in the column
    // currently being built, or a stale position from an earlier column.
    // A position is "this column" iff it's >= the column's start offset,
    // since positions only grow.
    let mut htable = vec![usize::MAX; cn];

    let mut gp = vec![0usize; cn + 1];
    let mut gi: Vec<usize> = Vec::new();
    let mut gx: Vec<f64> = Vec::new();
    let mut gw = vec![0.0f64; cn];

    for k in 0..cn {
        let col_start = gi.len();
        let mut node_weight = 0.0f64;

        for member in group_members(level, k).into_iter().flatten() {
            node_weight += level.csc.vertex_weight(member);

            let neighbors = level.csc.neighbors(member);
            let weights = level.csc.edge_weights(member);
            for (idx, &nbr) in neighbors.iter().enumerate() {
                let cv = level.matchmap[nbr];
                if cv == k {
                    // Internal edge, absorbed by the merge; dropped.
                    continue;
                }
                let w = weights[idx];
                let pos = htable[cv];
                if pos == usize::MAX || pos < col_start {
                    htable[cv] = gi.len();
                    gi.push(cv);
                    gx.push(w);
                } else {
                    gx[pos] += w;
                }
            }
        }

        gw[k] = node_weight;
        gp[k + 1] = gi.len();
    }

    let csc = CscGraph::new(cn, gp, gi, gx, gw);
    let mut coarse = Level::from_csc(csc);
    coarse.initialize();
    coarse
}

/// Match, then contract. Mutates `level` in place (fills its matching
/// arrays) and returns the coarse level above it.
pub fn coarsen_once(level: &mut Level, options: &Options, rng: &mut StdRng) -> Level {
    compute_matching(level, options, rng);
    build_coarse_graph(level)
}

/// Repeatedly coarsen while the graph has at least `options.coarsen_limit`
/// vertices, stopping once `n` drops below that limit (or a coarsening
/// step fails to make progress). Returns every level from finest (`[0]`,
/// the input graph) to coarsest (last).
pub fn multilevel_coarsen(root: Level, options: &Options, rng: &mut StdRng) -> Vec<Level> {
    let mut levels = vec![root];

    loop {
        let current_n = levels.last().unwrap().n();
        if current_n < options.coarsen_limit {
            break;
        }

        let coarse = coarsen_once(levels.last_mut().unwrap(), options, rng);
        if coarse.n() >= current_n {
            break;
        }
        levels.push(coarse);
    }

    levels
}
