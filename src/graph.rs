//! Graph storage: immutable CSC adjacency plus the mutable partition,
//! refinement, matching, and mark-array state carried at every level of the
//! multilevel hierarchy.

use crate::options::Options;

/// How a vertex came to be matched during coarsening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Never matched with anything; coarsens to a singleton.
    Orphan,
    /// Ordinary 2-way match (random, HEM, or SR).
    Standard,
    /// Paired off during the passive-aggressive pass.
    Brotherly,
    /// 3-way match formed when community matching folds a leftover vertex
    /// into a brotherly pair.
    Community,
}

/// A graph in Compressed Sparse Column form.
///
/// Symmetric: for every stored `(u, v)` the reverse `(v, u)` is also
/// present with identical weight. No self-loops.
#[derive(Debug, Clone)]
pub struct CscGraph {
    /// Number of vertices.
    pub n: usize,
    /// Column pointers, length `n + 1`.
    pub p: Vec<usize>,
    /// Row indices (neighbor lists), length `p[n]`.
    pub i: Vec<usize>,
    /// Edge weights aligned with `i`.
    pub x: Vec<f64>,
    /// Vertex weights, length `n`. Defaults to all-ones if empty.
    pub w: Vec<f64>,
}

impl CscGraph {
    /// Build a CSC graph, defaulting vertex weights to 1 if `w` is empty.
    pub fn new(n: usize, p: Vec<usize>, i: Vec<usize>, x: Vec<f64>, w: Vec<f64>) -> Self {
        assert_eq!(p.len(), n + 1);
        assert_eq!(i.len(), x.len());
        assert!(w.is_empty() || w.len() == n);
        CscGraph { n, p, i, x, w }
    }

    /// Vertex weight for `k`, defaulting to 1.0 if unset.
    pub fn vertex_weight(&self, k: usize) -> f64 {
        if self.w.is_empty() {
            1.0
        } else {
            self.w[k]
        }
    }

    /// Neighbor row indices of vertex `k`.
    pub fn neighbors(&self, k: usize) -> &[usize] {
        &self.i[self.p[k]..self.p[k + 1]]
    }

    /// Edge weights of vertex `k`, aligned with `neighbors(k)`.
    pub fn edge_weights(&self, k: usize) -> &[f64] {
        &self.x[self.p[k]..self.p[k + 1]]
    }

    /// Number of stored directed entries (each undirected edge counted twice).
    pub fn nz(&self) -> usize {
        self.p[self.n]
    }
}

/// One level of the multilevel hierarchy: adjacency plus all state mutated
/// by matching, coarsening, and refinement.
pub struct Level {
    /// Immutable adjacency + vertex weights for this level.
    pub csc: CscGraph,

    /// Sum of vertex weights, `W = sum(w)`.
    pub w_total: f64,
    /// Sum of stored (doubled) edge weights, `X = sum(x)`.
    pub x_total: f64,
    /// Heuristic balance-penalty scale, `H = 2X`.
    pub h: f64,
    /// `max|x| / (eps + min|x|)` over stored edge weights.
    pub worst_case_ratio: f64,

    /// Partition side of each vertex: `false` = side 0, `true` = side 1.
    pub partition: Vec<bool>,
    /// Gain of flipping each vertex (positive = flipping reduces cut).
    pub gain: Vec<f64>,
    /// Count of neighbors on the opposite side.
    pub external_degree: Vec<usize>,

    /// `bh_index[v] > 0` iff `v` is heaped, storing `position + 1`.
    pub bh_index: Vec<usize>,
    /// The two boundary max-heaps, one per side.
    pub bh_heap: [Vec<usize>; 2],

    /// `cut_cost + balance penalty`.
    pub heu_cost: f64,
    /// Sum of cut-edge weights (doubled until finalization).
    pub cut_cost: f64,
    /// Number of cut edges (set at finalization).
    pub cut_size: usize,
    /// Side-0 vertex weight sum.
    pub w0: f64,
    /// Side-1 vertex weight sum.
    pub w1: f64,
    /// `target_split - min(w0, w1) / W`, folded into `[0, 0.5]` target.
    pub imbalance: f64,

    /// `matching[v] == v` iff `v` is an unmatched orphan, else the partner
    /// (or, for a 3-way community match, the next vertex in the 3-cycle).
    pub matching: Vec<usize>,
    /// Fine vertex -> coarse vertex.
    pub matchmap: Vec<usize>,
    /// Coarse vertex -> one representative fine vertex.
    pub invmatchmap: Vec<usize>,
    /// How each vertex was matched.
    pub matchtype: Vec<MatchType>,
    /// Number of vertices in the coarse graph once matching completes.
    pub cn: usize,

    /// Epoch-based mark array: `v` is marked iff `mark[v] == mark_value`.
    pub mark: Vec<u64>,
    /// Current mark epoch.
    pub mark_value: u64,
}

impl Level {
    /// Build the root (finest) level from an input graph.
    pub fn from_csc(csc: CscGraph) -> Self {
        let n = csc.n;
        Level {
            csc,
            w_total: 0.0,
            x_total: 0.0,
            h: 0.0,
            worst_case_ratio: 1.0,
            partition: vec![false; n],
            gain: vec![0.0; n],
            external_degree: vec![0; n],
            bh_index: vec![0; n],
            bh_heap: [Vec::with_capacity(n), Vec::with_capacity(n)],
            heu_cost: 0.0,
            cut_cost: 0.0,
            cut_size: 0,
            w0: 0.0,
            w1: 0.0,
            imbalance: 0.0,
            matching: (0..n).collect(),
            matchmap: vec![0; n],
            invmatchmap: vec![0; n],
            matchtype: vec![MatchType::Orphan; n],
            cn: 0,
            mark: vec![0; n],
            mark_value: 1,
        }
    }

    /// Compute `W`, `X`, `H`, and `worst_case_ratio` from the adjacency.
    /// Idempotent.
    pub fn initialize(&mut self) {
        self.w_total = (0..self.csc.n).map(|k| self.csc.vertex_weight(k)).sum();
        self.x_total = self.csc.x.iter().sum::<f64>();
        self.h = 2.0 * self.x_total;

        let mut max_w = f64::MIN;
        let mut min_w = f64::MAX;
        for &xw in &self.csc.x {
            let a = xw.abs();
            if a > max_w {
                max_w = a;
            }
            if a < min_w {
                min_w = a;
            }
        }
        self.worst_case_ratio = if self.csc.x.is_empty() {
            1.0
        } else {
            max_w / (f64::EPSILON + min_w)
        };
    }

    /// `n` of the adjacency at this level.
    pub fn n(&self) -> usize {
        self.csc.n
    }

    /// Fold `options.target_split` into `[0, 0.5]`.
    pub fn folded_target_split(options: &Options) -> f64 {
        if options.target_split > 0.5 {
            1.0 - options.target_split
        } else {
            options.target_split
        }
    }

    /// Clear all marks in O(1) by bumping the epoch; resets the array on
    /// overflow.
    pub fn clear_marks(&mut self) {
        if self.mark_value == u64::MAX {
            self.mark.iter_mut().for_each(|m| *m = 0);
            self.mark_value = 0;
        }
        self.mark_value += 1;
    }

    /// Whether `v` is currently marked.
    pub fn is_marked(&self, v: usize) -> bool {
        self.mark[v] == self.mark_value
    }

    /// Mark `v`.
    pub fn mark(&mut self, v: usize) {
        self.mark[v] = self.mark_value;
    }

    /// Whether `v` is currently in a boundary heap.
    pub fn in_boundary(&self, v: usize) -> bool {
        self.bh_index[v] > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path4() -> CscGraph {
        CscGraph::new(
            4,
            vec![0, 1, 3, 5, 6],
            vec![1, 0, 2, 1, 3, 2],
            vec![1.0; 6],
            vec![],
        )
    }

    #[test]
    fn initialize_computes_totals() {
        let mut lvl = Level::from_csc(path4());
        lvl.initialize();
        assert_eq!(lvl.w_total, 4.0);
        assert_eq!(lvl.x_total, 6.0);
        assert_eq!(lvl.h, 12.0);
    }

    #[test]
    fn mark_epoch_round_trips() {
        let mut lvl = Level::from_csc(path4());
        lvl.clear_marks();
        lvl.mark(2);
        assert!(lvl.is_marked(2));
        assert!(!lvl.is_marked(0));
        lvl.clear_marks();
        assert!(!lvl.is_marked(2));
    }
}
