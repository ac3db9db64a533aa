//! Validated configuration for the partitioning pipeline.

use crate::error::Error;

/// Vertex matching strategy used during coarsening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingStrategy {
    /// Pair each unmatched vertex with the first unmatched neighbor found.
    Random,
    /// Heavy-edge matching: pair with the unmatched neighbor of max weight.
    Hem,
    /// HEM followed by a brotherly/community passive-aggressive pass.
    HemSr,
    /// Like `HemSr`, but the second pass only triggers on high-degree
    /// vertices (the Davis variant).
    HemSrDeg,
}

/// Strategy for producing the first partition on the coarsest graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessCutType {
    /// Relax to a QP solution, then round.
    GuessQp,
    /// Independent Bernoulli(1/2) per vertex.
    GuessRandom,
    /// First half of vertices to side 0, rest to side 1.
    GuessNaturalOrder,
}

/// Validated options controlling every stage of the pipeline.
///
/// Never read from process-wide state; always threaded explicitly into the
/// components that need it.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Seed for the RNG used by `Random` matching and `GuessRandom`.
    pub random_seed: u64,

    /// Stop coarsening once the graph has fewer than this many vertices.
    pub coarsen_limit: usize,
    /// Matcher used while coarsening.
    pub matching_strategy: MatchingStrategy,
    /// Whether 3-way "community" matches are permitted in the
    /// passive-aggressive matching pass.
    pub do_community_matching: bool,
    /// Multiplier on average degree gating the Davis passive-aggressive
    /// expansion. Also known in older headers as `davisBrotherlyThreshold`;
    /// this crate exposes a single field for both names.
    pub high_degree_threshold: f64,

    /// Initial cut strategy on the coarsest graph.
    pub guess_cut_type: GuessCutType,

    /// Number of FM/QP alternations per refinement level.
    pub num_dances: usize,

    /// Enable Fiduccia-Mattheyses refinement.
    pub use_fm: bool,
    /// Max number of non-improving moves to make before backtracking.
    pub fm_search_depth: usize,
    /// Number of top boundary-heap entries considered per side per step.
    pub fm_consider_count: usize,
    /// Max number of FM inner passes per waterdance call.
    pub fm_max_num_refinements: usize,

    /// Enable the QP gradient-projection refiner.
    pub use_qp_grad_proj: bool,
    /// Convergence tolerance for the projected gradient.
    pub grad_proj_tolerance: f64,
    /// Max number of gradient-projection iterations.
    pub gradproj_iteration_limit: usize,

    /// Desired fraction of total vertex weight on side 0, in `[0, 1]`.
    pub target_split: f64,
    /// Imbalance within this tolerance is not penalized.
    pub soft_split_tolerance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            random_seed: 0,
            coarsen_limit: 64,
            matching_strategy: MatchingStrategy::HemSr,
            do_community_matching: false,
            high_degree_threshold: 2.0,
            guess_cut_type: GuessCutType::GuessRandom,
            num_dances: 1,
            use_fm: true,
            fm_search_depth: 50,
            fm_consider_count: 3,
            fm_max_num_refinements: 20,
            use_qp_grad_proj: true,
            grad_proj_tolerance: 0.001,
            gradproj_iteration_limit: 50,
            target_split: 0.5,
            soft_split_tolerance: 0.0,
        }
    }
}

impl Options {
    /// Validate every field's domain. Called before any allocation happens.
    pub fn validate(&self) -> Result<(), Error> {
        if self.coarsen_limit < 1 {
            return Err(Error::InvalidOption(
                "coarsen_limit must be >= 1".into(),
            ));
        }
        if self.high_degree_threshold < 0.0 {
            return Err(Error::InvalidOption(
                "high_degree_threshold must be >= 0".into(),
            ));
        }
        if self.target_split < 0.0 || self.target_split > 1.0 {
            return Err(Error::InvalidOption(
                "target_split must be in [0, 1]".into(),
            ));
        }
        if self.soft_split_tolerance < 0.0 {
            return Err(Error::InvalidOption(
                "soft_split_tolerance must be >= 0".into(),
            ));
        }
        if self.grad_proj_tolerance < 0.0 {
            return Err(Error::InvalidOption(
                "grad_proj_tolerance must be >= 0".into(),
            ));
        }
        Ok(())
    }

    /// `(lo, hi)` knapsack bounds derived from `W`, `target_split`.
    pub(crate) fn knapsack_bounds(&self, total_weight: f64) -> (f64, f64) {
        let lo_split = if self.target_split <= 0.5 {
            self.target_split
        } else {
            1.0 - self.target_split
        };
        let hi_split = if self.target_split >= 0.5 {
            self.target_split
        } else {
            1.0 - self.target_split
        };
        (total_weight * lo_split, total_weight * hi_split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_coarsen_limit() {
        let mut o = Options::default();
        o.coarsen_limit = 0;
        assert_eq!(
            o.validate(),
            Err(Error::InvalidOption("coarsen_limit must be >= 1".into()))
        );
    }

    #[test]
    fn rejects_bad_target_split() {
        let mut o = Options::default();
        o.target_split = 1.5;
        assert!(o.validate().is_err());
    }
}
