//! Projects a coarse level's partition back onto its parent while
//! uncoarsening.

use crate::boundary_heap::bh_load;
use crate::coarsen::group_members;
use crate::graph::Level;
use crate::options::Options;

/// Copy `coarse`'s partition down onto every fine constituent recorded in
/// `fine`'s matching (`fine` is `coarse`'s parent: its matching/matchmap
/// were produced by the coarsening step that built `coarse`), then rebuild
/// `fine`'s boundary-heap state from scratch.
pub fn refine(fine: &mut Level, coarse: &Level, options: &Options) {
    for c in 0..coarse.n() {
        let side = coarse.partition[c];
        for member in group_members(fine, c).into_iter().flatten() {
            fine.partition[member] = side;
        }
    }
    bh_load(fine, options);
}
