//! Alternates FM and QP refinement at a single level.

use crate::fm::fm_refine;
use crate::graph::Level;
use crate::options::Options;
use crate::qp::qp_refine;

/// Run `options.num_dances` alternations of FM (§ local search) then QP
/// (§ gradient-projection relaxation), each a no-op when its enablement
/// flag is off.
pub fn waterdance(level: &mut Level, options: &Options) {
    for _ in 0..options.num_dances {
        fm_refine(level, options);
        qp_refine(level, options);
    }
}
