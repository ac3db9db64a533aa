//! First partition assigned to the coarsest graph in the hierarchy.

use rand::Rng;
use rand::rngs::StdRng;

use crate::boundary_heap::bh_load;
use crate::graph::Level;
use crate::options::{GuessCutType, Options};
use crate::qp::qp_refine;

fn guess_natural_order(level: &mut Level) {
    let n = level.n();
    let half = n / 2;
    level.partition = (0..n).map(|k| k >= half).collect();
}

fn guess_random(level: &mut Level, rng: &mut StdRng) {
    let n = level.n();
    level.partition = (0..n).map(|_| rng.gen_bool(0.5)).collect();
}

/// Seed a single vertex to side 1 and relax via one full QP pass; the
/// rounding step inside `qp_refine` turns the relaxed solution back into
/// a 0/1 partition.
fn guess_qp(level: &mut Level, options: &Options) {
    let n = level.n();
    level.partition = vec![false; n];
    if n > 0 {
        level.partition[0] = true;
    }
    bh_load(level, options);
    qp_refine(level, options);
}

/// Assign `level.partition` on the coarsest graph, per `options.guess_cut_type`.
pub fn guess_cut(level: &mut Level, options: &Options, rng: &mut StdRng) {
    match options.guess_cut_type {
        GuessCutType::GuessNaturalOrder => {
            guess_natural_order(level);
            bh_load(level, options);
        }
        GuessCutType::GuessRandom => {
            guess_random(level, rng);
            bh_load(level, options);
        }
        GuessCutType::GuessQp => guess_qp(level, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CscGraph;
    use crate::rng::seeded;

    fn path4() -> Level {
        let csc = CscGraph::new(
            4,
            vec![0, 1, 3, 5, 6],
            vec![1, 0, 2, 1, 3, 2],
            vec![1.0; 6],
            vec![],
        );
        let mut lvl = Level::from_csc(csc);
        lvl.initialize();
        lvl
    }

    #[test]
    fn natural_order_splits_in_half() {
        let mut lvl = path4();
        let opts = Options {
            guess_cut_type: GuessCutType::GuessNaturalOrder,
            ..Options::default()
        };
        let mut rng = seeded(0);
        guess_cut(&mut lvl, &opts, &mut rng);
        assert_eq!(lvl.partition, vec![false, false, true, true]);
        assert_eq!(lvl.w0, 2.0);
        assert_eq!(lvl.w1, 2.0);
    }

    #[test]
    fn random_guess_is_deterministic_for_a_fixed_seed() {
        let opts = Options {
            guess_cut_type: GuessCutType::GuessRandom,
            ..Options::default()
        };
        let mut lvl_a = path4();
        let mut rng_a = seeded(42);
        guess_cut(&mut lvl_a, &opts, &mut rng_a);

        let mut lvl_b = path4();
        let mut rng_b = seeded(42);
        guess_cut(&mut lvl_b, &opts, &mut rng_b);

        assert_eq!(lvl_a.partition, lvl_b.partition);
    }

    #[test]
    fn qp_guess_produces_a_feasible_partition() {
        let mut lvl = path4();
        let opts = Options {
            guess_cut_type: GuessCutType::GuessQp,
            ..Options::default()
        };
        let mut rng = seeded(0);
        guess_cut(&mut lvl, &opts, &mut rng);
        assert_eq!(lvl.w0 + lvl.w1, 4.0);
    }
}
