//! Fiduccia-Mattheyses local search: bounded-depth, best-move-with-
//! backtracking vertex swapping driven by the boundary heaps.

use crate::boundary_heap::flip_vertex;
use crate::graph::Level;
use crate::options::Options;

#[derive(Clone, Copy)]
struct WorkingCost {
    cut_cost: f64,
    w0: f64,
    w1: f64,
    imbalance: f64,
    heu_cost: f64,
}

impl WorkingCost {
    fn from_level(level: &Level) -> Self {
        WorkingCost {
            cut_cost: level.cut_cost,
            w0: level.w0,
            w1: level.w1,
            imbalance: level.imbalance,
            heu_cost: level.heu_cost,
        }
    }
}

/// Tentative cost of flipping `v`: the ranking heuristic (balance penalty
/// applied only when the move would make the imbalance worse) and the
/// resulting working-cost snapshot (balance penalty applied unconditionally
/// past the soft tolerance, matching `bh_load`'s own `heu_cost` formula so
/// the two stay comparable across passes).
fn candidate_cost(level: &Level, options: &Options, working: &WorkingCost, v: usize) -> (f64, WorkingCost) {
    let gain = level.gain[v];
    let w_v = level.csc.vertex_weight(v);
    let (mut w0, mut w1) = (working.w0, working.w1);
    if level.partition[v] {
        w1 -= w_v;
        w0 += w_v;
    } else {
        w0 -= w_v;
        w1 += w_v;
    }

    let target = Level::folded_target_split(options);
    let new_imbalance = target - w0.min(w1) / level.w_total;
    // x2 because of symmetry: cut_cost counts each cut edge from both endpoints.
    let new_cut_cost = working.cut_cost - 2.0 * gain;

    let worsened = new_imbalance.abs() > working.imbalance.abs();
    let ranking_penalty = if new_imbalance.abs() > options.soft_split_tolerance && worsened {
        new_imbalance.abs() * level.h
    } else {
        0.0
    };
    let heuristic = working.cut_cost - (gain - ranking_penalty);

    let new_heu_cost = new_cut_cost
        + if new_imbalance.abs() > options.soft_split_tolerance {
            new_imbalance.abs() * level.h
        } else {
            0.0
        };

    (
        heuristic,
        WorkingCost {
            cut_cost: new_cut_cost,
            w0,
            w1,
            imbalance: new_imbalance,
            heu_cost: new_heu_cost,
        },
    )
}

/// Scan the top `fm_consider_count` entries of each side's boundary heap,
/// skip locked vertices, and return the unlocked candidate with the
/// smallest heuristic cost.
fn find_best_move(level: &Level, options: &Options, working: &WorkingCost) -> Option<(usize, WorkingCost)> {
    let mut best: Option<(f64, usize, WorkingCost)> = None;

    for side in 0..2 {
        let heap = &level.bh_heap[side];
        let take = heap.len().min(options.fm_consider_count);
        for &v in &heap[..take] {
            if level.is_marked(v) {
                continue;
            }
            let (heuristic, new_working) = candidate_cost(level, options, working, v);
            if best.as_ref().map_or(true, |&(best_h, _, _)| heuristic < best_h) {
                best = Some((heuristic, v, new_working));
            }
        }
    }

    best.map(|(_, v, w)| (v, w))
}

/// One bounded-depth pass: walk forward making the locally best move each
/// step, tracking the best cost seen; on backtrack-exhaustion, undo every
/// tentative move past the last commit point.
fn fm_pass(level: &mut Level, options: &Options) {
    level.clear_marks();

    let mut working = WorkingCost::from_level(level);
    let mut best = working;
    let mut stack: Vec<usize> = Vec::new();
    let mut head = 0usize;
    let mut since_commit = 0usize;

    while since_commit < options.fm_search_depth {
        match find_best_move(level, options, &working) {
            None => break,
            Some((v, new_working)) => {
                level.mark(v);
                flip_vertex(level, v);
                stack.push(v);
                working = new_working;
                since_commit += 1;

                if working.heu_cost < best.heu_cost {
                    best = working;
                    head = stack.len();
                    since_commit = 0;
                }
            }
        }
    }

    for &v in stack[head..].iter().rev() {
        flip_vertex(level, v);
    }
    level.clear_marks();

    level.cut_cost = best.cut_cost;
    level.w0 = best.w0;
    level.w1 = best.w1;
    level.imbalance = best.imbalance;
    level.heu_cost = best.heu_cost;
}

/// Run inner passes until one fails to strictly improve `heu_cost`, or
/// `fm_max_num_refinements` is reached. FM never fails: it either
/// improves the cost or leaves it unchanged.
pub fn fm_refine(level: &mut Level, options: &Options) {
    if !options.use_fm {
        return;
    }

    let mut iterations = 0usize;
    loop {
        if iterations >= options.fm_max_num_refinements {
            break;
        }
        let before = level.heu_cost;
        fm_pass(level, options);
        iterations += 1;
        if level.heu_cost >= before {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary_heap::bh_load;
    use crate::graph::CscGraph;

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
    fn fm_never_increases_cut_cost() {
        let mut lvl = path4();
        lvl.partition = vec![true, false, true, false];
        let opts = Options::default();
        bh_load(&mut lvl, &opts);
        let before = lvl.cut_cost;
        fm_refine(&mut lvl, &opts);
        assert!(lvl.cut_cost <= before);
    }

    #[test]
    fn fm_finds_the_optimal_path_bisection() {
        let mut lvl = path4();
        lvl.partition = vec![true, false, true, false];
        let opts = Options::default();
        bh_load(&mut lvl, &opts);
        fm_refine(&mut lvl, &opts);
        // cut_cost is the doubled bookkeeping (each cut edge counted from
        // both endpoints) until `finalize` halves it; the optimal path
        // bisection has one cut edge, so this is 2.0, not 1.0.
        assert_eq!(lvl.cut_cost, 2.0);
    }

    #[test]
    fn fm_is_a_no_op_when_disabled() {
        let mut lvl = path4();
        lvl.partition = vec![true, false, true, false];
        let opts = Options {
            use_fm: false,
            ..Options::default()
        };
        bh_load(&mut lvl, &opts);
        let before = lvl.partition.clone();
        fm_refine(&mut lvl, &opts);
        assert_eq!(lvl.partition, before);
    }
}
