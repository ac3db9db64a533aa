//! Two vertex-indexed max-heaps (one per partition side), keyed by gain.
//!
//! Each heap is a plain binary heap array paired with an inverse index
//! (`Level::bh_index`) kept in lockstep at every swap, so an arbitrary
//! vertex can be located and removed in O(log n) — a generic priority
//! queue can't do that, since it has no notion of "where is vertex v".

use crate::graph::Level;
use crate::options::Options;

/// Scan every vertex, compute gain and external degree from scratch, and
/// load boundary vertices into the two heaps. Also recomputes `cut_cost`,
/// `w0`, `w1`, `imbalance`, and `heu_cost`. Idempotent.
pub fn bh_load(level: &mut Level, options: &Options) {
    bh_clear(level);

    let n = level.n();
    let mut cut_cost = 0.0;
    let mut w = [0.0f64; 2];

    for k in 0..n {
        let k_side = level.partition[k] as usize;
        w[k_side] += level.csc.vertex_weight(k);

        let mut gain = 0.0;
        let mut ext_degree = 0usize;
        for (idx, &nbr) in level.csc.neighbors(k).iter().enumerate() {
            let edge_weight = level.csc.edge_weights(k)[idx];
            let same_side = level.partition[k] == level.partition[nbr];
            gain += if same_side { -edge_weight } else { edge_weight };
            if !same_side {
                ext_degree += 1;
                cut_cost += edge_weight;
            }
        }
        level.gain[k] = gain;
        level.external_degree[k] = ext_degree;
        if ext_degree > 0 {
            bh_insert(level, k);
        }
    }

    level.cut_cost = cut_cost;
    level.w0 = w[0];
    level.w1 = w[1];

    let target_split = Level::folded_target_split(options);
    level.imbalance = target_split - level.w0.min(level.w1) / level.w_total;
    level.heu_cost = level.cut_cost
        + if level.imbalance.abs() > options.soft_split_tolerance {
            level.imbalance.abs() * level.h
        } else {
            0.0
        };
}

/// Insert `vertex` into the heap for its current side, then sift up.
pub fn bh_insert(level: &mut Level, vertex: usize) {
    let side = level.partition[vertex] as usize;
    let pos = level.bh_heap[side].len();
    level.bh_heap[side].push(vertex);
    level.bh_index[vertex] = pos + 1;
    heapify_up(level, side, pos);
}

/// Zero the inverse index and external degree for every heaped vertex and
/// empty both heaps.
pub fn bh_clear(level: &mut Level) {
    for side in 0..2 {
        for v in std::mem::take(&mut level.bh_heap[side]) {
            level.bh_index[v] = 0;
            level.external_degree[v] = 0;
        }
    }
}

/// Remove `vertex` (known to be at heap position `bh_position` on `side`)
/// by swapping in the last element, then sifting up and down from that
/// slot.
pub fn bh_remove(level: &mut Level, vertex: usize, side: bool, bh_position: usize) {
    let side = side as usize;
    let last = level.bh_heap[side].len() - 1;

    if bh_position == last {
        level.bh_heap[side].pop();
        level.bh_index[vertex] = 0;
        return;
    }

    let moved = level.bh_heap[side][last];
    level.bh_heap[side].pop();
    level.bh_heap[side][bh_position] = moved;
    level.bh_index[moved] = bh_position + 1;
    level.bh_index[vertex] = 0;

    heapify_up(level, side, bh_position);
    let new_pos = level.bh_index[moved] - 1;
    heapify_down(level, side, new_pos);
}

/// Sift the element at `position` upward while it beats its parent.
pub fn heapify_up(level: &mut Level, side: usize, mut position: usize) {
    while position > 0 {
        let parent = (position - 1) / 2;
        let v = level.bh_heap[side][position];
        let pv = level.bh_heap[side][parent];
        if level.gain[pv] < level.gain[v] {
            level.bh_heap[side].swap(position, parent);
            level.bh_index[v] = parent + 1;
            level.bh_index[pv] = position + 1;
            position = parent;
        } else {
            break;
        }
    }
}

/// Sift the element at `position` downward while a child beats it.
pub fn heapify_down(level: &mut Level, side: usize, mut position: usize) {
    let size = level.bh_heap[side].len();
    loop {
        let left = 2 * position + 1;
        let right = 2 * position + 2;
        let v = level.bh_heap[side][position];
        let vg = level.gain[v];

        let lg = if left < size {
            level.gain[level.bh_heap[side][left]]
        } else {
            f64::NEG_INFINITY
        };
        let rg = if right < size {
            level.gain[level.bh_heap[side][right]]
        } else {
            f64::NEG_INFINITY
        };

        if vg >= lg && vg >= rg {
            break;
        }

        let swap_with = if lg > rg { left } else { right };
        let sv = level.bh_heap[side][swap_with];
        level.bh_heap[side].swap(position, swap_with);
        level.bh_index[v] = swap_with + 1;
        level.bh_index[sv] = position + 1;
        position = swap_with;
    }
}

/// Flip `v` to the opposite side, updating its gain, every neighbor's gain
/// and external degree, both sides' weight totals, and boundary-heap
/// membership for `v` and every neighbor. Used by both the FM local search
/// and QP's final rounding step, so a flip is always fully consistent
/// regardless of caller.
pub fn flip_vertex(level: &mut Level, v: usize) {
    if level.in_boundary(v) {
        let side = level.partition[v];
        let pos = level.bh_index[v] - 1;
        bh_remove(level, v, side, pos);
    }

    let w_v = level.csc.vertex_weight(v);
    if level.partition[v] {
        level.w1 -= w_v;
        level.w0 += w_v;
    } else {
        level.w0 -= w_v;
        level.w1 += w_v;
    }

    level.gain[v] = -level.gain[v];
    level.partition[v] = !level.partition[v];

    let neighbors = level.csc.neighbors(v).to_vec();
    let weights_v = level.csc.edge_weights(v).to_vec();

    let mut ext = 0usize;
    for &u in &neighbors {
        if level.partition[u] != level.partition[v] {
            ext += 1;
        }
    }
    level.external_degree[v] = ext;

    for (idx, &u) in neighbors.iter().enumerate() {
        let w = weights_v[idx];
        let same_side = level.partition[u] == level.partition[v];
        level.gain[u] += 2.0 * if same_side { -w } else { w };
        if same_side {
            level.external_degree[u] -= 1;
        } else {
            level.external_degree[u] += 1;
        }

        if level.in_boundary(u) {
            if level.external_degree[u] == 0 {
                let side = level.partition[u];
                let pos = level.bh_index[u] - 1;
                bh_remove(level, u, side, pos);
            } else {
                let side = level.partition[u] as usize;
                let pos = level.bh_index[u] - 1;
                heapify_up(level, side, pos);
                let pos2 = level.bh_index[u] - 1;
                heapify_down(level, side, pos2);
            }
        } else if level.external_degree[u] > 0 {
            bh_insert(level, u);
        }
    }

    if level.external_degree[v] > 0 {
        bh_insert(level, v);
    }
}

/// Verify the max-heap property and inverse-index round-trip for both
/// sides. Intended for tests and debug assertions, not the hot path.
pub fn check_heap_invariant(level: &Level) -> bool {
    for side in 0..2 {
        let heap = &level.bh_heap[side];
        for (pos, &v) in heap.iter().enumerate() {
            if level.bh_index[v] != pos + 1 {
                return false;
            }
            let left = 2 * pos + 1;
            let right = 2 * pos + 2;
            if left < heap.len() && level.gain[v] < level.gain[heap[left]] {
                return false;
            }
            if right < heap.len() && level.gain[v] < level.gain[heap[right]] {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn load_builds_valid_heaps() {
        let mut lvl = path4();
        lvl.partition = vec![false, false, true, true];
        let opts = Options::default();
        bh_load(&mut lvl, &opts);
        assert!(check_heap_invariant(&lvl));
        // cut_cost is the doubled bookkeeping until finalize halves it: the
        // one cut edge (1,2) is counted from both endpoints.
        assert_eq!(lvl.cut_cost, 2.0);
        assert_eq!(lvl.external_degree[1], 1);
        assert_eq!(lvl.external_degree[2], 1);
        assert_eq!(lvl.external_degree[0], 0);
    }

    #[test]
    fn insert_and_remove_preserve_invariant() {
        let mut lvl = path4();
        lvl.partition = vec![false, false, true, true];
        let opts = Options::default();
        bh_load(&mut lvl, &opts);

        let v = 1;
        let side = lvl.partition[v];
        let pos = lvl.bh_index[v] - 1;
        bh_remove(&mut lvl, v, side, pos);
        assert!(!lvl.in_boundary(v));
        assert!(check_heap_invariant(&lvl));

        bh_insert(&mut lvl, v);
        assert!(lvl.in_boundary(v));
        assert!(check_heap_invariant(&lvl));
    }

    #[test]
    fn flip_updates_cut_and_keeps_heap_valid() {
        let mut lvl = path4();
        lvl.partition = vec![false, false, true, true];
        let opts = Options::default();
        bh_load(&mut lvl, &opts);

        // Flipping vertex 1 to side 1 should remove the 0-1 cut edge but
        // create a new cut on edge 0-1's reverse neighbor bookkeeping.
        flip_vertex(&mut lvl, 1);
        assert!(check_heap_invariant(&lvl));
        assert!(lvl.partition[1]);
        assert_eq!(lvl.w0, 1.0);
        assert_eq!(lvl.w1, 3.0);
    }
}
