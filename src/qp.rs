//! Continuous quadratic-programming relaxation of the 0/1 partition.
//!
//! Minimizes `½ x'(D−A)x` subject to `0 ≤ x ≤ 1, lo ≤ a·x ≤ hi`, where `A`
//! is the weighted adjacency and `D[k]` a per-vertex diagonal majorant
//! (the max incident edge weight) that keeps the quadratic form locally
//! convex along coordinate directions. Gradient projection does the bulk
//! of the descent; a four-stage boundary pass then pushes fractional
//! coordinates onto `0`/`1` while preserving the knapsack constraint.

use crate::boundary_heap::flip_vertex;
use crate::graph::Level;
use crate::napsack::project_knapsack;
use crate::options::Options;

/// State of one QP invocation: the relaxed point, its gradient, and the
/// active-set bookkeeping (`status` plus an intrusive free list).
pub struct QpDelta {
    /// Relaxed coordinate per vertex, in `[0, 1]`.
    pub x: Vec<f64>,
    /// Gradient of the quadratic objective at `x`.
    pub grad: Vec<f64>,
    /// Diagonal majorant, `D[k] = max` incident edge weight.
    pub d: Vec<f64>,
    /// `-1` pinned at 0, `0` free, `+1` pinned at 1.
    pub status: Vec<i8>,
    /// Forward links of the free-set list; index `n` is the sentinel.
    link_up: Vec<usize>,
    /// Backward links of the free-set list; index `n` is the sentinel.
    link_dn: Vec<usize>,
    /// Current knapsack value `a·x`.
    pub b: f64,
    /// Knapsack lower bound.
    pub lo: f64,
    /// Knapsack upper bound.
    pub hi: f64,
    /// Napsack Lagrange multiplier, carried as a warm start across calls.
    pub lambda: f64,
}

impl QpDelta {
    fn new(n: usize) -> Self {
        let mut qp = QpDelta {
            x: vec![0.0; n],
            grad: vec![0.0; n],
            d: vec![0.0; n],
            status: vec![0; n],
            link_up: vec![0; n + 1],
            link_dn: vec![0; n + 1],
            b: 0.0,
            lo: 0.0,
            hi: 0.0,
            lambda: 0.0,
        };
        qp.link_up[n] = n;
        qp.link_dn[n] = n;
        qp
    }

    fn free_set_insert(&mut self, n: usize, k: usize) {
        let head = self.link_up[n];
        self.link_up[n] = k;
        self.link_dn[k] = n;
        self.link_up[k] = head;
        self.link_dn[head] = k;
    }

    fn free_set_remove(&mut self, k: usize) {
        let up = self.link_up[k];
        let dn = self.link_dn[k];
        self.link_up[dn] = up;
        self.link_dn[up] = dn;
    }

    fn free_set_snapshot(&self, n: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.link_up[n];
        while cur != n {
            out.push(cur);
            cur = self.link_up[cur];
        }
        out
    }
}

fn vertex_weights(level: &Level) -> Vec<f64> {
    (0..level.n()).map(|k| level.csc.vertex_weight(k)).collect()
}

fn diagonal_majorant(level: &Level) -> Vec<f64> {
    (0..level.n())
        .map(|k| {
            level
                .csc
                .edge_weights(k)
                .iter()
                .cloned()
                .fold(0.0, f64::max)
        })
        .collect()
}

/// `(A + D) * v`, evaluated densely over every index (not restricted to
/// the free set): row `k` is `D[k]*v[k] + Σ_neighbors w(k,m)*v[m]`.
fn quad_form(level: &Level, qp: &QpDelta, v: &[f64]) -> Vec<f64> {
    let n = level.n();
    let mut out = vec![0.0; n];
    for k in 0..n {
        let mut s = qp.d[k] * v[k];
        for (idx, &nbr) in level.csc.neighbors(k).iter().enumerate() {
            s += level.csc.edge_weights(k)[idx] * v[nbr];
        }
        out[k] = s;
    }
    out
}

fn classify(x: f64) -> i8 {
    if x <= 0.0 {
        -1
    } else if x >= 1.0 {
        1
    } else {
        0
    }
}

/// Move `x[k]` by `delta`, updating `b` and every affected gradient entry
/// so `grad` stays exactly consistent with `x` (the partial derivative of
/// `grad[k]` w.r.t. `x[k]` is `-D[k]`; w.r.t. a neighbor `m`'s coordinate
/// it's `-w(k,m)`).
fn shift_x(level: &Level, qp: &mut QpDelta, weights: &[f64], k: usize, delta: f64) {
    if delta == 0.0 {
        return;
    }
    qp.x[k] += delta;
    qp.b += weights[k] * delta;
    qp.grad[k] -= delta * qp.d[k];
    for (idx, &nbr) in level.csc.neighbors(k).iter().enumerate() {
        qp.grad[nbr] -= delta * level.csc.edge_weights(k)[idx];
    }
}

/// Phase A: classify every vertex by its starting `x` (the current 0/1
/// partition), build the free list, and compute the gradient and `b`.
pub fn qp_links(level: &Level, options: &Options, x: Vec<f64>) -> QpDelta {
    let n = level.n();
    let mut qp = QpDelta::new(n);
    qp.d = diagonal_majorant(level);
    qp.x = x;

    for k in 0..n {
        let s = classify(qp.x[k]);
        qp.status[k] = s;
        if s == 0 {
            qp.free_set_insert(n, k);
        }
    }

    for k in 0..n {
        let mut g = (0.5 - qp.x[k]) * qp.d[k];
        for (idx, &nbr) in level.csc.neighbors(k).iter().enumerate() {
            g += (0.5 - qp.x[nbr]) * level.csc.edge_weights(k)[idx];
        }
        qp.grad[k] = g;
    }

    let weights = vertex_weights(level);
    qp.b = (0..n).map(|k| weights[k] * qp.x[k]).sum();
    let (lo, hi) = options.knapsack_bounds(level.w_total);
    qp.lo = lo;
    qp.hi = hi;
    qp
}

fn reclassify(qp: &mut QpDelta, n: usize, k: usize) {
    let old = qp.status[k];
    let new = classify(qp.x[k]);
    if old == new {
        return;
    }
    if old == 0 && new != 0 {
        qp.free_set_remove(k);
    } else if old != 0 && new == 0 {
        qp.free_set_insert(n, k);
    }
    qp.status[k] = new;
}

/// Phase B: projected-gradient descent with an exact line search along the
/// napsack-projected direction, warm-starting the napsack multiplier
/// across both the unit-step and scaled-step projections each iteration.
pub fn qp_grad_proj(level: &Level, options: &Options, qp: &mut QpDelta) {
    let n = level.n();
    let weights = vertex_weights(level);

    for _ in 0..options.gradproj_iteration_limit {
        let y1: Vec<f64> = (0..n).map(|k| qp.x[k] - qp.grad[k]).collect();
        let (y1p, lambda1) = project_knapsack(&y1, &weights, qp.lo, qp.hi, qp.lambda);
        qp.lambda = lambda1;

        let error = (0..n).fold(0.0f64, |m, k| m.max((y1p[k] - qp.x[k]).abs()));
        if error <= options.grad_proj_tolerance {
            break;
        }

        let grad_free: Vec<f64> = (0..n)
            .map(|k| if qp.status[k] == 0 { qp.grad[k] } else { 0.0 })
            .collect();
        let adg = quad_form(level, qp, &grad_free);
        let dgrad: Vec<f64> = adg.iter().map(|&v| -v).collect();

        let gg: f64 = (0..n)
            .filter(|&k| qp.status[k] == 0)
            .map(|k| qp.grad[k] * qp.grad[k])
            .sum();
        let denom: f64 = (0..n)
            .filter(|&k| qp.status[k] == 0)
            .map(|k| qp.grad[k] * adg[k])
            .sum();
        let st = if denom > 0.0 { (gg / denom).max(0.001) } else { 1.0 };

        let y2: Vec<f64> = (0..n).map(|k| qp.x[k] - st * qp.grad[k]).collect();
        let (y2p, lambda2) = project_knapsack(&y2, &weights, qp.lo, qp.hi, qp.lambda);
        qp.lambda = lambda2;

        let d_dir: Vec<f64> = (0..n).map(|k| y2p[k] - qp.x[k]).collect();
        let g_dot_d: f64 = (0..n).map(|k| qp.grad[k] * d_dir[k]).sum();
        if g_dot_d >= 0.0 {
            break;
        }

        let s = g_dot_d;
        let adxd = quad_form(level, qp, &d_dir);
        let t = -(0..n).map(|k| d_dir[k] * adxd[k]).sum::<f64>();

        let alpha = if s + t <= 0.0 { 1.0 } else { -s / t };
        for k in 0..n {
            if d_dir[k] != 0.0 {
                shift_x(level, qp, &weights, k, alpha * d_dir[k]);
                reclassify(qp, n, k);
            }
        }
        if s + t <= 0.0 {
            for k in 0..n {
                qp.grad[k] += dgrad[k];
            }
        } else {
            for k in 0..n {
                qp.grad[k] += alpha * dgrad[k];
            }
        }
    }
}

/// Stage 1: while the knapsack sum sits strictly inside `(lo, hi)`, slide
/// free coordinates toward the bound their gradient sign favors,
/// consuming slack until `b` reaches `lo` or `hi`.
fn stage1_slide_to_bound(level: &Level, qp: &mut QpDelta, weights: &[f64]) {
    let n = level.n();
    loop {
        if !(qp.lo < qp.b && qp.b < qp.hi) {
            break;
        }
        let free = qp.free_set_snapshot(n);
        if free.is_empty() {
            break;
        }
        let mut progressed = false;
        for k in free {
            if qp.status[k] != 0 || !(qp.lo < qp.b && qp.b < qp.hi) {
                continue;
            }
            let g = qp.grad[k];
            if g == 0.0 {
                continue;
            }
            let target = if g > 0.0 { 0.0 } else { 1.0 };
            let ak = weights[k];
            let full_delta_b = ak * (target - qp.x[k]);
            let b_after = qp.b + full_delta_b;

            if full_delta_b < 0.0 && b_after <= qp.lo {
                shift_x(level, qp, weights, k, (qp.lo - qp.b) / ak);
                progressed = true;
            } else if full_delta_b > 0.0 && b_after >= qp.hi {
                shift_x(level, qp, weights, k, (qp.hi - qp.b) / ak);
                progressed = true;
            } else {
                shift_x(level, qp, weights, k, target - qp.x[k]);
                qp.status[k] = if target == 0.0 { -1 } else { 1 };
                qp.free_set_remove(k);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}

/// Stage 2: try flipping each already-pinned vertex to its opposite bound
/// when the knapsack slack admits it and doing so lowers the local scalar
/// cost.
fn stage2_flip_pinned(level: &Level, qp: &mut QpDelta, weights: &[f64]) {
    let n = level.n();
    for k in 0..n {
        if qp.status[k] == 0 {
            continue;
        }
        let (from, to) = if qp.status[k] == -1 { (0.0, 1.0) } else { (1.0, 0.0) };
        let ak = weights[k];
        let b_after = qp.b + ak * (to - from);
        if b_after < qp.lo || b_after > qp.hi {
            continue;
        }
        let cost_delta = if qp.status[k] == -1 {
            0.5 * qp.d[k] + qp.grad[k]
        } else {
            0.5 * qp.d[k] - qp.grad[k]
        };
        if cost_delta < 0.0 {
            shift_x(level, qp, weights, k, to - from);
            qp.status[k] = if to == 1.0 { 1 } else { -1 };
        }
    }
}

/// Coordinated two-variable move preserving `a.x`: `dx_i = -s/a_i, dx_j =
/// s/a_j` for the `s` (of either sign) that reaches a bound on one
/// coordinate and yields the better of the two quadratic cost changes.
/// `cross` is the edge weight between `i` and `j` (0 if non-adjacent).
fn pair_update(level: &Level, qp: &mut QpDelta, weights: &[f64], i: usize, j: usize, cross: f64) {
    let (ai, aj) = (weights[i], weights[j]);
    if ai == 0.0 || aj == 0.0 {
        return;
    }

    let s_pos = (aj * (1.0 - qp.x[j])).min(ai * qp.x[i]);
    let s_neg = (aj * qp.x[j]).min(ai * (1.0 - qp.x[i]));

    let cost = |s: f64| -> (f64, f64) {
        let dxi = -s / ai;
        let dxj = s / aj;
        let delta = qp.grad[i] * dxi
            + qp.grad[j] * dxj
            + 0.5 * qp.d[i] * dxi * dxi
            + 0.5 * qp.d[j] * dxj * dxj
            - cross * dxi * dxj;
        (delta, s)
    };

    let candidates: Vec<(f64, f64)> = [s_pos, -s_neg]
        .into_iter()
        .filter(|&s| s.abs() > 0.0)
        .map(cost)
        .collect();

    let best = candidates
        .into_iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    if let Some((delta, s)) = best {
        if delta < 0.0 {
            shift_x(level, qp, weights, i, -s / ai);
            shift_x(level, qp, weights, j, s / aj);
            reclassify(qp, level.n(), i);
            reclassify(qp, level.n(), j);
        }
    }
}

/// Stage 3: pair off free, non-adjacent indices two at a time.
fn stage3_pair_nonadjacent(level: &Level, qp: &mut QpDelta, weights: &[f64]) {
    let n = level.n();
    let free = qp.free_set_snapshot(n);
    let mut used = vec![false; n];

    for &i in &free {
        if used[i] || qp.status[i] != 0 {
            continue;
        }
        for &j in &free {
            if j == i || used[j] || qp.status[j] != 0 {
                continue;
            }
            let adjacent = level.csc.neighbors(i).contains(&j);
            if adjacent {
                continue;
            }
            pair_update(level, qp, weights, i, j, 0.0);
            used[i] = true;
            used[j] = true;
            break;
        }
    }
}

/// Stage 4: pair off whatever free indices remain (now necessarily
/// mutually adjacent), accounting for the cross edge weight.
fn stage4_pair_adjacent(level: &Level, qp: &mut QpDelta, weights: &[f64]) {
    let n = level.n();
    loop {
        let free = qp.free_set_snapshot(n);
        if free.len() < 2 {
            break;
        }
        let i = free[0];
        let j = free[1];
        let cross = level
            .csc
            .neighbors(i)
            .iter()
            .position(|&m| m == j)
            .map(|idx| level.csc.edge_weights(i)[idx])
            .unwrap_or(0.0);
        pair_update(level, qp, weights, i, j, cross);
        if qp.status[i] == 0 && qp.status[j] == 0 {
            // Neither moved to a bound; avoid looping forever on a stalled pair.
            break;
        }
    }
}

/// Stage 5: if exactly one free coordinate remains, solve its 1-D
/// quadratic subproblem exactly within the feasible range. Unlike a
/// naive port, this always updates `b` via `shift_x` so the knapsack
/// invariant `lo <= b <= hi` never drifts out of sync with `x`.
fn stage5_single_free(level: &Level, qp: &mut QpDelta, weights: &[f64]) {
    let n = level.n();
    let free = qp.free_set_snapshot(n);
    if free.len() != 1 {
        return;
    }
    let k = free[0];
    let ak = weights[k];
    if ak == 0.0 {
        return;
    }

    let b_rest = qp.b - ak * qp.x[k];
    let lo_k = ((qp.lo - b_rest) / ak).max(0.0);
    let hi_k = ((qp.hi - b_rest) / ak).min(1.0);
    let (lo_k, hi_k) = if lo_k <= hi_k { (lo_k, hi_k) } else { (hi_k, lo_k) };

    let unconstrained = if qp.d[k] > 0.0 {
        qp.x[k] - qp.grad[k] / qp.d[k]
    } else {
        qp.x[k]
    };
    let new_x = unconstrained.clamp(lo_k, hi_k).clamp(0.0, 1.0);

    shift_x(level, qp, weights, k, new_x - qp.x[k]);
    reclassify(qp, n, k);
}

/// Phase C: the four-stage boundary pass.
pub fn qp_boundary(level: &Level, qp: &mut QpDelta) {
    let weights = vertex_weights(level);
    stage1_slide_to_bound(level, qp, &weights);
    stage2_flip_pinned(level, qp, &weights);
    stage3_pair_nonadjacent(level, qp, &weights);
    stage4_pair_adjacent(level, qp, &weights);
    stage5_single_free(level, qp, &weights);
}

/// Run the full QP refiner on `level`'s current partition: links, two
/// rounds of gradient-projection + boundary pass (the "double dance"),
/// then round each coordinate to 0/1 and apply it as a sequence of
/// gain-consistent vertex flips.
pub fn qp_refine(level: &mut Level, options: &Options) {
    if !options.use_qp_grad_proj {
        return;
    }

    let x0: Vec<f64> = level
        .partition
        .iter()
        .map(|&side| if side { 1.0 } else { 0.0 })
        .collect();
    let mut qp = qp_links(level, options, x0);

    qp_grad_proj(level, options, &mut qp);
    qp_boundary(level, &mut qp);
    qp_grad_proj(level, options, &mut qp);
    qp_boundary(level, &mut qp);

    for k in 0..level.n() {
        let new_side = qp.x[k] > 0.5;
        if new_side != level.partition[k] {
            flip_vertex(level, k);
        }
    }

    crate::boundary_heap::bh_load(level, options);
}
