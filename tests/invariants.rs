//! Cross-cutting invariants checked against the public API over a handful
//! of graphs, independent of any particular cut value.

use edgesep::{edge_separator, CscGraph, Options};

fn path4() -> CscGraph {
    CscGraph::new(
        4,
        vec![0, 1, 3, 5, 6],
        vec![1, 0, 2, 1, 3, 2],
        vec![1.0; 6],
        vec![],
    )
}

fn cycle6() -> CscGraph {
    let n = 6;
    let mut i = Vec::new();
    let mut p = vec![0usize; n + 1];
    for k in 0..n {
        let prev = (k + n - 1) % n;
        let next = (k + 1) % n;
        i.push(prev);
        i.push(next);
        p[k + 1] = i.len();
    }
    CscGraph::new(n, p, i, vec![1.0; 2 * n], vec![])
}

fn weighted_star() -> CscGraph {
    // Hub 0 connected to leaves 1..4 with distinct weights.
    CscGraph::new(
        5,
        vec![0, 4, 5, 6, 7, 8],
        vec![1, 2, 3, 4, 0, 0, 0, 0],
        vec![3.0, 2.0, 1.0, 4.0, 3.0, 2.0, 1.0, 4.0],
        vec![2.0, 1.0, 1.0, 1.0, 1.0],
    )
}

fn graphs() -> Vec<CscGraph> {
    vec![path4(), cycle6(), weighted_star()]
}

#[test]
fn side_weights_sum_to_total_vertex_weight() {
    for csc in graphs() {
        let total: f64 = (0..csc.n).map(|k| csc.vertex_weight(k)).sum();
        let result = edge_separator(csc, &Options::default()).unwrap();
        assert!((result.w0 + result.w1 - total).abs() < 1e-9);
    }
}

#[test]
fn cut_size_matches_the_definition_over_raw_edges() {
    for csc in graphs() {
        let n = csc.n;
        let adjacency = csc.clone();
        let result = edge_separator(csc, &Options::default()).unwrap();

        let mut expected_size = 0usize;
        let mut expected_cost = 0.0f64;
        for u in 0..n {
            for (idx, &v) in adjacency.neighbors(u).iter().enumerate() {
                if u < v && result.partition[u] != result.partition[v] {
                    expected_size += 1;
                    expected_cost += adjacency.edge_weights(u)[idx];
                }
            }
        }
        assert_eq!(result.cut_size, expected_size);
        assert!((result.cut_cost - expected_cost).abs() < 1e-9);
    }
}

#[test]
fn imbalance_is_never_negative_after_finalization() {
    for csc in graphs() {
        let result = edge_separator(csc, &Options::default()).unwrap();
        assert!(result.imbalance >= 0.0);
    }
}

#[test]
fn identical_seed_and_input_reproduce_the_same_partition() {
    for csc in graphs() {
        let opts = Options {
            random_seed: 123,
            ..Options::default()
        };
        let a = edge_separator(csc.clone(), &opts).unwrap();
        let b = edge_separator(csc, &opts).unwrap();
        assert_eq!(a.partition, b.partition);
        assert_eq!(a.cut_size, b.cut_size);
        assert_eq!(a.cut_cost, b.cut_cost);
    }
}

#[test]
fn every_vertex_is_assigned_a_side() {
    for csc in graphs() {
        let n = csc.n;
        let result = edge_separator(csc, &Options::default()).unwrap();
        assert_eq!(result.partition.len(), n);
    }
}
