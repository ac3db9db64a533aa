//! End-to-end scenarios against small, hand-checkable graphs.

use edgesep::{edge_separator, CscGraph, Error, GuessCutType, Options};

fn path4() -> CscGraph {
    CscGraph::new(
        4,
        vec![0, 1, 3, 5, 6],
        vec![1, 0, 2, 1, 3, 2],
        vec![1.0; 6],
        vec![],
    )
}

fn cycle4() -> CscGraph {
    CscGraph::new(
        4,
        vec![0, 2, 4, 6, 8],
        vec![1, 3, 0, 2, 1, 3, 2, 0],
        vec![1.0; 8],
        vec![],
    )
}

fn complete4() -> CscGraph {
    CscGraph::new(
        4,
        vec![0, 3, 6, 9, 12],
        vec![1, 2, 3, 0, 2, 3, 0, 1, 3, 0, 1, 2],
        vec![1.0; 12],
        vec![],
    )
}

/// Two triangles {0,1,2} and {3,4,5}, joined by a single bridge edge
/// (2, 3) of weight 1; internal triangle edges have weight 10.
fn two_triangles_with_bridge() -> CscGraph {
    let edges = [
        (0, 1, 10.0),
        (0, 2, 10.0),
        (1, 2, 10.0),
        (2, 3, 1.0),
        (3, 4, 10.0),
        (3, 5, 10.0),
        (4, 5, 10.0),
    ];
    let n = 6;
    let mut adj = vec![Vec::new(); n];
    for &(u, v, w) in &edges {
        adj[u].push((v, w));
        adj[v].push((u, w));
    }
    let mut p = vec![0usize; n + 1];
    let mut i = Vec::new();
    let mut x = Vec::new();
    for k in 0..n {
        for &(nbr, w) in &adj[k] {
            i.push(nbr);
            x.push(w);
        }
        p[k + 1] = i.len();
    }
    CscGraph::new(n, p, i, x, vec![])
}

fn weighted_triangle() -> CscGraph {
    CscGraph::new(
        3,
        vec![0, 2, 4, 6],
        vec![1, 2, 0, 2, 0, 1],
        vec![5.0, 1.0, 5.0, 1.0, 1.0, 1.0],
        vec![],
    )
}

#[test]
fn empty_graph_is_rejected() {
    let csc = CscGraph::new(0, vec![0], vec![], vec![], vec![]);
    assert_eq!(edge_separator(csc, &Options::default()), Err(Error::EmptyGraph));
}

#[test]
fn single_vertex_graph_is_trivial() {
    let csc = CscGraph::new(1, vec![0, 0], vec![], vec![], vec![]);
    let opts = Options::default();
    let result = edge_separator(csc, &opts).unwrap();
    assert_eq!(result.partition.len(), 1);
    assert_eq!(result.cut_cost, 0.0);
    assert_eq!(result.cut_size, 0);
    assert_eq!(result.imbalance, Options::default().target_split);
}

#[test]
fn path4_cuts_the_middle_edge() {
    let opts = Options {
        coarsen_limit: 1,
        ..Options::default()
    };
    let result = edge_separator(path4(), &opts).unwrap();
    assert_eq!(result.cut_cost, 1.0);
    assert_eq!(result.cut_size, 1);
    assert_eq!(result.imbalance, 0.0);
}

#[test]
fn cycle4_balanced_cut_costs_two() {
    let opts = Options {
        coarsen_limit: 1,
        ..Options::default()
    };
    let result = edge_separator(cycle4(), &opts).unwrap();
    assert_eq!(result.cut_cost, 2.0);
    assert_eq!(result.cut_size, 2);
}

#[test]
fn k4_balanced_cut_costs_four() {
    let opts = Options {
        coarsen_limit: 1,
        ..Options::default()
    };
    let result = edge_separator(complete4(), &opts).unwrap();
    assert_eq!(result.cut_cost, 4.0);
    assert_eq!(result.cut_size, 4);
}

#[test]
fn bridge_between_two_triangles_is_the_cheapest_cut() {
    let opts = Options {
        coarsen_limit: 1,
        guess_cut_type: GuessCutType::GuessQp,
        ..Options::default()
    };
    let result = edge_separator(two_triangles_with_bridge(), &opts).unwrap();
    assert_eq!(result.cut_cost, 1.0);
    assert_eq!(result.cut_size, 1);
}

#[test]
fn weighted_triangle_avoids_the_cheap_unbalanced_cut() {
    let opts = Options {
        coarsen_limit: 1,
        target_split: 0.5,
        soft_split_tolerance: 0.34,
        guess_cut_type: GuessCutType::GuessQp,
        ..Options::default()
    };
    let result = edge_separator(weighted_triangle(), &opts).unwrap();
    // The balanced {0}|{1,2} cut (cost 2) must win over the cheap but
    // unbalanced {0,1}|{2} cut (cost 6).
    assert_eq!(result.cut_cost, 2.0);
}
