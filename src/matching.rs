//! Vertex matching strategies used to build the coarsening hierarchy.
//!
//! A matching groups 1-3 fine vertices into one coarse vertex. Groups are
//! encoded directly in `Level::matching`: `matching[v] == v` means `v` is
//! still unmatched (or, after cleanup, a 1-vertex orphan group);
//! otherwise `matching` forms a 2-cycle (`a <-> b`) or a 3-cycle
//! (`a -> b -> c -> a`) over the group's members.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::graph::{Level, MatchType};
use crate::options::{MatchingStrategy, Options};

fn is_matched(level: &Level, k: usize) -> bool {
    level.matching[k] != k
}

fn create_match(level: &mut Level, a: usize, b: usize, match_type: MatchType) {
    level.matching[a] = b;
    level.matching[b] = a;
    level.invmatchmap[level.cn] = a;
    level.matchtype[a] = match_type;
    level.matchtype[b] = match_type;
    level.matchmap[a] = level.cn;
    level.matchmap[b] = level.cn;
    level.cn += 1;
}

/// Fold a leftover unmatched `vertex_b` into `vertex_a`'s existing 2-cycle,
/// forming a 3-cycle. If `vertex_a` is already in a 3-cycle (shouldn't
/// happen in a single well-formed pass, but mirrors the source's defensive
/// handling), split it: close the old pair and start a fresh 2-way match.
fn create_community_match(level: &mut Level, vertex_a: usize, vertex_b: usize, match_type: MatchType) {
    let vm0 = vertex_a;
    let vm1 = level.matching[vm0];
    let vm2 = level.matching[vm1];
    let vm3 = level.matching[vm2];
    let is_3way = vm0 == vm3;

    if is_3way {
        level.matching[vm1] = vertex_a;
        create_match(level, vm2, vertex_b, match_type);
    } else {
        level.matching[vertex_b] = vm1;
        level.matching[vertex_a] = vertex_b;
        level.matchmap[vertex_b] = level.matchmap[vertex_a];
        level.matchtype[vertex_b] = match_type;
    }
}

/// Dispatch to the configured matching strategy, then clean up any
/// remaining unmatched vertices into singleton orphan groups.
pub fn compute_matching(level: &mut Level, options: &Options, rng: &mut StdRng) {
    match options.matching_strategy {
        MatchingStrategy::Random => {
            matching_random(level, rng);
            matching_cleanup(level);
        }
        MatchingStrategy::Hem => {
            matching_hem(level);
            matching_cleanup(level);
        }
        MatchingStrategy::HemSr => {
            matching_hem(level);
            matching_sr(level, options);
            matching_cleanup(level);
        }
        MatchingStrategy::HemSrDeg => {
            matching_hem(level);
            matching_sr_deg(level, options);
            matching_cleanup(level);
        }
    }
}

/// Every still-unmatched vertex becomes its own singleton orphan group.
fn matching_cleanup(level: &mut Level) {
    let n = level.n();
    for k in 0..n {
        if !is_matched(level, k) {
            create_match(level, k, k, MatchType::Orphan);
        }
    }
}

/// Pair each unmatched vertex with the first unmatched neighbor found, in
/// a randomized vertex-visit order.
fn matching_random(level: &mut Level, rng: &mut StdRng) {
    let n = level.n();
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    for &k in &order {
        if is_matched(level, k) {
            continue;
        }
        let mut partner = None;
        for &nbr in level.csc.neighbors(k) {
            if !is_matched(level, nbr) {
                partner = Some(nbr);
                break;
            }
        }
        if let Some(nbr) = partner {
            create_match(level, k, nbr, MatchType::Standard);
        }
    }
}

/// Pair each unmatched vertex with its heaviest unmatched neighbor.
fn matching_hem(level: &mut Level) {
    let n = level.n();
    for k in 0..n {
        if is_matched(level, k) {
            continue;
        }
        let mut best: Option<usize> = None;
        let mut best_weight = -1.0f64;
        let neighbors = level.csc.neighbors(k);
        let weights = level.csc.edge_weights(k);
        for (idx, &nbr) in neighbors.iter().enumerate() {
            if is_matched(level, nbr) {
                continue;
            }
            let w = weights[idx];
            if w > best_weight {
                best_weight = w;
                best = Some(nbr);
            }
        }
        if let Some(nbr) = best {
            create_match(level, k, nbr, MatchType::Standard);
        }
    }
}

/// For each still-unmatched vertex (which, after HEM, has only matched
/// neighbors), pair up its heaviest matched neighbor's unmatched
/// neighbors two at a time ("brotherly"); fold a leftover single vertex
/// into a 3-way "community" match if enabled, else orphan it.
fn matching_sr(level: &mut Level, options: &Options) {
    let n = level.n();
    for k in 0..n {
        if is_matched(level, k) {
            continue;
        }

        let mut heaviest_neighbor = None;
        let mut heaviest_weight = -1.0f64;
        let neighbors = level.csc.neighbors(k);
        let weights = level.csc.edge_weights(k);
        for (idx, &nbr) in neighbors.iter().enumerate() {
            let w = weights[idx];
            if w > heaviest_weight {
                heaviest_weight = w;
                heaviest_neighbor = Some(nbr);
            }
        }

        if let Some(h) = heaviest_neighbor {
            pair_off_unmatched_neighbors(level, h, options);
        }
    }
}

/// Like `matching_sr`, but the passive-aggressive pass only triggers on
/// already-matched vertices whose degree exceeds `high_degree_threshold *
/// average degree`.
fn matching_sr_deg(level: &mut Level, options: &Options) {
    let n = level.n();
    let nz = level.csc.nz();
    let threshold = options.high_degree_threshold * (nz as f64 / n as f64);

    for k in 0..n {
        if !is_matched(level, k) {
            continue;
        }
        let degree = level.csc.neighbors(k).len();
        if (degree as f64) >= threshold {
            pair_off_unmatched_neighbors(level, k, options);
        }
    }
}

/// Walk `hub`'s neighbor list, pairing unmatched neighbors two at a time.
/// A single leftover is folded into a community match with `hub` if
/// enabled, else orphaned for the cleanup pass.
fn pair_off_unmatched_neighbors(level: &mut Level, hub: usize, options: &Options) {
    let unmatched: Vec<usize> = level
        .csc
        .neighbors(hub)
        .iter()
        .copied()
        .filter(|&nbr| !is_matched(level, nbr))
        .collect();

    let mut iter = unmatched.into_iter();
    let mut leftover = None;
    loop {
        match (iter.next(), leftover) {
            (Some(v), None) => leftover = Some(v),
            (Some(v), Some(u)) => {
                create_match(level, u, v, MatchType::Brotherly);
                leftover = None;
            }
            (None, Some(v)) => {
                if options.do_community_matching {
                    create_community_match(level, hub, v, MatchType::Community);
                } else {
                    create_match(level, v, v, MatchType::Orphan);
                }
                break;
            }
            (None, None) => break,
        }
    }
}
