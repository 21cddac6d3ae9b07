//! Generalized-Lloyd vector quantizer: trainer (C4) and decoder (C5).
//!
//! The assignment step is the hot loop — parallelized over rows with
//! `rayon`, the same way the teacher parallelizes per-block work with
//! `.par_iter()`/`.par_bridge()` over macroblocks.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::matrix::FeatureMatrix;
use crate::{Error, Result};

/// Trains a `K`-codeword dictionary on `x` by the generalized Lloyd
/// algorithm, for up to `t_max` iterations, seeded from `seed`.
///
/// `N = 0` (an empty `x`) is not an error: it returns an empty dictionary
/// and an empty index stream. `K = 0` is [`Error::ZeroK`]. `t_max = 0`
/// performs exactly one assignment pass against the seeded dictionary.
pub fn train(x: &FeatureMatrix, k: usize, t_max: usize, seed: u64) -> Result<(FeatureMatrix, Vec<u16>)> {
    if k == 0 {
        return Err(Error::ZeroK);
    }
    if x.is_empty() {
        return Ok((FeatureMatrix::empty(x.width()), Vec::new()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut dict = seed_dictionary(x, k, &mut rng);
    let mut indices = assign(x, &dict);

    for _ in 0..t_max {
        let new_dict = update(x, &dict, &indices);
        let new_indices = assign(x, &new_dict);
        let converged = new_indices == indices;
        dict = new_dict;
        indices = new_indices;
        if converged {
            break;
        }
    }

    Ok((dict, indices))
}

/// Gathers `dict[indices[i]]` into row `i` of the result.
///
/// Returns [`Error::IndexOutOfRange`] if any index is `>= dict.len()`.
pub fn decode(dict: &FeatureMatrix, indices: &[u16]) -> Result<FeatureMatrix> {
    let mut out = FeatureMatrix::new(indices.len(), dict.width());
    for (row, &idx) in out.iter_mut().zip(indices) {
        if idx as usize >= dict.len() {
            return Err(Error::IndexOutOfRange {
                index: idx,
                dict_len: dict.len(),
            });
        }
        row.copy_from_slice(&dict[idx as usize]);
    }
    Ok(out)
}

/// Picks `k` distinct rows of `x` uniformly at random as the initial
/// dictionary. If `x` has fewer than `k` rows, pads by duplicating its
/// last row so the dictionary always has exactly `k` rows.
fn seed_dictionary(x: &FeatureMatrix, k: usize, rng: &mut StdRng) -> FeatureMatrix {
    let width = x.width();
    let mut dict = FeatureMatrix::new(k, width);

    if x.len() >= k {
        let picks = rand::seq::index::sample(rng, x.len(), k);
        for (dst, src) in dict.iter_mut().zip(picks.iter()) {
            dst.copy_from_slice(&x[src]);
        }
    } else {
        for (i, dst) in dict.iter_mut().enumerate() {
            let src = i.min(x.len() - 1);
            dst.copy_from_slice(&x[src]);
        }
    }

    dict
}

/// Nearest-codeword assignment, parallelized over rows of `x` with
/// `rayon`'s `par_iter` — each row's search is independent of every
/// other's.
fn assign(x: &FeatureMatrix, dict: &FeatureMatrix) -> Vec<u16> {
    (0..x.len())
        .into_par_iter()
        .map(|i| nearest(&x[i], dict))
        .collect()
}

fn nearest(row: &[f32], dict: &FeatureMatrix) -> u16 {
    let mut best_idx = 0u16;
    let mut best_dist = dict.row_sq_dist(0, row);

    for k in 1..dict.len() {
        let d = dict.row_sq_dist(k, row);
        if d < best_dist {
            best_dist = d;
            best_idx = k as u16;
        }
    }

    best_idx
}

/// Recomputes each codeword as the mean of its assigned rows (reduced in
/// parallel over rows with `rayon`). Codewords with no assigned rows are
/// resolved by the splitting rule: the most-populated cluster's farthest
/// member (by squared distance from its own centroid) becomes every dead
/// codeword's new value, each nudged by a strictly increasing deterministic
/// epsilon so no two can ever coincide, even if the same cluster has to be
/// split many times over.
fn update(x: &FeatureMatrix, dict: &FeatureMatrix, indices: &[u16]) -> FeatureMatrix {
    let k = dict.len();
    let width = dict.width();

    let (sums, counts): (Vec<Vec<f32>>, Vec<u32>) = (0..x.len())
        .into_par_iter()
        .fold(
            || (vec![vec![0.0f32; width]; k], vec![0u32; k]),
            |mut acc, i| {
                let idx = indices[i] as usize;
                for (s, v) in acc.0[idx].iter_mut().zip(&x[i]) {
                    *s += v;
                }
                acc.1[idx] += 1;
                acc
            },
        )
        .reduce(
            || (vec![vec![0.0f32; width]; k], vec![0u32; k]),
            |mut a, b| {
                for (sa, sb) in a.0.iter_mut().zip(b.0) {
                    for (s, v) in sa.iter_mut().zip(sb) {
                        *s += v;
                    }
                }
                for (ca, cb) in a.1.iter_mut().zip(b.1) {
                    *ca += cb;
                }
                a
            },
        );

    let mut new_dict = FeatureMatrix::new(k, width);
    for (i, dst) in new_dict.iter_mut().enumerate() {
        if counts[i] > 0 {
            let n = counts[i] as f32;
            for (d, s) in dst.iter_mut().zip(&sums[i]) {
                *d = s / n;
            }
        }
    }

    // Resolve dead codewords by splitting the most-populated cluster. Its
    // membership is fixed for the whole update (counts don't change until
    // the next assignment pass), so every dead codeword is a new entry
    // derived from the same source's farthest member — each one nudged by
    // a strictly larger deterministic epsilon (scaled by a running split
    // count), guaranteeing no two codewords coincide even when a single
    // source must be split many times over (e.g. N=1 against K=256).
    let mut claimed: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &idx) in indices.iter().enumerate() {
        claimed[idx as usize].push(i);
    }
    let live: Vec<usize> = (0..k).filter(|&c| counts[c] > 0).collect();

    if let Some(&source) = live.iter().max_by_key(|&&c| counts[c]) {
        let farthest_row = claimed[source]
            .iter()
            .copied()
            .max_by(|&a, &b| {
                new_dict
                    .row_sq_dist(source, &x[a])
                    .partial_cmp(&new_dict.row_sq_dist(source, &x[b]))
                    .unwrap()
            })
            .expect("most-populated cluster is non-empty");

        let spread: f32 = x[farthest_row]
            .iter()
            .zip(&new_dict[source])
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>()
            .max(1e-6);

        let mut split_count: u32 = 0;
        for dead in 0..k {
            if counts[dead] > 0 {
                continue;
            }
            let scale = 1e-3 * (split_count as f32 + 1.0);
            let mut split_row = x[farthest_row].to_vec();
            for v in split_row.iter_mut() {
                *v += scale * spread;
            }
            new_dict[dead].copy_from_slice(&split_row);
            split_count += 1;
        }
    }

    new_dict
}
