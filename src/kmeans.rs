//! Seeded k-means (k-means++ init, Lloyd iteration). Identical input
//! matrix + identical seed ⇒ identical assignment; numeric label identity
//! carries no meaning across fits.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub k: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl KMeansParams {
    pub fn with_k(k: usize, seed: u64) -> Self {
        Self { k, max_iter: 100, tol: 1e-6, seed }
    }
}

/// Fit artifact returned alongside the labels. Process-scoped value, never
/// global state; callers persist or discard it.
#[derive(Debug, Clone, Serialize)]
pub struct KMeansModel {
    pub centroids: Vec<Vec<f64>>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
}

/// Number of distinct rows in the input matrix, compared by exact bit
/// pattern.
pub fn distinct_rows(rows: &[Vec<f64>]) -> usize {
    let mut seen = std::collections::HashSet::new();
    for row in rows {
        let mut bytes = Vec::with_capacity(row.len() * 8);
        for v in row {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        seen.insert(xxh3_64(&bytes));
    }
    seen.len()
}

fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn plus_plus_init(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rows[rng.gen_range(0..rows.len())].clone());

    let mut min_d2 = vec![f64::MAX; rows.len()];
    while centroids.len() < k {
        let last = centroids.last().unwrap();
        for (i, row) in rows.iter().enumerate() {
            let d = dist_sq(row, last);
            if d < min_d2[i] {
                min_d2[i] = d;
            }
        }
        let total: f64 = min_d2.iter().sum();
        let next = if total > 0.0 {
            // weighted draw proportional to squared distance; zero-weight
            // rows (already a centroid) are never drawn
            let mut r = rng.gen::<f64>() * total;
            let mut chosen = rows.len() - 1;
            for (i, &d) in min_d2.iter().enumerate() {
                if d > 0.0 {
                    r -= d;
                    chosen = i;
                    if r <= 0.0 {
                        break;
                    }
                }
            }
            chosen
        } else {
            // remaining mass is zero: duplicate-free pick is impossible,
            // fall back to an arbitrary row
            rng.gen_range(0..rows.len())
        };
        centroids.push(rows[next].clone());
    }
    centroids
}

/// Fit `k` clusters over `rows` and return the model plus one label per
/// row. Fails (never clamps) when the matrix holds fewer distinct rows
/// than `k`.
pub fn fit(rows: &[Vec<f64>], params: &KMeansParams) -> Result<(KMeansModel, Vec<usize>)> {
    if params.k == 0 {
        bail!("k must be > 0");
    }
    if rows.is_empty() {
        bail!("cannot fit {} clusters on an empty matrix", params.k);
    }
    let distinct = distinct_rows(rows);
    if distinct < params.k {
        bail!(
            "insufficient data: requested k={} clusters but the corpus has only {} distinct rows ({} total)",
            params.k,
            distinct,
            rows.len()
        );
    }

    let dim = rows[0].len();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut centroids = plus_plus_init(rows, params.k, &mut rng);
    let mut labels = vec![0usize; rows.len()];
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..params.max_iter {
        iterations = iter + 1;

        for (i, row) in rows.iter().enumerate() {
            let mut best = 0usize;
            let mut best_d = f64::MAX;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = dist_sq(row, centroid);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
            labels[i] = best;
        }

        // recompute centroids; an emptied cluster is reseeded with the row
        // farthest from its current assignment
        let mut sums = vec![vec![0.0f64; dim]; params.k];
        let mut counts = vec![0usize; params.k];
        for (row, &c) in rows.iter().zip(&labels) {
            counts[c] += 1;
            for (s, v) in sums[c].iter_mut().zip(row) {
                *s += v;
            }
        }
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(params.k);
        for (c, (mut sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count > 0 {
                for s in sum.iter_mut() {
                    *s /= count as f64;
                }
                next.push(sum);
            } else {
                let far = (0..rows.len())
                    .max_by(|&a, &b| {
                        let da = dist_sq(&rows[a], &centroids[labels[a]]);
                        let db = dist_sq(&rows[b], &centroids[labels[b]]);
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(0);
                debug!("k-means reseeding empty cluster {} from row {}", c, far);
                next.push(rows[far].clone());
            }
        }

        let movement = centroids
            .iter()
            .zip(&next)
            .map(|(a, b)| dist_sq(a, b).sqrt())
            .fold(0.0f64, f64::max);
        centroids = next;

        if movement < params.tol {
            converged = true;
            break;
        }
    }

    // final assignment against the settled centroids
    for (i, row) in rows.iter().enumerate() {
        let mut best = 0usize;
        let mut best_d = f64::MAX;
        for (c, centroid) in centroids.iter().enumerate() {
            let d = dist_sq(row, centroid);
            if d < best_d {
                best_d = d;
                best = c;
            }
        }
        labels[i] = best;
    }

    let inertia = rows
        .iter()
        .zip(&labels)
        .map(|(row, &c)| dist_sq(row, &centroids[c]))
        .sum();

    debug!(
        "k-means fit - k={}, rows={}, iterations={}, converged={}, inertia={:.4}",
        params.k,
        rows.len(),
        iterations,
        converged,
        inertia
    );

    Ok((
        KMeansModel { centroids, iterations, converged, inertia },
        labels,
    ))
}
