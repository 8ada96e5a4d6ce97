//! Ward-linkage agglomerative clustering.
//!
//! Produces the conventional linkage matrix: merge `k` creates cluster id
//! `n + k` from `left` and `right` (`left < right`), at `distance`, holding
//! `size` original points. Distances are Ward distances derived from the
//! Euclidean distances between input vectors via Lance–Williams updates.

use serde::Serialize;

use crate::clustering::ClusterError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Linkage {
    n_leaves: usize,
    merges: Vec<Merge>,
}

/// Clusters `points` bottom-up with Ward's minimum variance criterion.
///
/// Needs at least two points of the same, non-zero dimension. Ties are broken
/// by the lowest `(i, j)` slot pair, so identical input always produces an
/// identical matrix.
pub fn ward_linkage(points: &[Vec<f32>]) -> Result<Linkage, ClusterError> {
    let n = points.len();
    if n < 2 {
        return Err(ClusterError::TooFewPoints(n));
    }
    let dim = points[0].len();
    if dim == 0 {
        return Err(ClusterError::EmptyVector);
    }
    for (index, point) in points.iter().enumerate() {
        if point.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                index,
                expected: dim,
                found: point.len(),
            });
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(ClusterError::NonFinite(index));
        }
    }

    let mut dist = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&points[i], &points[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    // Slot i holds cluster `ids[i]` of `sizes[i]` points while `active[i]`.
    let mut ids: Vec<usize> = (0..n).collect();
    let mut sizes = vec![1_usize; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                if best.map_or(true, |(_, _, d)| dist[i][j] < d) {
                    best = Some((i, j, dist[i][j]));
                }
            }
        }
        let Some((i, j, d_ij)) = best else {
            break;
        };

        let (n_i, n_j) = (sizes[i] as f64, sizes[j] as f64);
        for k in (0..n).filter(|&k| active[k] && k != i && k != j) {
            let n_k = sizes[k] as f64;
            let total = n_i + n_j + n_k;
            let squared = ((n_i + n_k) * dist[i][k].powi(2) + (n_j + n_k) * dist[j][k].powi(2)
                - n_k * d_ij.powi(2))
                / total;
            let updated = squared.max(0.0).sqrt();
            dist[i][k] = updated;
            dist[k][i] = updated;
        }

        merges.push(Merge {
            left: ids[i].min(ids[j]),
            right: ids[i].max(ids[j]),
            distance: d_ij,
            size: sizes[i] + sizes[j],
        });

        ids[i] = n + step;
        sizes[i] += sizes[j];
        active[j] = false;
    }

    Ok(Linkage { n_leaves: n, merges })
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

impl Linkage {
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Rows of `[left, right, distance, size]`, the shape dendrogram renderers expect.
    pub fn to_matrix(&self) -> Vec<[f64; 4]> {
        self.merges
            .iter()
            .map(|m| [m.left as f64, m.right as f64, m.distance, m.size as f64])
            .collect()
    }

    pub fn max_distance(&self) -> f64 {
        self.merges.iter().map(|m| m.distance).fold(0.0, f64::max)
    }

    /// Default coloring cut: 70% of the highest merge.
    pub fn color_threshold(&self) -> f64 {
        0.7 * self.max_distance()
    }

    /// Leaves left to right as a dendrogram draws them (left child first).
    pub fn leaf_order(&self) -> Vec<usize> {
        let n = self.n_leaves;
        let Some(root) = self.merges.len().checked_sub(1).map(|k| n + k) else {
            return (0..n).collect();
        };

        let mut order = Vec::with_capacity(n);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node < n {
                order.push(node);
            } else {
                let merge = &self.merges[node - n];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }

    /// Flat cluster label per leaf after cutting every merge above `threshold`.
    /// Labels are numbered in leaf order, starting at 0.
    pub fn flat_clusters(&self, threshold: f64) -> Vec<usize> {
        let n = self.n_leaves;
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();

        for (k, merge) in self.merges.iter().enumerate() {
            if merge.distance <= threshold {
                parent[merge.left] = n + k;
                parent[merge.right] = n + k;
            }
        }

        let root_of = |mut node: usize| {
            while parent[node] != node {
                node = parent[node];
            }
            node
        };

        let mut labels = vec![usize::MAX; n];
        let mut roots: Vec<usize> = Vec::new();
        for leaf in self.leaf_order() {
            let root = root_of(leaf);
            let label = match roots.iter().position(|&r| r == root) {
                Some(label) => label,
                None => {
                    roots.push(root);
                    roots.len() - 1
                }
            };
            labels[leaf] = label;
        }
        labels
    }
}
