//! Clustering Engine: embeds distinct skill names and builds a Ward dendrogram.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub mod embeddings;
pub mod linkage;

pub use embeddings::{EmbedError, Embedder};
pub use linkage::{ward_linkage, Linkage, Merge};

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("need at least two points to cluster, got {0}")]
    TooFewPoints(usize),

    #[error("embedding vectors are empty")]
    EmptyVector,

    #[error("vector {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("vector {0} contains a non-finite value")]
    NonFinite(usize),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),
}

/// Result of clustering a skill selection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum SkillDendrogram {
    /// Fewer than two distinct skills; nothing to cluster.
    #[serde(rename = "insufficient_data")]
    Insufficient { labels: Vec<String> },
    #[serde(rename = "ok")]
    Tree(ClusterTree),
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterTree {
    pub embedding_model: String,
    /// Leaf `i` of the linkage is `labels[i]`.
    pub labels: Vec<String>,
    pub linkage: Vec<[f64; 4]>,
    pub leaf_order: Vec<usize>,
    /// Labels as they appear left to right under the dendrogram.
    pub ordered_labels: Vec<String>,
    pub color_threshold: f64,
    /// Flat cluster per label at `color_threshold`.
    pub clusters: Vec<usize>,
}

impl ClusterTree {
    pub fn from_linkage(embedding_model: &str, labels: Vec<String>, linkage: &Linkage) -> Self {
        let leaf_order = linkage.leaf_order();
        let ordered_labels = leaf_order.iter().map(|&i| labels[i].clone()).collect();
        let color_threshold = linkage.color_threshold();
        Self {
            embedding_model: embedding_model.to_string(),
            clusters: linkage.flat_clusters(color_threshold),
            linkage: linkage.to_matrix(),
            labels,
            leaf_order,
            ordered_labels,
            color_threshold,
        }
    }
}

/// Embeds `labels` in one batch and clusters them.
///
/// Labels are deduplicated and sorted first so the tree depends only on the
/// label set. Fewer than two labels short-circuits without calling the embedder.
pub async fn build_dendrogram(
    embedder: &dyn Embedder,
    labels: Vec<String>,
) -> Result<SkillDendrogram, ClusterError> {
    let mut labels = labels;
    labels.sort();
    labels.dedup();

    if labels.len() < 2 {
        info!("Only {} distinct skill(s), skipping clustering", labels.len());
        return Ok(SkillDendrogram::Insufficient { labels });
    }

    let vectors = embedder.embed(&labels).await?;
    if vectors.len() != labels.len() {
        return Err(EmbedError::CountMismatch {
            expected: labels.len(),
            got: vectors.len(),
        }
        .into());
    }

    let linkage = ward_linkage(&vectors)?;
    info!(
        "Clustered {} skills (max merge distance {:.3})",
        labels.len(),
        linkage.max_distance()
    );
    Ok(SkillDendrogram::Tree(ClusterTree::from_linkage(
        embedder.model_name(),
        labels,
        &linkage,
    )))
}
