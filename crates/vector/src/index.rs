use navigator_common::{NavigatorError, Result};
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::similarity::normalize;

/// One query hit: record position and cosine distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub position: usize,
    /// `1 - cosine similarity`, in `[0, 2]`
    pub distance: f32,
}

/// Exact cosine-distance index over one embedding per record
///
/// Row `i` belongs to record `i`. Rows are L2-normalised at build time, so a
/// query is a single matrix-vector product.
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    vectors: Array2<f32>,
}

impl RetrievalIndex {
    /// Build an index from the ordered embeddings
    pub fn build(embeddings: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = embeddings.first() else {
            return Ok(Self {
                vectors: Array2::zeros((0, 0)),
            });
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(NavigatorError::embedding("embeddings have zero dimension"));
        }

        let mut flat = Vec::with_capacity(embeddings.len() * dimension);
        for (position, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(NavigatorError::embedding(format!(
                    "embedding {} has dimension {}, expected {}",
                    position,
                    embedding.len(),
                    dimension
                )));
            }
            flat.extend(normalize(embedding));
        }

        let vectors = Array2::from_shape_vec((embeddings.len(), dimension), flat)
            .map_err(|e| NavigatorError::internal(format!("failed to shape index matrix: {}", e)))?;

        Ok(Self { vectors })
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension (0 for an empty index)
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// The `k` nearest records, ascending by distance
    ///
    /// Equal distances keep record order. `k` is clamped to the record count
    /// and an empty index yields no neighbors.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        if vector.len() != self.dimension() {
            return Err(NavigatorError::invalid_input(format!(
                "query has dimension {}, index expects {}",
                vector.len(),
                self.dimension()
            )));
        }

        let query = Array1::from(normalize(vector));
        let similarities = self.vectors.dot(&query);

        let mut neighbors: Vec<Neighbor> = similarities
            .iter()
            .enumerate()
            .map(|(position, &similarity)| Neighbor {
                position,
                distance: (1.0 - similarity).clamp(0.0, 2.0),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
