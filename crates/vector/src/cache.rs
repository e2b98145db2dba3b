//! Persisted embedding cache
//!
//! Two artifacts live in the cache directory: `embeddings.bin`, the
//! row-major little-endian f32 matrix, and `cache_manifest.json`, which
//! records the dataset fingerprint, the dimension and a checksum of the
//! matrix. Both are replaced atomically, matrix first, so an interrupted
//! write shows up as a checksum mismatch rather than a valid-looking cache.

use chrono::{DateTime, Utc};
use navigator_common::fsutil::{remove_if_exists, write_atomic};
use navigator_common::{CachePaths, NavigatorError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Identity of the dataset an embedding matrix was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Number of records
    pub row_count: usize,

    /// sha256 over the model id and every record's embedding text
    pub content_hash: String,

    /// Embedding model identifier
    pub model: String,
}

impl Fingerprint {
    pub fn compute(model: &str, texts: &[String]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((model.len() as u64).to_le_bytes());
        hasher.update(model.as_bytes());
        for text in texts {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }

        Self {
            row_count: texts.len(),
            content_hash: hex::encode(hasher.finalize()),
            model: model.to_string(),
        }
    }

    /// Human-readable reason why `self` (persisted) does not match `current`
    pub fn mismatch(&self, current: &Fingerprint) -> Option<String> {
        if self.model != current.model {
            Some(format!("model changed ({} -> {})", self.model, current.model))
        } else if self.row_count != current.row_count {
            Some(format!(
                "row count changed ({} -> {})",
                self.row_count, current.row_count
            ))
        } else if self.content_hash != current.content_hash {
            Some("record content changed".to_string())
        } else {
            None
        }
    }
}

/// Contents of `cache_manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub fingerprint: Fingerprint,
    pub dimension: usize,
    pub embeddings_sha256: String,
    pub created_at: DateTime<Utc>,
}

impl CacheManifest {
    /// Current manifest format version
    pub const CURRENT_VERSION: u32 = 1;
}

/// Embeddings plus the fingerprint they were computed for
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub dimension: usize,
    pub embeddings: Vec<Vec<f32>>,
}

fn encode_matrix(embeddings: &[Vec<f32>]) -> Vec<u8> {
    embeddings
        .iter()
        .flat_map(|row| row.iter().flat_map(|f| f.to_le_bytes()))
        .collect()
}

fn decode_matrix(bytes: &[u8], dimension: usize) -> Vec<Vec<f32>> {
    if dimension == 0 {
        return Vec::new();
    }

    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    values.chunks(dimension).map(<[f32]>::to_vec).collect()
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reads and writes the two cache artifacts
#[derive(Debug, Clone)]
pub struct CacheStore {
    paths: CachePaths,
}

impl CacheStore {
    pub fn new(paths: CachePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Whether either artifact is present
    pub fn exists(&self) -> bool {
        self.paths.embeddings.exists() || self.paths.manifest.exists()
    }

    /// Read the persisted cache
    ///
    /// `Ok(None)` when neither file exists. Any inconsistency between the
    /// files, or a file that cannot be read or parsed, is a
    /// `CacheCorruption` error.
    pub fn load(&self) -> Result<Option<CacheEntry>> {
        let has_manifest = self.paths.manifest.exists();
        let has_embeddings = self.paths.embeddings.exists();

        if !has_manifest && !has_embeddings {
            return Ok(None);
        }
        if !has_manifest {
            return Err(NavigatorError::cache_corruption("manifest missing"));
        }
        if !has_embeddings {
            return Err(NavigatorError::cache_corruption("embedding matrix missing"));
        }

        let manifest_json = std::fs::read_to_string(&self.paths.manifest)
            .map_err(|e| NavigatorError::cache_corruption(format!("unreadable manifest: {}", e)))?;
        let manifest: CacheManifest = serde_json::from_str(&manifest_json)
            .map_err(|e| NavigatorError::cache_corruption(format!("unparseable manifest: {}", e)))?;

        if manifest.version > CacheManifest::CURRENT_VERSION {
            return Err(NavigatorError::cache_corruption(format!(
                "manifest version {} is newer than supported version {}",
                manifest.version,
                CacheManifest::CURRENT_VERSION
            )));
        }

        let bytes = std::fs::read(&self.paths.embeddings).map_err(|e| {
            NavigatorError::cache_corruption(format!("unreadable embedding matrix: {}", e))
        })?;

        let rows = manifest.fingerprint.row_count;
        let expected_len = rows
            .checked_mul(manifest.dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| NavigatorError::cache_corruption("manifest dimensions overflow"))?;

        if bytes.len() != expected_len {
            return Err(NavigatorError::cache_corruption(format!(
                "embedding matrix is {} bytes, expected {} ({} rows x {} dims)",
                bytes.len(),
                expected_len,
                rows,
                manifest.dimension
            )));
        }
        if rows > 0 && manifest.dimension == 0 {
            return Err(NavigatorError::cache_corruption("zero embedding dimension"));
        }

        let checksum = sha256_hex(&bytes);
        if checksum != manifest.embeddings_sha256 {
            return Err(NavigatorError::cache_corruption(
                "embedding matrix checksum does not match manifest",
            ));
        }

        debug!(
            "Loaded embedding cache: {} rows x {} dims",
            rows, manifest.dimension
        );

        Ok(Some(CacheEntry {
            fingerprint: manifest.fingerprint,
            dimension: manifest.dimension,
            embeddings: decode_matrix(&bytes, manifest.dimension),
        }))
    }

    /// Write both artifacts atomically
    pub fn persist(&self, entry: &CacheEntry) -> Result<()> {
        if entry.embeddings.len() != entry.fingerprint.row_count {
            return Err(NavigatorError::internal(format!(
                "cache entry has {} embeddings for {} rows",
                entry.embeddings.len(),
                entry.fingerprint.row_count
            )));
        }
        if let Some(bad) = entry.embeddings.iter().position(|e| e.len() != entry.dimension) {
            return Err(NavigatorError::internal(format!(
                "embedding {} does not have dimension {}",
                bad, entry.dimension
            )));
        }

        let bytes = encode_matrix(&entry.embeddings);
        let manifest = CacheManifest {
            version: CacheManifest::CURRENT_VERSION,
            fingerprint: entry.fingerprint.clone(),
            dimension: entry.dimension,
            embeddings_sha256: sha256_hex(&bytes),
            created_at: Utc::now(),
        };

        write_atomic(&self.paths.embeddings, &bytes)?;
        write_atomic(
            &self.paths.manifest,
            serde_json::to_string_pretty(&manifest)?.as_bytes(),
        )?;

        info!(
            "Persisted embedding cache: {} rows x {} dims",
            entry.fingerprint.row_count, entry.dimension
        );
        Ok(())
    }

    /// Delete both artifacts
    pub fn clear(&self) -> Result<()> {
        let removed_manifest = remove_if_exists(&self.paths.manifest)?;
        let removed_embeddings = remove_if_exists(&self.paths.embeddings)?;
        if removed_manifest || removed_embeddings {
            info!("Removed persisted embedding cache");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry {
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        CacheEntry {
            fingerprint: Fingerprint::compute("test-model", &texts),
            dimension: 3,
            embeddings: vec![vec![0.1, -2.5, 3.0e-7], vec![f32::MIN_POSITIVE, 1.0, 0.333_333_34]],
        }
    }

    fn store(dir: &std::path::Path) -> CacheStore {
        CacheStore::new(CachePaths::in_dir(dir))
    }

    #[test]
    fn test_persist_load_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        let original = entry();

        cache.persist(&original).unwrap();
        let loaded = cache.load().unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).load().unwrap().is_none());
    }

    #[test]
    fn test_truncated_matrix_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        cache.persist(&entry()).unwrap();

        let bytes = std::fs::read(&cache.paths().embeddings).unwrap();
        std::fs::write(&cache.paths().embeddings, &bytes[..bytes.len() - 5]).unwrap();

        let err = cache.load().unwrap_err();
        assert!(matches!(err, NavigatorError::CacheCorruption(_)));
    }

    #[test]
    fn test_flipped_byte_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        cache.persist(&entry()).unwrap();

        let mut bytes = std::fs::read(&cache.paths().embeddings).unwrap();
        bytes[0] ^= 0xff;
        std::fs::write(&cache.paths().embeddings, &bytes).unwrap();

        assert!(matches!(cache.load(), Err(NavigatorError::CacheCorruption(_))));
    }

    #[test]
    fn test_garbage_manifest_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        cache.persist(&entry()).unwrap();
        std::fs::write(&cache.paths().manifest, "{not json").unwrap();

        assert!(matches!(cache.load(), Err(NavigatorError::CacheCorruption(_))));
    }

    #[test]
    fn test_half_missing_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        cache.persist(&entry()).unwrap();
        std::fs::remove_file(&cache.paths().manifest).unwrap();

        assert!(matches!(cache.load(), Err(NavigatorError::CacheCorruption(_))));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        cache.persist(&entry()).unwrap();
        assert!(cache.exists());

        cache.clear().unwrap();
        assert!(!cache.exists());
        cache.clear().unwrap();
    }

    #[test]
    fn test_empty_entry_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = store(dir.path());
        let empty = CacheEntry {
            fingerprint: Fingerprint::compute("test-model", &[]),
            dimension: 0,
            embeddings: Vec::new(),
        };

        cache.persist(&empty).unwrap();
        assert_eq!(cache.load().unwrap().unwrap(), empty);
    }

    #[test]
    fn test_fingerprint_sensitivity() {
        let a = Fingerprint::compute("m", &["x".to_string(), "y".to_string()]);
        let b = Fingerprint::compute("m", &["x".to_string()]);
        let c = Fingerprint::compute("m", &["x".to_string(), "z".to_string()]);
        let d = Fingerprint::compute("other", &["x".to_string(), "y".to_string()]);
        // Concatenation boundaries matter
        let e = Fingerprint::compute("m", &["xy".to_string(), String::new()]);

        assert!(a.mismatch(&a.clone()).is_none());
        assert!(a.mismatch(&b).unwrap().contains("row count"));
        assert_eq!(a.mismatch(&c).unwrap(), "record content changed");
        assert!(a.mismatch(&d).unwrap().contains("model"));
        assert_ne!(a.content_hash, e.content_hash);
    }
}
