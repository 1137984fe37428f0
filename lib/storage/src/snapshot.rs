// Snapshot persistence for the retrieval index
//
// Layout of a snapshot directory:
//   manifest.json            blob names, sizes and sha256 checksums
//   tfidf_vectorizer.bin     vocabulary, idf weights and tokenizer settings
//   tfidf_matrix.bin         document x vocabulary term weights
//   nearest_neighbors.bin    neighbor search structure
//   doc_identifiers.bin      row -> product identifier
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use nutriscan_core::{NeighborIndex, RetrievalIndex, TermWeightMatrix, TfIdfVectorizer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const VECTORIZER_BLOB: &str = "tfidf_vectorizer";
pub const MATRIX_BLOB: &str = "tfidf_matrix";
pub const NEIGHBORS_BLOB: &str = "nearest_neighbors";
pub const IDENTIFIERS_BLOB: &str = "doc_identifiers";

/// Fixed set of blob names a snapshot consists of
pub const BLOB_NAMES: [&str; 4] = [VECTORIZER_BLOB, MATRIX_BLOB, NEIGHBORS_BLOB, IDENTIFIERS_BLOB];

const MANIFEST_FILE: &str = "manifest.json";
const SNAPSHOT_VERSION: u32 = 1;

/// Integrity problems found while rehydrating a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot blob missing: {0}")]
    MissingBlob(String),

    #[error("Checksum mismatch for blob {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Snapshot parts out of step: {0}")]
    LengthMismatch(String),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    pub file: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub version: u32,
    pub created_at: u64,
    pub documents: usize,
    pub blobs: BTreeMap<String, BlobEntry>,
}

/// Saves and loads retrieval index snapshots in a directory
pub struct IndexSnapshotStore {
    dir: PathBuf,
}

impl IndexSnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when a manifest has been written to this directory
    pub fn exists(&self) -> bool {
        self.dir.join(MANIFEST_FILE).exists()
    }

    /// Persist every part of the index, then the manifest describing them.
    pub fn save(&self, index: &RetrievalIndex) -> Result<SnapshotManifest> {
        let mut blobs = BTreeMap::new();
        blobs.insert(VECTORIZER_BLOB.to_string(), self.write_blob(VECTORIZER_BLOB, index.vectorizer())?);
        blobs.insert(MATRIX_BLOB.to_string(), self.write_blob(MATRIX_BLOB, index.matrix())?);
        blobs.insert(NEIGHBORS_BLOB.to_string(), self.write_blob(NEIGHBORS_BLOB, index.neighbors())?);
        blobs.insert(IDENTIFIERS_BLOB.to_string(), self.write_blob(IDENTIFIERS_BLOB, index.identifiers())?);

        let manifest = SnapshotManifest {
            version: SNAPSHOT_VERSION,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs(),
            documents: index.len(),
            blobs,
        };

        let data = serde_json::to_vec_pretty(&manifest)?;
        write_atomic(&self.dir.join(MANIFEST_FILE), &data)?;

        info!(dir = ?self.dir, documents = manifest.documents, "index snapshot saved");
        Ok(manifest)
    }

    /// Load and verify a snapshot. Returns `Ok(None)` when none was saved.
    pub fn load(&self) -> Result<Option<RetrievalIndex>> {
        let manifest_path = self.dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Ok(None);
        }

        let manifest: SnapshotManifest = serde_json::from_slice(&fs::read(&manifest_path)?)
            .with_context(|| format!("Invalid snapshot manifest {:?}", manifest_path))?;
        if manifest.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(manifest.version).into());
        }

        let vectorizer: TfIdfVectorizer = self.read_blob(&manifest, VECTORIZER_BLOB)?;
        let matrix: TermWeightMatrix = self.read_blob(&manifest, MATRIX_BLOB)?;
        let neighbors: NeighborIndex = self.read_blob(&manifest, NEIGHBORS_BLOB)?;
        let identifiers: Vec<String> = self.read_blob(&manifest, IDENTIFIERS_BLOB)?;

        if identifiers.len() != manifest.documents
            || matrix.n_rows() != identifiers.len()
            || neighbors.len() != identifiers.len()
        {
            return Err(SnapshotError::LengthMismatch(format!(
                "manifest {} documents, matrix {} rows, neighbors {} rows, {} identifiers",
                manifest.documents,
                matrix.n_rows(),
                neighbors.len(),
                identifiers.len()
            ))
            .into());
        }

        let index = RetrievalIndex::from_parts(vectorizer, matrix, neighbors, identifiers)
            .map_err(|e| SnapshotError::LengthMismatch(e.to_string()))?;

        info!(dir = ?self.dir, documents = index.len(), "index snapshot loaded");
        Ok(Some(index))
    }

    fn write_blob<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<BlobEntry> {
        let data = bincode::serialize(value).map_err(|e| anyhow!("Serialization error: {}", e))?;
        let file = format!("{}.bin", name);
        write_atomic(&self.dir.join(&file), &data)?;
        Ok(BlobEntry {
            file,
            size: data.len() as u64,
            sha256: format!("{:x}", Sha256::digest(&data)),
        })
    }

    fn read_blob<T: DeserializeOwned>(&self, manifest: &SnapshotManifest, name: &str) -> Result<T> {
        let entry = manifest
            .blobs
            .get(name)
            .ok_or_else(|| SnapshotError::MissingBlob(name.to_string()))?;
        let path = self.dir.join(&entry.file);
        if !path.exists() {
            return Err(SnapshotError::MissingBlob(name.to_string()).into());
        }

        let data = fs::read(&path)?;
        let actual = format!("{:x}", Sha256::digest(&data));
        if actual != entry.sha256 {
            return Err(SnapshotError::ChecksumMismatch {
                name: name.to_string(),
                expected: entry.sha256.clone(),
                actual,
            }
            .into());
        }

        bincode::deserialize(&data).map_err(|e| anyhow!("Deserialization error in blob {}: {}", name, e))
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(data))
        .with_context(|| format!("Failed to write {:?}", path))
}
