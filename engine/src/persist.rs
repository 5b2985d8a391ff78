use crate::index::Index;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub doc_count: usize,
    pub term_count: usize,
    pub created_at: String,
    pub version: u32,
}

pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf {
        self.root.join("index.bin")
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }

    pub fn exists(&self) -> bool {
        self.index().is_file()
    }
}

/// Write the index body as bincode plus a small JSON sidecar with the counts
/// a caller can inspect without deserializing the whole snapshot.
pub fn save_index(paths: &SnapshotPaths, index: &Index) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;

    let meta = SnapshotMeta {
        doc_count: index.document_count(),
        term_count: index.term_count(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: SNAPSHOT_VERSION,
    };
    let mut mf = File::create(paths.meta())?;
    mf.write_all(serde_json::to_string_pretty(&meta)?.as_bytes())?;
    tracing::info!(bytes = bytes.len(), root = %paths.root.display(), "index snapshot written");
    Ok(())
}

pub fn load_index(paths: &SnapshotPaths) -> Result<Index> {
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = bincode::deserialize(&buf)?;
    Ok(index)
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<SnapshotMeta> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: SnapshotMeta = serde_json::from_str(&buf)?;
    Ok(meta)
}
