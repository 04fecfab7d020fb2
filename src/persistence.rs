//! Diagram persistence gateway.
//!
//! This file implements the save/load/list contract over topology
//! documents. The core only produces and consumes documents; everything
//! about file naming and directory layout lives here, behind the
//! gateway trait, so embedders can substitute their own storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::document::TopologyDocument;

/// Errors raised by diagram storage.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("diagram storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("diagram file is not a valid topology document: {0}")]
    Format(#[from] serde_json::Error),
    #[error("no diagram named '{0}'")]
    NotFound(String),
}

/// Listing metadata for one stored diagram.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramSummary {
    pub filename: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub node_count: usize,
    pub connection_count: usize,
}

/// Storage contract for topology documents.
pub trait PersistenceGateway {
    fn save(&self, name: &str, document: &TopologyDocument) -> Result<(), GatewayError>;
    fn load(&self, name: &str) -> Result<TopologyDocument, GatewayError>;
    fn list(&self) -> Result<Vec<DiagramSummary>, GatewayError>;
}

/// Reduce a user-supplied diagram name to a safe file stem.
///
/// Keeps alphanumerics, dashes and underscores; everything else maps to
/// an underscore. A trailing `.json` is tolerated and stripped.
pub fn sanitize_name(name: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "diagram".to_string()
    } else {
        cleaned
    }
}

/// Gateway storing each diagram as a pretty-printed JSON file in one
/// directory.
#[derive(Debug)]
pub struct DiskGateway {
    dir: PathBuf,
}

impl DiskGateway {
    /// Open a gateway over `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(DiskGateway { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(name)))
    }
}

impl PersistenceGateway for DiskGateway {
    fn save(&self, name: &str, document: &TopologyDocument) -> Result<(), GatewayError> {
        let json = serde_json::to_string_pretty(document)?;
        fs::write(self.path_for(name), json)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<TopologyDocument, GatewayError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(GatewayError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn list(&self) -> Result<Vec<DiagramSummary>, GatewayError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let contents = fs::read_to_string(&path)?;
            let document: TopologyDocument = match serde_json::from_str(&contents) {
                Ok(document) => document,
                Err(err) => {
                    log::warn!(
                        "skipping '{}' in diagram listing: {}",
                        path.display(),
                        err
                    );
                    continue;
                }
            };

            let metadata = entry.metadata()?;
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| document.timestamp);

            summaries.push(DiagramSummary {
                filename: path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size: metadata.len(),
                created,
                node_count: document.nodes.len(),
                connection_count: document.connections.len(),
            });
        }
        summaries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(summaries)
    }
}
