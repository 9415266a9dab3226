//! Hands finished artifacts to the host save facility.
//!
//! The core never manages a filesystem layout of its own: callers pass an
//! in-memory buffer plus a suggested file name and the exporter decides where
//! it lands.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::telemetry::events::record_artifact_exported;

const FALLBACK_FILE_NAME: &str = "artifact";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("suggested file name is empty")]
    EmptyFileName,
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where an exported artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub file_name: String,
    pub location: Option<PathBuf>,
    pub bytes_written: usize,
}

#[async_trait]
pub trait ArtifactExporter: Send + Sync {
    async fn export(
        &self,
        contents: Bytes,
        suggested_file_name: &str,
    ) -> Result<ExportReceipt, ExportError>;
}

/// Saves artifacts into a single directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    root: PathBuf,
}

impl DirectoryExporter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactExporter for DirectoryExporter {
    async fn export(
        &self,
        contents: Bytes,
        suggested_file_name: &str,
    ) -> Result<ExportReceipt, ExportError> {
        if suggested_file_name.trim().is_empty() {
            return Err(ExportError::EmptyFileName);
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ExportError::Io {
                path: self.root.clone(),
                source,
            })?;

        let file_name = sanitize_file_name(suggested_file_name);
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, &contents)
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            target: "exporter",
            path = %path.display(),
            bytes = contents.len(),
            "artifact exported"
        );
        record_artifact_exported(&file_name, contents.len());

        Ok(ExportReceipt {
            file_name,
            location: Some(path),
            bytes_written: contents.len(),
        })
    }
}

/// File name offered for a speaking step recording.
pub fn speaking_file_name(step_id: u32, mime_type: &str) -> String {
    format!(
        "IELTS_Speaking_Step_{step_id}.{}",
        extension_for_mime(mime_type)
    )
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/webm" | "video/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mp4" => "m4a",
        "audio/mpeg" => "mp3",
        "text/plain" => "txt",
        _ => "bin",
    }
}

/// Keeps the suggested name to a single path component of portable characters.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
