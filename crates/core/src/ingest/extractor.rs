//! Pulls the tabular member out of a feed archive.

use log::debug;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::fetcher::ArchiveBlob;
use crate::errors::{ArchiveError, Result};

/// The decompressed CSV member of an archive.
#[derive(Debug, Clone)]
pub struct TabularMember {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub trait ArchiveExtractor: Send + Sync {
    fn extract_tabular_member(&self, blob: &ArchiveBlob) -> Result<TabularMember>;
}

/// Returns the first `.csv` member of a ZIP archive, matching the extension
/// case-insensitively. Later CSV members are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCsvExtractor;

impl ZipCsvExtractor {
    fn is_csv(name: &str) -> bool {
        name.to_ascii_lowercase().ends_with(".csv")
    }
}

impl ArchiveExtractor for ZipCsvExtractor {
    fn extract_tabular_member(&self, blob: &ArchiveBlob) -> Result<TabularMember> {
        let mut archive =
            ZipArchive::new(Cursor::new(blob.bytes.as_slice())).map_err(ArchiveError::from)?;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(ArchiveError::from)?;
            if file.is_dir() || !Self::is_csv(file.name()) {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|e| ArchiveError::Unreadable(format!("{}: {}", name, e)))?;
            debug!(
                "Extracted {} ({} bytes) from {}",
                name,
                bytes.len(),
                blob.source
            );
            return Ok(TabularMember { name, bytes });
        }

        Err(ArchiveError::NoTabularMember.into())
    }
}
