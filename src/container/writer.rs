//! Bin container serialization.

use super::{BinEntry, BIN_FORMAT_VERSION, BIN_SIGNATURE};
use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Accumulates entries and serializes them into a bin container.
#[derive(Debug, Default)]
pub struct BinWriter {
    entries: Vec<BinEntry>,
}

impl BinWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one payload under the given relative file name.
    pub fn push(&mut self, name: impl Into<String>, payload: Vec<u8>) {
        self.entries.push(BinEntry {
            name: name.into(),
            payload,
        });
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the container to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_total: usize = self.entries.iter().map(|e| e.payload.len()).sum();
        let mut out = Vec::with_capacity(10 + payload_total + self.entries.len() * 64);

        out.extend_from_slice(&BIN_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&BIN_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        for entry in &self.entries {
            let name = entry.name.as_bytes();
            out.extend_from_slice(&(name.len() as u32).to_le_bytes());
            out.extend_from_slice(name);

            let digest = Sha256::digest(&entry.payload);
            out.extend_from_slice(&digest);

            out.extend_from_slice(&(entry.payload.len() as u64).to_le_bytes());
            out.extend_from_slice(&entry.payload);
        }

        out
    }

    /// Serialize the container and write it to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}
