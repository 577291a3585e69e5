// voicedata - cloud speech voice-data downloader
// Copyright (C) 2026 voicedata contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Bin container parsing.
//!
//! The reader walks the container sequentially with bounds checks on
//! every declared length and verifies each entry's digest before handing
//! the payload out.

use super::{BinEntry, BIN_FORMAT_VERSION, BIN_SIGNATURE, ENTRY_HEADER_SIZE};
use crate::error::{Result, VoiceDataError};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};

/// Parse a complete bin container from memory.
pub fn parse_bin_file(data: &[u8]) -> Result<Vec<BinEntry>> {
    BinReader::new(data).read_entries()
}

pub struct BinReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    fn remaining(&self) -> u64 {
        self.cursor.get_ref().len() as u64 - self.cursor.position()
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| VoiceDataError::UnexpectedEof)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| VoiceDataError::UnexpectedEof)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| VoiceDataError::UnexpectedEof)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(VoiceDataError::UnexpectedEof);
        }
        let mut buf = vec![0u8; len as usize];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| VoiceDataError::UnexpectedEof)?;
        Ok(buf)
    }

    fn read_digest(&mut self) -> Result<[u8; 32]> {
        let mut digest = [0u8; 32];
        self.cursor
            .read_exact(&mut digest)
            .map_err(|_| VoiceDataError::UnexpectedEof)?;
        Ok(digest)
    }

    /// Length-prefixed UTF-8 string.
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as u64;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|_| VoiceDataError::MalformedBinFile("entry name is not UTF-8".to_string()))
    }

    /// Parse the header and every entry, verifying digests.
    pub fn read_entries(&mut self) -> Result<Vec<BinEntry>> {
        let signature = self.read_u32()?;
        if signature != BIN_SIGNATURE {
            return Err(VoiceDataError::InvalidSignature(signature));
        }

        let version = self.read_u16()?;
        if version == 0 || version > BIN_FORMAT_VERSION {
            return Err(VoiceDataError::UnsupportedVersion(version));
        }

        let count = self.read_u32()? as u64;
        // Every entry costs at least its fixed framing; a count that cannot
        // fit in the remaining bytes is a lie, not a short file.
        if count.saturating_mul(ENTRY_HEADER_SIZE) > self.remaining() {
            return Err(VoiceDataError::MalformedBinFile(format!(
                "entry count {count} exceeds what {} remaining bytes can hold",
                self.remaining()
            )));
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(self.read_entry()?);
        }

        if self.remaining() > 0 {
            log::warn!(
                "bin file has {} trailing bytes after the last entry",
                self.remaining()
            );
        }

        Ok(entries)
    }

    fn read_entry(&mut self) -> Result<BinEntry> {
        let name = self.read_string()?;
        let recorded = self.read_digest()?;
        let payload_len = self.read_u64()?;
        let payload = self.read_bytes(payload_len)?;

        let actual: [u8; 32] = Sha256::digest(&payload).into();
        if actual != recorded {
            return Err(VoiceDataError::ChecksumMismatch {
                entry: name,
                expected: hex::encode(recorded),
                actual: hex::encode(actual),
            });
        }

        Ok(BinEntry { name, payload })
    }
}
