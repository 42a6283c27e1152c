// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! FIFO stream recording
//!
//! When recording is enabled the decoder hands every executed command to a
//! [`FifoRecorder`]. [`CaptureRecorder`] collects them into a [`FifoCapture`],
//! which can be written to disk and decoded again later.
//!
//! # Capture Format
//!
//! Captures are serialized with bincode. The file holds a version number,
//! metadata (creation time, command and byte counts) and the recorded
//! commands in stream order. Display lists are not stored as CALL_DL
//! commands; their contents appear inline, as executed.
//!
//! # Example
//!
//! ```no_run
//! use gxfifo::core::recorder::{CaptureRecorder, FifoCapture};
//! use gxfifo::core::gx::FifoRecorder;
//!
//! let mut recorder = CaptureRecorder::new();
//! recorder.write_gp_command(&[0x61, 0x00, 0x00, 0x00, 0x01]);
//!
//! let capture = recorder.finish();
//! capture.save_to_file("frame.gxcap").unwrap();
//!
//! let loaded = FifoCapture::load_from_file("frame.gxcap").unwrap();
//! assert_eq!(loaded.commands.len(), 1);
//! ```

use crate::core::error::{FifoError, Result};
use crate::core::gx::FifoRecorder;
use bincode::config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Capture version for compatibility checking
pub const CAPTURE_VERSION: u32 = 1;

/// Information about a capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub created: DateTime<Utc>,
    pub command_count: u64,
    pub byte_count: u64,
}

/// Recorded command stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FifoCapture {
    pub version: u32,
    pub metadata: CaptureMetadata,
    pub commands: Vec<Vec<u8>>,
}

impl FifoCapture {
    /// Concatenate all commands back into one stream
    pub fn stream(&self) -> Vec<u8> {
        self.commands.concat()
    }

    /// Encode to bincode bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(self, config::standard())?)
    }

    /// Decode from bincode bytes and check the version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (capture, _): (FifoCapture, usize) =
            bincode::serde::decode_from_slice(bytes, config::standard())?;

        if capture.version != CAPTURE_VERSION {
            return Err(FifoError::InvalidCaptureVersion {
                expected: CAPTURE_VERSION,
                got: capture.version,
            });
        }

        Ok(capture)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }
}

/// Recorder collecting commands in memory
#[derive(Debug, Default)]
pub struct CaptureRecorder {
    commands: Vec<Vec<u8>>,
    bytes: u64,
}

impl CaptureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn byte_count(&self) -> u64 {
        self.bytes
    }

    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }

    /// Stop recording and build the capture
    pub fn finish(self) -> FifoCapture {
        FifoCapture {
            version: CAPTURE_VERSION,
            metadata: CaptureMetadata {
                created: Utc::now(),
                command_count: self.commands.len() as u64,
                byte_count: self.bytes,
            },
            commands: self.commands,
        }
    }
}

impl FifoRecorder for CaptureRecorder {
    fn write_gp_command(&mut self, data: &[u8]) {
        self.bytes += data.len() as u64;
        self.commands.push(data.to_vec());
    }
}
