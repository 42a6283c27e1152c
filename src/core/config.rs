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

//! Decoder configuration
//!
//! Loaded from a TOML file; every field is optional and falls back to the
//! defaults below.
//!
//! ```toml
//! record_fifo_data = true
//! deterministic_gpu_thread = true
//! vertex_strides = [12, 0, 0, 0, 0, 0, 0, 0]
//! ```

use crate::core::error::Result;
use crate::core::memory::GuestMemory;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Runtime switches for the FIFO decoder and its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Hand every executed command to the recorder
    pub record_fifo_data: bool,

    /// Preprocess ahead and replay display lists from snapshots
    pub deterministic_gpu_thread: bool,

    /// Frame skipping: vertices are sized but not drawn
    pub skip_current_frame: bool,

    /// No UI: unknown-opcode alerts are logged instead of shown
    pub headless: bool,

    /// Vertex size in bytes for each attribute group
    pub vertex_strides: [u32; 8],

    /// Guest RAM size in bytes
    pub memory_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            record_fifo_data: false,
            deterministic_gpu_thread: false,
            skip_current_frame: false,
            headless: true,
            vertex_strides: [0; 8],
            memory_size: GuestMemory::DEFAULT_SIZE,
        }
    }
}

impl DecoderConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
