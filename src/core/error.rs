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

/// Decoder error types
use thiserror::Error;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, FifoError>;

/// Main error type for the FIFO decoder
///
/// The decode loop itself never fails: starvation, unknown opcodes and
/// unmapped display lists are all recovered locally. These errors cover the
/// surfaces around it (configuration, memory images, captures, file I/O).
#[derive(Error, Debug)]
pub enum FifoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Capture encode error: {0}")]
    CaptureEncode(#[from] bincode::error::EncodeError),

    #[error("Capture decode error: {0}")]
    CaptureDecode(#[from] bincode::error::DecodeError),

    #[error("Unsupported capture version: {got} (expected {expected})")]
    InvalidCaptureVersion { expected: u32, got: u32 },

    #[error("Invalid memory image size: {got} bytes (maximum {max})")]
    InvalidMemoryImage { max: usize, got: usize },

    #[error("Invalid guest address 0x{address:08X} (size {size})")]
    InvalidAddress { address: u32, size: u32 },

    #[error("Summary serialize error: {0}")]
    Json(#[from] serde_json::Error),
}
