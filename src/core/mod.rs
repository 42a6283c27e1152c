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

//! Core decoder components
//!
//! This module contains:
//! - GX FIFO opcode decoder (`gx`)
//! - Guest memory for display list resolution (`memory`)
//! - Stream recording and captures (`recorder`)
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod gx;
pub mod memory;
pub mod recorder;

// Re-export commonly used types
pub use config::DecoderConfig;
pub use error::{FifoError, Result};
pub use gx::{DecodeContext, DecodeMode, GpuFifo, OpcodeDecoder};
pub use memory::GuestMemory;
pub use recorder::{CaptureRecorder, FifoCapture};
