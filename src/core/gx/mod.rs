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

//! GX command FIFO decoder
//!
//! This module turns the byte stream the guest CPU writes into the graphics
//! FIFO into register loads, vertex submissions and display list calls:
//! - `reader`: bounds-checked big-endian cursor over the stream
//! - `opcodes`: opcode table (operand sizes and cycle costs)
//! - `decoder`: the dispatch loop, in execute and preprocess mode
//! - `display_list`: CALL_DL handling, one level deep
//! - `unknown`: once-per-session reporting of unknown opcodes
//! - `fifo`: producer/consumer buffer keeping the read position across runs
//! - `vertex`, `stats`: stand-in vertex converter and register handlers
//!
//! # Command Format
//!
//! ```text
//! | opcode (1) | operands (0..8, or computed) |
//! ```
//!
//! Draw commands (opcode bit 7 set) carry a 16-bit vertex count followed by
//! vertex data whose size only the vertex converter knows. XF loads carry a
//! control word whose bits 16-19 give the number of data words that follow.
//!
//! # Starvation
//!
//! The decoder never reads past the bytes it was given. A command that is
//! not fully available stops the run with the reader rewound to its opcode
//! byte; decoding resumes there on the next run.

mod aux_buffer;
mod context;
mod decoder;
mod display_list;
mod fifo;
mod opcodes;
mod reader;
mod stats;
#[cfg(test)]
mod tests;
mod unknown;
mod vertex;

pub use aux_buffer::{DisplayListSnapshot, FifoAuxBuffer};
pub use context::*;
pub use decoder::{DecodeMode, DecodeStatus, OpcodeDecoder, RunResult};
pub use fifo::GpuFifo;
pub use opcodes::*;
pub use reader::DataReader;
pub use stats::LoadCounters;
pub use unknown::describe_fifo_registers;
pub use vertex::StrideVertexConverter;
