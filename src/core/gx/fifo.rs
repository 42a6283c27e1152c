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

//! Producer/consumer FIFO buffer
//!
//! The CPU side appends command bytes as the guest writes them; the GPU side
//! decodes whatever complete commands are available. The read position is
//! kept here between runs, so a command split across two writes is decoded
//! once its last byte arrives.
//!
//! In deterministic mode a second position tracks the preprocess pass. The
//! execute pass never runs ahead of it, which guarantees every CALL_DL it
//! meets already has a snapshot in the decoder's aux buffer.

use super::context::DecodeContext;
use super::decoder::{DecodeMode, OpcodeDecoder, RunResult};
use super::reader::DataReader;

/// Growable command buffer with persistent read positions
///
/// # Examples
///
/// ```
/// use gxfifo::core::gx::GpuFifo;
///
/// let mut fifo = GpuFifo::new();
/// fifo.push(&[0x61, 0x00]);
/// assert_eq!(fifo.pending(), 2);
/// ```
#[derive(Debug, Default)]
pub struct GpuFifo {
    data: Vec<u8>,
    read_pos: usize,
    preprocess_pos: usize,
    deterministic: bool,
    total_cycles: u64,
}

impl GpuFifo {
    pub fn new() -> Self {
        Self::default()
    }

    /// FIFO whose execute pass trails the preprocess pass
    pub fn deterministic() -> Self {
        Self {
            deterministic: true,
            ..Self::default()
        }
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Append bytes written by the producer
    pub fn push(&mut self, bytes: &[u8]) {
        self.compact();
        self.data.extend_from_slice(bytes);
    }

    /// Bytes not yet executed
    pub fn pending(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Bytes not yet preprocessed
    pub fn pending_preprocess(&self) -> usize {
        self.data.len() - self.preprocess_pos
    }

    /// Execute position relative to the retained bytes
    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Cycles charged by every execute run since creation or `clear`
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Execute every available complete command
    ///
    /// `decoder` must have deterministic replay enabled exactly when this
    /// FIFO is deterministic; debug builds assert it.
    pub fn run(&mut self, decoder: &mut OpcodeDecoder, ctx: &mut DecodeContext<'_>) -> RunResult {
        self.check_decoder(decoder);
        let end = if self.deterministic {
            self.preprocess_pos
        } else {
            self.data.len()
        };
        let mut reader = DataReader::with_bounds(&self.data, self.read_pos, end);
        let result = decoder.run(ctx, &mut reader, false, DecodeMode::Execute);
        self.read_pos = result.position;
        self.total_cycles += u64::from(result.cycles);
        result
    }

    /// Preprocess every available complete command
    pub fn preprocess(
        &mut self,
        decoder: &mut OpcodeDecoder,
        ctx: &mut DecodeContext<'_>,
    ) -> RunResult {
        self.check_decoder(decoder);
        let mut reader = DataReader::with_bounds(&self.data, self.preprocess_pos, self.data.len());
        let result = decoder.run(ctx, &mut reader, false, DecodeMode::Preprocess);
        self.preprocess_pos = result.position;
        result
    }

    fn check_decoder(&self, decoder: &OpcodeDecoder) {
        debug_assert_eq!(
            self.deterministic,
            decoder.is_deterministic(),
            "FIFO and decoder disagree on deterministic mode"
        );
    }

    /// Drop everything, including partially received commands
    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
        self.preprocess_pos = 0;
        self.total_cycles = 0;
    }

    /// Discard bytes both passes are done with
    fn compact(&mut self) {
        let consumed = if self.deterministic {
            self.read_pos.min(self.preprocess_pos)
        } else {
            self.read_pos
        };
        if consumed == 0 {
            return;
        }
        self.data.drain(..consumed);
        self.read_pos -= consumed;
        self.preprocess_pos = self.preprocess_pos.saturating_sub(consumed);
    }
}
