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

//! CALL_DL handling
//!
//! A display list is a block of commands in guest memory executed by
//! reference. The list runs over its own [`DataReader`] with
//! `in_display_list` set, so a CALL_DL inside it is skipped by the
//! dispatcher and lists never nest more than one level. The caller's reader
//! is not touched while the list runs.

use super::context::DecodeContext;
use super::decoder::{DecodeMode, DecodeStatus, OpcodeDecoder};
use super::reader::DataReader;

impl OpcodeDecoder {
    /// Execute the display list at `address`
    ///
    /// In deterministic mode the bytes come from the snapshot the preprocess
    /// pass took; otherwise the address is resolved through guest memory.
    /// Unresolvable lists are skipped and cost nothing.
    ///
    /// # Returns
    ///
    /// Cycles charged by the commands inside the list
    pub(in crate::core::gx) fn interpret_display_list(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        address: u32,
        size: u32,
    ) -> u32 {
        if self.deterministic {
            let Some(snapshot) = self.aux.pop() else {
                log::warn!(
                    "display list 0x{:08X} ({} bytes): no preprocessed snapshot",
                    address,
                    size
                );
                return 0;
            };
            if snapshot.address != address || snapshot.size != size {
                log::warn!(
                    "display list snapshot mismatch: expected 0x{:08X}/{}, got 0x{:08X}/{}",
                    address,
                    size,
                    snapshot.address,
                    snapshot.size
                );
            }
            if snapshot.is_unresolved() {
                log::warn!("display list 0x{:08X} was unmapped when preprocessed", address);
                return 0;
            }
            let mut reader = DataReader::new(&snapshot.data);
            return self.run_display_list(ctx, &mut reader, address, DecodeMode::Execute);
        }

        let memory = ctx.memory;
        let Some(data) = memory.resolve(address, size) else {
            log::warn!(
                "display list 0x{:08X} ({} bytes) is not mapped, skipping",
                address,
                size
            );
            return 0;
        };
        let mut reader = DataReader::new(data);
        self.run_display_list(ctx, &mut reader, address, DecodeMode::Execute)
    }

    /// Preprocess the display list at `address`
    ///
    /// Copies the list into the aux buffer for the execute pass, then scans it
    /// with preprocess handlers. Unresolvable lists still queue an empty
    /// snapshot so both passes stay in step.
    pub(in crate::core::gx) fn interpret_display_list_preprocess(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        address: u32,
        size: u32,
    ) -> u32 {
        let memory = ctx.memory;
        let data = memory.resolve(address, size);
        self.aux.push(address, size, data);

        match data {
            Some(data) => {
                let mut reader = DataReader::new(data);
                self.run_display_list(ctx, &mut reader, address, DecodeMode::Preprocess)
            }
            None => {
                log::warn!(
                    "display list 0x{:08X} ({} bytes) is not mapped, skipping",
                    address,
                    size
                );
                0
            }
        }
    }

    fn run_display_list(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        reader: &mut DataReader<'_>,
        address: u32,
        mode: DecodeMode,
    ) -> u32 {
        let result = self.run(ctx, reader, true, mode);
        if let DecodeStatus::Starved { at } = result.status {
            // A list cannot be continued later; the tail is dropped
            log::debug!(
                "display list 0x{:08X} ends mid-command at offset {} of {}",
                address,
                at,
                reader.end()
            );
        }
        result.cycles
    }
}
