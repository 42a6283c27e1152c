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

//! Unknown opcode reporting
//!
//! An unknown byte almost always means the stream is desynchronized or
//! corrupted, and one bad byte is usually followed by many more. Only the
//! first one per session raises an alert; the rest are counted and traced.

use std::fmt::Write;

use super::context::{DecodeContext, FifoRegisters};
use super::decoder::{DecodeMode, OpcodeDecoder};

impl OpcodeDecoder {
    pub(in crate::core::gx) fn unknown_opcode(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        cmd_byte: u8,
        offset: usize,
        mode: DecodeMode,
    ) {
        self.unknown_opcodes += 1;
        let preprocessing = if mode.is_preprocess() { "yes" } else { "no" };

        if self.error_reported {
            log::trace!(
                "FIFO: Unknown Opcode (0x{:02x} @ {}, preprocessing = {})",
                cmd_byte,
                offset,
                preprocessing
            );
            return;
        }
        self.error_reported = true;

        log::error!(
            "FIFO: Unknown Opcode (0x{:02x} @ {}, preprocessing = {})",
            cmd_byte,
            offset,
            preprocessing
        );

        let mut message = format!(
            "GFX FIFO: Unknown Opcode (0x{:02x} @ {}, preprocessing={}).\n\
             This means one of the following:\n\
             * The emulated GPU got desynced, disabling dual core can help\n\
             * Command stream corrupted by some spurious memory bug\n\
             * This really is an unknown opcode (unlikely)\n\
             * Some other sort of bug\n\n\
             Further errors will be sent to the Video Backend log.",
            cmd_byte, offset, preprocessing
        );

        if mode == DecodeMode::Execute {
            if let Some(registers) = ctx.fifo_registers {
                message.push_str("\n\n");
                message.push_str(&describe_fifo_registers(cmd_byte, &registers));
            }
        }

        ctx.host.panic_alert(&message);
    }
}

/// Render the CP FIFO registers for the unknown-opcode alert
pub fn describe_fifo_registers(cmd_byte: u8, fifo: &FifoRegisters) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "Illegal command {:02x}", cmd_byte);
    let _ = writeln!(out, "CPBase: 0x{:08x}", fifo.cp_base);
    let _ = writeln!(out, "CPEnd: 0x{:08x}", fifo.cp_end);
    let _ = writeln!(out, "CPHiWatermark: 0x{:08x}", fifo.cp_hi_watermark);
    let _ = writeln!(out, "CPLoWatermark: 0x{:08x}", fifo.cp_lo_watermark);
    let _ = writeln!(out, "CPReadWriteDistance: 0x{:08x}", fifo.cp_read_write_distance);
    let _ = writeln!(out, "CPWritePointer: 0x{:08x}", fifo.cp_write_pointer);
    let _ = writeln!(out, "CPReadPointer: 0x{:08x}", fifo.cp_read_pointer);
    let _ = writeln!(out, "CPBreakpoint: 0x{:08x}", fifo.cp_breakpoint);
    let _ = writeln!(out, "bFF_GPReadEnable: {}", fifo.gp_read_enable);
    let _ = writeln!(out, "bFF_BPEnable: {}", fifo.bp_enable);
    let _ = writeln!(out, "bFF_BPInt: {}", fifo.bp_int);
    let _ = writeln!(out, "bFF_Breakpoint: {}", fifo.breakpoint);
    let _ = writeln!(out, "bFF_GPLinkEnable: {}", fifo.gp_link_enable);
    let _ = writeln!(out, "bFF_HiWatermarkInt: {}", fifo.hi_watermark_int);
    let _ = write!(out, "bFF_LoWatermarkInt: {}", fifo.lo_watermark_int);
    out
}
