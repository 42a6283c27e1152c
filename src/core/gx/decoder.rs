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

//! Opcode dispatcher
//!
//! Walks a [`DataReader`] one command at a time. Before any operand is
//! consumed the dispatcher checks that the whole fixed part of the command is
//! available; commands with a data-dependent length (XF loads and draws) are
//! checked again once their header has been read. When a command is
//! incomplete the reader is rewound to the command's opcode byte and the run
//! ends, so the next call resumes exactly there once more bytes arrive.

use super::aux_buffer::FifoAuxBuffer;
use super::context::{DecodeContext, DrawCommand, VatDirty};
use super::opcodes::*;
use super::reader::DataReader;

/// Which handler family a decode pass drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Side-effecting pass: register writes, vertex conversion, recording
    Execute,
    /// Look-ahead pass: only preprocess handlers, display lists are copied
    Preprocess,
}

impl DecodeMode {
    #[inline(always)]
    pub fn is_preprocess(self) -> bool {
        self == Self::Preprocess
    }
}

/// Why a decode run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Every available byte was decoded
    Complete,
    /// The command starting at `at` is incomplete
    Starved { at: usize },
}

/// Outcome of one decode run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Reader position at exit: start of the next undecoded command
    pub position: usize,
    /// Cycles charged by the commands decoded in this run
    pub cycles: u32,
    pub status: DecodeStatus,
}

impl RunResult {
    pub fn is_starved(&self) -> bool {
        matches!(self.status, DecodeStatus::Starved { .. })
    }
}

/// GX FIFO opcode decoder
///
/// Holds only session state: the unknown-opcode guard, the display list
/// holding area and the deterministic replay switch. Everything the commands
/// act on comes in through the [`DecodeContext`].
///
/// # Examples
///
/// ```
/// use gxfifo::core::gx::{
///     DataReader, DecodeContext, DecodeMode, HeadlessHost, OpcodeDecoder,
///     StrideVertexConverter, VertexFormatState,
/// };
/// use gxfifo::core::gx::RegisterHandlers;
/// use gxfifo::core::memory::GuestMemory;
///
/// #[derive(Default)]
/// struct Registers {
///     bp: Vec<u32>,
/// }
///
/// impl RegisterHandlers for Registers {
///     fn load_cp_reg(&mut self, _sub_cmd: u8, _value: u32) {}
///     fn load_xf_reg(&mut self, _address: u16, _data: &[u32]) {}
///     fn load_indexed_xf(&mut self, _value: u32, _array: gxfifo::core::gx::IndexedArray) {}
///     fn load_bp_reg(&mut self, value: u32) {
///         self.bp.push(value);
///     }
/// }
///
/// let memory = GuestMemory::new(0x1000);
/// let mut registers = Registers::default();
/// let mut vertices = StrideVertexConverter::new([0; 8]);
/// let mut state = VertexFormatState::new();
/// let mut host = HeadlessHost;
/// let mut ctx = DecodeContext::new(&memory, &mut registers, &mut vertices, &mut state, &mut host);
///
/// let stream = [0x00, 0x00, 0x61, 0x44, 0x00, 0x00, 0x01];
/// let mut reader = DataReader::new(&stream);
/// let mut decoder = OpcodeDecoder::new();
///
/// let result = decoder.run(&mut ctx, &mut reader, false, DecodeMode::Execute);
/// assert_eq!(result.position, 7);
/// assert_eq!(result.cycles, 6 + 6 + 12);
/// drop(ctx);
/// assert_eq!(registers.bp, vec![0x4400_0001]);
/// ```
#[derive(Debug, Default)]
pub struct OpcodeDecoder {
    /// First unknown opcode of the session has been reported
    pub(in crate::core::gx) error_reported: bool,

    /// Unknown opcodes seen since the last reset
    pub(in crate::core::gx) unknown_opcodes: u64,

    /// Execute-mode display lists come from the aux buffer
    pub(in crate::core::gx) deterministic: bool,

    /// Display lists copied by the preprocess pass
    pub(in crate::core::gx) aux: FifoAuxBuffer,
}

impl OpcodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session restart: re-arm the unknown-opcode report and drop snapshots
    pub fn reset(&mut self) {
        self.error_reported = false;
        self.unknown_opcodes = 0;
        self.aux.clear();
        log::debug!("GX opcode decoder reset");
    }

    /// Replay display lists from the preprocess snapshots instead of memory
    pub fn set_deterministic(&mut self, deterministic: bool) {
        self.deterministic = deterministic;
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn error_reported(&self) -> bool {
        self.error_reported
    }

    pub fn unknown_opcode_count(&self) -> u64 {
        self.unknown_opcodes
    }

    pub fn aux_buffer(&self) -> &FifoAuxBuffer {
        &self.aux
    }

    /// Decode commands until the reader is drained or starved
    ///
    /// `in_display_list` is true while running inside a called display list;
    /// a CALL_DL found there is skipped instead of followed.
    ///
    /// # Returns
    ///
    /// The reader position at exit (start of the next undecoded command), the
    /// cycles charged, and whether the run stopped on an incomplete command.
    pub fn run(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        reader: &mut DataReader<'_>,
        in_display_list: bool,
        mode: DecodeMode,
    ) -> RunResult {
        let mut total_cycles: u32 = 0;

        loop {
            let opcode_start = reader.position();
            let Some(cmd_byte) = reader.read_u8() else {
                return RunResult {
                    position: opcode_start,
                    cycles: total_cycles,
                    status: DecodeStatus::Complete,
                };
            };

            let Some(cycles) =
                self.dispatch(ctx, reader, cmd_byte, opcode_start, in_display_list, mode)
            else {
                reader.rewind_to(opcode_start);
                return RunResult {
                    position: opcode_start,
                    cycles: total_cycles,
                    status: DecodeStatus::Starved { at: opcode_start },
                };
            };
            total_cycles = total_cycles.saturating_add(cycles);

            // Display lists record their own commands as they run
            if mode == DecodeMode::Execute && cmd_byte != GX_CMD_CALL_DL {
                if let Some(recorder) = ctx.recorder.as_deref_mut() {
                    recorder.write_gp_command(reader.slice(opcode_start, reader.position()));
                }
            }
        }
    }

    /// Decode one command whose opcode byte has been consumed
    ///
    /// Returns the cycles charged, or `None` when the command is incomplete.
    /// On `None` the caller rewinds to `opcode_start`.
    fn dispatch(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        reader: &mut DataReader<'_>,
        cmd_byte: u8,
        opcode_start: usize,
        in_display_list: bool,
        mode: DecodeMode,
    ) -> Option<u32> {
        let opcode = Opcode::from_byte(cmd_byte);
        let info = opcode.info();
        if reader.remaining() < info.operand_size {
            return None;
        }

        match opcode {
            Opcode::Nop => Some(info.cycles),
            Opcode::UnknownReset => {
                // Datel software sends this
                log::debug!("GX reset?: {:02x}", cmd_byte);
                Some(info.cycles)
            }
            Opcode::LoadCpReg => {
                let sub_cmd = reader.read_u8()?;
                let value = reader.read_u32()?;
                if mode.is_preprocess() {
                    ctx.registers.preprocess_cp_reg(sub_cmd, value);
                } else {
                    ctx.registers.load_cp_reg(sub_cmd, value);
                }
                Some(info.cycles)
            }
            Opcode::LoadXfReg => {
                let control = reader.read_u32()?;
                let transfer_size = xf_transfer_size(control);
                if reader.remaining() < transfer_size * 4 {
                    return None;
                }
                if mode.is_preprocess() {
                    reader.skip(transfer_size * 4);
                } else {
                    let mut data = [0u32; GX_XF_MAX_TRANSFER];
                    let data = &mut data[..transfer_size];
                    reader.read_u32_into(data);
                    ctx.registers.load_xf_reg(xf_address(control), data);
                }
                Some(xf_load_cycles(transfer_size))
            }
            Opcode::LoadIndexed(array) => {
                let value = reader.read_u32()?;
                if mode.is_preprocess() {
                    ctx.registers.preprocess_indexed_xf(value, array);
                } else {
                    ctx.registers.load_indexed_xf(value, array);
                }
                Some(info.cycles)
            }
            Opcode::CallDisplayList => {
                let address = reader.read_u32()?;
                let size = reader.read_u32()?;
                if in_display_list {
                    log::warn!(
                        "recursive display list detected (0x{:08X}, {} bytes)",
                        address,
                        size
                    );
                    return Some(info.cycles);
                }
                let nested = match mode {
                    DecodeMode::Execute => self.interpret_display_list(ctx, address, size),
                    DecodeMode::Preprocess => {
                        self.interpret_display_list_preprocess(ctx, address, size)
                    }
                };
                Some(info.cycles.saturating_add(nested))
            }
            Opcode::UnknownMetrics => {
                // Zelda: Four Swords issues it and then reads the metrics registers
                log::debug!("GX 0x44: {:08x}", cmd_byte);
                Some(info.cycles)
            }
            Opcode::InvalidateVertexCache => {
                log::debug!("Invalidate (vertex cache?)");
                Some(info.cycles)
            }
            Opcode::LoadBpReg => {
                let value = reader.read_u32()?;
                if mode.is_preprocess() {
                    ctx.registers.preprocess_bp_reg(value);
                } else {
                    ctx.registers.load_bp_reg(value);
                }
                Some(info.cycles)
            }
            Opcode::Draw { primitive, vat } => {
                let count = reader.read_u16()?;
                if count == 0 {
                    return Some(GX_NOP_CYCLES);
                }
                self.draw_primitives(ctx, reader, primitive, vat, count, mode)
            }
            Opcode::Unknown(byte) => {
                self.unknown_opcode(ctx, byte, opcode_start, mode);
                Some(info.cycles)
            }
        }
    }

    /// Hand a non-empty draw to the vertex converter
    fn draw_primitives(
        &mut self,
        ctx: &mut DecodeContext<'_>,
        reader: &mut DataReader<'_>,
        primitive: Primitive,
        vat: u8,
        count: u16,
        mode: DecodeMode,
    ) -> Option<u32> {
        let dirty = VatDirty::group(vat);
        let source = reader.remaining_bytes();
        let draw = DrawCommand {
            count,
            primitive,
            vat,
            source_offset: reader.position(),
            buf_size: source.len(),
            needs_loader_refresh: ctx.vertex_state.attr_dirty.contains(dirty),
            skip_draw: ctx.skip_draw,
            source,
            vtx_desc: &ctx.vertex_state.vtx_desc,
            vtx_attr: &ctx.vertex_state.vtx_attr[vat as usize],
        };

        let (read, written) = match mode {
            DecodeMode::Execute => {
                let converted = ctx.vertices.convert(&draw)?;
                (converted.read, converted.written)
            }
            DecodeMode::Preprocess => (ctx.vertices.measure(&draw)?, 0),
        };

        if !reader.skip(read as usize) {
            log::warn!(
                "vertex converter consumed {} bytes but only {} are available",
                read,
                reader.remaining()
            );
            return None;
        }

        if mode == DecodeMode::Execute {
            ctx.vertices.advance_output(written);
            ctx.vertex_state.attr_dirty.remove(dirty);
        }

        Some(GX_DRAW_PRIMITIVES_CYCLES.saturating_mul(count as u32))
    }
}
