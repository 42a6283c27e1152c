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

//! Collaborators reached by the decoder
//!
//! The decoder owns none of the register state it updates. Every decode call
//! receives a [`DecodeContext`] bundling the address resolver, register
//! handlers, vertex converter, recorder and the per-session vertex format
//! state. Only one context is active at a time; the `&mut` borrows enforce
//! that calls against the same state are serialized.

use bitflags::bitflags;
use std::io::{BufRead, Write};

use super::opcodes::{IndexedArray, Primitive};

/// Translates guest addresses of display lists to host bytes
pub trait AddressResolver {
    /// Resolve `size` bytes starting at `address`
    ///
    /// Returns `None` when any part of the range is unmapped.
    fn resolve(&self, address: u32, size: u32) -> Option<&[u8]>;
}

/// Register-space handlers for the CP, XF and BP blocks
///
/// The `preprocess_*` variants are called during the look-ahead pass and
/// must not touch state the execute pass depends on. They default to no-ops.
pub trait RegisterHandlers {
    /// LOAD_CP_REG: command processor register write
    fn load_cp_reg(&mut self, sub_cmd: u8, value: u32);

    fn preprocess_cp_reg(&mut self, _sub_cmd: u8, _value: u32) {}

    /// LOAD_XF_REG: `data.len()` consecutive words starting at `address`
    fn load_xf_reg(&mut self, address: u16, data: &[u32]);

    /// LOAD_INDX_A..D: indexed XF load into `array`
    fn load_indexed_xf(&mut self, value: u32, array: IndexedArray);

    fn preprocess_indexed_xf(&mut self, _value: u32, _array: IndexedArray) {}

    /// LOAD_BP_REG: blending/pixel register write
    fn load_bp_reg(&mut self, value: u32);

    fn preprocess_bp_reg(&mut self, _value: u32) {}
}

/// Result of a successful vertex conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertedVertices {
    /// Source bytes consumed from the FIFO
    pub read: u32,
    /// Bytes produced into the vertex output buffer
    pub written: u32,
}

/// Vertex loader turning raw FIFO vertex data into the internal format
pub trait VertexConverter {
    /// Convert the vertices of `draw`
    ///
    /// Returns `None` when `draw.source` does not hold all vertices yet.
    fn convert(&mut self, draw: &DrawCommand<'_>) -> Option<ConvertedVertices>;

    /// Size the vertex data of `draw` without converting it
    ///
    /// Returns `None` when `draw.source` does not hold all vertices yet.
    fn measure(&self, draw: &DrawCommand<'_>) -> Option<u32>;

    /// Move the output cursor past `bytes` freshly written bytes
    fn advance_output(&mut self, bytes: u32);
}

/// Sink for recording the executed command stream
pub trait FifoRecorder {
    /// Append one fully decoded command
    fn write_gp_command(&mut self, data: &[u8]);
}

/// User-facing alerts
pub trait Host {
    /// Show a blocking alert (or its headless equivalent)
    fn panic_alert(&mut self, message: &str);
}

/// Host without a UI; alerts become error log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl Host for HeadlessHost {
    fn panic_alert(&mut self, message: &str) {
        log::error!("{}", message);
    }
}

/// Host with a terminal: alerts are printed and wait for Enter
#[derive(Debug)]
pub struct PromptHost<R, W> {
    pub(in crate::core::gx) input: R,
    pub(in crate::core::gx) output: W,
}

impl<R: BufRead, W: Write> PromptHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Host for PromptHost<R, W> {
    fn panic_alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{}\nPress Enter to continue...", message)
            .and_then(|_| self.output.flush())
        {
            log::error!("{} (alert output failed: {})", message, e);
            return;
        }
        let mut line = String::new();
        if let Err(e) = self.input.read_line(&mut line) {
            log::warn!("Failed to read alert acknowledgement: {}", e);
        }
    }
}

/// Pick the alert host for a session
///
/// Headless sessions log alerts; otherwise they go to `output` and block on
/// a line from `input`.
pub fn alert_host<'a, R, W>(headless: bool, input: R, output: W) -> Box<dyn Host + 'a>
where
    R: BufRead + 'a,
    W: Write + 'a,
{
    if headless {
        Box::new(HeadlessHost)
    } else {
        Box::new(PromptHost::new(input, output))
    }
}

bitflags! {
    /// Vertex attribute groups whose format changed since the last draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VatDirty: u8 {
        const VAT0 = 1 << 0;
        const VAT1 = 1 << 1;
        const VAT2 = 1 << 2;
        const VAT3 = 1 << 3;
        const VAT4 = 1 << 4;
        const VAT5 = 1 << 5;
        const VAT6 = 1 << 6;
        const VAT7 = 1 << 7;
    }
}

impl VatDirty {
    /// Flag for a single attribute group (0-7)
    pub fn group(vat: u8) -> Self {
        Self::from_bits_retain(1 << (vat & 0x07))
    }
}

/// Raw vertex descriptor (CP registers 0x50/0x60)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexDescriptor {
    pub low: u32,
    pub high: u32,
}

/// Raw vertex attribute format of one group (CP registers 0x70/0x80/0x90)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexAttributeGroup {
    pub g0: u32,
    pub g1: u32,
    pub g2: u32,
}

/// Per-session vertex format state shared with the CP register handlers
#[derive(Debug, Clone, Default)]
pub struct VertexFormatState {
    pub attr_dirty: VatDirty,
    pub vtx_desc: VertexDescriptor,
    pub vtx_attr: [VertexAttributeGroup; 8],
}

impl VertexFormatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a group as changed so the next draw refreshes its loader
    pub fn mark_dirty(&mut self, vat: u8) {
        self.attr_dirty |= VatDirty::group(vat);
    }
}

/// One draw command handed to the vertex converter
///
/// Built fresh for every draw opcode and dropped once conversion returns.
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand<'a> {
    pub count: u16,
    pub primitive: Primitive,
    /// Vertex attribute group (0-7)
    pub vat: u8,
    /// Offset of the first vertex byte in the active buffer
    pub source_offset: usize,
    /// Vertex bytes currently available (`source.len()`)
    pub buf_size: usize,
    /// The group's format changed since its loader was last built
    pub needs_loader_refresh: bool,
    /// Frame skipping: convert for sizing but do not draw
    pub skip_draw: bool,
    pub source: &'a [u8],
    pub vtx_desc: &'a VertexDescriptor,
    pub vtx_attr: &'a VertexAttributeGroup,
}

/// Command processor FIFO registers, dumped when an unknown opcode shows up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoRegisters {
    pub cp_base: u32,
    pub cp_end: u32,
    pub cp_hi_watermark: u32,
    pub cp_lo_watermark: u32,
    pub cp_read_write_distance: u32,
    pub cp_write_pointer: u32,
    pub cp_read_pointer: u32,
    pub cp_breakpoint: u32,
    pub gp_read_enable: bool,
    pub bp_enable: bool,
    pub bp_int: bool,
    pub breakpoint: bool,
    pub gp_link_enable: bool,
    pub hi_watermark_int: bool,
    pub lo_watermark_int: bool,
}

/// Everything one decode call may touch
pub struct DecodeContext<'a> {
    pub memory: &'a dyn AddressResolver,
    pub registers: &'a mut dyn RegisterHandlers,
    pub vertices: &'a mut dyn VertexConverter,
    pub vertex_state: &'a mut VertexFormatState,
    pub host: &'a mut dyn Host,
    /// Set when stream recording is enabled
    pub recorder: Option<&'a mut dyn FifoRecorder>,
    /// Register snapshot for unknown-opcode diagnostics
    pub fifo_registers: Option<FifoRegisters>,
    /// Frame skipping flag forwarded to every draw
    pub skip_draw: bool,
}

impl<'a> DecodeContext<'a> {
    /// Build a context with recording disabled and no register snapshot
    pub fn new(
        memory: &'a dyn AddressResolver,
        registers: &'a mut dyn RegisterHandlers,
        vertices: &'a mut dyn VertexConverter,
        vertex_state: &'a mut VertexFormatState,
        host: &'a mut dyn Host,
    ) -> Self {
        Self {
            memory,
            registers,
            vertices,
            vertex_state,
            host,
            recorder: None,
            fifo_registers: None,
            skip_draw: false,
        }
    }

    pub fn with_recorder(mut self, recorder: &'a mut dyn FifoRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_fifo_registers(mut self, registers: FifoRegisters) -> Self {
        self.fifo_registers = Some(registers);
        self
    }

    pub fn with_skip_draw(mut self, skip: bool) -> Self {
        self.skip_draw = skip;
        self
    }
}
