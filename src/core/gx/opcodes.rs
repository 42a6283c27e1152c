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

//! GX FIFO opcode table
//!
//! Every command in the stream starts with a one-byte opcode. The opcode
//! fixes the operand layout (except for XF loads, whose length is encoded in
//! the first operand word) and the cycle cost charged to the CPU timeline.
//!
//! # Opcode Map
//!
//! | Byte        | Command                   | Operand bytes       | Cycles          |
//! |-------------|---------------------------|---------------------|-----------------|
//! | 0x00        | NOP                       | 0                   | 6               |
//! | 0x01        | Unknown reset             | 0                   | 6               |
//! | 0x08        | Load CP register          | 5                   | 12              |
//! | 0x10        | Load XF register(s)       | 4 + 4×N             | 12 + 18×N       |
//! | 0x20..0x38  | Load indexed XF (A-D)     | 4                   | 6               |
//! | 0x40        | Call display list         | 8                   | 6 + list        |
//! | 0x44        | Unknown metrics           | 0                   | 6               |
//! | 0x48        | Invalidate vertex cache   | 0                   | 6               |
//! | 0x61        | Load BP register          | 4                   | 12              |
//! | 0x80..0xFF  | Draw primitives           | 2 + vertex data     | 40×count        |

use std::fmt;

pub const GX_NOP: u8 = 0x00;
pub const GX_UNKNOWN_RESET: u8 = 0x01;
pub const GX_LOAD_CP_REG: u8 = 0x08;
pub const GX_LOAD_XF_REG: u8 = 0x10;
pub const GX_LOAD_INDX_A: u8 = 0x20;
pub const GX_LOAD_INDX_B: u8 = 0x28;
pub const GX_LOAD_INDX_C: u8 = 0x30;
pub const GX_LOAD_INDX_D: u8 = 0x38;
pub const GX_CMD_CALL_DL: u8 = 0x40;
pub const GX_CMD_UNKNOWN_METRICS: u8 = 0x44;
pub const GX_CMD_INVL_VC: u8 = 0x48;
pub const GX_LOAD_BP_REG: u8 = 0x61;

/// Draw commands are every byte with the top bit set
pub const GX_DRAW_PRIMITIVES: u8 = 0x80;
pub const GX_PRIMITIVE_MASK: u8 = 0x78;
pub const GX_PRIMITIVE_SHIFT: u8 = 3;
pub const GX_VAT_MASK: u8 = 0x07;

pub const GX_LOAD_CP_REG_SIZE: usize = 5;
pub const GX_LOAD_XF_REG_SIZE: usize = 4;
pub const GX_LOAD_INDX_SIZE: usize = 4;
pub const GX_CMD_CALL_DL_SIZE: usize = 8;
pub const GX_LOAD_BP_REG_SIZE: usize = 4;
pub const GX_DRAW_PRIMITIVES_SIZE: usize = 2;

pub const GX_NOP_CYCLES: u32 = 6;
pub const GX_LOAD_CP_REG_CYCLES: u32 = 12;
pub const GX_LOAD_XF_REG_BASE_CYCLES: u32 = 12;
pub const GX_LOAD_XF_REG_TRANSFER_CYCLES: u32 = 18;
pub const GX_LOAD_INDX_CYCLES: u32 = 6;
pub const GX_CMD_CALL_DL_BASE_CYCLES: u32 = 6;
pub const GX_CMD_UNKNOWN_METRICS_CYCLES: u32 = 6;
pub const GX_CMD_INVL_VC_CYCLES: u32 = 6;
pub const GX_LOAD_BP_REG_CYCLES: u32 = 12;
pub const GX_DRAW_PRIMITIVES_CYCLES: u32 = 40;
pub const GX_UNKNOWN_OPCODE_CYCLES: u32 = 1;

/// Maximum number of words a single XF load can carry
pub const GX_XF_MAX_TRANSFER: usize = 16;

/// Indexed XF array selected by the LOAD_INDX opcodes
///
/// The discriminant is the array slot identifier forwarded to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IndexedArray {
    /// LOAD_INDX_A: position matrices
    PositionMatrices = 0xC,
    /// LOAD_INDX_B: normal matrices
    NormalMatrices = 0xD,
    /// LOAD_INDX_C: post-transform matrices
    PostMatrices = 0xE,
    /// LOAD_INDX_D: lights
    Lights = 0xF,
}

impl IndexedArray {
    /// Slot identifier passed to the indexed load handler
    pub fn slot(self) -> u8 {
        self as u8
    }
}

/// Primitive type encoded in bits 3-6 of a draw opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Quads,
    /// 0x88: undocumented alias of quads
    Quads2,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
    LineStrip,
    Points,
}

impl Primitive {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Quads,
            1 => Self::Quads2,
            2 => Self::Triangles,
            3 => Self::TriangleStrip,
            4 => Self::TriangleFan,
            5 => Self::Lines,
            6 => Self::LineStrip,
            _ => Self::Points,
        }
    }
}

/// Decoded opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    UnknownReset,
    LoadCpReg,
    LoadXfReg,
    LoadIndexed(IndexedArray),
    CallDisplayList,
    UnknownMetrics,
    InvalidateVertexCache,
    LoadBpReg,
    Draw { primitive: Primitive, vat: u8 },
    Unknown(u8),
}

impl Opcode {
    /// Classify a command byte
    ///
    /// # Examples
    ///
    /// ```
    /// use gxfifo::core::gx::{Opcode, Primitive};
    ///
    /// assert_eq!(Opcode::from_byte(0x61), Opcode::LoadBpReg);
    /// assert_eq!(
    ///     Opcode::from_byte(0x93),
    ///     Opcode::Draw { primitive: Primitive::Triangles, vat: 3 }
    /// );
    /// assert_eq!(Opcode::from_byte(0x02), Opcode::Unknown(0x02));
    /// ```
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            GX_NOP => Self::Nop,
            GX_UNKNOWN_RESET => Self::UnknownReset,
            GX_LOAD_CP_REG => Self::LoadCpReg,
            GX_LOAD_XF_REG => Self::LoadXfReg,
            GX_LOAD_INDX_A => Self::LoadIndexed(IndexedArray::PositionMatrices),
            GX_LOAD_INDX_B => Self::LoadIndexed(IndexedArray::NormalMatrices),
            GX_LOAD_INDX_C => Self::LoadIndexed(IndexedArray::PostMatrices),
            GX_LOAD_INDX_D => Self::LoadIndexed(IndexedArray::Lights),
            GX_CMD_CALL_DL => Self::CallDisplayList,
            GX_CMD_UNKNOWN_METRICS => Self::UnknownMetrics,
            GX_CMD_INVL_VC => Self::InvalidateVertexCache,
            GX_LOAD_BP_REG => Self::LoadBpReg,
            _ if byte & GX_DRAW_PRIMITIVES == GX_DRAW_PRIMITIVES => Self::Draw {
                primitive: Primitive::from_bits((byte & GX_PRIMITIVE_MASK) >> GX_PRIMITIVE_SHIFT),
                vat: byte & GX_VAT_MASK,
            },
            _ => Self::Unknown(byte),
        }
    }

    /// Static table entry for this opcode
    pub fn info(self) -> OpcodeInfo {
        let (name, operand_size, cycles) = match self {
            Self::Nop => ("NOP", 0, GX_NOP_CYCLES),
            Self::UnknownReset => ("UNKNOWN_RESET", 0, GX_NOP_CYCLES),
            Self::LoadCpReg => ("LOAD_CP_REG", GX_LOAD_CP_REG_SIZE, GX_LOAD_CP_REG_CYCLES),
            Self::LoadXfReg => (
                "LOAD_XF_REG",
                GX_LOAD_XF_REG_SIZE,
                GX_LOAD_XF_REG_BASE_CYCLES,
            ),
            Self::LoadIndexed(IndexedArray::PositionMatrices) => {
                ("LOAD_INDX_A", GX_LOAD_INDX_SIZE, GX_LOAD_INDX_CYCLES)
            }
            Self::LoadIndexed(IndexedArray::NormalMatrices) => {
                ("LOAD_INDX_B", GX_LOAD_INDX_SIZE, GX_LOAD_INDX_CYCLES)
            }
            Self::LoadIndexed(IndexedArray::PostMatrices) => {
                ("LOAD_INDX_C", GX_LOAD_INDX_SIZE, GX_LOAD_INDX_CYCLES)
            }
            Self::LoadIndexed(IndexedArray::Lights) => {
                ("LOAD_INDX_D", GX_LOAD_INDX_SIZE, GX_LOAD_INDX_CYCLES)
            }
            Self::CallDisplayList => (
                "CALL_DL",
                GX_CMD_CALL_DL_SIZE,
                GX_CMD_CALL_DL_BASE_CYCLES,
            ),
            Self::UnknownMetrics => ("UNKNOWN_METRICS", 0, GX_CMD_UNKNOWN_METRICS_CYCLES),
            Self::InvalidateVertexCache => ("INVL_VC", 0, GX_CMD_INVL_VC_CYCLES),
            Self::LoadBpReg => ("LOAD_BP_REG", GX_LOAD_BP_REG_SIZE, GX_LOAD_BP_REG_CYCLES),
            Self::Draw { .. } => ("DRAW", GX_DRAW_PRIMITIVES_SIZE, GX_NOP_CYCLES),
            Self::Unknown(_) => ("UNKNOWN", 0, GX_UNKNOWN_OPCODE_CYCLES),
        };
        OpcodeInfo {
            name,
            operand_size,
            cycles,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw { primitive, vat } => write!(f, "DRAW {:?} (VAT {})", primitive, vat),
            Self::Unknown(byte) => write!(f, "UNKNOWN 0x{:02X}", byte),
            other => f.write_str(other.info().name),
        }
    }
}

/// Fixed sizing and timing for one opcode kind
///
/// `operand_size` is the number of bytes that must follow the opcode byte
/// before any operand is consumed. For XF loads and draws this is only the
/// fixed header; the variable part is checked after the header is read.
///
/// `cycles` is the base cost: XF loads add a per-word cost on top, draws
/// charge the per-vertex cost instead when the count is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub operand_size: usize,
    pub cycles: u32,
}

/// Number of data words carried by an XF load control word
///
/// Bits 16-19 hold `transfer_size - 1`.
#[inline(always)]
pub fn xf_transfer_size(control: u32) -> usize {
    (((control >> 16) & 0xF) + 1) as usize
}

/// Destination XF address of an XF load control word
#[inline(always)]
pub fn xf_address(control: u32) -> u16 {
    (control & 0xFFFF) as u16
}

/// Cost of an XF load moving `transfer_size` words
#[inline(always)]
pub fn xf_load_cycles(transfer_size: usize) -> u32 {
    GX_LOAD_XF_REG_BASE_CYCLES + GX_LOAD_XF_REG_TRANSFER_CYCLES * transfer_size as u32
}
