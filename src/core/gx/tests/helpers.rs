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

//! Shared test collaborators and stream builders

use super::super::*;
use crate::core::memory::GuestMemory;

/// One call into the register handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterCall {
    Cp {
        sub_cmd: u8,
        value: u32,
        preprocess: bool,
    },
    Xf {
        address: u16,
        data: Vec<u32>,
    },
    Indexed {
        value: u32,
        array: IndexedArray,
        preprocess: bool,
    },
    Bp {
        value: u32,
        preprocess: bool,
    },
}

impl RegisterCall {
    pub fn is_preprocess(&self) -> bool {
        match self {
            Self::Cp { preprocess, .. }
            | Self::Indexed { preprocess, .. }
            | Self::Bp { preprocess, .. } => *preprocess,
            Self::Xf { .. } => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockRegisters {
    pub calls: Vec<RegisterCall>,
}

impl MockRegisters {
    /// Calls that would have changed emulated state
    pub fn mutating_calls(&self) -> usize {
        self.calls.iter().filter(|c| !c.is_preprocess()).count()
    }
}

impl RegisterHandlers for MockRegisters {
    fn load_cp_reg(&mut self, sub_cmd: u8, value: u32) {
        self.calls.push(RegisterCall::Cp {
            sub_cmd,
            value,
            preprocess: false,
        });
    }

    fn preprocess_cp_reg(&mut self, sub_cmd: u8, value: u32) {
        self.calls.push(RegisterCall::Cp {
            sub_cmd,
            value,
            preprocess: true,
        });
    }

    fn load_xf_reg(&mut self, address: u16, data: &[u32]) {
        self.calls.push(RegisterCall::Xf {
            address,
            data: data.to_vec(),
        });
    }

    fn load_indexed_xf(&mut self, value: u32, array: IndexedArray) {
        self.calls.push(RegisterCall::Indexed {
            value,
            array,
            preprocess: false,
        });
    }

    fn preprocess_indexed_xf(&mut self, value: u32, array: IndexedArray) {
        self.calls.push(RegisterCall::Indexed {
            value,
            array,
            preprocess: true,
        });
    }

    fn load_bp_reg(&mut self, value: u32) {
        self.calls.push(RegisterCall::Bp {
            value,
            preprocess: false,
        });
    }

    fn preprocess_bp_reg(&mut self, value: u32) {
        self.calls.push(RegisterCall::Bp {
            value,
            preprocess: true,
        });
    }
}

#[derive(Debug, Default)]
pub struct CountingHost {
    pub alerts: Vec<String>,
}

impl Host for CountingHost {
    fn panic_alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct VecRecorder {
    pub commands: Vec<Vec<u8>>,
}

impl FifoRecorder for VecRecorder {
    fn write_gp_command(&mut self, data: &[u8]) {
        self.commands.push(data.to_vec());
    }
}

/// Decoder plus every collaborator it needs
pub struct Harness {
    pub decoder: OpcodeDecoder,
    pub memory: GuestMemory,
    pub registers: MockRegisters,
    pub vertices: StrideVertexConverter,
    pub state: VertexFormatState,
    pub host: CountingHost,
    pub recorder: VecRecorder,
    pub record: bool,
    pub skip_draw: bool,
    pub fifo_registers: Option<FifoRegisters>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            decoder: OpcodeDecoder::new(),
            memory: GuestMemory::new(0x10000),
            registers: MockRegisters::default(),
            vertices: StrideVertexConverter::new([4, 8, 0, 0, 0, 0, 0, 12]),
            state: VertexFormatState::new(),
            host: CountingHost::default(),
            recorder: VecRecorder::default(),
            record: false,
            skip_draw: false,
            fifo_registers: None,
        }
    }

    /// Decode `stream` from its start at top level
    pub fn run(&mut self, stream: &[u8], mode: DecodeMode) -> RunResult {
        let mut reader = DataReader::new(stream);
        self.run_reader(&mut reader, false, mode)
    }

    pub fn run_reader(
        &mut self,
        reader: &mut DataReader<'_>,
        in_display_list: bool,
        mode: DecodeMode,
    ) -> RunResult {
        let mut ctx = DecodeContext::new(
            &self.memory,
            &mut self.registers,
            &mut self.vertices,
            &mut self.state,
            &mut self.host,
        )
        .with_skip_draw(self.skip_draw);
        if self.record {
            ctx = ctx.with_recorder(&mut self.recorder);
        }
        if let Some(registers) = self.fifo_registers {
            ctx = ctx.with_fifo_registers(registers);
        }
        self.decoder.run(&mut ctx, reader, in_display_list, mode)
    }

    /// Place a display list in guest RAM
    pub fn write_list(&mut self, address: u32, commands: &[u8]) {
        self.memory.write(address, commands).unwrap();
    }
}

pub fn nop() -> Vec<u8> {
    vec![GX_NOP]
}

pub fn bp(value: u32) -> Vec<u8> {
    let mut out = vec![GX_LOAD_BP_REG];
    out.extend_from_slice(&value.to_be_bytes());
    out
}

pub fn cp(sub_cmd: u8, value: u32) -> Vec<u8> {
    let mut out = vec![GX_LOAD_CP_REG, sub_cmd];
    out.extend_from_slice(&value.to_be_bytes());
    out
}

pub fn xf(address: u16, words: &[u32]) -> Vec<u8> {
    let control = (((words.len() as u32) - 1) << 16) | address as u32;
    let mut out = vec![GX_LOAD_XF_REG];
    out.extend_from_slice(&control.to_be_bytes());
    for word in words {
        out.extend_from_slice(&word.to_be_bytes());
    }
    out
}

pub fn indexed(opcode: u8, value: u32) -> Vec<u8> {
    let mut out = vec![opcode];
    out.extend_from_slice(&value.to_be_bytes());
    out
}

pub fn call_dl(address: u32, size: u32) -> Vec<u8> {
    let mut out = vec![GX_CMD_CALL_DL];
    out.extend_from_slice(&address.to_be_bytes());
    out.extend_from_slice(&size.to_be_bytes());
    out
}

/// Draw opcode for `primitive` bits and `vat`, with `count` and raw vertex data
pub fn draw(primitive: u8, vat: u8, count: u16, data: &[u8]) -> Vec<u8> {
    let opcode = GX_DRAW_PRIMITIVES | (primitive << GX_PRIMITIVE_SHIFT) | vat;
    let mut out = vec![opcode];
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(data);
    out
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}
