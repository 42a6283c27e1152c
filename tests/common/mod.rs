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

//! Test fixtures for common decode scenarios

use gxfifo::core::config::DecoderConfig;
use gxfifo::core::gx::{
    DataReader, DecodeContext, DecodeMode, GpuFifo, HeadlessHost, LoadCounters, OpcodeDecoder,
    RunResult, StrideVertexConverter, VertexFormatState,
};
use gxfifo::core::memory::GuestMemory;
use gxfifo::core::recorder::CaptureRecorder;

/// Address of the display list placed by [`frame_memory`]
#[allow(dead_code)]
pub const LIST_ADDRESS: u32 = 0x8000_2000;

/// Vertex strides used by every fixture stream
#[allow(dead_code)]
pub const STRIDES: [u32; 8] = [12, 4, 0, 0, 0, 0, 0, 0];

/// Decoder with its collaborators and a FIFO, configured from a `DecoderConfig`
#[allow(dead_code)]
pub struct Session {
    pub decoder: OpcodeDecoder,
    pub fifo: GpuFifo,
    pub memory: GuestMemory,
    pub registers: LoadCounters,
    pub vertices: StrideVertexConverter,
    pub state: VertexFormatState,
    pub host: HeadlessHost,
    pub recorder: Option<CaptureRecorder>,
}

#[allow(dead_code)]
impl Session {
    pub fn new(config: &DecoderConfig, memory: GuestMemory) -> Self {
        let mut decoder = OpcodeDecoder::new();
        decoder.set_deterministic(config.deterministic_gpu_thread);
        let fifo = if config.deterministic_gpu_thread {
            GpuFifo::deterministic()
        } else {
            GpuFifo::new()
        };

        Self {
            decoder,
            fifo,
            memory,
            registers: LoadCounters::new(),
            vertices: StrideVertexConverter::new(config.vertex_strides),
            state: VertexFormatState::new(),
            host: HeadlessHost,
            recorder: config.record_fifo_data.then(CaptureRecorder::new),
        }
    }

    /// Push `stream` into the FIFO in `chunk_size` writes, decoding after each
    pub fn feed(&mut self, stream: &[u8], chunk_size: usize) {
        let mut ctx = DecodeContext::new(
            &self.memory,
            &mut self.registers,
            &mut self.vertices,
            &mut self.state,
            &mut self.host,
        );
        if let Some(recorder) = self.recorder.as_mut() {
            ctx = ctx.with_recorder(recorder);
        }

        for chunk in stream.chunks(chunk_size.max(1)) {
            self.fifo.push(chunk);
            if self.fifo.is_deterministic() {
                self.fifo.preprocess(&mut self.decoder, &mut ctx);
            }
            self.fifo.run(&mut self.decoder, &mut ctx);
        }
    }

    /// Decode `stream` once, from its start, without the FIFO
    pub fn decode_once(&mut self, stream: &[u8], mode: DecodeMode) -> RunResult {
        let mut ctx = DecodeContext::new(
            &self.memory,
            &mut self.registers,
            &mut self.vertices,
            &mut self.state,
            &mut self.host,
        );
        let mut reader = DataReader::new(stream);
        self.decoder.run(&mut ctx, &mut reader, false, mode)
    }
}

/// Config with the fixture strides and a small RAM
#[allow(dead_code)]
pub fn test_config() -> DecoderConfig {
    DecoderConfig {
        vertex_strides: STRIDES,
        memory_size: 0x10000,
        ..DecoderConfig::default()
    }
}

/// Display list: one BP write and one triangle of VAT 1 vertices
#[allow(dead_code)]
pub fn display_list() -> Vec<u8> {
    let mut list = vec![0x61, 0x41, 0x00, 0x00, 0x10];
    list.extend_from_slice(&[0x91, 0x00, 0x03]);
    list.extend_from_slice(&[0x11; 12]);
    list
}

/// RAM holding [`display_list`] at [`LIST_ADDRESS`]
#[allow(dead_code)]
pub fn frame_memory(size: usize) -> GuestMemory {
    let mut memory = GuestMemory::new(size);
    memory
        .write(LIST_ADDRESS, &display_list())
        .expect("display list fits in RAM");
    memory
}

/// A frame: setup loads, an inline draw and a call to [`display_list`]
#[allow(dead_code)]
pub fn frame_stream() -> Vec<u8> {
    let mut stream = Vec::new();
    // CP: VAT group 0
    stream.extend_from_slice(&[0x08, 0x70, 0x00, 0x00, 0x40, 0x09]);
    // XF: two words at 0x1008
    stream.extend_from_slice(&[0x10, 0x00, 0x01, 0x10, 0x08]);
    stream.extend_from_slice(&[0x3F, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    // INDX_A
    stream.extend_from_slice(&[0x20, 0x00, 0x04, 0xB0, 0x00]);
    // Quad of VAT 0 vertices
    stream.extend_from_slice(&[0x80, 0x00, 0x04]);
    stream.extend_from_slice(&[0x22; 48]);
    // CALL_DL
    stream.push(0x40);
    stream.extend_from_slice(&LIST_ADDRESS.to_be_bytes());
    stream.extend_from_slice(&(display_list().len() as u32).to_be_bytes());
    // Zero-count draw, then copy-out BP write
    stream.extend_from_slice(&[0x98, 0x00, 0x00]);
    stream.extend_from_slice(&[0x61, 0x52, 0x00, 0x00, 0x03]);
    stream.push(0x00);
    stream
}

/// Cycles [`frame_stream`] costs when the display list resolves
#[allow(dead_code)]
pub const FRAME_CYCLES: u64 = 12 + (12 + 18 * 2) + 6 + 40 * 4 + (6 + 12 + 40 * 3) + 6 + 12 + 6;
