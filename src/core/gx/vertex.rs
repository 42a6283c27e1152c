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

//! Fixed-stride vertex converter
//!
//! A minimal [`VertexConverter`] that treats every vertex of a group as a
//! fixed number of bytes and copies them through unchanged. Real vertex
//! loaders derive the size from the descriptor and attribute format; this
//! one takes the strides from configuration.

use super::context::{ConvertedVertices, DrawCommand, VertexConverter};

/// Vertex converter with one byte stride per attribute group
#[derive(Debug, Clone)]
pub struct StrideVertexConverter {
    strides: [u32; 8],
    output: Vec<u8>,
    cursor: usize,
    draws: u64,
    vertices: u64,
    loader_refreshes: u64,
}

impl StrideVertexConverter {
    pub fn new(strides: [u32; 8]) -> Self {
        Self {
            strides,
            output: Vec::new(),
            cursor: 0,
            draws: 0,
            vertices: 0,
            loader_refreshes: 0,
        }
    }

    pub fn stride(&self, vat: u8) -> u32 {
        self.strides[(vat & 0x07) as usize]
    }

    pub fn set_stride(&mut self, vat: u8, stride: u32) {
        self.strides[(vat & 0x07) as usize] = stride;
    }

    /// Committed vertex output
    pub fn output(&self) -> &[u8] {
        &self.output[..self.cursor]
    }

    /// Hand off the committed output and start an empty buffer
    pub fn flush(&mut self) -> Vec<u8> {
        self.output.truncate(self.cursor);
        self.cursor = 0;
        std::mem::take(&mut self.output)
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn vertex_count(&self) -> u64 {
        self.vertices
    }

    /// Draws that arrived with their group marked dirty
    pub fn loader_refresh_count(&self) -> u64 {
        self.loader_refreshes
    }

    fn vertex_bytes(&self, draw: &DrawCommand<'_>) -> Option<u32> {
        let size = self.stride(draw.vat).checked_mul(u32::from(draw.count))?;
        if size as usize > draw.buf_size {
            return None;
        }
        Some(size)
    }
}

impl VertexConverter for StrideVertexConverter {
    fn convert(&mut self, draw: &DrawCommand<'_>) -> Option<ConvertedVertices> {
        let size = self.vertex_bytes(draw)?;

        if draw.needs_loader_refresh {
            self.loader_refreshes += 1;
            log::debug!("refreshing vertex loader for VAT {}", draw.vat);
        }
        self.draws += 1;
        self.vertices += u64::from(draw.count);

        if draw.skip_draw {
            return Some(ConvertedVertices {
                read: size,
                written: 0,
            });
        }

        // Uncommitted output from an earlier convert is overwritten
        self.output.truncate(self.cursor);
        self.output
            .extend_from_slice(&draw.source[..size as usize]);
        Some(ConvertedVertices {
            read: size,
            written: size,
        })
    }

    fn measure(&self, draw: &DrawCommand<'_>) -> Option<u32> {
        self.vertex_bytes(draw)
    }

    fn advance_output(&mut self, bytes: u32) {
        self.cursor = (self.cursor + bytes as usize).min(self.output.len());
    }
}
