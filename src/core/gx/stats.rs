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

//! Register load tallies

use serde::Serialize;

use super::context::RegisterHandlers;
use super::opcodes::IndexedArray;

/// Register handlers that count loads instead of applying them
///
/// Used where no real register file is attached, such as the command line
/// decoder and benchmarks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadCounters {
    pub cp_loads: u64,
    pub xf_loads: u64,
    /// Words moved by all XF loads
    pub xf_words: u64,
    /// Indexed loads per array, A through D
    pub indexed_loads: [u64; 4],
    pub bp_loads: u64,
    /// Calls to any preprocess handler
    pub preprocessed: u64,
}

impl LoadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register loads applied by the execute pass
    pub fn total(&self) -> u64 {
        self.cp_loads + self.xf_loads + self.indexed_loads.iter().sum::<u64>() + self.bp_loads
    }
}

impl RegisterHandlers for LoadCounters {
    fn load_cp_reg(&mut self, _sub_cmd: u8, _value: u32) {
        self.cp_loads += 1;
    }

    fn preprocess_cp_reg(&mut self, _sub_cmd: u8, _value: u32) {
        self.preprocessed += 1;
    }

    fn load_xf_reg(&mut self, _address: u16, data: &[u32]) {
        self.xf_loads += 1;
        self.xf_words += data.len() as u64;
    }

    fn load_indexed_xf(&mut self, _value: u32, array: IndexedArray) {
        let index = (array.slot() - IndexedArray::PositionMatrices.slot()) as usize;
        self.indexed_loads[index] += 1;
    }

    fn preprocess_indexed_xf(&mut self, _value: u32, _array: IndexedArray) {
        self.preprocessed += 1;
    }

    fn load_bp_reg(&mut self, _value: u32) {
        self.bp_loads += 1;
    }

    fn preprocess_bp_reg(&mut self, _value: u32) {
        self.preprocessed += 1;
    }
}
