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

//! Holding area for display lists copied during preprocessing
//!
//! The look-ahead pass copies every called display list here, in stream
//! order. The execute pass later pops them back in the same order instead of
//! re-resolving the guest addresses, which may already point at reused memory
//! by then.

use std::collections::VecDeque;

/// One display list captured by the preprocess pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayListSnapshot {
    pub address: u32,
    pub size: u32,
    /// Copied bytes; empty when the address did not resolve
    pub data: Vec<u8>,
}

impl DisplayListSnapshot {
    /// True when the preprocess pass could not resolve the list
    pub fn is_unresolved(&self) -> bool {
        self.data.is_empty() && self.size != 0
    }
}

/// FIFO of display list snapshots
#[derive(Debug, Default)]
pub struct FifoAuxBuffer {
    snapshots: VecDeque<DisplayListSnapshot>,
    bytes: usize,
}

impl FifoAuxBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `data`
    ///
    /// `data` is `None` for unresolved addresses; an empty snapshot is still
    /// queued so the execute pass stays aligned with the preprocess pass.
    pub fn push(&mut self, address: u32, size: u32, data: Option<&[u8]>) {
        let data = data.map(<[u8]>::to_vec).unwrap_or_default();
        self.bytes += data.len();
        self.snapshots.push_back(DisplayListSnapshot {
            address,
            size,
            data,
        });
    }

    /// Take the oldest snapshot
    pub fn pop(&mut self) -> Option<DisplayListSnapshot> {
        let snapshot = self.snapshots.pop_front()?;
        self.bytes -= snapshot.data.len();
        Some(snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Total bytes held across all snapshots
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.bytes = 0;
    }
}
