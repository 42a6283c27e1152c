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

//! Bounds-checked byte cursor over a FIFO or display list buffer
//!
//! All multi-byte reads are big-endian, matching the byte order the guest
//! writes into the graphics FIFO.

/// Position-tracking view over a borrowed byte range
///
/// The reader never owns its bytes. `position <= end <= buffer.len()` holds at
/// all times; every read either succeeds completely or leaves the position
/// untouched and returns `None`.
///
/// # Examples
///
/// ```
/// use gxfifo::core::gx::DataReader;
///
/// let bytes = [0x61, 0x12, 0x34, 0x56, 0x78];
/// let mut reader = DataReader::new(&bytes);
///
/// assert_eq!(reader.read_u8(), Some(0x61));
/// assert_eq!(reader.read_u32(), Some(0x1234_5678));
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DataReader<'a> {
    buffer: &'a [u8],
    position: usize,
    end: usize,
}

impl<'a> DataReader<'a> {
    /// Create a reader spanning the whole buffer
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
            end: buffer.len(),
        }
    }

    /// Create a reader over `buffer[position..end]`
    ///
    /// Out-of-range bounds are clamped so the invariant always holds.
    pub fn with_bounds(buffer: &'a [u8], position: usize, end: usize) -> Self {
        let end = end.min(buffer.len());
        Self {
            buffer,
            position: position.min(end),
            end,
        }
    }

    /// Current read position (offset into the underlying buffer)
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    /// End offset of the readable range
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of bytes left between the position and the end
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.end - self.position
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.position == self.end
    }

    /// Unread bytes from the current position to the end
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.buffer[self.position..self.end]
    }

    /// Bytes between two absolute offsets
    ///
    /// Used to hand a fully decoded opcode to the recorder.
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.buffer[start..end]
    }

    /// Move the position back to an earlier opcode start
    ///
    /// Positions past the end are clamped to the end.
    pub fn rewind_to(&mut self, position: usize) {
        self.position = position.min(self.end);
    }

    /// Peek at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.buffer[..self.end].get(self.position).copied()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    /// Peek a big-endian word `offset` bytes ahead of the position
    pub fn peek_u32_at(&self, offset: usize) -> Option<u32> {
        let start = self.position.checked_add(offset)?;
        let end = start.checked_add(4)?;
        if end > self.end {
            return None;
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.buffer[start..end]);
        Some(u32::from_be_bytes(word))
    }

    /// Read `out.len()` consecutive words
    ///
    /// Nothing is consumed unless every word is available.
    pub fn read_u32_into(&mut self, out: &mut [u32]) -> bool {
        let needed = out.len() * 4;
        if needed > self.remaining() {
            return false;
        }
        for word in out.iter_mut() {
            // Length checked above
            *word = self.read_u32().unwrap_or_default();
        }
        true
    }

    /// Skip `count` bytes
    ///
    /// Returns false (and skips nothing) if fewer bytes remain.
    pub fn skip(&mut self, count: usize) -> bool {
        if count > self.remaining() {
            return false;
        }
        self.position += count;
        true
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        if self.remaining() < N {
            return None;
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.position..self.position + N]);
        self.position += N;
        Some(bytes)
    }
}
