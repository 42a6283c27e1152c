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

//! Guest main memory
//!
//! Display lists live in guest RAM and are referenced by address from CALL_DL
//! commands. This module provides a flat RAM model that resolves those
//! addresses to host byte slices.
//!
//! # Address Translation
//!
//! The guest CPU reaches RAM through mirrored segments:
//! - 0x00000000-0x017FFFFF: physical
//! - 0x80000000-0x817FFFFF: cached mirror
//! - 0xC0000000-0xC17FFFFF: uncached mirror
//!
//! The segment bits are masked off before the bounds check. Segment
//! 0x40000000 is not mapped; addresses in it never resolve.
//!
//! # Example
//!
//! ```
//! use gxfifo::core::gx::AddressResolver;
//! use gxfifo::core::memory::GuestMemory;
//!
//! let mut memory = GuestMemory::new(0x1000);
//! memory.write(0x8000_0010, &[0x61, 0x00, 0x00, 0x00, 0x01]).unwrap();
//!
//! // Same bytes through the uncached mirror
//! assert_eq!(memory.resolve(0xC000_0010, 5), Some(&[0x61, 0x00, 0x00, 0x00, 0x01][..]));
//! ```

use crate::core::error::{FifoError, Result};
use crate::core::gx::AddressResolver;
use std::fs::File;
use std::io::Read;
use std::path::Path;


/// Flat guest RAM
pub struct GuestMemory {
    ram: Vec<u8>,
}

impl GuestMemory {
    /// Default RAM size (24MB)
    pub const DEFAULT_SIZE: usize = 24 * 1024 * 1024;

    /// Mask removing the segment bits of a guest address
    const PHYSICAL_MASK: u32 = 0x3FFF_FFFF;

    /// Create zero-filled RAM of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            ram: vec![0u8; size],
        }
    }

    /// Load a raw RAM image
    ///
    /// The image is copied to the start of a RAM of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `FifoError::InvalidMemoryImage` if the image is larger than
    /// `size`, or `FifoError::Io` if the file cannot be read.
    pub fn from_image<P: AsRef<Path>>(path: P, size: usize) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut image = Vec::new();
        file.read_to_end(&mut image)?;

        if image.len() > size {
            return Err(FifoError::InvalidMemoryImage {
                max: size,
                got: image.len(),
            });
        }

        let mut memory = Self::new(size);
        memory.ram[..image.len()].copy_from_slice(&image);
        Ok(memory)
    }

    pub fn size(&self) -> usize {
        self.ram.len()
    }

    /// Translate a guest address to a RAM offset
    ///
    /// Returns `None` for the unmapped 0x40000000 segment.
    #[inline(always)]
    pub fn translate(&self, address: u32) -> Option<usize> {
        match address >> 30 {
            1 => None,
            _ => Some((address & Self::PHYSICAL_MASK) as usize),
        }
    }

    /// Copy `data` into RAM at `address`
    ///
    /// # Errors
    ///
    /// Returns `FifoError::InvalidAddress` if any byte falls outside RAM.
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let target = self
            .translate(address)
            .and_then(|start| self.ram.get_mut(start..start.checked_add(data.len())?))
            .ok_or(FifoError::InvalidAddress {
                address,
                size: data.len() as u32,
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Clear RAM to zero
    pub fn reset(&mut self) {
        self.ram.fill(0);
    }
}

impl AddressResolver for GuestMemory {
    fn resolve(&self, address: u32, size: u32) -> Option<&[u8]> {
        let start = self.translate(address)?;
        let end = start.checked_add(size as usize)?;
        self.ram.get(start..end)
    }
}
