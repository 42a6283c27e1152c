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

//! GX command FIFO decoder library
//!
//! This library decodes the graphics command stream a GameCube-class guest
//! writes into its GPU FIFO: register loads, vertex submissions and display
//! list calls, with per-command cycle costs for CPU/GPU synchronization.
//!
//! # Example
//!
//! ```
//! use gxfifo::core::gx::{DataReader, Opcode};
//!
//! let stream = [0x00, 0x61, 0x00, 0x00, 0x00, 0x00];
//! let mut reader = DataReader::new(&stream);
//!
//! let opcode = Opcode::from_byte(reader.read_u8().unwrap());
//! assert_eq!(opcode, Opcode::Nop);
//! ```

pub mod core;
