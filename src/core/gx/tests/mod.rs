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

//! GX decoder test modules
//!
//! Tests are organized into the following categories:
//! - `helpers`: recording register handlers, host and recorder mocks, stream builders
//! - `reader`: big-endian cursor and bounds behavior
//! - `opcodes`: opcode classification and the cost table
//! - `dispatch`: execute-mode decoding, starvation and cycle accounting
//! - `draw`: vertex conversion hand-off and dirty tracking
//! - `display_list`: CALL_DL execution, recursion guard and deterministic replay
//! - `preprocess`: look-ahead pass behavior compared to the execute pass
//! - `unknown`: unknown-opcode reporting
//! - `fifo`: producer/consumer buffer across partial writes
//! - `stats`: load counters driven by a decode run

mod helpers;



#[cfg(test)]
mod dispatch;
