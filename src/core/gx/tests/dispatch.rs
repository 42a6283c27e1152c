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

//! Execute-mode dispatch tests
//!
//! Register forwarding, cycle accounting, starvation and recording.

use super::super::*;
use super::helpers::*;

#[test]
fn test_nop_nop_bp() {
    let mut h = Harness::new();
    let stream = concat(&[nop(), nop(), bp(0x4400_0001)]);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 7);
    assert_eq!(result.cycles, 24);
    assert_eq!(result.status, DecodeStatus::Complete);
    assert_eq!(
        h.registers.calls,
        vec![RegisterCall::Bp {
            value: 0x4400_0001,
            preprocess: false
        }]
    );
}

#[test]
fn test_empty_stream() {
    let mut h = Harness::new();
    let result = h.run(&[], DecodeMode::Execute);

    assert_eq!(result.position, 0);
    assert_eq!(result.cycles, 0);
    assert!(!result.is_starved());
}

#[test]
fn test_cp_forwarding() {
    let mut h = Harness::new();
    let stream = cp(0x50, 0x0000_DEAD);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 6);
    assert_eq!(result.cycles, 12);
    assert_eq!(
        h.registers.calls,
        vec![RegisterCall::Cp {
            sub_cmd: 0x50,
            value: 0xDEAD,
            preprocess: false
        }]
    );
}

#[test]
fn test_xf_forwards_words() {
    let mut h = Harness::new();
    let stream = xf(0x1008, &[1, 2, 3]);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 17);
    assert_eq!(result.cycles, 12 + 18 * 3);
    assert_eq!(
        h.registers.calls,
        vec![RegisterCall::Xf {
            address: 0x1008,
            data: vec![1, 2, 3]
        }]
    );
}

#[test]
fn test_xf_max_transfer() {
    let mut h = Harness::new();
    let words: Vec<u32> = (0..16).collect();
    let stream = xf(0x0400, &words);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 5 + 64);
    assert_eq!(result.cycles, 12 + 18 * 16);
    assert_eq!(
        h.registers.calls,
        vec![RegisterCall::Xf {
            address: 0x0400,
            data: words
        }]
    );
}

#[test]
fn test_xf_missing_data_word_starves() {
    let mut h = Harness::new();
    // Control announces three words, only two follow
    let mut stream = xf(0x1000, &[0xA, 0xB, 0xC]);
    stream.truncate(stream.len() - 4);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 0);
    assert_eq!(result.cycles, 0);
    assert_eq!(result.status, DecodeStatus::Starved { at: 0 });
    assert!(h.registers.calls.is_empty());
}

#[test]
fn test_indexed_loads() {
    let mut h = Harness::new();
    let stream = concat(&[
        indexed(GX_LOAD_INDX_A, 0x1111_0000),
        indexed(GX_LOAD_INDX_B, 0x2222_0000),
        indexed(GX_LOAD_INDX_C, 0x3333_0000),
        indexed(GX_LOAD_INDX_D, 0x4444_0000),
    ]);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 20);
    assert_eq!(result.cycles, 24);
    let arrays: Vec<_> = h
        .registers
        .calls
        .iter()
        .map(|call| match call {
            RegisterCall::Indexed { value, array, .. } => (*value, array.slot()),
            other => panic!("unexpected call {:?}", other),
        })
        .collect();
    assert_eq!(
        arrays,
        vec![
            (0x1111_0000, 0xC),
            (0x2222_0000, 0xD),
            (0x3333_0000, 0xE),
            (0x4444_0000, 0xF)
        ]
    );
}

#[test]
fn test_operandless_commands() {
    let mut h = Harness::new();
    let stream = [GX_UNKNOWN_RESET, GX_CMD_UNKNOWN_METRICS, GX_CMD_INVL_VC];

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 3);
    assert_eq!(result.cycles, 18);
    assert!(h.registers.calls.is_empty());
    assert!(h.host.alerts.is_empty());
}

#[test]
fn test_every_prefix_starves_at_opcode() {
    let commands = [
        cp(0x30, 0x1234_5678),
        xf(0x1000, &[7, 8]),
        indexed(GX_LOAD_INDX_C, 0x0001_0002),
        bp(0x6100_00FF),
        call_dl(0x8000_0000, 0x20),
        draw(2, 0, 0, &[]),
    ];

    for command in &commands {
        for len in 1..command.len() {
            let mut h = Harness::new();
            let result = h.run(&command[..len], DecodeMode::Execute);

            assert_eq!(
                result.status,
                DecodeStatus::Starved { at: 0 },
                "{:02X?} cut at {}",
                command,
                len
            );
            assert_eq!(result.position, 0);
            assert_eq!(result.cycles, 0);
            assert!(h.registers.calls.is_empty());
        }

        let mut h = Harness::new();
        let result = h.run(command, DecodeMode::Execute);
        assert_eq!(result.position, command.len(), "{:02X?}", command);
        assert_eq!(result.status, DecodeStatus::Complete);
    }
}

#[test]
fn test_starvation_keeps_earlier_commands() {
    let mut h = Harness::new();
    let mut stream = concat(&[bp(1), cp(0x40, 2)]);
    stream.truncate(stream.len() - 2);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.position, 5);
    assert_eq!(result.cycles, 12);
    assert_eq!(result.status, DecodeStatus::Starved { at: 5 });
    assert_eq!(h.registers.calls.len(), 1);
}

#[test]
fn test_starvation_is_idempotent() {
    let mut h = Harness::new();
    let mut stream = concat(&[nop(), xf(0x1000, &[1, 2])]);
    stream.pop();

    let mut reader = DataReader::new(&stream);
    let first = h.run_reader(&mut reader, false, DecodeMode::Execute);
    let calls = h.registers.calls.len();

    let mut reader = DataReader::with_bounds(&stream, first.position, stream.len());
    let second = h.run_reader(&mut reader, false, DecodeMode::Execute);

    assert_eq!(first.position, 1);
    assert_eq!(second.position, first.position);
    assert_eq!(second.cycles, 0);
    assert_eq!(second.status, first.status);
    assert_eq!(h.registers.calls.len(), calls);
}

#[test]
fn test_resume_matches_whole_buffer() {
    let stream = concat(&[
        bp(1),
        xf(0x1000, &[1, 2, 3]),
        cp(0x50, 9),
        nop(),
        indexed(GX_LOAD_INDX_A, 4),
    ]);

    let mut whole = Harness::new();
    let expected = whole.run(&stream, DecodeMode::Execute);

    for split in 0..=stream.len() {
        let mut h = Harness::new();
        let mut reader = DataReader::with_bounds(&stream, 0, split);
        let first = h.run_reader(&mut reader, false, DecodeMode::Execute);

        let mut reader = DataReader::with_bounds(&stream, first.position, stream.len());
        let second = h.run_reader(&mut reader, false, DecodeMode::Execute);

        assert_eq!(second.position, expected.position, "split at {}", split);
        assert_eq!(first.cycles + second.cycles, expected.cycles);
        assert_eq!(h.registers.calls, whole.registers.calls);
    }
}

#[test]
fn test_recording_captures_exact_commands() {
    let mut h = Harness::new();
    h.record = true;
    let commands = [nop(), bp(0x0F00_0000), xf(0x1000, &[5]), cp(1, 2)];
    let mut stream = concat(&commands);
    // Incomplete trailing command is not recorded
    stream.extend_from_slice(&[GX_LOAD_BP_REG, 0x00]);

    let result = h.run(&stream, DecodeMode::Execute);

    assert!(result.is_starved());
    assert_eq!(h.recorder.commands, commands.to_vec());
}

#[test]
fn test_recording_disabled() {
    let mut h = Harness::new();
    let stream = concat(&[nop(), bp(1)]);

    h.run(&stream, DecodeMode::Execute);

    assert!(h.recorder.commands.is_empty());
}

#[test]
fn test_cycles_add_up() {
    let mut h = Harness::new();
    let stream = concat(&[
        nop(),
        cp(0, 0),
        xf(0, &[0, 0]),
        indexed(GX_LOAD_INDX_B, 0),
        bp(0),
        vec![GX_CMD_INVL_VC],
    ]);

    let result = h.run(&stream, DecodeMode::Execute);

    assert_eq!(result.cycles, 6 + 12 + (12 + 36) + 6 + 12 + 6);
}
