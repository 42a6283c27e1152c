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

use clap::{Parser, Subcommand};
use gxfifo::core::config::DecoderConfig;
use gxfifo::core::error::Result;
use gxfifo::core::gx::{
    alert_host, DecodeContext, GpuFifo, LoadCounters, OpcodeDecoder, StrideVertexConverter,
    VertexFormatState,
};
use gxfifo::core::memory::GuestMemory;
use gxfifo::core::recorder::{CaptureRecorder, FifoCapture};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

/// GX command FIFO decoder
#[derive(Parser)]
#[command(name = "gxfifo")]
#[command(about = "Decode GameCube/Wii graphics FIFO streams", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Decoder configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Preprocess ahead of execution and replay display lists from snapshots
    #[arg(short = 'd', long, global = true)]
    deterministic: bool,

    /// Bytes handed to the decoder per producer write
    #[arg(short = 'b', long, global = true, default_value = "32")]
    chunk_size: usize,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a raw FIFO dump
    Decode {
        /// Raw FIFO bytes as written by the guest
        fifo_file: PathBuf,

        /// Guest RAM image holding the called display lists
        #[arg(short = 'm', long)]
        memory: Option<PathBuf>,

        /// Write the executed command stream to a capture file
        #[arg(short = 'r', long)]
        record: Option<PathBuf>,
    },
    /// Decode a capture written by `decode --record`
    Replay {
        /// Capture file
        capture_file: PathBuf,
    },
}

/// What one decode session did
#[derive(Debug, Serialize)]
struct Summary {
    bytes: usize,
    cycles: u64,
    /// Trailing bytes of an incomplete command
    pending: usize,
    unknown_opcodes: u64,
    draws: u64,
    vertices: u64,
    display_list_snapshots_left: usize,
    loads: LoadCounters,
    recorded_commands: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present (RUST_LOG and friends)
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("gxfifo v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            DecoderConfig::load_from_file(path)?
        }
        None => DecoderConfig::default(),
    };
    config.deterministic_gpu_thread |= args.deterministic;

    let summary = match &args.command {
        Command::Decode {
            fifo_file,
            memory,
            record,
        } => {
            info!("Decoding FIFO dump: {}", fifo_file.display());
            let stream = fs::read(fifo_file)?;

            let memory = match memory {
                Some(path) => {
                    info!("Loading RAM image from: {}", path.display());
                    GuestMemory::from_image(path, config.memory_size)?
                }
                None => GuestMemory::new(config.memory_size),
            };

            config.record_fifo_data |= record.is_some();
            let mut recorder = config.record_fifo_data.then(CaptureRecorder::new);
            let summary = decode_stream(
                &config,
                &memory,
                &stream,
                args.chunk_size,
                recorder.as_mut(),
            );

            match (recorder, record) {
                (Some(recorder), Some(path)) => {
                    let capture = recorder.finish();
                    capture.save_to_file(path)?;
                    info!(
                        "Capture written to {} ({} commands)",
                        path.display(),
                        capture.metadata.command_count
                    );
                }
                (Some(_), None) => {
                    warn!("record_fifo_data is set but no --record path was given")
                }
                _ => {}
            }
            summary
        }
        Command::Replay { capture_file } => {
            info!("Replaying capture: {}", capture_file.display());
            let capture = FifoCapture::load_from_file(capture_file)?;
            info!(
                "Capture from {} with {} commands",
                capture.metadata.created.to_rfc3339(),
                capture.metadata.command_count
            );

            // Display lists are inlined in captures, RAM stays empty
            let memory = GuestMemory::new(0);
            decode_stream(&config, &memory, &capture.stream(), args.chunk_size, None)
        }
    };

    if summary.pending > 0 {
        warn!("{} bytes left in an incomplete command", summary.pending);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Feed `stream` through a FIFO in `chunk_size` writes
fn decode_stream(
    config: &DecoderConfig,
    memory: &GuestMemory,
    stream: &[u8],
    chunk_size: usize,
    mut recorder: Option<&mut CaptureRecorder>,
) -> Summary {
    let mut decoder = OpcodeDecoder::new();
    decoder.set_deterministic(config.deterministic_gpu_thread);
    let mut fifo = if config.deterministic_gpu_thread {
        GpuFifo::deterministic()
    } else {
        GpuFifo::new()
    };

    let mut registers = LoadCounters::new();
    let mut vertices = StrideVertexConverter::new(config.vertex_strides);
    let mut state = VertexFormatState::new();
    let mut host = alert_host(config.headless, io::stdin().lock(), io::stderr());

    let mut ctx = DecodeContext::new(
        memory,
        &mut registers,
        &mut vertices,
        &mut state,
        &mut *host,
    )
    .with_skip_draw(config.skip_current_frame);
    if let Some(recorder) = recorder.as_deref_mut() {
        ctx = ctx.with_recorder(recorder);
    }

    for chunk in stream.chunks(chunk_size.max(1)) {
        fifo.push(chunk);
        if fifo.is_deterministic() {
            fifo.preprocess(&mut decoder, &mut ctx);
        }
        fifo.run(&mut decoder, &mut ctx);
    }

    drop(ctx);

    Summary {
        bytes: stream.len(),
        cycles: fifo.total_cycles(),
        pending: fifo.pending(),
        unknown_opcodes: decoder.unknown_opcode_count(),
        draws: vertices.draw_count(),
        vertices: vertices.vertex_count(),
        display_list_snapshots_left: decoder.aux_buffer().len(),
        loads: registers,
        recorded_commands: recorder.map(|recorder| recorder.command_count()),
    }
}

fn print_summary(summary: &Summary) {
    println!("Bytes:            {}", summary.bytes);
    println!("Cycles:           {}", summary.cycles);
    println!("Pending bytes:    {}", summary.pending);
    println!("Unknown opcodes:  {}", summary.unknown_opcodes);
    println!("Draws:            {}", summary.draws);
    println!("Vertices:         {}", summary.vertices);
    println!(
        "Register loads:   CP {} / XF {} ({} words) / INDX {:?} / BP {}",
        summary.loads.cp_loads,
        summary.loads.xf_loads,
        summary.loads.xf_words,
        summary.loads.indexed_loads,
        summary.loads.bp_loads
    );
    if let Some(count) = summary.recorded_commands {
        println!("Recorded:         {} commands", count);
    }
}
