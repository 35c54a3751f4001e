use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use std::time::Instant;

use crossbeam::channel;
use num_complex::Complex32;

use nv_conditioner::{ItemType, ResamplerConditioner};
use nv_flow::{FlowGraph, KvConfig, LogSink, Runtime};
use nv_output::dump::SampleDump;

/// Items per block fed through the conditioner
const BLOCK_ITEMS: usize = 65536;

/// Run the front end from an IQ capture file to a conditioned output file.
///
/// Builds the runtime, the flow graph, and the conditioning stage from
/// configuration, wires the stage, then streams the capture through the
/// selected resampler node. The conditioned stream goes to `output_path`
/// (when given) and to any sink wired from the stage's right edge.
pub fn run_file(
    config: &KvConfig,
    role: &str,
    input_path: &Path,
    output_path: Option<&Path>,
    print_stats: bool,
) -> Result<(), String> {
    let mut runtime = Runtime::new();
    let mut graph = FlowGraph::new();

    let mut conditioner =
        ResamplerConditioner::from_config(config, role, 0, 0, &mut runtime, &LogSink)
            .map_err(|e| format!("failed to build signal conditioner: {}", e))?;
    conditioner
        .connect(&mut graph)
        .map_err(|e| format!("failed to connect signal conditioner: {}", e))?;

    log::info!(
        "conditioning {} ({} items): {} Hz -> {} Hz",
        input_path.display(),
        conditioner.item_type().token(),
        conditioner.sample_freq_in(),
        conditioner.sample_freq_out(),
    );

    let item_size = conditioner.item_size();
    let block_bytes = BLOCK_ITEMS * item_size;

    let file = File::open(input_path)
        .map_err(|e| format!("failed to open {}: {}", input_path.display(), e))?;

    let (tx, rx) = channel::bounded::<Vec<u8>>(64);

    // Reader thread feeds raw item-aligned blocks into the channel
    let reader_thread = std::thread::spawn(move || {
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        loop {
            let mut buf = vec![0u8; block_bytes];
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    // Drop a trailing partial item
                    buf.truncate(n - n % item_size);
                    if buf.is_empty() {
                        break;
                    }
                    if tx.send(buf).is_err() {
                        break; // receiver dropped
                    }
                }
                Err(e) => {
                    log::error!("read error on input file: {}", e);
                    break;
                }
            }
        }
    });

    let mut out_dump = match output_path {
        Some(path) => {
            let out_file = File::create(path)
                .map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
            Some(SampleDump::new(BufWriter::new(out_file), item_size))
        }
        None => None,
    };

    let resampler_id = conditioner.left_edge();
    let sink_edges = graph.edges_from(conditioner.right_edge());

    let mut items_in: u64 = 0;
    let mut items_out: u64 = 0;
    let stats_start = Instant::now();
    let mut last_stats = Instant::now();

    match conditioner.item_type() {
        ItemType::ComplexFloat => {
            let mut resampled: Vec<Complex32> = Vec::new();
            for buf in rx.iter() {
                let samples = decode_complex(&buf);
                items_in += samples.len() as u64;

                resampled.clear();
                let resampler = runtime
                    .resampler_mut(resampler_id)
                    .ok_or_else(|| String::from("resampler node missing from runtime"))?;
                resampler.process(&samples, &mut resampled);
                items_out += resampled.len() as u64;

                if let Some(ref mut dump) = out_dump {
                    dump.write_complex(&resampled)
                        .map_err(|e| format!("output write error: {}", e))?;
                }
                for edge in &sink_edges {
                    if let Some(sink) = runtime.file_sink_mut(edge.dst) {
                        sink.write_complex(&resampled)
                            .map_err(|e| format!("dump write error: {}", e))?;
                    }
                }

                if print_stats && last_stats.elapsed().as_secs() >= 5 {
                    print_progress(stats_start, items_in, items_out);
                    last_stats = Instant::now();
                }
            }
        }
        ItemType::Short => {
            let mut resampled: Vec<i16> = Vec::new();
            for buf in rx.iter() {
                let samples = decode_short(&buf);
                items_in += samples.len() as u64;

                resampled.clear();
                let resampler = runtime
                    .resampler_mut(resampler_id)
                    .ok_or_else(|| String::from("resampler node missing from runtime"))?;
                resampler.process(&samples, &mut resampled);
                items_out += resampled.len() as u64;

                if let Some(ref mut dump) = out_dump {
                    dump.write_short(&resampled)
                        .map_err(|e| format!("output write error: {}", e))?;
                }
                for edge in &sink_edges {
                    if let Some(sink) = runtime.file_sink_mut(edge.dst) {
                        sink.write_short(&resampled)
                            .map_err(|e| format!("dump write error: {}", e))?;
                    }
                }

                if print_stats && last_stats.elapsed().as_secs() >= 5 {
                    print_progress(stats_start, items_in, items_out);
                    last_stats = Instant::now();
                }
            }
        }
    }

    if let Some(ref mut dump) = out_dump {
        dump.flush()
            .map_err(|e| format!("output flush error: {}", e))?;
    }
    runtime
        .flush_sinks()
        .map_err(|e| format!("dump flush error: {}", e))?;

    // Unwiring at teardown is the pipeline's job, not the stage's
    conditioner
        .disconnect(&mut graph)
        .map_err(|e| format!("failed to disconnect signal conditioner: {}", e))?;

    if print_stats {
        let elapsed = stats_start.elapsed().as_secs_f64();
        eprintln!(
            "done ({:.1}s): items in: {} out: {}",
            elapsed, items_in, items_out
        );
    }

    let _ = reader_thread.join();

    Ok(())
}

/// Decode interleaved little-endian f32 I/Q pairs.
fn decode_complex(buf: &[u8]) -> Vec<Complex32> {
    let mut out = Vec::with_capacity(buf.len() / 8);
    for chunk in buf.chunks_exact(8) {
        let re = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let im = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        out.push(Complex32::new(re, im));
    }
    out
}

/// Decode little-endian i16 items.
fn decode_short(buf: &[u8]) -> Vec<i16> {
    buf.chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

fn print_progress(start: Instant, items_in: u64, items_out: u64) {
    let elapsed = start.elapsed().as_secs_f64();
    let ratio = if items_in > 0 {
        items_out as f64 / items_in as f64
    } else {
        0.0
    };
    eprintln!(
        "[{:.1}s] items in: {} out: {} ({:.4}x)",
        elapsed, items_in, items_out, ratio
    );
}
