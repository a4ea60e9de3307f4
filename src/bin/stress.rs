use ringdaq::block::SampleBlock;
use ringdaq::ring::{RingBuffer, RingError};
use ringdaq::storage::MmapStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const STORE_PATH: &str = "/tmp/ringdaq_stress.store";
const CAPACITY: u64 = 64 * 1024;
const BLOCK: usize = 4096;

// Keeps the ramp exactly representable in f32.
const RAMP_MOD: u64 = 1_000_000;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("ringdaq producer/consumer stress over a mapped store\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let storage = MmapStorage::create(STORE_PATH, CAPACITY, 1)?;
    let ring = RingBuffer::new(storage, BLOCK as u64)?;

    let (written, read, mismatches) =
        std::thread::scope(|scope| -> (u64, u64, u64) {
            let writer_running = running.clone();
            let writer_ring = &ring;
            let writer = scope.spawn(move || {
                let mut written = 0u64;
                while writer_running.load(Ordering::Relaxed) {
                    let values: Vec<f32> = (0..BLOCK as u64)
                        .map(|i| ((written + i) % RAMP_MOD) as f32)
                        .collect();
                    let block = SampleBlock::from_interleaved(1, values);
                    match writer_ring.write(&block, None) {
                        Ok(n) => written += n,
                        Err(RingError::StaleWriter { .. }) => std::thread::yield_now(),
                        Err(e) => {
                            eprintln!("writer: {}", e);
                            break;
                        }
                    }
                }
                written
            });

            let reader_running = running.clone();
            let reader_ring = &ring;
            let reader = scope.spawn(move || {
                let mut read = 0u64;
                let mut mismatches = 0u64;
                loop {
                    let block = reader_ring.read(None).expect("ring desynchronized");
                    for &value in block.as_interleaved() {
                        if value != (read % RAMP_MOD) as f32 {
                            mismatches += 1;
                        }
                        read += 1;
                    }
                    if block.is_empty() {
                        if !reader_running.load(Ordering::Relaxed) {
                            break;
                        }
                        std::thread::yield_now();
                    }
                }
                (read, mismatches)
            });

            println!("Running for 5 seconds...");
            std::thread::sleep(Duration::from_secs(5));
            running.store(false, Ordering::SeqCst);

            let written = writer.join().unwrap();
            let (read, mismatches) = reader.join().unwrap();
            (written, read, mismatches)
        });

    let tail = ring.read_all()?;
    ring.storage().sync()?;

    let file_size = std::fs::metadata(STORE_PATH).map(|m| m.len()).unwrap_or(0);

    println!("\nResults:");
    println!("  Written to ring: {} samples", written);
    println!("  Drained: {} samples (+{} in the final partial block)", read, tail.samples());
    println!("  Sequence mismatches: {}", mismatches);
    println!(
        "  Throughput: {:.2}M samples/sec",
        written as f64 / 5.0 / 1_000_000.0
    );
    println!("  Store size: {:.2} MB", file_size as f64 / 1024.0 / 1024.0);

    std::fs::remove_file(STORE_PATH).ok();

    Ok(())
}
