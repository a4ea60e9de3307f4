use ringdaq::block::SampleBlock;
use ringdaq::ring::{RingBuffer, RingError};
use ringdaq::storage::HeapStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const CAPACITY: u64 = 32 * 1024;
const CHANNELS: usize = 2;
const BLOCK_SIZE: u64 = 1024;

fn synth_block(start: u64, samples: usize) -> SampleBlock {
    let mut data = Vec::with_capacity(samples * CHANNELS);
    for i in 0..samples {
        let phase = (start + i as u64) as f32 * 0.01;
        data.push(phase.sin());
        data.push(phase.cos());
    }
    SampleBlock::from_interleaved(CHANNELS, data)
}

fn main() {
    println!("ringdaq v0.1.0");
    println!("Press Ctrl+C to stop\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Failed to set Ctrl+C handler");

    let ring = Arc::new(RingBuffer::new(HeapStorage::new(CAPACITY, CHANNELS), BLOCK_SIZE).unwrap());

    let producer_ring = ring.clone();
    let producer_running = running.clone();
    let producer = std::thread::spawn(move || {
        let mut produced = 0u64;
        while producer_running.load(Ordering::SeqCst) {
            let block = synth_block(produced, BLOCK_SIZE as usize);
            match producer_ring.write(&block, None) {
                Ok(n) => produced += n,
                Err(RingError::StaleWriter { .. }) => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(e) => {
                    eprintln!("producer: {}", e);
                    break;
                }
            }
        }
        produced
    });

    let mut total_samples = 0u64;
    let mut last_report = Instant::now();

    println!("Acquisition running. Draining whole blocks...");

    while running.load(Ordering::SeqCst) {
        let block = ring.read(None).expect("ring desynchronized");
        total_samples += block.samples() as u64;

        if last_report.elapsed() >= Duration::from_secs(5) {
            println!(
                "[STATUS] samples_read={} pending={} blocks_pending={}",
                total_samples,
                ring.pending().unwrap_or(0),
                ring.blocks_pending().unwrap_or(0)
            );
            last_report = Instant::now();
        }

        if block.is_empty() {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    let produced = producer.join().unwrap();
    let tail = ring.read_all().expect("ring desynchronized");
    total_samples += tail.samples() as u64;

    println!("Samples produced: {}", produced);
    println!("Samples consumed: {}", total_samples);
}
