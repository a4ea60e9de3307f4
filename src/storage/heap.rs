use super::SampleStorage;
use crate::block::SampleBlock;
use std::cell::UnsafeCell;

pub struct HeapStorage {
    slots: UnsafeCell<Box<[f32]>>,
    capacity: u64,
    channels: usize,
}

// Concurrent access is confined to disjoint slot ranges by the ring's
// cursor arithmetic (see SampleStorage).
unsafe impl Send for HeapStorage {}
unsafe impl Sync for HeapStorage {}

impl HeapStorage {
    pub fn new(capacity: u64, channels: usize) -> Self {
        assert!(capacity > 0);
        assert!(channels > 0);
        Self {
            slots: UnsafeCell::new(vec![0.0; capacity as usize * channels].into_boxed_slice()),
            capacity,
            channels,
        }
    }
}

impl SampleStorage for HeapStorage {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn read_slots(&self, index: u64, len: u64) -> SampleBlock {
        let start = index as usize * self.channels;
        let end = start + len as usize * self.channels;
        let slots = unsafe { &*self.slots.get() };
        SampleBlock::from_interleaved(self.channels, slots[start..end].to_vec())
    }

    fn write_slots(&self, index: u64, frames: &[f32]) -> bool {
        if index + (frames.len() / self.channels) as u64 > self.capacity {
            return false;
        }
        let start = index as usize * self.channels;
        let slots = unsafe { &mut *self.slots.get() };
        slots[start..start + frames.len()].copy_from_slice(frames);
        true
    }
}
