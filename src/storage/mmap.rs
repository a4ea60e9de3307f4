use super::{SampleStorage, StoreHeader};
use crate::block::SampleBlock;
use memmap2::{MmapMut, MmapOptions};
use std::cell::UnsafeCell;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::ptr;

const SAMPLE_BYTES: usize = size_of::<f32>();

/// File-backed slot store: a validated 64-byte header followed by
/// `capacity * channels` f32 samples, memory-mapped for the life of
/// the store.
pub struct MmapStorage {
    _file: File,
    map: UnsafeCell<MmapMut>,
    capacity: u64,
    channels: usize,
}

// Concurrent access is confined to disjoint slot ranges by the ring's
// cursor arithmetic (see SampleStorage).
unsafe impl Send for MmapStorage {}
unsafe impl Sync for MmapStorage {}

impl MmapStorage {
    pub fn create<P: AsRef<Path>>(path: P, capacity: u64, channels: usize) -> io::Result<Self> {
        if capacity == 0 || channels == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Store needs at least one slot and one channel",
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let total = StoreHeader::SIZE + capacity as usize * channels * SAMPLE_BYTES;
        file.set_len(total as u64)?;

        let mut map = unsafe { MmapOptions::new().map_mut(&file)? };

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let header = StoreHeader::new(now, capacity, channels as u32);
        unsafe {
            ptr::write_unaligned(map.as_mut_ptr() as *mut StoreHeader, header);
        }

        Ok(Self {
            _file: file,
            map: UnsafeCell::new(map),
            capacity,
            channels,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let len = file.metadata()?.len() as usize;
        if len < StoreHeader::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "File too small for store header",
            ));
        }

        let map = unsafe { MmapOptions::new().map_mut(&file)? };
        let header = unsafe { ptr::read_unaligned(map.as_ptr() as *const StoreHeader) };

        if !header.validate() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid store header",
            ));
        }

        let expected =
            StoreHeader::SIZE + header.capacity as usize * header.channels as usize * SAMPLE_BYTES;
        if len != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Store length does not match header",
            ));
        }

        Ok(Self {
            _file: file,
            capacity: header.capacity,
            channels: header.channels as usize,
            map: UnsafeCell::new(map),
        })
    }

    pub fn store_header(&self) -> StoreHeader {
        let map = unsafe { &*self.map.get() };
        unsafe { ptr::read_unaligned(map.as_ptr() as *const StoreHeader) }
    }

    pub fn sync(&self) -> io::Result<()> {
        let map = unsafe { &*self.map.get() };
        map.flush()
    }

    pub fn sync_async(&self) -> io::Result<()> {
        let map = unsafe { &*self.map.get() };
        map.flush_async()
    }

    pub fn advise_sequential(&self) {
        let map = unsafe { &*self.map.get() };
        unsafe {
            libc::madvise(
                map.as_ptr() as *mut libc::c_void,
                map.len(),
                libc::MADV_SEQUENTIAL,
            );
        }
    }

    pub fn advise_willneed(&self) {
        let map = unsafe { &*self.map.get() };
        unsafe {
            libc::madvise(
                map.as_ptr() as *mut libc::c_void,
                map.len(),
                libc::MADV_WILLNEED,
            );
        }
    }

    #[inline]
    fn slot_offset(&self, index: u64) -> usize {
        StoreHeader::SIZE + index as usize * self.channels * SAMPLE_BYTES
    }
}

impl SampleStorage for MmapStorage {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn read_slots(&self, index: u64, len: u64) -> SampleBlock {
        let count = len as usize * self.channels;
        let map = unsafe { &*self.map.get() };
        let data = unsafe {
            let src = map.as_ptr().add(self.slot_offset(index)) as *const f32;
            std::slice::from_raw_parts(src, count).to_vec()
        };
        SampleBlock::from_interleaved(self.channels, data)
    }

    fn write_slots(&self, index: u64, frames: &[f32]) -> bool {
        if index + (frames.len() / self.channels) as u64 > self.capacity {
            return false;
        }
        let map = unsafe { &mut *self.map.get() };
        unsafe {
            let dst = map.as_mut_ptr().add(self.slot_offset(index)) as *mut f32;
            ptr::copy_nonoverlapping(frames.as_ptr(), dst, frames.len());
        }
        true
    }
}

impl Drop for MmapStorage {
    fn drop(&mut self) {
        let _ = self.sync();
    }
}
