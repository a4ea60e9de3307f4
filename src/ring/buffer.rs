use super::cursor::{Cursor, DistanceError, cyclic_distance, wrap_segments};
use super::ring_error::RingError;
use super::tag::TagSource;
use crate::block::SampleBlock;
use crate::storage::SampleStorage;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct CursorPair {
    write: Cursor,
    read: Cursor,
}

/// Fixed-capacity circular buffer over a multi-channel sample stream.
///
/// Both cursors are monotonic 64-bit sample counters; the `(cycle,
/// index)` view is derived on demand and never stored separately. One
/// producer and one consumer may operate concurrently: every cursor
/// computation happens under a single lock, and the slot ranges handed
/// to storage are disjoint between the two sides by construction.
pub struct RingBuffer<S: SampleStorage> {
    storage: S,
    capacity: u64,
    channels: usize,
    block_size: u64,
    cursors: Mutex<CursorPair>,
    tag_source: Option<Box<dyn TagSource>>,
}

impl<S: SampleStorage> RingBuffer<S> {
    pub fn new(storage: S, block_size: u64) -> Result<Self, RingError> {
        let capacity = storage.capacity();
        let channels = storage.channels();

        if capacity == 0 {
            return Err(RingError::InvalidConfig {
                value: capacity,
                reason: "capacity must be positive",
            });
        }
        if channels == 0 {
            return Err(RingError::InvalidConfig {
                value: channels as u64,
                reason: "channel count must be positive",
            });
        }
        if block_size == 0 {
            return Err(RingError::InvalidConfig {
                value: block_size,
                reason: "block size must be positive",
            });
        }
        if block_size > capacity {
            return Err(RingError::InvalidConfig {
                value: block_size,
                reason: "block size exceeds capacity",
            });
        }

        Ok(Self {
            storage,
            capacity,
            channels,
            block_size,
            cursors: Mutex::new(CursorPair {
                write: Cursor::new(capacity),
                read: Cursor::new(capacity),
            }),
            tag_source: None,
        })
    }

    pub fn set_tag_source<T: TagSource + 'static>(&mut self, source: T) {
        self.tag_source = Some(Box::new(source));
    }

    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline(always)]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Latches a consistent view of both cursors. Cursor mutations
    // commit only after storage success, so a poisoned pair is still
    // consistent.
    fn latch(&self) -> MutexGuard<'_, CursorPair> {
        self.cursors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn whole_blocks(&self, samples: u64) -> u64 {
        samples - samples % self.block_size
    }

    fn pending_locked(&self, cur: &CursorPair) -> Result<u64, RingError> {
        cyclic_distance(cur.read.total(), cur.write.total(), self.capacity).map_err(|e| match e {
            DistanceError::Behind { gap } => RingError::StaleReader {
                requested: gap,
                pending: 0,
            },
            DistanceError::Lapped { gap } => RingError::StaleReader {
                requested: gap,
                pending: self.capacity,
            },
        })
    }

    fn available_at(&self, cur: &CursorPair, target: u64) -> Result<u64, RingError> {
        let filled =
            cyclic_distance(cur.read.total(), target, self.capacity).map_err(|e| match e {
                DistanceError::Behind { gap } | DistanceError::Lapped { gap } => {
                    RingError::StaleWriter {
                        requested: gap,
                        available: 0,
                    }
                }
            })?;
        Ok(self.capacity - filled)
    }

    /// Samples written but not yet read. Fails loudly when the cursor
    /// pair has desynchronized: data was already lost and must never
    /// be masked.
    pub fn pending(&self) -> Result<u64, RingError> {
        let cur = self.latch();
        self.pending_locked(&cur)
    }

    /// `pending()` rounded down to whole blocks.
    pub fn blocks_pending(&self) -> Result<u64, RingError> {
        Ok(self.whole_blocks(self.pending()?))
    }

    /// Free slots for writing, at the current write position or at a
    /// caller-supplied absolute sample offset.
    pub fn available(&self, offset: Option<u64>) -> Result<u64, RingError> {
        let cur = self.latch();
        let target = offset.unwrap_or_else(|| cur.write.total());
        self.available_at(&cur, target)
    }

    /// `available()` rounded down to whole blocks.
    pub fn blocks_available(&self) -> Result<u64, RingError> {
        Ok(self.whole_blocks(self.available(None)?))
    }

    /// Reads `samples` samples, or all currently whole blocks when
    /// `samples` is `None`. Requests beyond `pending()` mean the
    /// reader lagged and the data is gone: `StaleReader`, distinct
    /// from the `Bounds` misuse error.
    pub fn read(&self, samples: Option<u64>) -> Result<SampleBlock, RingError> {
        let mut cur = self.latch();
        let pending = self.pending_locked(&cur)?;
        let wanted = match samples {
            None => self.whole_blocks(pending),
            Some(n) => n,
        };
        self.read_locked(&mut cur, wanted, pending)
    }

    /// Drains every pending sample, whole blocks or not.
    pub fn read_all(&self) -> Result<SampleBlock, RingError> {
        let mut cur = self.latch();
        let pending = self.pending_locked(&cur)?;
        self.read_locked(&mut cur, pending, pending)
    }

    fn read_locked(
        &self,
        cur: &mut CursorPair,
        wanted: u64,
        pending: u64,
    ) -> Result<SampleBlock, RingError> {
        if wanted > self.capacity {
            return Err(RingError::Bounds {
                requested: wanted,
                capacity: self.capacity,
            });
        }
        if wanted > pending {
            return Err(RingError::StaleReader {
                requested: wanted,
                pending,
            });
        }
        if wanted == 0 {
            return Ok(SampleBlock::empty(self.channels));
        }

        let (first, second) = wrap_segments(cur.read.index(), wanted, self.capacity);
        let mut block = self.storage.read_slots(first.index, first.len);
        if let Some(seg) = second {
            block.extend(&self.storage.read_slots(seg.index, seg.len));
        }

        cur.read.advance(wanted);
        Ok(block)
    }

    /// Writes `data` at the write cursor, or at an explicit absolute
    /// sample offset (resuming after a gap). Returns the number of
    /// samples written. Nothing commits unless every segment lands.
    pub fn write(&self, data: &SampleBlock, offset: Option<u64>) -> Result<u64, RingError> {
        if data.channels() != self.channels {
            return Err(RingError::InvalidConfig {
                value: data.channels() as u64,
                reason: "channel count does not match the buffer",
            });
        }

        let samples = data.samples() as u64;
        if samples == 0 {
            return Ok(0);
        }
        if samples > self.capacity {
            return Err(RingError::Bounds {
                requested: samples,
                capacity: self.capacity,
            });
        }

        let mut cur = self.latch();
        let target = match offset {
            Some(off) => {
                let cycle_start = cur.write.cycle() * self.capacity;
                if off < cycle_start {
                    return Err(RingError::OffsetTooOld {
                        offset: off,
                        cycle_start,
                    });
                }
                off
            }
            None => cur.write.total(),
        };

        let available = self.available_at(&cur, target)?;
        if samples > available {
            return Err(RingError::StaleWriter {
                requested: samples,
                available,
            });
        }

        let (first, second) = wrap_segments(target % self.capacity, samples, self.capacity);
        if !self
            .storage
            .write_slots(first.index, data.frames(0, first.len as usize))
        {
            return Err(RingError::StorageWrite {
                index: first.index,
                samples: first.len,
            });
        }
        if let Some(seg) = second {
            if !self
                .storage
                .write_slots(seg.index, data.frames(first.len as usize, seg.len as usize))
            {
                return Err(RingError::StorageWrite {
                    index: seg.index,
                    samples: seg.len,
                });
            }
        }

        cur.write.jump_to(target + samples);
        Ok(samples)
    }

    /// Resynchronizes the read cursor's intra-cycle index to an
    /// external tag value, either explicit or queried from the
    /// configured tag source. The tag is trusted as ground truth within the
    /// current read cycle; a resync past the write cursor surfaces on
    /// the next `pending()` instead of here.
    pub fn reset_read(&self, index: Option<u64>) -> Result<(), RingError> {
        let tag = match index {
            Some(i) => i,
            None => match &self.tag_source {
                Some(source) => source.current_tag(),
                None => {
                    return Err(RingError::InvalidConfig {
                        value: 0,
                        reason: "reset_read without an index requires a tag source",
                    });
                }
            },
        };

        if tag >= self.capacity {
            return Err(RingError::Bounds {
                requested: tag,
                capacity: self.capacity,
            });
        }

        let mut cur = self.latch();
        cur.read.resync_index(tag);
        Ok(())
    }
}
