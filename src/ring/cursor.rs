#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    total: u64,
    capacity: u64,
}

impl Cursor {
    pub fn new(capacity: u64) -> Self {
        Self { total: 0, capacity }
    }

    #[inline(always)]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline(always)]
    pub fn cycle(&self) -> u64 {
        self.total / self.capacity
    }

    #[inline(always)]
    pub fn index(&self) -> u64 {
        self.total % self.capacity
    }

    #[inline]
    pub fn advance(&mut self, samples: u64) {
        self.total += samples;
    }

    #[inline]
    pub fn jump_to(&mut self, total: u64) {
        self.total = total;
    }

    // The one escape hatch: rewrites the intra-cycle index from an
    // external tag value, keeping the current cycle.
    #[inline]
    pub fn resync_index(&mut self, index: u64) {
        debug_assert!(index < self.capacity);
        self.total = self.cycle() * self.capacity + index;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: u64,
    pub len: u64,
}

/// Splits a span starting at physical `index` into the segments it
/// occupies, wrapping at `capacity`. Precondition: `len <= capacity`,
/// so a single transfer never laps the buffer and at most two
/// segments come back.
pub fn wrap_segments(index: u64, len: u64, capacity: u64) -> (Segment, Option<Segment>) {
    debug_assert!(index < capacity);
    debug_assert!(len <= capacity);

    if index + len > capacity {
        let first = capacity - index;
        (
            Segment { index, len: first },
            Some(Segment {
                index: 0,
                len: len - first,
            }),
        )
    } else {
        (Segment { index, len }, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceError {
    /// `to` sits behind `from`; the cursors have desynchronized.
    Behind { gap: u64 },
    /// `to` ran more than `capacity` ahead of `from`; the span is no
    /// longer backed by intact slots.
    Lapped { gap: u64 },
}

/// Cyclic distance from `from` to `to`, both monotonic sample
/// counters over the same capacity.
pub fn cyclic_distance(from: u64, to: u64, capacity: u64) -> Result<u64, DistanceError> {
    if to < from {
        return Err(DistanceError::Behind { gap: from - to });
    }
    let gap = to - from;
    if gap > capacity {
        return Err(DistanceError::Lapped { gap });
    }
    Ok(gap)
}
