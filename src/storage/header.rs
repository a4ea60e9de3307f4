#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StoreHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub created_at: i64,
    pub capacity: u64,
    pub channels: u32,
    pub sample_bits: u32,
    pub _reserved: [u8; 32],
}

impl StoreHeader {
    pub const SIZE: usize = 64;
    pub const MAGIC: [u8; 4] = *b"RDAQ";
    pub const VERSION: u32 = 1;
    pub const SAMPLE_BITS: u32 = 32;

    pub fn new(created_at: i64, capacity: u64, channels: u32) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            created_at,
            capacity,
            channels,
            sample_bits: Self::SAMPLE_BITS,
            _reserved: [0; 32],
        }
    }

    #[inline]
    pub fn validate(&self) -> bool {
        self.magic == Self::MAGIC
            && self.version == Self::VERSION
            && self.sample_bits == Self::SAMPLE_BITS
            && self.capacity > 0
            && self.channels > 0
    }
}
