/// Owned, channel-interleaved sample block. Frames are stored
/// frame-major: `data.len() == samples * channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    channels: usize,
    data: Vec<f32>,
}

impl SampleBlock {
    pub fn empty(channels: usize) -> Self {
        assert!(channels > 0);
        Self {
            channels,
            data: Vec::new(),
        }
    }

    pub fn from_interleaved(channels: usize, data: Vec<f32>) -> Self {
        assert!(channels > 0);
        assert!(data.len() % channels == 0);
        Self { channels, data }
    }

    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline(always)]
    pub fn samples(&self) -> usize {
        self.data.len() / self.channels
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_interleaved(&self) -> &[f32] {
        &self.data
    }

    /// Interleaved view of `len` frames starting at frame `start`.
    #[inline]
    pub fn frames(&self, start: usize, len: usize) -> &[f32] {
        let s = start * self.channels;
        let e = s + len * self.channels;
        &self.data[s..e]
    }

    /// Appends `other` along the sample axis.
    pub fn extend(&mut self, other: &SampleBlock) {
        assert!(other.channels == self.channels);
        self.data.extend_from_slice(&other.data);
    }
}
