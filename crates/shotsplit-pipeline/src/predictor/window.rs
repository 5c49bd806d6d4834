//! Sliding-window plan for TransNetV2 inference.
//!
//! The network sees 100 frames at a time and only its central 50 outputs are
//! trusted. The frame sequence is padded so every real frame lands in the
//! center of exactly one window.

/// Frames per model input window.
pub const WINDOW_SIZE: usize = 100;
/// Step between consecutive windows.
pub const STRIDE: usize = 50;
/// First trusted output inside a window.
pub const CENTER_START: usize = 25;
/// One past the last trusted output inside a window.
pub const CENTER_END: usize = 75;

/// Model input frame geometry.
pub const FRAME_WIDTH: u32 = 48;
pub const FRAME_HEIGHT: u32 = 27;
pub const FRAME_CHANNELS: usize = 3;

/// Padding and window layout for a video of `total_frames` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    pub total_frames: usize,
    /// Copies of the first frame prepended
    pub pad_start: usize,
    /// Copies of the last frame appended
    pub pad_end: usize,
}

impl WindowPlan {
    pub fn new(total_frames: usize) -> Self {
        let remainder = match total_frames % STRIDE {
            0 => STRIDE,
            r => r,
        };
        Self {
            total_frames,
            pad_start: CENTER_START,
            pad_end: CENTER_START + STRIDE - remainder,
        }
    }

    /// Length of the padded frame sequence.
    pub fn padded_len(&self) -> usize {
        self.pad_start + self.total_frames + self.pad_end
    }

    /// Number of windows to run.
    pub fn window_count(&self) -> usize {
        if self.total_frames == 0 {
            return 0;
        }
        (self.padded_len() - WINDOW_SIZE) / STRIDE + 1
    }

    /// Source frame index for a position in the padded sequence.
    pub fn source_index(&self, padded_index: usize) -> usize {
        padded_index
            .saturating_sub(self.pad_start)
            .min(self.total_frames.saturating_sub(1))
    }

    /// Padded-sequence start offset of each window.
    pub fn window_starts(&self) -> impl Iterator<Item = usize> {
        (0..self.window_count()).map(|w| w * STRIDE)
    }
}

/// Build one `[WINDOW_SIZE, H, W, C]` f32 window from packed RGB24 frames.
///
/// `frame_at` maps a source frame index to its bytes.
pub fn build_window<'a, F>(plan: &WindowPlan, start: usize, frame_at: F) -> Vec<f32>
where
    F: Fn(usize) -> &'a [u8],
{
    let frame_len = FRAME_WIDTH as usize * FRAME_HEIGHT as usize * FRAME_CHANNELS;
    let mut data = Vec::with_capacity(WINDOW_SIZE * frame_len);
    for offset in 0..WINDOW_SIZE {
        let bytes = frame_at(plan.source_index(start + offset));
        data.extend(bytes.iter().map(|&b| b as f32));
    }
    data
}

/// Keep the trusted center of each window's outputs and truncate to the
/// real frame count.
pub fn stitch_centers<I>(windows: I, total_frames: usize) -> Vec<f32>
where
    I: IntoIterator<Item = Vec<f32>>,
{
    let mut out = Vec::with_capacity(total_frames + STRIDE);
    for window in windows {
        let end = CENTER_END.min(window.len());
        if CENTER_START < end {
            out.extend_from_slice(&window[CENTER_START..end]);
        }
    }
    out.truncate(total_frames);
    out
}
