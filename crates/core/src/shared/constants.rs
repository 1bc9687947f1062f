/// Gaussian kernel width for blurred segments, in pixels. Odd.
pub const DEFAULT_BLUR_KERNEL: usize = 99;

/// x264 constant rate factor; lower is better quality.
pub const DEFAULT_CRF: u8 = 18;
pub const DEFAULT_PRESET: &str = "medium";

pub const DEFAULT_AUDIO_BIT_RATE: usize = 192_000;

/// Bounded channel depth between pipeline stages.
pub const PIPELINE_QUEUE_DEPTH: usize = 8;

/// Prefix of the scratch directory created next to the output file.
pub const SCRATCH_DIR_PREFIX: &str = ".cutguard-";
