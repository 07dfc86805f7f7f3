//! Live video: source resolution, decode in an `ffmpeg` child process, and frame pacing.

pub mod decode;
pub mod pacer;
pub mod resolve;
pub mod scheduler;

pub use decode::{CropPercent, DecodeSettings, StreamDecoder};
pub use pacer::FramePacer;
pub use resolve::{FfprobeResolver, ResolvedStream, StreamResolver, YtDlpResolver};
pub use scheduler::{StreamFrame, StreamScheduler, discard_buffered};
