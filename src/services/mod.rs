//! Services that sit around the pixel pipeline
//!
//! Decoding, encoding and progress reporting live here so the pipeline itself
//! never touches files or formats.

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};
