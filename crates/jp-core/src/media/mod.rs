//! Output formats and how each maps onto downloader arguments.

mod format;
mod strategy;

pub use format::{MediaFormat, MediaKind};
pub use strategy::{Strategy, AUDIO_BITRATES, VIDEO_HEIGHTS};
