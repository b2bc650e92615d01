use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JobError;

/// What the produced file holds; decides how the fetcher locates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    /// Thumbnail extraction only, no media payload.
    Image,
}

/// Output format requested for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp4,
    Mp3,
    Wav,
    Jpg,
    Png,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 5] = [
        MediaFormat::Mp4,
        MediaFormat::Mp3,
        MediaFormat::Wav,
        MediaFormat::Jpg,
        MediaFormat::Png,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Wav => "wav",
            MediaFormat::Jpg => "jpg",
            MediaFormat::Png => "png",
        }
    }

    /// File extension of the produced file (also used for archive member names).
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn kind(self) -> MediaKind {
        match self {
            MediaFormat::Mp4 => MediaKind::Video,
            MediaFormat::Mp3 | MediaFormat::Wav => MediaKind::Audio,
            MediaFormat::Jpg | MediaFormat::Png => MediaKind::Image,
        }
    }

    /// Extensions a produced file of this format may carry on disk.
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            MediaFormat::Jpg => &["jpg", "jpeg"],
            MediaFormat::Mp4 => &["mp4"],
            MediaFormat::Mp3 => &["mp3"],
            MediaFormat::Wav => &["wav"],
            MediaFormat::Png => &["png"],
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFormat {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        MediaFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| JobError::UnsupportedFormat(s.to_string()))
    }
}
