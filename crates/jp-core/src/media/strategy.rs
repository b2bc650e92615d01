//! Static strategy table: each format declares how the download tool is driven.

use super::format::MediaFormat;

/// Video quality label -> format selector (best video not taller than N lines plus best audio).
pub const VIDEO_HEIGHTS: &[(&str, &str)] = &[
    ("2160p", "bestvideo[height<=2160]+bestaudio/best"),
    ("1440p", "bestvideo[height<=1440]+bestaudio/best"),
    ("1080p", "bestvideo[height<=1080]+bestaudio/best"),
    ("720p", "bestvideo[height<=720]+bestaudio/best"),
    ("480p", "bestvideo[height<=480]+bestaudio/best"),
    ("360p", "bestvideo[height<=360]+bestaudio/best"),
    ("best", "bestvideo+bestaudio/best"),
];

/// Audio quality label -> `--audio-quality` value ("0" = best available VBR).
pub const AUDIO_BITRATES: &[(&str, &str)] = &[
    ("320kbps", "320K"),
    ("256kbps", "256K"),
    ("192kbps", "192K"),
    ("128kbps", "128K"),
    ("best", "0"),
];

const VIDEO_FALLBACK: &str = "bestvideo+bestaudio/best";
const MP3_FALLBACK: &str = "192K";

/// How one format is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Download video and audio streams and merge into `container`.
    MergedVideo { container: &'static str },
    /// Download best audio and convert to `codec`; `bitrates` is None when the codec ignores quality.
    ExtractAudio {
        codec: &'static str,
        bitrates: Option<&'static [(&'static str, &'static str)]>,
        fallback: Option<&'static str>,
    },
    /// Skip the media payload and convert the thumbnail to `convert_to`.
    Thumbnail { convert_to: &'static str },
}

fn lookup(table: &[(&str, &'static str)], label: &str) -> Option<&'static str> {
    let label = label.trim();
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(label))
        .map(|(_, v)| *v)
}

impl Strategy {
    pub fn for_format(format: MediaFormat) -> Strategy {
        match format {
            MediaFormat::Mp4 => Strategy::MergedVideo { container: "mp4" },
            MediaFormat::Mp3 => Strategy::ExtractAudio {
                codec: "mp3",
                bitrates: Some(AUDIO_BITRATES),
                fallback: Some(MP3_FALLBACK),
            },
            MediaFormat::Wav => Strategy::ExtractAudio {
                codec: "wav",
                bitrates: None,
                fallback: None,
            },
            MediaFormat::Jpg => Strategy::Thumbnail { convert_to: "jpg" },
            MediaFormat::Png => Strategy::Thumbnail { convert_to: "png" },
        }
    }

    /// Format-specific arguments for the given quality label. Unknown labels fall back
    /// to the format's default rather than failing the job.
    pub fn args(&self, quality: Option<&str>) -> Vec<String> {
        match *self {
            Strategy::MergedVideo { container } => {
                let selector = quality
                    .and_then(|q| lookup(VIDEO_HEIGHTS, q))
                    .unwrap_or(VIDEO_FALLBACK);
                vec![
                    "-f".into(),
                    selector.into(),
                    "--merge-output-format".into(),
                    container.into(),
                ]
            }
            Strategy::ExtractAudio {
                codec,
                bitrates,
                fallback,
            } => {
                let mut args = vec![
                    "-f".into(),
                    "bestaudio/best".into(),
                    "--extract-audio".into(),
                    "--audio-format".into(),
                    codec.into(),
                ];
                if let Some(table) = bitrates {
                    let value = quality.and_then(|q| lookup(table, q)).or(fallback);
                    if let Some(value) = value {
                        args.push("--audio-quality".into());
                        args.push(value.into());
                    }
                }
                args
            }
            Strategy::Thumbnail { convert_to } => vec![
                "--skip-download".into(),
                "--write-thumbnail".into(),
                "--convert-thumbnails".into(),
                convert_to.into(),
            ],
        }
    }
}
