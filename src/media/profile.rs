use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::errors::{ConvertError, ConvertResult};

pub const VIDEO_CONTAINER: &str = "mp4";
pub const AUDIO_CODEC: &str = "mp3";
/// Target bitrate of the audio extraction step, in kbps
pub const AUDIO_QUALITY_KBPS: u32 = 192;

/// What the user asked for on the form
#[derive(EnumIter, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    #[strum(to_string = "video", serialize = "mp4")]
    Video,
    #[strum(to_string = "audio", serialize = "mp3")]
    Audio,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Video => "video/mp4",
            OutputFormat::Audio => "audio/mpeg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Video => "Video (MP4)",
            OutputFormat::Audio => "Audio (MP3)",
        }
    }
}

/// Audio extraction performed after download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessing {
    pub codec: &'static str,
    pub quality_kbps: u32,
}

/// Concrete yt-dlp choices derived from an [`OutputFormat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionProfile {
    pub format: OutputFormat,
    /// yt-dlp `-f` expression, best tier first
    pub stream_selection: &'static str,
    /// Extension of the final file
    pub extension: &'static str,
    /// Container streams are merged into, when they are downloaded split
    pub merge_container: Option<&'static str>,
    pub post_processing: Option<PostProcessing>,
    pub verbose: bool,
}

impl AcquisitionProfile {
    pub fn video(verbose: bool) -> Self {
        Self {
            format: OutputFormat::Video,
            // Prefer mp4 video + m4a audio, then a single mp4 stream, then anything
            stream_selection: "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            extension: VIDEO_CONTAINER,
            merge_container: Some(VIDEO_CONTAINER),
            post_processing: None,
            verbose,
        }
    }

    pub fn audio(verbose: bool) -> Self {
        Self {
            format: OutputFormat::Audio,
            stream_selection: "bestaudio/best",
            extension: AUDIO_CODEC,
            merge_container: None,
            post_processing: Some(PostProcessing {
                codec: AUDIO_CODEC,
                quality_kbps: AUDIO_QUALITY_KBPS,
            }),
            verbose,
        }
    }

    pub fn filename(&self, sanitized_title: &str) -> String {
        format!("{}.{}", sanitized_title, self.extension)
    }

    /// Extensions the best-effort directory scan may accept
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        &[VIDEO_CONTAINER, AUDIO_CODEC]
    }

    /// Merging split streams and audio extraction both go through ffmpeg
    pub fn needs_transcoder(&self) -> bool {
        self.merge_container.is_some() || self.post_processing.is_some()
    }
}

/// Maps a raw form value to a profile. Purely local, never touches the network.
pub fn select_profile(format: &str, verbose: bool) -> ConvertResult<AcquisitionProfile> {
    let parsed = OutputFormat::from_str(format.trim())
        .map_err(|_| ConvertError::unsupported_format(format.trim()))?;

    Ok(match parsed {
        OutputFormat::Video => AcquisitionProfile::video(verbose),
        OutputFormat::Audio => AcquisitionProfile::audio(verbose),
    })
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn video_profile_merges_into_mp4() {
        let profile = select_profile("video", true).unwrap();
        assert_eq!(profile.format, OutputFormat::Video);
        assert_eq!(profile.merge_container, Some("mp4"));
        assert!(profile.post_processing.is_none());
        assert!(profile.stream_selection.starts_with("bestvideo"));
        assert!(profile.stream_selection.ends_with("/best"));
        assert_eq!(profile.filename("My-Test-Video"), "My-Test-Video.mp4");
    }

    #[test]
    fn audio_profile_always_extracts_at_fixed_quality() {
        let profile = select_profile("audio", false).unwrap();
        assert_eq!(
            profile.post_processing,
            Some(PostProcessing {
                codec: "mp3",
                quality_kbps: 192
            })
        );
        assert!(!profile.verbose);
        assert_eq!(profile.filename("song"), "song.mp3");
    }

    #[test]
    fn legacy_values_and_case_are_accepted() {
        assert_eq!(select_profile("mp4", true).unwrap().format, OutputFormat::Video);
        assert_eq!(select_profile(" MP3 ", true).unwrap().format, OutputFormat::Audio);
        assert_eq!(select_profile("Video", true).unwrap().format, OutputFormat::Video);
    }

    #[test]
    fn unknown_formats_are_rejected() {
        for raw in ["", "flac", "webm", "videoo", "audio/mpeg"] {
            match select_profile(raw, true) {
                Err(ConvertError::UnsupportedFormat(_)) => {}
                other => panic!("expected UnsupportedFormat for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn every_format_needs_a_transcoder_and_has_a_content_type() {
        for format in OutputFormat::iter() {
            let profile = select_profile(&format.to_string(), true).unwrap();
            assert!(profile.needs_transcoder());
            assert!(profile.accepted_extensions().contains(&profile.extension));
            assert!(!format.content_type().is_empty());
        }
    }
}
