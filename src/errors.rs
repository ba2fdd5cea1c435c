use std::fmt;

/// Central error type of the conversion pipeline
#[derive(Debug)]
pub enum ConvertError {
    /// URL is empty, malformed or not on the host allowlist
    InvalidUrl(String),
    /// Requested output format is neither video nor audio
    UnsupportedFormat(String),
    /// Metadata fetch failed
    Extraction(String),
    /// ffmpeg is not available to the extractor
    MissingTranscoder(String),
    /// Fetch or transcode failed
    Acquisition(String),
    /// Extractor reported success but no file could be found
    ArtifactNotFound(String),
    /// Workspace I/O failed
    FileSystem(std::io::Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::InvalidUrl(url) => {
                write!(f, "Invalid URL '{}'. Please enter a proper YouTube link.", url)
            }
            ConvertError::UnsupportedFormat(format) => {
                write!(f, "Unsupported output format '{}'. Choose video or audio.", format)
            }
            ConvertError::Extraction(msg) => {
                write!(f, "Could not read video information: {}", msg)
            }
            ConvertError::MissingTranscoder(tool) => write!(
                f,
                "Missing dependency: {} is required for conversion. Please install {}.",
                tool, tool
            ),
            ConvertError::Acquisition(msg) => {
                write!(f, "An unexpected error occurred during download: {}", msg)
            }
            ConvertError::ArtifactNotFound(title) => write!(
                f,
                "Download appeared successful, but final file for '{}' could not be located.",
                title
            ),
            ConvertError::FileSystem(e) => write!(f, "File system error: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::FileSystem(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::FileSystem(err)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Extraction(format!("JSON parsing error: {}", err))
    }
}

impl ConvertError {
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl(url.into())
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn missing_transcoder(tool: impl Into<String>) -> Self {
        Self::MissingTranscoder(tool.into())
    }

    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn artifact_not_found(title: impl Into<String>) -> Self {
        Self::ArtifactNotFound(title.into())
    }
}

/// Result of pipeline operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Startup configuration failure
#[derive(Debug)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid value for {}: {}", self.variable, self.message)
    }
}

impl std::error::Error for ConfigError {}
