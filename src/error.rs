use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreviewError>;

/// Failures of a single render request. None of them leave shared state behind.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },

    #[error("failed to decode avatar: {0}")]
    AvatarDecode(String),

    #[error("avatar bytes were never delivered")]
    AvatarUnavailable,

    #[error("avatar decode timed out after {0}ms")]
    AvatarTimeout(u64),

    /// A newer request was started before this one finished.
    #[error("render request {0} was superseded by a newer request")]
    Superseded(u64),

    #[error("failed to parse SVG scene: {0}")]
    SvgParse(String),

    #[error("failed to allocate {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    PngEncode(String),

    #[error("not a repository URL: {0:?}")]
    InvalidRepositoryUrl(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
