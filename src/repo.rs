use crate::error::{PreviewError, Result};
use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::oneshot;

static REPO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([^/\s?#]+)/([^/\s?#]+)").unwrap()
});

/// Repository fields drawn on the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub owner: String,
    pub name: String,
    /// May contain `\n` forced line breaks.
    pub description: String,
}

impl RepositoryMetadata {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// `<owner>_<name>_preview.png`
    pub fn preview_filename(&self) -> String {
        format!("{}_{}_preview.png", self.owner, self.name)
    }
}

/// Where the avatar bitmap comes from.
#[derive(Debug)]
pub enum AvatarSource {
    /// Encoded PNG or JPEG bytes, decoded off the render task.
    Bytes(Vec<u8>),
    /// An already decoded bitmap.
    Bitmap(RgbaImage),
    /// Encoded bytes still being delivered by whoever fetches them.
    Pending(oneshot::Receiver<Vec<u8>>),
}

impl AvatarSource {
    /// A source paired with the sender that will complete it.
    pub fn pending() -> (oneshot::Sender<Vec<u8>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::Pending(rx))
    }
}

impl From<Vec<u8>> for AvatarSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<RgbaImage> for AvatarSource {
    fn from(bitmap: RgbaImage) -> Self {
        Self::Bitmap(bitmap)
    }
}

#[derive(Debug)]
pub struct PreviewRequest {
    pub metadata: RepositoryMetadata,
    pub avatar: AvatarSource,
}

impl PreviewRequest {
    pub fn new(metadata: RepositoryMetadata, avatar: impl Into<AvatarSource>) -> Self {
        Self {
            metadata,
            avatar: avatar.into(),
        }
    }
}

/// Extract `(owner, repo)` from a `github.com/<owner>/<repo>` URL.
pub fn parse_repository_url(url: &str) -> Result<(String, String)> {
    let trimmed = url.trim();
    let caps = REPO_URL_RE
        .captures(trimmed)
        .ok_or_else(|| PreviewError::InvalidRepositoryUrl(trimmed.to_string()))?;
    let owner = caps[1].to_string();
    let repo = caps[2].trim_end_matches(".git").to_string();
    if repo.is_empty() {
        return Err(PreviewError::InvalidRepositoryUrl(trimmed.to_string()));
    }
    Ok((owner, repo))
}
