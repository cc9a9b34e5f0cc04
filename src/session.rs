use crate::config::{AvatarFallback, AvatarSettings, PreviewConfig};
use crate::error::{PreviewError, Result};
use crate::export::Preview;
use crate::layout::{PreviewLayout, compute_layout};
use crate::render::Canvas;
use crate::repo::{AvatarSource, PreviewRequest, RepositoryMetadata};
use crate::text_metrics::{FontMetrics, TextMeasure, system_font_database};
use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use usvg::fontdb::Database;

/// Renders previews, one active request at a time.
///
/// Starting a request supersedes every request started earlier on this
/// renderer or any of its clones; a superseded request finishes with
/// [`PreviewError::Superseded`] instead of publishing an image.
#[derive(Clone)]
pub struct PreviewRenderer {
    config: PreviewConfig,
    fonts: Arc<Database>,
    measure: Arc<dyn TextMeasure>,
    active: Arc<AtomicU64>,
}

impl PreviewRenderer {
    pub fn new(config: PreviewConfig, fonts: Arc<Database>) -> Self {
        let metrics = FontMetrics::new(&fonts, &[config.fonts.family.as_str()]);
        Self::with_measure(config, fonts, Arc::new(metrics))
    }

    pub fn with_system_fonts(config: PreviewConfig) -> Self {
        Self::new(config, system_font_database())
    }

    /// Uses `measure` for layout while rasterizing text with `fonts`.
    pub fn with_measure(
        config: PreviewConfig,
        fonts: Arc<Database>,
        measure: Arc<dyn TextMeasure>,
    ) -> Self {
        Self {
            config,
            fonts,
            measure,
            active: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn layout(&self, metadata: &RepositoryMetadata) -> PreviewLayout {
        compute_layout(metadata, &self.config, self.measure.as_ref())
    }

    /// Id of the most recently started request; 0 before the first one.
    pub fn active_request(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Lays out the request and paints everything that does not need the avatar.
    pub fn start(&self, request: PreviewRequest) -> Result<PendingPreview> {
        self.config.style.validate()?;
        let ticket = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let PreviewRequest { metadata, avatar } = request;

        let layout = self.layout(&metadata);
        let mut canvas = Canvas::new(layout.width, layout.height, self.fonts.clone())?;
        canvas.paint_base(&layout)?;
        log::debug!(
            "request {ticket}: base layer ready for {}/{} (title {}px, description {}px x {} lines)",
            metadata.owner,
            metadata.name,
            layout.title.font_size,
            layout.description.font_size,
            layout.description.lines.len()
        );

        Ok(PendingPreview {
            ticket,
            active: self.active.clone(),
            canvas,
            layout,
            avatar,
            settings: self.config.avatar.clone(),
            filename: metadata.preview_filename(),
        })
    }

    pub async fn render(&self, request: PreviewRequest) -> Result<Preview> {
        self.start(request)?.finish().await
    }
}

/// A request whose base layer is drawn and whose avatar is still outstanding.
pub struct PendingPreview {
    ticket: u64,
    active: Arc<AtomicU64>,
    canvas: Canvas,
    layout: PreviewLayout,
    avatar: AvatarSource,
    settings: AvatarSettings,
    filename: String,
}

impl PendingPreview {
    pub fn request_id(&self) -> u64 {
        self.ticket
    }

    pub fn layout(&self) -> &PreviewLayout {
        &self.layout
    }

    pub fn is_current(&self) -> bool {
        self.active.load(Ordering::SeqCst) == self.ticket
    }

    /// Waits for the avatar, then paints it and the signature and exports the PNG.
    pub async fn finish(self) -> Result<Preview> {
        let PendingPreview {
            ticket,
            active,
            mut canvas,
            layout,
            avatar,
            settings,
            filename,
        } = self;

        let decoded = match settings.decode_timeout() {
            Some(limit) => tokio::time::timeout(limit, load_avatar(avatar))
                .await
                .unwrap_or_else(|_| Err(PreviewError::AvatarTimeout(limit.as_millis() as u64))),
            None => load_avatar(avatar).await,
        };

        if active.load(Ordering::SeqCst) != ticket {
            log::debug!("request {ticket}: avatar arrived after a newer request started; dropped");
            return Err(PreviewError::Superseded(ticket));
        }

        let painted = decoded.and_then(|bitmap| canvas.paint_avatar(&layout.avatar, &bitmap));
        if let Err(err) = painted {
            match settings.fallback {
                AvatarFallback::Fail => return Err(err),
                AvatarFallback::Placeholder => {
                    log::warn!("request {ticket}: {err}; drawing placeholder avatar");
                    canvas.paint_avatar_placeholder(&layout.avatar, &layout.signature.color);
                }
            }
        }

        canvas.paint_signature(&layout)?;
        Preview::from_canvas(canvas, filename)
    }
}

async fn load_avatar(source: AvatarSource) -> Result<RgbaImage> {
    let bytes = match source {
        AvatarSource::Bitmap(bitmap) => return Ok(bitmap),
        AvatarSource::Bytes(bytes) => bytes,
        AvatarSource::Pending(rx) => rx.await.map_err(|_| PreviewError::AvatarUnavailable)?,
    };
    tokio::task::spawn_blocking(move || decode_avatar(&bytes))
        .await
        .map_err(|err| PreviewError::AvatarDecode(err.to_string()))?
}

/// Decodes PNG or JPEG bytes into an RGBA bitmap.
pub fn decode_avatar(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|err| PreviewError::AvatarDecode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FallbackMetrics;
    use std::io::Cursor;

    fn renderer(config: PreviewConfig) -> PreviewRenderer {
        PreviewRenderer::with_measure(config, Arc::new(Database::new()), Arc::new(FallbackMetrics))
    }

    fn metadata() -> RepositoryMetadata {
        RepositoryMetadata::new("octocat", "Hello-World", "My first repository on GitHub!")
    }

    fn png_avatar() -> Vec<u8> {
        let bitmap = RgbaImage::from_pixel(4, 4, image::Rgba([0, 128, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(bitmap)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn decode_avatar_reads_png() {
        let bitmap = decode_avatar(&png_avatar()).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 4));
        assert_eq!(bitmap.get_pixel(0, 0).0, [0, 128, 255, 255]);
    }

    #[test]
    fn decode_avatar_rejects_garbage() {
        assert!(matches!(
            decode_avatar(b"not an image"),
            Err(PreviewError::AvatarDecode(_))
        ));
    }

    #[test]
    fn start_issues_increasing_request_ids() {
        let renderer = renderer(PreviewConfig::default());
        assert_eq!(renderer.active_request(), 0);
        let first = renderer.start(PreviewRequest::new(metadata(), png_avatar())).unwrap();
        let second = renderer.clone().start(PreviewRequest::new(metadata(), png_avatar())).unwrap();
        assert_eq!(first.request_id(), 1);
        assert_eq!(second.request_id(), 2);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(renderer.active_request(), 2);
    }

    #[test]
    fn invalid_style_fails_before_issuing_a_request() {
        let mut config = PreviewConfig::default();
        config.style.background = "nope".to_string();
        let renderer = renderer(config);
        assert!(matches!(
            renderer.start(PreviewRequest::new(metadata(), png_avatar())),
            Err(PreviewError::InvalidColor { field: "background", .. })
        ));
        assert_eq!(renderer.active_request(), 0);
    }

    #[tokio::test]
    async fn renders_from_encoded_bytes() {
        let preview = renderer(PreviewConfig::default())
            .render(PreviewRequest::new(metadata(), png_avatar()))
            .await
            .unwrap();
        assert_eq!((preview.width, preview.height), (1280, 640));
        assert_eq!(preview.filename, "octocat_Hello-World_preview.png");
        assert!(preview.png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[tokio::test]
    async fn superseded_request_is_not_published() {
        let renderer = renderer(PreviewConfig::default());
        let (tx, avatar) = AvatarSource::pending();
        let first = renderer.start(PreviewRequest::new(metadata(), avatar)).unwrap();
        let second = renderer.start(PreviewRequest::new(metadata(), png_avatar())).unwrap();

        tx.send(png_avatar()).unwrap();
        assert!(matches!(first.finish().await, Err(PreviewError::Superseded(1))));
        assert!(second.finish().await.is_ok());
    }

    #[tokio::test]
    async fn dropped_sender_surfaces_failure() {
        let (tx, avatar) = AvatarSource::pending();
        drop(tx);
        let result = renderer(PreviewConfig::default())
            .render(PreviewRequest::new(metadata(), avatar))
            .await;
        assert!(matches!(result, Err(PreviewError::AvatarUnavailable)));
    }

    #[tokio::test]
    async fn placeholder_policy_finishes_without_avatar() {
        let mut config = PreviewConfig::default();
        config.avatar.fallback = AvatarFallback::Placeholder;
        let preview = renderer(config)
            .render(PreviewRequest::new(metadata(), b"garbage".to_vec()))
            .await
            .unwrap();
        assert_eq!(preview.width, 1280);
    }

    #[tokio::test]
    async fn hung_decode_times_out_when_configured() {
        let mut config = PreviewConfig::default();
        config.avatar.decode_timeout_ms = Some(20);
        let (_tx, avatar) = AvatarSource::pending();
        let result = renderer(config)
            .render(PreviewRequest::new(metadata(), avatar))
            .await;
        assert!(matches!(result, Err(PreviewError::AvatarTimeout(20))));
    }
}
