#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod repo;
pub mod session;
pub mod style;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{AvatarFallback, FontSettings, PreviewConfig, TitleOverflow, load_config};
pub use error::{PreviewError, Result};
pub use export::Preview;
pub use layout::{
    DescriptionLayout, PreviewLayout, TitleLayout, compute_layout, fit_description, fit_title,
    wrap_text,
};
pub use repo::{AvatarSource, PreviewRequest, RepositoryMetadata, parse_repository_url};
pub use session::{PendingPreview, PreviewRenderer, decode_avatar};
pub use style::StyleConfig;
pub use text_metrics::{FallbackMetrics, FontMetrics, FontSpec, TextMeasure};
