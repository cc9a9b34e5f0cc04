use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::repo::{PreviewRequest, RepositoryMetadata, parse_repository_url};
use crate::session::PreviewRenderer;
use crate::text_metrics::font_database_with_dirs;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repo-preview", version, about = "Render a 1280x640 social preview PNG for a repository")]
pub struct Args {
    /// Repository URL (github.com/<owner>/<repo>); alternative to --owner/--repo
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Repository owner
    #[arg(long = "owner")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long = "repo")]
    pub repo: Option<String>,

    /// Description text; a literal "\n" forces a line break
    #[arg(short = 'd', long = "description", conflicts_with = "description_file")]
    pub description: Option<String>,

    /// Read the description from a file
    #[arg(long = "description-file")]
    pub description_file: Option<PathBuf>,

    /// Avatar image (PNG or JPEG)
    #[arg(short = 'a', long = "avatar")]
    pub avatar: PathBuf,

    /// Config file (JSON/JSON5: style colors, fonts, avatar policy)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Extra directory of font files, e.g. one containing Tektur
    #[arg(long = "font-dir")]
    pub font_dir: Vec<PathBuf>,

    /// Output PNG file or directory. Defaults to <owner>_<repo>_preview.png
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Print the PNG as a data URI on stdout
    #[arg(long = "data-uri")]
    pub data_uri: bool,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Log fitting decisions
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    let metadata = resolve_metadata(&args)?;
    let avatar = std::fs::read(&args.avatar)
        .with_context(|| format!("failed to read avatar {}", args.avatar.display()))?;

    let renderer = PreviewRenderer::new(config, font_database_with_dirs(&args.font_dir));
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &renderer.layout(&metadata))?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let preview = runtime.block_on(renderer.render(PreviewRequest::new(metadata, avatar)))?;

    if args.data_uri {
        println!("{}", preview.data_uri());
    }
    if args.output.is_some() || !args.data_uri {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&preview.filename));
        let written = preview.write_to(&output)?;
        log::info!("wrote {}", written.display());
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn resolve_metadata(args: &Args) -> Result<RepositoryMetadata> {
    let (owner, repo) = match (&args.owner, &args.repo, &args.url) {
        (Some(owner), Some(repo), _) => (owner.clone(), repo.clone()),
        (_, _, Some(url)) => parse_repository_url(url)?,
        _ => anyhow::bail!("either --url or both --owner and --repo are required"),
    };

    let description = match (&args.description, &args.description_file) {
        (Some(text), _) => unescape_breaks(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read description {}", path.display()))?,
        (None, None) => String::new(),
    };

    Ok(RepositoryMetadata::new(owner, repo, description))
}

fn unescape_breaks(text: &str) -> String {
    text.replace("\\n", "\n")
}
