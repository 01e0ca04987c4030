use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use photostrip::{
    Composite, CompositionEngine, DirAssetResolver, EngineOptions, Frame, FsObjectStore,
    OutputFormat, PublicationManager, PublicationState, PublishOptions, PublishOutcome, StyleSpec,
    download_filename,
};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose frames into a strip image.
    Compose(ComposeArgs),
    /// Compose, then publish behind an expiring link until it expires or Ctrl-C.
    Publish(PublishArgs),
}

#[derive(Args, Debug)]
struct StripArgs {
    /// Style JSON (design, background, filter, sticker, pattern, caption).
    #[arg(long)]
    style: PathBuf,

    /// Captured frame, in capture order. Repeat once per panel.
    #[arg(long = "frame", required = true)]
    frames: Vec<PathBuf>,

    /// Directory patterns and sticker images are read from. Defaults to the style's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// TTF/OTF font for captions and glyph stickers.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Engine options JSON; unset fields keep their defaults.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpeg)]
    format: FormatChoice,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    strip: StripArgs,

    /// Output image path, or a directory to use the download file name.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PublishArgs {
    #[command(flatten)]
    strip: StripArgs,

    /// Directory backing the object store.
    #[arg(long)]
    store_dir: PathBuf,

    /// Link lifetime in seconds.
    #[arg(long, default_value_t = 60)]
    ttl: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Publish(args) => cmd_publish(args),
    }
}

fn read_engine_options(path: Option<&Path>) -> anyhow::Result<EngineOptions> {
    let Some(path) = path else {
        return Ok(EngineOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read engine options '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| "parse engine options JSON")
}

fn compose(args: &StripArgs) -> anyhow::Result<(StyleSpec, Composite)> {
    let spec = StyleSpec::from_path(&args.style)?;
    let assets_root = match &args.assets {
        Some(dir) => dir.clone(),
        None => args
            .style
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let style = spec.resolve(&DirAssetResolver::new(assets_root))?;

    let mut options = read_engine_options(args.engine.as_deref())?;
    options.format = match args.format {
        FormatChoice::Jpeg => match options.format {
            OutputFormat::Jpeg { quality } => OutputFormat::Jpeg { quality },
            OutputFormat::Png => OutputFormat::default(),
        },
        FormatChoice::Png => OutputFormat::Png,
    };
    let mut engine = CompositionEngine::new(options)?;
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        engine = engine.with_font(bytes);
    }

    let frames = args
        .frames
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let bytes =
                std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
            Frame::from_encoded(i, &bytes)
                .with_context(|| format!("decode frame '{}'", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let composite = engine.compose(&frames, &style)?;
    Ok((spec, composite))
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let (spec, composite) = compose(&args.strip)?;

    let out = if args.out.is_dir() {
        args.out.join(download_filename(
            Some(&spec.design),
            spec.pattern.as_deref(),
            composite.format,
        ))
    } else {
        args.out
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &composite.encoded)
        .with_context(|| format!("write strip '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        out.display(),
        composite.width,
        composite.height
    );
    Ok(())
}

fn cmd_publish(args: PublishArgs) -> anyhow::Result<()> {
    let (_, composite) = compose(&args.strip)?;
    let options = PublishOptions {
        ttl_secs: args.ttl,
        ..PublishOptions::default()
    };
    let store = Arc::new(FsObjectStore::new(&args.store_dir));
    let manager = PublicationManager::new(store, options)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    rt.block_on(async move {
        let mut rx = manager.subscribe();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let publish = manager.publish(&composite);
        tokio::pin!(publish);
        let outcome = tokio::select! {
            outcome = &mut publish => outcome?,
            _ = &mut ctrl_c => {
                // The upload settles, then withdraws its object.
                manager.leave().await;
                let outcome = publish.await?;
                eprintln!("left during upload ({outcome:?}), strip deleted");
                return Ok(());
            }
        };
        match outcome {
            PublishOutcome::Published { signed_url } => println!("{signed_url}"),
            other => anyhow::bail!("publish did not go live: {other:?}"),
        }

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let record = rx.borrow_and_update().clone();
                    match record.state {
                        PublicationState::Published { .. } => {
                            eprintln!("link expires in {}s", record.remaining_secs);
                        }
                        PublicationState::Deleted => {
                            if let Some(w) = record.last_warning {
                                eprintln!("warning: {w}");
                            }
                            eprintln!("link expired, strip deleted");
                            break;
                        }
                        _ => {}
                    }
                }
                _ = &mut ctrl_c => {
                    manager.leave().await;
                    eprintln!("left, strip deleted");
                    break;
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}
