use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gallery_lightbox::config::Configuration;
use gallery_lightbox::events::{Effect, ImageSettled, InputEvent, LoadImage, Output};
use gallery_lightbox::gallery::ImageRef;
use gallery_lightbox::gallery::scan::discover_images;
use gallery_lightbox::page::GalleryPage;
use gallery_lightbox::replay::{self, ContentFeed, Script};
use gallery_lightbox::tasks;

#[derive(Debug, Parser)]
#[command(
    name = "lightbox-replay",
    version,
    about = "Replay timed page input through the gallery lightbox and print frames as JSON lines"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Timed input script (YAML)
    #[arg(long, value_name = "FILE", required_unless_present = "list_images")]
    script: Option<PathBuf>,
    /// Print the gallery images in display order and exit
    #[arg(long = "list-images")]
    list_images: bool,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // Frames go to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn gallery_images(cfg: &Configuration) -> Result<Vec<ImageRef>> {
    if !cfg.gallery.images.is_empty() {
        return Ok(cfg.gallery.images.clone());
    }
    match &cfg.gallery.library_path {
        Some(root) => discover_images(root)
            .with_context(|| format!("failed to scan library {}", root.display())),
        None => bail!("gallery needs either `images` or `library-path`"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        script,
        list_images,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::debug!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let images = gallery_images(&cfg)?;
    tracing::info!(count = images.len(), "gallery images resolved");

    if list_images {
        let mut out = std::io::stdout().lock();
        for (idx, image) in images.iter().enumerate() {
            let size = match (image.width, image.height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => "unsized".to_string(),
            };
            writeln!(out, "{:>4}: {} ({size})", idx, image.src)?;
        }
        return Ok(());
    }

    let Some(script_path) = script else {
        bail!("--script is required");
    };
    let script = Script::from_yaml_file(&script_path)
        .with_context(|| format!("failed to load script from {}", script_path.display()))?;

    let (first_batch, mut feed) = ContentFeed::initial(images, cfg.gallery.batch_size);
    let page = GalleryPage::new(&cfg, first_batch, script.viewport);

    let (input_tx, input_rx) = mpsc::channel::<InputEvent>(64); // Script/Feed -> Driver
    let (load_tx, load_rx) = mpsc::channel::<LoadImage>(64); // Driver -> Loader
    let (settled_tx, settled_rx) = mpsc::channel::<ImageSettled>(64); // Loader -> Driver
    let (output_tx, mut output_rx) = mpsc::channel::<Output>(256); // Driver -> stdout

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();
    let started = tokio::time::Instant::now();

    // Loader
    tasks.spawn({
        let cancel = cancel.clone();
        let max_in_flight = cfg.loader_max_concurrent;
        async move {
            tasks::loader::run(load_rx, settled_tx, cancel, max_in_flight)
                .await
                .context("loader task failed")
        }
    });

    // Driver
    tasks.spawn({
        let cancel = cancel.clone();
        let frame_interval = cfg.frame_interval;
        async move {
            let page = tasks::lightbox::run(
                page,
                input_rx,
                settled_rx,
                load_tx,
                output_tx,
                frame_interval,
                cancel,
            )
            .await
            .context("lightbox driver failed")?;
            let state = page.lightbox().map(|lb| lb.state());
            tracing::info!(?state, images = page.gallery().len(), "final page state");
            Ok(())
        }
    });

    // Script
    tasks.spawn({
        let cancel = cancel.clone();
        let input_tx = input_tx.clone();
        let script = script.clone();
        async move {
            replay::play(&script, started, input_tx, cancel.clone())
                .await
                .context("replay task failed")?;
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(started + script.duration()) => {
                    tracing::info!(
                        "replay complete after {}",
                        humantime::format_duration(script.duration())
                    );
                    cancel.cancel();
                }
            }
            Ok(())
        }
    });

    // Output printer and content provider
    tasks.spawn(async move {
        while let Some(output) = output_rx.recv().await {
            let line = serde_json::to_string(&output).context("failed to encode output")?;
            println!("{line}");
            if let Output::Effect {
                effect: Effect::LoadMoreContent,
                ..
            } = output
            {
                let images = feed.next_batch();
                tracing::debug!(appended = images.len(), left = feed.remaining(), "serving content batch");
                if input_tx
                    .send(InputEvent::ContentAppended { images })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }
        Ok(())
    });

    let mut failed = false;
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("task error: {e:?}");
                failed = true;
                cancel.cancel();
            }
            Err(e) => {
                tracing::error!("join error: {e}");
                failed = true;
                cancel.cancel();
            }
        }
    }
    if failed {
        bail!("replay aborted");
    }
    Ok(())
}
