use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bmwd::config::AppConfig;
use bmwd::notify::{StickerRecord, WebhookClient};
use bmwd::rest;
use bmwd::sticker::{archive, qr, template, StickerPipeline, StickerRequest};
use bmwd::validate;
use bmwd::AppContext;

#[derive(Parser)]
#[command(
    name = "bmwd",
    about = "Block My Wheels — sticker generation daemon and CLI",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config.toml
    #[arg(long, env = "BMWD_CONFIG")]
    config: Option<PathBuf>,

    /// REST API port
    #[arg(long, env = "BMWD_PORT")]
    port: Option<u16>,

    /// Bind address for the REST server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "BMWD_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BMWD_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST server (default when no subcommand given).
    ///
    /// Examples:
    ///   bmwd serve
    ///   bmwd
    Serve,
    /// Generate one sticker PNG.
    ///
    /// The plate is sanitized and validated first; the QR payload defaults
    /// to the scan URL of the plate-derived token.
    ///
    /// Examples:
    ///   bmwd generate "ABC-123"
    ///   bmwd generate "W 1234 XY" --template bright --out /tmp
    Generate {
        /// License plate text drawn on the sticker
        plate: String,
        /// Template registry key
        #[arg(long, default_value = "modern")]
        template: String,
        /// Explicit QR payload (overrides the derived scan URL)
        #[arg(long)]
        payload: Option<String>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// QR foreground color, #RRGGBB
        #[arg(long)]
        foreground: Option<String>,
        /// QR background color, #RRGGBB
        #[arg(long)]
        background: Option<String>,
        /// QR error-correction level: L, M, Q, or H
        #[arg(long)]
        ec_level: Option<String>,
    },
    /// Generate stickers for many plates.
    ///
    /// Failures are per-plate: one bad plate never aborts the rest.
    ///
    /// Examples:
    ///   bmwd batch "ABC-123" "XYZ-789"
    ///   bmwd batch --file plates.txt --archive stickers.tar.gz
    Batch {
        /// Plates given directly on the command line
        plates: Vec<String>,
        /// Read plates from a file, one per line (blank lines skipped)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Template registry key
        #[arg(long, default_value = "modern")]
        template: String,
        /// Output directory for individual PNGs
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Also write a tar.gz of the generated stickers to this path
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// List the sticker template registry.
    Templates,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_env("BMWD_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    let config = AppConfig::load(args.config.as_deref(), args.port, args.bind_address.clone());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Generate {
            plate,
            template,
            payload,
            out,
            foreground,
            background,
            ec_level,
        } => run_generate(config, plate, template, payload, out, foreground, background, ec_level).await,
        Command::Batch {
            plates,
            file,
            template,
            out,
            archive,
        } => run_batch(config, plates, file, template, out, archive).await,
        Command::Templates => {
            for name in template::names() {
                let t = template::get(name)?;
                println!("{:<10} {}x{}  qr {}px", t.name, t.width, t.height, t.qr_size);
            }
            Ok(())
        }
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "bmwd starting");
    info!(
        port = config.port,
        base_url = %config.base_url,
        template_mode = config.template_mode,
        "config loaded"
    );
    let ctx = Arc::new(AppContext::new(config));
    rest::start_rest_server(ctx).await
}

fn qr_overrides(
    foreground: Option<&str>,
    background: Option<&str>,
    ec_level: Option<&str>,
) -> Result<Option<qr::QrOptions>> {
    if foreground.is_none() && background.is_none() && ec_level.is_none() {
        return Ok(None);
    }
    let mut opts = qr::QrOptions::default();
    if let Some(s) = foreground {
        opts.foreground = qr::parse_hex_color(s).with_context(|| format!("invalid --foreground color: {s}"))?;
    }
    if let Some(s) = background {
        opts.background = qr::parse_hex_color(s).with_context(|| format!("invalid --background color: {s}"))?;
    }
    if let Some(s) = ec_level {
        opts.ec_level = qr::parse_ec_level(s).with_context(|| format!("invalid --ec-level: {s}"))?;
    }
    Ok(Some(opts))
}

#[allow(clippy::too_many_arguments)]
async fn run_generate(
    config: AppConfig,
    plate: String,
    template: String,
    payload: Option<String>,
    out: PathBuf,
    foreground: Option<String>,
    background: Option<String>,
    ec_level: Option<String>,
) -> Result<()> {
    let checked = validate::check_plate(&plate);
    if !checked.is_valid {
        bail!(
            "license plate invalid after sanitization ({:?}): must be 2-15 characters",
            checked.value
        );
    }

    let qr = qr_overrides(foreground.as_deref(), background.as_deref(), ec_level.as_deref())?;
    let webhook = WebhookClient::new(&config);
    let pipeline = StickerPipeline::new(&config);

    let req = StickerRequest {
        plate: checked.value.clone(),
        payload,
        template: template.clone(),
        qr,
    };
    let artifact = pipeline.generate(&req).await?;

    let path = out.join(&artifact.filename);
    std::fs::write(&path, &artifact.png)
        .with_context(|| format!("failed to write {}", path.display()))?;

    let token = validate::sanitize_token(&checked.value);
    let saved = webhook
        .persist_sticker(&StickerRecord::new(token, checked.value, template))
        .await;
    if !saved {
        warn!("sticker generated but not recorded with the backend");
    }

    println!("{}", path.display());
    Ok(())
}

async fn run_batch(
    config: AppConfig,
    mut plates: Vec<String>,
    file: Option<PathBuf>,
    template: String,
    out: PathBuf,
    archive_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = file {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        plates.extend(
            raw.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }
    if plates.is_empty() {
        bail!("no plates given — pass them as arguments or via --file");
    }

    let pipeline = StickerPipeline::new(&config);
    let report = pipeline.generate_batch(&plates, &template).await?;

    for item in &report.items {
        match &item.outcome {
            Ok(artifact) => {
                let path = out.join(&artifact.filename);
                std::fs::write(&path, &artifact.png)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("{}", path.display());
            }
            Err(e) => eprintln!("{}: {e}", item.input),
        }
    }

    if let Some(path) = archive_path {
        let bytes = archive::write_tar_gz(report.artifacts())?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", path.display());
    }

    info!(
        total = report.total,
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(())
}
