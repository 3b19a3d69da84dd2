use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use feedshift_core::fetch::HttpFeedSource;
use feedshift_core::pipeline::{self, RunOptions};
use feedshift_core::settings::{Settings, TransformSettings};
use feedshift_core::transform::VatPolicy;
use feedshift_transfer::{FtpConnector, SessionConnector};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Vendor product feed converter and FTP publisher", long_about = None)]
struct Cli {
    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the vendor feed, convert it and upload the result
    Run(RunArgs),
    /// Convert a local vendor feed file without uploading
    Convert(ConvertArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Path to the TOML config (defaults to ./feedshift.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Convert but do not upload
    #[arg(long)]
    dry_run: bool,
    /// Also write the converted feed to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Vendor feed XML file
    #[arg(long)]
    input: PathBuf,
    /// Destination file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// How to treat a VAT value that is not a number
    #[arg(long, default_value_t = VatPolicy::Reject)]
    invalid_vat: VatPolicy,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Convert(args) => handle_convert(args),
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    settings.validate(!args.dry_run)?;
    let source = HttpFeedSource::new(&settings.source);

    let connector = if args.dry_run {
        None
    } else {
        Some(
            FtpConnector::new(settings.destination.ftp_config())
                .context("invalid FTP destination")?,
        )
    };
    let options = RunOptions {
        local_copy: args.output,
    };

    let summary = pipeline::run(
        &settings,
        &source,
        connector.as_ref().map(|c| c as &dyn SessionConnector),
        &options,
    )?;

    info!(
        products = summary.products,
        variants = summary.variants,
        images = summary.images,
        bytes = summary.bytes,
        published = summary.published,
        "run finished"
    );

    if connector.is_some() && !summary.published {
        bail!("FTP upload of {} failed", settings.destination.filename);
    }
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<()> {
    let content = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let content = String::from_utf8_lossy(&content);

    let converted = pipeline::convert_document(
        &content,
        &TransformSettings {
            invalid_vat: args.invalid_vat,
        },
    )?;

    match &args.output {
        Some(path) => {
            fs::write(path, converted.xml.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                products = converted.products,
                "wrote converted feed"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(converted.xml.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
