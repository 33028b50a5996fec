use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qrcanvas", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a canvas configuration to PNG or JPEG.
    Render(RenderArgs),
    /// Validate a canvas configuration and print the report as JSON.
    Validate(InArgs),
    /// Print the estimated encoded size of an export, in bytes.
    Estimate(EstimateArgs),
    /// Write a default canvas configuration.
    Init(InitArgs),
}

#[derive(Parser, Debug)]
struct InArgs {
    /// Input canvas configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Jpg,
}

impl From<FormatArg> for qrcanvas::OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Png => Self::Png,
            FormatArg::Jpg => Self::Jpg,
        }
    }
}

#[derive(Parser, Debug)]
struct OverrideArgs {
    /// Output scale factor (default 2).
    #[arg(long)]
    scale: Option<f64>,

    /// Encoder quality in [0, 1].
    #[arg(long)]
    quality: Option<f64>,

    /// Corner radius in logical pixels.
    #[arg(long)]
    radius: Option<f64>,

    /// Output format; defaults to the configuration's format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

impl OverrideArgs {
    fn to_options(&self) -> qrcanvas::ExportOptions {
        qrcanvas::ExportOptions {
            scale: self.scale,
            quality: self.quality,
            corner_radius: self.radius,
            format: self.format.map(Into::into),
            background: None,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input canvas configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overrides: OverrideArgs,

    /// Write a `data:` URI text file instead of binary image bytes.
    #[arg(long, default_value_t = false)]
    data_uri: bool,
}

#[derive(Parser, Debug)]
struct EstimateArgs {
    /// Input canvas configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output configuration path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Centre the QR code at this fraction of the shorter canvas side.
    #[arg(long)]
    center: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Validate(args) => cmd_validate(args),
        Command::Estimate(args) => cmd_estimate(args).await,
        Command::Init(args) => cmd_init(args),
    }
}

fn load(path: &Path) -> anyhow::Result<qrcanvas::CanvasConfiguration> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    Ok(qrcanvas::deserialize(&text)?)
}

fn session() -> anyhow::Result<qrcanvas::RenderSession> {
    let opts = qrcanvas::RenderSessionOpts {
        resolver: qrcanvas::ResolverOpts::from_env(),
        ..qrcanvas::RenderSessionOpts::default()
    };
    Ok(qrcanvas::RenderSession::new(opts)?)
}

fn write_out(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load(&args.in_path)?;
    let report = config.validate();
    if !report.is_valid {
        for e in &report.errors {
            eprintln!("invalid: {e}");
        }
        anyhow::bail!("configuration '{}' is invalid", args.in_path.display());
    }

    let exported = session()?
        .export(&config, &args.overrides.to_options())
        .await?;
    for w in &exported.warnings {
        eprintln!("warning: {w}");
    }
    let image = exported.image;
    if args.data_uri {
        write_out(&args.out, image.data_uri().as_bytes())?;
    } else {
        write_out(&args.out, &image.bytes)?;
    }

    eprintln!(
        "wrote {} ({}x{} {})",
        args.out.display(),
        image.width,
        image.height,
        image.mime()
    );
    Ok(())
}

fn cmd_validate(args: InArgs) -> anyhow::Result<()> {
    let config = load(&args.in_path)?;
    let report = config.validate();
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_valid {
        anyhow::bail!("{} validation error(s)", report.errors.len());
    }
    Ok(())
}

async fn cmd_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let config = load(&args.in_path)?;
    let canvas = session()?.render(&config).await?;
    let bytes = qrcanvas::estimate_file_size(
        &qrcanvas::Exporter::new(),
        &canvas.tree,
        &config.export,
        &args.overrides.to_options(),
    );
    println!("{bytes}");
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let mut config = qrcanvas::CanvasConfiguration::default();
    config.update_export(qrcanvas::ExportPatch {
        width: Some(args.width),
        height: Some(args.height),
        ..Default::default()
    });
    if let Some(ratio) = args.center {
        config.center_qr(ratio);
    }
    write_out(&args.out, qrcanvas::serialize(&config)?.as_bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
