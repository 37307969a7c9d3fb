use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use img_watermark::{
    Anchor, ImageFormat, Rgba8, WatermarkConfig, Watermarker, codec, schema,
    validate_watermark_image,
};

#[derive(Parser, Debug)]
#[command(name = "img-watermark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark an image and save it in its original format.
    Apply(ApplyArgs),
    /// Print the JSON tool definition of the watermark parameters.
    Describe,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// PNG or JPEG image to watermark.
    #[arg(long)]
    base: PathBuf,

    /// Output file, or an existing directory to write `img_<unix-time>.<ext>` into.
    #[arg(long)]
    out: PathBuf,

    /// JSON file with watermark settings; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text to use as watermark.
    #[arg(long)]
    text: Option<String>,

    /// PNG, JPEG or SVG file to use as watermark.
    #[arg(long)]
    image: Option<PathBuf>,

    /// top-left, top-center, top-right, left-center, center, right-center, bottom-left,
    /// bottom-center or bottom-right.
    #[arg(long)]
    position: Option<Anchor>,

    /// Margin from the anchored edges, in pixels.
    #[arg(long)]
    margin: Option<u32>,

    /// Watermark opacity (0.0-1.0).
    #[arg(long)]
    opacity: Option<f64>,

    /// Font size for text watermarks.
    #[arg(long)]
    text_size: Option<u32>,

    /// Text color in hex (e.g. #FFFFFF).
    #[arg(long)]
    text_color: Option<Rgba8>,

    /// Image watermark width as a fraction of the base width (0.1-1.0).
    #[arg(long)]
    scale: Option<f64>,

    /// Extra directories to load .ttf/.otf/.ttc fonts from.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// CSS font-family list for text watermarks (e.g. "DejaVu Sans, sans-serif").
    #[arg(long)]
    font_family: Option<String>,

    /// Print a JSON status object instead of plain text.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => {
            let json = args.json;
            match cmd_apply(args) {
                Ok(path) => {
                    if json {
                        let out = serde_json::json!({
                            "status": "success",
                            "path": path.display().to_string(),
                        });
                        println!("{out}");
                    } else {
                        println!("wrote {}", path.display());
                    }
                    Ok(())
                }
                Err(err) if json => {
                    let out = serde_json::json!({
                        "status": "error",
                        "error": format!("{err:#}"),
                    });
                    println!("{out}");
                    std::process::exit(1);
                }
                Err(err) => Err(err),
            }
        }
        Command::Describe => {
            println!("{}", schema::tool_definition_json()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: &Path) -> anyhow::Result<WatermarkConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let cfg = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config '{}'", path.display()))?;
    Ok(cfg)
}

fn merged_config(args: &ApplyArgs) -> anyhow::Result<WatermarkConfig> {
    let mut cfg = match &args.config {
        Some(path) => read_config(path)?,
        None => WatermarkConfig::default(),
    };

    if let Some(v) = &args.text {
        cfg.text = Some(v.clone());
    }
    if let Some(v) = &args.image {
        cfg.image = Some(v.clone());
    }
    if let Some(v) = args.position {
        cfg.position = v;
    }
    if let Some(v) = args.margin {
        cfg.margin = v;
    }
    if let Some(v) = args.opacity {
        cfg.opacity = v;
    }
    if let Some(v) = args.text_size {
        cfg.text_size = v;
    }
    if let Some(v) = args.text_color {
        cfg.text_color = v;
    }
    if let Some(v) = args.scale {
        cfg.scale = v;
    }
    Ok(cfg)
}

fn output_path(out: &Path, format: ImageFormat) -> PathBuf {
    if !out.is_dir() {
        return out.to_path_buf();
    }
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    out.join(format!("img_{secs}.{}", format.extension()))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<PathBuf> {
    let cfg = merged_config(&args)?;
    let spec = cfg.resolve().context("invalid watermark settings")?;

    // Cheap checks first: the base image may have been expensive to produce.
    if let Some(image) = &cfg.image {
        validate_watermark_image(image).context("invalid watermark image")?;
    }

    let base = std::fs::read(&args.base)
        .with_context(|| format!("read base image '{}'", args.base.display()))?;

    let (bytes, format) = match spec {
        Some(spec) => {
            let mut marker = Watermarker::with_fonts(args.font_dirs.as_slice());
            if let Some(family) = &args.font_family {
                marker = marker.with_font_family(family.as_str());
            }
            // The watermark image was validated above, before the base was read.
            let result = marker
                .composite_validated(&base, &spec)
                .context("failed to apply watermark")?;
            let bytes = result.encode().context("failed to encode watermarked image")?;
            (bytes, result.format)
        }
        None => {
            let format = codec::sniff::sniff_format(&base)
                .context("base image is neither PNG nor JPEG")?;
            (base, format)
        }
    };

    let path = output_path(&args.out, format);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&path, &bytes).with_context(|| format!("write '{}'", path.display()))?;

    tracing::info!(path = %path.display(), %format, "saved image");
    Ok(path)
}
