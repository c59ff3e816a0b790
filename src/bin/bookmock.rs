use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bookmock::{
    AssetKind, BackColor, BindingType, BookModel, FrameRGBA, IntakeOutcome, MockupConfig,
    MockupSession, ScalingMode, SizeInput, SlotKind, SpineWidth, Unit, compute_viewport,
    decode_asset, sample_color,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bookmock", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a mockup and export it as PNG.
    Render(RenderArgs),
    /// Print the output resolution and camera zoom for a book as JSON.
    Viewport(ViewportArgs),
    /// Print the color of one pixel of a PNG as displayed at a given size.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Cover artwork (PNG or PSD).
    #[arg(long)]
    cover: PathBuf,

    /// Spine artwork (PNG or PSD). Ignored for saddlestitch.
    #[arg(long)]
    spine: Option<PathBuf>,

    #[arg(long, default_value_t = BindingType::PerfectBound)]
    binding: BindingType,

    /// Hardcover back color, `#RRGGBB` or `#RGB`.
    #[arg(long)]
    back_color: Option<BackColor>,

    /// Spiral-bound spine width.
    #[arg(long)]
    spine_width: Option<f64>,

    #[arg(long, default_value_t = Unit::Pixels)]
    spine_unit: Unit,

    /// Which output dimension `--size` pins: `width` or `height`.
    #[arg(long, default_value_t = ScalingMode::FixedWidth)]
    mode: ScalingMode,

    #[arg(long, default_value_t = 1200.0)]
    size: f64,

    #[arg(long, default_value_t = Unit::Pixels)]
    unit: Unit,

    /// Output directory for `<label>.png`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Override the label derived from the cover file name.
    #[arg(long)]
    label: Option<String>,

    /// Also copy the image to the system clipboard.
    #[arg(long)]
    copy: bool,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ViewportArgs {
    #[arg(long)]
    cover_aspect: f64,

    #[arg(long, default_value_t = 0.0)]
    spine_aspect: f64,

    #[arg(long, default_value_t = BindingType::PerfectBound)]
    binding: BindingType,

    #[arg(long, default_value_t = ScalingMode::FixedWidth)]
    mode: ScalingMode,

    #[arg(long)]
    size: f64,

    #[arg(long, default_value_t = Unit::Pixels)]
    unit: Unit,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input PNG.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    display_width: f64,

    #[arg(long)]
    display_height: f64,

    #[arg(long)]
    x: f64,

    #[arg(long)]
    y: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Viewport(args) => cmd_viewport(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MockupConfig> {
    let mut cfg = match path {
        Some(p) => MockupConfig::from_path(p)?,
        None => MockupConfig::default(),
    };
    cfg.apply_env()?;
    Ok(cfg)
}

fn upload(session: &mut MockupSession, slot: SlotKind, path: &Path) -> anyhow::Result<()> {
    let kind = AssetKind::from_path(path)
        .with_context(|| format!("'{}' is not a .png or .psd file", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let file_name = path.file_name().and_then(|n| n.to_str());
    match session
        .slots_mut()
        .intake_upload(slot, kind.mime(), &bytes, file_name)
    {
        IntakeOutcome::Applied => Ok(()),
        other => anyhow::bail!(
            "could not load {} from '{}' ({other:?})",
            slot.as_str(),
            path.display()
        ),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let mut session = MockupSession::new(cfg)?;

    upload(&mut session, SlotKind::Cover, &args.cover)?;
    if let Some(spine) = &args.spine {
        if args.binding.uses_spine_image() {
            upload(&mut session, SlotKind::Spine, spine)?;
        } else {
            tracing::warn!(binding = %args.binding, "spine image ignored");
        }
    }

    session.set_binding(args.binding);
    if let Some(color) = args.back_color {
        session.set_back_color(color);
    }
    if let Some(value) = args.spine_width {
        session.set_spine_width(SpineWidth {
            value,
            unit: args.spine_unit,
        })?;
    }
    session.set_scaling_mode(args.mode);
    session.set_target_size(SizeInput {
        value: args.size,
        unit: args.unit,
    })?;

    let viewport = session.viewport()?;
    if viewport.clamped {
        eprintln!(
            "note: output reduced to {}x{} to fit the pixel budget",
            viewport.output_width_px, viewport.output_height_px
        );
    }
    session.render()?;
    let path = session.export_png(&args.out_dir, args.label.as_deref())?;

    if args.copy {
        copy_to_system_clipboard(&session);
    }

    println!("{}", path.display());
    Ok(())
}

#[cfg(feature = "clipboard")]
fn copy_to_system_clipboard(session: &MockupSession) {
    match bookmock::SystemClipboard::new() {
        Ok(mut clip) => {
            if session.copy_to_clipboard(&mut clip) {
                eprintln!("copied to clipboard");
            }
        }
        Err(err) => tracing::warn!(%err, "clipboard unavailable"),
    }
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_system_clipboard(_session: &MockupSession) {
    tracing::warn!("built without clipboard support");
}

fn cmd_viewport(args: ViewportArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let model = BookModel {
        binding: args.binding,
        cover_aspect: args.cover_aspect,
        spine_aspect: args.spine_aspect,
        normalization: 1.0,
    };
    let target = SizeInput {
        value: args.size,
        unit: args.unit,
    }
    .to_clamped_px(&cfg.units)?;
    let viewport = compute_viewport(&model, args.mode, target, &cfg.sizing)?;
    println!("{}", serde_json::to_string_pretty(&viewport)?);
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let bmp = decode_asset(AssetKind::Png, &bytes)?;
    let frame = FrameRGBA {
        width: bmp.width(),
        height: bmp.height(),
        data: bmp.pixels().to_vec(),
        premultiplied: false,
    };
    let color = sample_color(
        &frame,
        (args.display_width, args.display_height),
        args.x,
        args.y,
    )
    .context("point is outside the displayed image")?;
    println!("{}", color.to_hex());
    Ok(())
}
