use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storycanvas::lut::atlas::LutAtlas;
use storycanvas::lut::parse::{LutWarning, parse_cube_with};
use storycanvas::{
    Editor, EditorSession, FrameExporter, HistoryOpts, LutStrictness, SceneDoc, SessionOpts,
    Viewport,
};
use tracing_subscriber::EnvFilter;

const LUT_WAIT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "storycanvas", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a `.cube` LUT and optionally write its atlas.
    Lut(LutArgs),
    /// Render a scene document to a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct LutArgs {
    /// Input `.cube` file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write the packed atlas as a PNG.
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Reject files whose entry count does not match the declared size.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Viewport width in pixels (defaults to the document's, then the canvas width).
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height in pixels.
    #[arg(long)]
    height: Option<f64>,
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
        Command::Lut(args) => cmd_lut(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(path: &Path, data: &[u8], width: u32, height: u32) -> anyhow::Result<()> {
    ensure_parent(path)?;
    image::save_buffer_with_format(
        path,
        data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_lut(args: LutArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read lut '{}'", args.in_path.display()))?;
    let strictness = if args.strict {
        LutStrictness::Strict
    } else {
        LutStrictness::Lenient
    };
    let lut = parse_cube_with(&text, strictness)
        .with_context(|| format!("parse lut '{}'", args.in_path.display()))?;

    println!("size: {}", lut.size);
    println!("title: {}", lut.title.as_deref().unwrap_or("-"));
    for w in &lut.warnings {
        match w {
            LutWarning::EntryCountMismatch { expected, actual } => {
                println!("warning: expected {expected} entries, found {actual}")
            }
            LutWarning::MalformedLine { line } => {
                println!("warning: skipped malformed line {line}")
            }
        }
    }

    if let Some(out) = &args.atlas {
        let atlas = LutAtlas::build(&lut)?;
        write_png(out, &atlas.rgba, atlas.width, atlas.height)?;
        eprintln!("wrote {} ({}x{})", out.display(), atlas.width, atlas.height);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let doc = SceneDoc::load(&args.in_path)?;
    doc.validate()?;

    let fallback = doc.viewport.unwrap_or(Viewport {
        width: storycanvas::CANVAS_WIDTH,
        height: storycanvas::CANVAS_HEIGHT,
    });
    let viewport = Viewport::new(
        args.width.unwrap_or(fallback.width),
        args.height.unwrap_or(fallback.height),
    )?;

    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let assets = doc.load_assets(root)?;
    let media = doc.load_media(root)?;
    let editor = Editor::from_store(doc.to_store(HistoryOpts::default())?);

    let mut session = EditorSession::with_editor(
        editor,
        viewport,
        assets,
        Arc::new(media),
        SessionOpts::default(),
    )?;
    if let Some(lut) = &doc.lut
        && !session.activate_lut(&lut.asset, lut.intensity)?
        && !session.wait_for_resources(LUT_WAIT)
    {
        tracing::warn!(asset = %lut.asset, "lut not ready; rendering with matrix grading");
    }

    let frame = session.snapshot()?;
    write_png(&args.out, &frame.to_straight_rgba(), frame.width, frame.height)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
