use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use cutout::output::PngFileExport;
use cutout::segmentation::{MapFileSegmenter, Preprocessor};
use cutout::source::FileSource;
use cutout::{
    load_photo, BrushMode, DisplayGeometry, Point, PointerButton, RefineConfig, Session,
    Thresholding,
};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Binarise and band the map
    Hard,
    /// Keep the model's confidence as a soft ramp
    Band,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Photo to cut out
    #[arg(short, long)]
    image: PathBuf,

    /// Greyscale segmentation map produced by the person-segmentation model
    #[arg(short, long)]
    map: PathBuf,

    /// Treat the map as hard labels (>= 128 is foreground)
    #[arg(long)]
    binary_map: bool,

    /// Directory the cutout is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Thresholding strategy
    #[arg(long, value_enum, default_value_t = Strategy::Hard)]
    strategy: Strategy,

    /// Foreground threshold for the map
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,

    /// Half-width of the confidence ramp (band strategy)
    #[arg(long, default_value_t = 0.15)]
    softness: f32,

    /// Exponent applied to the confidence ramp (band strategy)
    #[arg(long, default_value_t = 0.75)]
    exponent: f32,

    /// Dilation iterations (derived from image size if omitted)
    #[arg(long)]
    dilation: Option<u32>,

    /// Erosion iterations (derived from dilation if omitted)
    #[arg(long)]
    erosion: Option<u32>,

    /// Blur radius in pixels (derived from image size if omitted)
    #[arg(long)]
    blur_radius: Option<u32>,

    /// Brush strokes to replay, e.g. "erase:30:10,10;80,40"
    /// Coordinates are in photo pixels.
    #[arg(long)]
    stroke: Vec<StrokeSpec>,

    /// Also write the edited mask as a greyscale image next to the cutout
    #[arg(long)]
    show_matte: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// One brush stroke given on the command line: `mode:size:x,y;x,y;...`
#[derive(Debug, Clone, PartialEq)]
struct StrokeSpec {
    mode: BrushMode,
    size: f32,
    points: Vec<Point>,
}

impl FromStr for StrokeSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(mode), Some(size), Some(points)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected mode:size:points, got '{s}'"));
        };

        let mode = mode.parse::<BrushMode>()?;
        let size = size
            .parse::<f32>()
            .map_err(|e| format!("invalid brush size '{size}': {e}"))?;
        let points = points
            .split(';')
            .filter(|p| !p.trim().is_empty())
            .map(|p| -> std::result::Result<Point, String> {
                let (x, y) = p
                    .split_once(',')
                    .ok_or_else(|| format!("invalid point '{p}', expected x,y"))?;
                let x = x.trim().parse::<f32>().map_err(|e| format!("invalid x '{x}': {e}"))?;
                let y = y.trim().parse::<f32>().map_err(|e| format!("invalid y '{y}': {e}"))?;
                Ok(Point::new(x, y))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        if points.is_empty() {
            return Err(format!("stroke '{s}' has no points"));
        }
        Ok(Self { mode, size, points })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Cutout starting");

    let strategy = match args.strategy {
        Strategy::Hard => Thresholding::HardBinary {
            threshold: args.threshold,
        },
        Strategy::Band => Thresholding::ProbabilityBand {
            threshold: args.threshold,
            softness: args.softness,
            exponent: args.exponent,
        },
    };
    let config = RefineConfig::default()
        .with_strategy(strategy)
        .with_morphology(args.dilation, args.erosion)
        .with_blur_radius(args.blur_radius);
    tracing::debug!("Refine config: {:?}", config);

    let source = match load_photo(&mut FileSource::new(&args.image)) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("{}", e.user_message());
            return Err(e).context("Failed to load photo");
        }
    };
    let name = source.name.clone();
    let (width, height) = source.dimensions();

    let mut segmenter = MapFileSegmenter::new(&args.map, args.binary_map);
    let mut session = Session::new(config, PngFileExport::new(&args.output_dir));

    let token = session.begin_load();
    match session.process(&token, &mut segmenter, source) {
        Ok(outcome) => {
            tracing::info!(
                "Cutout ready ({}x{}, {:.1}% foreground)",
                outcome.width,
                outcome.height,
                outcome.foreground_ratio * 100.0
            );
        }
        Err(e) if e.is_silent() => return Ok(()),
        Err(e) => {
            tracing::error!("{}", e.user_message());
            return Err(e).context("Failed to prepare cutout");
        }
    }

    replay_strokes(&mut session, &args.stroke, width, height)?;

    if args.show_matte {
        let layer = session.layer().context("Mask layer missing after load")?;
        let path = args.output_dir.join(format!("{name}-matte.png"));
        Preprocessor::matte_to_rgba(layer.current())
            .save(&path)
            .with_context(|| format!("Failed to write matte to {}", path.display()))?;
        tracing::info!("Wrote matte to {}", path.display());
    }

    if let Some(path) = session.exporter().last_written() {
        println!("{}", path.display());
    }

    Ok(())
}

fn replay_strokes(
    session: &mut Session<PngFileExport>,
    strokes: &[StrokeSpec],
    width: u32,
    height: u32,
) -> Result<()> {
    let geometry = DisplayGeometry::identity(width, height);

    for (i, stroke) in strokes.iter().enumerate() {
        tracing::info!(
            "Stroke {}: {} with {:.0}px brush over {} points",
            i + 1,
            stroke.mode,
            stroke.size,
            stroke.points.len()
        );
        session.set_brush_mode(stroke.mode);
        session.set_brush_size(stroke.size);

        let (first, rest) = stroke
            .points
            .split_first()
            .context("Stroke has no points")?;
        session.pointer_down(*first, PointerButton::Primary, &geometry);
        for point in rest {
            session.pointer_move(*point, &geometry);
        }
        session
            .pointer_up()
            .with_context(|| format!("Failed to export after stroke {}", i + 1))?;
    }

    Ok(())
}
