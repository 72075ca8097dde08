use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, level_filters::LevelFilter, warn};

use engine::cut::{format_cuts_summary, reorder, Cut, CutRecord};
use engine::fcpxml::{create_debug_info, generate_multi_fcpxml, generate_single_fcpxml};
use engine::parser::{load_cuts_from_json, parse_timecodes_from_text, validate_cuts};

mod files;
mod probe;

use probe::{resolve_fps, FfprobeAnalyzer};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum InputFormat {
    /// Pick by extension: .json is structured, anything else is text
    Auto,
    /// JSON array of {"start": seconds, "end": seconds} records
    Json,
    /// Free text scanned for timecode ranges like 00:01:10-00:01:25
    Text,
}

#[derive(Parser, Debug)]
#[command(
    name = "fcpxmlgen",
    about = "Generate FCPXML timelines from a cut list and reference videos"
)]
struct Args {
    /// Cut list file (JSON or free text with timecode ranges)
    #[arg(long)]
    cuts: PathBuf,

    /// Source video file; repeat for multi-camera output
    #[arg(long = "video", required = true)]
    videos: Vec<PathBuf>,

    /// Cut list format
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// Frame rate override; when absent the first video is probed
    #[arg(long)]
    fps: Option<f64>,

    /// Leave audio out of the generated timelines
    #[arg(long)]
    no_audio: bool,

    /// Project name for single-source output
    #[arg(long, default_value = "Timeline")]
    project_name: String,

    /// Output filename for single-source output (sibling of the cut
    /// list; defaults to {cut list stem}_timeline.fcpxml)
    #[arg(long)]
    output: Option<String>,

    /// Comma-separated 1-based cut order, e.g. "2,1,3"
    #[arg(long)]
    order: Option<String>,

    /// Also write a plain-text debug report next to the cut list
    #[arg(long)]
    debug_report: bool,
}

fn load_cut_records(args: &Args, content: &str) -> Result<Vec<CutRecord>> {
    let structured = match args.format {
        InputFormat::Json => true,
        InputFormat::Text => false,
        InputFormat::Auto => args
            .cuts
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false),
    };

    if structured {
        load_cuts_from_json(content).context("failed to load structured cut list")
    } else {
        Ok(parse_timecodes_from_text(content)
            .into_iter()
            .map(CutRecord::from)
            .collect())
    }
}

fn resolve_cuts(records: &[CutRecord]) -> Result<Vec<Cut>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .as_cut()
                .with_context(|| format!("cut {} is missing 'start' or 'end'", i + 1))
        })
        .collect()
}

fn parse_order(spec: &str, len: usize) -> Result<Vec<usize>> {
    let order: Vec<usize> = spec
        .split(',')
        .map(|part| {
            let n: usize = part
                .trim()
                .parse()
                .with_context(|| format!("invalid order index {:?}", part.trim()))?;
            if n == 0 || n > len {
                bail!("order index {} is out of range 1..={}", n, len);
            }
            Ok(n - 1)
        })
        .collect::<Result<_>>()?;
    Ok(order)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    let args = Args::parse();

    for video in &args.videos {
        if !files::is_video_file(video) {
            warn!("{:?} does not look like a supported video format", video);
        }
    }

    let content = std::fs::read_to_string(&args.cuts)
        .with_context(|| format!("failed to read cut list {:?}", args.cuts))?;
    let records = load_cut_records(&args, &content)?;

    for warning in validate_cuts(&records) {
        warn!("{}", warning);
    }

    let mut cuts = resolve_cuts(&records)?;

    if let Some(spec) = &args.order {
        let order = parse_order(spec, cuts.len())?;
        cuts = reorder(&cuts, &order)
            .context("--order must list every cut position exactly once")?;
        info!("applied cut order {}", spec);
    }

    let fps = match args.fps {
        Some(fps) => fps,
        None => {
            let probe = FfprobeAnalyzer;
            let fps = resolve_fps(&probe, &args.videos[0]).await;
            info!("using frame rate {} for {:?}", fps, args.videos[0]);
            fps
        }
    };

    let include_audio = !args.no_audio;
    let is_multi_cam = args.videos.len() > 1;

    let generated = if is_multi_cam {
        let results = generate_multi_fcpxml(&cuts, &args.videos, fps, include_audio)?;
        files::save_multiple_fcpxml(&results, &args.cuts)?
    } else {
        let doc =
            generate_single_fcpxml(&cuts, &args.videos[0], fps, include_audio, &args.project_name)?;
        vec![files::save_single_fcpxml(
            &doc,
            &args.cuts,
            args.output.as_deref(),
        )?]
    };

    for path in &generated {
        info!("wrote {:?}", path);
    }

    if args.debug_report {
        let report = create_debug_info(&cuts, &args.videos, fps, include_audio, is_multi_cam);
        let path = files::save_debug_file(&report, &args.cuts)?;
        info!("wrote debug report {:?}", path);
    }

    println!("{}", format_cuts_summary(&cuts));

    Ok(())
}
