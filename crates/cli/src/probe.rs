use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

pub const DEFAULT_FPS: f64 = 30.0;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Plausible frame-rate range for detected values. Anything outside is
/// treated as a misread and discarded.
const FPS_RANGE: std::ops::RangeInclusive<f64> = 20.0..=120.0;

#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    pub fps: Option<f64>,
    pub duration_seconds: Option<f64>,
}

/// Media-probing capability. Probing is best-effort: any failure
/// (missing tool, timeout, malformed output) yields `None` and the
/// caller falls back to heuristics.
#[async_trait]
pub trait MediaProbe {
    async fn probe(&self, path: &Path) -> Option<ProbeResult>;
}

#[derive(Debug, Clone, Deserialize)]
struct ProbeOutput {
    format: Option<FormatInfo>,
    #[serde(default)]
    streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// ffprobe-backed probe. Execution is bounded by a fixed timeout so a
/// wedged subprocess can never hang the caller.
pub struct FfprobeAnalyzer;

#[async_trait]
impl MediaProbe for FfprobeAnalyzer {
    async fn probe(&self, path: &Path) -> Option<ProbeResult> {
        let output = timeout(
            PROBE_TIMEOUT,
            Command::new("ffprobe")
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration:stream=codec_type,r_frame_rate,avg_frame_rate",
                    "-of",
                    "json",
                ])
                .arg(path)
                .output(),
        )
        .await
        .ok()?
        .ok()?;

        if !output.status.success() {
            debug!("ffprobe failed for {:?}", path);
            return None;
        }

        let parsed: ProbeOutput = serde_json::from_slice(&output.stdout).ok()?;

        let duration_seconds = parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok());

        let video_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));

        // r_frame_rate is usually the more accurate field; fall back to
        // the average rate, keeping the first plausible candidate.
        let fps = video_stream.and_then(|vs| {
            [vs.r_frame_rate.as_deref(), vs.avg_frame_rate.as_deref()]
                .into_iter()
                .flatten()
                .filter_map(parse_fraction)
                .find(|fps| FPS_RANGE.contains(fps))
        });

        Some(ProbeResult {
            fps,
            duration_seconds,
        })
    }
}

/// Parse a frame-rate fraction like "30/1" or "30000/1001". Plain
/// numbers pass through.
pub fn parse_fraction(fraction: &str) -> Option<f64> {
    match fraction.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => fraction.parse().ok(),
    }
}

/// Snap a detected rate to the nearest canonical value (24/25/30/60
/// within half a frame), rounding uncommon rates to the nearest
/// integer.
pub fn snap_to_common_fps(fps: f64) -> f64 {
    if (23.5..=24.5).contains(&fps) {
        24.0
    } else if (24.5..=25.5).contains(&fps) {
        25.0
    } else if (29.5..=30.5).contains(&fps) {
        30.0
    } else if (59.5..=60.5).contains(&fps) {
        60.0
    } else {
        fps.round()
    }
}

/// Guess the frame rate from filename conventions like "24fps" or
/// "24p" when probing is unavailable.
pub fn fps_from_filename(path: &Path) -> Option<f64> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase())?;

    for (rate, tags) in [
        (24.0, ["24fps", "24p"]),
        (25.0, ["25fps", "25p"]),
        (30.0, ["30fps", "30p"]),
        (60.0, ["60fps", "60p"]),
    ] {
        if tags.iter().any(|tag| filename.contains(tag)) {
            return Some(rate);
        }
    }

    None
}

/// Resolve the frame rate to use for a video: probe result snapped to
/// a common rate, else filename heuristic, else the default. Never
/// fails.
pub async fn resolve_fps(probe: &dyn MediaProbe, path: &Path) -> f64 {
    if let Some(result) = probe.probe(path).await {
        if let Some(fps) = result.fps {
            return snap_to_common_fps(fps);
        }
    }

    fps_from_filename(path).unwrap_or(DEFAULT_FPS)
}
