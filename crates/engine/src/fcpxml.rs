use std::path::Path;

use uuid::Uuid;

use crate::cut::Cut;
use crate::error::GenerateError;

pub const FCPXML_VERSION: &str = "1.10";

/// Asset duration advertised in the resources block. Real media length
/// is not probed here; the consuming editor resolves the actual file.
const PLACEHOLDER_ASSET_DURATION_SECS: f64 = 9999.0;

/// Encode seconds as an FCPXML rational time string.
///
/// The frame count rounds half away from zero. The timescale is the
/// integer truncation of the frame rate, so fractional rates like
/// 29.97 use a 29 denominator rather than a true NTSC rational
/// (30000/1001). A deliberate simplification, kept so emitted values
/// stay stable.
pub fn seconds_to_fcpxml_time(seconds: f64, fps: f64) -> String {
    let frames = (seconds * fps).round() as i64;
    format!("{}/{}s", frames, fps as i64)
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Build a file-scheme URI for the source. Only spaces are escaped;
/// other URI-unsafe characters pass through unchanged.
fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display().to_string().replace(' ', "%20"))
}

/// Generate a single-source FCPXML document: one asset, one project,
/// one spine with an asset-clip per positive-duration cut.
///
/// Cuts with `end <= start` are skipped entirely; they emit no clip
/// and do not advance the timeline offset. The sequence duration
/// header, however, sums every cut as-is.
pub fn generate_single_fcpxml(
    cuts: &[Cut],
    video_path: &Path,
    fps: f64,
    include_audio: bool,
    project_name: &str,
) -> Result<String, GenerateError> {
    if fps <= 0.0 {
        return Err(GenerateError::NonPositiveFps(fps));
    }
    if !cuts.iter().any(|cut| cut.duration() > 0.0) {
        return Err(GenerateError::NoUsableCuts);
    }

    let source_filename = file_name(video_path);
    let asset_name = file_stem(video_path);

    let asset_id = fresh_id();
    let project_id = fresh_id();
    let event_id = fresh_id();

    let total_duration: f64 = cuts.iter().map(Cut::duration).sum();
    let total_duration_fcpxml = seconds_to_fcpxml_time(total_duration, fps);

    let audio_attrs = if include_audio {
        r#"hasAudio="1" audioSources="1" audioChannels="2""#
    } else {
        ""
    };

    let fps_int = fps as i64;
    let mut doc = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE fcpxml>
<fcpxml version="{version}">
    <resources>
        <format id="r1" name="FFVideoFormat{fps_int}p" frameDuration="1/{fps_int}s" width="1920" height="1080" colorSpace="1-1-1 (Rec. 709)"/>
        <asset id="{asset_id}" name="{asset_name}" uid="{asset_id}" src="{src}" start="0s" hasVideo="1" {audio_attrs} format="r1" duration="{asset_duration}"/>
    </resources>
    <library>
        <event id="{event_id}" name="Auto Generated Timeline">
            <project id="{project_id}" name="{project_name}">
                <sequence format="r1" duration="{total_duration_fcpxml}">
                    <spine>"#,
        version = FCPXML_VERSION,
        src = file_uri(video_path),
        asset_duration = seconds_to_fcpxml_time(PLACEHOLDER_ASSET_DURATION_SECS, fps),
    );

    let mut timeline_position = 0.0;
    for (i, cut) in cuts.iter().enumerate() {
        let duration = cut.duration();
        if duration <= 0.0 {
            continue;
        }

        doc.push_str(&format!(
            "\n                        <asset-clip id=\"{clip_id}\" name=\"{source_filename}_cut_{n}\" ref=\"{asset_id}\" offset=\"{offset}\" start=\"{start}\" duration=\"{duration}\"/>",
            clip_id = fresh_id(),
            n = i + 1,
            offset = seconds_to_fcpxml_time(timeline_position, fps),
            start = seconds_to_fcpxml_time(cut.start, fps),
            duration = seconds_to_fcpxml_time(duration, fps),
        ));

        timeline_position += duration;
    }

    doc.push_str(
        r#"
                    </spine>
                </sequence>
            </project>
        </event>
    </library>
</fcpxml>"#,
    );

    Ok(doc)
}

/// Generate one independent document per source video, all sharing the
/// identical cut list and relative timing. Returns `(document, source
/// filename)` pairs in input order.
pub fn generate_multi_fcpxml(
    cuts: &[Cut],
    video_paths: &[impl AsRef<Path>],
    fps: f64,
    include_audio: bool,
) -> Result<Vec<(String, String)>, GenerateError> {
    if video_paths.is_empty() {
        return Err(GenerateError::NoVideoSources);
    }

    let mut results = Vec::with_capacity(video_paths.len());

    for video_path in video_paths {
        let video_path = video_path.as_ref();
        let project_name = format!("{}_Timeline", file_stem(video_path));
        let doc = generate_single_fcpxml(cuts, video_path, fps, include_audio, &project_name)?;
        results.push((doc, file_name(video_path)));
    }

    Ok(results)
}

/// Plain-text diagnostic report for a generation run. Human-readable
/// only; nothing parses it downstream.
pub fn create_debug_info(
    cuts: &[Cut],
    video_paths: &[impl AsRef<Path>],
    fps: f64,
    include_audio: bool,
    is_multi_cam: bool,
) -> String {
    let total_duration: f64 = cuts.iter().map(Cut::duration).sum();

    let mut report = String::from("=== FCPXML DEBUG INFO ===\n");
    report.push_str(&format!(
        "Mode: {}\n",
        if is_multi_cam { "Multi-camera" } else { "Single camera" }
    ));
    report.push_str(&format!("Number of Videos: {}\n", video_paths.len()));
    report.push_str(&format!("Include Audio: {}\n", include_audio));
    report.push_str(&format!("Number of Cuts: {}\n", cuts.len()));
    report.push_str(&format!("Frame Rate: {}\n", fps));
    report.push_str(&format!("Total Duration: {:.1} seconds\n", total_duration));

    report.push_str("\n=== VIDEO SOURCES ===\n");
    for (i, video_path) in video_paths.iter().enumerate() {
        report.push_str(&format!("{}. {}\n", i + 1, file_name(video_path.as_ref())));
    }

    report.push_str("\n=== CUT LIST ===\n");
    for (i, cut) in cuts.iter().enumerate() {
        report.push_str(&format!(
            "Cut {}: {}s - {}s ({:.1}s)\n",
            i + 1,
            cut.start,
            cut.end,
            cut.duration()
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn attr_values(doc: &str, element: &str, attr: &str) -> Vec<String> {
        let needle = format!("{}=\"", attr);
        doc.lines()
            .filter(|line| line.trim_start().starts_with(&format!("<{} ", element)))
            .map(|line| {
                let rest = &line[line.find(&needle).unwrap() + needle.len()..];
                rest[..rest.find('"').unwrap()].to_string()
            })
            .collect()
    }

    #[test]
    fn time_encoding_at_integer_rates() {
        assert_eq!(seconds_to_fcpxml_time(5.0, 30.0), "150/30s");
        assert_eq!(seconds_to_fcpxml_time(0.0, 30.0), "0/30s");
        assert_eq!(seconds_to_fcpxml_time(1.0, 24.0), "24/24s");
    }

    #[test]
    fn time_encoding_rounds_half_away_from_zero() {
        // 0.05s at 30fps is exactly 1.5 frames.
        assert_eq!(seconds_to_fcpxml_time(0.05, 30.0), "2/30s");
    }

    #[test]
    fn time_encoding_truncates_fractional_rates() {
        // 29.97 keeps a 29 denominator; no NTSC rational is modeled.
        assert_eq!(seconds_to_fcpxml_time(1.0, 29.97), "30/29s");
    }

    #[test]
    fn time_encoding_stays_within_one_frame() {
        let fps = 30.0;
        for seconds in [0.0, 0.013, 1.5, 59.99, 3600.2] {
            let encoded = seconds_to_fcpxml_time(seconds, fps);
            let frames: f64 = encoded[..encoded.find('/').unwrap()].parse().unwrap();
            assert!((frames / fps - seconds).abs() <= 1.0 / fps, "{}", encoded);
        }
    }

    #[test]
    fn single_document_places_clips_back_to_back() {
        let cuts = vec![Cut::new(0.0, 5.0), Cut::new(10.0, 15.0)];
        let doc = generate_single_fcpxml(
            &cuts,
            Path::new("/media/video.mp4"),
            30.0,
            true,
            "Timeline",
        )
        .unwrap();

        assert_eq!(attr_values(&doc, "asset-clip", "offset"), ["0/30s", "150/30s"]);
        assert_eq!(
            attr_values(&doc, "asset-clip", "duration"),
            ["150/30s", "150/30s"]
        );
        assert_eq!(attr_values(&doc, "asset-clip", "start"), ["0/30s", "300/30s"]);
        assert_eq!(attr_values(&doc, "sequence", "duration"), ["300/30s"]);
        assert!(doc.contains(r#"<fcpxml version="1.10">"#));
        assert!(doc.contains(r#"name="video.mp4_cut_1""#));
        assert!(doc.contains(r#"src="file:///media/video.mp4""#));
        assert!(doc.contains(r#"hasAudio="1""#));
    }

    #[test]
    fn zero_duration_cut_emits_nothing_and_keeps_offsets() {
        let cuts = vec![Cut::new(0.0, 5.0), Cut::new(5.0, 5.0), Cut::new(10.0, 15.0)];
        let doc =
            generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 30.0, true, "Timeline").unwrap();

        let offsets = attr_values(&doc, "asset-clip", "offset");
        assert_eq!(offsets, ["0/30s", "150/30s"]);
        // Clip numbering follows the original list, so the skipped cut
        // leaves a gap.
        assert!(doc.contains("v.mp4_cut_1"));
        assert!(!doc.contains("v.mp4_cut_2\""));
        assert!(doc.contains("v.mp4_cut_3"));
    }

    #[test]
    fn audio_attributes_are_omitted_when_disabled() {
        let cuts = vec![Cut::new(0.0, 5.0)];
        let doc =
            generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 30.0, false, "Timeline").unwrap();
        assert!(!doc.contains("hasAudio"));
    }

    #[test]
    fn spaces_in_the_source_path_are_escaped() {
        let cuts = vec![Cut::new(0.0, 5.0)];
        let doc = generate_single_fcpxml(
            &cuts,
            Path::new("/media/my clip.mp4"),
            30.0,
            true,
            "Timeline",
        )
        .unwrap();
        assert!(doc.contains(r#"src="file:///media/my%20clip.mp4""#));
    }

    #[test]
    fn rejects_non_positive_frame_rate() {
        let cuts = vec![Cut::new(0.0, 5.0)];
        assert!(matches!(
            generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 0.0, true, "T"),
            Err(GenerateError::NonPositiveFps(_))
        ));
        assert!(matches!(
            generate_single_fcpxml(&cuts, Path::new("/v.mp4"), -30.0, true, "T"),
            Err(GenerateError::NonPositiveFps(_))
        ));
    }

    #[test]
    fn rejects_cut_lists_with_no_usable_cut() {
        let cuts = vec![Cut::new(5.0, 5.0), Cut::new(10.0, 8.0)];
        assert!(matches!(
            generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 30.0, true, "T"),
            Err(GenerateError::NoUsableCuts)
        ));
        assert!(matches!(
            generate_single_fcpxml(&[], Path::new("/v.mp4"), 30.0, true, "T"),
            Err(GenerateError::NoUsableCuts)
        ));
    }

    #[test]
    fn ids_are_unique_across_calls() {
        let cuts = vec![Cut::new(0.0, 5.0)];
        let a = generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 30.0, true, "T").unwrap();
        let b = generate_single_fcpxml(&cuts, Path::new("/v.mp4"), 30.0, true, "T").unwrap();
        assert_ne!(attr_values(&a, "asset", "id"), attr_values(&b, "asset", "id"));
    }

    #[test]
    fn multi_source_emits_one_document_per_video() {
        let cuts = vec![Cut::new(0.0, 5.0), Cut::new(10.0, 15.0)];
        let videos = [PathBuf::from("/cam a.mp4"), PathBuf::from("/cam_b.mov")];
        let results = generate_multi_fcpxml(&cuts, &videos, 30.0, true).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1, "cam a.mp4");
        assert_eq!(results[1].1, "cam_b.mov");
        assert!(results[0].0.contains(r#"name="cam a_Timeline""#));
        assert!(results[1].0.contains(r#"name="cam_b_Timeline""#));

        // Identical cut placement, independent identifiers.
        for (doc, _) in &results {
            assert_eq!(attr_values(doc, "asset-clip", "offset"), ["0/30s", "150/30s"]);
        }
        assert_ne!(
            attr_values(&results[0].0, "asset", "id"),
            attr_values(&results[1].0, "asset", "id")
        );
    }

    #[test]
    fn multi_source_rejects_an_empty_video_list() {
        let cuts = vec![Cut::new(0.0, 5.0)];
        let videos: Vec<PathBuf> = Vec::new();
        assert!(matches!(
            generate_multi_fcpxml(&cuts, &videos, 30.0, true),
            Err(GenerateError::NoVideoSources)
        ));
    }

    #[test]
    fn debug_report_lists_sources_and_cuts() {
        let cuts = vec![Cut::new(0.0, 5.0), Cut::new(10.0, 15.0)];
        let videos = [PathBuf::from("/a.mp4"), PathBuf::from("/b.mp4")];
        let report = create_debug_info(&cuts, &videos, 30.0, true, true);

        assert!(report.contains("Mode: Multi-camera"));
        assert!(report.contains("Number of Videos: 2"));
        assert!(report.contains("Number of Cuts: 2"));
        assert!(report.contains("Total Duration: 10.0 seconds"));
        assert!(report.contains("1. a.mp4"));
        assert!(report.contains("Cut 2: 10s - 15s (5.0s)"));
    }
}
