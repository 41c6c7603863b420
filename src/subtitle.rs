use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::align::Cue;
use crate::config::OutputConfig;
use crate::error::{CuesyncError, Result};

/// Subtitle container written for a cue sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
}

impl SubtitleFormat {
    /// `.srt` selects SubRip; everything else is WebVTT.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("srt") => SubtitleFormat::Srt,
            _ => SubtitleFormat::WebVtt,
        }
    }
}

/// Write cues to `output_path`, picking the format from its extension
pub async fn write_subtitles<P: AsRef<Path>>(
    cues: &[Cue<'_>],
    output_path: P,
    output: &OutputConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let format = SubtitleFormat::from_path(output_path);
    info!("Generating {:?} file: {}", format, output_path.display());

    let content = match format {
        SubtitleFormat::WebVtt => render_vtt(cues, output),
        SubtitleFormat::Srt => render_srt(cues),
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(output_path, content).await
        .map_err(CuesyncError::Io)?;

    info!("Subtitle file generated successfully");
    Ok(())
}

pub fn render_vtt(cues: &[Cue<'_>], output: &OutputConfig) -> String {
    let mut vtt_content = String::from("WEBVTT\n\n");

    for cue in cues {
        let mut body = format!(
            "<span class=\"{}\">{}</span>",
            output.source_class,
            escape_vtt(&cue.transcript.text)
        );
        if let Some(translation) = cue.transcript.translation.as_deref().filter(|t| !t.is_empty()) {
            body.push_str(&format!(
                "<br/><span class=\"{}\">{}</span>",
                output.translation_class,
                escape_vtt(translation)
            ));
        }

        vtt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.identifier,
            format_vtt_time(cue.start),
            format_vtt_time(cue.end),
            body
        ));
    }

    vtt_content
}

pub fn render_srt(cues: &[Cue<'_>]) -> String {
    let mut srt_content = String::new();

    for (index, cue) in cues.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n",
            index + 1,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.transcript.text.trim()
        ));
        if let Some(translation) = cue.transcript.translation.as_deref().filter(|t| !t.is_empty()) {
            srt_content.push_str(translation.trim());
            srt_content.push('\n');
        }
        srt_content.push('\n');
    }

    srt_content
}

/// Escape the characters WebVTT treats as markup
pub fn escape_vtt(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Split seconds into (hours, minutes, seconds, millis).
///
/// Milliseconds are the rounded fraction of the floored second; a fraction
/// that rounds to 1000 carries into the next second.
fn split_time(seconds: f64) -> (u64, u64, u64, u64) {
    let seconds = seconds.max(0.0);
    let whole = seconds.floor();
    let total_milliseconds = whole as u64 * 1000 + ((seconds - whole) * 1000.0).round() as u64;

    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;
    (hours, minutes, secs, millis)
}

/// Format time in seconds to WebVTT time format (HH:MM:SS.mmm)
pub fn format_vtt_time(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_time(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_time(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignmentMethod;
    use crate::transcript::TranscriptLine;

    fn cue<'a>(line: &'a TranscriptLine, start: f64, end: f64) -> Cue<'a> {
        Cue {
            identifier: format!("line-{}", line.index),
            start,
            end,
            transcript: line,
            method: AlignmentMethod::Matched { matched: 1, tokens: 1 },
        }
    }

    #[test]
    fn test_format_vtt_time() {
        assert_eq!(format_vtt_time(0.0), "00:00:00.000");
        assert_eq!(format_vtt_time(65.123), "00:01:05.123");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        assert_eq!(format_vtt_time(1.001), "00:00:01.001");
    }

    #[test]
    fn test_format_time_carries_rounded_millis() {
        assert_eq!(format_vtt_time(59.9996), "00:01:00.000");
        assert_eq!(format_srt_time(3599.9999), "01:00:00,000");
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_escape_vtt() {
        assert_eq!(escape_vtt("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_vtt("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_render_vtt_with_and_without_translation() {
        let first = TranscriptLine {
            index: 0,
            text: "Olá <mundo>".to_string(),
            translation: Some("Hello & welcome".to_string()),
        };
        let second = TranscriptLine {
            index: 1,
            text: "Tchau".to_string(),
            translation: None,
        };
        let cues = vec![cue(&first, 0.0, 1.0), cue(&second, 1.001, 2.5)];

        let vtt = render_vtt(&cues, &OutputConfig::default());
        let expected = "WEBVTT\n\n\
            line-0\n00:00:00.000 --> 00:00:01.000\n\
            <span class=\"pt\">Olá &lt;mundo&gt;</span><br/><span class=\"en\">Hello &amp; welcome</span>\n\n\
            line-1\n00:00:01.001 --> 00:00:02.500\n\
            <span class=\"pt\">Tchau</span>\n\n";
        assert_eq!(vtt, expected);
    }

    #[test]
    fn test_render_srt() {
        let line = TranscriptLine {
            index: 0,
            text: "Olá".to_string(),
            translation: Some("Hello".to_string()),
        };
        let srt = render_srt(&[cue(&line, 0.5, 1.25)]);
        assert_eq!(srt, "1\n00:00:00,500 --> 00:00:01,250\nOlá\nHello\n\n");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SubtitleFormat::from_path(Path::new("out.srt")), SubtitleFormat::Srt);
        assert_eq!(SubtitleFormat::from_path(Path::new("out.SRT")), SubtitleFormat::Srt);
        assert_eq!(SubtitleFormat::from_path(Path::new("out.vtt")), SubtitleFormat::WebVtt);
        assert_eq!(SubtitleFormat::from_path(Path::new("out")), SubtitleFormat::WebVtt);
    }

    #[tokio::test]
    async fn test_write_subtitles_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("talk.vtt");
        let line = TranscriptLine {
            index: 0,
            text: "Olá".to_string(),
            translation: None,
        };

        write_subtitles(&[cue(&line, 0.0, 1.0)], &path, &OutputConfig::default()).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("WEBVTT\n\nline-0\n00:00:00.000 --> 00:00:01.000\n"));
    }
}
