//! Transcript export formats for the `transcript` command.

use super::Transcript;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TranscriptFormat {
    /// Plain text, segments joined by a single space.
    #[default]
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(TranscriptFormat::Text),
            "json" => Ok(TranscriptFormat::Json),
            "srt" => Ok(TranscriptFormat::Srt),
            "vtt" | "webvtt" => Ok(TranscriptFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    video_id: &'a str,
    language: &'a str,
    word_count: usize,
    text: String,
    segments: &'a [super::TranscriptSegment],
}

/// Render a transcript in the requested format.
pub fn format_transcript(transcript: &Transcript, format: TranscriptFormat) -> String {
    match format {
        TranscriptFormat::Text => transcript.text(),
        TranscriptFormat::Json => {
            let export = JsonExport {
                video_id: &transcript.video_id,
                language: &transcript.language,
                word_count: transcript.word_count(),
                text: transcript.text(),
                segments: &transcript.segments,
            };
            serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
        }
        TranscriptFormat::Srt => cues(transcript, String::new(), ','),
        TranscriptFormat::Vtt => cues(transcript, "WEBVTT\n\n".to_string(), '.'),
    }
}

/// Numbered subtitle cues; SRT and WebVTT differ only in header and millisecond separator.
fn cues(transcript: &Transcript, mut output: String, ms_separator: char) -> String {
    for (i, segment) in transcript.segments.iter().enumerate() {
        let end = segment.start_seconds + segment.duration_seconds;
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            timestamp(segment.start_seconds, ms_separator),
            timestamp(end, ms_separator),
            segment.text
        ));
    }
    output
}

fn timestamp(seconds: f64, ms_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        ms_separator,
        total_ms % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn sample() -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "en".to_string(),
            segments: vec![
                TranscriptSegment {
                    text: "Hello world.".to_string(),
                    start_seconds: 0.0,
                    duration_seconds: 2.5,
                },
                TranscriptSegment {
                    text: "This is a graph.".to_string(),
                    start_seconds: 2.5,
                    duration_seconds: 2.5,
                },
            ],
        }
    }

    #[test]
    fn test_text() {
        assert_eq!(
            format_transcript(&sample(), TranscriptFormat::Text),
            "Hello world. This is a graph."
        );
    }

    #[test]
    fn test_json() {
        let json = format_transcript(&sample(), TranscriptFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["video_id"], "dQw4w9WgXcQ");
        assert_eq!(value["word_count"], 6);
        assert_eq!(value["segments"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_srt_and_vtt() {
        let srt = format_transcript(&sample(), TranscriptFormat::Srt);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,500\nHello world."));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));

        let vtt = format_transcript(&sample(), TranscriptFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.500"));
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp(61.5, ','), "00:01:01,500");
        assert_eq!(timestamp(3661.123, '.'), "01:01:01.123");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("TXT".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Text);
        assert_eq!("webvtt".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Vtt);
        assert!("docx".parse::<TranscriptFormat>().is_err());
    }
}
