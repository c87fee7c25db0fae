//! ffmpeg-backed slide renderer.
//!
//! Each slide becomes a short H.264 clip: a solid `color` source with the
//! title and body drawn by `drawtext`. The clips are joined with the concat
//! demuxer and the narration is muxed on top as AAC.

use super::{plan_timeline, Renderer, Timing, VideoArtifact};
use crate::config::RenderSettings;
use crate::deck::{Slide, SlideDeck};
use crate::error::{Result, TubedeckError};
use crate::narrate::AudioArtifact;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

pub struct FfmpegRenderer {
    settings: RenderSettings,
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }

    fn timing(&self) -> Timing {
        Timing {
            seconds_per_slide: self.settings.seconds_per_slide,
            min_slide_seconds: self.settings.min_slide_seconds,
        }
    }

    /// The `-vf` graph drawing one slide's text files.
    fn slide_filter(&self, title_file: &Path, body_file: &Path) -> String {
        let s = &self.settings;
        let font = s
            .font_file
            .as_deref()
            .map(|f| {
                format!(
                    ":fontfile='{}'",
                    escape_filter_value(&shellexpand::tilde(f))
                )
            })
            .unwrap_or_default();

        format!(
            "drawtext=textfile='{title}'{font}:fontcolor={color}:fontsize={tsize}:x=(w-text_w)/2:y=h*0.12,\
             drawtext=textfile='{body}'{font}:fontcolor={color}:fontsize={bsize}:line_spacing=12:x=(w-text_w)/2:y=(h-text_h)/2",
            title = escape_filter_value(&title_file.to_string_lossy()),
            body = escape_filter_value(&body_file.to_string_lossy()),
            font = font,
            color = s.font_color,
            tsize = s.title_font_size,
            bsize = s.body_font_size,
        )
    }

    fn segment_args(&self, filter: String, seconds: f64, out: &Path) -> Vec<OsString> {
        let s = &self.settings;
        let source = format!(
            "color=c={}:s={}x{}:r={}:d={:.3}",
            s.background, s.width, s.height, s.fps, seconds
        );

        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "lavfi", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(source.into());
        args.push("-vf".into());
        args.push(filter.into());
        for arg in ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-t"] {
            args.push(arg.into());
        }
        args.push(format!("{:.3}", seconds).into());
        args.push(out.as_os_str().to_owned());
        args
    }

    async fn render_slide(&self, slide: &Slide, idx: usize, seconds: f64, work: &Path) -> Result<PathBuf> {
        let title_file = work.join(format!("title_{:03}.txt", idx));
        let body_file = work.join(format!("body_{:03}.txt", idx));
        let out = work.join(format!("slide_{:03}.mp4", idx));

        tokio::fs::write(&title_file, &slide.title).await?;
        tokio::fs::write(&body_file, textwrap::fill(&slide.body, self.settings.wrap_width)).await?;

        let filter = self.slide_filter(&title_file, &body_file);
        run_tool(&self.ffmpeg, self.segment_args(filter, seconds, &out)).await?;

        debug!("Rendered slide {} ({:.1}s)", idx + 1, seconds);
        Ok(out)
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    #[instrument(skip(self, deck, narration), fields(slides = deck.len()))]
    async fn render(
        &self,
        deck: &SlideDeck,
        narration: Option<&AudioArtifact>,
        dest: &Path,
    ) -> Result<VideoArtifact> {
        if deck.is_empty() {
            return Err(TubedeckError::Render("deck has no slides".to_string()));
        }

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let work = tempfile::Builder::new().prefix("render-").tempdir_in(parent)?;

        let total = match narration {
            Some(audio) => Some(probe_duration(&self.ffprobe, &audio.path).await?),
            None => None,
        };
        let durations = plan_timeline(deck, total, self.timing());
        info!("Rendering {} slides", deck.len());

        let mut clips = Vec::with_capacity(deck.len());
        for (idx, (slide, seconds)) in deck.slides.iter().zip(&durations).enumerate() {
            clips.push(self.render_slide(slide, idx, *seconds, work.path()).await?);
        }

        let list = work.path().join("slides.txt");
        tokio::fs::write(&list, concat_list(&clips)).await?;

        run_tool(&self.ffmpeg, mux_args(&list, narration.map(|a| a.path.as_path()), dest)).await?;

        Ok(VideoArtifact {
            path: dest.to_path_buf(),
            duration_seconds: total.unwrap_or_else(|| durations.iter().sum()),
        })
    }
}

/// Concat demuxer input listing the clips in order.
fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|c| format!("file '{}'\n", c.to_string_lossy().replace('\'', r"'\''")))
        .collect()
}

fn mux_args(list: &Path, narration: Option<&Path>, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(list.as_os_str().to_owned());

    match narration {
        Some(audio) => {
            args.push("-i".into());
            args.push(audio.as_os_str().to_owned());
            for arg in [
                "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "aac", "-b:a", "192k",
                "-shortest",
            ] {
                args.push(arg.into());
            }
        }
        None => {
            for arg in ["-c:v", "copy"] {
                args.push(arg.into());
            }
        }
    }

    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(dest.as_os_str().to_owned());
    args
}

/// Escape a value for use inside single quotes in an ffmpeg filter graph.
///
/// The graph parser strips the quotes but keeps backslashes inside them, and
/// option parsing then splits on `:` and unescapes, so `:` still needs `\:`.
fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('\'', r"'\\\''")
        .replace(':', r"\:")
}

async fn run_tool(program: &Path, args: Vec<OsString>) -> Result<()> {
    let tool = program.to_string_lossy().to_string();
    let result = Command::new(program)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(TubedeckError::Render(format!("{} failed: {}", tool, err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TubedeckError::ToolNotFound(tool)),
        Err(e) => Err(TubedeckError::Render(format!("{} error: {}", tool, e))),
    }
}

/// Media duration in seconds, read from ffprobe's JSON output.
pub async fn probe_duration(ffprobe: &Path, path: &Path) -> Result<f64> {
    let result = Command::new(ffprobe)
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TubedeckError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => return Err(TubedeckError::Render(format!("ffprobe failed: {}", e))),
    };

    if !output.status.success() {
        return Err(TubedeckError::Render(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| TubedeckError::Render("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| TubedeckError::Render("Could not determine narration duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "narration.mp3", "duration": "12.480000"}}"#;
        assert!((parse_probe_duration(json).unwrap() - 12.48).abs() < 1e-9);
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("garbage").is_err());
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("/tmp/a:b"), r"/tmp/a\:b");
        assert_eq!(escape_filter_value("it's"), r"it'\\\''s");
    }

    /// ffmpeg's tokenizer: backslash escapes one char, quotes are literal up
    /// to the closing quote, and any char in `term` ends the token.
    fn ffmpeg_token<'a>(input: &'a str, term: &str) -> (String, &'a str) {
        let mut out = String::new();
        let mut chars = input.char_indices().peekable();
        while let Some(&(i, c)) = chars.peek() {
            if term.contains(c) {
                return (out, &input[i..]);
            }
            chars.next();
            match c {
                '\\' => {
                    if let Some((_, next)) = chars.next() {
                        out.push(next);
                    }
                }
                '\'' => {
                    for (_, q) in chars.by_ref() {
                        if q == '\'' {
                            break;
                        }
                        out.push(q);
                    }
                }
                _ => out.push(c),
            }
        }
        (out, "")
    }

    #[test]
    fn test_escaped_paths_survive_both_parse_levels() {
        for value in ["/tmp/run:1/title.txt", "C:\\fonts\\Sans.ttf", "it's", "a'b:c\\d"] {
            let graph = format!("textfile='{}':fontsize=36", escape_filter_value(value));

            let (filter_args, _) = ffmpeg_token(&graph, "[],;");
            let option = filter_args.strip_prefix("textfile=").unwrap();
            let (parsed, rest) = ffmpeg_token(option, ":");

            assert_eq!(parsed, value);
            assert_eq!(rest, ":fontsize=36");
        }
    }

    #[test]
    fn test_slide_filter_with_colon_in_paths() {
        let renderer = FfmpegRenderer::new(RenderSettings {
            font_file: Some("/fonts:x/Sans.ttf".to_string()),
            ..Default::default()
        });
        let filter = renderer.slide_filter(Path::new("/w:1/t.txt"), Path::new("/w:1/b.txt"));

        let (first, _) = ffmpeg_token(&filter, "[],;");
        let mut options = Vec::new();
        let mut rest = first.strip_prefix("drawtext=").unwrap();
        while !rest.is_empty() {
            let (option, tail) = ffmpeg_token(rest, ":");
            options.push(option);
            rest = tail.strip_prefix(':').unwrap_or(tail);
        }

        assert_eq!(options[0], "textfile=/w:1/t.txt");
        assert_eq!(options[1], "fontfile=/fonts:x/Sans.ttf");
    }

    #[test]
    fn test_slide_filter() {
        let renderer = FfmpegRenderer::new(RenderSettings::default());
        let filter = renderer.slide_filter(Path::new("/w/title_000.txt"), Path::new("/w/body_000.txt"));

        assert!(filter.starts_with("drawtext=textfile='/w/title_000.txt':fontcolor=white:fontsize=56"));
        assert!(filter.contains(",drawtext=textfile='/w/body_000.txt':fontcolor=white:fontsize=36"));
        assert!(!filter.contains("fontfile"));
    }

    #[test]
    fn test_slide_filter_with_font() {
        let renderer = FfmpegRenderer::new(RenderSettings {
            font_file: Some("/fonts/DejaVuSans.ttf".to_string()),
            ..Default::default()
        });
        let filter = renderer.slide_filter(Path::new("/w/t.txt"), Path::new("/w/b.txt"));
        assert_eq!(filter.matches(":fontfile='/fonts/DejaVuSans.ttf'").count(), 2);
    }

    #[test]
    fn test_segment_args() {
        let renderer = FfmpegRenderer::new(RenderSettings::default());
        let args = strings(&renderer.segment_args("null".to_string(), 3.5, Path::new("/w/s.mp4")));

        assert!(args.contains(&"color=c=0x1e1e2e:s=1280x720:r=25:d=3.500".to_string()));
        assert_eq!(args.last().unwrap(), "/w/s.mp4");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "3.500");
    }

    #[test]
    fn test_mux_args_with_and_without_narration() {
        let with = strings(&mux_args(
            Path::new("/w/slides.txt"),
            Some(Path::new("/w/narration.mp3")),
            Path::new("/out/presentation.mp4"),
        ));
        assert!(with.contains(&"-shortest".to_string()));
        assert!(with.contains(&"aac".to_string()));
        assert!(with.contains(&"/w/narration.mp3".to_string()));

        let without = strings(&mux_args(Path::new("/w/slides.txt"), None, Path::new("/out/p.mp4")));
        assert!(!without.contains(&"-shortest".to_string()));
        assert_eq!(without.last().unwrap(), "/out/p.mp4");
    }

    #[test]
    fn test_concat_list() {
        let list = concat_list(&[PathBuf::from("/w/slide_000.mp4"), PathBuf::from("/w/slide_001.mp4")]);
        assert_eq!(list, "file '/w/slide_000.mp4'\nfile '/w/slide_001.mp4'\n");
    }

    #[tokio::test]
    async fn test_empty_deck_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let renderer = FfmpegRenderer::new(RenderSettings::default());
        let err = renderer
            .render(&SlideDeck::default(), None, &dir.path().join("p.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, TubedeckError::Render(_)));
    }
}
