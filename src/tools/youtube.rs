//! YouTube video summaries built from caption transcripts.

use super::Tool;
use crate::config::YoutubeSettings;
use crate::error::{Result, StudymateError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

const PROVIDER: &str = "YouTube";
const TOOL_NAME: &str = "YouTube Summary Tool";

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("Invalid regex"));

/// Extract a video ID from a watch URL, a short URL, or a bare 11-character ID.
///
/// Returns `None` when nothing usable is found.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if input.contains("youtube.com") || input.contains("youtu.be") {
        let url = Url::parse(input).ok()?;
        let id = match url.host_str()? {
            "youtu.be" => url.path().trim_start_matches('/').to_string(),
            "www.youtube.com" | "youtube.com" | "m.youtube.com" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?,
            _ => return None,
        };
        return (!id.is_empty()).then_some(id);
    }

    VIDEO_ID.is_match(input).then(|| input.to_string())
}

/// One timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// Join transcript text and keep the first `max_sentences` sentences.
///
/// Returns `None` if the transcript has no sentence content.
pub fn summarize_transcript(segments: &[TranscriptSegment], max_sentences: usize) -> Option<String> {
    let full_text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let sentences: Vec<&str> = SENTENCE_END
        .split(&full_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max_sentences)
        .collect();

    if sentences.is_empty() {
        return None;
    }

    Some(format!("{}.", sentences.join(". ")))
}

/// Source of video transcripts.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript for a video. An empty list means no captions exist.
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Default, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Reads caption tracks from the public watch page.
pub struct YoutubeTranscriptFetcher {
    http: reqwest::Client,
    watch_endpoint: String,
    preferred_language: String,
}

impl YoutubeTranscriptFetcher {
    pub fn new(http: reqwest::Client, settings: &YoutubeSettings) -> Self {
        Self {
            http,
            watch_endpoint: settings.watch_endpoint.clone(),
            preferred_language: settings.preferred_language.clone(),
        }
    }

    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let response = self
            .http
            .get(&self.watch_endpoint)
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudymateError::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let page = response.text().await?;
        match find_json_array(&page, "\"captionTracks\":") {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => {
                debug!("No caption tracks on watch page for {}", video_id);
                Ok(Vec::new())
            }
        }
    }

    fn choose_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        let preferred = |t: &&CaptionTrack| t.language_code.starts_with(&self.preferred_language);
        tracks
            .iter()
            .filter(preferred)
            .find(|t| !t.is_generated())
            .or_else(|| tracks.iter().find(preferred))
            .or_else(|| tracks.first())
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let tracks = self.caption_tracks(video_id).await?;
        let Some(track) = self.choose_track(&tracks) else {
            return Ok(Vec::new());
        };

        debug!(
            "Using {} caption track ({})",
            track.language_code,
            if track.is_generated() { "generated" } else { "manual" }
        );

        let mut url = Url::parse(&track.base_url)
            .map_err(|e| StudymateError::Transcript(format!("Invalid caption track URL: {}", e)))?;
        url.query_pairs_mut().append_pair("fmt", "json3");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StudymateError::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let timed: TimedText = response.json().await?;
        let segments = timed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
                let text = text.replace('\n', " ").trim().to_string();
                (!text.is_empty()).then(|| TranscriptSegment {
                    text,
                    start_seconds: event.t_start_ms as f64 / 1000.0,
                    duration_seconds: event.d_duration_ms as f64 / 1000.0,
                })
            })
            .collect::<Vec<_>>();

        debug!("Fetched {} transcript segments", segments.len());
        Ok(segments)
    }
}

/// Slice out the JSON array that follows `marker`, honouring nesting and strings.
fn find_json_array<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    if !rest.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in rest.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Summarizes an educational video from its transcript.
pub struct YoutubeSummaryTool {
    provider: Arc<dyn TranscriptProvider>,
    summary_sentences: usize,
}

impl YoutubeSummaryTool {
    pub fn new(provider: Arc<dyn TranscriptProvider>, summary_sentences: usize) -> Self {
        Self {
            provider,
            summary_sentences,
        }
    }

    async fn run(&self, input: &str) -> Result<String> {
        let Some(video_id) = extract_video_id(input) else {
            return Ok(
                "Invalid YouTube video ID or URL. Please provide a valid YouTube video ID or URL."
                    .to_string(),
            );
        };

        let segments = self.provider.fetch(&video_id).await?;
        let Some(summary) = summarize_transcript(&segments, self.summary_sentences) else {
            return Ok("No transcript available for this video.".to_string());
        };

        Ok(format!(
            "🎬 YouTube Video Summary:\n\nSource: https://www.youtube.com/watch?v={}\n\n{}",
            video_id, summary
        ))
    }
}

#[async_trait]
impl Tool for YoutubeSummaryTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Summarize educational YouTube videos. Input: YouTube Video ID or URL."
    }

    #[instrument(skip(self), fields(tool = TOOL_NAME))]
    async fn invoke(&self, input: &str) -> String {
        info!("Running {}", TOOL_NAME);
        match self.run(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{} failed: {}", TOOL_NAME, e);
                format!("Couldn't fetch or process YouTube transcript: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn segment(text: &str) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start_seconds: 0.0,
            duration_seconds: 1.0,
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
        segments: Vec<TranscriptSegment>,
    }

    #[async_trait]
    impl TranscriptProvider for CountingProvider {
        async fn fetch(&self, _video_id: &str) -> Result<Vec<TranscriptSegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.segments.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TranscriptProvider for FailingProvider {
        async fn fetch(&self, _video_id: &str) -> Result<Vec<TranscriptSegment>> {
            Err(StudymateError::Transcript("captions disabled".to_string()))
        }
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/watch?list=PL1&v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("bad"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("dQw4w9WgXc!"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(extract_video_id("https://youtu.be/"), None);
        assert_eq!(extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_summarize_transcript_takes_first_sentences() {
        let segments: Vec<_> = (1..=25)
            .map(|i| segment(&format!("Sentence {}.", i)))
            .collect();
        let summary = summarize_transcript(&segments, 20).unwrap();

        assert!(summary.starts_with("Sentence 1. Sentence 2. "));
        assert!(summary.ends_with("Sentence 20."));
        assert!(!summary.contains("Sentence 21"));
    }

    #[test]
    fn test_summarize_transcript_splits_mixed_punctuation() {
        let segments = vec![segment("What is a cell? It is"), segment("small!!  Really... ok")];
        assert_eq!(
            summarize_transcript(&segments, 20).unwrap(),
            "What is a cell. It is small. Really. ok."
        );
    }

    #[test]
    fn test_summarize_empty_transcript() {
        assert_eq!(summarize_transcript(&[], 20), None);
        assert_eq!(summarize_transcript(&[segment(" ... ")], 20), None);
    }

    #[tokio::test]
    async fn test_invalid_input_never_fetches() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            segments: vec![segment("Hello.")],
        });
        let tool = YoutubeSummaryTool::new(provider.clone(), 20);

        let output = tool.invoke("not a video").await;
        assert_eq!(
            output,
            "Invalid YouTube video ID or URL. Please provide a valid YouTube video ID or URL."
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_summary_output() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            segments: vec![segment("Cells divide. Then they grow")],
        });
        let tool = YoutubeSummaryTool::new(provider.clone(), 20);

        let output = tool.invoke("https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(
            output,
            "🎬 YouTube Video Summary:\n\nSource: https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\nCells divide. Then they grow."
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_transcript() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            segments: Vec::new(),
        });
        let output = YoutubeSummaryTool::new(provider, 20)
            .invoke("dQw4w9WgXcQ")
            .await;
        assert_eq!(output, "No transcript available for this video.");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_text() {
        let output = YoutubeSummaryTool::new(Arc::new(FailingProvider), 20)
            .invoke("dQw4w9WgXcQ")
            .await;
        assert_eq!(
            output,
            "Couldn't fetch or process YouTube transcript: Transcript error: captions disabled"
        );
    }

    #[test]
    fn test_find_json_array_handles_nesting() {
        let page = r#"var x = {"captionTracks":[{"name":{"runs":[{"text":"En]glish"}]},"baseUrl":"u"}],"other":1};"#;
        let raw = find_json_array(page, "\"captionTracks\":").unwrap();
        assert_eq!(
            raw,
            r#"[{"name":{"runs":[{"text":"En]glish"}]},"baseUrl":"u"}]"#
        );
        assert!(find_json_array("no tracks here", "\"captionTracks\":").is_none());
    }

    #[tokio::test]
    async fn test_fetcher_reads_preferred_track() {
        let server = MockServer::start().await;
        let tracks = json!([
            {"baseUrl": format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=de", server.uri()), "languageCode": "de"},
            {"baseUrl": format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr", server.uri()), "languageCode": "en", "kind": "asr"}
        ]);
        let page = format!(
            "<html><script>var ytInitialPlayerResponse = {{\"captions\":{{\"playerCaptionsTracklistRenderer\":{{\"captionTracks\":{}}}}}}};</script></html>",
            tracks
        );

        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .and(query_param("lang", "en"))
            .and(query_param("fmt", "json3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [
                    {"tStartMs": 0, "dDurationMs": 1500, "segs": [{"utf8": "Hello"}, {"utf8": " world."}]},
                    {"tStartMs": 1500, "segs": [{"utf8": "\n"}]},
                    {"tStartMs": 2000, "dDurationMs": 1000, "segs": [{"utf8": "Second line!"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = YoutubeSettings {
            watch_endpoint: format!("{}/watch", server.uri()),
            ..Default::default()
        };
        let fetcher = YoutubeTranscriptFetcher::new(reqwest::Client::new(), &settings);
        let segments = fetcher.fetch("dQw4w9WgXcQ").await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world.");
        assert_eq!(segments[1].start_seconds, 2.0);
    }

    #[tokio::test]
    async fn test_fetcher_without_captions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let settings = YoutubeSettings {
            watch_endpoint: format!("{}/watch", server.uri()),
            ..Default::default()
        };
        let fetcher = YoutubeTranscriptFetcher::new(reqwest::Client::new(), &settings);
        assert!(fetcher.fetch("dQw4w9WgXcQ").await.unwrap().is_empty());
    }
}
