/// HTTP client for the EmotionAnalyzer server.
///
/// Talks to two endpoints using the synchronous `ureq` client:
///
/// - `GET /api/emotion-stats` — aggregated label → count mapping
/// - `POST /webcam` — multipart upload of one captured frame
///
/// Controllers depend on the [`EmotionApi`] trait rather than the concrete
/// client so they can run against a stub in tests.
pub mod multipart;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::ConsoleConfig;
use crate::emotion::DetectionResult;

use multipart::MultipartForm;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Detection counts per label, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionStats(Vec<(String, u64)>);

impl EmotionStats {
    pub fn new(entries: Vec<(String, u64)>) -> Self {
        Self(entries)
    }

    /// Parse the flat JSON object returned by the stats endpoint.
    pub fn from_json(body: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(body).context("stats response is not a JSON object")?;

        map.into_iter()
            .map(|(label, value)| {
                let count = value
                    .as_u64()
                    .with_context(|| format!("count for '{label}' is not a non-negative integer"))?;
                Ok((label, count))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.0.iter().map(|(_, c)| *c).collect()
    }
}

/// Wire shape of a `/webcam` response before classification.
#[derive(Debug, Deserialize)]
struct RawCaptureResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    results: Option<Vec<DetectionResult>>,
}

/// Outcome of a capture upload as reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResponse {
    /// The server could not analyse the frame; the message is shown verbatim.
    Rejected { error: String },
    /// Analysis ran. An empty `results` means no face was found.
    Analyzed {
        image_url: String,
        results: Vec<DetectionResult>,
    },
}

impl CaptureResponse {
    /// Classify a response body.
    ///
    /// A non-empty `error` field wins over everything else. A body with
    /// neither an error nor a `results` array is malformed.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawCaptureResponse =
            serde_json::from_str(body).context("capture response is not valid JSON")?;

        if let Some(error) = raw.error
            && !error.is_empty()
        {
            return Ok(Self::Rejected { error });
        }

        let results = raw
            .results
            .context("capture response has neither an error nor results")?;

        Ok(Self::Analyzed {
            image_url: raw.image_url.unwrap_or_default(),
            results,
        })
    }
}

// ---------------------------------------------------------------------------
// Client seam
// ---------------------------------------------------------------------------

/// The two server calls the controllers make.
pub trait EmotionApi {
    /// `GET` the aggregated stats.
    fn fetch_stats(&self) -> Result<EmotionStats>;

    /// `POST` one frame (a JPEG data URL) for analysis.
    ///
    /// `Err` means the round trip itself failed; server-side refusals come
    /// back as [`CaptureResponse::Rejected`].
    fn submit_capture(&self, image_data_url: &str) -> Result<CaptureResponse>;
}

/// Synchronous `ureq` client for a running EmotionAnalyzer server.
#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    base_url: String,
    stats_endpoint: String,
    capture_endpoint: String,
    timeout: Duration,
}

impl AnalyzerClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            stats_endpoint: config.dashboard.stats_endpoint.clone(),
            capture_endpoint: config.webcam.capture_endpoint.clone(),
            timeout: Duration::from_millis(config.server.timeout_ms),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn stats_url(&self) -> String {
        self.url(&self.stats_endpoint)
    }

    pub fn capture_url(&self) -> String {
        self.url(&self.capture_endpoint)
    }

    /// Resolve a URL the server returned against the server's base URL.
    ///
    /// Absolute URLs (any scheme, including `data:`) and empty strings are
    /// returned unchanged.
    pub fn absolute_url(&self, url: &str) -> String {
        if url.is_empty() || has_scheme(url) {
            return url.to_string();
        }
        if let Some(rest) = url.strip_prefix("//") {
            let scheme = self.base_url.split("://").next().unwrap_or("http");
            return format!("{scheme}://{rest}");
        }
        self.url(url)
    }
}

/// Whether `url` starts with `scheme:` (RFC 3986 scheme characters).
fn has_scheme(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, _)) => {
            scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

impl EmotionApi for AnalyzerClient {
    fn fetch_stats(&self) -> Result<EmotionStats> {
        let body = ureq::get(&self.stats_url())
            .timeout(self.timeout)
            .call()
            .context("stats request failed")?
            .into_string()
            .context("failed to read stats response")?;

        EmotionStats::from_json(&body)
    }

    fn submit_capture(&self, image_data_url: &str) -> Result<CaptureResponse> {
        let form = MultipartForm::new().text("image", image_data_url);
        let body = form.encode()?;

        let resp = match ureq::post(&self.capture_url())
            .timeout(self.timeout)
            .set("Content-Type", &form.content_type())
            .send_bytes(&body)
        {
            Ok(resp) => resp,
            // The server reports refusals (bad image, no data) with 4xx/5xx
            // plus a JSON `error` body, so those still get parsed.
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(err) => return Err(err).context("capture upload failed"),
        };

        let text = resp
            .into_string()
            .context("failed to read capture response")?;

        // The annotated image path is relative to the server's origin.
        Ok(match CaptureResponse::from_json(&text)? {
            CaptureResponse::Analyzed { image_url, results } => CaptureResponse::Analyzed {
                image_url: self.absolute_url(&image_url),
                results,
            },
            rejected => rejected,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> AnalyzerClient {
        let mut config = ConsoleConfig::default();
        config.server.base_url = base_url.to_string();
        AnalyzerClient::from_config(&config)
    }

    #[test]
    fn absolute_url_resolves_server_paths() {
        let client = client("http://127.0.0.1:5000/");
        assert_eq!(
            client.absolute_url("/uploads/webcam_1.jpg"),
            "http://127.0.0.1:5000/uploads/webcam_1.jpg"
        );
        assert_eq!(
            client.absolute_url("uploads/a.jpg"),
            "http://127.0.0.1:5000/uploads/a.jpg"
        );
    }

    #[test]
    fn absolute_url_keeps_absolute_urls() {
        let client = client("https://analyzer.local");
        assert_eq!(
            client.absolute_url("http://cdn.example/a.jpg"),
            "http://cdn.example/a.jpg"
        );
        assert_eq!(
            client.absolute_url("data:image/jpeg;base64,AAAA"),
            "data:image/jpeg;base64,AAAA"
        );
        assert_eq!(client.absolute_url("//cdn.example/a.jpg"), "https://cdn.example/a.jpg");
        assert_eq!(client.absolute_url(""), "");
    }

    #[test]
    fn stats_keep_server_key_order() {
        let stats = EmotionStats::from_json(r#"{"sad": 3, "happy": 10, "angry": 1}"#).unwrap();
        assert_eq!(stats.labels(), vec!["sad", "happy", "angry"]);
        assert_eq!(stats.counts(), vec![3, 10, 1]);
    }

    #[test]
    fn stats_reject_non_integer_counts() {
        assert!(EmotionStats::from_json(r#"{"sad": "three"}"#).is_err());
        assert!(EmotionStats::from_json(r#"["sad"]"#).is_err());
    }

    #[test]
    fn error_field_takes_precedence_over_results() {
        let body = r#"{"error": "Could not decode image", "results": [{"emotions": {}}]}"#;
        assert_eq!(
            CaptureResponse::from_json(body).unwrap(),
            CaptureResponse::Rejected {
                error: "Could not decode image".to_string()
            }
        );
    }

    #[test]
    fn empty_error_is_ignored() {
        let body = r#"{"error": "", "image_url": "/uploads/a.jpg", "results": []}"#;
        assert!(matches!(
            CaptureResponse::from_json(body).unwrap(),
            CaptureResponse::Analyzed { results, .. } if results.is_empty()
        ));
    }

    #[test]
    fn analyzed_response_decodes_results() {
        let body = r#"{
            "success": true,
            "image_url": "/uploads/webcam_1.jpg",
            "results": [{
                "emotions": {"happy": 0.8, "sad": 0.1},
                "dominant_emotion": "happy",
                "confidence": 0.8
            }]
        }"#;
        match CaptureResponse::from_json(body).unwrap() {
            CaptureResponse::Analyzed { image_url, results } => {
                assert_eq!(image_url, "/uploads/webcam_1.jpg");
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].dominant(), "happy");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn response_without_results_is_malformed() {
        assert!(CaptureResponse::from_json(r#"{"success": true}"#).is_err());
        assert!(CaptureResponse::from_json("<html>").is_err());
    }

    #[test]
    fn client_builds_endpoint_urls() {
        let mut config = ConsoleConfig::default();
        config.server.base_url = "http://analyzer:5000/".to_string();
        let client = AnalyzerClient::from_config(&config);
        assert_eq!(client.stats_url(), "http://analyzer:5000/api/emotion-stats");
        assert_eq!(client.capture_url(), "http://analyzer:5000/webcam");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
    }
}
