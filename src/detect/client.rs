/// HTTP client for the detection endpoint
///
/// One `submit` is one multipart POST. No retries: every retry is a new
/// user action. The client itself is stateless; at-most-one-in-flight is
/// enforced by `Session::begin_submit` before a request is ever built.

use reqwest::multipart::{Form, Part};

use super::response::{parse_verdict, rejection_reason};
use super::FILE_FIELD;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::state::{AnalysisRequest, AnalysisResult};

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    base_url: String,
    detect_url: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deepfake-scanner/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            detect_url: config.detect_url(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload the image and return the validated verdict
    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        log::info!(
            "📤 Submitting {} ({} bytes) to {}",
            request.file_name,
            request.payload.len(),
            self.detect_url
        );

        let part = Part::bytes(request.payload)
            .file_name(request.file_name.clone())
            .mime_str(request.mime_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let outcome = self.send(form).await;
        match &outcome {
            Ok(result) => log::info!(
                "✅ Verdict for {}: {} {:.2}%",
                request.file_name,
                result.label,
                result.confidence * 100.0
            ),
            Err(err) => log::warn!("❌ Analysis of {} failed: {}", request.file_name, err),
        }
        outcome
    }

    async fn send(&self, form: Form) -> Result<AnalysisResult, AnalysisError> {
        let response = self.client.post(&self.detect_url).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(AnalysisError::ServerRejected {
                status: status.as_u16(),
                reason: rejection_reason(status, &body),
            });
        }
        parse_verdict(&body)
    }

    /// Download the heatmap image at an already-resolved URL
    pub async fn fetch_heatmap(&self, url: String) -> Result<Vec<u8>, AnalysisError> {
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::debug!("🔥 Heatmap {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Probe the service root, which answers `{"message": "..."}`
    pub async fn health(&self) -> Result<String, AnalysisError> {
        #[derive(serde::Deserialize)]
        struct HealthBody {
            message: String,
        }

        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(AnalysisError::ServerRejected {
                status: status.as_u16(),
                reason: rejection_reason(status, &body),
            });
        }

        Ok(serde_json::from_slice::<HealthBody>(&body)
            .map(|health| health.message)
            .unwrap_or_else(|_| "online".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Label, LoadedFile, Session};
    use axum::body::Bytes;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> AnalysisClient {
        let config = Config {
            base_url: base_url.to_string(),
            ..Config::default()
        };
        AnalysisClient::new(&config).unwrap()
    }

    fn request_for(name: &str) -> AnalysisRequest {
        let mut session = Session::new();
        session.select_file(LoadedFile {
            name: name.to_string(),
            path: None,
            content: b"\x89PNG fake bytes".to_vec(),
        });
        session.begin_submit().unwrap()
    }

    #[tokio::test]
    async fn test_real_verdict_and_multipart_shape() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/api/detect/image",
            post(move |headers: HeaderMap, body: Bytes| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body = String::from_utf8_lossy(&body).to_string();
                    if !content_type.starts_with("multipart/form-data")
                        || !body.contains(r#"name="file""#)
                        || !body.contains(r#"filename="cat.png""#)
                        || !body.contains("image/png")
                    {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"error": "No file uploaded"})),
                        );
                    }
                    (StatusCode::OK, Json(json!({"label": "REAL", "confidence": 0.87})))
                }
            }),
        );
        let base = serve(router).await;

        let result = client_for(&base).submit(request_for("cat.png")).await.unwrap();
        assert_eq!(result.label, Label::Real);
        assert_eq!(result.confidence, 0.87);
        assert_eq!(result.heatmap_path, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fake_verdict_with_heatmap_and_download() {
        let router = Router::new()
            .route(
                "/api/detect/image",
                post(|| async {
                    Json(json!({"label": "FAKE", "confidence": 0.993, "heatmap": "/static/hm1.png"}))
                }),
            )
            .route("/static/hm1.png", get(|| async { vec![1u8, 2, 3] }));
        let base = serve(router).await;
        let client = client_for(&base);

        let result = client.submit(request_for("fake.jpg")).await.unwrap();
        assert_eq!(result.label, Label::Fake);
        let path = result.heatmap_path.unwrap();
        assert_eq!(path, "/static/hm1.png");

        let url = crate::detect::resolve_url(client.base_url(), &path);
        assert_eq!(url, format!("{}/static/hm1.png", base));
        assert_eq!(client.fetch_heatmap(url).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let router = Router::new().route(
            "/api/detect/image",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Model prediction failed", "details": "boom"})),
                )
            }),
        );
        let base = serve(router).await;

        let err = client_for(&base).submit(request_for("cat.png")).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ServerRejected {
                status: 500,
                reason: "Model prediction failed (boom)".to_string()
            }
        );
        assert!(err.is_failure());
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_malformed() {
        let router = Router::new().route(
            "/api/detect/image",
            post(|| async { Json(json!({"label": "REAL", "confidence": 87})) }),
        );
        let base = serve(router).await;

        let err = client_for(&base).submit(request_for("cat.png")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client.submit(request_for("cat.png")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NetworkFailure(_)));
        assert!(client.health().await.is_err());
    }

    #[tokio::test]
    async fn test_health_reads_message() {
        let router = Router::new().route(
            "/",
            get(|| async { Json(json!({"message": "Backend is running!"})) }),
        );
        let base = serve(router).await;
        assert_eq!(
            client_for(&base).health().await.unwrap(),
            "Backend is running!"
        );
    }
}
