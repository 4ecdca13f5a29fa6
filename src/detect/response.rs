/// Wire payloads of the detection endpoint
///
/// Success: `{"label": "REAL", "confidence": 0.87, "heatmap": "/outputs/x.png"}`
/// where `heatmap` may be missing or `null`.
/// Error (non-2xx): `{"error": "...", "details": "..."}`.

use chrono::Local;
use serde::Deserialize;

use crate::error::AnalysisError;
use crate::state::{AnalysisResult, Label};

#[derive(Deserialize, Debug)]
struct VerdictBody {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    heatmap: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Parse and validate a 2xx body into a verdict
pub fn parse_verdict(body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let raw: VerdictBody = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::MalformedResponse(format!("not a verdict object: {}", e)))?;

    let tag = raw
        .label
        .ok_or_else(|| AnalysisError::MalformedResponse("missing label".to_string()))?;
    let label = Label::parse(&tag)
        .ok_or_else(|| AnalysisError::MalformedResponse(format!("unknown label {:?}", tag)))?;

    let confidence = raw
        .confidence
        .ok_or_else(|| AnalysisError::MalformedResponse("missing confidence".to_string()))?;
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(AnalysisError::MalformedResponse(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    let heatmap_path = raw.heatmap.filter(|path| !path.trim().is_empty());

    Ok(AnalysisResult {
        label,
        confidence,
        heatmap_path,
        received_at: Local::now(),
    })
}

/// Human-readable reason for a non-2xx response
///
/// Uses the service's `error`/`details` fields when the body has them,
/// otherwise the status line.
pub fn rejection_reason(status: reqwest::StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{} ({})", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Server returned an error")
            .to_string(),
    }
}
