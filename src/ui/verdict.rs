/// Pure projection of the session into what the screen should show
///
/// Nothing here touches iced widgets; `panel.rs` turns a `PanelView`
/// into an `Element`.

use iced::widget::image::Handle;

use crate::detect::resolve_url;
use crate::state::{AnalysisResult, AnalysisStatus, Label, Outcome, Session};

/// Bar color, keyed on the label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    Green,
    Red,
}

impl BarColor {
    pub fn for_label(label: Label) -> Self {
        match label {
            Label::Fake => BarColor::Red,
            _ => BarColor::Green,
        }
    }
}

/// A successful verdict, ready to display
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictView {
    pub label: String,
    /// e.g. "87.00%"
    pub percent: String,
    /// Bar fill fraction, equal to the confidence
    pub fill: f64,
    pub color: BarColor,
    pub heatmap_url: Option<String>,
    pub analyzed_at: String,
}

impl VerdictView {
    pub fn new(result: &AnalysisResult, base_url: &str) -> Self {
        Self {
            label: result.label.to_string(),
            percent: format_percent(result.confidence),
            fill: result.confidence,
            color: BarColor::for_label(result.label),
            heatmap_url: result
                .heatmap_path
                .as_deref()
                .map(|path| resolve_url(base_url, path)),
            analyzed_at: result.received_at.format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultPanel {
    /// Idle or Selecting: only the preview is shown
    Empty,
    Busy,
    Verdict(VerdictView),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct PreviewView<'a> {
    pub handle: &'a Handle,
    pub caption: String,
}

#[derive(Debug, Clone)]
pub struct PanelView<'a> {
    pub status: AnalysisStatus,
    pub preview: Option<PreviewView<'a>>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub result: ResultPanel,
}

/// Confidence as a percentage with two decimals
pub fn format_percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Project the session for display
pub fn render<'a>(session: &'a Session, base_url: &str) -> PanelView<'a> {
    let status = session.status();

    let preview = session.current_file().map(|file| {
        let caption = match &file.info {
            Some(info) => format!("{} · {}×{} {}", file.name, info.width, info.height, info.format),
            None => file.name.clone(),
        };
        PreviewView {
            handle: file.preview().handle(),
            caption,
        }
    });

    let result = match (status, session.results().outcome()) {
        (AnalysisStatus::Submitting, _) => ResultPanel::Busy,
        (AnalysisStatus::Succeeded, Some(Outcome::Succeeded(result))) => {
            ResultPanel::Verdict(VerdictView::new(result, base_url))
        }
        (AnalysisStatus::Failed, Some(Outcome::Failed(reason))) => ResultPanel::Error(reason.clone()),
        _ => ResultPanel::Empty,
    };

    PanelView {
        status,
        preview,
        submit_label: if status == AnalysisStatus::Submitting {
            "Analyzing..."
        } else {
            "Upload Now"
        },
        submit_enabled: session.can_submit(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::state::LoadedFile;
    use chrono::Local;

    const BASE: &str = "http://127.0.0.1:5000";

    fn session_with_outcome(
        name: &str,
        response: Result<AnalysisResult, AnalysisError>,
    ) -> Session {
        let mut session = Session::new();
        session.select_file(LoadedFile {
            name: name.to_string(),
            path: None,
            content: vec![1, 2, 3],
        });
        let request = session.begin_submit().unwrap();
        session.complete(&request.ticket, response);
        session
    }

    fn result(label: Label, confidence: f64, heatmap: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            label,
            confidence,
            heatmap_path: heatmap.map(str::to_string),
            received_at: Local::now(),
        }
    }

    #[test]
    fn test_real_verdict_without_heatmap() {
        let session = session_with_outcome("cat.png", Ok(result(Label::Real, 0.87, None)));
        let view = render(&session, BASE);

        let verdict = match view.result {
            ResultPanel::Verdict(verdict) => verdict,
            other => panic!("expected verdict, got {:?}", other),
        };
        assert_eq!(verdict.label, "REAL");
        assert_eq!(verdict.percent, "87.00%");
        assert_eq!(verdict.fill, 0.87);
        assert_eq!(verdict.color, BarColor::Green);
        assert_eq!(verdict.heatmap_url, None);
        assert_eq!(view.submit_label, "Upload Now");
        assert!(view.submit_enabled);
    }

    #[test]
    fn test_fake_verdict_with_heatmap() {
        let session = session_with_outcome(
            "fake.jpg",
            Ok(result(Label::Fake, 0.993, Some("/static/hm1.png"))),
        );
        let view = render(&session, BASE);

        let verdict = match view.result {
            ResultPanel::Verdict(verdict) => verdict,
            other => panic!("expected verdict, got {:?}", other),
        };
        assert_eq!(verdict.label, "FAKE");
        assert_eq!(verdict.percent, "99.30%");
        assert_eq!(verdict.fill, 0.993);
        assert_eq!(verdict.color, BarColor::Red);
        assert_eq!(
            verdict.heatmap_url.as_deref(),
            Some("http://127.0.0.1:5000/static/hm1.png")
        );
    }

    #[test]
    fn test_percent_rounding() {
        for (confidence, expected) in [
            (0.0, "0.00%"),
            (1.0, "100.00%"),
            (0.12346, "12.35%"),
            (0.5, "50.00%"),
        ] {
            assert_eq!(format_percent(confidence), expected);
        }
    }

    #[test]
    fn test_failure_shows_error_only() {
        let session = session_with_outcome(
            "cat.png",
            Err(AnalysisError::ServerRejected {
                status: 500,
                reason: "Server returned an error".into(),
            }),
        );
        let view = render(&session, BASE);
        assert_eq!(view.status, AnalysisStatus::Failed);
        assert!(matches!(view.result, ResultPanel::Error(ref msg) if msg.contains("500")));
    }

    #[test]
    fn test_busy_disables_submit() {
        let mut session = Session::new();
        session.select_file(LoadedFile {
            name: "cat.png".into(),
            path: None,
            content: vec![1],
        });
        session.begin_submit().unwrap();

        let view = render(&session, BASE);
        assert_eq!(view.result, ResultPanel::Busy);
        assert_eq!(view.submit_label, "Analyzing...");
        assert!(!view.submit_enabled);
        assert_eq!(view.preview.unwrap().caption, "cat.png");
    }

    #[test]
    fn test_idle_shows_nothing() {
        let session = Session::new();
        let view = render(&session, BASE);
        assert_eq!(view.status, AnalysisStatus::Idle);
        assert!(view.preview.is_none());
        assert_eq!(view.result, ResultPanel::Empty);
        assert!(!view.submit_enabled);
    }
}
