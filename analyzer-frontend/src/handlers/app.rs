use crate::models::AnalyzerSession;
use crate::AppState;
use analyzer_core::analysis::AnalysisOutcome;
use analyzer_core::error::AppError;
use analyzer_core::intake::UploadedImage;
use analyzer_core::mode::AnalysisMode;
use analyzer_core::session::ViewState;
use askama::Template;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub struct ModeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

pub struct ImagePreview {
    pub file_name: String,
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

impl From<&UploadedImage> for ImagePreview {
    fn from(image: &UploadedImage) -> Self {
        Self {
            file_name: image.file_name.clone(),
            data_uri: image.data_uri(),
            width: image.width,
            height: image.height,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub model: String,
    pub has_credential: bool,
    pub modes: Vec<ModeOption>,
    pub preview: Option<ImagePreview>,
    pub success: Option<String>,
    pub failure: Option<String>,
    pub notice: Option<String>,
}

impl IndexTemplate {
    pub fn new(view: ViewState<'_>, model: &str, notice: Option<String>) -> Self {
        let mut page = Self {
            model: model.to_string(),
            has_credential: false,
            modes: mode_options(AnalysisMode::default()),
            preview: None,
            success: None,
            failure: None,
            notice,
        };

        if let ViewState::Intake {
            mode,
            image,
            outcome,
        } = view
        {
            page.has_credential = true;
            page.modes = mode_options(mode);
            page.preview = image.map(ImagePreview::from);
            match outcome {
                Some(AnalysisOutcome::Success(text)) => page.success = Some(text.clone()),
                Some(AnalysisOutcome::Failure(line)) => page.failure = Some(line.clone()),
                None => {}
            }
        }

        page
    }
}

fn mode_options(selected: AnalysisMode) -> Vec<ModeOption> {
    AnalysisMode::ALL
        .iter()
        .map(|&mode| ModeOption {
            value: mode.as_str(),
            label: mode.label(),
            checked: mode == selected,
        })
        .collect()
}

pub async fn index(
    State(state): State<AppState>,
    session: AnalyzerSession,
) -> Result<IndexTemplate, AppError> {
    let context = session.context().await?;
    let notice = session.take_notice().await?;

    Ok(IndexTemplate::new(context.view(), &state.model, notice))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "analyzer-frontend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
