use crate::models::AnalyzerSession;
use analyzer_core::error::AppError;
use analyzer_core::mode::AnalysisMode;
use axum::{response::Redirect, Form};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct ModeForm {
    pub mode: AnalysisMode,
}

/// Set the API key; an empty submission clears it.
pub async fn set_credential(
    session: AnalyzerSession,
    Form(form): Form<CredentialForm>,
) -> Result<Redirect, AppError> {
    let context = session.context().await?.with_credential(&form.api_key);
    session.store(&context).await?;

    tracing::info!(present = context.has_credential(), "API key updated");

    Ok(Redirect::to("/"))
}

pub async fn set_mode(
    session: AnalyzerSession,
    Form(form): Form<ModeForm>,
) -> Result<Redirect, AppError> {
    let context = session.context().await?.with_mode(form.mode);
    session.store(&context).await?;

    tracing::debug!(mode = form.mode.as_str(), "Analysis mode selected");

    Ok(Redirect::to("/"))
}

/// End the session, discarding the key, image and result.
pub async fn reset(session: AnalyzerSession) -> Result<Redirect, AppError> {
    session.end().await?;
    tracing::info!("Session reset");
    Ok(Redirect::to("/"))
}
