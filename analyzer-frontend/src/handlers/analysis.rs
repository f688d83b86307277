use crate::models::AnalyzerSession;
use crate::AppState;
use analyzer_core::error::AppError;
use analyzer_core::intake::UploadedImage;
use analyzer_core::mode::AnalysisMode;
use analyzer_core::session::SessionContext;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Redirect,
};

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";
/// Optional multipart field carrying the mode.
const MODE_FIELD: &str = "mode";

const TOO_LARGE_NOTICE: &str = "The image is larger than the upload limit.";

#[derive(Default)]
struct UploadForm {
    image: Option<(String, Vec<u8>)>,
    mode: Option<AnalysisMode>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            IMAGE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                // An empty file input still submits a nameless, empty part.
                if !(file_name.is_empty() && data.is_empty()) {
                    form.image = Some((file_name, data.to_vec()));
                }
            }
            MODE_FIELD => {
                let value = field.text().await.map_err(multipart_error)?;
                let mode = value
                    .parse::<AnalysisMode>()
                    .map_err(|e| AppError::BadRequest(e.into()))?;
                form.mode = Some(mode);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(anyhow::anyhow!(e.body_text()))
    }
}

/// Call the model if the context has both a credential and an image.
async fn run_analysis(state: &AppState, context: SessionContext) -> SessionContext {
    let outcome = match context.ready_for_analysis() {
        Some(ready) => Some(state.analyzer.run(ready).await),
        None => None,
    };

    match outcome {
        Some(outcome) => context.with_outcome(outcome),
        None => context,
    }
}

/// Save the analysed context unless the session moved on during the call.
async fn store_result(
    state: &AppState,
    session: &AnalyzerSession,
    revision: u64,
    context: &SessionContext,
) -> Result<(), AppError> {
    if !session
        .store_if_unchanged(&state.sessions, revision, context)
        .await?
    {
        tracing::warn!("Session changed during analysis, result discarded");
    }
    Ok(())
}

/// Accept a new image and analyze it straight away.
pub async fn upload(
    State(state): State<AppState>,
    session: AnalyzerSession,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut context = session.context().await?;
    if !context.has_credential() {
        tracing::warn!("Upload ignored: no API key in session");
        return Ok(Redirect::to("/"));
    }
    let revision = context.revision();

    let form = match read_upload(&mut multipart).await {
        Ok(form) => form,
        Err(AppError::PayloadTooLarge(message)) => {
            tracing::warn!(error = %message, "Upload rejected: too large");
            session.notify(TOO_LARGE_NOTICE).await?;
            return Ok(Redirect::to("/"));
        }
        Err(e) => return Err(e),
    };
    if let Some(mode) = form.mode {
        context = context.with_mode(mode);
    }

    let Some((file_name, bytes)) = form.image else {
        session.store(&context).await?;
        session.notify("Choose a .jpg, .jpeg or .png image to upload.").await?;
        return Ok(Redirect::to("/"));
    };

    match UploadedImage::decode(&file_name, bytes) {
        Ok(image) => {
            tracing::info!(
                file_name = %image.file_name,
                mime_type = image.mime_type(),
                width = image.width,
                height = image.height,
                size = image.size(),
                "Image uploaded"
            );
            let context = run_analysis(&state, context.with_image(image)).await;
            store_result(&state, &session, revision, &context).await?;
        }
        Err(e) => {
            tracing::warn!(file_name = %file_name, error = %e, "Upload rejected");
            session.store(&context).await?;
            session.notify(e.to_string()).await?;
        }
    }

    Ok(Redirect::to("/"))
}

/// Re-send the stored image with the current mode.
pub async fn analyze(
    State(state): State<AppState>,
    session: AnalyzerSession,
) -> Result<Redirect, AppError> {
    let context = session.context().await?;
    if !context.has_credential() {
        tracing::warn!("Analysis ignored: no API key in session");
        return Ok(Redirect::to("/"));
    }
    if context.image().is_none() {
        session.notify("Upload an image first.").await?;
        return Ok(Redirect::to("/"));
    }

    let revision = context.revision();
    let context = run_analysis(&state, context).await;
    store_result(&state, &session, revision, &context).await?;

    Ok(Redirect::to("/"))
}
