use analyzer_core::error::AppError;
use analyzer_core::session::SessionContext;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::{Session, SessionStore};

use super::IdleSessionStore;

const CONTEXT_KEY: &str = "analyzer.context";
const NOTICE_KEY: &str = "analyzer.notice";

/// The browser session holding this user's [`SessionContext`].
pub struct AnalyzerSession {
    session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for AnalyzerSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::SessionError(message.to_string()).into_response())?;

        Ok(Self { session })
    }
}

impl AnalyzerSession {
    /// The stored context, or a fresh one for a new session.
    pub async fn context(&self) -> Result<SessionContext, AppError> {
        let context: Option<SessionContext> = self
            .session
            .get(CONTEXT_KEY)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))?;

        Ok(context.unwrap_or_default())
    }

    pub async fn store(&self, context: &SessionContext) -> Result<(), AppError> {
        self.session
            .insert(CONTEXT_KEY, context)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))
    }

    /// Store `context` only while the stored context is still at `revision`.
    ///
    /// Returns `false`, leaving the session untouched, when another request
    /// changed or ended the session after `revision` was read.
    pub async fn store_if_unchanged(
        &self,
        sessions: &IdleSessionStore,
        revision: u64,
        context: &SessionContext,
    ) -> Result<bool, AppError> {
        let Some(id) = self.session.id() else {
            return Ok(false);
        };

        let stored_revision = sessions
            .load(&id)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))?
            .and_then(|mut record| record.data.remove(CONTEXT_KEY))
            .and_then(|value| serde_json::from_value::<SessionContext>(value).ok())
            .map(|stored| stored.revision());

        if stored_revision != Some(revision) {
            return Ok(false);
        }

        self.store(context).await?;
        Ok(true)
    }

    /// Queue a one-line message for the next page render.
    pub async fn notify(&self, message: impl Into<String>) -> Result<(), AppError> {
        self.session
            .insert(NOTICE_KEY, message.into())
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))
    }

    /// Take the queued message, if any.
    pub async fn take_notice(&self) -> Result<Option<String>, AppError> {
        self.session
            .remove(NOTICE_KEY)
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))
    }

    /// End the session: the context is discarded and the cookie removed.
    pub async fn end(&self) -> Result<(), AppError> {
        self.session
            .flush()
            .await
            .map_err(|e| AppError::SessionError(e.to_string()))
    }
}
