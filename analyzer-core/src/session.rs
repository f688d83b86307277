//! Per-session context and the view state derived from it.
//!
//! Every user interaction is one event applied to a [`SessionContext`]; each
//! event consumes the context and returns the next one.

use crate::analysis::AnalysisOutcome;
use crate::intake::UploadedImage;
use crate::mode::AnalysisMode;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

/// The API key pasted by the user. Never logged, never rendered back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input, which counts as "absent".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn secret(&self) -> Secret<String> {
        Secret::new(self.0.clone())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Bumped by every event that changes the context.
    #[serde(default)]
    revision: u64,
    credential: Option<Credential>,
    mode: AnalysisMode,
    image: Option<UploadedImage>,
    outcome: Option<AnalysisOutcome>,
}

/// Everything needed for one outbound call.
#[derive(Debug, Clone, Copy)]
pub struct ReadyAnalysis<'a> {
    pub credential: &'a Credential,
    pub image: &'a UploadedImage,
    pub mode: AnalysisMode,
}

/// What the page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<'a> {
    /// No credential: only the warning is shown.
    MissingCredential,
    Intake {
        mode: AnalysisMode,
        image: Option<&'a UploadedImage>,
        outcome: Option<&'a AnalysisOutcome>,
    },
}

impl SessionContext {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    /// Set or clear the credential. Clearing it also drops the last result.
    pub fn with_credential(self, raw: &str) -> Self {
        match Credential::parse(raw) {
            Some(credential) => Self {
                revision: self.revision + 1,
                credential: Some(credential),
                ..self
            },
            None => Self {
                revision: self.revision + 1,
                credential: None,
                outcome: None,
                ..self
            },
        }
    }

    /// Change the mode. A result produced under another mode is dropped.
    pub fn with_mode(self, mode: AnalysisMode) -> Self {
        if mode == self.mode {
            return self;
        }
        Self {
            revision: self.revision + 1,
            mode,
            outcome: None,
            ..self
        }
    }

    /// Replace the image. Any previous result is dropped.
    pub fn with_image(self, image: UploadedImage) -> Self {
        Self {
            revision: self.revision + 1,
            image: Some(image),
            outcome: None,
            ..self
        }
    }

    pub fn with_outcome(self, outcome: AnalysisOutcome) -> Self {
        Self {
            revision: self.revision + 1,
            outcome: Some(outcome),
            ..self
        }
    }

    /// The inputs for an outbound call, only when both credential and image are present.
    pub fn ready_for_analysis(&self) -> Option<ReadyAnalysis<'_>> {
        match (&self.credential, &self.image) {
            (Some(credential), Some(image)) => Some(ReadyAnalysis {
                credential,
                image,
                mode: self.mode,
            }),
            _ => None,
        }
    }

    pub fn view(&self) -> ViewState<'_> {
        if self.credential.is_none() {
            return ViewState::MissingCredential;
        }
        ViewState::Intake {
            mode: self.mode,
            image: self.image.as_ref(),
            outcome: self.outcome.as_ref(),
        }
    }
}
