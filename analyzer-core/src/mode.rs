//! Analysis modes and the fixed prompt templates they select.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prompt sent with images of a prescription or pharmacy receipt.
pub const PRESCRIPTION_PROMPT: &str = "The image shows a medical prescription or receipt. Extract the list of medicines, their usage or purpose, \
and the patient name if visible. Format the response in a clean sequence:\n\n\
1. Medicine Name\n   - Purpose: [Explain what it's used for]\n   - Dosage/Frequency (if available)\n\n\
Also include the doctor’s name or hospital if visible.";

/// Prompt sent with images of a tablet strip or medicine packaging.
pub const TABLET_STRIP_PROMPT: &str = "This is an image of a tablet strip or medicine packaging. Extract any visible text or information. \
If there’s useful information like medicine name, usage, brand, or expiry, summarize it meaningfully. \
If the image has only partial text, make a sensible attempt to interpret it or explain what is visible.";

/// What kind of image the user uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    PrescriptionReceipt,
    TabletStrip,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 2] = [AnalysisMode::PrescriptionReceipt, AnalysisMode::TabletStrip];

    /// The prompt template for this mode, sent verbatim.
    pub fn prompt(self) -> &'static str {
        match self {
            AnalysisMode::PrescriptionReceipt => PRESCRIPTION_PROMPT,
            AnalysisMode::TabletStrip => TABLET_STRIP_PROMPT,
        }
    }

    /// Label shown next to the radio button.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::PrescriptionReceipt => "Prescription Receipt",
            AnalysisMode::TabletStrip => "Tablet Strip",
        }
    }

    /// Form value and metrics label.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::PrescriptionReceipt => "prescription_receipt",
            AnalysisMode::TabletStrip => "tablet_strip",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown analysis mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for AnalysisMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "prescription_receipt" | "Prescription Receipt" => Ok(AnalysisMode::PrescriptionReceipt),
            "tablet_strip" | "Tablet Strip" => Ok(AnalysisMode::TabletStrip),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_prescription_receipt() {
        assert_eq!(AnalysisMode::default(), AnalysisMode::PrescriptionReceipt);
    }

    #[test]
    fn each_mode_selects_its_own_template() {
        assert_eq!(AnalysisMode::PrescriptionReceipt.prompt(), PRESCRIPTION_PROMPT);
        assert_eq!(AnalysisMode::TabletStrip.prompt(), TABLET_STRIP_PROMPT);
        assert_ne!(PRESCRIPTION_PROMPT, TABLET_STRIP_PROMPT);
    }

    #[test]
    fn prescription_template_keeps_list_layout() {
        assert!(PRESCRIPTION_PROMPT.contains(
            "clean sequence:\n\n1. Medicine Name\n   - Purpose: [Explain what it's used for]\n   - Dosage/Frequency (if available)\n\nAlso include"
        ));
        assert!(PRESCRIPTION_PROMPT.ends_with("doctor’s name or hospital if visible."));
    }

    #[test]
    fn tablet_template_is_single_paragraph() {
        assert!(!TABLET_STRIP_PROMPT.contains('\n'));
        assert!(TABLET_STRIP_PROMPT.starts_with("This is an image of a tablet strip"));
        assert!(TABLET_STRIP_PROMPT.contains("medicine name, usage, brand, or expiry"));
    }

    #[test]
    fn parses_form_values_and_labels() {
        assert_eq!("tablet_strip".parse::<AnalysisMode>().unwrap(), AnalysisMode::TabletStrip);
        assert_eq!(
            "Prescription Receipt".parse::<AnalysisMode>().unwrap(),
            AnalysisMode::PrescriptionReceipt
        );
        assert!("blister".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn serde_uses_form_values() {
        let json = serde_json::to_string(&AnalysisMode::TabletStrip).unwrap();
        assert_eq!(json, "\"tablet_strip\"");
        for mode in AnalysisMode::ALL {
            assert_eq!(mode.as_str().parse::<AnalysisMode>().unwrap(), mode);
        }
    }
}
