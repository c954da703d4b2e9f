//! Transient per-session funnel progress: address → package → payment →
//! presentation. Never persisted; "start over" and logout reset it.

use crate::packages::PackageTier;
use serde::{Deserialize, Serialize};

/// A generated listing presentation as the preview screen consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub address: String,
    /// Sectioned HTML body returned by the generation backend.
    pub content: String,
    pub model: String,
    /// Backend row id once the analysis has been saved; enables
    /// edit-in-place updates from the preview screen.
    #[serde(default)]
    pub analysis_id: Option<i64>,
}

/// In-memory journey state. Invariant: `payment_complete` is only ever
/// set by [`JourneyState::complete_payment`], which requires both an
/// address and a selected package.
#[derive(Debug, Clone, Default)]
pub struct JourneyState {
    pub address: Option<String>,
    pub selected_package: Option<&'static PackageTier>,
    payment_complete: bool,
    pub presentation: Option<Presentation>,
}

impl JourneyState {
    pub fn payment_complete(&self) -> bool {
        self.payment_complete
    }

    pub fn submit_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if !address.trim().is_empty() {
            self.address = Some(address.trim().to_string());
        }
    }

    pub fn select_package(&mut self, tier: &'static PackageTier) {
        self.selected_package = Some(tier);
    }

    /// Marks the payment done. Refused (with a warn log) when the
    /// funnel prerequisites are missing, which keeps the invariant
    /// instead of trusting every caller.
    pub fn complete_payment(&mut self) -> bool {
        if self.address.is_none() || self.selected_package.is_none() {
            tracing::warn!("payment completion without address/package ignored");
            return false;
        }
        self.payment_complete = true;
        true
    }

    /// Drops everything back to the address screen ("start over").
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Shows a presentation fetched from history, bypassing the funnel.
    pub fn show_presentation(&mut self, presentation: Presentation) {
        self.presentation = Some(presentation);
    }

    /// Leaves the preview without losing address/package/payment.
    pub fn close_presentation(&mut self) {
        self.presentation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages;

    #[test]
    fn payment_requires_address_and_package() {
        let mut journey = JourneyState::default();
        assert!(!journey.complete_payment());

        journey.submit_address("1428 Elm Street, Springwood");
        assert!(!journey.complete_payment());

        journey.select_package(packages::find("pro").unwrap());
        assert!(journey.complete_payment());
        assert!(journey.payment_complete());
    }

    #[test]
    fn blank_address_is_ignored() {
        let mut journey = JourneyState::default();
        journey.submit_address("   ");
        assert!(journey.address.is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut journey = JourneyState::default();
        journey.submit_address("1428 Elm Street");
        journey.select_package(packages::find("starter").unwrap());
        journey.complete_payment();
        journey.show_presentation(Presentation {
            address: "1428 Elm Street".into(),
            content: "<div/>".into(),
            model: "sonar".into(),
            analysis_id: None,
        });

        journey.reset();
        assert!(journey.address.is_none());
        assert!(journey.selected_package.is_none());
        assert!(!journey.payment_complete());
        assert!(journey.presentation.is_none());
    }
}
