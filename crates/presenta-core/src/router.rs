//! Screen routing: a pure decision function, evaluated on every frame.
//!
//! There is deliberately no stored "current screen". The shell passes
//! the facts in and renders whatever comes out, so the UI can never get
//! stuck on a screen its state no longer justifies.

use crate::journey::JourneyState;

/// The screens the shell knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login / signup.
    Auth,
    /// Address entry with the recent-analyses side panel.
    Address,
    /// Profile-completion form.
    ProfileCompletion,
    /// Package selection + card checkout.
    Packages,
    /// Generated presentation preview (editable, exportable, shareable).
    Preview,
}

/// Everything routing depends on.
#[derive(Debug, Clone, Copy)]
pub struct RouteInputs<'a> {
    pub authenticated: bool,
    pub profile_complete: bool,
    pub journey: &'a JourneyState,
}

/// Priority order, top wins:
///
/// 1. a presentation is loaded: show it, no matter what else is true.
///    Viewing a historic result must never be blocked by the profile
///    gate or the payment funnel;
/// 2. unauthenticated: login;
/// 3. no address: address entry;
/// 4. profile incomplete: completion form;
/// 5. package/payment outstanding: checkout;
/// 6. the funnel is done: preview.
pub fn route(inputs: RouteInputs<'_>) -> Screen {
    let journey = inputs.journey;
    if journey.presentation.is_some() {
        return Screen::Preview;
    }
    if !inputs.authenticated {
        return Screen::Auth;
    }
    if journey.address.is_none() {
        return Screen::Address;
    }
    if !inputs.profile_complete {
        return Screen::ProfileCompletion;
    }
    if journey.selected_package.is_none() || !journey.payment_complete() {
        return Screen::Packages;
    }
    Screen::Preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::Presentation;
    use crate::packages;

    fn presentation() -> Presentation {
        Presentation {
            address: "1428 Elm Street".into(),
            content: "<div/>".into(),
            model: "sonar".into(),
            analysis_id: Some(3),
        }
    }

    #[test]
    fn presentation_beats_everything_even_unauthenticated() {
        let mut journey = JourneyState::default();
        journey.show_presentation(presentation());
        let screen = route(RouteInputs {
            authenticated: false,
            profile_complete: false,
            journey: &journey,
        });
        assert_eq!(screen, Screen::Preview);
    }

    #[test]
    fn historic_view_bypasses_profile_gate() {
        let mut journey = JourneyState::default();
        journey.submit_address("1428 Elm Street");
        journey.show_presentation(presentation());
        let screen = route(RouteInputs {
            authenticated: true,
            profile_complete: false,
            journey: &journey,
        });
        assert_eq!(screen, Screen::Preview);
    }

    #[test]
    fn funnel_order() {
        let mut journey = JourneyState::default();
        fn inputs(journey: &JourneyState, authed: bool, complete: bool) -> RouteInputs<'_> {
            RouteInputs {
                authenticated: authed,
                profile_complete: complete,
                journey,
            }
        }

        assert_eq!(route(inputs(&journey, false, false)), Screen::Auth);
        assert_eq!(route(inputs(&journey, true, false)), Screen::Address);

        journey.submit_address("1428 Elm Street");
        assert_eq!(
            route(inputs(&journey, true, false)),
            Screen::ProfileCompletion
        );
        assert_eq!(route(inputs(&journey, true, true)), Screen::Packages);

        journey.select_package(packages::find("pro").unwrap());
        assert_eq!(route(inputs(&journey, true, true)), Screen::Packages);

        journey.complete_payment();
        assert_eq!(route(inputs(&journey, true, true)), Screen::Preview);
    }
}
