//! presenta-client: the REST client for the Presenta backend.
//!
//! One `ApiClient` owns the HTTP client, the session store handle and
//! the refresh protocol; feature modules hang their endpoint methods
//! off it. The session bootstrapper and the background refresh
//! scheduler live here too, since both are orchestrations of the same
//! client.

mod analyses;
mod auth;
mod bootstrap;
mod error;
mod http;
mod payments;
mod profile;
mod refresh;
mod share;
pub mod token;

pub use analyses::{AnalysisSummary, SavedAnalysis};
pub use bootstrap::{bootstrap, BootOutcome};
pub use error::{ApiError, ApiResult, PaymentError};
pub use http::ApiClient;
pub use payments::{BillingInfo, CardDetails, PaymentConfirmation};
pub use profile::{AgentForm, ProfileSnapshot};
pub use refresh::spawn_refresh_scheduler;
pub use share::{
    new_share_id, share_link, EmailShareStat, ShareRequest, ShareStats, SharedAnalysis,
    LINK_SHARE_MARKER,
};
