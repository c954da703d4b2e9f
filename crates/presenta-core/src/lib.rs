//! presenta-core: shared types and client-side state for the Presenta
//! listing-presentation client.
//!
//! Owns everything that is not an HTTP call: the agent record and its
//! completeness rule, the durable session store, the transient journey
//! state, the pure screen router, the event bus, the notification
//! queue, and configuration.

mod agent;
mod config;
mod events;
mod journey;
mod notify;
pub mod packages;
mod router;
mod store;

pub use agent::AgentRecord;
pub use config::AppConfig;
pub use events::{AppEvent, EventBus};
pub use journey::{JourneyState, Presentation};
pub use notify::{Notification, Notifications, Severity, DEFAULT_TOAST_DURATION};
pub use packages::{Billing, PackageTier, CATALOG};
pub use router::{route, RouteInputs, Screen};
pub use store::{
    PendingShare, RecentSearch, SessionStore, StoreError, StoreResult,
};
