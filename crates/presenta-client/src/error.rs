//! Error taxonomy for the REST client.
//!
//! Low-level wrappers return these; screens convert them to inline
//! messages or toasts. The variants map one-to-one onto how the UI is
//! allowed to react: `Validation` and `Auth` stay inline and leave the
//! session alone, `SessionExpired` means the session has already been
//! cleared, `Network` is a transient toast.

use presenta_core::StoreError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The session was cleared; the caller routes back to login.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Bad credentials or a denied request. The stored session is
    /// untouched.
    #[error("{0}")]
    Auth(String),

    /// Form-level rejection from the backend, recovered locally.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Transport-level failure. Not auto-retried (the one refresh retry
    /// is the only exception anywhere in the client).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Card checkout failures, kept separate so the payment form can show
/// decline text inline while gateway-unreachable gets blocker guidance.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{0}")]
    Declined(String),

    #[error(
        "payment gateway unreachable; a network filter or ad blocker may be blocking it"
    )]
    Unavailable,

    #[error("payment setup failed: {0}")]
    Setup(String),
}
