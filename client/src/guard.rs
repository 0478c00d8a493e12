//! Transport guard for the backend's "still processing" signal.
//!
//! While an event log is being ingested the backend answers every request
//! for that application with `503 Service Unavailable` and a JSON body such
//! as `{"status":503,"message":"...","code":"APP_PARSING"}`. The guard turns
//! that into a navigation to the root view carrying the message, then hands
//! the failure back to the caller.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::ApiError;

/// Root view path the guard navigates to.
pub const ROOT_ROUTE: &str = "/";

/// Message used when the 503 body carries none.
pub const DEFAULT_PROCESSING_MESSAGE: &str = "Processing...";

const SERVICE_UNAVAILABLE: u16 = 503;

/// A navigation request with its transient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub message: String,
}

/// Receives navigation requests raised by the guard.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// Drops every navigation request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _navigation: Navigation) {}
}

#[derive(Debug, Deserialize)]
struct ProcessingBody {
    message: Option<String>,
}

/// Maps non-success responses to [`ApiError`], redirecting on 503.
#[derive(Clone)]
pub struct TransportGuard {
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for TransportGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportGuard").finish_non_exhaustive()
    }
}

impl Default for TransportGuard {
    fn default() -> Self {
        Self::new(Arc::new(NoopNavigator))
    }
}

impl TransportGuard {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Turn a non-success response into the error the caller receives.
    ///
    /// A 503 navigates to [`ROOT_ROUTE`] first. Every other status passes
    /// through untouched.
    pub fn reject(&self, status: u16, body: String) -> ApiError {
        if status != SERVICE_UNAVAILABLE {
            return ApiError::Status { status, body };
        }

        let message = processing_message(&body);
        tracing::warn!(notice = %message, "backend still processing, returning to root view");
        self.navigator.navigate(Navigation {
            path: ROOT_ROUTE.to_string(),
            message: message.clone(),
        });
        ApiError::ServiceUnavailable { message, body }
    }
}

/// `message` from a 503 body, or the default when the body is not JSON or
/// has no usable message.
pub fn processing_message(body: &str) -> String {
    serde_json::from_str::<ProcessingBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROCESSING_MESSAGE.to_string())
}
