// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionStatus;

/// Failures surfaced by the client core.
///
/// Network, service and timeout failures raised inside an orchestrated join never
/// escape it; they are turned into fallbacks there. They only reach callers from
/// direct (non-orchestrated) calls such as creates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },
    #[error("local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Failures worth a dismissible notice rather than an inline field message.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Service { .. } | Self::Timeout(_)
        )
    }
}

impl From<rusqlite::Error> for ClientError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Service {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_decode() => Self::Service {
                status: 200,
                message: format!("malformed response: {e}"),
            },
            None => Self::Network(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_split() {
        assert!(ClientError::Network("down".into()).is_transient());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!ClientError::validation("amount", "required").is_transient());
        assert!(!ClientError::NotAuthenticated.is_transient());
    }

    #[test]
    fn validation_message_names_field() {
        let e = ClientError::validation("name", "must not be empty");
        assert_eq!(e.to_string(), "name: must not be empty");
    }
}
