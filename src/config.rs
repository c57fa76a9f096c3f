// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{get_setting, set_setting};
use crate::errors::ClientError;

pub const ENV_API_BASE_URL: &str = "FINVIEW_API_BASE_URL";

/// Keys accepted by `config set`.
pub const KEYS: [&str; 5] = [
    "api_base_url",
    "request_timeout_secs",
    "descriptor_timeout_secs",
    "recent_limit",
    "currency_symbol",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Per-descriptor deadline inside an orchestrated join; `None` waits indefinitely.
    pub descriptor_timeout: Option<Duration>,
    pub recent_limit: usize,
    pub currency_symbol: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            request_timeout: Duration::from_secs(15),
            descriptor_timeout: Some(Duration::from_secs(10)),
            recent_limit: 5,
            currency_symbol: "$".into(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the `settings` table, then the process environment.
    pub fn load(conn: &Connection) -> Result<Self, ClientError> {
        Self::load_with_env(conn, |k| std::env::var(k).ok())
    }

    pub fn load_with_env(
        conn: &Connection,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let mut cfg = Self::default();
        for key in KEYS {
            if let Some(v) = get_setting(conn, key)? {
                cfg.apply(key, &v)?;
            }
        }
        if let Some(url) = env(ENV_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            cfg.apply("api_base_url", &url)?;
        }
        Ok(cfg)
    }

    /// Validates and persists one override.
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<(), ClientError> {
        let mut probe = Self::default();
        probe.apply(key, value)?;
        set_setting(conn, key, value.trim())?;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        let value = value.trim();
        match key {
            "api_base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(ClientError::validation(
                        "api_base_url",
                        format!("'{value}' must start with http:// or https://"),
                    ));
                }
                self.api_base_url = value.trim_end_matches('/').to_string();
            }
            "request_timeout_secs" => {
                let secs = parse_secs("request_timeout_secs", value)?;
                self.request_timeout = Duration::from_secs(secs.max(1));
            }
            "descriptor_timeout_secs" => {
                // 0 disables the per-descriptor deadline
                let secs = parse_secs("descriptor_timeout_secs", value)?;
                self.descriptor_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            "recent_limit" => {
                self.recent_limit = value.parse().map_err(|_| {
                    ClientError::validation("recent_limit", format!("'{value}' is not a count"))
                })?;
            }
            "currency_symbol" => {
                if value.is_empty() {
                    return Err(ClientError::validation(
                        "currency_symbol",
                        "must not be empty",
                    ));
                }
                self.currency_symbol = value.to_string();
            }
            _ => {
                return Err(ClientError::validation(
                    "key",
                    format!("unknown setting '{key}' (known: {})", KEYS.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::validation(key, format!("'{value}' is not a number of seconds")))
}
