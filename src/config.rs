// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Every setting is a command-line flag that can also be supplied through an
//! environment variable, so the same binary works under `cargo run` and inside
//! a Deployment manifest:
//!
//! | Flag                     | Environment            | Default                                       |
//! |--------------------------|------------------------|-----------------------------------------------|
//! | `--finalizer`            | `NSL_FINALIZER`        | `namespacelabel.finalizers.dana.io/finalizer` |
//! | `--protected-prefix`     | `NSL_PROTECTED_PREFIX` | `kubernetes.io`                               |
//! | `--metrics-addr`         | `NSL_METRICS_ADDR`     | `0.0.0.0:8080`                                |
//! | `--resync-interval-secs` | `NSL_RESYNC_INTERVAL`  | `300`                                         |
//! | `--error-requeue-secs`   | `NSL_ERROR_REQUEUE`    | `30`                                          |
//! | `--log-format`           | `RUST_LOG_FORMAT`      | `text`                                        |

use crate::constants::{
    DEFAULT_ERROR_REQUEUE_SECS, DEFAULT_FINALIZER, DEFAULT_METRICS_ADDR,
    DEFAULT_PROTECTED_PREFIX, DEFAULT_RESYNC_INTERVAL_SECS,
};
use crate::labels::LabelPolicy;
use crate::reconcilers::finalizers::FinalizationCoordinator;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Invalid operator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// `NamespaceLabel` operator - keeps namespace labels in sync with `NamespaceLabel` objects
#[derive(Parser, Debug, Clone)]
#[command(name = "namespacelabel", version, about, long_about = None)]
pub struct OperatorConfig {
    /// Finalizer placed on `NamespaceLabel` objects
    #[arg(long, env = "NSL_FINALIZER", default_value = DEFAULT_FINALIZER)]
    pub finalizer: String,

    /// Label keys starting with this prefix are never added, removed or overwritten
    #[arg(long, env = "NSL_PROTECTED_PREFIX", default_value = DEFAULT_PROTECTED_PREFIX)]
    pub protected_prefix: String,

    /// Listen address for the /metrics and /healthz endpoints
    #[arg(long, env = "NSL_METRICS_ADDR", default_value = DEFAULT_METRICS_ADDR)]
    pub metrics_addr: SocketAddr,

    /// Seconds before a successfully reconciled object is checked again
    #[arg(long, env = "NSL_RESYNC_INTERVAL", default_value_t = DEFAULT_RESYNC_INTERVAL_SECS)]
    pub resync_interval_secs: u64,

    /// Seconds before a failed reconciliation is retried
    #[arg(long, env = "NSL_ERROR_REQUEUE", default_value_t = DEFAULT_ERROR_REQUEUE_SECS)]
    pub error_requeue_secs: u64,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl OperatorConfig {
    /// Label policy built from `--protected-prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] when the prefix is empty, since an empty
    /// prefix would protect every key.
    pub fn label_policy(&self) -> Result<LabelPolicy, ConfigError> {
        if self.protected_prefix.trim().is_empty() {
            return Err(ConfigError::Empty("protected prefix"));
        }
        Ok(LabelPolicy::new(self.protected_prefix.clone()))
    }

    /// Finalization coordinator built from `--finalizer`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] when the finalizer is empty.
    pub fn finalization(&self) -> Result<FinalizationCoordinator, ConfigError> {
        if self.finalizer.trim().is_empty() {
            return Err(ConfigError::Empty("finalizer"));
        }
        Ok(FinalizationCoordinator::new(self.finalizer.clone()))
    }

    /// Requeue delay after a successful reconciliation.
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Requeue delay after a failed reconciliation.
    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
