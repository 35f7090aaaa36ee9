// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, LogFormat, OperatorConfig};
    use crate::constants::{DEFAULT_FINALIZER, DEFAULT_PROTECTED_PREFIX};
    use clap::Parser;
    use std::time::Duration;

    fn parse(args: &[&str]) -> OperatorConfig {
        let argv = std::iter::once("namespacelabel").chain(args.iter().copied());
        OperatorConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);

        assert_eq!(config.finalizer, DEFAULT_FINALIZER);
        assert_eq!(config.protected_prefix, DEFAULT_PROTECTED_PREFIX);
        assert_eq!(config.metrics_addr.port(), 8080);
        assert_eq!(config.resync_interval(), Duration::from_secs(300));
        assert_eq!(config.error_requeue(), Duration::from_secs(30));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--finalizer",
            "example.com/cleanup",
            "--protected-prefix",
            "example.com/",
            "--metrics-addr",
            "127.0.0.1:9090",
            "--resync-interval-secs",
            "60",
            "--error-requeue-secs",
            "5",
            "--log-format",
            "json",
        ]);

        assert_eq!(config.finalization().unwrap().finalizer(), "example.com/cleanup");
        assert_eq!(config.label_policy().unwrap().protected_prefix(), "example.com/");
        assert_eq!(config.metrics_addr.to_string(), "127.0.0.1:9090");
        assert_eq!(config.resync_interval(), Duration::from_secs(60));
        assert_eq!(config.error_requeue(), Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let config = parse(&["--finalizer", "", "--protected-prefix", " "]);

        assert_eq!(
            config.finalization().unwrap_err(),
            ConfigError::Empty("finalizer")
        );
        assert_eq!(
            config.label_policy().unwrap_err(),
            ConfigError::Empty("protected prefix")
        );
    }

    #[test]
    fn test_invalid_metrics_addr_fails_to_parse() {
        let argv = ["namespacelabel", "--metrics-addr", "not-an-address"];
        assert!(OperatorConfig::try_parse_from(argv).is_err());
    }
}
