// Copyright 2024-2026 artifact-io Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults.

use crate::config::{self, EffectiveConfig, DEFAULT_USER_AGENT};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    let cfg = config::load().effective_config();
    print!("{}", format_config(&cfg));
}

/// Print documented defaults (no env overrides) to stdout.
pub fn run_defaults() {
    println!("ARTIFACT_IO_HTTP_TIMEOUT=0");
    println!("ARTIFACT_IO_USER_AGENT={}", DEFAULT_USER_AGENT);
    println!("ARTIFACT_IO_SERVER_RUNTIME=true");
    println!("ARTIFACT_IO_LOG_LEVEL=info");
    println!("ARTIFACT_IO_LOG_FORMAT=json");
}

fn format_config(cfg: &EffectiveConfig) -> String {
    format!(
        "ARTIFACT_IO_HTTP_TIMEOUT={}\n\
         ARTIFACT_IO_USER_AGENT={}\n\
         ARTIFACT_IO_SERVER_RUNTIME={}\n\
         ARTIFACT_IO_LOG_LEVEL={}\n\
         ARTIFACT_IO_LOG_FORMAT={}\n",
        cfg.http_timeout_secs, cfg.user_agent, cfg.server_runtime, cfg.log_level, cfg.log_format
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_config_lists_every_key() {
        let cfg = EffectiveConfig {
            http_timeout_secs: 10,
            user_agent: "ua".into(),
            server_runtime: false,
            log_level: "debug".into(),
            log_format: "pretty",
        };
        let out = format_config(&cfg);
        assert!(out.contains("ARTIFACT_IO_HTTP_TIMEOUT=10\n"));
        assert!(out.contains("ARTIFACT_IO_SERVER_RUNTIME=false\n"));
        assert!(out.contains("ARTIFACT_IO_LOG_FORMAT=pretty\n"));
        assert_eq!(out.lines().count(), 5);
    }
}
