//! Service configuration.
//!
//! Everything is settable programmatically (used by tests) and from the
//! environment (used by the binary):
//!
//! - `RELEASE_GATE_BIND` - listen address, default `0.0.0.0:3000`
//! - `RELEASE_GATE_WEBHOOK_SECRET` - shared HMAC secret; unset disables
//!   signature verification
//! - `RELEASE_GATE_ASYNC_MODE` - `false`/`0` switches to synchronous
//!   in-line dispatch; default true
//! - `RELEASE_GATE_REPOS` - registered repositories, e.g.
//!   `7:owner/lib,8:owner/tool:disabled`

use std::net::SocketAddr;

use tracing::warn;

use crate::types::Repository;
use crate::worker::RELEASE_QUEUE_BUFFER;

/// Top-level configuration for the service.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Shared webhook secret. `None` disables signature verification.
    pub webhook_secret: Option<Vec<u8>>,

    /// Dispatch admitted releases via the queue (true, default) or
    /// synchronously in-line (false).
    pub async_mode: bool,

    /// Capacity of the release queue.
    pub queue_capacity: usize,

    /// Repositories to register at startup.
    pub repositories: Vec<Repository>,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            webhook_secret: None,
            async_mode: true,
            queue_capacity: RELEASE_QUEUE_BUFFER,
            repositories: Vec::new(),
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        GateConfig::default()
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Builds a configuration from `RELEASE_GATE_*` environment variables,
    /// falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = GateConfig::default();

        if let Ok(bind) = std::env::var("RELEASE_GATE_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => warn!(%bind, "ignoring unparsable RELEASE_GATE_BIND"),
            }
        }
        if let Ok(secret) = std::env::var("RELEASE_GATE_WEBHOOK_SECRET") {
            config.webhook_secret = Some(secret.into_bytes());
        }
        if let Ok(mode) = std::env::var("RELEASE_GATE_ASYNC_MODE") {
            config.async_mode = !matches!(mode.as_str(), "false" | "0");
        }
        if let Ok(spec) = std::env::var("RELEASE_GATE_REPOS") {
            config.repositories = parse_repo_spec(&spec);
        }

        config
    }
}

/// Parses the `RELEASE_GATE_REPOS` format: comma-separated `id:name` entries,
/// with an optional `:disabled` suffix. Malformed entries are skipped with a
/// warning rather than refusing startup.
pub fn parse_repo_spec(spec: &str) -> Vec<Repository> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let id = parts.next()?.parse::<u64>().ok();
            let name = parts.next();
            let enabled = parts.next() != Some("disabled");
            match (id, name) {
                (Some(id), Some(name)) if !name.is_empty() => {
                    Some(Repository::new(id, name, enabled))
                }
                _ => {
                    warn!(entry, "skipping malformed repository entry");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoGithubId;

    #[test]
    fn defaults_are_async_with_no_secret() {
        let config = GateConfig::default();
        assert!(config.async_mode);
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.queue_capacity, RELEASE_QUEUE_BUFFER);
    }

    #[test]
    fn builders_override_fields() {
        let config = GateConfig::new()
            .with_webhook_secret(b"s3cret".to_vec())
            .with_async_mode(false);
        assert_eq!(config.webhook_secret.as_deref(), Some(&b"s3cret"[..]));
        assert!(!config.async_mode);
    }

    #[test]
    fn repo_spec_parses_enabled_and_disabled_entries() {
        let repos = parse_repo_spec("7:owner/lib,8:owner/tool:disabled");
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].github_id, RepoGithubId(7));
        assert_eq!(repos[0].name, "owner/lib");
        assert!(repos[0].enabled);
        assert_eq!(repos[1].name, "owner/tool");
        assert!(!repos[1].enabled);
    }

    #[test]
    fn repo_spec_skips_malformed_entries() {
        let repos = parse_repo_spec("not-a-number:lib,9,,10:ok/repo");
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "ok/repo");
    }

    #[test]
    fn empty_repo_spec_is_empty() {
        assert!(parse_repo_spec("").is_empty());
    }
}
