// [libs/domain/rate-limit/src/key.rs]
//! Composite key construction (spec S4.8): user id and/or ip, optional
//! path scoping. The same request surface can be limited per-user
//! (`api` quota) or per-ip (SSRF egress) just by which identity fields
//! are supplied.

/// Identity inputs a caller has available for a single check. At least
/// one of `user_id`/`ip` must be set or the resulting key collapses
/// every caller onto one bucket — that's a caller bug, not something
/// this type tries to prevent, since some legitimate limiters (a
/// global egress cap) want exactly that.
#[derive(Debug, Clone, Default)]
pub struct RateLimitKey {
    pub user_id: Option<String>,
    pub ip: Option<String>,
    pub path: Option<String>,
}

impl RateLimitKey {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()), ip: None, path: None }
    }

    pub fn ip(ip: impl Into<String>) -> Self {
        Self { user_id: None, ip: Some(ip.into()), path: None }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Renders the composite key used as the KVS suffix: `rl:{composite}`.
    /// Field order is fixed (user, ip, path) so the same identity always
    /// maps to the same bucket regardless of call-site construction order.
    pub fn composite(&self) -> String {
        let mut parts = Vec::new();
        if let Some(user_id) = &self.user_id {
            parts.push(format!("u:{user_id}"));
        }
        if let Some(ip) = &self.ip {
            parts.push(format!("ip:{ip}"));
        }
        if let Some(path) = &self.path {
            parts.push(format!("p:{path}"));
        }
        if parts.is_empty() {
            "global".to_string()
        } else {
            parts.join("|")
        }
    }
}
