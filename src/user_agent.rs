//! Default User-Agent for site and media requests.
//!
//! The landing pages refuse obvious non-browser clients, so the session
//! identifies as a desktop browser unless the caller overrides it through
//! [`SessionConfig`](crate::resolver::SessionConfig).

/// Desktop browser User-Agent used when no override is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/56.0.2924.87 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_looks_like_browser() {
        assert!(DEFAULT_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(
            DEFAULT_USER_AGENT.contains("Chrome"),
            "UA must identify as a browser: {DEFAULT_USER_AGENT}"
        );
        assert!(!DEFAULT_USER_AGENT.contains("  "), "no doubled spaces from line continuation");
    }
}
