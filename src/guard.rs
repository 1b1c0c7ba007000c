//! Input guard: format and SSRF checks on user-supplied URLs.
//!
//! Validation runs in two stages and stops at the first failure:
//!
//! 1. **Format**: the string must parse as an absolute URL whose scheme is
//!    `http` or `https`.
//! 2. **Safety**: the host must not be loopback, unspecified, cloud metadata,
//!    a private-network prefix, or the deploying platform's own domain.
//!
//! The safety stage is textual. Hostnames are not resolved, so a public name
//! that resolves to a private address (DNS rebinding) passes. IPv4 literals
//! are normalised by the `url` parser, which folds encodings such as
//! `0x7f.1` into dotted-quad before the deny-list sees them.

use crate::error::StratosError;
use url::{Host, Url};

/// Hosts rejected on exact match.
pub const DEFAULT_DENIED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    "::1",
    "169.254.169.254",
];

/// Host prefixes rejected on textual match.
pub const DEFAULT_PRIVATE_PREFIXES: &[&str] = &["192.168.", "10."];

/// Hosting platform domain; the app must not scan itself.
pub const DEFAULT_PLATFORM_DOMAIN: &str = "vercel.app";

/// Why a URL was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Not an absolute http(s) URL.
    InvalidFormat,
    /// Parsed fine but targets a forbidden host.
    Restricted { host: String },
}

impl GuardError {
    /// Attach the offending URL and lift into the library error.
    pub fn into_error(self, url: &str) -> StratosError {
        match self {
            GuardError::InvalidFormat => StratosError::InvalidUrl {
                url: url.to_string(),
            },
            GuardError::Restricted { host } => StratosError::RestrictedUrl {
                url: url.to_string(),
                host,
            },
        }
    }
}

/// Deny-list used by the safety stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub denied_hosts: Vec<String>,
    pub private_prefixes: Vec<String>,
    /// Rejected when the host equals it or is a subdomain of it.
    pub platform_domain: Option<String>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            denied_hosts: DEFAULT_DENIED_HOSTS.iter().map(|s| s.to_string()).collect(),
            private_prefixes: DEFAULT_PRIVATE_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            platform_domain: Some(DEFAULT_PLATFORM_DOMAIN.to_string()),
        }
    }
}

impl GuardPolicy {
    /// Replace the platform domain (e.g. the deployment's own host).
    pub fn with_platform_domain(mut self, domain: impl Into<String>) -> Self {
        self.platform_domain = Some(domain.into().to_lowercase());
        self
    }

    /// Returns true when `host` (already lower-cased) may be fetched.
    pub fn allows_host(&self, host: &str) -> bool {
        if self.denied_hosts.iter().any(|h| h == host) {
            return false;
        }
        if self.private_prefixes.iter().any(|p| host.starts_with(p.as_str())) {
            return false;
        }
        if let Some(ref domain) = self.platform_domain {
            if host == domain || host.ends_with(&format!(".{domain}")) {
                return false;
            }
        }
        true
    }
}

/// Stage 1: parse as an absolute http(s) URL.
pub fn parse_web_url(candidate: &str) -> Result<Url, GuardError> {
    let url = Url::parse(candidate.trim()).map_err(|_| GuardError::InvalidFormat)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(GuardError::InvalidFormat),
    }
}

/// Host of `url` as the deny-list sees it: lower-case, IPv6 without brackets.
pub fn normalized_host(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(d) => Some(d.trim_end_matches('.').to_lowercase()),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Run both stages. The returned `Url` is the only value the extractor
/// accepts, so no fetch can bypass the guard.
pub fn validate_url(candidate: &str, policy: &GuardPolicy) -> Result<Url, GuardError> {
    let url = parse_web_url(candidate)?;
    let host = normalized_host(&url).ok_or(GuardError::Restricted {
        host: String::new(),
    })?;
    if !policy.allows_host(&host) {
        return Err(GuardError::Restricted { host });
    }
    Ok(url)
}

/// Stage-1 verdict only.
pub fn is_valid_url(candidate: &str) -> bool {
    parse_web_url(candidate).is_ok()
}

/// Stage-2 verdict, with the default policy. Unparseable input is unsafe.
pub fn is_safe_url(candidate: &str) -> bool {
    validate_url(candidate, &GuardPolicy::default()).is_ok()
}

/// Trim user notes, drop blank input and cap the length in characters.
pub fn sanitize_notes(context: Option<&str>, limit: usize) -> Option<String> {
    let trimmed = context?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(limit).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str) -> Result<Url, GuardError> {
        validate_url(url, &GuardPolicy::default())
    }

    #[test]
    fn accepts_public_urls() {
        assert!(check("https://example.com/press/launch").is_ok());
        assert!(check("http://news.ycombinator.com").is_ok());
        assert!(check("https://192.169.0.1/").is_ok());
    }

    #[test]
    fn denied_hosts_rejected_regardless_of_scheme_or_path() {
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "[::1]", "169.254.169.254", "vercel.app"] {
            for scheme in ["http", "https"] {
                for path in ["", "/", "/admin", "/latest/meta-data/?x=1"] {
                    let url = format!("{scheme}://{host}{path}");
                    assert!(
                        matches!(check(&url), Err(GuardError::Restricted { .. })),
                        "{url} should be restricted"
                    );
                }
            }
        }
    }

    #[test]
    fn private_prefixes_rejected() {
        for url in [
            "http://192.168.1.1/router",
            "https://192.168.0.254",
            "http://10.0.0.5:8080/",
            "http://10.255.255.255/x",
        ] {
            assert!(
                matches!(check(url), Err(GuardError::Restricted { .. })),
                "{url} should be restricted"
            );
        }
    }

    #[test]
    fn host_is_lowercased() {
        assert!(matches!(
            check("HTTP://LOCALHOST:3000/"),
            Err(GuardError::Restricted { .. })
        ));
    }

    #[test]
    fn platform_subdomains_rejected() {
        let err = check("https://my-app.vercel.app/api/analyze").unwrap_err();
        assert_eq!(
            err,
            GuardError::Restricted {
                host: "my-app.vercel.app".into()
            }
        );
        assert!(check("https://notvercel.app").is_ok());
    }

    #[test]
    fn custom_platform_domain() {
        let policy = GuardPolicy::default().with_platform_domain("stratos.example");
        assert!(validate_url("https://stratos.example/", &policy).is_err());
        assert!(validate_url("https://my-app.vercel.app/", &policy).is_ok());
    }

    #[test]
    fn format_failures_come_first() {
        for bad in ["not-a-url", "", "   ", "ftp://127.0.0.1/", "javascript:alert(1)", "/relative/path", "localhost:8080"] {
            assert_eq!(check(bad).unwrap_err(), GuardError::InvalidFormat, "{bad:?}");
        }
    }

    #[test]
    fn stage_verdicts() {
        assert!(is_valid_url("http://127.0.0.1/admin"));
        assert!(!is_safe_url("http://127.0.0.1/admin"));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_safe_url("not-a-url"));
        assert!(is_safe_url("https://example.com"));
    }

    #[test]
    fn alternate_ipv4_encoding_is_normalised() {
        assert!(matches!(
            check("http://0x7f.0.0.1/"),
            Err(GuardError::Restricted { .. })
        ));
    }

    #[test]
    fn guard_error_maps_to_statuses() {
        assert_eq!(GuardError::InvalidFormat.into_error("x").status_code(), 400);
        let e = GuardError::Restricted {
            host: "localhost".into(),
        }
        .into_error("http://localhost");
        assert_eq!(e.status_code(), 403);
    }

    #[test]
    fn notes_are_trimmed_and_capped() {
        assert_eq!(sanitize_notes(None, 10), None);
        assert_eq!(sanitize_notes(Some("   "), 10), None);
        assert_eq!(sanitize_notes(Some("  hi  "), 10).as_deref(), Some("hi"));
        let long = "é".repeat(50);
        assert_eq!(sanitize_notes(Some(&long), 20).unwrap().chars().count(), 20);
    }
}
