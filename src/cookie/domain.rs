//! Allow-list membership for cookie domains.

/// Strips a single leading `.` from a cookie domain.
///
/// `.example.com` and `example.com` both normalize to `example.com`; a second
/// leading dot is kept.
#[must_use]
pub fn normalize_cookie_domain(domain: &str) -> &str {
    domain.strip_prefix('.').unwrap_or(domain)
}

/// Returns `true` when `cookie_domain` is one of `allowed_hosts` or a
/// subdomain of one.
///
/// Comparison is exact byte comparison; hosts are stored lowercase, so callers
/// must lowercase anything they pass in. An empty allow-list never matches.
#[must_use]
pub fn is_cookie_domain_allowed<S: AsRef<str>>(cookie_domain: &str, allowed_hosts: &[S]) -> bool {
    let normalized = normalize_cookie_domain(cookie_domain);
    allowed_hosts.iter().any(|host| {
        let host = host.as_ref();
        normalized == host
            || normalized
                .strip_suffix(host)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
