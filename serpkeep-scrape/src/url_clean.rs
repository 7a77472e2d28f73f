//! Result URL cleaning.
//!
//! Google wraps organic links in a redirect (`/url?q=<destination>&sa=...`).
//! Cleaning unwraps the destination, absolutises site-relative links against
//! the engine origin, and leaves everything else untouched.

use url::Url;

/// Substring that marks a redirect-wrapped link.
const REDIRECT_MARKER: &str = "/url?q=";

/// Path of the redirect endpoint.
const REDIRECT_PATH: &str = "/url";

/// Clean a result link found on a page served from `base`.
///
/// 1. `/url?q=...` redirect wrappers yield the decoded `q` parameter
///    (empty if the parameter is missing).
/// 2. Site-relative links (`/...`) are prefixed with `base`'s origin.
/// 3. Anything else is returned as-is.
pub fn clean_url(href: &str, base: &Url) -> String {
    if href.contains(REDIRECT_MARKER) {
        if let Some(target) = unwrap_redirect(href, base) {
            return target;
        }
    }

    if href.starts_with('/') {
        return format!("{}{href}", base.origin().ascii_serialization());
    }

    href.to_owned()
}

fn unwrap_redirect(href: &str, base: &Url) -> Option<String> {
    let parsed = base.join(href).ok()?;
    if parsed.path() != REDIRECT_PATH {
        return None;
    }
    Some(
        parsed
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default(),
    )
}
