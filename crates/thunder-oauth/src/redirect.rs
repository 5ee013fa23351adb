//! Redirect-URI validation.
//!
//! Matching is deliberately strict: the requested URI must be byte-equal to a
//! registered one. No scheme or case folding, no path normalization, no
//! trailing-slash tolerance. Query parameters are permitted; fragments are
//! rejected outright. Custom schemes (`myapp://callback`), raw IP hosts, and
//! `http://localhost:<port>/...` are all legal because validation is
//! equality, not policy.

use url::Url;

/// Redirect-URI validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RedirectUriError {
    /// No URI was requested and the registration does not pin a single one
    #[error("redirect_uri is required")]
    Required,

    /// The requested URI is not in the registered list
    #[error("redirect_uri is not registered for this client")]
    NotRegistered,

    /// The requested URI carries a fragment component
    #[error("redirect_uri must not contain a fragment")]
    FragmentForbidden,

    /// The single registered URI cannot stand in for an absent request
    /// because it lacks a scheme or host
    #[error("registered redirect_uri is not fully qualified")]
    NotFullyQualified,
}

/// A URI is fully qualified when it parses to a non-empty scheme and host.
fn is_fully_qualified(uri: &str) -> bool {
    Url::parse(uri)
        .map(|parsed| !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

fn has_fragment(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(parsed) => parsed.fragment().is_some(),
        // Relative or otherwise unparseable registrations still cannot smuggle
        // a fragment past the check.
        Err(_) => uri.contains('#'),
    }
}

/// Validate a requested redirect URI against the registered list.
///
/// - An empty request is permitted only when exactly one URI is registered
///   and that URI is fully qualified.
/// - A fragment anywhere in the request is rejected before matching.
/// - A non-empty request must appear byte-for-byte in the registered list.
///
/// # Errors
///
/// The [`RedirectUriError`] naming the rule that failed.
pub fn validate_redirect_uri(
    registered: &[String],
    requested: &str,
) -> Result<(), RedirectUriError> {
    if requested.is_empty() {
        if registered.len() != 1 {
            return Err(RedirectUriError::Required);
        }
        if !is_fully_qualified(&registered[0]) {
            return Err(RedirectUriError::NotFullyQualified);
        }
        return Ok(());
    }

    if has_fragment(requested) {
        return Err(RedirectUriError::FragmentForbidden);
    }

    if !registered.iter().any(|uri| uri == requested) {
        return Err(RedirectUriError::NotRegistered);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(uris: &[&str]) -> Vec<String> {
        uris.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_request_with_single_fully_qualified_uri_is_accepted() {
        let uris = registered(&["https://example.com/callback"]);
        assert_eq!(validate_redirect_uri(&uris, ""), Ok(()));
    }

    #[test]
    fn empty_request_with_relative_uri_is_not_fully_qualified() {
        let uris = registered(&["/callback"]);
        assert_eq!(
            validate_redirect_uri(&uris, ""),
            Err(RedirectUriError::NotFullyQualified)
        );
    }

    #[test]
    fn empty_request_with_multiple_registrations_requires_a_choice() {
        let uris = registered(&["https://a.example/cb", "https://b.example/cb"]);
        assert_eq!(
            validate_redirect_uri(&uris, ""),
            Err(RedirectUriError::Required)
        );
    }

    #[test]
    fn empty_request_with_no_registrations_is_rejected() {
        assert_eq!(
            validate_redirect_uri(&[], ""),
            Err(RedirectUriError::Required)
        );
    }

    #[test]
    fn unregistered_uri_is_rejected() {
        let uris = registered(&["https://example.com/callback"]);
        assert_eq!(
            validate_redirect_uri(&uris, "https://example.com/other"),
            Err(RedirectUriError::NotRegistered)
        );
    }

    #[test]
    fn matching_is_byte_equality_not_normalization() {
        let uris = registered(&["https://example.com/callback"]);
        // Case folding and trailing slashes would be legal per RFC 6749
        // latitude, but the contract pins strict equality.
        assert_eq!(
            validate_redirect_uri(&uris, "https://EXAMPLE.com/callback"),
            Err(RedirectUriError::NotRegistered)
        );
        assert_eq!(
            validate_redirect_uri(&uris, "https://example.com/callback/"),
            Err(RedirectUriError::NotRegistered)
        );
    }

    #[test]
    fn fragments_are_forbidden_before_matching() {
        // The fragment rule fires whether or not the rest of the URI matches
        // a registration.
        let uris = registered(&["https://example.com/callback"]);
        assert_eq!(
            validate_redirect_uri(&uris, "https://example.com/callback#x"),
            Err(RedirectUriError::FragmentForbidden)
        );
        let exact = registered(&["https://example.com/callback#x"]);
        assert_eq!(
            validate_redirect_uri(&exact, "https://example.com/callback#x"),
            Err(RedirectUriError::FragmentForbidden)
        );
    }

    #[test]
    fn query_parameters_are_permitted() {
        let uris = registered(&["https://example.com/callback?flow=1"]);
        assert_eq!(
            validate_redirect_uri(&uris, "https://example.com/callback?flow=1"),
            Ok(())
        );
    }

    #[test]
    fn custom_schemes_localhost_and_raw_ips_are_legal() {
        for uri in [
            "myapp://callback",
            "http://localhost:8080/cb",
            "http://127.0.0.1:9000/cb",
        ] {
            let uris = registered(&[uri]);
            assert_eq!(validate_redirect_uri(&uris, uri), Ok(()), "{uri}");
        }
    }
}
