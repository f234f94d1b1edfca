//! Fixture naming: request URL -> filesystem-safe fixture key.
//!
//! The derivation must be deterministic across processes because recording
//! and stubbing happen in different runs. Distinct endpoints can collide
//! after sanitization (last write wins); a stronger key would hash the full
//! query string, at the cost of breaking existing fixture trees.

/// Derives the fixture key for a request URL.
///
/// The URL is truncated at the first occurrence of the disambiguation
/// token (per-request noise like a correlation id), the service URL prefix
/// is removed, and every character outside `[A-Za-z0-9]` becomes `_`.
/// Total and never panics.
pub fn fixture_key(request_url: &str, service_url: &str, token: &str) -> String {
    let truncated = if token.is_empty() {
        request_url
    } else {
        request_url.split(token).next().unwrap_or(request_url)
    };

    let stripped = if service_url.is_empty() {
        truncated.to_string()
    } else {
        truncated.replacen(service_url, "", 1)
    };

    sanitize(&stripped)
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// Also used for spec keys and archive names so the whole store shares one
/// filesystem-safe alphabet.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "https://api.example/";

    #[test]
    fn truncates_at_disambiguation_token() {
        let a = fixture_key("https://api.example/v1/items?x=1&iid=9", SERVICE, "&iid");
        let b = fixture_key("https://api.example/v1/items?x=1&iid=2", SERVICE, "&iid");
        assert_eq!(a, "v1_items_x_1");
        assert_eq!(a, b);
    }

    #[test]
    fn strips_service_url_prefix() {
        assert_eq!(
            fixture_key("https://api.example/v1/other", SERVICE, "&iid"),
            "v1_other"
        );
    }

    #[test]
    fn url_without_token_or_prefix_is_fully_sanitized() {
        assert_eq!(
            fixture_key("https://elsewhere.example/a/b?c=d", SERVICE, "&iid"),
            "https___elsewhere_example_a_b_c_d"
        );
    }

    #[test]
    fn output_alphabet_is_restricted() {
        let key = fixture_key("https://api.example/v1/items?q=héllo wörld&iid=1", SERVICE, "&iid");
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn deterministic_across_calls() {
        let url = "https://api.example/v1/items?x=1";
        assert_eq!(
            fixture_key(url, SERVICE, "&iid"),
            fixture_key(url, SERVICE, "&iid")
        );
    }

    #[test]
    fn empty_inputs_are_total() {
        assert_eq!(fixture_key("", "", ""), "");
        assert_eq!(fixture_key("", SERVICE, "&iid"), "");
    }

    #[test]
    fn sanitize_keeps_alphanumerics() {
        assert_eq!(sanitize("checkout.spec.ts"), "checkout_spec_ts");
        assert_eq!(sanitize("Already_Safe_123"), "Already_Safe_123");
    }
}
