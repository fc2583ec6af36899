//! Form value lookup across the query string and an urlencoded body.

use http::Method;

use crate::ExtractionContext;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Returns the first value for `key`.
///
/// Values from an urlencoded `POST`, `PUT` or `PATCH` body take precedence
/// over query string values. Unparsable input contributes no values.
#[must_use]
pub fn form_value(ctx: &ExtractionContext, key: &str) -> Option<String> {
    form_values(ctx)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Returns every form pair, body pairs first, then query pairs.
#[must_use]
pub fn form_values(ctx: &ExtractionContext) -> Vec<(String, String)> {
    let mut pairs = body_pairs(ctx);
    if let Some(query) = ctx.query_string() {
        pairs.extend(parse_pairs(query.as_bytes()));
    }
    pairs
}

fn body_pairs(ctx: &ExtractionContext) -> Vec<(String, String)> {
    let has_form_body = matches!(*ctx.method(), Method::POST | Method::PUT | Method::PATCH)
        && ctx
            .content_type()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));

    if has_form_body {
        parse_pairs(ctx.body())
    } else {
        Vec::new()
    }
}

fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(input).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_value() {
        let ctx = ExtractionContext::builder()
            .uri("/api/v2/device/mac:112233445566/config?names=a,b&attributes=notify")
            .build();

        assert_eq!(form_value(&ctx, "names").as_deref(), Some("a,b"));
        assert_eq!(form_value(&ctx, "attributes").as_deref(), Some("notify"));
        assert_eq!(form_value(&ctx, "missing"), None);
    }

    #[test]
    fn test_first_query_value_wins() {
        let ctx = ExtractionContext::builder()
            .uri("/path?names=first&names=second")
            .build();
        assert_eq!(form_value(&ctx, "names").as_deref(), Some("first"));
    }

    #[test]
    fn test_percent_decoding() {
        let ctx = ExtractionContext::builder()
            .uri("/path?names=Device.A%2CDevice.B")
            .build();
        assert_eq!(form_value(&ctx, "names").as_deref(), Some("Device.A,Device.B"));
    }

    #[test]
    fn test_form_body_takes_precedence() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .uri("/path?names=query")
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body("names=body")
            .build();

        assert_eq!(form_value(&ctx, "names").as_deref(), Some("body"));
        assert_eq!(form_values(&ctx).len(), 2);
    }

    #[test]
    fn test_json_body_is_not_form() {
        let ctx = ExtractionContext::builder()
            .method(Method::PATCH)
            .uri("/path?names=query")
            .header("content-type", "application/json")
            .body("names=body")
            .build();

        assert_eq!(form_value(&ctx, "names").as_deref(), Some("query"));
    }

    #[test]
    fn test_get_body_is_ignored() {
        let ctx = ExtractionContext::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("names=body")
            .build();

        assert_eq!(form_value(&ctx, "names"), None);
    }

    #[test]
    fn test_empty_value_is_present() {
        let ctx = ExtractionContext::builder().uri("/path?names=").build();
        assert_eq!(form_value(&ctx, "names").as_deref(), Some(""));
    }
}
