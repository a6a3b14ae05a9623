//! Text-pattern extraction from portal responses.
//!
//! The portal exposes no API contract for these values; they are scraped out
//! of page markup and the token endpoint's plain-text body. Every
//! markup-coupled pattern in the crate lives here, so a portal-side markup
//! change is a one-module fix.

use regex::Regex;

/// Extracts the CSRF token from the bootstrap endpoint's response body.
///
/// The token sits on a line of the form `ZOOM-CSRFTOKEN:<token>`.
pub fn csrf_token(body: &str) -> Option<String> {
    let pattern =
        Regex::new(r"(?m)^ZOOM-CSRFTOKEN:([0-9A-Za-z_-]+)$").expect("valid token regex");
    pattern.captures(body).map(|captures| captures[1].to_string())
}

/// Finds the public join link for `meeting_id` in a meeting page body by
/// matching an anchor href under the given origin.
pub fn join_link(page: &str, origin: &str, meeting_id: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r#"href="({}/j/{}[^"]*)""#,
        regex::escape(origin),
        regex::escape(meeting_id)
    ))
    .expect("valid join-link regex");
    pattern.captures(page).map(|captures| captures[1].to_string())
}

/// Recovers the numeric meeting ID from a previously recorded join link.
pub fn meeting_id_from_link(link: &str) -> Option<String> {
    let pattern = Regex::new(r"/j/([0-9]+)([^0-9]|$)").expect("valid meeting-id regex");
    pattern.captures(link).map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_token_from_body() {
        assert_eq!(
            csrf_token("ZOOM-CSRFTOKEN:Ab9_x-Y2").as_deref(),
            Some("Ab9_x-Y2")
        );
    }

    #[test]
    fn test_csrf_token_among_other_lines() {
        let body = "ok\nZOOM-CSRFTOKEN:tok123\ndone";
        assert_eq!(csrf_token(body).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_csrf_token_missing() {
        assert_eq!(csrf_token("<html>login required</html>"), None);
    }

    #[test]
    fn test_join_link_with_password_query() {
        let page = r#"<a href="https://origin.example/j/123456789?pwd=abc123">Join</a>"#;
        assert_eq!(
            join_link(page, "https://origin.example", "123456789").as_deref(),
            Some("https://origin.example/j/123456789?pwd=abc123")
        );
    }

    #[test]
    fn test_join_link_wrong_meeting_id() {
        let page = r#"<a href="https://origin.example/j/999?pwd=abc">Join</a>"#;
        assert_eq!(join_link(page, "https://origin.example", "123"), None);
    }

    #[test]
    fn test_meeting_id_from_link() {
        assert_eq!(
            meeting_id_from_link("https://origin.example/j/123456789?pwd=abc").as_deref(),
            Some("123456789")
        );
        assert_eq!(
            meeting_id_from_link("https://origin.example/j/42").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_meeting_id_from_unrelated_link() {
        assert_eq!(meeting_id_from_link("https://origin.example/rec/share/xyz"), None);
    }
}
