use ammonia;

/// Clean user-supplied text using the ammonia library.
///
/// Whitelist-based: safe inline tags survive, `<script>` and event-handler
/// attributes are stripped. Applied to self-service display names before they
/// reach the directory.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_strips_script() {
        let cleaned = clean_html("Jean<script>alert(1)</script>");
        assert_eq!(cleaned, "Jean");
    }

    #[test]
    fn test_clean_html_keeps_plain_text() {
        assert_eq!(clean_html("Marie Claire"), "Marie Claire");
    }
}
