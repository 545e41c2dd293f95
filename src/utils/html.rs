use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Question and option texts are imported by admins and rendered to
/// candidates, so only the whitelisted tags (like <b>, <p>) survive.
/// Script tags are dropped together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
