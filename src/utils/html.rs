use ammonia;

/// Clean question content using the ammonia library.
///
/// Question and option texts come straight from a spreadsheet that anyone with
/// edit access can change, so they are sanitised before reaching the candidate.
/// Safe formatting tags (like <b>, <sup>) survive; <script> is removed together
/// with its content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_formatting_tags() {
        assert_eq!(clean_html("x<sup>2</sup>"), "x<sup>2</sup>");
    }

    #[test]
    fn drops_event_handlers() {
        assert_eq!(clean_html(r#"<b onclick="steal()">bold</b>"#), "<b>bold</b>");
    }
}
