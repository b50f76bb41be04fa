//! Download encoding for rendered documents.

use base64::{engine::general_purpose, Engine as _};

pub const CONTENT_TYPE: &str = "text/plain";

/// `data:` URI carrying `content` as base64 plain text.
pub fn data_uri(content: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(content.as_bytes());
    format!("data:{CONTENT_TYPE};base64,{encoded}")
}

/// HTML anchor that downloads `content` as `filename`.
pub fn download_link(content: &str, filename: &str, link_text: &str) -> String {
    format!(
        r#"<a href="{}" download="{}">{}</a>"#,
        data_uri(content),
        escape_attribute(filename),
        escape_text(link_text)
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let content = "Given <a>\n\nExamples:\n|a |\n|1 |";
        let uri = data_uri(content);
        let encoded = uri.strip_prefix("data:text/plain;base64,").unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), content);
    }

    #[test]
    fn test_download_link() {
        let link = download_link("Given x\n", "gherkin_scenario.txt", "Download Gherkin Scenario");
        assert_eq!(
            link,
            r#"<a href="data:text/plain;base64,R2l2ZW4geAo=" download="gherkin_scenario.txt">Download Gherkin Scenario</a>"#
        );
    }

    #[test]
    fn test_download_link_escapes_filename() {
        let link = download_link("", "a\"b.txt", "<go>");
        assert!(link.contains(r#"download="a&quot;b.txt""#));
        assert!(link.ends_with(">&lt;go&gt;</a>"));
    }
}
