use crate::{error::ScrapeError, listing::parse_selector};
use async_trait::async_trait;
use scraper::Html;

/// Something that can turn a problem link into its description markup.
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_detail(&self, link: &str) -> Result<String, ScrapeError>;
}

/// Append an optional fixed path suffix to a problem link.
pub fn detail_url(link: &str, suffix: Option<&str>) -> String {
    match suffix.map(|s| s.trim_start_matches('/')) {
        Some(s) if !s.is_empty() => format!("{}/{}", link.trim_end_matches('/'), s),
        _ => link.to_string(),
    }
}

/// Outer markup of the first element matching `selector`, flattened.
pub fn extract_detail(html: &str, selector: &str) -> Result<Option<String>, ScrapeError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .next()
        .map(|node| flatten_markup(&node.html())))
}

/// Collapse each run of line breaks into a single space.
pub fn flatten_markup(markup: &str) -> String {
    let mut ret = String::with_capacity(markup.len());
    let mut in_break = false;
    for c in markup.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                ret.push(' ');
            }
            in_break = true;
        } else {
            ret.push(c);
            in_break = false;
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn detail_url_should_join_suffix() {
        assert_eq!(detail_url("https://x/1", None), "https://x/1");
        assert_eq!(
            detail_url("https://x/1/", Some("/description/")),
            "https://x/1/description/"
        );
        assert_eq!(detail_url("https://x/1", Some("")), "https://x/1");
    }

    #[test]
    fn flatten_markup_should_collapse_line_breaks() {
        assert_eq!(flatten_markup("<p>a</p>\r\n\n<p>b</p>\n"), "<p>a</p> <p>b</p> ");
        assert_eq!(flatten_markup("no breaks"), "no breaks");
    }

    #[test]
    fn extract_detail_should_work() {
        let content = fs::read_to_string("fixtures/detail.html").unwrap();
        let markup = extract_detail(&content, "div.elfjS").unwrap().unwrap();

        assert!(markup.starts_with(r#"<div class="elfjS""#));
        assert!(markup.ends_with("</div>"));
        assert!(markup.contains("<strong>at least twice</strong>"));
        assert!(!markup.contains('\n'));

        assert!(extract_detail(&content, "div.missing").unwrap().is_none());
    }
}
