//! HTML helpers for the scraped sources

use crate::types::SourceError;
use scraper::{ElementRef, Selector};

/// Compile a CSS selector
pub(crate) fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("invalid selector {}: {:?}", css, e)))
}

/// Trimmed text content of an element, `None` when empty
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Trimmed text content of the first descendant matching `selector`
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(element_text)
}

/// Attribute value of the first descendant matching `selector`
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_text_and_attr_helpers() {
        let doc = Html::parse_fragment(
            r#"<div><p class="t">  Hello <b>world</b> </p><img src=" a.jpg "><span> </span></div>"#,
        );
        let root = doc.root_element();

        assert_eq!(
            first_text(root, &selector("p.t").unwrap()).as_deref(),
            Some("Hello world")
        );
        assert_eq!(
            first_attr(root, &selector("img").unwrap(), "src").as_deref(),
            Some("a.jpg")
        );
        assert_eq!(first_text(root, &selector("span").unwrap()), None);
        assert_eq!(first_attr(root, &selector("img").unwrap(), "alt"), None);
    }

    #[test]
    fn test_invalid_selector_is_parse_error() {
        assert!(matches!(selector("div[["), Err(SourceError::Parse(_))));
    }
}
