//! amazon.com Source (scraped)
//!
//! Two requests: a search for the ISBN, then the product page of the first
//! search result. The product page supplies title, main image, description
//! and the "rich product information" carousel (print length, language,
//! publisher, publication date).

use super::html::{first_attr, first_text, selector};
use super::http;
use crate::isbn::strip_separators;
use crate::types::{FetchOptions, Record, SourceAdapter, SourceError, SourceId};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

/// amazon.com base URL
const AMAZON_BASE_URL: &str = "https://www.amazon.com";

/// amazon.com Source
pub struct AmazonSource {
    http_client: Client,
}

impl AmazonSource {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl SourceAdapter for AmazonSource {
    fn id(&self) -> SourceId {
        SourceId::Amazon
    }

    async fn fetch(&self, code: &str, options: &FetchOptions) -> Result<Record, SourceError> {
        let search_url = format!("{}/s?k={}", AMAZON_BASE_URL, strip_separators(code));
        let search_page = http::get_text(&self.http_client, &search_url, options).await?;

        let link = parse_search_page(&search_page)?
            .ok_or_else(|| SourceError::NotFound(format!("no amazon search result for {}", code)))?;
        let product_url = absolute_url(&link);
        debug!(code = %code, url = %product_url, "Amazon product page selected");

        let product_page = http::get_text(&self.http_client, &product_url, options).await?;
        parse_product_page(code, &product_page)
    }
}

/// Link of the first search result, if any
pub fn parse_search_page(page: &str) -> Result<Option<String>, SourceError> {
    let document = Html::parse_document(page);
    let result_link = selector(".s-result-item .a-link-normal")?;
    Ok(first_attr(document.root_element(), &result_link, "href"))
}

/// Extract a record from a product page
pub fn parse_product_page(code: &str, page: &str) -> Result<Record, SourceError> {
    let document = Html::parse_document(page);
    let root = document.root_element();

    let title = selector("#productTitle")?;
    let image = selector("#main-image-container .imgTagWrapper img")?;
    let description = selector("#bookDescription_feature_div span:not([class])")?;
    let info_items = selector("#rich_product_information ol li")?;
    let label = selector(".rpi-attribute-label span")?;
    let value = selector(".rpi-attribute-value span")?;

    let image_url = first_attr(root, &image, "src");
    let mut record = Record {
        query_code: code.to_string(),
        title: first_text(root, &title),
        thumbnail_url: image_url.clone(),
        thumbnail_url_small: image_url,
        description: first_text(root, &description),
        ..Default::default()
    };

    for item in root.select(&info_items) {
        let (Some(key), Some(text)) = (first_text(item, &label), first_text(item, &value)) else {
            continue;
        };

        match key.as_str() {
            "Print length" => record.page_count = parse_page_count(&text),
            "Language" => record.language = Some(text),
            "Publisher" => record.publishers = Some(vec![text]),
            "Publication date" => record.published_date = Some(text),
            _ => {}
        }
    }

    Ok(record)
}

fn absolute_url(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("{}{}", AMAZON_BASE_URL, link)
    }
}

/// First run of digits, e.g. "412 pages" → 412
fn parse_page_count(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <div class="s-main-slot">
          <div class="s-result-item"><h2><a class="a-link-normal s-link" href="/Dune-Frank-Herbert/dp/0441013597/ref=sr_1_1">Dune</a></h2></div>
          <div class="s-result-item"><a class="a-link-normal" href="/Dune-Messiah/dp/0593098234">Dune Messiah</a></div>
        </div>
    "#;

    const PRODUCT_PAGE: &str = r#"
        <html><body>
          <span id="productTitle">  Dune  </span>
          <div id="main-image-container"><div class="imgTagWrapper"><img src="https://m.media-amazon.com/images/I/dune.jpg"></div></div>
          <div id="bookDescription_feature_div">
            <span class="a-expander-prompt">Read more</span>
            <span>Set on the desert planet Arrakis.</span>
          </div>
          <div id="rich_product_information"><ol>
            <li><div class="rpi-attribute-label"><span>Print length</span></div><div class="rpi-attribute-value"><span>896 pages</span></div></li>
            <li><div class="rpi-attribute-label"><span>Language</span></div><div class="rpi-attribute-value"><span>English</span></div></li>
            <li><div class="rpi-attribute-label"><span>Publisher</span></div><div class="rpi-attribute-value"><span>Ace</span></div></li>
            <li><div class="rpi-attribute-label"><span>Publication date</span></div><div class="rpi-attribute-value"><span>August 2, 2005</span></div></li>
            <li><div class="rpi-attribute-label"><span>Dimensions</span></div><div class="rpi-attribute-value"><span>4.19 x 1.4 x 7.5 inches</span></div></li>
          </ol></div>
        </body></html>
    "#;

    #[test]
    fn test_first_search_result_link() {
        let link = parse_search_page(SEARCH_PAGE).unwrap();
        assert_eq!(link.as_deref(), Some("/Dune-Frank-Herbert/dp/0441013597/ref=sr_1_1"));
    }

    #[test]
    fn test_search_without_results() {
        assert_eq!(parse_search_page("<html><body></body></html>").unwrap(), None);
    }

    #[test]
    fn test_parse_product_page() {
        let record = parse_product_page("0441013597", PRODUCT_PAGE).unwrap();

        assert_eq!(record.title.as_deref(), Some("Dune"));
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/dune.jpg")
        );
        assert_eq!(record.thumbnail_url_small, record.thumbnail_url);
        assert_eq!(record.description.as_deref(), Some("Set on the desert planet Arrakis."));
        assert_eq!(record.page_count, Some(896));
        assert_eq!(record.language.as_deref(), Some("English"));
        assert_eq!(record.publishers, Some(vec!["Ace".to_string()]));
        assert_eq!(record.published_date.as_deref(), Some("August 2, 2005"));
    }

    #[test]
    fn test_page_count_parsing() {
        assert_eq!(parse_page_count("412 pages"), Some(412));
        assert_eq!(parse_page_count("Approx. 96 pp"), Some(96));
        assert_eq!(parse_page_count("unknown"), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("/dp/1"), "https://www.amazon.com/dp/1");
        assert_eq!(absolute_url("https://example.com/x"), "https://example.com/x");
    }
}
