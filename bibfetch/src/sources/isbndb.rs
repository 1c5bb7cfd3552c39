//! isbndb.com Source (scraped)
//!
//! Reads the public book page. Only a few fields are reliable there: the
//! artwork image, the title, both ISBNs and the author links. The remaining
//! rows are randomized placeholders served to scrapers and are ignored, as is
//! any value starting with "Random".

use super::html::{element_text, first_attr, first_text, selector};
use super::http;
use crate::isbn::strip_separators;
use crate::types::{FetchOptions, Record, SourceAdapter, SourceError, SourceId};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};

/// isbndb.com book page URL
const ISBNDB_BOOK_URL: &str = "https://isbndb.com/book";

/// Placeholder marker used by isbndb for obfuscated values
const PLACEHOLDER_PREFIX: &str = "Random";

/// isbndb.com Source
pub struct IsbnDbSource {
    http_client: Client,
}

impl IsbnDbSource {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl SourceAdapter for IsbnDbSource {
    fn id(&self) -> SourceId {
        SourceId::IsbnDb
    }

    async fn fetch(&self, code: &str, options: &FetchOptions) -> Result<Record, SourceError> {
        let url = format!("{}/{}", ISBNDB_BOOK_URL, strip_separators(code));
        let page = http::get_text(&self.http_client, &url, options).await?;
        parse_book_page(code, &page)
    }
}

/// Extract a record from an isbndb book page
pub fn parse_book_page(code: &str, page: &str) -> Result<Record, SourceError> {
    let document = Html::parse_document(page);
    let root = document.root_element();

    let artwork = selector(".artwork object")?;
    let book_table = selector(".book-table")?;
    let heading = selector("h1")?;
    let row = selector("tr")?;
    let header_cell = selector("th")?;
    let data_cell = selector("td")?;
    let link = selector("a")?;

    let image = first_attr(root, &artwork, "data");
    let mut record = Record {
        query_code: code.to_string(),
        thumbnail_url: image.clone(),
        thumbnail_url_small: image,
        ..Default::default()
    };

    let Some(table) = root.select(&book_table).next() else {
        return Ok(record);
    };
    record.title = first_text(table, &heading);

    for tr in table.select(&row) {
        let (Some(th), Some(td)) = (first_text(tr, &header_cell), tr.select(&data_cell).next())
        else {
            continue;
        };

        match th.as_str() {
            "ISBN:" => record.isbn10 = cell_text(td),
            "ISBN13:" => record.isbn13 = cell_text(td),
            "Authors:" => {
                let names: Vec<String> = td.select(&link).filter_map(cell_text).collect();
                record.authors = (!names.is_empty()).then_some(names);
            }
            _ => {}
        }
    }

    Ok(record)
}

/// Element text with placeholder values treated as absent
fn cell_text(element: ElementRef<'_>) -> Option<String> {
    element_text(element).filter(|text| !text.starts_with(PLACEHOLDER_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK_PAGE: &str = r#"
        <html><body>
          <div class="artwork"><object data="https://images.isbndb.com/covers/35/93/9780441013593.jpg"></object></div>
          <div class="book-table">
            <h1> Dune </h1>
            <table>
              <tr><th>Full Title:</th><td>Random Title 123</td></tr>
              <tr><th>ISBN:</th><td>0441013597</td></tr>
              <tr><th>ISBN13:</th><td> 9780441013593 </td></tr>
              <tr><th>Authors:</th><td><a href="/a/1">Frank Herbert</a>, <a href="/a/2">Random Author</a></td></tr>
              <tr><th>Publisher:</th><td>Random Publisher</td></tr>
            </table>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_book_page() {
        let record = parse_book_page("978-0441013593", BOOK_PAGE).unwrap();

        assert_eq!(record.query_code, "978-0441013593");
        assert_eq!(record.title.as_deref(), Some("Dune"));
        assert_eq!(record.isbn10.as_deref(), Some("0441013597"));
        assert_eq!(record.isbn13.as_deref(), Some("9780441013593"));
        assert_eq!(record.authors, Some(vec!["Frank Herbert".to_string()]));
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some("https://images.isbndb.com/covers/35/93/9780441013593.jpg")
        );
        assert_eq!(record.thumbnail_url, record.thumbnail_url_small);
        assert_eq!(record.publishers, None);
    }

    #[test]
    fn test_placeholder_values_are_absent() {
        let page = r#"<div class="book-table"><table>
            <tr><th>ISBN:</th><td>Random ISBN</td></tr>
            <tr><th>Authors:</th><td><a>Random Name</a></td></tr>
        </table></div>"#;
        let record = parse_book_page("1", page).unwrap();
        assert_eq!(record.isbn10, None);
        assert_eq!(record.authors, None);
    }

    #[test]
    fn test_page_without_book_table() {
        let record = parse_book_page("1", "<html><body><p>Not found</p></body></html>").unwrap();
        assert!(record.is_blank());
        assert_eq!(record.query_code, "1");
    }
}
