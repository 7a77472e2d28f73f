//! Bing search engine: fallback with Microsoft's index.
//!
//! Only consulted when Google yields nothing. Extraction is a single
//! container pass with no alternative strategy.

use scraper::{Html, Selector};
use url::Url;

use crate::engine::Engine;
use crate::error::ExtractError;
use crate::extract::{decode, selector, stripped_text};
use crate::types::{SearchEngine, SearchResult};

/// Bing HTML search scraper.
pub struct BingEngine {
    base: Url,
}

impl BingEngine {
    /// Create an engine talking to `base` (normally `https://www.bing.com`).
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl Engine for BingEngine {
    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Bing
    }

    fn search_url(&self, query: &str, max_results: usize) -> String {
        let mut url = self.base.clone();
        url.set_path("/search");
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("count", &max_results.to_string());
        url.into()
    }

    fn extract(&self, markup: &[u8], max_results: usize) -> Vec<SearchResult> {
        match parse_bing_html(&decode(markup), max_results) {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(error = %err, "Bing extraction failed");
                Vec::new()
            }
        }
    }
}

struct BingSelectors {
    container: Selector,
    title: Selector,
    link: Selector,
    paragraph: Selector,
    caption: Selector,
}

impl BingSelectors {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            container: selector("li.b_algo")?,
            title: selector("h2")?,
            link: selector("a")?,
            paragraph: selector("p")?,
            caption: selector("div.b_caption")?,
        })
    }
}

/// Parse a Bing results page.
///
/// Containers without a title link are skipped but still count toward
/// `max_results`.
pub(crate) fn parse_bing_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, ExtractError> {
    let document = Html::parse_document(html);
    let sel = BingSelectors::compile()?;

    let mut results = Vec::new();

    for element in document.select(&sel.container).take(max_results) {
        // Organic results carry their title link inside h2.
        let Some(title_el) = element.select(&sel.title).next() else {
            continue;
        };
        let Some(href) = title_el
            .select(&sel.link)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let title = stripped_text(title_el);
        let url = href.to_string();

        let snippet = element
            .select(&sel.paragraph)
            .next()
            .or_else(|| element.select(&sel.caption).next())
            .map(stripped_text)
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            display_url: url.clone(),
            url,
            snippet,
            engine: SearchEngine::Bing.name().to_string(),
        });
    }

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> BingEngine {
        BingEngine::new(Url::parse("https://www.bing.com").expect("base"))
    }

    const BING_PAGE: &str = r#"<html><body>
<ol id="b_results">
<li class="b_algo">
  <h2><a href="https://tokio.rs/" h="ID=SERP,5071">Tokio - An asynchronous Rust runtime</a></h2>
  <div class="b_caption"><p>Tokio is an event-driven, non-blocking I/O platform.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://docs.rs/tokio/latest/tokio/" h="ID=SERP,5083">tokio - Rust</a></h2>
  <div class="b_caption"><p>A runtime for writing reliable network applications.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://github.com/tokio-rs/tokio" h="ID=SERP,5095">GitHub - tokio-rs/tokio</a></h2>
  <div class="b_caption"><span>A runtime for writing reliable asynchronous applications.</span></div>
</li>
</ol>
</body></html>"#;

    #[test]
    fn algo_blocks_become_results() {
        let results = parse_bing_html(BING_PAGE, 10).expect("parse");
        assert_eq!(results.len(), 3);

        let first = &results[0];
        assert_eq!(first.title, "Tokio - An asynchronous Rust runtime");
        assert_eq!(first.url, "https://tokio.rs/");
        assert_eq!(first.display_url, first.url);
        assert_eq!(first.engine, "Bing");
        assert!(first.snippet.starts_with("Tokio is an event-driven"));

        assert_eq!(results[1].title, "tokio - Rust");
        // No <p>: the caption block itself supplies the snippet.
        assert_eq!(
            results[2].snippet,
            "A runtime for writing reliable asynchronous applications."
        );
    }

    #[test]
    fn stops_at_max_results() {
        let results = parse_bing_html(BING_PAGE, 2).expect("parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].url, "https://docs.rs/tokio/latest/tokio/");
    }

    #[test]
    fn containers_without_title_link_are_skipped() {
        let html = r#"
            <li class="b_algo"><h2>No link in heading</h2></li>
            <li class="b_algo"><div><a href="https://x.com">Link outside heading</a></div></li>
            <li class="b_algo"><h2><a>Anchor without href</a></h2></li>
            <li class="b_algo"><h2><a href="https://ok.com">Valid entry</a></h2></li>"#;
        let results = parse_bing_html(html, 10).expect("parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://ok.com");
        assert_eq!(results[0].snippet, "");
    }

    #[test]
    fn urls_are_not_rewritten() {
        let html = r#"<li class="b_algo"><h2><a href="/ck/a?u=a1aHR0cHM6Ly9leGFtcGxlLmNvbQ">Wrapped link</a></h2></li>"#;
        let results = parse_bing_html(html, 10).expect("parse");
        assert_eq!(results[0].url, "/ck/a?u=a1aHR0cHM6Ly9leGFtcGxlLmNvbQ");
    }

    #[test]
    fn page_without_results_is_empty() {
        let html = r#"<html><body><div class="b_no">No results found.</div></body></html>"#;
        assert!(parse_bing_html(html, 10).expect("parse").is_empty());
    }

    #[test]
    fn malformed_markup_yields_empty() {
        assert!(engine().extract(b"<li class=", 10).is_empty());
        assert!(engine().extract(&[0xc3, 0x28, 0xa0, 0xa1], 10).is_empty());
    }

    #[test]
    fn search_url_has_query_and_count() {
        let url = engine().search_url("rust lang", 15);
        assert_eq!(url, "https://www.bing.com/search?q=rust+lang&count=15");
    }

    #[test]
    fn reports_bing() {
        assert_eq!(engine().engine_type(), SearchEngine::Bing);
    }
}
