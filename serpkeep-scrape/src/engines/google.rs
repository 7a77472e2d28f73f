//! Google search engine: primary engine with two extraction strategies.
//!
//! Google's markup changes often and varies by client, so extraction is
//! layered. Known result containers are tried first; when they produce
//! nothing, every heading-bearing link on the page is scanned instead.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::engine::Engine;
use crate::error::ExtractError;
use crate::extract::{
    closest, decode, parent_element, selector, stripped_text, truncate_chars,
    truncate_with_ellipsis,
};
use crate::types::{SearchEngine, SearchResult};
use crate::url_clean::clean_url;

/// Google returns at most this many results per page.
const MAX_PAGE_RESULTS: usize = 100;

/// Container selectors, tried in order until one matches anything.
const CONTAINER_SELECTORS: &[&str] = &["div.g", "div.tF2Cxc"];

/// Snippet selectors, most current first.
const SNIPPET_SELECTORS: &[&str] = &[".VwiC3b", ".s3v9rd", ".st", r#"[data-sncf="1"]"#];

/// A text block must be longer than this to count as a fallback snippet.
const MIN_FALLBACK_SNIPPET_CHARS: usize = 50;

/// Fallback and alternative-extraction snippets are cut to this length.
const MAX_SNIPPET_CHARS: usize = 300;

/// Google HTML search scraper.
pub struct GoogleEngine {
    base: Url,
    language: String,
    country: String,
}

impl GoogleEngine {
    /// Create an engine talking to `base` (normally `https://www.google.com`).
    pub fn new(base: Url, language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            base,
            language: language.into(),
            country: country.into(),
        }
    }
}

impl Engine for GoogleEngine {
    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Google
    }

    fn search_url(&self, query: &str, max_results: usize) -> String {
        let mut url = self.base.clone();
        url.set_path("/search");
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("num", &max_results.min(MAX_PAGE_RESULTS).to_string())
            .append_pair("hl", &self.language)
            .append_pair("gl", &self.country)
            .append_pair("start", "0");
        url.into()
    }

    fn extract(&self, markup: &[u8], max_results: usize) -> Vec<SearchResult> {
        match parse_google_html(&decode(markup), max_results, &self.base) {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(error = %err, "Google extraction failed");
                Vec::new()
            }
        }
    }
}

/// Compiled selectors for one extraction pass.
struct GoogleSelectors {
    containers: Vec<Selector>,
    snippets: Vec<Selector>,
    heading: Selector,
    link: Selector,
    link_with_href: Selector,
    div: Selector,
    breadcrumb: Selector,
    result_block: Selector,
}

impl GoogleSelectors {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            containers: CONTAINER_SELECTORS
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_, _>>()?,
            snippets: SNIPPET_SELECTORS
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_, _>>()?,
            heading: selector("h3")?,
            link: selector("a")?,
            link_with_href: selector("a[href]")?,
            div: selector("div")?,
            breadcrumb: selector("cite, .UdQCqe")?,
            result_block: selector("div.g")?,
        })
    }
}

/// Parse a Google results page.
pub(crate) fn parse_google_html(
    html: &str,
    max_results: usize,
    base: &Url,
) -> Result<Vec<SearchResult>, ExtractError> {
    let document = Html::parse_document(html);
    let sel = GoogleSelectors::compile()?;

    let containers: Vec<ElementRef<'_>> = sel
        .containers
        .iter()
        .map(|container| document.select(container).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let mut results: Vec<SearchResult> = containers
        .into_iter()
        .take(max_results)
        .filter_map(|container| extract_container(container, &sel, base))
        .collect();

    if results.is_empty() {
        tracing::debug!("no Google containers matched, scanning result links");
        results = extract_from_links(&document, &sel, max_results, base);
    }

    tracing::debug!(count = results.len(), "Google results parsed");
    Ok(results)
}

/// Pull one result out of a container. Containers missing a title or a
/// URL are skipped.
fn extract_container(
    container: ElementRef<'_>,
    sel: &GoogleSelectors,
    base: &Url,
) -> Option<SearchResult> {
    let title_el = container
        .select(&sel.heading)
        .next()
        .or_else(|| container.select(&sel.link).next())?;

    let title = stripped_text(title_el);
    let link_el = closest(title_el, &sel.link).unwrap_or(title_el);
    let url = link_el
        .value()
        .attr("href")
        .map(|href| clean_url(href, base))
        .unwrap_or_default();

    if title.is_empty() || url.is_empty() {
        return None;
    }

    let mut snippet = sel
        .snippets
        .iter()
        .find_map(|snippet_sel| container.select(snippet_sel).next())
        .map(stripped_text)
        .unwrap_or_default();
    if snippet.is_empty() {
        snippet = fallback_snippet(container, sel);
    }

    let display_url = container
        .select(&sel.breadcrumb)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| url.clone());

    Some(SearchResult {
        title,
        url,
        snippet,
        display_url,
        engine: SearchEngine::Google.name().to_string(),
    })
}

/// First descendant block long enough to be prose rather than chrome.
fn fallback_snippet(container: ElementRef<'_>, sel: &GoogleSelectors) -> String {
    container
        .select(&sel.div)
        .map(stripped_text)
        .find(|text| {
            text.chars().count() > MIN_FALLBACK_SNIPPET_CHARS && !text.starts_with("http")
        })
        .map(|text| truncate_with_ellipsis(&text, MAX_SNIPPET_CHARS))
        .unwrap_or_default()
}

/// Alternative strategy: every redirect or absolute link wrapping an `h3`.
fn extract_from_links(
    document: &Html,
    sel: &GoogleSelectors,
    max_results: usize,
    base: &Url,
) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if max_results == 0 {
        return results;
    }

    for link in document.select(&sel.link_with_href) {
        let href = link.value().attr("href").unwrap_or_default();
        if !(href.contains("/url?q=") || href.starts_with("http")) {
            continue;
        }
        let Some(heading) = link.select(&sel.heading).next() else {
            continue;
        };

        let title = stripped_text(heading);
        let url = clean_url(href, base);
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let snippet = surrounding_text(link, &title, sel);
        results.push(SearchResult {
            display_url: url.clone(),
            title,
            url,
            snippet,
            engine: SearchEngine::Google.name().to_string(),
        });

        if results.len() >= max_results {
            break;
        }
    }

    results
}

/// Text of the enclosing result block (or the link's parent) after the
/// title, trimmed and cut to [`MAX_SNIPPET_CHARS`].
fn surrounding_text(link: ElementRef<'_>, title: &str, sel: &GoogleSelectors) -> String {
    let Some(block) = closest(link, &sel.result_block).or_else(|| parent_element(link)) else {
        return String::new();
    };
    let text = stripped_text(block);
    let title_chars = title.chars().count();
    if text.chars().count() <= title_chars {
        return String::new();
    }
    let rest: String = text.chars().skip(title_chars).collect();
    truncate_chars(rest.trim(), MAX_SNIPPET_CHARS).to_owned()
}
