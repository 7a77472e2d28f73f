//! Server-rendered HTML.
//!
//! Every interpolated value goes through `html_escape`; path segments are
//! additionally percent-encoded.

use std::fmt::Write as _;

use axum::http::StatusCode;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::records::SearchRecord;
use crate::service::{Banner, HistoryView, SearchOutcome};
use crate::storage::StoredArtifact;
use crate::text::truncate_chars;

/// Error text in banners and error pages is cut to this many characters.
const MAX_ERROR_CHARS: usize = 100;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
nav a { margin-right: 1rem; }
.banner { padding: .6rem 1rem; margin: .5rem 0; border-radius: 4px; }
.banner.info { background: #e7f1ff; }
.banner.success { background: #e6f6ea; }
.banner.warning { background: #fff6dd; }
.banner.error { background: #fde8e8; }
.result { margin: 1.2rem 0; }
.result .display { color: #1a7f37; font-size: .9rem; }
.result .engine { color: #777; font-size: .8rem; }
table { border-collapse: collapse; width: 100%; }
td, th { text-align: left; padding: .3rem .5rem; border-bottom: 1px solid #eee; }
#suggestions li { font-size: .9rem; }
"#;

const SUGGEST_SCRIPT: &str = r#"
<script>
(function () {
  const input = document.getElementById('query');
  const list = document.getElementById('suggestions');
  let timer;
  input.addEventListener('input', function () {
    clearTimeout(timer);
    const q = input.value.trim();
    if (q.length < 3) { list.innerHTML = ''; return; }
    timer = setTimeout(async function () {
      const resp = await fetch('/ajax-search?q=' + encodeURIComponent(q));
      const data = await resp.json();
      list.innerHTML = '';
      if (!data.success) { return; }
      for (const r of data.results) {
        const li = document.createElement('li');
        const a = document.createElement('a');
        a.href = r.url;
        a.textContent = r.title;
        li.appendChild(a);
        list.appendChild(li);
      }
    }, 600);
  });
})();
</script>
"#;

/// Cut an error message for display.
pub(super) fn short_error(message: &str) -> String {
    truncate_chars(message, MAX_ERROR_CHARS).to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · serpkeep</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Search</a><a href="/history">History</a></nav>
{body}
</body>
</html>
"#,
        title = text(title),
    )
}

fn banners_html(banners: &[Banner]) -> String {
    let mut html = String::new();
    for banner in banners {
        let _ = writeln!(
            html,
            r#"<div class="banner {}">{}</div>"#,
            banner.level.as_str(),
            text(&banner.message)
        );
    }
    html
}

fn search_form(value: &str) -> String {
    format!(
        r#"<form method="post" action="/">
<input id="query" name="query" type="text" maxlength="200" required placeholder="Enter your search query..." value="{}" autocomplete="off">
<button type="submit">Search</button>
</form>
<ul id="suggestions"></ul>
{SUGGEST_SCRIPT}"#,
        attr(value)
    )
}

fn download_href(filename: &str) -> String {
    format!("/download/{}", urlencoding::encode(filename))
}

fn records_table(records: &[SearchRecord]) -> String {
    if records.is_empty() {
        return "<p>No searches yet.</p>\n".to_string();
    }
    let mut html = String::from(
        "<table>\n<tr><th>Query</th><th>When</th><th>Results</th><th>File</th></tr>\n",
    );
    for record in records {
        let _ = writeln!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><a href="{}">{}</a></td></tr>"#,
            text(&record.query),
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            record.result_count,
            attr(&download_href(&record.artifact_key)),
            text(&record.artifact_key),
        );
    }
    html.push_str("</table>\n");
    html
}

fn files_table(files: &[StoredArtifact]) -> String {
    if files.is_empty() {
        return "<p>No stored files.</p>\n".to_string();
    }
    let mut html = String::from(
        "<table>\n<tr><th>File</th><th>Modified</th><th>Size</th><th></th></tr>\n",
    );
    for file in files {
        let _ = writeln!(
            html,
            r#"<tr><td><a href="{href}">{name}</a></td><td>{modified}</td><td>{size} B</td><td><form method="post" action="{delete}"><button type="submit">Delete</button></form></td></tr>"#,
            href = attr(&download_href(&file.filename)),
            name = text(&file.filename),
            modified = file.last_modified.format("%Y-%m-%d %H:%M:%S UTC"),
            size = file.size,
            delete = attr(&format!("/delete/{}", urlencoding::encode(&file.filename))),
        );
    }
    html.push_str("</table>\n");
    html
}

/// The search page.
pub(super) fn index_page(recent: &[SearchRecord], banners: &[Banner]) -> String {
    let body = format!(
        "<h1>Web search</h1>\n{}{}<h2>Recent searches</h2>\n{}",
        banners_html(banners),
        search_form(""),
        records_table(recent),
    );
    layout("Search", &body)
}

/// Results of one search.
pub(super) fn results_page(outcome: &SearchOutcome) -> String {
    let mut body = format!(
        "<h1>Results for \u{201c}{}\u{201d}</h1>\n{}{}",
        text(&outcome.query),
        banners_html(&outcome.banners),
        search_form(&outcome.query),
    );

    if let Some(artifact) = &outcome.artifact {
        let _ = writeln!(
            body,
            r#"<p>Saved as <a href="{}">{}</a></p>"#,
            attr(&download_href(artifact)),
            text(artifact)
        );
    }

    for result in &outcome.results {
        let _ = writeln!(
            body,
            r#"<div class="result"><a href="{url}">{title}</a><div class="display">{display}</div><div>{snippet}</div><div class="engine">{engine}</div></div>"#,
            url = attr(&result.url),
            title = text(&result.title),
            display = text(&result.display_url),
            snippet = text(&result.snippet),
            engine = text(&result.engine),
        );
    }

    layout(&outcome.query, &body)
}

/// Search history and storage listing.
pub(super) fn history_page(view: &HistoryView, banners: &[Banner]) -> String {
    let body = format!(
        "<h1>Search history</h1>\n{}{}<h2>Stored files</h2>\n{}",
        banners_html(banners),
        records_table(&view.records),
        files_table(&view.files),
    );
    layout("History", &body)
}

/// A plain error page; the message is cut before display.
pub(super) fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<div class=\"banner error\">{}</div>\n",
        status,
        text(&short_error(message))
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serpkeep_scrape::SearchResult;

    fn record(query: &str, key: &str) -> SearchRecord {
        SearchRecord {
            id: 1,
            query: query.to_string(),
            timestamp: Utc
                .with_ymd_and_hms(2026, 10, 19, 14, 3, 22)
                .single()
                .expect("valid"),
            artifact_key: key.to_string(),
            result_count: 3,
        }
    }

    #[test]
    fn query_text_is_escaped() {
        let html = index_page(&[record("<script>alert(1)</script>", "a.txt")], &[]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn banners_render_with_level_class() {
        let html = index_page(&[], &[Banner::warning("Careful & slow")]);
        assert!(html.contains(r#"<div class="banner warning">Careful &amp; slow</div>"#));
    }

    #[test]
    fn results_page_links_artifact_and_results() {
        let outcome = SearchOutcome {
            query: "rust \"quoted\"".into(),
            results: vec![SearchResult {
                title: "Rust Language".into(),
                url: "https://www.rust-lang.org/?a=1&b=2".into(),
                snippet: "Fast <and> safe".into(),
                display_url: "rust-lang.org".into(),
                engine: "Google".into(),
            }],
            artifact: Some("search_20261019_140322_rust.txt".into()),
            record: None,
            banners: vec![],
        };
        let html = results_page(&outcome);
        assert!(html.contains(r#"href="/download/search_20261019_140322_rust.txt""#));
        assert!(html.contains("https://www.rust-lang.org/?a=1&amp;b=2"));
        assert!(html.contains("Fast &lt;and&gt; safe"));
        assert!(html.contains(r#"value="rust &quot;quoted&quot;""#));
    }

    #[test]
    fn history_page_has_delete_forms() {
        let view = HistoryView {
            records: vec![record("rust", "a b.txt")],
            files: vec![StoredArtifact {
                key: "search_results/a b.txt".into(),
                filename: "a b.txt".into(),
                last_modified: Utc
                    .with_ymd_and_hms(2026, 10, 19, 14, 3, 22)
                    .single()
                    .expect("valid"),
                size: 42,
            }],
        };
        let html = history_page(&view, &[]);
        assert!(html.contains(r#"action="/delete/a%20b.txt""#));
        assert!(html.contains(r#"href="/download/a%20b.txt""#));
        assert!(html.contains("42 B"));
        assert!(html.contains("2026-10-19 14:03:22 UTC"));
    }

    #[test]
    fn empty_history_says_so() {
        let html = history_page(
            &HistoryView {
                records: vec![],
                files: vec![],
            },
            &[],
        );
        assert!(html.contains("No searches yet."));
        assert!(html.contains("No stored files."));
    }

    #[test]
    fn error_messages_are_cut() {
        assert_eq!(short_error(&"x".repeat(150)).len(), 100);
        let html = error_page(StatusCode::NOT_FOUND, "artifact not found: a.txt");
        assert!(html.contains("404 Not Found"));
    }
}
