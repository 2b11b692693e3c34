//! Rendering helpers behind the search page's template tags.
//!
//! Each function corresponds to one tag of the search tag family
//! (`truncate_and_strip`, `search:form`, `search:query`, `search:initial`,
//! `search:empty`, `search:results`, `search:highlight`). Tag parsing and
//! dispatch belong to the templating engine, not to this module.

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::sync::OnceLock;

use crate::page::SearchPage;
use crate::search::{find_token_matches, query_tokens};

pub const DEFAULT_TRUNCATE_LENGTH: usize = 100;
pub const DEFAULT_HIGHLIGHT_RADIUS: usize = 15;
const OMISSION: &str = "...";

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Remove HTML tags and comments, keeping text and entities as-is.
pub fn strip_tags(html: &str) -> String {
    tag_re().replace_all(html, "").into_owned()
}

fn strip_and_squish(html: &str) -> String {
    whitespace_re()
        .replace_all(&strip_tags(html), " ")
        .into_owned()
}

/// Cut `text` to at most `length` characters, the last three being `...`.
/// Text that already fits is returned unchanged.
pub fn truncate(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let keep = length.saturating_sub(OMISSION.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(OMISSION);
    out
}

/// `<r:truncate_and_strip length="N">`: strip tags, collapse whitespace runs,
/// then truncate.
pub fn truncate_and_strip(content: &str, length: Option<usize>) -> String {
    truncate(
        &strip_and_squish(content),
        length.unwrap_or(DEFAULT_TRUNCATE_LENGTH),
    )
}

/// Attributes of `<r:search:form />`.
#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    /// Label text, `Search:` when unset.
    pub label: Option<String>,
    /// Submit button caption, `Search` when unset.
    pub submit: Option<String>,
    /// Form action; empty posts back to the current page.
    pub url: Option<String>,
    /// Carried to the next request through a hidden field.
    pub exclude_pages: Option<String>,
}

/// `<r:search:form />`
pub fn search_form(options: &FormOptions, query: &str) -> String {
    let label = options.label.as_deref().unwrap_or("Search:");
    let submit = options.submit.as_deref().unwrap_or("Search");
    let url = options.url.as_deref().unwrap_or_default();

    let hidden = match options.exclude_pages.as_deref() {
        Some(exclude) => format!(
            r#"<input type="hidden" name="exclude_pages" value="{}"> "#,
            encode_double_quoted_attribute(exclude)
        ),
        None => String::new(),
    };

    format!(
        concat!(
            r#"<form action="{url}" method="get" id="search_form"><p>"#,
            r#"<label for="q">{label}</label> "#,
            r#"<input type="text" id="q" name="q" value="{query}" size="15" alt="search"> "#,
            r#"{hidden}<input value="{submit}" type="submit"></p></form>"#,
            "\n"
        ),
        url = encode_double_quoted_attribute(url),
        label = encode_text(label),
        query = encode_double_quoted_attribute(query),
        hidden = hidden,
        submit = encode_double_quoted_attribute(submit),
    )
}

/// `<r:search:query />`
pub fn search_query(page: &SearchPage) -> String {
    encode_text(page.query()).into_owned()
}

/// `<r:search:initial>`: no query was given.
pub fn search_initial(page: &SearchPage) -> bool {
    page.query().is_empty()
}

/// `<r:search:empty>`: a query was given but nothing matched.
pub fn search_empty(page: &SearchPage) -> bool {
    !page.query().is_empty() && page.query_result().is_empty()
}

/// `<r:search:results>`
pub fn search_results(page: &SearchPage) -> bool {
    !page.query_result().is_empty()
}

/// Text around the first match, `radius` characters on each side, with
/// `...` marking the cut ends and every fully visible match highlighted.
/// `matches` are char ranges into `text`, left to right.
fn excerpt(text: &str, matches: &[(usize, usize)], radius: usize) -> Option<String> {
    let &(first_start, first_end) = matches.first()?;
    let chars: Vec<char> = text.chars().collect();

    let mut start = first_start.saturating_sub(radius);
    let mut end = (first_end + radius).min(chars.len());
    let cut_head = start > 0;
    let cut_tail = end < chars.len();
    while start < first_start && chars[start].is_whitespace() {
        start += 1;
    }
    while end > first_end && chars[end - 1].is_whitespace() {
        end -= 1;
    }

    let mut out = String::new();
    if cut_head {
        out.push_str(OMISSION);
    }
    let mut pos = start;
    for &(m_start, m_end) in matches {
        if m_start < pos || m_end > end {
            continue;
        }
        out.extend(&chars[pos..m_start]);
        out.push_str(r#"<strong class="highlight">"#);
        out.extend(&chars[m_start..m_end]);
        out.push_str("</strong>");
        pos = m_end;
    }
    out.extend(&chars[pos..end]);
    if cut_tail {
        out.push_str(OMISSION);
    }
    Some(out)
}

/// `<r:search:highlight length="N">`: excerpt of the stripped content around
/// the first query term, with every term highlighted. Terms compare like the
/// search itself, so `cafe` highlights `café`. Falls back to a plain
/// truncation when no term occurs.
pub fn search_highlight(content: &str, query: &str, radius: Option<usize>) -> String {
    let radius = radius.unwrap_or(DEFAULT_HIGHLIGHT_RADIUS);
    let text = strip_and_squish(content);
    let matches = find_token_matches(&text, &query_tokens(query));
    excerpt(&text, &matches, radius).unwrap_or_else(|| truncate(&text, radius * 2))
}

/// The default search page body: form, then the initial, empty, or results
/// block.
pub fn render_results_page(page: &SearchPage, form: &FormOptions) -> String {
    let mut html = search_form(form, page.query());

    if search_initial(page) {
        html.push_str("<p class=\"search-initial\">Enter a search term.</p>\n");
    } else if search_empty(page) {
        html.push_str(&format!(
            "<p class=\"search-empty\">No pages found for <strong>{}</strong>.</p>\n",
            search_query(page)
        ));
    }

    if search_results(page) {
        html.push_str(&format!(
            "<p class=\"search-count\">{} page(s) found for <strong>{}</strong>.</p>\n",
            page.query_result().len(),
            search_query(page)
        ));
        html.push_str("<ol class=\"search-results\">\n");
        for result in page.query_result() {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a><p>{}</p></li>\n",
                encode_double_quoted_attribute(&result.url),
                encode_text(&result.title),
                search_highlight(&result.content(), page.query(), None)
            ));
        }
        html.push_str("</ol>\n");
    }

    html
}
