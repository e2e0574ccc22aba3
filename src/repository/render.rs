//! Turns assembled page content into a self-contained report page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::RepositoryError;

static TABLE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<table\b").unwrap());
static TABLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</table\s*>").unwrap());

/// Resource prefixes used by the backing store and the report layout they map
/// to. Applied in order.
const PATH_REWRITES: [(&str, &str); 3] = [
    ("href=\"/files/css/", "href=\""),
    ("/files/javascript/", ""),
    ("/files/images/", "images/"),
];

/// Rewrites embedded resource references so they point at the sink's
/// relative asset layout.
pub fn rewrite_resource_paths(html: &str) -> String {
    PATH_REWRITES
        .iter()
        .fold(html.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Checks that a page spliced around a test body leaves no table open.
pub fn check_balanced_tables(owner: &str, page: &str, content: &str) -> Result<(), RepositoryError> {
    let opened = TABLE_OPEN.find_iter(content).count();
    let closed = TABLE_CLOSE.find_iter(content).count();
    if opened != closed {
        return Err(RepositoryError::ContentFormat {
            name: owner.to_string(),
            message: format!(
                "included page '{page}' has {opened} opening and {closed} closing table tags"
            ),
        });
    }
    Ok(())
}

/// Wraps content in the report page template and rewrites resource paths.
pub fn render_page(title: &str, body: &str) -> String {
    let title = escape_html(title);
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title}</title>\n\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"/files/css/fitnesse.css\" media=\"screen\"/>\n\
         <script src=\"/files/javascript/fitnesse.js\" type=\"text/javascript\"></script>\n\
         </head>\n<body>\n<div class=\"header\"><h1>{title}</h1></div>\n\
         <div class=\"main\">\n{body}\n</div>\n</body>\n</html>\n"
    );
    rewrite_resource_paths(&html)
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
