//! Visible-text reduction.
//!
//! Pure functions, no network. Raw HTML is reduced to visible text
//! before it is submitted to the extraction service, both to cut the
//! payload size and to keep markup artifacts out of the extracted
//! text.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// Elements whose subtrees never contribute visible text.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "nav", "header", "footer", "aside",
];

/// Content-region selectors, most specific first.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
    ".post-content",
    ".entry-content",
];

/// Reduce an HTML document to its visible text.
///
/// Prefers a main-content region when one exists, falls back to
/// `body`, and strips script/style/nav/header/footer/aside subtrees.
/// All whitespace runs are collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in MAIN_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(region) = document.select(&selector).next() {
                return collect(*region);
            }
        }
    }

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return collect(*body);
        }
    }

    collect(document.tree.root())
}

/// Reduce HTML to visible text capped at `max_bytes`, respecting
/// character boundaries.
pub fn visible_text_capped(html: &str, max_bytes: usize) -> String {
    let text = visible_text(html);
    openai_client::truncate_to_char_boundary(&text, max_bytes).to_string()
}

fn collect(node: NodeRef<'_, Node>) -> String {
    let mut buf = String::new();
    collect_into(node, &mut buf);
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_into(node: NodeRef<'_, Node>, buf: &mut String) {
    match node.value() {
        Node::Text(text) => {
            buf.push_str(&text);
            buf.push(' ');
        }
        Node::Element(element) => {
            if SKIP_TAGS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_into(child, buf);
            }
        }
        _ => {
            for child in node.children() {
                collect_into(child, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_and_style() {
        let html = r#"<html><body>
            <script>var x = 1;</script>
            <style>.a { color: red; }</style>
            <p>Visible text</p>
        </body></html>"#;
        let text = visible_text(html);
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn test_prefers_main_content_region() {
        let html = r#"<html><body>
            <nav>Navigation links</nav>
            <main><p>The actual article</p></main>
            <footer>Copyright</footer>
        </body></html>"#;
        let text = visible_text(html);
        assert_eq!(text, "The actual article");
    }

    #[test]
    fn test_strips_boilerplate_without_main_region() {
        let html = r#"<html><body>
            <header>Site title</header>
            <nav>Menu</nav>
            <p>Event listing for Saturday</p>
            <aside>Related</aside>
            <footer>Copyright</footer>
        </body></html>"#;
        let text = visible_text(html);
        assert_eq!(text, "Event listing for Saturday");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<body><p>one</p>\n\n   <p>two\n three</p></body>";
        assert_eq!(visible_text(html), "one two three");
    }

    #[test]
    fn test_cap_respects_char_boundary() {
        let html = "<body>日本語のテキスト</body>";
        let capped = visible_text_capped(html, 7);
        assert!(capped.len() <= 7);
        assert!("日本語のテキスト".starts_with(&capped));
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(visible_text("no markup at all"), "no markup at all");
    }
}
