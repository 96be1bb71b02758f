use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never shows up on the rendered page.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    /// Visible text, whitespace not yet normalized.
    pub text: String,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedPage;
}

/// Generic extractor for job pages:
/// - pulls `<title>` text if present
/// - collects text below `<body>`, or the whole document when there is none
/// - skips script, style and other non-rendered elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibleTextExtractor;

impl Extractor for VisibleTextExtractor {
    fn extract(&self, html: &str) -> ExtractedPage {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse("title").ok();
        let body_sel = Selector::parse("body").ok();

        let title = title_sel
            .as_ref()
            .and_then(|sel| doc.select(sel).next())
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let root = body_sel
            .as_ref()
            .and_then(|sel| doc.select(sel).next())
            .unwrap_or_else(|| doc.root_element());

        let mut text = String::new();
        collect_text(*root, &mut text);

        ExtractedPage { title, text }
    }
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(_) => {
            let hidden = ElementRef::wrap(node)
                .map(|el| {
                    let name = el.value().name();
                    HIDDEN_ELEMENTS.iter().any(|h| h.eq_ignore_ascii_case(name))
                })
                .unwrap_or(false);
            if !hidden {
                for child in node.children() {
                    collect_text(child, out);
                }
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}
