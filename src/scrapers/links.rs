//! PDF link discovery and URL resolution.

use scraper::{Html, Selector};
use url::Url;

use crate::error::{HarvestError, Result};

/// Name used when a link carries no text.
pub const UNTITLED: &str = "Untitled";

/// A PDF link as it appears on an issue listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLink {
    pub href: String,
    pub text: String,
}

/// True when the href's path ends in `.pdf`, ignoring case, query and fragment.
pub fn is_pdf_href(href: &str) -> bool {
    let path = href.split(['#', '?']).next().unwrap_or("");
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Collect every anchor pointing at a PDF, in document order.
pub fn extract_pdf_links(html: &str) -> Vec<PdfLink> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if !is_pdf_href(href) {
                return None;
            }
            let text = a.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            Some(PdfLink {
                href: href.to_string(),
                text: if text.is_empty() {
                    UNTITLED.to_string()
                } else {
                    text
                },
            })
        })
        .collect()
}

/// Origin (`scheme://host[:port]`) of a URL, if it parses.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Turn a link href into an absolute URL.
///
/// Absolute http(s) links are kept, protocol-relative ones take the base's
/// scheme, and anything else is appended to `base` with exactly one slash
/// in between.
pub fn resolve_url(href: &str, base: &str) -> Result<String> {
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(href.to_string());
    }

    let base_url = Url::parse(base)
        .map_err(|e| HarvestError::Parse(format!("Invalid base URL '{}': {}", base, e)))?;

    if let Some(rest) = href.strip_prefix("//") {
        return Ok(format!("{}://{}", base_url.scheme(), rest));
    }

    Ok(format!(
        "{}/{}",
        base_url.as_str().trim_end_matches('/'),
        href.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://www.itda.gov.eg";

    #[test]
    fn test_is_pdf_href() {
        assert!(is_pdf_href("/docs/a.pdf"));
        assert!(is_pdf_href("A.PDF"));
        assert!(is_pdf_href("a.pdf?download=1"));
        assert!(is_pdf_href("a.pdf#page=2"));
        assert!(!is_pdf_href("a.pdf.html"));
        assert!(!is_pdf_href("/list.aspx?file=a.pdf"));
    }

    #[test]
    fn test_extract_pdf_links_in_order() {
        let html = r#"
            <html><body>
              <a href="/docs/one.pdf">  Issue
                 One </a>
              <a href="/index.aspx">Home</a>
              <a href="docs/two.PDF"><img src="x.png"></a>
              <a>no href</a>
              <a href="https://cdn.example.com/three.pdf?x=1">Three</a>
            </body></html>
        "#;

        let links = extract_pdf_links(html);
        assert_eq!(
            links,
            vec![
                PdfLink {
                    href: "/docs/one.pdf".into(),
                    text: "Issue One".into()
                },
                PdfLink {
                    href: "docs/two.PDF".into(),
                    text: UNTITLED.into()
                },
                PdfLink {
                    href: "https://cdn.example.com/three.pdf?x=1".into(),
                    text: "Three".into()
                },
            ]
        );
    }

    #[test]
    fn test_resolve_relative_links() {
        assert_eq!(
            resolve_url("/docs/a.pdf", BASE).unwrap(),
            "http://www.itda.gov.eg/docs/a.pdf"
        );
        assert_eq!(
            resolve_url("docs/a.pdf", BASE).unwrap(),
            "http://www.itda.gov.eg/docs/a.pdf"
        );
        assert_eq!(
            resolve_url("docs/a.pdf", "http://www.itda.gov.eg/").unwrap(),
            "http://www.itda.gov.eg/docs/a.pdf"
        );
    }

    #[test]
    fn test_resolve_absolute_and_protocol_relative() {
        assert_eq!(
            resolve_url("https://other.org/x.pdf", BASE).unwrap(),
            "https://other.org/x.pdf"
        );
        assert_eq!(
            resolve_url("//cdn.gov.eg/x.pdf", "https://www.itda.gov.eg").unwrap(),
            "https://cdn.gov.eg/x.pdf"
        );
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("http://www.itda.gov.eg/jurnal-sgl.aspx?x=1").as_deref(),
            Some("http://www.itda.gov.eg")
        );
        assert_eq!(
            origin_of("http://127.0.0.1:8080/list").as_deref(),
            Some("http://127.0.0.1:8080")
        );
        assert_eq!(origin_of("not a url"), None);
    }
}
