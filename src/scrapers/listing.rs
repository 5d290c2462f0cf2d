//! Strategies for obtaining the listing page of a single issue.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::catalog::find_widget;
use super::HttpClient;
use crate::error::{HarvestError, Result};

/// Resolves an issue token to the HTML of the page listing its PDFs.
#[async_trait]
pub trait IssueListing: Send + Sync {
    async fn fetch_listing(&self, token: &str) -> Result<String>;
}

/// A form ready to be posted back to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostbackForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl PostbackForm {
    fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Parse(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Build the postback that selects `token` in the widget.
///
/// Carries over the state fields of the widget's form (`__VIEWSTATE`,
/// `__EVENTVALIDATION` and friends) along with the other controls' current
/// values, then points `__EVENTTARGET` at the widget the way its
/// `onchange` handler would.
pub fn build_postback(html: &str, page_url: &str, widget_id: &str, token: &str) -> Result<PostbackForm> {
    let document = Html::parse_document(html);
    let widget = find_widget(&document, widget_id)?;
    let widget_name = widget.value().attr("name").unwrap_or(widget_id).to_string();

    let form = widget
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "form");
    let scope = form.unwrap_or_else(|| document.root_element());

    let page = Url::parse(page_url)
        .map_err(|e| HarvestError::Parse(format!("Invalid page URL '{}': {}", page_url, e)))?;
    let action = match form.and_then(|f| f.value().attr("action")).map(str::trim) {
        Some(action) if !action.is_empty() => page
            .join(action)
            .map_err(|e| HarvestError::Parse(format!("Invalid form action '{}': {}", action, e)))?
            .to_string(),
        _ => page.to_string(),
    };

    let mut postback = PostbackForm {
        action,
        fields: Vec::new(),
    };

    for input in scope.select(&selector("input[name]")?) {
        let el = input.value();
        let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
        let include = match kind.as_str() {
            "submit" | "button" | "image" | "reset" | "file" => false,
            "checkbox" | "radio" => el.attr("checked").is_some(),
            _ => true,
        };
        if let (true, Some(name)) = (include, el.attr("name")) {
            postback.set(name, el.attr("value").unwrap_or(""));
        }
    }

    let option_selector = selector("option")?;
    for select in scope.select(&selector("select[name]")?) {
        let Some(name) = select.value().attr("name") else {
            continue;
        };
        if name == widget_name {
            continue;
        }
        let mut options = select.select(&option_selector);
        let chosen = select
            .select(&option_selector)
            .find(|o| o.value().attr("selected").is_some())
            .or_else(|| options.next());
        if let Some(opt) = chosen {
            let text = opt.text().collect::<String>();
            postback.set(name, opt.value().attr("value").unwrap_or(text.trim()));
        }
    }

    postback.set("__EVENTTARGET", &widget_name);
    postback.set("__EVENTARGUMENT", "");
    postback.set(&widget_name, token);

    Ok(postback)
}

/// Re-posts the source page's form with the widget set to the token.
pub struct FormPostbackListing {
    client: HttpClient,
    source_url: String,
    widget_id: String,
}

impl FormPostbackListing {
    pub fn new(client: HttpClient, source_url: &str, widget_id: &str) -> Self {
        Self {
            client,
            source_url: source_url.to_string(),
            widget_id: widget_id.to_string(),
        }
    }
}

#[async_trait]
impl IssueListing for FormPostbackListing {
    async fn fetch_listing(&self, token: &str) -> Result<String> {
        let page = self.client.get_text(&self.source_url).await?;
        let postback = build_postback(&page, &self.source_url, &self.widget_id, token)?;
        tracing::debug!(
            "Posting back {} fields to {} for issue {}",
            postback.fields.len(),
            postback.action,
            token
        );
        self.client.post_form(&postback.action, &postback.fields).await
    }
}

/// Fills `{token}` into a URL template.
pub struct UrlTemplateListing {
    client: HttpClient,
    template: String,
}

impl UrlTemplateListing {
    pub fn new(client: HttpClient, template: &str) -> Self {
        Self {
            client,
            template: template.to_string(),
        }
    }

    pub fn listing_url(&self, token: &str) -> String {
        self.template.replace("{token}", &urlencoding::encode(token))
    }
}

#[async_trait]
impl IssueListing for UrlTemplateListing {
    async fn fetch_listing(&self, token: &str) -> Result<String> {
        self.client.get_text(&self.listing_url(token)).await
    }
}

/// Drives the widget in headless Chromium and returns the rendered page.
#[cfg(feature = "browser")]
pub struct BrowserListing {
    renderer: super::browser::BrowserRenderer,
    source_url: String,
    widget_id: String,
}

#[cfg(feature = "browser")]
impl BrowserListing {
    pub fn new(renderer: super::browser::BrowserRenderer, source_url: &str, widget_id: &str) -> Self {
        Self {
            renderer,
            source_url: source_url.to_string(),
            widget_id: widget_id.to_string(),
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl IssueListing for BrowserListing {
    async fn fetch_listing(&self, token: &str) -> Result<String> {
        self.renderer
            .render_issue(&self.source_url, &self.widget_id, token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <form method="post" action="./jurnal-sgl.aspx" id="form1">
            <input type="hidden" name="__EVENTTARGET" id="__EVENTTARGET" value="" />
            <input type="hidden" name="__VIEWSTATE" value="dDwtMTA4NzQ=" />
            <input type="hidden" name="__EVENTVALIDATION" value="/wEWAwK" />
            <input type="text" name="txtSearch" value="" />
            <input type="submit" name="btnGo" value="Go" />
            <select name="ddlLang"><option value="ar">AR</option><option value="en" selected>EN</option></select>
            <select name="ctl00$DropDownList1" id="DropDownList1" onchange="__doPostBack('ctl00$DropDownList1','')">
                <option selected="selected" value="12-2024">ديسمبر 2024</option>
                <option value="11-2024">نوفمبر 2024</option>
            </select>
        </form>
        </body></html>
    "#;

    fn field<'a>(form: &'a PostbackForm, name: &str) -> Option<&'a str> {
        form.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_build_postback_carries_state() {
        let form = build_postback(PAGE, "http://gazette.test/dir/jurnal-sgl.aspx", "DropDownList1", "11-2024")
            .unwrap();

        assert_eq!(form.action, "http://gazette.test/dir/jurnal-sgl.aspx");
        assert_eq!(field(&form, "__VIEWSTATE"), Some("dDwtMTA4NzQ="));
        assert_eq!(field(&form, "__EVENTVALIDATION"), Some("/wEWAwK"));
        assert_eq!(field(&form, "__EVENTTARGET"), Some("ctl00$DropDownList1"));
        assert_eq!(field(&form, "__EVENTARGUMENT"), Some(""));
        assert_eq!(field(&form, "ctl00$DropDownList1"), Some("11-2024"));
        assert_eq!(field(&form, "ddlLang"), Some("en"));
        assert_eq!(field(&form, "txtSearch"), Some(""));
        assert_eq!(field(&form, "btnGo"), None);
        assert_eq!(
            form.fields.iter().filter(|(n, _)| n == "__EVENTTARGET").count(),
            1
        );
    }

    #[test]
    fn test_build_postback_requires_widget() {
        let err = build_postback("<form></form>", "http://gazette.test/", "DropDownList1", "x").unwrap_err();
        assert!(matches!(err, HarvestError::Parse(_)));
    }

    #[test]
    fn test_url_template_encodes_token() {
        let client = HttpClient::new(std::time::Duration::from_secs(1), None).unwrap();
        let listing = UrlTemplateListing::new(client, "http://gazette.test/issue?d={token}");
        assert_eq!(
            listing.listing_url("12/2024 a"),
            "http://gazette.test/issue?d=12%2F2024%20a"
        );
    }
}
