//! HTTP implementation of [`NewsSource`] for the paginated JSON feed API.
//!
//! Pages live at `{base}/feeds/{feed_id}/posts/page/{page}` and return an
//! object with an `items` array.  Only items of type `basico` are news
//! articles; everything else (galleries, ads, ...) is skipped.
//!
//! Decoding is deliberately lenient: a field of the wrong JSON type is read
//! as absent instead of failing the page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{NewsItem, NewsSource};
use crate::error::FetchError;
use crate::time::parse_publication;

/// The only item type shown in the reader.
const ARTICLE_TYPE: &str = "basico";

/// A news feed served by the remote JSON API.
pub struct ApiSource {
    client: Client,
    base_url: String,
    feed_id: String,
}

impl ApiSource {
    /// Create a source for `feed_id` on the API at `base_url`.
    ///
    /// `request_timeout` bounds each HTTP exchange on the client side; the
    /// paging controller applies its own overall timeout on top.
    pub fn new(
        base_url: impl Into<String>,
        feed_id: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(client, base_url, feed_id))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        feed_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            feed_id: feed_id.into(),
        }
    }

    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/feeds/{}/posts/page/{}",
            self.base_url.trim_end_matches('/'),
            self.feed_id,
            page
        )
    }

    /// Decode a response body into [`NewsItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// decoding without a server.
    pub fn parse_page(body: &[u8]) -> Result<Vec<NewsItem>, FetchError> {
        let root: Value = serde_json::from_slice(body)?;
        let items = root
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Decode("response has no items array".to_string()))?;

        Ok(items.iter().filter_map(parse_item).collect())
    }
}

fn parse_item(item: &Value) -> Option<NewsItem> {
    if item.get("type").and_then(Value::as_str) != Some(ARTICLE_TYPE) {
        return None;
    }

    let id = match item.get("id")? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(NewsItem {
        id,
        image: text_at(item, "/content/image/url"),
        chapeu: text_at(item, "/content/chapeu/label"),
        title: text_at(item, "/content/title"),
        summary: text_at(item, "/content/summary"),
        url: text_at(item, "/content/url"),
        publication: item
            .get("publication")
            .and_then(Value::as_str)
            .and_then(parse_publication),
    })
}

/// String at a JSON pointer, with line breaks removed.
fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(|s| s.replace(['\n', '\r'], ""))
}

#[async_trait]
impl NewsSource for ApiSource {
    fn name(&self) -> &str {
        &self.feed_id
    }

    async fn fetch(&self, page: u32) -> Result<Vec<NewsItem>, FetchError> {
        let url = self.page_url(page);
        debug!(page, %url, "requesting news page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let items = Self::parse_page(&body)?;
        info!(page, count = items.len(), "news page received");
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
