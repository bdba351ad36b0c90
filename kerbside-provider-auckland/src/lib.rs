//! Provider implementation for Auckland Council's collection-day pages.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};

use kerbside_core::{
    extractor::ICON_MARKER_CLASS,
    model::AreaId,
    plugin::Provider,
    ports::{AreaValidator, PortError, ScheduleSource},
};

const BASE_URL: &str = "https://new.aucklandcouncil.govt.nz/en/rubbish-recycling/rubbish-recycling-collections/rubbish-recycling-collection-days";

/// The council site serves a reduced page to unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Collection-day page fetcher for Auckland.
pub struct AucklandSource {
    client: Client,
    base_url: String,
}

impl AucklandSource {
    /// Create a source bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Create a source that reads pages from a different host or path.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Page address for `area`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::InvalidArea`] if the identifier is empty or would
    /// escape its path segment.
    pub fn page_url(&self, area: &AreaId) -> Result<String, PortError> {
        let token = area.as_str();
        let unsafe_char = |ch: char| ch.is_whitespace() || matches!(ch, '/' | '?' | '#' | '\\');
        if token.is_empty() || token.contains(unsafe_char) {
            return Err(PortError::InvalidArea(area.clone()));
        }
        Ok(format!("{}/{token}.html", self.base_url))
    }

    fn request(&self, area: &AreaId) -> Result<RequestBuilder, PortError> {
        Ok(self.client.get(self.page_url(area)?))
    }
}

#[async_trait]
impl ScheduleSource for AucklandSource {
    async fn fetch(&self, area: &AreaId) -> Result<String, PortError> {
        fetch_text(self.request(area)?).await
    }
}

#[async_trait]
impl AreaValidator for AucklandSource {
    async fn validate(&self, area: &AreaId) -> Result<bool, PortError> {
        let resp = self.request(area)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(%area, %status, "area page not available");
            return Ok(false);
        }

        Ok(lists_collections(&resp.text().await?))
    }
}

/// Build the provider bundle for Auckland.
#[must_use]
pub fn plugin(client: Client) -> Provider {
    let source = Arc::new(AucklandSource::new(client));

    Provider {
        name: String::from("Auckland Council"),
        source: Arc::<AucklandSource>::clone(&source),
        validator: source,
    }
}

/// Whether a page looks like a collection-day page.
#[must_use]
pub fn lists_collections(html: &str) -> bool {
    html.contains(ICON_MARKER_CLASS)
}

// Small helper to fetch a page body with status handling.
async fn fetch_text(req: RequestBuilder) -> Result<String, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;
    if resp.status() == StatusCode::NOT_FOUND {
        tracing::debug!(url = %resp.url(), "schedule page not found");
    }
    resp.error_for_status()
        .map_err(PortError::from)?
        .text()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const COLLECTION_PAGE: &str =
        r#"<p class="mb-0 lead"><i class="acpl-icon rubbish"></i><b>Wednesday, 8 October</b></p>"#;

    fn local_client() -> Client {
        Client::builder().no_proxy().build().expect("client builds")
    }

    /// Answer every connection with the same status and body; returns the base URL.
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("bound address");

        tokio::spawn(async move {
            while let Ok((mut socket, _peer)) = listener.accept().await {
                let mut request = [0_u8; 4096];
                let _read: std::io::Result<usize> = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _written: std::io::Result<()> = socket.write_all(response.as_bytes()).await;
                let _closed: std::io::Result<()> = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    /// Base URL of a port nobody listens on.
    async fn refused() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("bound address");
        drop(listener);
        format!("http://{addr}")
    }

    fn source() -> AucklandSource {
        AucklandSource::new(Client::new())
    }

    #[test]
    fn templates_area_into_url() {
        let url = source().page_url(&AreaId::new("702")).expect("valid area");
        assert_eq!(
            url,
            "https://new.aucklandcouncil.govt.nz/en/rubbish-recycling/rubbish-recycling-collections/rubbish-recycling-collection-days/702.html"
        );
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let source = AucklandSource::with_base_url(Client::new(), "http://localhost:8080/pages/");
        assert_eq!(
            source.page_url(&AreaId::new("12345678901")).expect("valid area"),
            "http://localhost:8080/pages/12345678901.html"
        );
    }

    #[test]
    fn rejects_area_tokens_that_leave_the_path() {
        for raw in ["", "../702", "702?x=1", "70 2", "702#top"] {
            assert!(
                matches!(
                    source().page_url(&AreaId(raw.to_owned())),
                    Err(PortError::InvalidArea(_))
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn detects_collection_pages_by_icon_marker() {
        assert!(lists_collections(
            r#"<p class="mb-0 lead"><i class="acpl-icon rubbish"></i><b>Wednesday, 8 October</b></p>"#
        ));
        assert!(!lists_collections("<html><body>Page not found</body></html>"));
    }

    #[tokio::test]
    async fn invalid_area_fails_before_any_request() {
        let source = AucklandSource::with_base_url(Client::new(), "http://127.0.0.1:9");

        assert!(matches!(
            source.validate(&AreaId::new("a/b")).await,
            Err(PortError::InvalidArea(_))
        ));
        assert!(matches!(
            source.fetch(&AreaId::new("a/b")).await,
            Err(PortError::InvalidArea(_))
        ));
    }

    #[tokio::test]
    async fn missing_page_is_invalid_area_and_unavailable_source() {
        let base = serve("404 Not Found", "<html><body>Page not found</body></html>").await;
        let source = AucklandSource::with_base_url(local_client(), base);
        let area = AreaId::new("702");

        assert!(matches!(source.validate(&area).await, Ok(false)));

        let err = source.fetch(&area).await.expect_err("404 is not a schedule");
        let PortError::Network(inner) = err else {
            panic!("expected network error, got {err:?}");
        };
        assert_eq!(inner.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn collection_page_is_valid_and_fetched() {
        let base = serve("200 OK", COLLECTION_PAGE).await;
        let source = AucklandSource::with_base_url(local_client(), base);
        let area = AreaId::new("702");

        assert!(matches!(source.validate(&area).await, Ok(true)));
        assert_eq!(source.fetch(&area).await.expect("page served"), COLLECTION_PAGE);
    }

    #[tokio::test]
    async fn page_without_marker_is_invalid() {
        let base = serve("200 OK", "<html><body>Search for your address</body></html>").await;
        let source = AucklandSource::with_base_url(local_client(), base);

        assert!(matches!(source.validate(&AreaId::new("702")).await, Ok(false)));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let source = AucklandSource::with_base_url(local_client(), refused().await);
        let area = AreaId::new("702");

        assert!(matches!(source.validate(&area).await, Err(PortError::Network(_))));
        assert!(matches!(source.fetch(&area).await, Err(PortError::Network(_))));
    }
}
