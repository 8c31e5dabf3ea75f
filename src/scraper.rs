use std::borrow::Cow;
use std::time::Duration;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder, StatusCode, Url};
use roxmltree::Document;
use crate::error::Result;
use crate::export::{CsvExporter, OutputArtifact};
use crate::feed;

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// How a fetched body is handed to the item matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Declared XML, or served from a `.xml` path. Must parse.
    Xml,
    /// Markup that is usually not well-formed XML. Matched when it parses,
    /// otherwise it yields no items.
    Html,
    /// Anything else is never matched.
    Other,
}

impl FetchedPage {
    pub fn kind(&self) -> BodyKind {
        let content_type = self.content_type.as_deref().unwrap_or_default().to_ascii_lowercase();
        let path = self.url.path().to_ascii_lowercase();

        if content_type.contains("html") {
            BodyKind::Html
        } else if content_type.contains("xml") || path.ends_with(".xml") {
            BodyKind::Xml
        } else {
            BodyKind::Other
        }
    }

    /// Decodes the body using the charset from `Content-Type`, then the XML
    /// declaration, then UTF-8. A byte order mark overrides all of them.
    pub fn text(&self) -> Cow<'_, str> {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_param)
            .or_else(|| declared_encoding(&self.body))
            .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
            .unwrap_or(UTF_8);

        let (text, used, had_errors) = encoding.decode(&self.body);
        if had_errors {
            tracing::warn!("Body of {} is not valid {}, replaced bad bytes", self.url, used.name());
        }
        text
    }
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn declared_encoding(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let declaration = head.trim_start_matches('\u{feff}').trim_start();
    if !declaration.starts_with("<?xml") {
        return None;
    }
    let declaration = &declaration[..declaration.find("?>")?];

    let rest = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    Some(value[..value.find(quote)?].to_string())
}

/// Issues a GET for `url`. Any status is accepted; only transport failures
/// are errors.
pub async fn fetch_page(url: &str) -> Result<FetchedPage> {
    tracing::info!("Visiting: {}", url);
    let response = CLIENT.get(url).send().await?;

    let status = response.status();
    tracing::info!("Response received with status code: {}", status.as_u16());
    if !status.is_success() {
        tracing::warn!("Non-success status from {}, parsing body anyway", url);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let url = response.url().clone();
    let body = response.bytes().await?.to_vec();

    Ok(FetchedPage {
        url,
        status,
        content_type,
        body,
    })
}

/// Fetches the feed at `url` and exports its items as CSV.
pub async fn scrape(url: &str) -> Result<OutputArtifact> {
    let mut exporter = CsvExporter::new(Vec::new())?;

    let page = fetch_page(url).await?;
    export_items(&page, &mut exporter)?;

    let artifact = exporter.into_artifact()?;
    tracing::info!(
        "Scraped {} items from {} (status {})",
        artifact.rows,
        url,
        page.status.as_u16()
    );
    Ok(artifact)
}

/// Runs the item matcher over `page` according to its body kind. Only a
/// declared XML body that fails to parse is an error.
pub fn export_items<W: std::io::Write>(page: &FetchedPage, exporter: &mut CsvExporter<W>) -> Result<()> {
    match page.kind() {
        BodyKind::Xml => {
            let text = page.text();
            let document = feed::parse_document(&text)?;
            push_all(&document, exporter);
        }
        BodyKind::Html => {
            let text = page.text();
            match feed::parse_document(&text) {
                Ok(document) => push_all(&document, exporter),
                Err(err) => tracing::warn!("{} is not well-formed markup, no items matched: {}", page.url, err),
            }
        }
        BodyKind::Other => {
            tracing::info!(
                "Skipping item matching for {} with content type {:?}",
                page.url,
                page.content_type
            );
        }
    }
    Ok(())
}

fn push_all<W: std::io::Write>(document: &Document<'_>, exporter: &mut CsvExporter<W>) {
    for item in feed::items(document) {
        exporter.push(&item);
    }
}
