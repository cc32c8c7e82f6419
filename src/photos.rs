//! Photo search and download against the Unsplash API.
//!
//! The photo key is optional for the tool as a whole; when it is
//! missing no [`UnsplashClient`] gets built and articles simply go out
//! without images. Attribution is not optional: the API guidelines
//! require author credit with referral UTM parameters and a ping to
//! the download-tracking endpoint before fetching the bytes, and both
//! are handled here.

use serde::Deserialize;
use thiserror::Error;

pub const UNSPLASH_API_URL: &str = "https://api.unsplash.com";
const SEARCH_PER_PAGE: &str = "10";
const UTM_PARAMS: &str = "utm_source=unsplash&utm_medium=referral";

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Everything the composer needs to know about one search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePhoto {
    /// URL of the regular-size rendition (the bytes we fetch).
    pub url: String,
    /// Download-tracking endpoint, pinged before fetching.
    pub download_location: String,
    pub author: String,
    pub author_url: String,
    /// Photographer-supplied description, when there is one.
    pub description: Option<String>,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    urls: ResultUrls,
    links: ResultLinks,
    user: ResultUser,
    description: Option<String>,
    alt_description: Option<String>,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct ResultUrls {
    regular: String,
}

#[derive(Deserialize)]
struct ResultLinks {
    download_location: String,
}

#[derive(Deserialize)]
struct ResultUser {
    name: String,
    links: ResultUserLinks,
}

#[derive(Deserialize)]
struct ResultUserLinks {
    html: String,
}

impl From<SearchResult> for RemotePhoto {
    fn from(result: SearchResult) -> Self {
        RemotePhoto {
            url: result.urls.regular,
            download_location: result.links.download_location,
            author: result.user.name,
            author_url: result.user.links.html,
            description: result.description.or(result.alt_description),
            width: result.width,
            height: result.height,
        }
    }
}

pub struct UnsplashClient {
    http: reqwest::blocking::Client,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(access_key: impl Into<String>) -> Self {
        // Full-size photo downloads can outlast the blocking client's
        // 30 second default timeout; it is turned off here.
        UnsplashClient {
            http: reqwest::blocking::Client::builder()
                .timeout(None)
                .build()
                .expect("Failed to build HTTP client"),
            access_key: access_key.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Client-ID {}", self.access_key)
    }

    /// Most relevant landscape photo for a query, or `None` when the
    /// search comes back empty.
    pub fn search_first(&self, query: &str) -> Result<Option<RemotePhoto>, PhotoError> {
        let response = self
            .http
            .get(format!("{UNSPLASH_API_URL}/search/photos"))
            .header("Authorization", self.auth_header())
            .query(&[
                ("query", query),
                ("per_page", SEARCH_PER_PAGE),
                ("orientation", "landscape"),
                ("order_by", "relevance"),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(PhotoError::Api {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let parsed: SearchResponse = response.json()?;
        Ok(parsed.results.into_iter().next().map(RemotePhoto::from))
    }

    /// Fetch the photo bytes. The tracking ping comes first; its
    /// failure is not ours to propagate, downloads must still work
    /// when the tracking endpoint hiccups.
    pub fn download(&self, photo: &RemotePhoto) -> Result<Vec<u8>, PhotoError> {
        let _ = self
            .http
            .get(&photo.download_location)
            .header("Authorization", self.auth_header())
            .send();

        let response = self.http.get(&photo.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PhotoError::Api {
                status: status.as_u16(),
                message: format!("fetching {}", photo.url),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// HTML credit line for the `image_credit` front matter key.
pub fn credit_html(photo: &RemotePhoto) -> String {
    format!(
        "Photo by <a href=\"{}?{UTM_PARAMS}\">{}</a> on <a href=\"https://unsplash.com?{UTM_PARAMS}\">Unsplash</a>",
        photo.author_url, photo.author
    )
}

/// Italic Markdown credit line placed under images embedded in the body.
pub fn credit_markdown(photo: &RemotePhoto) -> String {
    format!(
        "*Photo by [{}]({}?{UTM_PARAMS}) on [Unsplash](https://unsplash.com?{UTM_PARAMS})*",
        photo.author, photo.author_url
    )
}
