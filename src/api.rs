//! Transport layer: the [`CardSource`] seam and its HTTP implementation.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use crate::error::{BinderError, Result};
use crate::models::{SearchPage, SetMetadata};

// ---------------------------------------------------------------------------
// CardSource
// ---------------------------------------------------------------------------

/// The card-database API as consumed by the reconciliation engine.
///
/// `page` arguments are continuation tokens from a previous
/// [`SearchPage::next_page`](crate::models::SearchPage); `None` requests the
/// first page. Implemented over HTTP by [`ScryfallApi`] and by scripted
/// fixtures in the test suite.
pub trait CardSource: Send {
    /// Free-text card search, one page at a time.
    fn search(&self, query: &str, page: Option<&str>) -> Result<SearchPage>;

    /// The dedicated all-cards-in-set listing. Returns
    /// [`BinderError::NotFound`] when the API does not know the set.
    fn set_cards(&self, set_code: &str, page: Option<&str>) -> Result<SearchPage>;

    /// Display name, nominal card count, and parent linkage for a set.
    fn set_metadata(&self, set_code: &str) -> Result<SetMetadata>;
}

// ---------------------------------------------------------------------------
// ScryfallApi
// ---------------------------------------------------------------------------

/// HTTP implementation of [`CardSource`] against a Scryfall-style API.
pub struct ScryfallApi {
    base_url: String,
    client: Client,
}

impl ScryfallApi {
    /// Build a client against the given base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Decode a response, mapping API statuses onto the error taxonomy:
    /// 404 is `NotFound`, any other failure status or an undecodable body
    /// is `Malformed`.
    fn decode<T: serde::de::DeserializeOwned>(resp: Response, context: &str) -> Result<T> {
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(BinderError::NotFound(context.to_string()));
        }
        let status = resp.status();
        if !status.is_success() {
            return Err(BinderError::Malformed(format!(
                "{}: HTTP {}",
                context, status
            )));
        }
        resp.json()
            .map_err(|e| BinderError::Malformed(format!("{}: {}", context, e)))
    }
}

impl CardSource for ScryfallApi {
    fn search(&self, query: &str, page: Option<&str>) -> Result<SearchPage> {
        let resp = match page {
            // Continuation tokens are absolute next-page URLs.
            Some(url) => self.client.get(url).send()?,
            None => self
                .client
                .get(format!("{}/cards/search", self.base_url))
                .query(&[("q", query), ("unique", "prints"), ("order", "set")])
                .send()?,
        };
        Self::decode(resp, &format!("search {:?}", query))
    }

    fn set_cards(&self, set_code: &str, page: Option<&str>) -> Result<SearchPage> {
        let resp = match page {
            Some(url) => self.client.get(url).send()?,
            None => self
                .client
                .get(format!("{}/cards/set/{}", self.base_url, set_code))
                .send()?,
        };
        Self::decode(resp, &format!("set listing {}", set_code))
    }

    fn set_metadata(&self, set_code: &str) -> Result<SetMetadata> {
        let resp = self
            .client
            .get(format!("{}/sets/{}", self.base_url, set_code))
            .send()?;
        Self::decode(resp, &format!("set metadata {}", set_code))
    }
}
