//! Client for the address.md lookup service: free-text address parsing and
//! KLADR code lookups.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;


/// A possible match for a free-text address.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    pub kladr: String,
    pub full_address: String,
}

/// Details of a single KLADR object.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KladrInfo {
    pub full_address: String,
}

/// Result of parsing a free-text address.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedAddress {
    /// The service answered, possibly with an empty list.
    Found(Vec<AddressCandidate>),
    /// The service answered with a non-OK status.
    NotFound(StatusCode),
}

#[derive(Debug, thiserror::Error)]
pub enum AddressApiError {
    #[error("address API request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected address API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid address API url: {0}")]
    Url(#[from] url::ParseError),
}

pub struct AddressApi {
    client: reqwest::Client,
    base_url: Url,
}

impl AddressApi {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
    ) -> Result<Self, AddressApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AddressApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST /parse` with the `address` form field.
    pub async fn parse(
        &self,
        address: &str,
    ) -> Result<ParsedAddress, AddressApiError> {
        let response = self
            .client
            .post(self.endpoint(&["parse"])?)
            .timeout(Duration::from_secs(10))
            .form(&[("address", address)])
            .send()
            .await
            .map_err(AddressApiError::Request)?;

        if response.status() != StatusCode::OK {
            return Ok(ParsedAddress::NotFound(response.status()));
        }

        let candidates = response
            .json::<Vec<AddressCandidate>>()
            .await
            .map_err(AddressApiError::Decode)?;
        Ok(ParsedAddress::Found(candidates))
    }

    /// `GET /kladr/{code}`.
    pub async fn kladr(
        &self,
        code: &str,
    ) -> Result<KladrInfo, AddressApiError> {
        self.client
            .get(self.endpoint(&["kladr", code])?)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(AddressApiError::Request)?
            .json::<KladrInfo>()
            .await
            .map_err(AddressApiError::Decode)
    }
}
