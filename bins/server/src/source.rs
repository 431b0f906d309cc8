//! HTTP-backed external balance source.

use rust_decimal::Decimal;

use custodia_core::reconcile::{BalanceSource, SourceError};

/// Fetches balances over HTTP from `{base_url}/{address}`.
///
/// The endpoint is expected to answer with the decimal balance as plain
/// text, e.g. `0.00512345`.
pub struct HttpBalanceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBalanceSource {
    /// Creates a source against the given base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

impl BalanceSource for HttpBalanceSource {
    async fn fetch(&self, address: &str) -> Result<Decimal, SourceError> {
        let url = format!("{}/{address}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        body.trim()
            .parse()
            .map_err(|err| SourceError::Unavailable(format!("unparseable balance: {err}")))
    }
}
