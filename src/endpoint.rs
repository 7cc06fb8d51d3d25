use crate::model::{ExpirationDate, Ticker};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options/";
pub const DEFAULT_CRUMB: &str = "H0ZsGkp7jUn";
const DEFAULT_LANG: &str = "en-US";
const DEFAULT_REGION: &str = "US";
const DEFAULT_CORS_DOMAIN: &str = "finance.yahoo.com";

/// Options-chain endpoint and the static query parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub crumb: String,
    pub lang: String,
    pub region: String,
    pub cors_domain: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            base_url: DEFAULT_BASE_URL.to_string(),
            crumb: DEFAULT_CRUMB.to_string(),
            lang: DEFAULT_LANG.to_string(),
            region: DEFAULT_REGION.to_string(),
            cors_domain: DEFAULT_CORS_DOMAIN.to_string(),
        }
    }
}

impl Endpoint {
    /// Point at a different host (mirror, local mock), keeping the other parameters.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_crumb(mut self, crumb: impl Into<String>) -> Self {
        self.crumb = crumb.into();
        self
    }

    /// Date-less URL; its document lists every available expiration.
    pub fn generic_url(&self, ticker: &Ticker) -> String {
        self.build(ticker, None)
    }

    /// URL of the page holding all contracts for one expiration.
    pub fn page_url(&self, ticker: &Ticker, expiration: &ExpirationDate) -> String {
        self.build(ticker, Some(expiration.timestamp))
    }

    fn build(&self, ticker: &Ticker, date: Option<i64>) -> String {
        let date = date.map(|ts| format!("&date={ts}")).unwrap_or_default();
        format!(
            "{}{}?formatted=true&crumb={}&lang={}&region={}{}&corsDomain={}",
            self.base_url, ticker, self.crumb, self.lang, self.region, date, self.cors_domain
        )
    }
}
