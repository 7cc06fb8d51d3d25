#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use yf_options::endpoint::Endpoint;
use yf_options::fetch::{FetchError, PageSource};
use yf_options::model::{ExpirationDate, PullDate, Ticker};

// ── Mock page source ────────────────────────────────────────────────

/// Canned response for one URL.
pub enum Canned {
    Doc(Value),
    Status(u16),
    BadJson,
}

/// Serves canned documents by URL and records every request.
#[derive(Default)]
pub struct MockSource {
    pages: HashMap<String, Canned>,
    pub requests: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn with(mut self, url: String, canned: Canned) -> Self {
        self.pages.insert(url, canned);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Canned::Doc(doc)) => Ok(doc.clone()),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(Canned::BadJson) => Err(FetchError::Decode {
                url: url.to_string(),
                source: serde_json::from_str::<Value>("{").unwrap_err(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

pub fn pull() -> PullDate {
    PullDate(NaiveDate::from_ymd_opt(2023, 11, 10).unwrap())
}

pub fn endpoint() -> Endpoint {
    Endpoint::default().with_base_url("http://mock.local/v7/finance/options")
}

pub fn page_url(t: &Ticker, ts: i64) -> String {
    endpoint().page_url(t, &ExpirationDate::from_timestamp(ts).unwrap())
}

pub fn discovery(dates: &[i64]) -> Value {
    json!({ "optionChain": { "result": [ { "expirationDates": dates } ] } })
}

pub fn chain_page(calls: Value, puts: Value) -> Value {
    json!({ "optionChain": { "result": [ { "options": [ { "calls": calls, "puts": puts } ] } ] } })
}

/// A contract in the provider's formatted (`{raw, fmt}`) layout.
pub fn contract(symbol: &str, strike: f64) -> Value {
    json!({
        "contractSymbol": symbol,
        "strike": { "raw": strike, "fmt": format!("{strike:.2}") },
        "lastPrice": { "raw": 5.5, "fmt": "5.50" },
        "bid": { "raw": 5.4, "fmt": "5.40" },
        "ask": { "raw": 5.6, "fmt": "5.60" },
        "change": { "raw": 0.1, "fmt": "0.10" },
        "percentChange": { "raw": 1.85, "fmt": "1.85%" },
        "volume": { "raw": 10, "fmt": "10" },
        "openInterest": { "raw": 50, "fmt": "50" },
        "impliedVolatility": { "raw": 0.3, "fmt": "30.00%" }
    })
}
