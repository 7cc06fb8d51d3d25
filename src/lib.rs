//! Options-chain downloader for Yahoo Finance.
//!
//! One discovery request lists the expirations for a ticker, one request per
//! expiration fetches its calls and puts, and the matching contracts end up in
//! a single CSV file.

pub mod cli;
pub mod config;
pub mod download;
pub mod endpoint;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
