//! Blocking HTTP client for the arrivals API.

use std::time::Duration;

use reqwest::blocking;
use trainsign_traits::{BoxError, DataSource, StopArrivals};

use crate::error::{HwError, Result};
use crate::feed::parse_body;

pub struct HttpSource {
    client: blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HwError::Transport(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, stop_id: &str) -> String {
        format!("{}/by-id/{stop_id}", self.base_url)
    }

    fn get(&self, stop_id: &str) -> Result<StopArrivals> {
        let url = self.url_for(stop_id);
        tracing::debug!(%url, "fetching arrivals");
        let response = self.client.get(&url).send().map_err(map_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HwError::Status(status.as_u16()));
        }
        let body = response.text().map_err(map_reqwest)?;
        parse_body(&body)
    }
}

fn map_reqwest(e: reqwest::Error) -> HwError {
    if e.is_timeout() {
        HwError::Timeout
    } else {
        HwError::Transport(e.to_string())
    }
}

impl DataSource for HttpSource {
    fn fetch(&mut self, stop_id: &str) -> std::result::Result<StopArrivals, BoxError> {
        self.get(stop_id).map_err(|e| Box::new(e) as BoxError)
    }
}
