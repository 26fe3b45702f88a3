use std::{future::Future, time::Duration};

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::time::timeout;

use crate::error::FetchError;

/// List endpoints answer either with a bare array or with `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Items(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListPayload<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Items(items) | ListPayload::Wrapped { data: items } => items,
        }
    }
}

/// Thin HTTP client for the site API.
#[derive(Clone, Debug)]
pub struct ContentClient {
    http: Client,
    api_base: String,
}

impl ContentClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.api_base)
    }

    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        limit: Option<Duration>,
    ) -> Result<Vec<T>, FetchError> {
        let payload: ListPayload<T> = self.fetch_one(endpoint, limit).await?;

        Ok(payload.into_items())
    }

    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        limit: Option<Duration>,
    ) -> Result<T, FetchError> {
        let url = self.url(endpoint);

        let request = async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| transport(&url, e))?;

            decode(&url, response).await
        };

        race(&url, limit, request).await
    }

    pub async fn post_json<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<(), FetchError> {
        let url = self.url(endpoint);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;

        check_status(&url, &response)
    }
}

/// Drops the request future when `limit` elapses first, aborting the in-flight request.
async fn race<T>(
    url: &str,
    limit: Option<Duration>,
    request: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match limit {
        Some(limit) => timeout(limit, request)
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout: limit,
            })?,
        None => request.await,
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, FetchError> {
    check_status(url, &response)?;

    let bytes = response.bytes().await.map_err(|e| transport(url, e))?;

    serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn check_status(url: &str, response: &Response) -> Result<(), FetchError> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn transport(url: &str, error: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        reason: error.to_string(),
    }
}
