//! REST implementation of the task API.
//!
//! This module provides [`HttpTaskApi`], which speaks JSON to the loan
//! backend:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET loan/{loan}/tasks/` |
//! | create    | `POST loan/{loan}/tasks/` |
//! | update    | `PATCH tasks/{id}/` with `{status, position}` |
//! | delete    | `DELETE tasks/{id}/` |

use std::time::Duration;

use async_trait::async_trait;
use loanboard_protocol::{Card, CardId, NewCard, PositionUpdate, decode_card_list};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::TaskApi;
use crate::error::{Error, Result};

/// HTTP client for the task resource.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Examples
///
/// ```no_run
/// use loanboard_client::{HttpTaskApi, TaskApi};
/// use url::Url;
///
/// # async fn example() -> loanboard_client::Result<()> {
/// let base = Url::parse("http://localhost:8000/api/")?;
/// let api = HttpTaskApi::new(base, None)?;
///
/// let cards = api.list_tasks(42).await?;
/// println!("loan 42 has {} tasks", cards.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    http: Client,
    base: Url,
}

impl HttpTaskApi {
    /// Creates a client rooted at `base`.
    ///
    /// A trailing slash is added to the base path if missing, so endpoint
    /// paths resolve underneath it. With `timeout` unset, reqwest's defaults
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Build`] if the HTTP client fails to initialize.
    #[instrument(skip(base), fields(base = %base, timeout = ?timeout))]
    pub fn new(mut base: Url, timeout: Option<Duration>) -> Result<Self> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(Error::Build)?;

        debug!("created task API client");
        Ok(Self { http, base })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn loan_tasks(&self, loan: u64) -> Result<Url> {
        self.endpoint(&format!("loan/{loan}/tasks/"))
    }

    fn task(&self, id: CardId) -> Result<Url> {
        self.endpoint(&format!("tasks/{id}/"))
    }

    /// Sends a request and returns the body of a successful response.
    async fn execute(&self, request: RequestBuilder, url: &Url) -> Result<String> {
        let request_err = |source| Error::Request {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(request_err)?;
        let status = response.status();
        let body = response.text().await.map_err(request_err)?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "task API returned an error status");
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn decode_card(url: &Url, body: &str) -> Result<Card> {
        serde_json::from_str(body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[instrument(skip(self))]
    async fn list_tasks(&self, loan: u64) -> Result<Vec<Card>> {
        let url = self.loan_tasks(loan)?;
        let body = self.execute(self.http.get(url.clone()), &url).await?;
        let cards = decode_card_list(&body)?;
        debug!(count = cards.len(), "listed tasks");
        Ok(cards)
    }

    #[instrument(skip(self, card), fields(loan = card.loan, status = %card.status))]
    async fn create_task(&self, card: &NewCard) -> Result<Card> {
        let url = self.loan_tasks(card.loan)?;
        let body = self.execute(self.http.post(url.clone()).json(card), &url).await?;
        let created = Self::decode_card(&url, &body)?;
        debug!(id = %created.id, position = created.position, "created task");
        Ok(created)
    }

    #[instrument(skip(self, update), fields(id = %update.id, status = %update.status, position = update.position))]
    async fn update_task(&self, update: &PositionUpdate) -> Result<Card> {
        let url = self.task(update.id)?;
        let body = self
            .execute(self.http.patch(url.clone()).json(update), &url)
            .await?;
        Self::decode_card(&url, &body)
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: CardId) -> Result<()> {
        let url = self.task(id)?;
        self.execute(self.http.delete(url.clone()), &url).await?;
        debug!("deleted task");
        Ok(())
    }
}
