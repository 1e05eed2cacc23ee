use api_types::ErrorBody;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::{ExpenseError, ResultExpense},
    session::Session,
};

/// Base URL plus the shared HTTP client.
#[derive(Debug, Clone)]
pub(crate) struct Api {
    base_url: Url,
    http: reqwest::Client,
}

impl Api {
    pub(crate) fn new(http: reqwest::Client, base_url: &str) -> ResultExpense<Self> {
        // Without the trailing slash `join` would replace the last segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|err| ExpenseError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        Ok(Self { base_url, http })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> ResultExpense<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ExpenseError::InvalidBaseUrl(format!("{path}: {err}")))
    }
}

/// Attaches the bearer credential, failing with `Auth` when there is none.
pub(crate) fn authorize(req: RequestBuilder, session: &Session) -> ResultExpense<RequestBuilder> {
    let token = session.token();
    if token.trim().is_empty() {
        return Err(ExpenseError::Auth);
    }
    Ok(req.bearer_auth(token))
}

/// Maps a non-2xx response to the client error taxonomy.
pub(crate) async fn error_for_response(res: Response) -> ExpenseError {
    let status = res.status();
    // 404 stays a server error here; only a delete knows it means a missing expense.
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return ExpenseError::Auth;
    }

    let message = res
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    ExpenseError::Server { status, message }
}

/// Sends a request and decodes a JSON body on success.
pub(crate) async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> ResultExpense<T> {
    let res = req.send().await?;
    if !res.status().is_success() {
        return Err(error_for_response(res).await);
    }
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ExpenseError::Decode(err.to_string()))
}

/// Sends a request whose success body is irrelevant.
pub(crate) async fn send_unit(req: RequestBuilder) -> ResultExpense<()> {
    let res = req.send().await?;
    if res.status().is_success() {
        return Ok(());
    }
    Err(error_for_response(res).await)
}
