//! Remote expense operations.
//!
//! Every call takes the caller's [`Session`]; the repository holds no
//! credential of its own.

use api_types::expense::{BILL_IMAGE_FIELD, ExpenseCreated, ExpenseNew, ExpenseView};
use chrono::NaiveDate;
use reqwest::{
    StatusCode, Url,
    multipart::{Form, Part},
};

use crate::{
    date::DATE_FORMAT,
    error::{ExpenseError, ResultExpense},
    http::{self, Api},
    model::{Expense, ExpenseFields, ExpenseId, ImageAttachment},
    session::Session,
};

pub const LIST_PATH: &str = "api/expenses/all";
pub const ADD_PATH: &str = "api/expenses/add";
pub const SEARCH_PATH: &str = "api/expenses/search";
pub const DELETE_PATH: &str = "api/expenses/delete/";

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    api: Api,
}

impl ExpenseRepository {
    pub fn new(base_url: &str) -> ResultExpense<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> ResultExpense<Self> {
        Ok(Self {
            api: Api::new(http, base_url)?,
        })
    }

    /// Base every receipt URL is resolved against.
    pub fn base_url(&self) -> &Url {
        self.api.base_url()
    }

    /// Fetches every expense of the session's user. No pagination.
    pub async fn list_all(&self, session: &Session) -> ResultExpense<Vec<Expense>> {
        tracing::debug!("GET {LIST_PATH}");
        let req = http::authorize(self.api.http().get(self.api.endpoint(LIST_PATH)?), session)?;
        let views: Vec<ExpenseView> = http::send_json(req).await?;
        into_expenses(views)
    }

    /// Creates an expense and returns its server id.
    ///
    /// The fields are validated before anything is sent. With an image the
    /// body is `multipart/form-data`; without one it is plain JSON.
    pub async fn create(
        &self,
        session: &Session,
        fields: &ExpenseFields,
        image: Option<&ImageAttachment>,
    ) -> ResultExpense<ExpenseId> {
        let payload = fields.validate()?;
        let req = http::authorize(self.api.http().post(self.api.endpoint(ADD_PATH)?), session)?;

        let req = match image {
            Some(image) => {
                tracing::debug!(
                    file = image.file_name(),
                    size = image.len(),
                    "POST {ADD_PATH} (multipart)"
                );
                req.multipart(multipart_body(&payload, image)?)
            }
            None => {
                tracing::debug!("POST {ADD_PATH} (json)");
                req.json(&payload)
            }
        };

        let created: ExpenseCreated = http::send_json(req).await?;
        let id = ExpenseId(created.expense_id);
        tracing::info!(%id, "expense created");
        Ok(id)
    }

    /// Returns the expenses dated `date`.
    ///
    /// Any failure of the search endpoint is absorbed: the full list is
    /// fetched instead and filtered locally. Only a failure of that second
    /// request reaches the caller.
    pub async fn search_by_date(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> ResultExpense<Vec<Expense>> {
        match self.search_primary(session, date).await {
            Ok(expenses) => Ok(expenses),
            Err(err) => {
                tracing::warn!(%date, "search endpoint failed, falling back to full list: {err}");
                let all = self.list_all(session).await?;
                Ok(filter_by_date(all, date))
            }
        }
    }

    async fn search_primary(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> ResultExpense<Vec<Expense>> {
        let date_param = date.format(DATE_FORMAT).to_string();
        tracing::debug!("GET {SEARCH_PATH}?date={date_param}");
        let req = self
            .api
            .http()
            .get(self.api.endpoint(SEARCH_PATH)?)
            .query(&[("date", date_param.as_str())]);
        let req = http::authorize(req, session)?;
        let views: Vec<ExpenseView> = http::send_json(req).await?;
        // Normalization can move a timestamp to another day; keep only exact
        // matches so both paths agree.
        Ok(filter_by_date(into_expenses(views)?, date))
    }

    /// Deletes an expense. Fails with `NotFound` when the id does not exist.
    pub async fn delete_by_id(&self, session: &Session, id: ExpenseId) -> ResultExpense<()> {
        let path = format!("{DELETE_PATH}{id}");
        tracing::debug!("DELETE {path}");
        let req = http::authorize(self.api.http().delete(self.api.endpoint(&path)?), session)?;
        http::send_unit(req).await.map_err(|err| match err {
            ExpenseError::Server { status, .. } if status == StatusCode::NOT_FOUND => {
                ExpenseError::NotFound
            }
            other => other,
        })?;
        tracing::info!(%id, "expense deleted");
        Ok(())
    }
}

fn into_expenses(views: Vec<ExpenseView>) -> ResultExpense<Vec<Expense>> {
    views.into_iter().map(Expense::try_from).collect()
}

fn filter_by_date(expenses: Vec<Expense>, date: NaiveDate) -> Vec<Expense> {
    expenses.into_iter().filter(|e| e.date == date).collect()
}

fn multipart_body(payload: &ExpenseNew, image: &ImageAttachment) -> ResultExpense<Form> {
    let part = Part::bytes(image.bytes().to_vec())
        .file_name(image.file_name().to_string())
        .mime_str(image.mime())
        .map_err(ExpenseError::Network)?;

    Ok(Form::new()
        .text("reason", payload.reason.clone())
        .text("amount", payload.amount.to_string())
        .text("date", payload.date.format(DATE_FORMAT).to_string())
        .part(BILL_IMAGE_FIELD, part))
}
