//! View state machine of the expenses screen.
//!
//! The controller never performs I/O. Actions that need the server return a
//! [`Pending`] request; the front end runs it (usually on a spawned task) and
//! feeds the resulting [`Completion`] back through [`Controller::apply`].
//!
//! Each request carries a [`Ticket`]. Navigating to another view bumps the
//! view epoch and issuing a read bumps the fetch counter, so completions that
//! arrive after the user moved on are discarded instead of overwriting the
//! collection or banners of the view now on screen.

use chrono::NaiveDate;

use crate::{
    date,
    error::{ExpenseError, ResultExpense},
    form::FormState,
    model::{Expense, ExpenseFields, ExpenseId, ImageAttachment},
    preview::PreviewRegistry,
    repository::ExpenseRepository,
    session::Session,
};

pub const CREATED_MESSAGE: &str = "Expense added successfully";
pub const SEARCH_DATE_MISSING: &str = "Please select a date";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    None,
    Create,
    All,
    Search,
    Delete,
}

impl ViewState {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Home",
            Self::Create => "Create Expense",
            Self::All => "All Expenses",
            Self::Search => "Search by Date",
            Self::Delete => "Delete Expense",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banners {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Banners {
    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.success = None;
    }

    fn succeed(&mut self, message: Option<String>) {
        self.error = None;
        if message.is_some() {
            self.success = message;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    view: ViewState,
    epoch: u64,
    /// Set for reads only; writes survive newer reads in the same view.
    fetch: Option<u64>,
}

impl Ticket {
    pub fn view(&self) -> ViewState {
        self.view
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Create,
    Search,
    Delete,
}

impl RequestKind {
    fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Failed to fetch expenses",
            Self::Create => "Failed to add expense",
            Self::Search => "Failed to search expenses",
            Self::Delete => "Failed to delete expense",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Request {
    ListAll,
    Create {
        fields: ExpenseFields,
        image: Option<ImageAttachment>,
    },
    Search {
        date: NaiveDate,
    },
    Delete {
        id: ExpenseId,
    },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::ListAll => RequestKind::List,
            Self::Create { .. } => RequestKind::Create,
            Self::Search { .. } => RequestKind::Search,
            Self::Delete { .. } => RequestKind::Delete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pending {
    pub ticket: Ticket,
    pub request: Request,
}

impl Pending {
    /// Runs the request against the repository.
    pub async fn execute(self, repo: &ExpenseRepository, session: &Session) -> Completion {
        let kind = self.request.kind();
        let result = match self.request {
            Request::ListAll => repo.list_all(session).await.map(Outcome::Listed),
            Request::Create { fields, image } => repo
                .create(session, &fields, image.as_ref())
                .await
                .map(Outcome::Created),
            Request::Search { date } => repo
                .search_by_date(session, date)
                .await
                .map(Outcome::Searched),
            Request::Delete { id } => repo
                .delete_by_id(session, id)
                .await
                .map(|()| Outcome::Deleted(id)),
        };
        Completion {
            ticket: self.ticket,
            kind,
            result,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Listed(Vec<Expense>),
    Created(ExpenseId),
    Searched(Vec<Expense>),
    Deleted(ExpenseId),
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub kind: RequestKind,
    pub result: ResultExpense<Outcome>,
}

/// What applying a completion did.
#[derive(Debug)]
pub enum Applied {
    Done,
    /// Issued after the user moved on; nothing changed.
    Stale,
    /// The server rejected the credential. The front end should drop it.
    AuthFailed,
    /// A follow-up read to run, e.g. refreshing the list after a delete.
    Refresh(Pending),
}

#[derive(Debug, Default)]
pub struct Controller {
    view: ViewState,
    banners: Banners,
    expenses: Vec<Expense>,
    has_searched: bool,
    listed: bool,
    loading: bool,
    search_date: String,
    delete_input: String,
    form: FormState,
    epoch: u64,
    fetch: u64,
}

impl Controller {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            form: FormState::new(previews),
            ..Self::default()
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn banners(&self) -> &Banners {
        &self.banners
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// A read for the current view is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn search_date(&self) -> &str {
        &self.search_date
    }

    /// Editing the date invalidates the "no results" notice and any search
    /// still in flight for the previous date.
    pub fn set_search_date(&mut self, value: impl Into<String>) {
        self.search_date = value.into();
        self.has_searched = false;
        self.fetch += 1;
        self.loading = false;
    }

    pub fn delete_input(&self) -> &str {
        &self.delete_input
    }

    pub fn set_delete_input(&mut self, value: impl Into<String>) {
        self.delete_input = value.into();
    }

    pub fn open_create(&mut self) {
        self.transition(ViewState::Create);
    }

    /// Switches to the list view and returns the fetch to run.
    pub fn open_all(&mut self) -> Pending {
        self.transition(ViewState::All);
        self.issue_read(Request::ListAll)
    }

    pub fn open_search(&mut self) {
        self.transition(ViewState::Search);
    }

    pub fn open_delete(&mut self) {
        self.transition(ViewState::Delete);
    }

    fn transition(&mut self, next: ViewState) {
        if self.view == ViewState::Create && next != ViewState::Create {
            self.form.reset();
        }
        tracing::debug!(from = ?self.view, to = ?next, "view transition");

        self.view = next;
        self.epoch += 1;
        self.banners.clear();
        self.loading = false;
        self.listed = false;
        self.delete_input.clear();
        if matches!(next, ViewState::All | ViewState::Search | ViewState::Delete) {
            self.expenses.clear();
            self.has_searched = false;
        }
    }

    fn ticket(&self, fetch: Option<u64>) -> Ticket {
        Ticket {
            view: self.view,
            epoch: self.epoch,
            fetch,
        }
    }

    fn issue_read(&mut self, request: Request) -> Pending {
        self.fetch += 1;
        self.loading = true;
        Pending {
            ticket: self.ticket(Some(self.fetch)),
            request,
        }
    }

    fn issue_write(&self, request: Request) -> Pending {
        Pending {
            ticket: self.ticket(None),
            request,
        }
    }

    /// Validates the draft and returns the create request.
    ///
    /// Validation failures set the error banner and send nothing.
    pub fn submit_create(&mut self) -> Option<Pending> {
        if self.view != ViewState::Create {
            return None;
        }
        if let Err(err) = self.form.fields().validate() {
            self.banners.fail(err.user_message());
            return None;
        }
        let (fields, image) = self.form.submission();
        Some(self.issue_write(Request::Create { fields, image }))
    }

    /// Explicit cancel: drops the draft and its preview.
    pub fn cancel_create(&mut self) {
        self.form.reset();
        self.banners.clear();
    }

    /// Shows a failure that happened outside a request, e.g. reading a receipt file.
    pub fn report(&mut self, err: &ExpenseError) {
        self.banners.fail(err.user_message());
    }

    pub fn search(&mut self) -> Option<Pending> {
        if self.view != ViewState::Search {
            return None;
        }
        let date = match date::parse_input(&self.search_date, SEARCH_DATE_MISSING) {
            Ok(date) => date,
            Err(err) => {
                self.banners.fail(err.user_message());
                return None;
            }
        };
        self.has_searched = true;
        Some(self.issue_read(Request::Search { date }))
    }

    pub fn request_delete(&mut self) -> Option<Pending> {
        if self.view != ViewState::Delete {
            return None;
        }
        match self.delete_input.parse::<ExpenseId>() {
            Ok(id) => Some(self.issue_write(Request::Delete { id })),
            Err(err) => {
                self.banners.fail(err.user_message());
                None
            }
        }
    }

    /// Reloads the list in the views that show one.
    pub fn refresh(&mut self) -> Option<Pending> {
        match self.view {
            ViewState::All | ViewState::Delete => Some(self.issue_read(Request::ListAll)),
            ViewState::Search => self.search(),
            ViewState::None | ViewState::Create => None,
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.fetch.is_none_or(|fetch| fetch == self.fetch)
    }

    pub fn apply(&mut self, completion: Completion) -> Applied {
        let Completion {
            ticket,
            kind,
            result,
        } = completion;

        if !self.is_current(&ticket) {
            tracing::debug!(?kind, view = ?ticket.view, "discarding stale completion");
            return Applied::Stale;
        }
        if ticket.fetch.is_some() {
            self.loading = false;
        }

        match result {
            Ok(Outcome::Listed(expenses)) => {
                self.expenses = expenses;
                self.listed = true;
                self.banners.succeed(None);
                Applied::Done
            }
            Ok(Outcome::Searched(expenses)) => {
                self.expenses = expenses;
                self.banners.succeed(None);
                Applied::Done
            }
            Ok(Outcome::Created(_)) => {
                self.form.reset();
                self.banners.succeed(Some(CREATED_MESSAGE.to_string()));
                Applied::Done
            }
            Ok(Outcome::Deleted(id)) => {
                self.delete_input.clear();
                self.banners.succeed(Some(format!("Expense {id} deleted")));
                if self.view == ViewState::Delete && self.listed {
                    Applied::Refresh(self.issue_read(Request::ListAll))
                } else {
                    Applied::Done
                }
            }
            Err(err) => {
                let auth_failed = err.is_auth();
                self.banners.fail(banner_for(kind, &err));
                if auth_failed {
                    Applied::AuthFailed
                } else {
                    Applied::Done
                }
            }
        }
    }
}

fn banner_for(kind: RequestKind, err: &ExpenseError) -> String {
    match err {
        ExpenseError::Validation(_) | ExpenseError::Auth | ExpenseError::NotFound => {
            err.user_message()
        }
        ExpenseError::Server { message, .. } if !message.is_empty() => message.clone(),
        _ => kind.failure_message().to_string(),
    }
}
