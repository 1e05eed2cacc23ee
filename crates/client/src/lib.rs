//! Expense client.
//!
//! A thin client of the expenses HTTP API: it never stores expenses itself,
//! it only lists, creates, searches and deletes them on the server on behalf
//! of an authenticated [`Session`].
//!
//! - [`ExpenseRepository`] wraps the remote operations.
//! - [`FormState`] holds the draft of a new expense and its receipt.
//! - [`Controller`] is the view state machine driving both.

pub use auth::AuthClient;
pub use controller::{
    Applied, Banners, Completion, Controller, Outcome, Pending, Request, RequestKind, Ticket,
    ViewState,
};
pub use error::{ExpenseError, ResultExpense};
pub use form::{Field, FormState};
pub use model::{Expense, ExpenseFields, ExpenseId, ImageAttachment};
pub use preview::{Preview, PreviewRegistry};
pub use repository::ExpenseRepository;
pub use session::{Session, SessionStore, StoreError};

pub use api_types::Amount;
pub use reqwest::Url;

pub mod auth;
pub mod controller;
pub mod date;
pub mod repository;

mod error;
mod form;
mod http;
mod model;
mod preview;
mod session;
