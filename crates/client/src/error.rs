//! Errors returned by the expense client.
//!
//! The taxonomy is deliberately small:
//!
//! - [`Validation`] is detected locally and never reaches the network.
//! - [`Network`] means the request never completed.
//! - [`Server`] carries the server's rejection message.
//! - [`Auth`] covers a missing or rejected credential.
//! - [`NotFound`] is returned when the target of a delete does not exist.
//!
//!  [`Validation`]: ExpenseError::Validation
//!  [`Network`]: ExpenseError::Network
//!  [`Server`]: ExpenseError::Server
//!  [`Auth`]: ExpenseError::Auth
//!  [`NotFound`]: ExpenseError::NotFound
use reqwest::StatusCode;
use thiserror::Error;

pub type ResultExpense<T> = Result<T, ExpenseError>;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("not authenticated")]
    Auth,
    #[error("expense not found")]
    NotFound,
}

impl ExpenseError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network(_) => "Server unreachable, please try again.".to_string(),
            Self::Server { status, message } if message.is_empty() => {
                format!("Server error ({status})")
            }
            Self::Server { message, .. } => message.clone(),
            Self::Decode(_) => "Unexpected response from server.".to_string(),
            Self::InvalidBaseUrl(url) => format!("Invalid server address: {url}"),
            Self::Auth => "Session expired, please log in again.".to_string(),
            Self::NotFound => "Expense not found.".to_string(),
        }
    }
}

impl PartialEq for ExpenseError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Network(a), Self::Network(b)) => a.to_string() == b.to_string(),
            (
                Self::Server {
                    status: a,
                    message: m,
                },
                Self::Server {
                    status: b,
                    message: n,
                },
            ) => a == b && m == n,
            (Self::Decode(a), Self::Decode(b)) => a == b,
            (Self::InvalidBaseUrl(a), Self::InvalidBaseUrl(b)) => a == b,
            (Self::Auth, Self::Auth) => true,
            (Self::NotFound, Self::NotFound) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = ExpenseError::Server {
            status: StatusCode::CONFLICT,
            message: "duplicate expense".to_string(),
        };
        assert_eq!(err.user_message(), "duplicate expense");
    }

    #[test]
    fn server_error_without_message_names_the_status() {
        let err = ExpenseError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Server error (500 Internal Server Error)");
    }

    #[test]
    fn only_auth_reports_is_auth() {
        assert!(ExpenseError::Auth.is_auth());
        assert!(!ExpenseError::NotFound.is_auth());
        assert!(!ExpenseError::validation("x").is_auth());
    }
}
