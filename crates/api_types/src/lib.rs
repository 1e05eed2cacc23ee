use serde::{Deserialize, Serialize};

pub use amount::{Amount, AmountError};

mod amount;

/// Error body returned by the server on non-2xx responses.
///
/// Some deployments use `message` instead of `error`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}

pub mod expense {
    use super::*;
    use chrono::NaiveDate;

    /// Multipart field carrying the receipt image.
    pub const BILL_IMAGE_FIELD: &str = "bill_img";

    /// An expense as returned by the list and search endpoints.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        #[serde(alias = "id")]
        pub expense_id: i64,
        pub reason: String,
        pub amount: Amount,
        /// Either a plain `YYYY-MM-DD` date or a full timestamp, depending on
        /// the server's storage.
        pub date: String,
        /// File name of the uploaded receipt, relative to `/uploads/`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub bill_img: Option<String>,
    }

    /// Plain (non-multipart) body of a create request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub reason: String,
        pub amount: Amount,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        #[serde(alias = "id")]
        pub expense_id: i64,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        #[serde(alias = "accessToken")]
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub name: String,
        pub email: String,
        pub password: String,
    }
}

#[cfg(test)]
mod tests {
    use super::expense::ExpenseView;
    use super::*;

    #[test]
    fn expense_view_accepts_numeric_and_string_amounts() {
        let json = r#"[
            {"expense_id": 1, "reason": "Lunch", "amount": 500, "date": "2024-05-01"},
            {"id": 2, "reason": "Taxi", "amount": "12.50", "date": "2024-05-01T00:00:00.000Z", "bill_img": "r.png"}
        ]"#;
        let expenses: Vec<ExpenseView> = serde_json::from_str(json).unwrap();
        assert_eq!(expenses[0].amount, Amount::from_cents(50_000));
        assert_eq!(expenses[0].bill_img, None);
        assert_eq!(expenses[1].expense_id, 2);
        assert_eq!(expenses[1].amount, Amount::from_cents(1_250));
        assert_eq!(expenses[1].bill_img.as_deref(), Some("r.png"));
    }

    #[test]
    fn error_body_accepts_message_alias() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "duplicate"}"#).unwrap();
        assert_eq!(body.error, "duplicate");
    }
}
