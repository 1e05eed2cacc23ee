use std::{fmt, path::Path, str::FromStr};

use api_types::{
    Amount, AmountError,
    expense::{ExpenseNew, ExpenseView},
};
use chrono::NaiveDate;
use reqwest::Url;

use crate::{
    date,
    error::{ExpenseError, ResultExpense},
};

/// Path, relative to the API base, under which receipts are served.
pub const UPLOADS_PATH: &str = "uploads/";

/// Server-assigned expense identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(pub i64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ExpenseError::validation("Please enter an expense id"));
        }
        trimmed
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(ExpenseId)
            .ok_or_else(|| ExpenseError::validation("Expense id must be a positive number"))
    }
}

/// An expense with its date already normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub reason: String,
    pub amount: Amount,
    pub date: NaiveDate,
    /// Receipt file name, absent when no image was attached at creation.
    pub bill_image: Option<String>,
}

impl Expense {
    /// Resolves the receipt against `{base}/uploads/{file}`.
    pub fn bill_image_url(&self, base: &Url) -> Option<Url> {
        let file = self.bill_image.as_deref()?;
        base.join(UPLOADS_PATH).ok()?.join(file).ok()
    }
}

impl TryFrom<ExpenseView> for Expense {
    type Error = ExpenseError;

    fn try_from(view: ExpenseView) -> Result<Self, Self::Error> {
        let date = date::normalize(&view.date).ok_or_else(|| {
            ExpenseError::Decode(format!(
                "expense {} has an unreadable date: {}",
                view.expense_id, view.date
            ))
        })?;
        Ok(Self {
            id: ExpenseId(view.expense_id),
            reason: view.reason,
            amount: view.amount,
            date,
            bill_image: view.bill_img.filter(|name| !name.is_empty()),
        })
    }
}

/// Raw create-form values, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFields {
    pub reason: String,
    pub amount: String,
    pub date: String,
}

impl ExpenseFields {
    /// Checks the fields and produces the body of a create request.
    pub fn validate(&self) -> ResultExpense<ExpenseNew> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ExpenseError::validation("Reason is required"));
        }
        let amount = self.amount.parse::<Amount>().map_err(|err| match err {
            AmountError::Empty => ExpenseError::validation("Amount is required"),
            AmountError::Negative => ExpenseError::validation("Amount must not be negative"),
            _ => ExpenseError::validation("Amount must be a number"),
        })?;
        let date = date::parse_input(&self.date, "Date is required")?;

        Ok(ExpenseNew {
            reason: reason.to_string(),
            amount,
            date,
        })
    }
}

/// A receipt image held in memory until the create request is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageAttachment {
    /// Builds an attachment, rejecting files that are not images.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> ResultExpense<Self> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).ok_or_else(|| {
            ExpenseError::validation(format!("{file_name} is not a supported image"))
        })?;
        if bytes.is_empty() {
            return Err(ExpenseError::validation(format!("{file_name} is empty")));
        }
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(reason: &str, amount: &str, date: &str) -> ExpenseFields {
        ExpenseFields {
            reason: reason.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn validate_builds_payload() {
        let payload = fields(" Lunch ", "500", "2024-05-01").validate().unwrap();
        assert_eq!(payload.reason, "Lunch");
        assert_eq!(payload.amount, Amount::from_cents(50_000));
        assert_eq!(payload.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert_eq!(
            fields("", "500", "2024-05-01").validate().unwrap_err(),
            ExpenseError::Validation("Reason is required".to_string())
        );
        assert_eq!(
            fields("Lunch", " ", "2024-05-01").validate().unwrap_err(),
            ExpenseError::Validation("Amount is required".to_string())
        );
        assert_eq!(
            fields("Lunch", "500", "").validate().unwrap_err(),
            ExpenseError::Validation("Date is required".to_string())
        );
    }

    #[test]
    fn validate_rejects_negative_or_non_numeric_amount() {
        assert_eq!(
            fields("Lunch", "-5", "2024-05-01").validate().unwrap_err(),
            ExpenseError::Validation("Amount must not be negative".to_string())
        );
        assert_eq!(
            fields("Lunch", "five", "2024-05-01").validate().unwrap_err(),
            ExpenseError::Validation("Amount must be a number".to_string())
        );
    }

    #[test]
    fn bill_image_url_uses_uploads_path() {
        let expense = Expense {
            id: ExpenseId(1),
            reason: "Lunch".to_string(),
            amount: Amount::from_cents(500),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            bill_image: Some("bill.png".to_string()),
        };
        let base = Url::parse("http://localhost:3000/").unwrap();
        assert_eq!(
            expense.bill_image_url(&base).unwrap().as_str(),
            "http://localhost:3000/uploads/bill.png"
        );
    }

    #[test]
    fn view_with_timestamp_is_normalized() {
        let view = ExpenseView {
            expense_id: 4,
            reason: "Taxi".to_string(),
            amount: Amount::from_cents(1200),
            date: "2024-05-01T00:00:00.000Z".to_string(),
            bill_img: Some(String::new()),
        };
        let expense = Expense::try_from(view).unwrap();
        assert_eq!(expense.date.to_string(), "2024-05-01");
        assert_eq!(expense.bill_image, None);
    }

    #[test]
    fn attachment_requires_image_extension() {
        assert!(ImageAttachment::new("receipt.PNG", vec![1, 2, 3]).is_ok());
        assert!(ImageAttachment::new("notes.txt", vec![1]).is_err());
        assert!(ImageAttachment::new("empty.jpg", Vec::new()).is_err());
    }

    #[test]
    fn expense_id_parses_positive_numbers_only() {
        assert_eq!("12".parse::<ExpenseId>().unwrap(), ExpenseId(12));
        assert!("0".parse::<ExpenseId>().is_err());
        assert!("abc".parse::<ExpenseId>().is_err());
    }
}
