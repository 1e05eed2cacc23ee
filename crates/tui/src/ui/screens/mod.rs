pub mod expenses;
pub mod login;
