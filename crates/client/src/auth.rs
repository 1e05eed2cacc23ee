use api_types::auth::{LoginRequest, LoginResponse, RegisterRequest};
use reqwest::Url;

use crate::{
    error::{ExpenseError, ResultExpense},
    http::{self, Api},
    session::Session,
};

pub const LOGIN_PATH: &str = "api/auth/login";
pub const REGISTER_PATH: &str = "api/auth/register";

/// Login and registration. Neither call needs a credential.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: Api,
}

impl AuthClient {
    pub fn new(base_url: &str) -> ResultExpense<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> ResultExpense<Self> {
        Ok(Self {
            api: Api::new(http, base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.api.base_url()
    }

    pub async fn login(&self, email: &str, password: &str) -> ResultExpense<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ExpenseError::validation("Email and password are required"));
        }

        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!("POST {LOGIN_PATH}");
        let req = self
            .api
            .http()
            .post(self.api.endpoint(LOGIN_PATH)?)
            .json(&payload);
        let res: LoginResponse = http::send_json(req).await?;
        if res.token.trim().is_empty() {
            return Err(ExpenseError::Decode("empty token in login response".to_string()));
        }

        tracing::info!("logged in");
        Ok(Session::new(res.token))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ResultExpense<()> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ExpenseError::validation(
                "Name, email and password are required",
            ));
        }
        if !email.contains('@') {
            return Err(ExpenseError::validation("Email is not valid"));
        }

        let payload = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!("POST {REGISTER_PATH}");
        let req = self
            .api
            .http()
            .post(self.api.endpoint(REGISTER_PATH)?)
            .json(&payload);
        http::send_unit(req).await?;

        tracing::info!("account registered");
        Ok(())
    }
}
