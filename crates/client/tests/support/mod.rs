//! In-process fake of the expenses API used by the integration tests.
#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use api_types::{
    Amount, ErrorBody,
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    expense::{BILL_IMAGE_FIELD, ExpenseCreated, ExpenseNew, ExpenseView},
};
use axum::{
    Json, Router,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::Deserialize;

pub const TOKEN: &str = "test-token";
pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Multipart,
}

#[derive(Debug, Clone)]
pub struct Stored {
    pub reason: String,
    pub amount: Amount,
    pub date: String,
    pub bill_img: Option<String>,
}

#[derive(Debug, Default)]
pub struct Inner {
    pub expenses: BTreeMap<i64, Stored>,
    pub next_id: i64,
    pub users: Vec<String>,
    pub fail_search: bool,
    pub timestamps: bool,
    pub encodings: Vec<Encoding>,
    pub uploads: Vec<(String, Vec<u8>)>,
    pub list_hits: usize,
    pub search_hits: usize,
    pub add_hits: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeServer {
    inner: Arc<Mutex<Inner>>,
}

struct FakeError(StatusCode, &'static str);

impl IntoResponse for FakeError {
    fn into_response(self) -> Response {
        (
            self.0,
            Json(ErrorBody {
                error: self.1.to_string(),
            }),
        )
            .into_response()
    }
}

impl FakeServer {
    pub fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Stores an expense the way the database would, returning its id.
    pub fn seed(&self, reason: &str, amount: &str, date: &str, bill_img: Option<&str>) -> i64 {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.expenses.insert(
            id,
            Stored {
                reason: reason.to_string(),
                amount: amount.parse().unwrap(),
                date: date.to_string(),
                bill_img: bill_img.map(str::to_string),
            },
        );
        id
    }

    pub fn fail_search(&self, fail: bool) {
        self.state().fail_search = fail;
    }

    /// Return dates as UTC timestamps instead of plain dates.
    pub fn use_timestamps(&self, on: bool) {
        self.state().timestamps = on;
    }

    /// Binds an ephemeral port and serves the fake API on it.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

fn router(server: FakeServer) -> Router {
    let protected = Router::new()
        .route("/api/expenses/all", get(list_all))
        .route("/api/expenses/add", post(add))
        .route("/api/expenses/search", get(search))
        .route("/api/expenses/delete/{id}", delete(remove))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .merge(protected)
        .with_state(server)
}

async fn auth(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, FakeError> {
    match bearer {
        Some(TypedHeader(header)) if header.token() == TOKEN => Ok(next.run(request).await),
        _ => Err(FakeError(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

fn view(id: i64, stored: &Stored, timestamps: bool) -> ExpenseView {
    let date = if timestamps {
        format!("{}T00:00:00.000Z", stored.date)
    } else {
        stored.date.clone()
    };
    ExpenseView {
        expense_id: id,
        reason: stored.reason.clone(),
        amount: stored.amount,
        date,
        bill_img: stored.bill_img.clone(),
    }
}

async fn list_all(State(server): State<FakeServer>) -> Json<Vec<ExpenseView>> {
    let mut state = server.state();
    state.list_hits += 1;
    let timestamps = state.timestamps;
    Json(
        state
            .expenses
            .iter()
            .map(|(id, stored)| view(*id, stored, timestamps))
            .collect(),
    )
}

#[derive(Deserialize)]
struct SearchParams {
    date: String,
}

async fn search(
    State(server): State<FakeServer>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ExpenseView>>, FakeError> {
    let mut state = server.state();
    state.search_hits += 1;
    if state.fail_search {
        return Err(FakeError(StatusCode::INTERNAL_SERVER_ERROR, "search unavailable"));
    }
    let timestamps = state.timestamps;
    Ok(Json(
        state
            .expenses
            .iter()
            .filter(|(_, stored)| stored.date == params.date)
            .map(|(id, stored)| view(*id, stored, timestamps))
            .collect(),
    ))
}

async fn add(
    State(server): State<FakeServer>,
    request: Request,
) -> Result<(StatusCode, Json<ExpenseCreated>), FakeError> {
    server.state().add_hits += 1;

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let (new, upload, encoding) = if is_multipart {
        let multipart = Multipart::from_request(request, &server)
            .await
            .map_err(|_| FakeError(StatusCode::BAD_REQUEST, "bad multipart body"))?;
        let (new, upload) = read_multipart(multipart).await?;
        (new, upload, Encoding::Multipart)
    } else {
        let Json(new) = Json::<ExpenseNew>::from_request(request, &server)
            .await
            .map_err(|_| FakeError(StatusCode::BAD_REQUEST, "bad json body"))?;
        (new, None, Encoding::Json)
    };

    let mut state = server.state();
    state.encodings.push(encoding);
    let date = new.date.format("%Y-%m-%d").to_string();
    let duplicate = state.expenses.values().any(|stored| {
        stored.reason == new.reason && stored.amount == new.amount && stored.date == date
    });
    if duplicate {
        return Err(FakeError(StatusCode::CONFLICT, "Duplicate expense"));
    }

    let bill_img = upload.map(|(name, bytes)| {
        let stored_name = format!("{}-{name}", state.next_id + 1);
        state.uploads.push((stored_name.clone(), bytes));
        stored_name
    });
    state.next_id += 1;
    let id = state.next_id;
    state.expenses.insert(
        id,
        Stored {
            reason: new.reason,
            amount: new.amount,
            date,
            bill_img,
        },
    );
    Ok((StatusCode::CREATED, Json(ExpenseCreated { expense_id: id })))
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(ExpenseNew, Option<(String, Vec<u8>)>), FakeError> {
    let bad = || FakeError(StatusCode::BAD_REQUEST, "bad multipart field");
    let mut text: BTreeMap<String, String> = BTreeMap::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|_| bad())? {
        let name = field.name().unwrap_or_default().to_string();
        if name == BILL_IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|_| bad())?;
            upload = Some((file_name, bytes.to_vec()));
        } else {
            text.insert(name, field.text().await.map_err(|_| bad())?);
        }
    }

    let get = |key: &str| text.get(key).cloned().ok_or_else(bad);
    let new = ExpenseNew {
        reason: get("reason")?,
        amount: get("amount")?
            .parse()
            .map_err(|_| FakeError(StatusCode::UNPROCESSABLE_ENTITY, "bad amount"))?,
        date: get("date")?
            .parse()
            .map_err(|_| FakeError(StatusCode::UNPROCESSABLE_ENTITY, "bad date"))?,
    };
    Ok((new, upload))
}

async fn remove(
    State(server): State<FakeServer>,
    Path(id): Path<i64>,
) -> Result<StatusCode, FakeError> {
    match server.state().expenses.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(FakeError(StatusCode::NOT_FOUND, "Expense not found")),
    }
}

async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<LoginResponse>, FakeError> {
    if payload.email == EMAIL && payload.password == PASSWORD {
        return Ok(Json(LoginResponse {
            token: TOKEN.to_string(),
        }));
    }
    Err(FakeError(StatusCode::UNAUTHORIZED, "Invalid credentials"))
}

async fn register(
    State(server): State<FakeServer>,
    Json(payload): Json<RegisterRequest>,
) -> Result<StatusCode, FakeError> {
    let mut state = server.state();
    if payload.email == EMAIL || state.users.contains(&payload.email) {
        return Err(FakeError(StatusCode::CONFLICT, "Email already registered"));
    }
    state.users.push(payload.email);
    Ok(StatusCode::CREATED)
}
