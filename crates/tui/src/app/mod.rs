use std::{path::Path, time::Duration};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use expense_client::{
    Applied, AuthClient, Completion, Controller, ExpenseError, ExpenseRepository, Field,
    ImageAttachment, Pending, PreviewRegistry, RequestKind, ResultExpense, Session, SessionStore,
    Url, ViewState,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Expenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub mode: LoginMode,
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
    pub notice: Option<String>,
    /// A login or register call is in flight.
    pub busy: bool,
}

impl LoginState {
    fn new(email: String) -> Self {
        let focus = if email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
        Self {
            mode: LoginMode::SignIn,
            name: String::new(),
            email,
            password: String::new(),
            focus,
            message: None,
            notice: None,
            busy: false,
        }
    }

    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            LoginMode::SignIn => &[LoginField::Email, LoginField::Password],
            LoginMode::Register => &[LoginField::Name, LoginField::Email, LoginField::Password],
        }
    }

    fn advance(&mut self, forward: bool) {
        let fields = self.fields();
        let pos = fields
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else {
            (pos + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Name => &mut self.name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::Register,
            LoginMode::Register => LoginMode::SignIn,
        };
        self.focus = self.fields()[0];
        self.password.clear();
        self.message = None;
        self.notice = None;
    }
}

/// Focus inside the create form; the last stop is the receipt path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreateFocus {
    #[default]
    Reason,
    Amount,
    Date,
    Image,
}

impl CreateFocus {
    pub const ORDER: [Self; 4] = [Self::Reason, Self::Amount, Self::Date, Self::Image];

    fn step(self, forward: bool) -> Self {
        let pos = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        Self::ORDER[next]
    }

    pub fn field(self) -> Option<Field> {
        match self {
            Self::Reason => Some(Field::Reason),
            Self::Amount => Some(Field::Amount),
            Self::Date => Some(Field::Date),
            Self::Image => None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub expenses: Controller,
    pub create_focus: CreateFocus,
    pub image_path: String,
    pub selected: usize,
    pub base_url: Url,
    pub user: Option<String>,
}

impl AppState {
    fn select_next(&mut self) {
        let len = self.expenses.expenses().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.expenses.expenses().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Results sent back to the event loop by background tasks.
#[derive(Debug)]
pub enum AppMessage {
    Expense(Completion),
    LoggedIn {
        email: String,
        result: ResultExpense<Session>,
    },
    Registered(ResultExpense<()>),
}

pub struct App {
    auth: AuthClient,
    repo: ExpenseRepository,
    store: SessionStore,
    previews: PreviewRegistry,
    session: Option<Session>,
    messages_tx: UnboundedSender<AppMessage>,
    messages_rx: UnboundedReceiver<AppMessage>,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let auth = AuthClient::new(&config.base_url)?;
        let repo = ExpenseRepository::new(&config.base_url)?;
        let store = SessionStore::new(config.session_path.clone());
        let session = store.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, path = %store.path().display(), "ignoring unreadable session");
            None
        });
        let previews = PreviewRegistry::default();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        let screen = if session.is_some() {
            Screen::Expenses
        } else {
            Screen::Login
        };
        let state = AppState {
            screen,
            login: LoginState::new(config.email.clone()),
            expenses: Controller::new(previews.clone()),
            create_focus: CreateFocus::default(),
            image_path: String::new(),
            selected: 0,
            base_url: repo.base_url().clone(),
            user: None,
        };

        Ok(Self {
            auth,
            repo,
            store,
            previews,
            session,
            messages_tx,
            messages_rx,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.drain_messages();
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages_rx.try_recv() {
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Expense(completion) => self.apply(completion),
            AppMessage::LoggedIn { email, result } => self.finish_login(email, result),
            AppMessage::Registered(result) => self.finish_register(result),
        }
    }

    fn apply(&mut self, completion: Completion) {
        let created = completion.kind == RequestKind::Create && completion.result.is_ok();
        match self.state.expenses.apply(completion) {
            Applied::Done => {
                if created {
                    self.state.image_path.clear();
                    self.state.create_focus = CreateFocus::default();
                }
                self.state.clamp_selection();
            }
            Applied::Stale => {}
            Applied::AuthFailed => {
                tracing::info!("server rejected the session");
                self.end_session(Some(ExpenseError::Auth.user_message()));
            }
            Applied::Refresh(pending) => {
                self.state.clamp_selection();
                self.dispatch(pending);
            }
        }
    }

    /// Runs the request on a background task; the result comes back through the channel.
    fn dispatch(&mut self, pending: Pending) {
        let Some(session) = self.session.clone() else {
            self.end_session(Some(ExpenseError::Auth.user_message()));
            return;
        };
        let repo = self.repo.clone();
        let tx = self.messages_tx.clone();
        tracing::debug!(kind = ?pending.request.kind(), "dispatching request");

        tokio::spawn(async move {
            let completion = pending.execute(&repo, &session).await;
            // Only fails once the app is shutting down.
            let _ = tx.send(AppMessage::Expense(completion));
        });
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Login => self.handle_login_key(action),
            Screen::Expenses => self.handle_expenses_key(action).await,
        }
    }

    fn handle_login_key(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        if login.busy {
            return;
        }
        match action {
            AppAction::ToggleRegister => login.toggle_mode(),
            AppAction::Cancel if login.mode == LoginMode::Register => login.toggle_mode(),
            AppAction::NextField => login.advance(true),
            AppAction::PrevField => login.advance(false),
            AppAction::Backspace => {
                login.active_field_mut().pop();
            }
            AppAction::Input(ch) => login.active_field_mut().push(ch),
            AppAction::Submit => match login.mode {
                LoginMode::SignIn => self.attempt_login(),
                LoginMode::Register => self.attempt_register(),
            },
            _ => {}
        }
    }

    fn attempt_login(&mut self) {
        let login = &mut self.state.login;
        let email = login.email.trim().to_string();
        let password = login.password.clone();
        login.message = None;
        login.notice = None;
        login.busy = true;

        let auth = self.auth.clone();
        let tx = self.messages_tx.clone();
        tokio::spawn(async move {
            let result = auth.login(&email, &password).await;
            let _ = tx.send(AppMessage::LoggedIn { email, result });
        });
    }

    fn finish_login(&mut self, email: String, result: ResultExpense<Session>) {
        self.state.login.busy = false;
        match result {
            Ok(session) => {
                if let Err(err) = self.store.save(&session) {
                    tracing::warn!(error = %err, "failed to persist session");
                }
                self.session = Some(session);
                self.state.user = Some(email);
                self.state.login.password.clear();
                self.state.screen = Screen::Expenses;
            }
            Err(err) => {
                tracing::debug!(error = %err, "login failed");
                self.state.login.message = Some(auth_message(&err));
            }
        }
    }

    fn attempt_register(&mut self) {
        let login = &mut self.state.login;
        let name = login.name.trim().to_string();
        let email = login.email.trim().to_string();
        let password = login.password.clone();
        login.message = None;
        login.busy = true;

        let auth = self.auth.clone();
        let tx = self.messages_tx.clone();
        tokio::spawn(async move {
            let result = auth.register(&name, &email, &password).await;
            let _ = tx.send(AppMessage::Registered(result));
        });
    }

    fn finish_register(&mut self, result: ResultExpense<()>) {
        let login = &mut self.state.login;
        login.busy = false;
        match result {
            Ok(()) => {
                login.toggle_mode();
                login.name.clear();
                login.focus = LoginField::Password;
                login.notice = Some("Registration successful, please log in.".to_string());
            }
            Err(err) => {
                tracing::debug!(error = %err, "registration failed");
                login.message = Some(auth_message(&err));
            }
        }
    }

    fn logout(&mut self) {
        tracing::info!("logging out");
        self.end_session(None);
        self.state.login.notice = Some("Logged out.".to_string());
    }

    /// Forgets the credential everywhere and returns to the login screen.
    fn end_session(&mut self, message: Option<String>) {
        self.session = None;
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored session");
        }
        // Dropping the old controller releases any receipt preview it held.
        self.state.expenses = Controller::new(self.previews.clone());
        self.state.create_focus = CreateFocus::default();
        self.state.image_path.clear();
        self.state.selected = 0;
        self.state.user = None;
        self.state.screen = Screen::Login;
        self.state.login.password.clear();
        self.state.login.notice = None;
        self.state.login.message = message;
    }

    async fn handle_expenses_key(&mut self, action: AppAction) {
        match action {
            AppAction::Logout => self.logout(),
            AppAction::Open(view) => self.open(view),
            AppAction::Refresh => self.refresh(),
            _ => match self.state.expenses.view() {
                ViewState::None | ViewState::All => self.handle_browse_key(action),
                ViewState::Create => self.handle_create_key(action).await,
                ViewState::Search => self.handle_search_key(action),
                ViewState::Delete => self.handle_delete_key(action),
            },
        }
    }

    fn open(&mut self, view: ViewState) {
        if self.state.expenses.view() == ViewState::Create && view != ViewState::Create {
            self.state.image_path.clear();
            self.state.create_focus = CreateFocus::default();
        }
        self.state.selected = 0;

        let controller = &mut self.state.expenses;
        match view {
            ViewState::None => {}
            ViewState::Create => controller.open_create(),
            ViewState::All => {
                let pending = controller.open_all();
                self.dispatch(pending);
            }
            ViewState::Search => controller.open_search(),
            ViewState::Delete => controller.open_delete(),
        }
    }

    fn refresh(&mut self) {
        if let Some(pending) = self.state.expenses.refresh() {
            self.dispatch(pending);
        }
    }

    /// Home and list views have no text input, so plain keys navigate.
    fn handle_browse_key(&mut self, action: AppAction) {
        match action {
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Input('r') => self.refresh(),
            AppAction::Input('1') => self.open(ViewState::Create),
            AppAction::Input('2') => self.open(ViewState::All),
            AppAction::Input('3') => self.open(ViewState::Search),
            AppAction::Input('4') => self.open(ViewState::Delete),
            _ => {}
        }
    }

    async fn handle_create_key(&mut self, action: AppAction) {
        let focus = self.state.create_focus;
        match action {
            AppAction::NextField => self.state.create_focus = focus.step(true),
            AppAction::PrevField => self.state.create_focus = focus.step(false),
            AppAction::Input(ch) => self.edit_create_field(|value| value.push(ch)),
            AppAction::Backspace => self.edit_create_field(|value| {
                value.pop();
            }),
            AppAction::DetachImage => {
                self.state.expenses.form_mut().detach_image();
                self.state.image_path.clear();
            }
            AppAction::Cancel => {
                self.state.expenses.cancel_create();
                self.state.image_path.clear();
                self.state.create_focus = CreateFocus::default();
            }
            AppAction::Submit if focus == CreateFocus::Image => self.attach_image().await,
            AppAction::Submit => {
                if let Some(pending) = self.state.expenses.submit_create() {
                    self.dispatch(pending);
                }
            }
            _ => {}
        }
    }

    fn edit_create_field(&mut self, edit: impl FnOnce(&mut String)) {
        match self.state.create_focus.field() {
            Some(field) => {
                let form = self.state.expenses.form_mut();
                let mut value = form.field(field).to_string();
                edit(&mut value);
                form.set_field(field, value);
            }
            None => edit(&mut self.state.image_path),
        }
    }

    async fn attach_image(&mut self) {
        let path = self.state.image_path.trim().to_string();
        if path.is_empty() {
            self.state.expenses.form_mut().detach_image();
            return;
        }
        match load_image(Path::new(&path)).await {
            Ok(image) => {
                let preview = self.state.expenses.form_mut().attach_image(image);
                tracing::debug!(label = preview.label(), "receipt attached");
            }
            Err(err) => self.state.expenses.report(&err),
        }
    }

    fn handle_search_key(&mut self, action: AppAction) {
        let controller = &mut self.state.expenses;
        match action {
            AppAction::Input(ch) => {
                let mut value = controller.search_date().to_string();
                value.push(ch);
                controller.set_search_date(value);
            }
            AppAction::Backspace => {
                let mut value = controller.search_date().to_string();
                value.pop();
                controller.set_search_date(value);
            }
            AppAction::Cancel => controller.set_search_date(""),
            AppAction::Submit => {
                self.state.selected = 0;
                if let Some(pending) = self.state.expenses.search() {
                    self.dispatch(pending);
                }
            }
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            _ => {}
        }
    }

    fn handle_delete_key(&mut self, action: AppAction) {
        let controller = &mut self.state.expenses;
        match action {
            AppAction::Input(ch) => {
                let mut value = controller.delete_input().to_string();
                value.push(ch);
                controller.set_delete_input(value);
            }
            AppAction::Backspace => {
                let mut value = controller.delete_input().to_string();
                value.pop();
                controller.set_delete_input(value);
            }
            AppAction::Cancel => controller.set_delete_input(""),
            AppAction::Submit => {
                if let Some(pending) = self.state.expenses.request_delete() {
                    self.dispatch(pending);
                }
            }
            AppAction::Up | AppAction::Down => {
                if action == AppAction::Up {
                    self.state.select_prev();
                } else {
                    self.state.select_next();
                }
                let selected = self.state.selected;
                if let Some(expense) = self.state.expenses.expenses().get(selected) {
                    let id = expense.id.to_string();
                    self.state.expenses.set_delete_input(id);
                }
            }
            _ => {}
        }
    }
}

async fn load_image(path: &Path) -> std::result::Result<ImageAttachment, ExpenseError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExpenseError::Validation(format!("{} is not a file", path.display())))?;
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        ExpenseError::Validation(format!("Could not read {}: {err}", path.display()))
    })?;
    ImageAttachment::new(file_name, bytes)
}

fn auth_message(err: &ExpenseError) -> String {
    match err {
        ExpenseError::Auth => "Invalid email or password.".to_string(),
        _ => err.user_message(),
    }
}
