use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::middleware::session::{FlashLevel, Session};
use crate::router::AppState;
use crate::views;

const INVALID_CREDENTIALS: &str = "Invalid credentials. Try again.";
const MISSING_FIELDS: &str = "Please fill in all fields.";
const USERNAME_TAKEN: &str = "Username already exists. Choose a different username.";
const STORE_UNAVAILABLE: &str = "The user database is unavailable. Try again later.";

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsForm {
    /// Both fields, when present and non-empty.
    fn filled(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|s| !s.is_empty())?;
        let password = self.password.as_deref().filter(|s| !s.is_empty())?;
        Some((username, password))
    }
}

/// GET /login
pub async fn login_form(session: Session) -> Response {
    render_login(session)
}

/// POST /login -> verify credentials, start a session and go to the profile.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let Some((username, password)) = form.filled() else {
        return render_login(session.flash(FlashLevel::Danger, INVALID_CREDENTIALS));
    };

    match state.store.verify_user(username, password).await {
        Ok(Some(_)) => {
            info!(%username, "login succeeded");
            let session = session
                .flash(FlashLevel::Success, "Login successful!")
                .login(username);
            (session, Redirect::to(&views::profile_path(username))).into_response()
        }
        Ok(None) => {
            info!(%username, "login rejected");
            render_login(session.flash(FlashLevel::Danger, INVALID_CREDENTIALS))
        }
        Err(e) => store_fault(session, e, "login"),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> (Session, Redirect) {
    if let Some(username) = session.username() {
        info!(%username, "logout");
    }
    let session = session
        .logout()
        .flash(FlashLevel::Success, "Logout successful!");
    (session, Redirect::to("/"))
}

/// GET /register
pub async fn register_form(session: Session) -> Response {
    render_register(session)
}

/// POST /register -> create the user unless the name is taken.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let Some((username, password)) = form.filled() else {
        return render_register(session.flash(FlashLevel::Danger, MISSING_FIELDS));
    };

    match state.store.create_user(username, password).await {
        Ok(true) => {
            let session = session.flash(FlashLevel::Success, "Registration successful!");
            (session, Redirect::to("/")).into_response()
        }
        Ok(false) => render_register(session.flash(FlashLevel::Danger, USERNAME_TAKEN)),
        Err(e) => store_fault(session, e, "register"),
    }
}

/// GET /user/{username}
pub async fn user_profile(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    match state.store.find_user_by_username(&username).await {
        Ok(Some(user)) => {
            let (session, flashes) = session.take_flashes();
            (session, views::user_profile(&flashes, &user)).into_response()
        }
        Ok(None) => {
            let session = session.flash(FlashLevel::Danger, "User not found.");
            (session, Redirect::to("/login")).into_response()
        }
        Err(e) => store_fault(session, e, "user_profile"),
    }
}

fn render_login(session: Session) -> Response {
    let (session, flashes) = session.take_flashes();
    (session, views::login(&flashes)).into_response()
}

fn render_register(session: Session) -> Response {
    let (session, flashes) = session.take_flashes();
    (session, views::register(&flashes)).into_response()
}

fn store_fault(session: Session, err: AppError, action: &'static str) -> Response {
    warn!(error = %err, action, "user store request failed");
    let session = session.flash(FlashLevel::Danger, STORE_UNAVAILABLE);
    (session, Redirect::to("/")).into_response()
}
