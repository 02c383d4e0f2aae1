use axum::response::Html;

use crate::middleware::session::Session;
use crate::views;

/// GET / -> home page with pending flashes and the logged-in user.
pub async fn index(session: Session) -> (Session, Html<String>) {
    let username = session.username();
    let (session, flashes) = session.take_flashes();
    (session, views::index(&flashes, username.as_deref()))
}
