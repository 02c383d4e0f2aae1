//! HTML pages. Every interpolated value goes through [`escape`].

use std::sync::LazyLock;

use axum::response::Html;
use url::Url;

use crate::db::UserRecord;
use crate::middleware::session::Flash;

pub fn index(flashes: &[Flash], username: Option<&str>) -> Html<String> {
    let greeting = match username {
        Some(name) => format!(
            r#"<p>Logged in as <a href="{href}">{name}</a>.</p>"#,
            href = escape(&profile_path(name)),
            name = escape(name),
        ),
        None => "<p>You are not logged in.</p>".to_string(),
    };
    let body = format!(
        r#"<h1>Welcome</h1>
{greeting}
<ul>
  <li><a href="/test-redis">Test Redis connection</a></li>
  <li><a href="/test-mongodb">Test MongoDB connection</a></li>
</ul>"#
    );
    layout("Home", flashes, &body)
}

pub fn login(flashes: &[Flash]) -> Html<String> {
    layout("Login", flashes, &credentials_form("Login", "/login"))
}

pub fn register(flashes: &[Flash]) -> Html<String> {
    layout("Register", flashes, &credentials_form("Register", "/register"))
}

pub fn user_profile(flashes: &[Flash], user: &UserRecord) -> Html<String> {
    let body = format!(
        r#"<h1>Profile</h1>
<dl>
  <dt>Username</dt>
  <dd>{}</dd>
</dl>"#,
        escape(&user.username)
    );
    layout("Profile", flashes, &body)
}

static PROFILE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/user").expect("static profile base URL"));

/// Path of a user's profile page, with the username percent-encoded as a
/// single path segment.
pub fn profile_path(username: &str) -> String {
    let mut url = PROFILE_BASE.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(username);
    }
    url.path().to_string()
}

fn credentials_form(title: &str, action: &str) -> String {
    format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}">
  <label>Username <input type="text" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">{title}</button>
</form>"#
    )
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> Html<String> {
    let alerts: String = flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .collect();

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
<nav>
  <a href="/">Home</a>
  <a href="/login">Login</a>
  <a href="/register">Register</a>
  <a href="/logout">Logout</a>
</nav>
{alerts}
<main>
{body}
</main>
</body>
</html>"#
    ))
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
