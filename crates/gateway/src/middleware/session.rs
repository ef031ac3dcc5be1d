//! Cookie-based session resolution
//!
//! Every request under the session layer gets a [`CurrentSession`]
//! extension. A visitor without a valid cookie gets a fresh session and a
//! `Set-Cookie` header on the response.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use redscope_common::session::SharedSession;
use uuid::Uuid;

/// The session a request belongs to
#[derive(Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub state: SharedSession,
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.as_str();
    let presented = session_cookie(request.headers(), cookie_name);
    let (id, session, created) = state.sessions.resolve(presented).await;

    request
        .extensions_mut()
        .insert(CurrentSession { id, state: session });

    let mut response = next.run(request).await;

    // A handler that already set the cookie (session teardown) wins
    if created && !response.headers().contains_key(header::SET_COOKIE) {
        if let Ok(value) = HeaderValue::from_str(&session_cookie_header(cookie_name, id)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// `Set-Cookie` value binding the browser to a session
pub fn session_cookie_header(name: &str, id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, id)
}

/// `Set-Cookie` value that drops the session cookie
pub fn expired_cookie_header(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Session id carried by the request's cookies, if any parses
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for cookie in cookies {
            map.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        map
    }

    #[test]
    fn test_finds_named_cookie() {
        let id = Uuid::new_v4();
        let cookie = format!("theme=dark; redscope_session={}; other=1", id);
        let map = headers(&[cookie.as_str()]);
        assert_eq!(session_cookie(&map, "redscope_session"), Some(id));
    }

    #[test]
    fn test_ignores_garbage_and_other_names() {
        assert_eq!(session_cookie(&headers(&["redscope_session=not-a-uuid"]), "redscope_session"), None);
        assert_eq!(session_cookie(&headers(&["session=abc"]), "redscope_session"), None);
        assert_eq!(session_cookie(&HeaderMap::new(), "redscope_session"), None);
    }

    #[test]
    fn test_cookie_headers() {
        let id = Uuid::nil();
        assert_eq!(
            session_cookie_header("s", id),
            "s=00000000-0000-0000-0000-000000000000; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_cookie_header("s").contains("Max-Age=0"));
    }
}
