//! Console app wired to the in-memory backend, with a signed-in session.

use crate::backend::fake::InMemoryBackend;
use crate::config::{Config, test_config};
use crate::routes;
use crate::session::context::{SIGNED_IN_KEY, SessionContext};
use crate::session::store::{Credential, SESSION_COOKIE, session_middleware};
use crate::state::AppState;
use actix_session::Session;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpResponse, test, web};
use chrono::Utc;
use std::sync::Arc;

/// Session id of the administrator signed in by [`signed_in`].
pub const ADMIN_SESSION: &str = "admin-session";

pub async fn signed_in(
    backend: InMemoryBackend,
) -> (Arc<InMemoryBackend>, web::Data<AppState>, Cookie<'static>) {
    let backend = Arc::new(backend);
    let state = web::Data::new(AppState::new(backend.clone(), test_config()));
    let cookie = session_cookie(&state.config, Credential::new("tok-admin")).await;
    (backend, state, cookie)
}

/// Issues the session cookie the console would set after a login, without
/// going through the rate-limited login route.
pub async fn session_cookie(config: &Config, credential: Credential) -> Cookie<'static> {
    let context = SessionContext {
        session_id: ADMIN_SESSION.to_string(),
        credential,
        expires_at: Utc::now() + chrono::Duration::hours(1),
    };
    let app = test::init_service(App::new().wrap(session_middleware(config)).route(
        "/sign-in",
        web::post().to(move |session: Session| {
            let inserted = session.insert(SIGNED_IN_KEY, &context);
            async move {
                inserted.expect("session state serializes");
                HttpResponse::Ok().finish()
            }
        }),
    ))
    .await;

    let req = test::TestRequest::post().uri("/sign-in").to_request();
    let resp = test::call_service(&app, req).await;
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}

pub fn console(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let config = state.config.clone();
    App::new()
        .app_data(state)
        .configure(|cfg| routes::configure(cfg, &config))
}
