use super::context::SessionContext;
use super::store::Credential;
use crate::backend::BackendRequest;
use crate::backend::client::{rejection, rejection_message};
use crate::errors::ConsoleError;
use crate::state::AppState;
use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@company.com")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

/// What the backend answers to `POST /login`.
#[derive(Deserialize)]
struct LoginReply {
    #[serde(alias = "access_token")]
    token: String,
    #[serde(default)]
    user: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[schema(value_type = Object, nullable = true)]
    pub user: Option<Value>,
}

/* =========================
Login
========================= */
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Signed in, session cookie set", body = SessionStatus),
        (status = 401, description = "Invalid credentials", body = Object),
        (status = 422, description = "Missing email or password", body = Object),
        (status = 502, description = "Backend unreachable", body = Object)
    ),
    tag = "Session"
)]
#[instrument(name = "console_login", skip(state, session, payload), fields(email = %payload.email))]
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ConsoleError> {
    info!("Login request received");

    let LoginRequest { email, password } = payload.into_inner();
    let email = email.trim();
    if email.is_empty() {
        return Err(ConsoleError::Validation {
            field: "email",
            message: "Email is required".to_string(),
        });
    }
    if password.is_empty() {
        return Err(ConsoleError::Validation {
            field: "password",
            message: "Password is required".to_string(),
        });
    }

    let request = BackendRequest::post("/login", json!({ "email": email, "password": password }));
    let response = state.backend.send(None, request).await?;

    if !response.is_success() {
        return Err(match response.status {
            401 | 422 => {
                info!(status = response.status, "Login refused by backend");
                ConsoleError::Credentials(rejection_message(&response))
            }
            _ => rejection(&response),
        });
    }

    let reply: LoginReply = serde_json::from_slice(&response.body).map_err(|e| {
        error!(error = %e, "Login reply has no token");
        ConsoleError::Decode(e)
    })?;

    let credential = Credential {
        token: reply.token,
        user: reply.user.clone(),
    };
    SessionContext::open(&session, credential, state.config.session_ttl)?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(SessionStatus {
        authenticated: true,
        user: reply.user,
    }))
}

/* =========================
Logout
========================= */
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tag = "Session"
)]
pub async fn logout(session: Session) -> HttpResponse {
    if SessionContext::current(&session).is_some() {
        info!("Session closed");
    }

    // idempotent, even without a session
    SessionContext::close(&session);
    HttpResponse::NoContent().finish()
}

/* =========================
Session status
========================= */
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Whether the caller is signed in", body = SessionStatus)
    ),
    tag = "Session"
)]
pub async fn session_status(session: Session) -> HttpResponse {
    let context = SessionContext::current(&session);

    HttpResponse::Ok().json(SessionStatus {
        authenticated: context.is_some(),
        user: context.and_then(|c| c.credential.user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::InMemoryBackend;
    use crate::config::test_config;
    use crate::session::store::{SESSION_COOKIE, session_middleware};
    use actix_web::body::MessageBody;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, Error, test};
    use std::sync::Arc;

    fn auth_app(
        backend: Arc<InMemoryBackend>,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        let config = test_config();
        App::new()
            .wrap(session_middleware(&config))
            .app_data(web::Data::new(AppState::new(backend, config)))
            .route("/auth/login", web::post().to(login))
            .route("/auth/logout", web::post().to(logout))
            .route("/auth/session", web::get().to(session_status))
    }

    fn session_cookie(resp: &ServiceResponse<impl MessageBody>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(Cookie::into_owned)
    }

    #[actix_web::test]
    async fn login_opens_a_session_and_sets_the_cookie() {
        let app = test::init_service(auth_app(Arc::new(InMemoryBackend::new()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "hr@company.com", "password": "secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = session_cookie(&resp).expect("session cookie");
        assert!(cookie.http_only().unwrap_or(false));
        // private cookie: the bearer token is never readable client side
        assert!(!cookie.value().contains("token-for-hr@company.com"));

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .cookie(cookie)
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["authenticated"], true);
        assert_eq!(status["user"]["email"], "hr@company.com");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let app = test::init_service(auth_app(Arc::new(InMemoryBackend::new()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "hr@company.com", "password": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&resp).is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn empty_email_is_rejected_without_calling_the_backend() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = test::init_service(auth_app(backend.clone())).await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "  ", "password": "secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(backend.requests().is_empty());
    }

    #[actix_web::test]
    async fn logout_purges_the_session() {
        let app = test::init_service(auth_app(Arc::new(InMemoryBackend::new()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "hr@company.com", "password": "secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = session_cookie(&resp).expect("session cookie");

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let removal = session_cookie(&resp).expect("removal cookie");
        assert!(removal.value().is_empty());

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .cookie(removal)
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["authenticated"], false);
    }

    #[actix_web::test]
    async fn logout_without_a_session_is_fine() {
        let app = test::init_service(auth_app(Arc::new(InMemoryBackend::new()))).await;

        let req = test::TestRequest::post().uri("/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
