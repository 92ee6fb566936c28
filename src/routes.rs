use crate::{
    api::{crud, dashboard, document, expiry, leave, payroll, shell},
    config::Config,
    errors::ConsoleError,
    model::{
        attendance::Attendance,
        custody::Custody,
        document::Document,
        employee::Employee,
        leave::Leave,
        payment::{Advance, Allowance, OtherPayment, Penalty},
    },
    session::{handlers, middleware::session_gate, store::session_middleware},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use tracing::debug;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Malformed JSON bodies answer like any other form validation failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "Rejected request body");
        ConsoleError::Validation {
            field: "body",
            message: err.to_string(),
        }
        .into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(json_config());

    // Public routes
    let login = web::resource("/login")
        .wrap(build_limiter(config.rate_login_per_min))
        .route(web::post().to(handlers::login));

    cfg.service(
        web::scope("/auth")
            .wrap(session_middleware(config))
            .service(login)
            .service(web::resource("/logout").route(web::post().to(handlers::logout)))
            .service(web::resource("/session").route(web::get().to(handlers::session_status))),
    );

    // Console routes, behind the session gate
    cfg.service(
        web::scope(&config.console_prefix)
            .wrap(from_fn(session_gate))
            .wrap(session_middleware(config))
            .service(web::resource("").route(web::get().to(shell::menu)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard::headcount)))
            .service(
                web::scope("/payroll")
                    .service(web::resource("").route(web::get().to(payroll::overview)))
                    .service(web::resource("/summary").route(web::get().to(payroll::summary)))
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::get().to(payroll::salary_details)),
                    ),
            )
            .service(
                web::scope("/expiry")
                    .service(web::resource("").route(web::get().to(expiry::dashboard)))
                    .service(web::resource("/export").route(web::get().to(expiry::export))),
            )
            .service(
                crud::scope::<Leave>()
                    .service(web::resource("/{id}/approve").route(web::post().to(leave::approve)))
                    .service(web::resource("/{id}/reject").route(web::post().to(leave::reject))),
            )
            .service(
                crud::scope::<Document>().service(
                    web::resource("/{id}/download").route(web::get().to(document::download)),
                ),
            )
            .service(crud::scope::<Employee>())
            .service(crud::scope::<Attendance>())
            .service(crud::scope::<Custody>())
            .service(crud::scope::<OtherPayment>())
            .service(crud::scope::<Advance>())
            .service(crud::scope::<Penalty>())
            .service(crud::scope::<Allowance>()),
    );
}
