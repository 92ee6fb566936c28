use crate::errors::ConsoleError;
use crate::model::leave::Leave;
use crate::resource::filter::ListQuery;
use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Shown to the employee with the decision
    #[schema(example = "Overlaps with the stock count")]
    #[serde(default)]
    pub notes: Option<String>,
}

/* =========================
Approve leave request
========================= */
#[utoipa::path(
    post,
    path = "/console/leaves/{id}/approve",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Approved; refreshed leave page returned"),
        (status = 401, description = "No console session"),
        (status = 404, description = "Unknown leave request"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Leave"
)]
pub async fn approve(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let mut page = state.page::<Leave>(&session);
    page.run_action(Leave::approve_request(id)).await?;

    info!(leave_id = id, "Leave approved");
    Ok(HttpResponse::Ok().json(page.view(&ListQuery::default())))
}

/* =========================
Reject leave request
========================= */
#[utoipa::path(
    post,
    path = "/console/leaves/{id}/reject",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body(content = Option<RejectRequest>, content_type = "application/json"),
    responses(
        (status = 200, description = "Rejected; refreshed leave page returned"),
        (status = 401, description = "No console session"),
        (status = 404, description = "Unknown leave request"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Leave"
)]
pub async fn reject(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
    payload: Option<web::Json<RejectRequest>>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let notes = payload.and_then(|p| p.into_inner().notes);
    let mut page = state.page::<Leave>(&session);
    page.run_action(Leave::reject_request(id, notes)).await?;

    info!(leave_id = id, "Leave rejected");
    Ok(HttpResponse::Ok().json(page.view(&ListQuery::default())))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{console, signed_in};
    use crate::backend::fake::InMemoryBackend;
    use crate::backend::{Body, Method};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with("employees", vec![json!({ "id": 7, "name": "Sara Ahmed" })])
            .with("leaves", vec![])
            .wrapped("leaves")
    }

    #[actix_web::test]
    async fn new_leave_is_pending_and_can_be_approved() {
        let (backend, state, cookie) = signed_in(backend()).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::post()
            .uri("/console/leaves")
            .cookie(cookie.clone())
            .set_json(json!({
                "employee_id": 7,
                "leave_type": "sick",
                "start_date": "2024-06-01",
                "end_date": "2024-06-03",
                "reason": "Flu"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let view: Value = test::read_body_json(resp).await;

        let row = &view["rows"][0];
        assert_eq!(row["record"]["status"], "pending");
        assert_eq!(row["employee_name"], "Sara Ahmed");
        assert_eq!(row["actions"], json!(["approve", "reject", "edit", "delete"]));
        let id = row["id"].as_u64().unwrap();

        backend.clear_requests();
        let req = test::TestRequest::post()
            .uri(&format!("/console/leaves/{id}/approve"))
            .cookie(cookie)
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(backend.count(Method::Post, &format!("/leaves/{id}/approve")), 1);
        assert_eq!(backend.count(Method::Get, "/leaves"), 1);
        assert_eq!(view["rows"][0]["record"]["status"], "approved");
        assert_eq!(view["rows"][0]["actions"], json!(["edit", "delete"]));
    }

    #[actix_web::test]
    async fn reject_forwards_notes_and_works_without_a_body() {
        let backend = backend().with(
            "leaves",
            vec![
                json!({ "id": 1, "employee_id": 7, "leave_type": "annual", "status": "pending" }),
                json!({ "id": 2, "employee_id": 7, "leave_type": "annual", "status": "pending" }),
            ],
        );
        let (backend, state, cookie) = signed_in(backend).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::post()
            .uri("/console/leaves/1/reject")
            .cookie(cookie.clone())
            .set_json(json!({ "notes": "Busy season" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/console/leaves/2/reject")
            .cookie(cookie)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let sent: Vec<Body> = backend
            .requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/reject"))
            .map(|r| r.body)
            .collect();
        assert_eq!(
            sent,
            vec![
                Body::Json(json!({ "notes": "Busy season" })),
                Body::Json(json!({ "notes": null })),
            ]
        );
        assert!(backend.records("leaves").iter().all(|l| l["status"] == "rejected"));
    }

    #[actix_web::test]
    async fn deciding_an_unknown_leave_is_not_found() {
        let (_, state, cookie) = signed_in(backend()).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::post()
            .uri("/console/leaves/40/approve")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
