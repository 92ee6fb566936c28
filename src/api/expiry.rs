use crate::errors::ConsoleError;
use crate::model::employee::EmployeeRef;
use crate::model::expiry::{
    ExpiringEmployee, ExpiringEmployeeView, ExpiryStatistics, csv_report, expiring_employees,
};
use crate::resource::filter::{ListQuery, apply};
use crate::resource::page::EMPLOYEE_LOOKUP_PATH;
use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use futures::join;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

pub const STATISTICS_PATH: &str = "/expiry/statistics";

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ExpiryQuery {
    /// Look-ahead window in days; the configured window when omitted
    #[schema(example = 30)]
    pub days: Option<u32>,
    #[schema(example = "sara")]
    pub search: Option<String>,
    /// Document kind (`id_residence`, `passport`, `medical_insurance`) or `all`
    #[schema(example = "passport")]
    pub category: Option<String>,
}

impl ExpiryQuery {
    fn window(&self, default_days: u32) -> Result<u32, ConsoleError> {
        match self.days.unwrap_or(default_days) {
            0 => Err(ConsoleError::Validation {
                field: "days",
                message: "The window must be at least one day".to_string(),
            }),
            days => Ok(days),
        }
    }

    fn list_query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            category: self.category.clone(),
        }
    }
}

fn expiring_path(days: u32) -> String {
    format!("/expiry/expiring-documents/{days}")
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpiryDashboard {
    pub days: u32,
    /// Employees known to the backend; absent when that lookup failed
    pub employee_count: Option<usize>,
    pub statistics: ExpiryStatistics,
    pub expired: u64,
    pub critical: u64,
    pub warning: u64,
    /// Employees with expiring documents before filtering
    pub total: usize,
    pub shown: usize,
    pub query: ListQuery,
    pub employees: Vec<ExpiringEmployeeView>,
    #[schema(example = "/console/expiry/export?days=30")]
    pub export: String,
}

/* =========================
Expiry dashboard
========================= */
#[utoipa::path(
    get,
    path = "/console/expiry",
    params(ExpiryQuery),
    responses(
        (
            status = 200,
            description = "Expiring documents within the window",
            body = ExpiryDashboard
        ),
        (status = 401, description = "No console session"),
        (status = 422, description = "Invalid window"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Expiry"
)]
pub async fn dashboard(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ExpiryQuery>,
) -> Result<HttpResponse, ConsoleError> {
    let days = query.window(state.config.expiry_window_days)?;
    let api = state.api(&session);
    let expiring_path = expiring_path(days);

    let (lookup, expiring, statistics) = join!(
        api.fetch_collection::<EmployeeRef>(EMPLOYEE_LOOKUP_PATH),
        api.fetch::<Value>(&expiring_path),
        api.fetch::<ExpiryStatistics>(STATISTICS_PATH)
    );

    let (expiring, statistics) = match (expiring.and_then(expiring_employees), statistics) {
        (Ok(expiring), Ok(statistics)) => (expiring, statistics),
        (Err(e), _) | (_, Err(e)) => {
            error!(days, error = %e, "Failed to load expiry dashboard");
            let retry = format!("{}/expiry?days={days}", state.config.console_prefix);
            return Ok(e.banner().with_retry(retry).respond());
        }
    };
    let employee_count = match lookup {
        Ok(employees) => Some(employees.len()),
        Err(e) => {
            warn!(error = %e, "Employee lookup failed");
            None
        }
    };

    let list_query = query.list_query();
    let shown = apply(&expiring, &list_query);

    Ok(HttpResponse::Ok().json(ExpiryDashboard {
        days,
        employee_count,
        expired: statistics.expired(),
        critical: statistics.critical(),
        warning: statistics.warning(),
        statistics,
        total: expiring.len(),
        shown: shown.len(),
        employees: shown.iter().map(ExpiringEmployeeView::from).collect(),
        export: format!("{}/expiry/export?days={days}", state.config.console_prefix),
        query: list_query,
    }))
}

/* =========================
CSV export of the filtered view
========================= */
#[utoipa::path(
    get,
    path = "/console/expiry/export",
    params(ExpiryQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 401, description = "No console session"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Expiry"
)]
pub async fn export(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ExpiryQuery>,
) -> Result<HttpResponse, ConsoleError> {
    let days = query.window(state.config.expiry_window_days)?;
    let value: Value = state.api(&session).fetch(&expiring_path(days)).await?;
    let expiring: Vec<ExpiringEmployee> = apply(&expiring_employees(value)?, &query.list_query());

    let file_name = format!("expiry_report_{}.csv", state.today().format("%Y-%m-%d"));
    info!(days, employees = expiring.len(), file = %file_name, "Expiry report exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(csv_report(&expiring)))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{console, signed_in};
    use crate::backend::Method;
    use crate::backend::fake::InMemoryBackend;
    use crate::model::expiry::CSV_HEADER;
    use actix_web::http::StatusCode;
    use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use actix_web::test;
    use serde_json::{Value, json};

    fn report() -> Value {
        json!({
            "employees": [
                {
                    "employee_id": 1,
                    "employee_name": "Sara Ahmed",
                    "employee_number": "EMP-001",
                    "department": "Sales, East",
                    "expiring_documents": [
                        {
                            "type": "passport",
                            "number": "P123",
                            "expiry_date": "2024-05-02",
                            "days_remaining": 1,
                            "status": "critical"
                        }
                    ]
                },
                {
                    "employee_id": 2,
                    "employee_name": "Omar",
                    "employee_number": "EMP-002",
                    "department": "IT",
                    "expiring_documents": [
                        {
                            "type": "medical_insurance",
                            "number": "M9",
                            "expiry_date": "2024-05-25",
                            "days_remaining": 24,
                            "status": "attention"
                        }
                    ]
                }
            ]
        })
    }

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with(
                "employees",
                vec![
                    json!({ "id": 1, "name": "Sara Ahmed" }),
                    json!({ "id": 2, "name": "Omar" }),
                ],
            )
            .fixture("/expiry/expiring-documents/30", report())
            .fixture("/expiry/expiring-documents/7", json!({ "employees": [] }))
            .fixture(
                "/expiry/statistics",
                json!({
                    "total_employees": 2,
                    "passport": { "critical": 1 },
                    "medical_insurance": { "attention": 1 }
                }),
            )
    }

    #[actix_web::test]
    async fn dashboard_fetches_three_sources_with_the_default_window() {
        let (backend, state, cookie) = signed_in(backend()).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::get().uri("/console/expiry").cookie(cookie).to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(backend.count(Method::Get, "/expiry/expiring-documents/30"), 1);
        assert_eq!(backend.count(Method::Get, "/expiry/statistics"), 1);
        assert_eq!(backend.count(Method::Get, "/employees"), 1);
        assert_eq!(view["days"], 30);
        assert_eq!(view["employee_count"], 2);
        assert_eq!(view["critical"], 1);
        assert_eq!(view["shown"], 2);
        assert_eq!(view["employees"][0]["documents"][0]["days_label"], "Expires tomorrow");
        assert_eq!(view["employees"][0]["documents"][0]["badge"]["tone"], "danger");
    }

    #[actix_web::test]
    async fn dashboard_filters_by_kind_and_honours_the_window() {
        let (_, state, cookie) = signed_in(backend()).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::get()
            .uri("/console/expiry?category=medical_insurance")
            .cookie(cookie.clone())
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["total"], 2);
        assert_eq!(view["shown"], 1);
        assert_eq!(view["employees"][0]["employee_name"], "Omar");

        let req = test::TestRequest::get()
            .uri("/console/expiry?days=7")
            .cookie(cookie.clone())
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["total"], 0);

        let req = test::TestRequest::get()
            .uri("/console/expiry?days=0")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn failed_report_answers_with_a_retry_link() {
        let backend = backend();
        backend.fail(Method::Get, "/expiry/statistics", 500);
        let (_, state, cookie) = signed_in(backend).await;
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::get().uri("/console/expiry").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["retry"], "/console/expiry?days=30");
    }

    #[actix_web::test]
    async fn export_serves_the_filtered_rows_as_csv() {
        let (_, state, cookie) = signed_in(backend()).await;
        let today = state.today().format("%Y-%m-%d").to_string();
        let app = test::init_service(console(state)).await;

        let req = test::TestRequest::get()
            .uri("/console/expiry/export?search=sara")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.contains(&format!("expiry_report_{today}.csv")));

        let body = test::read_body(resp).await;
        let csv = std::str::from_utf8(&body).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "Sara Ahmed,EMP-001,\"Sales, East\",Passport,P123,2024-05-02,1,Critical"
        );
    }
}
