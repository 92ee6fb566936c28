use crate::errors::{ConsoleError, ErrorBanner};
use crate::model::attendance::Attendance;
use crate::model::custody::Custody;
use crate::model::employee::Employee;
use crate::model::payment::{Advance, Allowance, OtherPayment, Penalty};
use crate::model::payroll::{PayrollSummary, SalaryDetails, SummaryView};
use crate::resource::Resource;
use crate::resource::page::LoadState;
use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::{HttpResponse, web};
use futures::join;
use serde::Serialize;
use tracing::{debug, error};

pub const SUMMARY_PATH: &str = "/payroll/summary";

/// One tab of the payroll page. A tab that failed to load is empty and
/// carries its own banner; the other tabs are unaffected.
#[derive(Debug, Serialize)]
pub struct Tab<T> {
    pub load: LoadState,
    pub count: usize,
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<ErrorBanner>,
}

#[derive(Debug, Serialize)]
pub struct PayrollOverview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_banner: Option<ErrorBanner>,
    pub employees: Tab<Employee>,
    pub advances: Tab<Advance>,
    pub penalties: Tab<Penalty>,
    pub allowances: Tab<Allowance>,
    pub other_payments: Tab<OtherPayment>,
    pub custodies: Tab<Custody>,
    pub attendance: Tab<Attendance>,
}

fn tab<R: Resource>(result: Result<Vec<R>, ConsoleError>, retry: &str) -> Tab<R> {
    match result {
        Ok(items) => Tab {
            load: LoadState::Loaded,
            count: items.len(),
            items,
            banner: None,
        },
        Err(e) => {
            error!(resource = R::KEY, error = %e, "Failed to load payroll tab");
            Tab {
                load: LoadState::Failed,
                count: 0,
                items: Vec::new(),
                banner: Some(e.banner().with_retry(retry)),
            }
        }
    }
}

/* =========================
Payroll overview
========================= */
#[utoipa::path(
    get,
    path = "/console/payroll",
    responses(
        (
            status = 200,
            description = "Summary plus one tab per payroll resource; failed tabs carry a banner"
        ),
        (status = 401, description = "No console session")
    ),
    tag = "Payroll"
)]
pub async fn overview(state: web::Data<AppState>, session: SessionContext) -> HttpResponse {
    let api = state.api(&session);
    let retry = format!("{}/payroll", state.config.console_prefix);

    let (
        summary,
        employees,
        advances,
        penalties,
        allowances,
        other_payments,
        custodies,
        attendance,
    ) = join!(
        api.fetch::<PayrollSummary>(SUMMARY_PATH),
        api.fetch_collection::<Employee>(Employee::ENDPOINT),
        api.fetch_collection::<Advance>(Advance::ENDPOINT),
        api.fetch_collection::<Penalty>(Penalty::ENDPOINT),
        api.fetch_collection::<Allowance>(Allowance::ENDPOINT),
        api.fetch_collection::<OtherPayment>(OtherPayment::ENDPOINT),
        api.fetch_collection::<Custody>(Custody::ENDPOINT),
        api.fetch_collection::<Attendance>(Attendance::ENDPOINT),
    );

    let (summary, summary_banner) = match summary {
        Ok(summary) => (Some(summary.view(&state.config.currency_suffix)), None),
        Err(e) => {
            error!(error = %e, "Failed to load payroll summary");
            (None, Some(e.banner().with_retry(retry.as_str())))
        }
    };

    let overview = PayrollOverview {
        summary,
        summary_banner,
        employees: tab(employees, &retry),
        advances: tab(advances, &retry),
        penalties: tab(penalties, &retry),
        allowances: tab(allowances, &retry),
        other_payments: tab(other_payments, &retry),
        custodies: tab(custodies, &retry),
        attendance: tab(attendance, &retry),
    };
    debug!(employees = overview.employees.count, "Payroll overview loaded");

    HttpResponse::Ok().json(overview)
}

/* =========================
Payroll summary
========================= */
#[utoipa::path(
    get,
    path = "/console/payroll/summary",
    responses(
        (status = 200, description = "Formatted payroll totals", body = SummaryView),
        (status = 401, description = "No console session"),
        (status = 502, description = "Backend unavailable", body = ErrorBanner)
    ),
    tag = "Payroll"
)]
pub async fn summary(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, ConsoleError> {
    let summary: PayrollSummary = state.api(&session).fetch(SUMMARY_PATH).await?;
    Ok(HttpResponse::Ok().json(summary.view(&state.config.currency_suffix)))
}

/* =========================
Salary details for one employee
========================= */
#[utoipa::path(
    get,
    path = "/console/payroll/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Formatted salary breakdown", body = SalaryView),
        (status = 401, description = "No console session"),
        (status = 404, description = "Unknown employee", body = ErrorBanner)
    ),
    tag = "Payroll"
)]
pub async fn salary_details(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let details: SalaryDetails = state
        .api(&session)
        .fetch(&format!("{}/{id}/salary-details", Employee::ENDPOINT))
        .await?;
    Ok(HttpResponse::Ok().json(details.view(&state.config.currency_suffix)))
}
