use crate::errors::ConsoleError;
use crate::model::employee::{Employee, EmployeeStatus};
use crate::resource::Resource;
use crate::session::context::SessionContext;
use crate::state::AppState;
use crate::utils::format::money_rounded;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use utoipa::ToSchema;

const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentCount {
    #[schema(example = "Finance")]
    pub name: String,
    pub count: usize,
    /// Share of all employees, rounded to a whole percent
    #[schema(example = 25)]
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Headcount {
    pub total: usize,
    pub active: usize,
    pub active_percentage: u32,
    pub on_leave: usize,
    pub on_leave_percentage: u32,
    pub inactive: usize,
    /// Mean salary over employees that have one, rounded
    pub average_salary: i64,
    #[schema(example = "5,250 SAR")]
    pub average_salary_label: String,
    pub departments: Vec<DepartmentCount>,
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

impl Headcount {
    pub fn tally(employees: &[Employee], currency: &str) -> Self {
        let total = employees.len();
        let with_status = |wanted: EmployeeStatus| {
            employees
                .iter()
                .filter(|e| e.status() == Some(wanted))
                .count()
        };
        let active = with_status(EmployeeStatus::Active);
        let on_leave = with_status(EmployeeStatus::OnLeave);

        let salaries: Vec<f64> = employees.iter().filter_map(|e| e.salary).collect();
        let average = if salaries.is_empty() {
            0.0
        } else {
            salaries.iter().sum::<f64>() / salaries.len() as f64
        };

        let mut by_department: BTreeMap<&str, usize> = BTreeMap::new();
        for employee in employees {
            let name = employee
                .department
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(UNASSIGNED);
            *by_department.entry(name).or_default() += 1;
        }
        let mut departments: Vec<DepartmentCount> = by_department
            .into_iter()
            .map(|(name, count)| DepartmentCount {
                name: name.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect();
        // Largest first; ties keep alphabetical order.
        departments.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            total,
            active,
            active_percentage: percentage(active, total),
            on_leave,
            on_leave_percentage: percentage(on_leave, total),
            inactive: with_status(EmployeeStatus::Inactive),
            average_salary: average.round() as i64,
            average_salary_label: money_rounded(average, currency),
            departments,
        }
    }
}

#[utoipa::path(
    get,
    path = "/console/dashboard",
    responses(
        (status = 200, description = "Headcount summary", body = Headcount),
        (status = 401, description = "No console session"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Console"
)]
pub async fn headcount(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, ConsoleError> {
    let employees: Vec<Employee> = state
        .api(&session)
        .fetch_collection(Employee::ENDPOINT)
        .await?;
    debug!(count = employees.len(), "Employees loaded for dashboard");

    Ok(HttpResponse::Ok().json(Headcount::tally(&employees, &state.config.currency_suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{console, signed_in};
    use crate::backend::fake::InMemoryBackend;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn staff() -> Vec<Value> {
        vec![
            json!({
                "id": 1,
                "name": "Sara",
                "department": "Finance",
                "status": "نشط",
                "salary": "5000"
            }),
            json!({
                "id": 2,
                "name": "Omar",
                "department": "Finance",
                "status": "إجازة",
                "salary": 4000
            }),
            json!({
                "id": 3,
                "name": "Lina",
                "department": "IT",
                "status": "active",
                "salary": 6500
            }),
            json!({ "id": 4, "name": "Adel", "status": "غير نشط" }),
        ]
    }

    #[test]
    fn tally_counts_statuses_and_departments() {
        let employees: Vec<Employee> = serde_json::from_value(Value::Array(staff())).unwrap();
        let headcount = Headcount::tally(&employees, "SAR");

        assert_eq!(headcount.total, 4);
        assert_eq!(headcount.active, 2);
        assert_eq!(headcount.active_percentage, 50);
        assert_eq!(headcount.on_leave, 1);
        assert_eq!(headcount.inactive, 1);
        assert_eq!(headcount.average_salary, 5167);
        assert_eq!(headcount.average_salary_label, "5,167 SAR");
        assert_eq!(
            headcount.departments[0],
            DepartmentCount {
                name: "Finance".into(),
                count: 2,
                percentage: 50
            }
        );
        assert_eq!(headcount.departments.len(), 3);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(4, 4, 100)]
    fn percentages_are_rounded(#[case] part: usize, #[case] total: usize, #[case] expected: u32) {
        assert_eq!(percentage(part, total), expected);
    }

    #[actix_web::test]
    async fn dashboard_reads_the_employee_list() {
        let backend = InMemoryBackend::new().with("employees", staff());
        let (_, state, cookie) = signed_in(backend).await;
        let app = actix_test::init_service(console(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/console/dashboard")
            .cookie(cookie)
            .to_request();
        let view: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["total"], 4);
        assert_eq!(view["departments"][0]["name"], "Finance");
    }

    #[actix_web::test]
    async fn dashboard_surfaces_backend_failure() {
        let backend = InMemoryBackend::new();
        backend.go_offline();
        let (_, state, cookie) = signed_in(backend).await;
        let app = actix_test::init_service(console(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/console/dashboard")
            .cookie(cookie)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
