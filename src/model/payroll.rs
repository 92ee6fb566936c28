use crate::model::employee::EmbeddedEmployee;
use crate::utils::format::{money, money_rounded, thousands};
use crate::utils::lenient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Totals computed by the backend for the current payroll period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_employees: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_basic_salary: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_allowances: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_deductions: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_net_salary: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub average_net_salary: f64,
}

/// [`PayrollSummary`] ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SummaryView {
    #[schema(example = "42")]
    pub total_employees: String,
    #[schema(example = "210,000 SAR")]
    pub total_basic_salary: String,
    pub total_allowances: String,
    pub total_deductions: String,
    pub total_net_salary: String,
    #[schema(example = "5,000 SAR")]
    pub average_net_salary: String,
}

impl PayrollSummary {
    pub fn view(&self, currency: &str) -> SummaryView {
        SummaryView {
            total_employees: thousands(self.total_employees.round() as i64),
            total_basic_salary: money(self.total_basic_salary, currency),
            total_allowances: money(self.total_allowances, currency),
            total_deductions: money(self.total_deductions, currency),
            total_net_salary: money(self.total_net_salary, currency),
            average_net_salary: money_rounded(self.average_net_salary, currency),
        }
    }
}

/// One employee's salary breakdown. Lists the backend adds (advances,
/// penalties, allowances, ...) are passed through in `breakdown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryDetails {
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub basic_salary: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_allowances: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_deductions: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub net_salary: f64,
    #[serde(flatten)]
    pub breakdown: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalaryView {
    pub employee: Option<EmbeddedEmployee>,
    pub basic_salary: String,
    pub total_allowances: String,
    pub total_deductions: String,
    pub net_salary: String,
    #[schema(value_type = Object)]
    pub breakdown: Map<String, Value>,
}

impl SalaryDetails {
    pub fn view(self, currency: &str) -> SalaryView {
        SalaryView {
            employee: self.employee,
            basic_salary: money(self.basic_salary, currency),
            total_allowances: money(self.total_allowances, currency),
            total_deductions: money(self.total_deductions, currency),
            net_salary: money(self.net_salary, currency),
            breakdown: self.breakdown,
        }
    }
}
