use crate::errors::ConsoleError;
use crate::resource::shaping::{date_part, optional_time, required, to_compact_json, trimmed};
use crate::resource::{Badge, FormContext, Payload, Resource, Searchable, Tone};
use crate::utils::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Employment status. The backend stores the Arabic labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmployeeStatus {
    #[serde(rename = "نشط", alias = "active")]
    #[strum(to_string = "نشط", serialize = "active")]
    Active,
    #[serde(rename = "إجازة", alias = "on-leave", alias = "on_leave")]
    #[strum(to_string = "إجازة", serialize = "on-leave", serialize = "on_leave")]
    OnLeave,
    #[serde(rename = "غير نشط", alias = "inactive")]
    #[strum(to_string = "غير نشط", serialize = "inactive")]
    Inactive,
}

impl EmployeeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::OnLeave => "On leave",
            EmployeeStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum WorkType {
    #[serde(rename = "دوام كامل", alias = "full-time", alias = "full_time")]
    #[strum(to_string = "دوام كامل", serialize = "full-time")]
    FullTime,
    #[serde(rename = "دوام جزئي", alias = "part-time", alias = "part_time")]
    #[strum(to_string = "دوام جزئي", serialize = "part-time")]
    PartTime,
    #[serde(rename = "مؤقت", alias = "temporary")]
    #[strum(to_string = "مؤقت", serialize = "temporary")]
    Temporary,
    #[serde(rename = "تدريب", alias = "training")]
    #[strum(to_string = "تدريب", serialize = "training")]
    Training,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    #[default]
    #[serde(rename = "SAR", alias = "sar")]
    Sar,
    #[serde(rename = "USD", alias = "usd")]
    Usd,
    #[serde(rename = "EUR", alias = "eur")]
    Eur,
}

/// Employee as listed by the backend. Fields the console does not know
/// are kept in `extra` and passed through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    /// Employee number, e.g. `EMP-001`
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub employee_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub join_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub work_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nationality: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id_residence_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id_residence_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id_residence_expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub passport_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub passport_country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub passport_issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub passport_expiry_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub basic_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub housing_allowance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub transportation_allowance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub commissions: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub other_allowances: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub work_schedule_from: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub work_schedule_to: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub weekly_work_hours: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub medical_insurance_company: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub medical_insurance_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub medical_insurance_start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub medical_insurance_end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub direct_manager: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub relative_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub home_country_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub driving_license: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub license_expiry_date: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Employee {
    pub fn status(&self) -> Option<EmployeeStatus> {
        self.status
            .as_deref()
            .and_then(|s| EmployeeStatus::from_str(s.trim()).ok())
    }
}

/// Just enough of an employee to resolve names in other pages.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeRef {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
}

/// Employee summary some endpoints embed in their records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmbeddedEmployee {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmployeeDraft {
    #[schema(example = "Sara Ahmed")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[schema(example = "EMP-001")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub employee_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[schema(value_type = Option<String>, format = "date", example = "2024-01-01")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub join_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub status: Option<EmployeeStatus>,
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub work_type: Option<WorkType>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub nationality: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub id_residence_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub id_residence_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub id_residence_expiry_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub passport_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub passport_country: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub passport_issue_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub passport_expiry_date: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient::opt_f64")]
    pub salary: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub basic_salary: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub housing_allowance: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub transportation_allowance: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub commissions: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub other_allowances: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub currency: Option<Currency>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub work_schedule_from: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub work_schedule_to: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub weekly_work_hours: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub medical_insurance_company: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub medical_insurance_category: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub medical_insurance_start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub medical_insurance_end_date: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub direct_manager: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub relative_phone: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub home_country_address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub driving_license: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub license_expiry_date: Option<NaiveDate>,
}

fn date(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref().and_then(date_part)
}

impl Searchable for Employee {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.employee_id.as_deref());
        fields
    }

    fn in_category(&self, department: &str) -> bool {
        self.department.as_deref() == Some(department)
    }
}

impl Resource for Employee {
    type Draft = EmployeeDraft;

    const KEY: &'static str = "employees";
    const ENDPOINT: &'static str = "/employees";
    const TITLE: &'static str = "Employees";
    const NOUN: &'static str = "employee";

    fn id(&self) -> u64 {
        self.id
    }

    fn badge(&self) -> Option<Badge> {
        let status = self.status()?;
        let tone = match status {
            EmployeeStatus::Active => Tone::Success,
            EmployeeStatus::OnLeave => Tone::Warning,
            EmployeeStatus::Inactive => Tone::Neutral,
        };
        Some(Badge::new(tone, status.label()))
    }

    fn edit_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            name: Some(self.name.clone()),
            employee_id: self.employee_id.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            position: self.position.clone(),
            department: self.department.clone(),
            location: self.location.clone(),
            join_date: date(&self.join_date),
            start_date: date(&self.start_date),
            status: self.status(),
            work_type: self
                .work_type
                .as_deref()
                .and_then(|w| WorkType::from_str(w.trim()).ok()),
            nationality: self.nationality.clone(),
            id_residence_type: self.id_residence_type.clone(),
            id_residence_number: self.id_residence_number.clone(),
            id_residence_expiry_date: date(&self.id_residence_expiry_date),
            passport_number: self.passport_number.clone(),
            passport_country: self.passport_country.clone(),
            passport_issue_date: date(&self.passport_issue_date),
            passport_expiry_date: date(&self.passport_expiry_date),
            salary: self.salary,
            basic_salary: self.basic_salary,
            housing_allowance: self.housing_allowance,
            transportation_allowance: self.transportation_allowance,
            commissions: self.commissions,
            other_allowances: self.other_allowances,
            currency: self.currency.as_deref().and_then(lenient::variant),
            work_schedule_from: self.work_schedule_from.clone(),
            work_schedule_to: self.work_schedule_to.clone(),
            weekly_work_hours: self.weekly_work_hours,
            medical_insurance_company: self.medical_insurance_company.clone(),
            medical_insurance_category: self.medical_insurance_category.clone(),
            medical_insurance_start_date: date(&self.medical_insurance_start_date),
            medical_insurance_end_date: date(&self.medical_insurance_end_date),
            direct_manager: self.direct_manager.clone(),
            relative_phone: self.relative_phone.clone(),
            home_country_address: self.home_country_address.clone(),
            driving_license: self.driving_license.clone(),
            license_expiry_date: date(&self.license_expiry_date),
        }
    }

    fn prepare(mut draft: EmployeeDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        draft.name = Some(required("name", draft.name.as_deref())?);
        draft.employee_id = Some(required("employee_id", draft.employee_id.as_deref())?);
        draft.email = trimmed(draft.email);

        if let Some(from) = draft.work_schedule_from.take() {
            draft.work_schedule_from = optional_time("work_schedule_from", Some(&from))?;
        }
        if let Some(to) = draft.work_schedule_to.take() {
            draft.work_schedule_to = optional_time("work_schedule_to", Some(&to))?;
        }

        if ctx.is_create() {
            draft.status.get_or_insert(EmployeeStatus::Active);
            draft.currency.get_or_insert_with(Currency::default);
        }

        Ok(Payload::Json(to_compact_json(&draft)?))
    }
}
