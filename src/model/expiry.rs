use crate::errors::ConsoleError;
use crate::resource::{Badge, Searchable, Tone};
use crate::utils::{csv, format, lenient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Classification assigned by the backend from the days remaining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Attention,
    Valid,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ExpiryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::Critical => "Critical",
            ExpiryStatus::Warning => "Warning",
            ExpiryStatus::Attention => "Attention",
            ExpiryStatus::Valid => "Valid",
            ExpiryStatus::Unknown => "Unspecified",
        }
    }

    pub fn badge(&self) -> Badge {
        let tone = match self {
            ExpiryStatus::Expired | ExpiryStatus::Critical => Tone::Danger,
            ExpiryStatus::Warning => Tone::Warning,
            ExpiryStatus::Attention => Tone::Info,
            ExpiryStatus::Valid => Tone::Success,
            ExpiryStatus::Unknown => Tone::Neutral,
        };
        Badge::new(tone, self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdResidence,
    Passport,
    MedicalInsurance,
    #[default]
    #[serde(other)]
    Other,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::IdResidence => "ID / Residence",
            DocumentKind::Passport => "Passport",
            DocumentKind::MedicalInsurance => "Medical insurance",
            DocumentKind::Other => "Document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringDocument {
    #[serde(default, rename = "type")]
    pub kind: DocumentKind,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub days_remaining: f64,
    #[serde(default)]
    pub status: ExpiryStatus,
}

impl ExpiringDocument {
    pub fn days(&self) -> i64 {
        self.days_remaining.round() as i64
    }

    pub fn view(&self) -> ExpiringDocumentView {
        ExpiringDocumentView {
            kind: self.kind,
            kind_label: self.kind.label(),
            number: self.number.clone(),
            expiry_date: self.expiry_date.clone(),
            days_remaining: self.days(),
            days_label: format::days_remaining(self.days()),
            badge: self.status.badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringEmployee {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub employee_name: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub employee_number: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub department: String,
    #[serde(default)]
    pub expiring_documents: Vec<ExpiringDocument>,
}

impl Searchable for ExpiringEmployee {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.employee_name.as_str(),
            self.employee_number.as_str(),
            self.department.as_str(),
        ]
    }

    /// Kept when any of the employee's documents is of the wanted kind.
    fn in_category(&self, kind: &str) -> bool {
        lenient::variant::<DocumentKind>(kind)
            .is_some_and(|kind| self.expiring_documents.iter().any(|doc| doc.kind == kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExpiringDocumentView {
    pub kind: DocumentKind,
    pub kind_label: &'static str,
    pub number: Option<String>,
    pub expiry_date: Option<String>,
    pub days_remaining: i64,
    #[schema(example = "Expires tomorrow")]
    pub days_label: String,
    pub badge: Badge,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExpiringEmployeeView {
    pub employee_id: Option<u64>,
    pub employee_name: String,
    pub employee_number: String,
    pub department: String,
    pub documents: Vec<ExpiringDocumentView>,
}

impl From<&ExpiringEmployee> for ExpiringEmployeeView {
    fn from(employee: &ExpiringEmployee) -> Self {
        Self {
            employee_id: employee.employee_id,
            employee_name: employee.employee_name.clone(),
            employee_number: employee.employee_number.clone(),
            department: employee.department.clone(),
            documents: employee.expiring_documents.iter().map(ExpiringDocument::view).collect(),
        }
    }
}

/// The backend answers `{"employees": [...]}`; a bare array is accepted too.
pub fn expiring_employees(value: Value) -> Result<Vec<ExpiringEmployee>, ConsoleError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => match map.remove("employees") {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(list) => Ok(serde_json::from_value(list)?),
        },
        other => Err(ConsoleError::Decode(serde::de::Error::custom(format!(
            "expected the expiring employees list, got {other}"
        )))),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct KindCounts {
    pub expired: u64,
    pub critical: u64,
    pub warning: u64,
    pub attention: u64,
    pub valid: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExpiryStatistics {
    pub total_employees: u64,
    pub id_residence: KindCounts,
    pub passport: KindCounts,
    pub medical_insurance: KindCounts,
}

impl ExpiryStatistics {
    fn kinds(&self) -> [&KindCounts; 3] {
        [&self.id_residence, &self.passport, &self.medical_insurance]
    }

    pub fn expired(&self) -> u64 {
        self.kinds().iter().map(|k| k.expired).sum()
    }

    pub fn critical(&self) -> u64 {
        self.kinds().iter().map(|k| k.critical).sum()
    }

    pub fn warning(&self) -> u64 {
        self.kinds().iter().map(|k| k.warning).sum()
    }
}

pub const CSV_HEADER: [&str; 8] = [
    "Employee name",
    "Employee number",
    "Department",
    "Document type",
    "Document number",
    "Expiry date",
    "Days remaining",
    "Status",
];

/// One line per expiring document of the given employees.
pub fn csv_report(employees: &[ExpiringEmployee]) -> String {
    let rows: Vec<Vec<String>> = employees
        .iter()
        .flat_map(|employee| {
            employee.expiring_documents.iter().map(move |doc| {
                vec![
                    employee.employee_name.clone(),
                    employee.employee_number.clone(),
                    employee.department.clone(),
                    doc.kind.label().to_string(),
                    doc.number.clone().unwrap_or_default(),
                    doc.expiry_date.clone().unwrap_or_default(),
                    doc.days().to_string(),
                    doc.status.label().to_string(),
                ]
            })
        })
        .collect();

    csv::document(&CSV_HEADER, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::filter::{ListQuery, apply};
    use serde_json::json;

    fn report() -> Vec<ExpiringEmployee> {
        expiring_employees(json!({
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
                        },
                        {
                            "type": "id_residence",
                            "number": null,
                            "expiry_date": "2024-04-20",
                            "days_remaining": -11,
                            "status": "expired"
                        }
                    ]
                },
                {
                    "employee_id": "2",
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
        }))
        .unwrap()
    }

    #[test]
    fn filters_by_document_kind_and_search() {
        let employees = report();
        let by_kind = ListQuery {
            search: None,
            category: Some("passport".into()),
        };
        assert_eq!(apply(&employees, &by_kind).len(), 1);

        let by_number = ListQuery {
            search: Some("emp-002".into()),
            category: Some("all".into()),
        };
        let found = apply(&employees, &by_number);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].employee_name, "Omar");
    }

    #[test]
    fn csv_has_one_row_per_document_and_quotes_separators() {
        let csv = csv_report(&report());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "Sara Ahmed,EMP-001,\"Sales, East\",Passport,P123,2024-05-02,1,Critical"
        );
        assert_eq!(
            lines[2],
            "Sara Ahmed,EMP-001,\"Sales, East\",ID / Residence,,2024-04-20,-11,Expired"
        );
    }

    #[test]
    fn unknown_values_do_not_break_the_report() {
        let employees = expiring_employees(json!([{
            "employee_name": "X",
            "expiring_documents": [{ "type": "visa", "days_remaining": "0", "status": "pending" }]
        }]))
        .unwrap();
        let view = employees[0].expiring_documents[0].view();
        assert_eq!(view.kind, DocumentKind::Other);
        assert_eq!(view.days_label, "Expires today");
        assert_eq!(view.badge.label, "Unspecified");
    }

    #[test]
    fn statistics_sum_across_kinds() {
        let stats: ExpiryStatistics = serde_json::from_value(json!({
            "total_employees": 12,
            "id_residence": { "expired": 1, "critical": 2 },
            "passport": { "expired": 3, "warning": 1 }
        }))
        .unwrap();
        assert_eq!(stats.expired(), 4);
        assert_eq!(stats.critical(), 2);
        assert_eq!(stats.warning(), 1);
    }
}
