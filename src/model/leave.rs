use crate::backend::BackendRequest;
use crate::errors::ConsoleError;
use crate::model::employee::EmbeddedEmployee;
use crate::resource::shaping::{date_part, required_date, required_id, to_compact_json, trimmed};
use crate::resource::{Badge, FormContext, Payload, Resource, RowAction, Searchable, Tone};
use crate::utils::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    #[default]
    Annual,
    Sick,
    Emergency,
    Maternity,
    Paternity,
    Unpaid,
    Other,
}

impl LeaveType {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual leave",
            LeaveType::Sick => "Sick leave",
            LeaveType::Emergency => "Emergency leave",
            LeaveType::Maternity => "Maternity leave",
            LeaveType::Paternity => "Paternity leave",
            LeaveType::Unpaid => "Unpaid leave",
            LeaveType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leave {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub leave_type: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    /// Set by the backend; absent on records it has not classified yet.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl Leave {
    pub fn status(&self) -> Option<LeaveStatus> {
        self.status.as_deref().and_then(|s| s.trim().parse().ok())
    }

    pub fn leave_type(&self) -> Option<LeaveType> {
        self.leave_type.trim().parse().ok()
    }

    pub fn approve_request(id: u64) -> BackendRequest {
        BackendRequest::post(format!("{}/{id}/approve", Self::ENDPOINT), json!({}))
    }

    pub fn reject_request(id: u64, notes: Option<String>) -> BackendRequest {
        BackendRequest::post(
            format!("{}/{id}/reject", Self::ENDPOINT),
            json!({ "notes": trimmed(notes) }),
        )
    }
}

/// New requests carry no status; the backend assigns `pending`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LeaveDraft {
    #[schema(example = 7)]
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub leave_type: Option<LeaveType>,
    #[schema(value_type = Option<String>, format = "date", example = "2024-06-01")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date", example = "2024-06-05")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub return_date: Option<NaiveDate>,
    #[schema(example = "Family visit")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
}

impl Searchable for Leave {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.reason.as_str(), self.leave_type.as_str()];
        fields.extend(self.leave_type().map(|t| t.label()));
        fields
    }

    fn in_category(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

impl Resource for Leave {
    type Draft = LeaveDraft;

    const KEY: &'static str = "leaves";
    const ENDPOINT: &'static str = "/leaves";
    const TITLE: &'static str = "Leave requests";
    const NOUN: &'static str = "leave request";
    const EMPLOYEE_LOOKUP: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn employee_ref(&self) -> Option<u64> {
        self.employee_id
    }

    fn embedded_employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.name.as_str()).filter(|n| !n.is_empty())
    }

    /// Pending requests can be decided; decided ones only edited or removed.
    fn row_actions(&self) -> Vec<RowAction> {
        match self.status() {
            Some(LeaveStatus::Pending) => vec![
                RowAction::Approve,
                RowAction::Reject,
                RowAction::Edit,
                RowAction::Delete,
            ],
            _ => vec![RowAction::Edit, RowAction::Delete],
        }
    }

    fn labels(&self) -> BTreeMap<&'static str, String> {
        self.leave_type()
            .map(|t| ("leave_type", t.label().to_string()))
            .into_iter()
            .collect()
    }

    fn badge(&self) -> Option<Badge> {
        Some(match self.status()? {
            LeaveStatus::Pending => Badge::new(Tone::Warning, "Pending"),
            LeaveStatus::Approved => Badge::new(Tone::Success, "Approved"),
            LeaveStatus::Rejected => Badge::new(Tone::Danger, "Rejected"),
        })
    }

    fn edit_draft(&self) -> LeaveDraft {
        LeaveDraft {
            employee_id: self.employee_id,
            leave_type: self.leave_type(),
            start_date: self.start_date.as_deref().and_then(date_part),
            end_date: self.end_date.as_deref().and_then(date_part),
            return_date: self.return_date.as_deref().and_then(date_part),
            reason: Some(self.reason.clone()).filter(|r| !r.is_empty()),
            notes: self.notes.clone(),
        }
    }

    fn prepare(draft: LeaveDraft, _: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let start = required_date("start_date", draft.start_date)?;
        let end = required_date("end_date", draft.end_date)?;
        if end < start {
            return Err(ConsoleError::Validation {
                field: "end_date",
                message: "End date must not be before the start date".to_string(),
            });
        }

        let shaped = LeaveDraft {
            employee_id: Some(required_id("employee_id", draft.employee_id)?),
            leave_type: Some(draft.leave_type.unwrap_or_default()),
            start_date: Some(start),
            end_date: Some(end),
            return_date: draft.return_date,
            reason: trimmed(draft.reason),
            notes: trimmed(draft.notes),
        };
        Ok(Payload::Json(to_compact_json(&shaped)?))
    }
}
