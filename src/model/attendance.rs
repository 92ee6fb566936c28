use crate::errors::ConsoleError;
use crate::model::employee::EmbeddedEmployee;
use crate::resource::shaping::{
    date_part, optional_time, required_date, required_id, time_of_day, to_compact_json,
};
use crate::resource::{Badge, FormContext, Payload, Resource, Searchable, Tone};
use crate::utils::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, alias = "check_in_time", deserialize_with = "lenient::opt_string")]
    pub check_in: Option<String>,
    #[serde(default, alias = "check_out_time", deserialize_with = "lenient::opt_string")]
    pub check_out: Option<String>,
    /// Computed by the backend, never sent.
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub late_minutes: Option<u64>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AttendanceDraft {
    #[schema(example = 7)]
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[schema(value_type = Option<String>, format = "date", example = "2024-05-01")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
    /// `HH:MM`, or a date-time whose time of day is kept
    #[schema(example = "2024-05-01T08:05")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub check_in: Option<String>,
    #[schema(example = "17:00")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub check_out: Option<String>,
}

impl Searchable for Attendance {
    fn search_fields(&self) -> Vec<&str> {
        self.date.as_deref().into_iter().collect()
    }

    fn in_category(&self, employee_id: &str) -> bool {
        employee_id
            .parse::<u64>()
            .is_ok_and(|id| self.employee_id == Some(id))
    }
}

impl Resource for Attendance {
    type Draft = AttendanceDraft;

    const KEY: &'static str = "attendance";
    const ENDPOINT: &'static str = "/attendances";
    const TITLE: &'static str = "Attendance";
    const NOUN: &'static str = "attendance record";
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

    fn badge(&self) -> Option<Badge> {
        match self.late_minutes? {
            0 => Some(Badge::new(Tone::Success, "On time")),
            minutes => Some(Badge::new(Tone::Danger, format!("{minutes} min late"))),
        }
    }

    fn edit_draft(&self) -> AttendanceDraft {
        AttendanceDraft {
            employee_id: self.employee_id,
            date: self.date.as_deref().and_then(date_part),
            check_in: self.check_in.as_deref().and_then(time_of_day),
            check_out: self.check_out.as_deref().and_then(time_of_day),
        }
    }

    fn prepare(draft: AttendanceDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let shaped = AttendanceDraft {
            employee_id: Some(required_id("employee_id", draft.employee_id)?),
            date: Some(required_date("date", ctx.date_or_today(draft.date))?),
            check_in: optional_time("check_in", draft.check_in.as_deref())?,
            check_out: optional_time("check_out", draft.check_out.as_deref())?,
        };
        Ok(Payload::Json(to_compact_json(&shaped)?))
    }
}
