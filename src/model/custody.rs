use crate::errors::ConsoleError;
use crate::model::employee::EmbeddedEmployee;
use crate::resource::shaping::{
    date_part, required, required_date, required_id, to_compact_json, trimmed,
};
use crate::resource::{Badge, FormContext, Payload, Resource, Searchable, Tone};
use crate::utils::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const RETURNED: &str = "returned";
pub const IN_USE: &str = "in_use";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custody {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl Custody {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn status(&self) -> &'static str {
        if self.is_returned() { RETURNED } else { IN_USE }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CustodyDraft {
    #[schema(example = 7)]
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[schema(example = "Laptop")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub item_name: Option<String>,
    #[schema(example = "LT-2291")]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub item_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub issue_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub return_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
}

impl Searchable for Custody {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.item_name.as_str()];
        fields.extend(self.item_number.as_deref());
        fields
    }

    fn in_category(&self, status: &str) -> bool {
        self.status() == status
    }
}

impl Resource for Custody {
    type Draft = CustodyDraft;

    const KEY: &'static str = "custodies";
    const ENDPOINT: &'static str = "/custodies";
    const TITLE: &'static str = "Custodies";
    const NOUN: &'static str = "custody";
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
        Some(if self.is_returned() {
            Badge::new(Tone::Success, "Returned")
        } else {
            Badge::new(Tone::Warning, "In use")
        })
    }

    fn edit_draft(&self) -> CustodyDraft {
        CustodyDraft {
            employee_id: self.employee_id,
            item_name: Some(self.item_name.clone()).filter(|n| !n.is_empty()),
            item_number: self.item_number.clone(),
            issue_date: self.issue_date.as_deref().and_then(date_part),
            return_date: self.return_date.as_deref().and_then(date_part),
            notes: self.notes.clone(),
        }
    }

    fn prepare(draft: CustodyDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let shaped = CustodyDraft {
            employee_id: Some(required_id("employee_id", draft.employee_id)?),
            item_name: Some(required("item_name", draft.item_name.as_deref())?),
            item_number: trimmed(draft.item_number),
            issue_date: Some(required_date("issue_date", ctx.date_or_today(draft.issue_date))?),
            return_date: draft.return_date,
            notes: trimmed(draft.notes),
        };
        Ok(Payload::Json(to_compact_json(&shaped)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefaults;
    use crate::resource::FormMode;
    use serde_json::json;

    #[test]
    fn status_follows_the_return_date() {
        let out: Custody = serde_json::from_value(json!({
            "id": 1,
            "employee_id": 7,
            "item_name": "Laptop",
            "issue_date": "2024-01-10",
            "return_date": null
        }))
        .unwrap();
        let back: Custody = serde_json::from_value(json!({
            "id": 2,
            "employee_id": 7,
            "item_name": "Phone",
            "item_number": 55,
            "return_date": "2024-03-01"
        }))
        .unwrap();

        assert_eq!(out.badge().unwrap().label, "In use");
        assert!(out.in_category(IN_USE));
        assert_eq!(back.badge().unwrap().label, "Returned");
        assert!(back.in_category(RETURNED));
        assert!(back.search_fields().contains(&"55"));
    }

    #[test]
    fn issue_date_defaults_to_today() {
        let defaults = FormDefaults::default();
        let ctx = FormContext {
            mode: FormMode::Create,
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            defaults: &defaults,
        };
        let draft = CustodyDraft {
            employee_id: Some(7),
            item_name: Some(" Laptop ".into()),
            ..CustodyDraft::default()
        };

        let Payload::Json(body) = Custody::prepare(draft, &ctx).unwrap() else {
            panic!("custodies are sent as JSON");
        };
        assert_eq!(body["item_name"], "Laptop");
        assert_eq!(body["issue_date"], "2024-05-01");
        assert!(body.get("return_date").is_none());
    }

    #[test]
    fn item_name_is_required() {
        let defaults = FormDefaults::default();
        let ctx = FormContext {
            mode: FormMode::Create,
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            defaults: &defaults,
        };
        let draft = CustodyDraft {
            employee_id: Some(7),
            ..CustodyDraft::default()
        };
        let err = Custody::prepare(draft, &ctx).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation { field: "item_name", .. }));
    }
}
