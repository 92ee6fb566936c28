//! The generic resource page: one container, filter and form lifecycle
//! shared by every HR collection the console manages.

pub mod filter;
pub mod form;
pub mod page;
pub mod shaping;

use crate::backend::{BackendRequest, Body, Method, MultipartForm};
use crate::config::FormDefaults;
use crate::errors::ConsoleError;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use strum_macros::Display;
use utoipa::ToSchema;

/// Text a record exposes to the search box, and the categorical filter it
/// answers to.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn in_category(&self, category: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowAction {
    Edit,
    Delete,
    Approve,
    Reject,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Neutral,
}

/// Status badge shown next to a row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Badge {
    pub tone: Tone,
    pub label: String,
}

impl Badge {
    pub fn new(tone: Tone, label: impl Into<String>) -> Self {
        Self {
            tone,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

/// Everything a draft needs to become a request body.
#[derive(Debug, Clone, Copy)]
pub struct FormContext<'a> {
    pub mode: FormMode,
    pub today: NaiveDate,
    pub defaults: &'a FormDefaults,
}

impl FormContext<'_> {
    pub fn is_create(&self) -> bool {
        self.mode == FormMode::Create
    }

    /// Today's date for an omitted date field, when configured to do so.
    pub fn date_or_today(&self, value: Option<NaiveDate>) -> Option<NaiveDate> {
        value.or_else(|| self.defaults.fill_today_dates.then_some(self.today))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartForm),
}

impl From<Payload> for Body {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Json(value) => Body::Json(value),
            Payload::Multipart(form) => Body::Multipart(form),
        }
    }
}

/// One HR collection served by the backend at [`Resource::ENDPOINT`].
pub trait Resource:
    Searchable + DeserializeOwned + Serialize + Clone + Send + Sync + 'static
{
    /// The form-side shape of a record.
    type Draft: DeserializeOwned + Serialize + Clone + Default + Send + Sync + 'static;

    /// Route segment under the console prefix.
    const KEY: &'static str;
    const ENDPOINT: &'static str;
    const TITLE: &'static str;
    /// Singular, lower case, used in messages.
    const NOUN: &'static str;
    /// Whether rows reference an employee by id and need the lookup list.
    const EMPLOYEE_LOOKUP: bool = false;

    fn id(&self) -> u64;

    fn employee_ref(&self) -> Option<u64> {
        None
    }

    /// Employee name embedded in the record itself, if the backend sends one.
    fn embedded_employee_name(&self) -> Option<&str> {
        None
    }

    fn row_actions(&self) -> Vec<RowAction> {
        vec![RowAction::Edit, RowAction::Delete]
    }

    fn badge(&self) -> Option<Badge> {
        None
    }

    /// Readable forms of coded fields, shown next to the raw record.
    fn labels(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::new()
    }

    /// Pre-fills an edit form from a listed record.
    fn edit_draft(&self) -> Self::Draft;

    /// Validates and shapes a draft into the body the backend expects.
    fn prepare(draft: Self::Draft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError>;

    fn create_request(payload: Payload) -> BackendRequest {
        BackendRequest {
            method: Method::Post,
            path: Self::ENDPOINT.to_string(),
            body: payload.into(),
        }
    }

    fn update_request(id: u64, payload: Payload) -> BackendRequest {
        BackendRequest {
            method: Method::Put,
            path: format!("{}/{id}", Self::ENDPOINT),
            body: payload.into(),
        }
    }

    fn delete_request(id: u64) -> BackendRequest {
        BackendRequest::delete(format!("{}/{id}", Self::ENDPOINT))
    }
}
