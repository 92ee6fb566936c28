use super::filter::{self, ListQuery};
use super::form::FormState;
use super::{Badge, FormContext, FormMode, Resource, RowAction};
use crate::backend::BackendRequest;
use crate::backend::client::ApiClient;
use crate::config::FormDefaults;
use crate::errors::{ConsoleError, ErrorBanner};
use crate::model::employee::EmployeeRef;
use chrono::NaiveDate;
use futures::join;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

pub const EMPLOYEE_LOOKUP_PATH: &str = "/employees";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was sent.
    Declined { prompt: String },
    Deleted,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeOption {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Row<R> {
    pub id: u64,
    pub record: R,
    pub actions: Vec<RowAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<&'static str, String>,
}

/// What a resource page renders: rows, filter echo, form and banner.
#[derive(Serialize)]
pub struct PageView<R: Resource> {
    pub resource: &'static str,
    pub title: &'static str,
    pub load: LoadState,
    pub total: usize,
    pub shown: usize,
    pub query: ListQuery,
    pub rows: Vec<Row<R>>,
    pub form: FormState<R::Draft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<ErrorBanner>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub employees: Vec<EmployeeOption>,
}

/// One resource page for the duration of a console request.
///
/// Holds the fetched list, the optional employee lookup, the load state
/// and the form. Nothing is kept between requests.
pub struct ResourcePage<'a, R: Resource> {
    api: ApiClient<'a>,
    defaults: &'a FormDefaults,
    today: NaiveDate,
    prefix: &'a str,
    records: Vec<R>,
    employees: BTreeMap<u64, String>,
    load: LoadState,
    banner: Option<ErrorBanner>,
    form: FormState<R::Draft>,
}

impl<'a, R: Resource> ResourcePage<'a, R> {
    pub fn new(
        api: ApiClient<'a>,
        defaults: &'a FormDefaults,
        today: NaiveDate,
        prefix: &'a str,
    ) -> Self {
        Self {
            api,
            defaults,
            today,
            prefix,
            records: Vec::new(),
            employees: BTreeMap::new(),
            load: LoadState::Idle,
            banner: None,
            form: FormState::Closed,
        }
    }

    pub fn href(&self) -> String {
        format!("{}/{}", self.prefix, R::KEY)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn form(&self) -> &FormState<R::Draft> {
        &self.form
    }

    /// Fetches the collection, and the employee lookup when rows need
    /// names, concurrently. A failed fetch empties the list and raises the
    /// banner; a failed lookup only costs the names.
    pub async fn load(&mut self) {
        self.load = LoadState::Loading;
        let api = self.api;

        let (records, lookup) = if R::EMPLOYEE_LOOKUP {
            let (records, lookup) = join!(
                api.fetch_collection::<R>(R::ENDPOINT),
                api.fetch_collection::<EmployeeRef>(EMPLOYEE_LOOKUP_PATH)
            );
            (records, Some(lookup))
        } else {
            (api.fetch_collection::<R>(R::ENDPOINT).await, None)
        };

        match lookup {
            Some(Ok(employees)) => {
                self.employees = employees.into_iter().map(|e| (e.id, e.name)).collect();
            }
            Some(Err(e)) => {
                warn!(resource = R::KEY, error = %e, "Employee lookup failed");
                self.employees.clear();
            }
            None => {}
        }

        match records {
            Ok(records) => {
                debug!(resource = R::KEY, count = records.len(), "Loaded records");
                self.records = records;
                self.load = LoadState::Loaded;
                self.banner = None;
            }
            Err(e) => {
                error!(resource = R::KEY, error = %e, "Failed to load records");
                self.records.clear();
                self.load = LoadState::Failed;
                self.banner = Some(e.banner().with_retry(self.href()));
            }
        }
    }

    pub fn filtered(&self, query: &ListQuery) -> Vec<R> {
        filter::apply(&self.records, query)
    }

    pub fn employee_name(&self, record: &R) -> Option<String> {
        record
            .embedded_employee_name()
            .map(str::to_string)
            .or_else(|| {
                record
                    .employee_ref()
                    .and_then(|id| self.employees.get(&id).cloned())
            })
    }

    pub fn open_create(&mut self, draft: R::Draft) -> Result<(), ConsoleError> {
        self.form.open_create(draft)
    }

    pub fn open_edit(&mut self, id: u64, draft: R::Draft) -> Result<(), ConsoleError> {
        self.form.open_edit(id, draft)
    }

    /// Edit draft pre-filled from the loaded record with this id.
    pub fn edit_draft(&self, id: u64) -> Result<R::Draft, ConsoleError> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .map(R::edit_draft)
            .ok_or_else(|| ConsoleError::NotFound(format!("{} {id}", R::NOUN)))
    }

    fn fail(&mut self, e: &ConsoleError) {
        self.form.fail(e.to_string());
        self.banner = Some(e.banner());
    }

    /// Submits the open form: validate and shape, send exactly one create
    /// or update, then refetch once. Any failure reopens the form with the
    /// error and sends nothing further.
    pub async fn submit(&mut self) -> Result<(), ConsoleError> {
        let (draft, editing) = self.form.begin_submit()?;
        let ctx = FormContext {
            mode: editing.map_or(FormMode::Create, FormMode::Edit),
            today: self.today,
            defaults: self.defaults,
        };

        let payload = match R::prepare(draft, &ctx) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(resource = R::KEY, error = %e, "Form rejected before submission");
                self.fail(&e);
                return Err(e);
            }
        };

        let request = match editing {
            None => R::create_request(payload),
            Some(id) => R::update_request(id, payload),
        };

        if let Err(e) = self.api.execute(request).await {
            error!(resource = R::KEY, id = ?editing, error = %e, "Failed to save record");
            self.fail(&e);
            return Err(e);
        }

        self.form.complete();
        self.load().await;
        Ok(())
    }

    /// Deletes after explicit confirmation, then refetches once.
    pub async fn delete(
        &mut self,
        id: u64,
        confirmed: bool,
    ) -> Result<DeleteOutcome, ConsoleError> {
        if !confirmed {
            return Ok(DeleteOutcome::Declined {
                prompt: format!("Delete this {}? This cannot be undone.", R::NOUN),
            });
        }

        if let Err(e) = self.api.execute(R::delete_request(id)).await {
            error!(resource = R::KEY, id, error = %e, "Failed to delete record");
            self.banner = Some(e.banner().with_retry(self.href()));
            return Err(e);
        }

        self.load().await;
        Ok(DeleteOutcome::Deleted)
    }

    /// Sends a server-side action on a record, then refetches once.
    pub async fn run_action(&mut self, request: BackendRequest) -> Result<(), ConsoleError> {
        let path = request.path.clone();
        if let Err(e) = self.api.execute(request).await {
            error!(resource = R::KEY, path = %path, error = %e, "Action failed");
            self.banner = Some(e.banner().with_retry(self.href()));
            return Err(e);
        }

        self.load().await;
        Ok(())
    }

    pub fn view(&self, query: &ListQuery) -> PageView<R> {
        let rows = self
            .filtered(query)
            .into_iter()
            .map(|record| Row {
                id: record.id(),
                actions: record.row_actions(),
                badge: record.badge(),
                labels: record.labels(),
                employee_name: self.employee_name(&record),
                record,
            })
            .collect::<Vec<_>>();

        PageView {
            resource: R::KEY,
            title: R::TITLE,
            load: self.load,
            total: self.records.len(),
            shown: rows.len(),
            query: query.clone(),
            rows,
            form: self.form.clone(),
            banner: self.banner.clone(),
            employees: self
                .employees
                .iter()
                .map(|(id, name)| EmployeeOption {
                    id: *id,
                    name: name.clone(),
                })
                .collect(),
        }
    }
}
