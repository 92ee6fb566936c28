use crate::backend::Backend;
use crate::backend::client::ApiClient;
use crate::config::Config;
use crate::resource::Resource;
use crate::resource::page::ResourcePage;
use crate::session::context::SessionContext;
use crate::session::submission::Submissions;
use chrono::NaiveDate;
use std::sync::Arc;

/// Shared application state handed to every handler through `web::Data`.
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub submissions: Submissions,
    pub config: Config,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        Self {
            backend,
            submissions: Submissions::default(),
            config,
        }
    }

    pub fn api<'a>(&'a self, session: &'a SessionContext) -> ApiClient<'a> {
        ApiClient::new(self.backend.as_ref(), &session.credential)
    }

    pub fn page<'a, R: Resource>(&'a self, session: &'a SessionContext) -> ResourcePage<'a, R> {
        ResourcePage::new(
            self.api(session),
            &self.config.form_defaults,
            self.today(),
            &self.config.console_prefix,
        )
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
