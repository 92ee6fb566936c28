//! List, create, edit and delete handlers shared by every resource page.
//!
//! Each handler is generic over [`Resource`]; [`scope`] mounts them under
//! `/{KEY}` so a new collection only needs its model.

use crate::errors::ConsoleError;
use crate::resource::Resource;
use crate::resource::filter::ListQuery;
use crate::resource::form::FormState;
use crate::resource::page::{DeleteOutcome, LoadState, ResourcePage};
use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::{HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct DeleteQuery {
    /// Must be `true` for the delete to be sent
    #[schema(example = true)]
    pub confirm: Option<bool>,
}

/// Returned instead of deleting when the caller has not confirmed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmPrompt {
    pub prompt: String,
    /// Same request with confirmation
    #[schema(example = "/console/employees/7?confirm=true")]
    pub confirm: String,
}

#[derive(Serialize)]
struct FormView<D> {
    resource: &'static str,
    title: &'static str,
    form: FormState<D>,
}

/// Page view answered with the banner's status when the list failed to load.
fn page_response<R: Resource>(page: &ResourcePage<'_, R>, query: &ListQuery) -> HttpResponse {
    let status = match (page.load_state(), page.banner()) {
        (LoadState::Failed, Some(banner)) => banner.status_code(),
        _ => actix_web::http::StatusCode::OK,
    };
    HttpResponse::build(status).json(page.view(query))
}

/// Failed submission: the error's status, with the reopened form in the body.
fn rejected_form<R: Resource>(page: &ResourcePage<'_, R>, e: &ConsoleError) -> HttpResponse {
    HttpResponse::build(e.status_code()).json(page.view(&ListQuery::default()))
}

pub async fn list<R: Resource>(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let mut page = state.page::<R>(&session);
    page.load().await;
    page_response(&page, &query)
}

/// Blank create form.
pub async fn new_form<R: Resource>(_session: SessionContext) -> Result<HttpResponse, ConsoleError> {
    let mut form = FormState::Closed;
    form.open_create(R::Draft::default())?;
    Ok(HttpResponse::Ok().json(FormView {
        resource: R::KEY,
        title: R::TITLE,
        form,
    }))
}

/// Edit form pre-filled from the listed record.
pub async fn edit_form<R: Resource>(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let mut page = state.page::<R>(&session);
    page.load().await;
    if page.load_state() == LoadState::Failed {
        return Ok(page_response(&page, &ListQuery::default()));
    }

    let draft = page.edit_draft(id)?;
    page.open_edit(id, draft)?;
    Ok(page_response(&page, &ListQuery::default()))
}

/// Runs one submission of `page`'s open form, refusing a second one of the
/// same form from the same session while it is in flight. Edits are marked
/// per record.
async fn submit_once<R: Resource>(
    state: &AppState,
    session: &SessionContext,
    page: &mut ResourcePage<'_, R>,
    editing: Option<u64>,
) -> Result<(), ConsoleError> {
    let form = match editing {
        Some(id) => format!("{}/{id}", R::KEY),
        None => R::KEY.to_string(),
    };
    let Some(_in_flight) = state.submissions.begin(&session.session_id, &form) else {
        warn!(resource = R::KEY, form = %form, "Submission already in progress");
        return Err(ConsoleError::Conflict(format!(
            "This {} is already being saved",
            R::NOUN
        )));
    };

    page.submit().await
}

pub async fn create<R: Resource>(
    state: web::Data<AppState>,
    session: SessionContext,
    draft: web::Json<R::Draft>,
) -> Result<HttpResponse, ConsoleError> {
    let mut page = state.page::<R>(&session);
    page.open_create(draft.into_inner())?;

    match submit_once(&state, &session, &mut page, None).await {
        Ok(()) => {
            info!(resource = R::KEY, "Record created");
            Ok(HttpResponse::Created().json(page.view(&ListQuery::default())))
        }
        Err(e @ ConsoleError::Conflict(_)) => Err(e),
        Err(e) => Ok(rejected_form(&page, &e)),
    }
}

pub async fn update<R: Resource>(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
    draft: web::Json<R::Draft>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let mut page = state.page::<R>(&session);
    page.open_edit(id, draft.into_inner())?;

    match submit_once(&state, &session, &mut page, Some(id)).await {
        Ok(()) => {
            info!(resource = R::KEY, id, "Record updated");
            Ok(page_response(&page, &ListQuery::default()))
        }
        Err(e @ ConsoleError::Conflict(_)) => Err(e),
        Err(e) => Ok(rejected_form(&page, &e)),
    }
}

pub async fn delete<R: Resource>(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let mut page = state.page::<R>(&session);

    match page.delete(id, query.confirm.unwrap_or(false)).await? {
        DeleteOutcome::Declined { prompt } => Ok(HttpResponse::Ok().json(ConfirmPrompt {
            prompt,
            confirm: format!("{}/{id}?confirm=true", page.href()),
        })),
        DeleteOutcome::Deleted => {
            info!(resource = R::KEY, id, "Record deleted");
            Ok(page_response(&page, &ListQuery::default()))
        }
    }
}

/// Mounts the generic page routes of `R` under `/{KEY}`.
pub fn scope<R: Resource>() -> actix_web::Scope {
    web::scope(&format!("/{}", R::KEY))
        .service(
            web::resource("")
                .route(web::get().to(list::<R>))
                .route(web::post().to(create::<R>)),
        )
        .service(web::resource("/new").route(web::get().to(new_form::<R>)))
        .service(
            web::resource("/{id}")
                .route(web::put().to(update::<R>))
                .route(web::delete().to(delete::<R>)),
        )
        .service(web::resource("/{id}/edit").route(web::get().to(edit_form::<R>)))
}
