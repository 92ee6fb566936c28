use crate::api::crud::{ConfirmPrompt, DeleteQuery};
use crate::api::dashboard::{DepartmentCount, Headcount};
use crate::api::expiry::{ExpiryDashboard, ExpiryQuery};
use crate::api::leave::RejectRequest;
use crate::api::shell::{MenuEntry, Shell};
use crate::errors::{ErrorBanner, ErrorKind};
use crate::model::attendance::{Attendance, AttendanceDraft};
use crate::model::custody::{Custody, CustodyDraft};
use crate::model::document::{Document, DocumentDraft, DocumentType, FileUpload};
use crate::model::employee::{
    Currency, EmbeddedEmployee, Employee, EmployeeDraft, EmployeeStatus, WorkType,
};
use crate::model::expiry::{
    DocumentKind, ExpiringDocumentView, ExpiringEmployeeView, ExpiryStatistics, ExpiryStatus,
    KindCounts,
};
use crate::model::leave::{Leave, LeaveDraft, LeaveStatus, LeaveType};
use crate::model::payment::{
    Advance, AdvanceDraft, Allowance, ChargeDraft, OtherPayment, OtherPaymentDraft, PaymentType,
    Penalty, ResidenceDuration,
};
use crate::model::payroll::{SalaryView, SummaryView};
use crate::resource::filter::ListQuery;
use crate::resource::page::{EmployeeOption, LoadState};
use crate::resource::{Badge, Resource, RowAction, Tone};
use crate::session::handlers::{LoginRequest, SessionStatus};
use crate::session::store::SESSION_COOKIE;
use utoipa::openapi::path::{
    Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathItemType,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::{
    ContentBuilder, KnownFormat, ObjectBuilder, Paths, Ref, Required, ResponseBuilder,
    SchemaFormat, SchemaType,
};
use utoipa::{Modify, OpenApi, ToSchema};

/// Prefix the generated paths are documented under.
const DOCUMENTED_PREFIX: &str = "/console";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Admin Console API",
        version = "1.0.0",
        description = r#"
## HR Admin Console

Server-side console in front of the HR backend. It keeps the bearer token of
each signed-in administrator in a session and serves one JSON page per HR
collection.

### Pages
- **Employees**, **Attendance**, **Leaves**, **Documents**, **Custodies**
  - list with search and category filter, create, edit, delete
- **Payroll**
  - summary, per-employee salary details, advances, penalties, allowances,
    other payments
- **Expiry tracking**
  - documents expiring within a window, statistics and CSV export

### Session
Sign in through `/auth/login`; the `hrm_session` cookie authorizes every
`/console` route. Deletes need `?confirm=true`.

### Errors
Failures answer `{"error": {kind, message, field?, retry?}}`.
"#,
    ),
    paths(
        crate::session::handlers::login,
        crate::session::handlers::logout,
        crate::session::handlers::session_status,

        crate::api::shell::menu,
        crate::api::dashboard::headcount,

        crate::api::leave::approve,
        crate::api::leave::reject,
        crate::api::document::download,

        crate::api::payroll::overview,
        crate::api::payroll::summary,
        crate::api::payroll::salary_details,

        crate::api::expiry::dashboard,
        crate::api::expiry::export
    ),
    components(
        schemas(
            LoginRequest,
            SessionStatus,
            ErrorBanner,
            ErrorKind,
            ListQuery,
            DeleteQuery,
            ConfirmPrompt,
            LoadState,
            RowAction,
            Tone,
            Badge,
            EmployeeOption,
            Shell,
            MenuEntry,
            Headcount,
            DepartmentCount,
            EmployeeDraft,
            EmployeeStatus,
            WorkType,
            Currency,
            EmbeddedEmployee,
            AttendanceDraft,
            LeaveDraft,
            LeaveType,
            LeaveStatus,
            RejectRequest,
            DocumentDraft,
            DocumentType,
            FileUpload,
            CustodyDraft,
            OtherPaymentDraft,
            PaymentType,
            ResidenceDuration,
            AdvanceDraft,
            ChargeDraft,
            SummaryView,
            SalaryView,
            ExpiryQuery,
            ExpiryDashboard,
            ExpiryStatistics,
            KindCounts,
            ExpiryStatus,
            DocumentKind,
            ExpiringDocumentView,
            ExpiringEmployeeView
        )
    ),
    modifiers(&ResourceRoutes, &SessionCookie),
    security(("session_cookie" = [])),
    tags(
        (name = "Session", description = "Sign in and out"),
        (name = "Console", description = "Navigation and dashboard"),
        (name = "Employees", description = "Employee records"),
        (name = "Attendance", description = "Check-in and check-out records"),
        (name = "Leave", description = "Leave requests and decisions"),
        (name = "Documents", description = "Uploaded employee documents"),
        (name = "Custodies", description = "Company items held by employees"),
        (
            name = "Payroll",
            description = "Salaries, advances, penalties, allowances and other payments"
        ),
        (name = "Expiry", description = "Expiring residence, passport and insurance documents"),
    )
)]
pub struct ApiDoc;

struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Session cookie issued by POST /auth/login.",
            ))),
        );
    }
}

/// Documents the generic page routes each resource gets from `crud::scope`.
/// Handlers generic over the resource cannot carry `#[utoipa::path]`.
struct ResourceRoutes;

impl Modify for ResourceRoutes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let paths = &mut openapi.paths;
        describe::<Employee>(paths, "Employees");
        describe::<Attendance>(paths, "Attendance");
        describe::<Leave>(paths, "Leave");
        describe::<Document>(paths, "Documents");
        describe::<Custody>(paths, "Custodies");
        describe::<OtherPayment>(paths, "Payroll");
        describe::<Advance>(paths, "Payroll");
        describe::<Penalty>(paths, "Payroll");
        describe::<Allowance>(paths, "Payroll");
    }
}

fn insert(paths: &mut Paths, path: String, method: PathItemType, operation: Operation) {
    match paths.paths.get_mut(&path) {
        Some(item) => {
            item.operations.insert(method, operation);
        }
        None => {
            paths.paths.insert(path, PathItem::new(method, operation));
        }
    }
}

fn id_param() -> ParameterBuilder {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(
            ObjectBuilder::new()
                .schema_type(SchemaType::Integer)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        ))
}

fn query_param(name: &str, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(ObjectBuilder::new().schema_type(SchemaType::String)))
}

fn reply(description: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new().description(description).build()
}

fn operation(tag: &str, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tag(tag)
        .summary(Some(summary))
        .response("401", reply("No console session"))
        .response("502", reply("Backend unavailable"))
}

fn describe<R>(paths: &mut Paths, tag: &str)
where
    R: Resource,
    R::Draft: ToSchema<'static>,
{
    let (draft, _) = <R::Draft as ToSchema<'static>>::schema();
    let body = || {
        RequestBodyBuilder::new()
            .content(
                "application/json",
                ContentBuilder::new()
                    .schema(Ref::from_schema_name(draft))
                    .build(),
            )
            .required(Some(Required::True))
            .build()
    };
    let collection = format!("{DOCUMENTED_PREFIX}/{}", R::KEY);
    let record = format!("{collection}/{{id}}");

    insert(
        paths,
        collection.clone(),
        PathItemType::Get,
        operation(tag, format!("List {}", R::TITLE.to_lowercase()))
            .parameter(query_param("search", "Case-insensitive text filter"))
            .parameter(query_param("category", "Categorical filter, `all` for none"))
            .response("200", reply("Page view with rows, form and banner"))
            .build(),
    );
    insert(
        paths,
        collection.clone(),
        PathItemType::Post,
        operation(tag, format!("Create a {}", R::NOUN))
            .request_body(Some(body()))
            .response("201", reply("Created; refreshed page view"))
            .response("409", reply("A submission is already in progress"))
            .response("422", reply("Validation failed; form returned with the error"))
            .build(),
    );
    insert(
        paths,
        format!("{collection}/new"),
        PathItemType::Get,
        operation(tag, format!("Blank {} form", R::NOUN))
            .response("200", reply("Open create form"))
            .build(),
    );
    insert(
        paths,
        record.clone(),
        PathItemType::Put,
        operation(tag, format!("Update a {}", R::NOUN))
            .parameter(id_param())
            .request_body(Some(body()))
            .response("200", reply("Updated; refreshed page view"))
            .response("409", reply("A submission is already in progress"))
            .response("422", reply("Validation failed; form returned with the error"))
            .build(),
    );
    insert(
        paths,
        record.clone(),
        PathItemType::Delete,
        operation(tag, format!("Delete a {}", R::NOUN))
            .parameter(id_param())
            .parameter(query_param("confirm", "Must be `true` for the delete to be sent"))
            .response("200", reply("Confirmation prompt, or the refreshed page view"))
            .response("404", reply("Unknown record"))
            .build(),
    );
    insert(
        paths,
        format!("{record}/edit"),
        PathItemType::Get,
        operation(tag, format!("Edit form for a {}", R::NOUN))
            .parameter(id_param())
            .response("200", reply("Page view with the pre-filled form"))
            .response("404", reply("Unknown record"))
            .build(),
    );
}
