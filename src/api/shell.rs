use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Fixed navigation: `(path, label)` relative to the console prefix.
pub const MENU: [(&str, &str); 9] = [
    ("dashboard", "Dashboard"),
    ("employees", "Employees"),
    ("payroll", "Payroll"),
    ("leaves", "Leaves"),
    ("documents", "Documents"),
    ("attendance", "Attendance"),
    ("other-payments", "Other payments"),
    ("custodies", "Custodies"),
    ("expiry", "Expiry tracking"),
];

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuEntry {
    #[schema(example = "employees")]
    pub key: &'static str,
    #[schema(example = "Employees")]
    pub label: &'static str,
    #[schema(example = "/console/employees")]
    pub href: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Shell {
    /// Display name of the signed-in user, when the backend sent one
    pub user: Option<String>,
    pub menu: Vec<MenuEntry>,
    #[schema(example = "/auth/logout")]
    pub logout: &'static str,
}

fn display_name(user: &serde_json::Value) -> Option<String> {
    ["name", "email"]
        .iter()
        .find_map(|key| user.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[utoipa::path(
    get,
    path = "/console",
    responses(
        (status = 200, description = "Navigation menu", body = Shell),
        (status = 401, description = "No console session")
    ),
    tag = "Console"
)]
pub async fn menu(state: web::Data<AppState>, session: SessionContext) -> HttpResponse {
    let prefix = &state.config.console_prefix;
    let menu = MENU
        .iter()
        .map(|&(key, label)| MenuEntry {
            key,
            label,
            href: format!("{prefix}/{key}"),
        })
        .collect();

    HttpResponse::Ok().json(Shell {
        user: session.credential.user.as_ref().and_then(display_name),
        menu,
        logout: "/auth/logout",
    })
}
