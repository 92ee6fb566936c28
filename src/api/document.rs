use crate::errors::ConsoleError;
use crate::model::document::Document;
use crate::resource::Resource;
use crate::session::context::SessionContext;
use crate::state::AppState;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpResponse, web};
use futures::join;
use tracing::{info, warn};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Attachment header; names outside ASCII also travel as an RFC 5987
/// `filename*` next to an ASCII fallback.
fn attachment(file_name: String) -> ContentDisposition {
    let parameters = if file_name.is_ascii() {
        vec![DispositionParam::Filename(file_name)]
    } else {
        let fallback = file_name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        vec![
            DispositionParam::Filename(fallback),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_owned()),
                language_tag: None,
                value: file_name.into_bytes(),
            }),
        ]
    };

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

/* =========================
Download document
========================= */
#[utoipa::path(
    get,
    path = "/console/documents/{id}/download",
    params(("id" = u64, Path, description = "Document id")),
    responses(
        (
            status = 200,
            description = "File content as an attachment",
            content_type = "application/octet-stream"
        ),
        (status = 401, description = "No console session"),
        (status = 404, description = "Unknown document"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "Documents"
)]
pub async fn download(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<u64>,
) -> Result<HttpResponse, ConsoleError> {
    let id = path.into_inner();
    let api = state.api(&session);
    let record_path = format!("{}/{id}", Document::ENDPOINT);

    let (file, record) = join!(
        api.execute(Document::download_request(id)),
        api.fetch::<Document>(&record_path)
    );
    let file = file?;

    // The stored name is only cosmetic; a failed lookup still serves the file.
    let file_name = match record {
        Ok(doc) if !doc.file_name.trim().is_empty() => doc.file_name,
        Ok(_) => format!("document-{id}"),
        Err(e) => {
            warn!(document_id = id, error = %e, "Document metadata unavailable");
            format!("document-{id}")
        }
    };

    info!(document_id = id, bytes = file.body.len(), "Document downloaded");
    Ok(HttpResponse::Ok()
        .content_type(
            file.content_type
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
        )
        .insert_header(attachment(file_name))
        .body(file.body))
}
