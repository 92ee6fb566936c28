use crate::backend::{BackendRequest, FilePart, Method, MultipartForm};
use crate::errors::ConsoleError;
use crate::model::employee::EmbeddedEmployee;
use crate::resource::shaping::trimmed;
use crate::resource::{FormContext, Payload, Resource, RowAction, Searchable};
use crate::utils::format::file_size;
use crate::utils::lenient;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Id,
    Passport,
    Certificate,
    MedicalReport,
    Cv,
    Photo,
    #[default]
    General,
    Other,
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Contract => "Employment contract",
            DocumentType::Id => "ID",
            DocumentType::Passport => "Passport",
            DocumentType::Certificate => "Certificate",
            DocumentType::MedicalReport => "Medical report",
            DocumentType::Cv => "CV",
            DocumentType::Photo => "Photo",
            DocumentType::General => "General document",
            DocumentType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    /// Absent for general, company-wide documents.
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub document_type: String,
    #[serde(default, alias = "original_name", deserialize_with = "lenient::string_or_empty")]
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stored_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub file_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl Document {
    pub fn download_request(id: u64) -> BackendRequest {
        BackendRequest::get(format!("{}/{id}/download", Self::ENDPOINT))
    }

    pub fn size_label(&self) -> String {
        file_size(self.file_size)
    }
}

/// File chosen in the upload form, carried as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileUpload {
    #[schema(example = "contract.pdf")]
    pub name: String,
    #[schema(example = "application/pdf")]
    pub content_type: Option<String>,
    /// Base64 encoded file content
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DocumentDraft {
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub document_type: Option<DocumentType>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    /// Required when uploading; optional when editing
    pub file: Option<FileUpload>,
}

fn file_part(upload: FileUpload) -> Result<FilePart, ConsoleError> {
    let bytes = STANDARD
        .decode(upload.content.trim())
        .map_err(|e| ConsoleError::Validation {
            field: "file",
            message: format!("File content is not valid base64: {e}"),
        })?;

    let file_name = upload.name.trim();
    if file_name.is_empty() {
        return Err(ConsoleError::Validation {
            field: "file",
            message: "The file needs a name".to_string(),
        });
    }

    Ok(FilePart {
        field: "file".to_string(),
        file_name: file_name.to_string(),
        content_type: trimmed(upload.content_type),
        bytes,
    })
}

impl Searchable for Document {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.file_name.as_str()];
        fields.extend(self.notes.as_deref());
        fields
    }

    fn in_category(&self, document_type: &str) -> bool {
        self.document_type == document_type
    }
}

impl Resource for Document {
    type Draft = DocumentDraft;

    const KEY: &'static str = "documents";
    const ENDPOINT: &'static str = "/documents";
    const TITLE: &'static str = "Documents";
    const NOUN: &'static str = "document";
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

    fn row_actions(&self) -> Vec<RowAction> {
        vec![RowAction::Download, RowAction::Edit, RowAction::Delete]
    }

    fn labels(&self) -> BTreeMap<&'static str, String> {
        let mut labels = BTreeMap::from([("file_size", self.size_label())]);
        if let Some(kind) = lenient::variant::<DocumentType>(&self.document_type) {
            labels.insert("document_type", kind.label().to_string());
        }
        labels
    }

    fn edit_draft(&self) -> DocumentDraft {
        DocumentDraft {
            employee_id: self.employee_id,
            document_type: lenient::variant(&self.document_type),
            notes: self.notes.clone(),
            file: None,
        }
    }

    /// Documents travel as multipart; a new document must carry a file.
    fn prepare(draft: DocumentDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let file = match draft.file {
            Some(upload) => Some(file_part(upload)?),
            None if ctx.is_create() => {
                return Err(ConsoleError::Validation {
                    field: "file",
                    message: "Please choose a file to upload".to_string(),
                });
            }
            None => None,
        };

        let mut form = MultipartForm::default();
        if let Some(employee_id) = draft.employee_id {
            form = form.text("employee_id", employee_id.to_string());
        }
        form = form.text(
            "document_type",
            draft.document_type.unwrap_or_default().to_string(),
        );
        if let Some(notes) = trimmed(draft.notes) {
            form = form.text("notes", notes);
        }
        form.file = file;

        Ok(Payload::Multipart(form))
    }

    fn update_request(id: u64, payload: Payload) -> BackendRequest {
        BackendRequest {
            method: Method::Post,
            path: format!("{}/{id}?_method=PUT", Self::ENDPOINT),
            body: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Body;
    use crate::config::FormDefaults;
    use crate::resource::FormMode;
    use chrono::NaiveDate;

    fn ctx(mode: FormMode, defaults: &FormDefaults) -> FormContext<'_> {
        FormContext {
            mode,
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            defaults,
        }
    }

    fn upload() -> FileUpload {
        FileUpload {
            name: "contract.pdf".into(),
            content_type: Some("application/pdf".into()),
            content: STANDARD.encode(b"%PDF-1.4"),
        }
    }

    #[test]
    fn new_document_without_file_is_refused() {
        let defaults = FormDefaults::default();
        let err = Document::prepare(DocumentDraft::default(), &ctx(FormMode::Create, &defaults))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation { field: "file", .. }));
    }

    #[test]
    fn upload_becomes_a_multipart_form() {
        let defaults = FormDefaults::default();
        let draft = DocumentDraft {
            employee_id: Some(7),
            document_type: Some(DocumentType::MedicalReport),
            notes: Some("  ".into()),
            file: Some(upload()),
        };

        let Payload::Multipart(form) =
            Document::prepare(draft, &ctx(FormMode::Create, &defaults)).unwrap()
        else {
            panic!("documents are sent as multipart");
        };
        assert_eq!(form.field("employee_id"), Some("7"));
        assert_eq!(form.field("document_type"), Some("medical_report"));
        assert_eq!(form.field("notes"), None);
        let file = form.file.unwrap();
        assert_eq!(file.field, "file");
        assert_eq!(file.bytes, b"%PDF-1.4");
    }

    #[test]
    fn edit_may_skip_the_file_and_uses_method_override() {
        let defaults = FormDefaults::default();
        let draft = DocumentDraft::default();
        let payload = Document::prepare(draft, &ctx(FormMode::Edit(5), &defaults)).unwrap();
        let request = Document::update_request(5, payload);

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/documents/5?_method=PUT");
        let Body::Multipart(form) = request.body else {
            panic!("expected multipart");
        };
        assert_eq!(form.field("document_type"), Some("general"));
        assert!(form.file.is_none());
    }

    #[test]
    fn bad_base64_is_a_file_error() {
        let defaults = FormDefaults::default();
        let draft = DocumentDraft {
            file: Some(FileUpload {
                content: "not base64!".into(),
                ..upload()
            }),
            ..DocumentDraft::default()
        };
        let err = Document::prepare(draft, &ctx(FormMode::Create, &defaults)).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation { field: "file", .. }));
    }
}
