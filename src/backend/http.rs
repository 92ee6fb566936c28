use super::{Backend, BackendRequest, BackendResponse, Body, Method, MultipartForm};
use crate::errors::ConsoleError;
use crate::session::store::Credential;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, multipart};
use std::time::Duration;
use tracing::{debug, error};

/// reqwest transport to the HR backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConsoleError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConsoleError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn into_multipart(form: MultipartForm) -> Result<multipart::Form, ConsoleError> {
    let mut multipart = multipart::Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }

    if let Some(file) = form.file {
        let mut part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ConsoleError::Validation {
                    field: "file",
                    message: format!("Invalid content type {content_type}: {e}"),
                })?;
        }
        multipart = multipart.part(file.field, part);
    }

    Ok(multipart)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(
        &self,
        credential: Option<&Credential>,
        request: BackendRequest,
    ) -> Result<BackendResponse, ConsoleError> {
        let BackendRequest { method, path, body } = request;
        let url = self.url(&path);

        let verb = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(verb, &url)
            .header(ACCEPT, "application/json");

        if let Some(credential) = credential {
            builder = builder.bearer_auth(&credential.token);
        }

        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(into_multipart(form)?),
        };

        debug!(%method, path = %path, "Sending backend request");

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, %method, path = %path, "Backend request failed");
            ConsoleError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, %method, path = %path, "Failed to read backend response");
            ConsoleError::Transport(e.to_string())
        })?;

        debug!(%method, path = %path, status, "Backend responded");

        Ok(BackendResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_path_with_one_slash() {
        let backend = HttpBackend::new("https://hr.test/api/", None).unwrap();
        assert_eq!(backend.url("/employees"), "https://hr.test/api/employees");
        assert_eq!(backend.url("employees/4"), "https://hr.test/api/employees/4");
    }

    #[test]
    fn multipart_rejects_bad_content_type() {
        let form = MultipartForm {
            fields: vec![("document_type".into(), "general".into())],
            file: Some(super::super::FilePart {
                field: "file".into(),
                file_name: "cv.pdf".into(),
                content_type: Some("not a mime".into()),
                bytes: vec![1, 2, 3],
            }),
        };
        let err = into_multipart(form).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation { field: "file", .. }));
    }
}
