use super::{Backend, BackendRequest, BackendResponse};
use crate::errors::ConsoleError;
use crate::session::store::Credential;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::warn;

const MAX_MESSAGE_CHARS: usize = 200;

/// Typed access to the backend on behalf of one session.
///
/// All status handling lives here: a non-2xx answer becomes a
/// [`ConsoleError`] before any page sees it.
#[derive(Clone, Copy)]
pub struct ApiClient<'a> {
    backend: &'a dyn Backend,
    credential: &'a Credential,
}

impl<'a> ApiClient<'a> {
    pub fn new(backend: &'a dyn Backend, credential: &'a Credential) -> Self {
        Self {
            backend,
            credential,
        }
    }

    pub async fn execute(&self, request: BackendRequest) -> Result<BackendResponse, ConsoleError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.backend.send(Some(self.credential), request).await?;

        if response.is_success() {
            return Ok(response);
        }

        let error = rejection(&response);
        warn!(
            %method,
            path = %path,
            status = response.status,
            error = %error,
            "Backend rejected request"
        );
        Err(error)
    }

    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsoleError> {
        let response = self.execute(BackendRequest::get(path)).await?;
        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, path, "Failed to decode backend payload");
            ConsoleError::Decode(e)
        })
    }

    /// Fetches a collection that the backend returns either as a bare
    /// array or wrapped as `{"data": [...]}`.
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ConsoleError> {
        let value: Value = self.fetch(path).await?;
        unwrap_collection(value).map_err(|e| {
            warn!(error = %e, path, "Failed to decode backend collection");
            e
        })
    }
}

/// Decodes a collection row by row. A record that does not decode (no
/// usable id, wrong field types) is skipped so the rest still shows.
pub fn unwrap_collection<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ConsoleError> {
    let items = match value {
        Value::Object(mut map) => map.remove("data").ok_or_else(|| {
            ConsoleError::Decode(serde_json::Error::custom(
                "expected an array or an object with a `data` array",
            ))
        })?,
        other => other,
    };
    let items = match items {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(ConsoleError::Decode(serde_json::Error::custom(format!(
                "expected an array, got {other}"
            ))));
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect())
}

/// Maps a non-2xx backend answer to the console's error taxonomy.
pub fn rejection(response: &BackendResponse) -> ConsoleError {
    match response.status {
        401 => ConsoleError::Unauthorized,
        status => ConsoleError::Rejected {
            status,
            message: rejection_message(response),
        },
    }
}

pub fn rejection_message(response: &BackendResponse) -> String {
    let from_json = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_owned))
        });

    let message = from_json.unwrap_or_else(|| {
        String::from_utf8_lossy(&response.body)
            .trim()
            .chars()
            .take(MAX_MESSAGE_CHARS)
            .collect()
    });

    if message.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        message
    }
}
