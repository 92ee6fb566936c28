use crate::errors::ConsoleError;
use serde::Serialize;

/// Lifecycle of the create/edit form of a resource page.
///
/// `Closed -> Open -> Submitting -> Closed` on success, or back to `Open`
/// carrying the error on failure. A second submit while `Submitting` is
/// refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState<D> {
    Closed,
    Open {
        draft: D,
        editing: Option<u64>,
        error: Option<String>,
    },
    Submitting {
        draft: D,
        editing: Option<u64>,
    },
}

impl<D> Default for FormState<D> {
    fn default() -> Self {
        FormState::Closed
    }
}

impl<D: Clone> FormState<D> {
    pub fn open_create(&mut self, draft: D) -> Result<(), ConsoleError> {
        self.open(draft, None)
    }

    pub fn open_edit(&mut self, id: u64, draft: D) -> Result<(), ConsoleError> {
        self.open(draft, Some(id))
    }

    fn open(&mut self, draft: D, editing: Option<u64>) -> Result<(), ConsoleError> {
        if self.is_submitting() {
            return Err(ConsoleError::Conflict(
                "The form is being submitted".to_string(),
            ));
        }
        *self = FormState::Open {
            draft,
            editing,
            error: None,
        };
        Ok(())
    }

    /// Moves an open form to `Submitting` and hands back what to submit.
    pub fn begin_submit(&mut self) -> Result<(D, Option<u64>), ConsoleError> {
        match self {
            FormState::Open { draft, editing, .. } => {
                let (draft, editing) = (draft.clone(), *editing);
                *self = FormState::Submitting {
                    draft: draft.clone(),
                    editing,
                };
                Ok((draft, editing))
            }
            FormState::Submitting { .. } => Err(ConsoleError::Conflict(
                "A submission is already in progress".to_string(),
            )),
            FormState::Closed => Err(ConsoleError::Conflict("No form is open".to_string())),
        }
    }

    /// Submission failed: reopen with the draft intact and the error shown.
    pub fn fail(&mut self, message: impl Into<String>) {
        if let FormState::Submitting { draft, editing } = self {
            let (draft, editing) = (draft.clone(), *editing);
            *self = FormState::Open {
                draft,
                editing,
                error: Some(message.into()),
            };
        }
    }

    pub fn complete(&mut self) {
        *self = FormState::Closed;
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FormState::Submitting { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FormState::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            FormState::Open { draft, .. } | FormState::Submitting { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }
}
