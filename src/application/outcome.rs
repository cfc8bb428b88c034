//! Classification of a finished attempt and the progress line it produces

use crate::domain::{ApiError, DeleteError, ProgressSnapshot};

pub const DELETED_MESSAGE: &str = "Успешно удалено";
pub const UNKNOWN_API_ERROR_MESSAGE: &str = "VkAPI Неизвестная ошибка.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Неизвестная ошибка.";
pub const UNPARSEABLE_MESSAGE: &str = "Не удалось распознать ссылку.";

/// Fixed messages for the API error codes seen while purging.
#[must_use]
pub const fn api_error_message(code: i64) -> Option<&'static str> {
    match code {
        15 => Some("Доступ запрещён. Или лайк уже убран."),
        30 => Some("Профиль является приватным."),
        100 => Some("Один из необходимых параметров был неверен.(Объект не существует)"),
        211 => Some("Нет доступа к комментариям."),
        _ => None,
    }
}

/// How a single work item was settled. Every variant counts as completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Deleted,
    ApiRejected(ApiError),
    Failed { kind: String, message: String },
    Unparseable,
}

impl AttemptOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Deleted => DELETED_MESSAGE.to_string(),
            Self::ApiRejected(err) => api_error_message(err.code)
                .unwrap_or(UNKNOWN_API_ERROR_MESSAGE)
                .to_string(),
            Self::Failed { kind, .. } => format!("{UNKNOWN_ERROR_MESSAGE} {kind}"),
            Self::Unparseable => UNPARSEABLE_MESSAGE.to_string(),
        }
    }

    /// Raw error printed under the progress line, when there is one worth showing
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::ApiRejected(err) if api_error_message(err.code).is_none() => Some(err.to_string()),
            Self::Failed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::ApiRejected(_) => "api_error",
            Self::Failed { .. } => "failed",
            Self::Unparseable => "unparseable",
        }
    }
}

impl From<Result<(), DeleteError>> for AttemptOutcome {
    fn from(result: Result<(), DeleteError>) -> Self {
        match result {
            Ok(()) => Self::Deleted,
            Err(DeleteError::Api(err)) => Self::ApiRejected(err),
            Err(DeleteError::Other { kind, message }) => Self::Failed { kind, message },
        }
    }
}

/// `[<Label>] c/e Total: tc/te: <message> <reference>`, plus a detail line
#[must_use]
pub fn render_progress_line(
    snapshot: &ProgressSnapshot,
    outcome: &AttemptOutcome,
    reference: &str,
) -> String {
    let mut line = format!(
        "[{}] {}/{} Total: {}/{}: {} {}",
        snapshot.category.label(),
        snapshot.category_tally.completed,
        snapshot.category_tally.expected,
        snapshot.total.completed,
        snapshot.total.expected,
        outcome.message(),
        reference,
    );
    if let Some(detail) = outcome.detail() {
        line.push('\n');
        line.push_str(&detail);
    }
    line
}
