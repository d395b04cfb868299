use serde::{Deserialize, Serialize};

pub type NotebookId = i64;
pub type MessageId = i64;
pub type PageId = i64;
pub type UserId = i64;
pub type QuestionId = i64;
pub type AnswerId = i64;

/// Top level envelope wrapping every backend response.
///
/// The envelope is the whole contract: `success == false` is a failure no
/// matter what HTTP status carried it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Resolve an envelope whose `data` is required.
    ///
    /// A missing `data` counts as failure even when `success` is set.
    pub fn into_data(self, fallback: &str) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| fallback.to_string())),
        }
    }

    /// Resolve an envelope where only `success` matters.
    pub fn into_ack(self, fallback: &str) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| fallback.to_string()))
        }
    }
}

/// Acknowledgement payload returned by mutating endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: String,
}

/// A message as stored by the backend. `message_text` still carries the
/// channel tag; decoding happens in the client core.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub message_id: MessageId,
    pub notebook_id: NotebookId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    pub message_text: String,
    /// Either a formatted timestamp string or epoch milliseconds.
    pub timestamp: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub text: String,
}

/// A notebook page ("note" on the backend).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WirePage {
    pub note_id: PageId,
    pub notebook_id: NotebookId,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PageContentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Owner,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireNotebook {
    pub notebook_id: NotebookId,
    pub title: String,
    #[serde(default)]
    pub course_name: Option<String>,
    pub owner_id: UserId,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotebookRequest {
    pub title: String,
    pub course_name: String,
    pub visibility: Visibility,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AddCollaboratorRequest {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// Login/register response: the user plus an opaque bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: AuthUser,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// An answer in a page's Q&A thread.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer_id: AnswerId,
    pub question_id: QuestionId,
    pub answer_text: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub timestamp: serde_json::Value,
}

/// A question asked on a page, with its answers inline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: QuestionId,
    pub note_id: PageId,
    pub question_text: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub timestamp: serde_json::Value,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Body for posting a question or an answer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QnaTextRequest {
    pub text: String,
}
