use async_trait::async_trait;
use notebook_api::{
    Ack, AuthResponse, AuthUser, Collaborator, CreateNotebookRequest, MessageId, NotebookId,
    PageId, Question, QuestionId, Role, UserId, WireMessage, WireNotebook, WirePage,
};

use crate::error::CoreResult;

/// The REST collaborator the core talks to.
///
/// Implementations resolve the response envelope themselves: a returned
/// `Ok` always means `success == true` with any required `data` present.
#[async_trait]
pub trait Backend: Send + Sync {
    // messages
    async fn list_messages(&self, notebook: NotebookId) -> CoreResult<Vec<WireMessage>>;
    async fn send_message(&self, notebook: NotebookId, raw_text: &str) -> CoreResult<Ack>;
    async fn delete_message(&self, message: MessageId) -> CoreResult<Ack>;

    // pages
    async fn list_pages(&self, notebook: NotebookId) -> CoreResult<Vec<WirePage>>;
    async fn get_page(&self, page: PageId) -> CoreResult<WirePage>;
    async fn create_page(&self, notebook: NotebookId, content: &str) -> CoreResult<WirePage>;
    async fn update_page(&self, page: PageId, content: &str) -> CoreResult<WirePage>;
    async fn delete_page(&self, page: PageId) -> CoreResult<Ack>;

    // notebooks
    async fn list_notebooks(&self) -> CoreResult<Vec<WireNotebook>>;
    async fn search_notebooks(&self, query: &str) -> CoreResult<Vec<WireNotebook>>;
    async fn get_notebook(&self, notebook: NotebookId) -> CoreResult<WireNotebook>;
    async fn create_notebook(&self, req: &CreateNotebookRequest) -> CoreResult<WireNotebook>;
    async fn delete_notebook(&self, notebook: NotebookId) -> CoreResult<Ack>;

    // collaborators
    async fn list_collaborators(&self, notebook: NotebookId) -> CoreResult<Vec<Collaborator>>;
    async fn add_collaborator(&self, notebook: NotebookId, email: &str, role: Role)
        -> CoreResult<Ack>;
    async fn remove_collaborator(&self, notebook: NotebookId, user: UserId) -> CoreResult<Ack>;

    // page Q&A
    async fn list_questions(&self, page: PageId) -> CoreResult<Vec<Question>>;
    async fn post_question(&self, page: PageId, text: &str) -> CoreResult<Ack>;
    async fn post_answer(&self, question: QuestionId, text: &str) -> CoreResult<Ack>;

    // auth
    async fn login(&self, email: &str, password: &str) -> CoreResult<AuthResponse>;
    async fn register(&self, name: &str, email: &str, password: &str) -> CoreResult<AuthResponse>;
    async fn me(&self) -> CoreResult<AuthUser>;
}
