//! In-memory `Backend` used by unit tests.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use notebook_api::{
    Ack, Answer, AuthResponse, AuthUser, Collaborator, CreateNotebookRequest, MessageId,
    NotebookId, PageId, Question, QuestionId, Role, UserId, WireMessage, WireNotebook, WirePage,
};
use parking_lot::Mutex;
use serde_json::json;

use crate::{
    backend::Backend,
    error::{CoreError, CoreResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListMessages,
    SendMessage(String),
    DeleteMessage(MessageId),
    ListPages,
    CreatePage(String),
    UpdatePage(PageId, String),
    DeletePage(PageId),
    Search(String),
    CreateNotebook(String),
    ListCollaborators,
    AddCollaborator(String, Role),
    RemoveCollaborator(UserId),
    ListQuestions(PageId),
    PostQuestion(PageId, String),
    PostAnswer(QuestionId, String),
}

type Scripted = (Duration, CoreResult<Vec<WireMessage>>);

#[derive(Default)]
pub struct FakeBackend {
    pub messages: Mutex<Vec<WireMessage>>,
    /// Responses for upcoming `list_messages` calls, consumed in order.
    pub list_script: Mutex<VecDeque<Scripted>>,
    pub delete_delay: Mutex<Duration>,
    pub fail_send: Mutex<Option<String>>,
    pub fail_delete: Mutex<Option<String>>,
    /// Page creation fails for this exact content.
    pub fail_create_for: Mutex<Option<String>>,
    pub pages: Mutex<Vec<WirePage>>,
    pub collaborators: Mutex<Vec<Collaborator>>,
    pub questions: Mutex<Vec<Question>>,
    pub calls: Mutex<Vec<Call>>,
    next_id: Mutex<i64>,
}

pub fn wire_message(id: MessageId, text: &str, timestamp: i64) -> WireMessage {
    WireMessage {
        message_id: id,
        notebook_id: 1,
        user_id: 7,
        user_name: Some("Ada".into()),
        message_text: text.into(),
        timestamp: json!(timestamp),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    pub fn with_messages(messages: Vec<WireMessage>) -> Self {
        let fake = Self::new();
        *fake.messages.lock() = messages;
        fake
    }

    pub fn script_list(&self, delay: Duration, result: CoreResult<Vec<WireMessage>>) {
        self.list_script.lock().push_back((delay, result));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock();
        *id += 1;
        *id
    }

    fn ack(message: &str) -> CoreResult<Ack> {
        Ok(Ack {
            message: message.into(),
        })
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_messages(&self, _notebook: NotebookId) -> CoreResult<Vec<WireMessage>> {
        self.record(Call::ListMessages);
        let scripted = self.list_script.lock().pop_front();
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(self.messages.lock().clone()),
        }
    }

    async fn send_message(&self, notebook: NotebookId, raw_text: &str) -> CoreResult<Ack> {
        self.record(Call::SendMessage(raw_text.to_string()));
        if let Some(err) = self.fail_send.lock().clone() {
            return Err(CoreError::Backend(err));
        }
        let id = self.next_id();
        let mut msg = wire_message(id, raw_text, id);
        msg.notebook_id = notebook;
        self.messages.lock().push(msg);
        Self::ack("Sent")
    }

    async fn delete_message(&self, message: MessageId) -> CoreResult<Ack> {
        self.record(Call::DeleteMessage(message));
        let delay = *self.delete_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_delete.lock().clone() {
            return Err(CoreError::Backend(err));
        }
        self.messages.lock().retain(|m| m.message_id != message);
        Self::ack("Message deleted successfully")
    }

    async fn list_pages(&self, _notebook: NotebookId) -> CoreResult<Vec<WirePage>> {
        self.record(Call::ListPages);
        Ok(self.pages.lock().clone())
    }

    async fn get_page(&self, page: PageId) -> CoreResult<WirePage> {
        self.pages
            .lock()
            .iter()
            .find(|p| p.note_id == page)
            .cloned()
            .ok_or_else(|| CoreError::Backend("Page not found".into()))
    }

    async fn create_page(&self, notebook: NotebookId, content: &str) -> CoreResult<WirePage> {
        self.record(Call::CreatePage(content.to_string()));
        if self.fail_create_for.lock().as_deref() == Some(content) {
            return Err(CoreError::Backend("Failed to create page".into()));
        }
        let page = WirePage {
            note_id: self.next_id(),
            notebook_id: notebook,
            content: content.to_string(),
            created_at: None,
            updated_at: None,
        };
        self.pages.lock().push(page.clone());
        Ok(page)
    }

    async fn update_page(&self, page: PageId, content: &str) -> CoreResult<WirePage> {
        self.record(Call::UpdatePage(page, content.to_string()));
        let mut pages = self.pages.lock();
        match pages.iter_mut().find(|p| p.note_id == page) {
            Some(p) => {
                p.content = content.to_string();
                Ok(p.clone())
            }
            None => Err(CoreError::Backend("Failed to update page".into())),
        }
    }

    async fn delete_page(&self, page: PageId) -> CoreResult<Ack> {
        self.record(Call::DeletePage(page));
        self.pages.lock().retain(|p| p.note_id != page);
        Self::ack("Page deleted")
    }

    async fn list_notebooks(&self) -> CoreResult<Vec<WireNotebook>> {
        Ok(vec![notebook(1, "Algebra")])
    }

    async fn search_notebooks(&self, query: &str) -> CoreResult<Vec<WireNotebook>> {
        self.record(Call::Search(query.to_string()));
        Ok(vec![notebook(1, "Algebra")])
    }

    async fn get_notebook(&self, id: NotebookId) -> CoreResult<WireNotebook> {
        Ok(notebook(id, "Algebra"))
    }

    async fn create_notebook(&self, req: &CreateNotebookRequest) -> CoreResult<WireNotebook> {
        self.record(Call::CreateNotebook(req.title.clone()));
        let mut nb = notebook(self.next_id(), &req.title);
        nb.course_name = Some(req.course_name.clone());
        nb.visibility = req.visibility;
        Ok(nb)
    }

    async fn delete_notebook(&self, _notebook: NotebookId) -> CoreResult<Ack> {
        Self::ack("Deleted")
    }

    async fn list_collaborators(&self, _notebook: NotebookId) -> CoreResult<Vec<Collaborator>> {
        self.record(Call::ListCollaborators);
        Ok(self.collaborators.lock().clone())
    }

    async fn add_collaborator(
        &self,
        _notebook: NotebookId,
        email: &str,
        role: Role,
    ) -> CoreResult<Ack> {
        self.record(Call::AddCollaborator(email.to_string(), role));
        let user_id = self.next_id();
        self.collaborators.lock().push(Collaborator {
            user_id,
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            role,
        });
        Self::ack("Added")
    }

    async fn remove_collaborator(&self, _notebook: NotebookId, user: UserId) -> CoreResult<Ack> {
        self.record(Call::RemoveCollaborator(user));
        self.collaborators.lock().retain(|c| c.user_id != user);
        Self::ack("Removed")
    }

    async fn list_questions(&self, page: PageId) -> CoreResult<Vec<Question>> {
        self.record(Call::ListQuestions(page));
        Ok(self
            .questions
            .lock()
            .iter()
            .filter(|q| q.note_id == page)
            .cloned()
            .collect())
    }

    async fn post_question(&self, page: PageId, text: &str) -> CoreResult<Ack> {
        self.record(Call::PostQuestion(page, text.to_string()));
        let question_id = self.next_id();
        self.questions.lock().push(Question {
            question_id,
            note_id: page,
            question_text: text.to_string(),
            user_id: 7,
            user_name: Some("Ada".into()),
            timestamp: json!(question_id),
            answers: Vec::new(),
        });
        Self::ack("Question posted")
    }

    async fn post_answer(&self, question: QuestionId, text: &str) -> CoreResult<Ack> {
        self.record(Call::PostAnswer(question, text.to_string()));
        let answer_id = self.next_id();
        let mut questions = self.questions.lock();
        let Some(q) = questions.iter_mut().find(|q| q.question_id == question) else {
            return Err(CoreError::Backend("Question not found".into()));
        };
        q.answers.push(Answer {
            answer_id,
            question_id: question,
            answer_text: text.to_string(),
            user_id: 7,
            user_name: Some("Ada".into()),
            timestamp: json!(answer_id),
        });
        Self::ack("Answer posted")
    }

    async fn login(&self, email: &str, _password: &str) -> CoreResult<AuthResponse> {
        Ok(AuthResponse {
            user: user(email),
            token: "token".into(),
        })
    }

    async fn register(&self, _name: &str, email: &str, _password: &str) -> CoreResult<AuthResponse> {
        self.login(email, "").await
    }

    async fn me(&self) -> CoreResult<AuthUser> {
        Ok(user("ada@example.com"))
    }
}

fn user(email: &str) -> AuthUser {
    AuthUser {
        user_id: 7,
        name: "Ada".into(),
        email: email.into(),
    }
}

fn notebook(id: NotebookId, title: &str) -> WireNotebook {
    WireNotebook {
        notebook_id: id,
        title: title.into(),
        course_name: None,
        owner_id: 7,
        owner_name: None,
        visibility: Default::default(),
        created_at: None,
        updated_at: None,
        user_role: Some(Role::Owner),
    }
}
