use std::time::Duration;

use async_trait::async_trait;
use notebook_api::{
    Ack, AddCollaboratorRequest, AuthResponse, AuthUser, Collaborator, CreateNotebookRequest,
    Envelope, LoginRequest, MessageId, NotebookId, PageContentRequest, PageId, QnaTextRequest,
    Question, QuestionId, RegisterRequest, Role, SendMessageRequest, UserId, WireMessage,
    WireNotebook, WirePage,
};
use parking_lot::Mutex;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    backend::Backend,
    error::{CoreError, CoreResult},
};

/// `Backend` over the notebook REST API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>) -> CoreResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CoreError::validation(
                "API URL must start with http:// or https://",
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token: Mutex::new(token),
        })
    }

    /// Replace the session token. `None` signs out.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.lock() = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.lock().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, method: Method, path: &str) -> CoreResult<RequestBuilder> {
        let token = self.token.lock().clone().ok_or(CoreError::Auth)?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    /// Send and parse the envelope. HTTP status is logged but not trusted.
    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> CoreResult<Envelope<T>> {
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            debug!(%status, "malformed envelope: {err}");
            CoreError::Transport(format!("malformed response ({status}): {err}"))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> CoreResult<T> {
        let req = self.authed(Method::GET, path)?;
        self.call(req)
            .await?
            .into_data(fallback)
            .map_err(CoreError::Backend)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> CoreResult<T> {
        let req = self.authed(method, path)?.json(body);
        self.call(req)
            .await?
            .into_data(fallback)
            .map_err(CoreError::Backend)
    }

    async fn ack(&self, req: RequestBuilder, fallback: &str, default: &str) -> CoreResult<Ack> {
        let ack = self
            .call::<Ack>(req)
            .await?
            .into_ack(fallback)
            .map_err(CoreError::Backend)?;
        Ok(ack.unwrap_or_else(|| Ack {
            message: default.to_string(),
        }))
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> CoreResult<AuthResponse> {
        let req = self.client.post(self.url(path)).json(body);
        let resp = self
            .call::<AuthResponse>(req)
            .await?
            .into_data(fallback)
            .map_err(CoreError::Backend)?;
        self.set_token(Some(resp.token.clone()));
        Ok(resp)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_messages(&self, notebook: NotebookId) -> CoreResult<Vec<WireMessage>> {
        self.get(
            &format!("notebooks/messages/{notebook}"),
            "Failed to fetch messages",
        )
        .await
    }

    async fn send_message(&self, notebook: NotebookId, raw_text: &str) -> CoreResult<Ack> {
        let req = self
            .authed(Method::POST, &format!("notebooks/messages/{notebook}"))?
            .json(&SendMessageRequest {
                text: raw_text.to_string(),
            });
        self.ack(req, "Failed to send message", "Sent").await
    }

    async fn delete_message(&self, message: MessageId) -> CoreResult<Ack> {
        let req = self.authed(Method::DELETE, &format!("notebooks/messages/{message}"))?;
        self.ack(req, "Failed to delete message", "Message deleted")
            .await
    }

    async fn list_pages(&self, notebook: NotebookId) -> CoreResult<Vec<WirePage>> {
        self.get(&format!("notebooks/{notebook}/pages"), "Failed to fetch pages")
            .await
    }

    async fn get_page(&self, page: PageId) -> CoreResult<WirePage> {
        self.get(&format!("pages/{page}"), "Page not found").await
    }

    async fn create_page(&self, notebook: NotebookId, content: &str) -> CoreResult<WirePage> {
        let body = PageContentRequest {
            content: content.to_string(),
        };
        self.send_json(
            Method::POST,
            &format!("notebooks/{notebook}/pages"),
            &body,
            "Failed to create page",
        )
        .await
    }

    async fn update_page(&self, page: PageId, content: &str) -> CoreResult<WirePage> {
        let body = PageContentRequest {
            content: content.to_string(),
        };
        self.send_json(
            Method::PUT,
            &format!("pages/{page}"),
            &body,
            "Failed to update page",
        )
        .await
    }

    async fn delete_page(&self, page: PageId) -> CoreResult<Ack> {
        let req = self.authed(Method::DELETE, &format!("pages/{page}"))?;
        self.ack(req, "Failed to delete page", "Page deleted").await
    }

    async fn list_notebooks(&self) -> CoreResult<Vec<WireNotebook>> {
        self.get("notebooks", "Failed to fetch notebooks").await
    }

    async fn search_notebooks(&self, query: &str) -> CoreResult<Vec<WireNotebook>> {
        let req = self
            .authed(Method::GET, "notebooks/search")?
            .query(&[("q", query)]);
        self.call(req)
            .await?
            .into_data("Failed to search notebooks")
            .map_err(CoreError::Backend)
    }

    async fn get_notebook(&self, notebook: NotebookId) -> CoreResult<WireNotebook> {
        self.get(&format!("notebooks/{notebook}"), "Notebook not found")
            .await
    }

    async fn create_notebook(&self, req: &CreateNotebookRequest) -> CoreResult<WireNotebook> {
        self.send_json(Method::POST, "notebooks", req, "Failed to create notebook")
            .await
    }

    async fn delete_notebook(&self, notebook: NotebookId) -> CoreResult<Ack> {
        let req = self.authed(Method::DELETE, &format!("notebooks/{notebook}"))?;
        self.ack(req, "Failed to delete notebook", "Deleted").await
    }

    async fn list_collaborators(&self, notebook: NotebookId) -> CoreResult<Vec<Collaborator>> {
        self.get(
            &format!("notebooks/{notebook}/collaborators"),
            "Failed to fetch collaborators",
        )
        .await
    }

    async fn add_collaborator(
        &self,
        notebook: NotebookId,
        email: &str,
        role: Role,
    ) -> CoreResult<Ack> {
        let req = self
            .authed(Method::POST, &format!("notebooks/{notebook}/collaborators"))?
            .json(&AddCollaboratorRequest {
                email: email.to_string(),
                role,
            });
        self.ack(req, "Failed to add collaborator", "Added").await
    }

    async fn remove_collaborator(&self, notebook: NotebookId, user: UserId) -> CoreResult<Ack> {
        let req = self.authed(
            Method::DELETE,
            &format!("notebooks/{notebook}/collaborators/{user}"),
        )?;
        self.ack(req, "Failed to remove collaborator", "Removed")
            .await
    }

    async fn list_questions(&self, page: PageId) -> CoreResult<Vec<Question>> {
        self.get(&format!("pages/{page}/questions"), "Failed to fetch questions")
            .await
    }

    async fn post_question(&self, page: PageId, text: &str) -> CoreResult<Ack> {
        let req = self
            .authed(Method::POST, &format!("pages/{page}/questions"))?
            .json(&QnaTextRequest {
                text: text.to_string(),
            });
        self.ack(req, "Failed to post question", "Posted").await
    }

    async fn post_answer(&self, question: QuestionId, text: &str) -> CoreResult<Ack> {
        let req = self
            .authed(Method::POST, &format!("questions/{question}/answers"))?
            .json(&QnaTextRequest {
                text: text.to_string(),
            });
        self.ack(req, "Failed to post answer", "Posted").await
    }

    async fn login(&self, email: &str, password: &str) -> CoreResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate("auth/login", &body, "Login failed").await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> CoreResult<AuthResponse> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate("auth/register", &body, "Registration failed")
            .await
    }

    async fn me(&self) -> CoreResult<AuthUser> {
        self.get("auth/me", "Not authenticated").await
    }
}
