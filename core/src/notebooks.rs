//! Notebook, sharing and account operations around the editing core.

use notebook_api::{
    AuthResponse, Collaborator, CreateNotebookRequest, NotebookId, Role, UserId, Visibility,
};
use tracing::info;

use crate::{
    backend::Backend,
    error::{CoreError, CoreResult},
    model::{Notebook, Page},
    pagination::PageBook,
};

fn required(value: &str, what: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        Err(CoreError::validation(format!("{what} is required")))
    } else {
        Ok(())
    }
}

pub async fn dashboard(backend: &dyn Backend) -> CoreResult<Vec<Notebook>> {
    let list = backend.list_notebooks().await?;
    Ok(list.into_iter().map(Notebook::from).collect())
}

/// Search by title. A blank query matches nothing and sends no request.
pub async fn search(backend: &dyn Backend, query: &str) -> CoreResult<Vec<Notebook>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let list = backend.search_notebooks(query).await?;
    Ok(list.into_iter().map(Notebook::from).collect())
}

pub async fn create(
    backend: &dyn Backend,
    title: &str,
    course_name: &str,
    visibility: Visibility,
) -> CoreResult<Notebook> {
    required(title, "Title")?;
    let req = CreateNotebookRequest {
        title: title.trim().to_string(),
        course_name: course_name.trim().to_string(),
        visibility,
    };
    let created = backend.create_notebook(&req).await?;
    info!(notebook = created.notebook_id, "notebook created");
    Ok(created.into())
}

pub async fn delete(backend: &dyn Backend, notebook: NotebookId) -> CoreResult<()> {
    backend.delete_notebook(notebook).await?;
    info!(notebook, "notebook deleted");
    Ok(())
}

/// Load a notebook and its pages, ready for editing from the cover.
pub async fn open(backend: &dyn Backend, notebook: NotebookId) -> CoreResult<(Notebook, PageBook)> {
    let meta = backend.get_notebook(notebook).await?;
    let pages = backend.list_pages(notebook).await?;
    let book = PageBook::new(pages.into_iter().map(Page::from).collect());
    Ok((meta.into(), book))
}

pub async fn collaborators(
    backend: &dyn Backend,
    notebook: NotebookId,
) -> CoreResult<Vec<Collaborator>> {
    backend.list_collaborators(notebook).await
}

/// Invite by e-mail, then return the refreshed collaborator list.
pub async fn share(
    backend: &dyn Backend,
    notebook: NotebookId,
    email: &str,
    role: Role,
) -> CoreResult<Vec<Collaborator>> {
    required(email, "Email")?;
    backend.add_collaborator(notebook, email.trim(), role).await?;
    info!(notebook, ?role, "collaborator added");
    backend.list_collaborators(notebook).await
}

pub async fn unshare(
    backend: &dyn Backend,
    notebook: NotebookId,
    user: UserId,
) -> CoreResult<Vec<Collaborator>> {
    backend.remove_collaborator(notebook, user).await?;
    info!(notebook, user, "collaborator removed");
    backend.list_collaborators(notebook).await
}

pub async fn login(backend: &dyn Backend, email: &str, password: &str) -> CoreResult<AuthResponse> {
    required(email, "Email")?;
    required(password, "Password")?;
    backend.login(email.trim(), password).await
}

pub async fn register(
    backend: &dyn Backend,
    name: &str,
    email: &str,
    password: &str,
) -> CoreResult<AuthResponse> {
    required(name, "Name")?;
    required(email, "Email")?;
    required(password, "Password")?;
    backend.register(name.trim(), email.trim(), password).await
}
