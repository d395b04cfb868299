use notebook_api::NotebookId;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    backend::Backend,
    error::{CoreError, CoreResult},
    model::Page,
    pagination::{PageBook, Position},
};

/// What a save did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// A save stopped at page `index`. Earlier pages were committed and keep
/// their server ids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("saving page {} failed: {source}", .index + 1)]
pub struct SaveError {
    pub index: usize,
    pub source: CoreError,
    pub committed: SaveReport,
}

/// Commit every page of `book` in order, one request at a time.
///
/// Pages with a server id are updated; new pages with text are created and
/// get the returned id; new blank pages are skipped. The `&mut` borrow keeps
/// the book exclusively ours until every id has been assigned.
pub async fn save_book(
    backend: &dyn Backend,
    notebook: NotebookId,
    book: &mut PageBook,
) -> Result<SaveReport, SaveError> {
    let mut report = SaveReport::default();
    for (index, page) in book.pages_mut().iter_mut().enumerate() {
        let step = save_page(backend, notebook, page).await;
        match step {
            Ok(Step::Created) => report.created += 1,
            Ok(Step::Updated) => report.updated += 1,
            Ok(Step::Skipped) => report.skipped += 1,
            Err(source) => {
                warn!(notebook, index, "save aborted: {source}");
                return Err(SaveError {
                    index,
                    source,
                    committed: report,
                });
            }
        }
    }
    info!(
        notebook,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "notebook saved"
    );
    Ok(report)
}

enum Step {
    Created,
    Updated,
    Skipped,
}

async fn save_page(backend: &dyn Backend, notebook: NotebookId, page: &mut Page) -> CoreResult<Step> {
    match page.server_id() {
        Some(id) => {
            backend.update_page(id, &page.content).await?;
            debug!(notebook, page = id, "page updated");
            Ok(Step::Updated)
        }
        None if page.content.trim().is_empty() => Ok(Step::Skipped),
        None => {
            let created = backend.create_page(notebook, &page.content).await?;
            page.assign_server_id(created.note_id);
            debug!(notebook, page = created.note_id, "page created");
            Ok(Step::Created)
        }
    }
}

/// Delete the page under the cursor. Persisted pages are deleted remotely
/// first; if that fails the page stays in the book.
pub async fn delete_current(backend: &dyn Backend, book: &mut PageBook) -> CoreResult<Option<Page>> {
    let Position::Page(index) = book.position() else {
        return Ok(None);
    };
    let Some(page) = book.take_current() else {
        return Err(CoreError::validation("A notebook needs at least one page"));
    };
    if let Some(id) = page.server_id() {
        if let Err(err) = backend.delete_page(id).await {
            book.restore(index, page);
            return Err(err);
        }
        info!(page = id, "page deleted");
    }
    Ok(Some(page))
}
