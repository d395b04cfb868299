//! Question and answer threads attached to a single page.

use notebook_api::{PageId, Question, QuestionId};
use tracing::info;

use crate::{
    backend::Backend,
    error::{CoreError, CoreResult},
};

pub async fn thread(backend: &dyn Backend, page: PageId) -> CoreResult<Vec<Question>> {
    backend.list_questions(page).await
}

/// Ask a question on `page`, then return the reloaded thread.
pub async fn ask(backend: &dyn Backend, page: PageId, text: &str) -> CoreResult<Vec<Question>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CoreError::validation("Question text is required"));
    }
    backend.post_question(page, text).await?;
    info!(page, "question posted");
    backend.list_questions(page).await
}

/// Answer `question`, then return the reloaded thread of `page`.
pub async fn answer(
    backend: &dyn Backend,
    page: PageId,
    question: QuestionId,
    text: &str,
) -> CoreResult<Vec<Question>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CoreError::validation("Answer text is required"));
    }
    backend.post_answer(question, text).await?;
    info!(page, question, "answer posted");
    backend.list_questions(page).await
}
