use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, TodoFilter, TodoId};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn add(&self, text: &str, target_date: &str) -> ServiceResult<Todo>;
    async fn list(&self, filter: TodoFilter) -> ServiceResult<Vec<Todo>>;
    async fn delete(&self, id: TodoId) -> ServiceResult<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn add(&self, text: &str, target_date: &str) -> ServiceResult<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation("invalid_todo"));
        }
        let target_date = parse_day(target_date, today()).ok_or(ServiceError::Validation("invalid_todo"))?;
        let todo = self
            .repo
            .create(CreateTodo { text: text.to_string(), target_date })
            .await
            .map_err(ServiceError::Store)?;
        tracing::debug!(id = todo.id.0, %target_date, "todo created");
        Ok(todo)
    }

    async fn list(&self, filter: TodoFilter) -> ServiceResult<Vec<Todo>> {
        self.repo.list(filter).await.map_err(ServiceError::Store)
    }

    async fn delete(&self, id: TodoId) -> ServiceResult<()> {
        let removed = self.repo.delete(id).await.map_err(ServiceError::Store)?;
        if !removed {
            tracing::debug!(id = id.0, "delete of unknown todo ignored");
        }
        Ok(())
    }
}

/// Server-local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `today` or an ISO `YYYY-MM-DD` date.
pub fn parse_day(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("today") {
        return Some(today);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
