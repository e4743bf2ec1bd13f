use async_trait::async_trait;
use super::keyword::{Keyword, KeywordId};
use super::todo::{CreateTodo, Todo, TodoFilter, TodoId};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> anyhow::Result<Todo>;
    async fn list(&self, filter: TodoFilter) -> anyhow::Result<Vec<Todo>>;
    /// Returns whether a row was removed; a missing id is not an error.
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait KeywordRepository: Send + Sync + 'static {
    /// Fails when the keyword already exists.
    async fn create(&self, keyword: String) -> anyhow::Result<Keyword>;
    /// Newest first, at most `limit` rows.
    async fn list_recent(&self, limit: u32) -> anyhow::Result<Vec<Keyword>>;
    async fn delete(&self, id: KeywordId) -> anyhow::Result<bool>;
}
