use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::keyword::{Keyword, KeywordId, KEYWORD_LIST_LIMIT};
use crate::domain::repository::KeywordRepository;
use async_trait::async_trait;

#[async_trait]
pub trait KeywordService: Send + Sync + 'static {
    async fn add(&self, keyword: &str) -> ServiceResult<Keyword>;
    async fn list(&self) -> ServiceResult<Vec<Keyword>>;
    async fn delete(&self, id: KeywordId) -> ServiceResult<()>;
}

#[derive(Clone)]
pub struct KeywordServiceImpl<R: KeywordRepository> {
    repo: R,
}

impl<R: KeywordRepository> KeywordServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: KeywordRepository> KeywordService for KeywordServiceImpl<R> {
    /// Stores the trimmed keyword; duplicates surface as a store failure.
    async fn add(&self, keyword: &str) -> ServiceResult<Keyword> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::Validation("invalid_keyword"));
        }
        self.repo.create(keyword.to_string()).await.map_err(ServiceError::Store)
    }

    async fn list(&self) -> ServiceResult<Vec<Keyword>> {
        self.repo.list_recent(KEYWORD_LIST_LIMIT).await.map_err(ServiceError::Store)
    }

    async fn delete(&self, id: KeywordId) -> ServiceResult<()> {
        self.repo.delete(id).await.map_err(ServiceError::Store)?;
        Ok(())
    }
}
