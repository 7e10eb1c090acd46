//! 内存存储实现
//!
//! 单进程部署和测试使用。工作单元先暂存写入，提交时在同一把写锁下
//! 校验版本并一次性应用。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use spot_auth_core::Account;
use spot_common::{ContentId, Pagination, UserId};
use spot_domain_core::AggregateRoot;
use spot_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::domain::account::AccountRepository;
use crate::domain::content::{
    ContentQuery, ContentRecord, ContentRepository, ValidationHistoryEntry,
    ValidationHistoryRepository,
};
use crate::domain::{UnitOfWork, UnitOfWorkFactory};
use crate::error::ModerationError;

/// 内存账户仓储
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn save(&self, account: &Account) -> AppResult<()> {
        self.accounts.write().await.insert(account.id, account.clone());
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    contents: HashMap<ContentId, ContentRecord>,
    history: Vec<ValidationHistoryEntry>,
}

/// 内存内容存储（内容 + 审核历史 + 工作单元）
#[derive(Clone, Default)]
pub struct InMemoryModerationStore {
    state: Arc<RwLock<StoreState>>,
    fail_commits: Arc<AtomicBool>,
}

impl InMemoryModerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让之后的提交全部失败（用于测试持久化错误路径）
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub async fn content_count(&self) -> usize {
        self.state.read().await.contents.len()
    }

    pub async fn history_count(&self) -> usize {
        self.state.read().await.history.len()
    }
}

/// 取出某一页，并返回总数
fn paginate<'a, T: Clone + 'a>(
    items: impl Iterator<Item = &'a T>,
    pagination: &Pagination,
) -> (Vec<T>, u64) {
    let matching: Vec<&T> = items.collect();
    let total = matching.len() as u64;
    let page = matching
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(pagination.page_size as usize)
        .cloned()
        .collect();
    (page, total)
}

#[async_trait]
impl ContentRepository for InMemoryModerationStore {
    async fn find_by_id(&self, id: &ContentId) -> AppResult<Option<ContentRecord>> {
        Ok(self.state.read().await.contents.get(id).cloned())
    }

    async fn query(&self, query: &ContentQuery) -> AppResult<(Vec<ContentRecord>, u64)> {
        let state = self.state.read().await;

        let mut matching: Vec<&ContentRecord> = state
            .contents
            .values()
            .filter(|c| query.status.is_none_or(|status| c.status() == status))
            .collect();
        matching.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        Ok(paginate(matching.into_iter(), &query.pagination))
    }
}

#[async_trait]
impl ValidationHistoryRepository for InMemoryModerationStore {
    async fn list_by_content(
        &self,
        content_id: &ContentId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<ValidationHistoryEntry>, u64)> {
        let state = self.state.read().await;
        Ok(paginate(
            state.history.iter().filter(|e| &e.content_id == content_id),
            pagination,
        ))
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryModerationStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            contents: Vec::new(),
            history: Vec::new(),
        }))
    }
}

/// 内存工作单元
pub struct InMemoryUnitOfWork {
    store: InMemoryModerationStore,
    contents: Vec<ContentRecord>,
    history: Vec<ValidationHistoryEntry>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn save_content(&mut self, content: &ContentRecord) -> AppResult<()> {
        self.contents.push(content.clone());
        Ok(())
    }

    async fn append_history(&mut self, entry: &ValidationHistoryEntry) -> AppResult<()> {
        self.history.push(entry.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        if self.store.fail_commits.load(Ordering::SeqCst) {
            return Err(AppError::persistence("Storage rejected the commit"));
        }

        let state_lock = Arc::clone(&self.store.state);
        let mut state = state_lock.write().await;

        for content in &self.contents {
            let expected = content.version();
            match state.contents.get(&content.id) {
                None if expected == 0 => {}
                None => {
                    return Err(ModerationError::VersionConflict {
                        content_id: content.id,
                        expected,
                        actual: 0,
                    }
                    .into());
                }
                Some(_) if expected == 0 => {
                    return Err(ModerationError::ContentAlreadyExists(content.id).into());
                }
                Some(stored) if stored.version() != expected => {
                    return Err(ModerationError::VersionConflict {
                        content_id: content.id,
                        expected,
                        actual: stored.version(),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        let InMemoryUnitOfWork {
            contents, history, ..
        } = *self;

        for mut content in contents {
            content.set_version(content.version() + 1);
            state.contents.insert(content.id, content);
        }
        state.history.extend(history);

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        tracing::debug!(
            staged_contents = self.contents.len(),
            staged_history = self.history.len(),
            "Unit of work rolled back"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::ValidationStatus;
    use spot_errors::ErrorKind;

    fn pending(creator: UserId) -> ContentRecord {
        ContentRecord::new(creator, "Hen of the woods")
    }

    fn entry(content: &ContentRecord) -> ValidationHistoryEntry {
        ValidationHistoryEntry::new(
            content.id,
            content.creator_id,
            None,
            ValidationStatus::Pending,
            None,
        )
    }

    async fn insert(store: &InMemoryModerationStore, content: &ContentRecord) {
        let mut uow = store.begin().await.unwrap();
        uow.save_content(content).await.unwrap();
        uow.append_history(&entry(content)).await.unwrap();
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_applies_content_and_history_together() {
        let store = InMemoryModerationStore::new();
        let content = pending(UserId::new());

        insert(&store, &content).await;

        let stored = store.find_by_id(&content.id).await.unwrap().unwrap();
        assert_eq!(stored.version(), 1);
        assert_eq!(store.history_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_commit_applies_nothing() {
        let store = InMemoryModerationStore::new();
        store.set_fail_commits(true);
        let content = pending(UserId::new());

        let mut uow = store.begin().await.unwrap();
        uow.save_content(&content).await.unwrap();
        uow.append_history(&entry(&content)).await.unwrap();
        let err = uow.commit().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(store.content_count().await, 0);
        assert_eq!(store.history_count().await, 0);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = InMemoryModerationStore::new();
        let content = pending(UserId::new());
        insert(&store, &content).await;

        let loaded = store.find_by_id(&content.id).await.unwrap().unwrap();

        let mut first = loaded.clone();
        first.transition_to(ValidationStatus::UnderReview, UserId::new()).unwrap();
        let mut uow = store.begin().await.unwrap();
        uow.save_content(&first).await.unwrap();
        uow.commit().await.unwrap();

        let mut second = loaded;
        second.transition_to(ValidationStatus::Archived, UserId::new()).unwrap();
        let mut uow = store.begin().await.unwrap();
        uow.save_content(&second).await.unwrap();
        let err = uow.commit().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        let stored = store.find_by_id(&content.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ValidationStatus::UnderReview);
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = InMemoryModerationStore::new();
        let content = pending(UserId::new());
        insert(&store, &content).await;

        let mut uow = store.begin().await.unwrap();
        uow.save_content(&content).await.unwrap();
        assert_eq!(uow.commit().await.unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_query_orders_by_creation_and_paginates() {
        let store = InMemoryModerationStore::new();
        let creator = UserId::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let content = pending(creator);
            ids.push(content.id);
            insert(&store, &content).await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let (page, total) = store
            .query(&ContentQuery::by_status(
                ValidationStatus::Pending,
                Pagination::new(2, 2),
            ))
            .await
            .unwrap();

        assert_eq!(total, 5);
        let page_ids: Vec<ContentId> = page.iter().map(|c| c.id).collect();
        assert_eq!(page_ids, ids[2..4].to_vec());
    }

    #[tokio::test]
    async fn test_page_beyond_end_is_empty() {
        let store = InMemoryModerationStore::new();
        let content = pending(UserId::new());
        insert(&store, &content).await;

        let (page, total) = store
            .query(&ContentQuery::by_status(
                ValidationStatus::Pending,
                Pagination::new(u32::MAX, 100),
            ))
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 1);

        let (entries, total) = store
            .list_by_content(&content.id, &Pagination::new(u32::MAX, 100))
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_status_change_lands_with_its_history_entry() {
        let store = InMemoryModerationStore::new();
        let content = pending(UserId::new());
        insert(&store, &content).await;

        let moderator = UserId::new();
        let mut loaded = store.find_by_id(&content.id).await.unwrap().unwrap();
        loaded.transition_to(ValidationStatus::UnderReview, moderator).unwrap();
        let mut uow = store.begin().await.unwrap();
        uow.save_content(&loaded).await.unwrap();
        uow.append_history(&ValidationHistoryEntry::new(
            content.id,
            moderator,
            Some(ValidationStatus::Pending),
            ValidationStatus::UnderReview,
            None,
        ))
        .await
        .unwrap();
        uow.commit().await.unwrap();

        let stored = store.find_by_id(&content.id).await.unwrap().unwrap();
        let (entries, total) = store
            .list_by_content(&content.id, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(stored.status(), ValidationStatus::UnderReview);
        assert_eq!(total, 2);
        assert_eq!(
            entries.last().map(|e| e.new_status),
            Some(stored.status())
        );
    }

    #[tokio::test]
    async fn test_history_filters_by_content() {
        let store = InMemoryModerationStore::new();
        let first = pending(UserId::new());
        let second = pending(UserId::new());
        insert(&store, &first).await;
        insert(&store, &second).await;

        let (entries, total) = store
            .list_by_content(&first.id, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].content_id, first.id);
    }

    #[tokio::test]
    async fn test_account_repository_round_trip() {
        let repo = InMemoryAccountRepository::new();
        let account = Account::new("forager", spot_auth_core::AccountType::Standard);
        repo.save(&account).await.unwrap();

        assert_eq!(repo.find_by_id(&account.id).await.unwrap(), Some(account));
        assert_eq!(repo.find_by_id(&UserId::new()).await.unwrap(), None);
    }
}
