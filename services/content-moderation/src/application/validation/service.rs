//! 审核流程服务
//!
//! 每个状态转换遵循同一流程:
//! 1. 加载内容与操作者（NotFound）
//! 2. 授权（Forbidden）
//! 3. 检查当前状态（InvalidState）
//! 4. 修改状态与负载
//! 5. 通过工作单元一并提交内容与历史条目（Persistence / Conflict）
//! 6. 释放内容锁后发布事件，处理器失败不回滚
//!
//! 1-5 在内容锁内执行。

use std::sync::Arc;

use metrics::counter;
use spot_auth_core::{Account, ContentAction, ContentResource, ensure_content_action};
use spot_common::{ContentId, PagedResult, Pagination, UserId};
use spot_domain_core::AggregateRoot;
use spot_errors::{AppError, AppResult, ErrorKind, OperationResult};
use spot_event_core::EventPublisher;

use super::commands::*;
use super::locks::ContentLocks;
use super::queries::*;
use crate::config::WorkflowSettings;
use crate::domain::UnitOfWorkFactory;
use crate::domain::account::AccountRepository;
use crate::domain::content::{
    ContentQuery, ContentRecord, ContentRepository, TransitionInfo, ValidationEvent,
    ValidationHistoryEntry, ValidationHistoryRepository, ValidationStatus,
};
use crate::error::ModerationError;

/// 状态转换描述
struct Transition {
    operation: &'static str,
    action: ContentAction,
    allowed_from: &'static [ValidationStatus],
    expected: &'static str,
    target: ValidationStatus,
    notes: Option<String>,
}

/// 审核流程服务
pub struct ValidationWorkflow {
    accounts: Arc<dyn AccountRepository>,
    contents: Arc<dyn ContentRepository>,
    history: Arc<dyn ValidationHistoryRepository>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    publisher: Arc<dyn EventPublisher<ValidationEvent>>,
    locks: ContentLocks,
    settings: WorkflowSettings,
}

impl ValidationWorkflow {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        contents: Arc<dyn ContentRepository>,
        history: Arc<dyn ValidationHistoryRepository>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        publisher: Arc<dyn EventPublisher<ValidationEvent>>,
    ) -> Self {
        Self {
            accounts,
            contents,
            history,
            uow_factory,
            publisher,
            locks: ContentLocks::new(),
            settings: WorkflowSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    // ---------------------------------------------------------------
    // 命令
    // ---------------------------------------------------------------

    /// 提交新内容（-> Pending）
    pub async fn submit_content(&self, cmd: SubmitContentCommand) -> OperationResult<ContentRecord> {
        let result = self.handle_submit(cmd).await;
        self.finish("submit_content", result)
    }

    /// 分配审核（Pending -> UnderReview）
    pub async fn assign_for_review(
        &self,
        cmd: AssignForReviewCommand,
    ) -> OperationResult<ContentRecord> {
        let plan = Transition {
            operation: "assign_for_review",
            action: ContentAction::Moderate,
            allowed_from: &[ValidationStatus::Pending],
            expected: "pending",
            target: ValidationStatus::UnderReview,
            notes: cmd.notes.clone(),
        };
        let notes = cmd.notes;
        let result = self
            .transition(
                cmd.content_id,
                cmd.actor_id,
                plan,
                |_, _| {},
                move |transition| ValidationEvent::ReviewAssigned { transition, notes },
            )
            .await;
        self.finish("assign_for_review", result)
    }

    /// 审核通过（UnderReview / SafetyReview -> Approved）
    pub async fn approve(&self, cmd: ApproveContentCommand) -> OperationResult<ContentRecord> {
        let plan = Transition {
            operation: "approve",
            action: ContentAction::Validate,
            allowed_from: &[ValidationStatus::UnderReview, ValidationStatus::SafetyReview],
            expected: "under review or in safety review",
            target: ValidationStatus::Approved,
            notes: cmd.notes.clone(),
        };
        let notes = cmd.notes;
        let result = self
            .transition(
                cmd.content_id,
                cmd.actor_id,
                plan,
                |content, actor_id| content.mark_reviewed(actor_id),
                move |transition| ValidationEvent::ContentApproved { transition, notes },
            )
            .await;
        self.finish("approve", result)
    }

    /// 审核驳回（UnderReview / SafetyReview -> Rejected）
    pub async fn reject(&self, cmd: RejectContentCommand) -> OperationResult<ContentRecord> {
        let result = match cmd.validate() {
            Ok(()) => {
                let reasons = cmd.normalized_reasons();
                let plan = Transition {
                    operation: "reject",
                    action: ContentAction::Reject,
                    allowed_from: &[ValidationStatus::UnderReview, ValidationStatus::SafetyReview],
                    expected: "under review or in safety review",
                    target: ValidationStatus::Rejected,
                    notes: Some(reasons.join("; ")),
                };
                let recorded = reasons.clone();
                self.transition(
                    cmd.content_id,
                    cmd.actor_id,
                    plan,
                    move |content, actor_id| {
                        content.mark_reviewed(actor_id);
                        content.record_rejection(&recorded);
                    },
                    move |transition| ValidationEvent::ContentRejected { transition, reasons },
                )
                .await
            }
            Err(e) => Err(e.into()),
        };
        self.finish("reject", result)
    }

    /// 标记安全复审（UnderReview -> SafetyReview）
    pub async fn flag_for_safety_review(
        &self,
        cmd: FlagForSafetyReviewCommand,
    ) -> OperationResult<ContentRecord> {
        let result = match cmd.validate() {
            Ok(()) => {
                let flag = cmd.flag;
                let note = format!("[{}] {}", flag.severity.as_str(), flag.details.trim());
                let plan = Transition {
                    operation: "flag_for_safety_review",
                    action: ContentAction::SafetyReview,
                    allowed_from: &[ValidationStatus::UnderReview],
                    expected: "under review",
                    target: ValidationStatus::SafetyReview,
                    notes: Some(note.clone()),
                };
                self.transition(
                    cmd.content_id,
                    cmd.actor_id,
                    plan,
                    move |content, actor_id| content.add_safety_note(actor_id, note),
                    move |transition| ValidationEvent::ContentFlaggedForSafety { transition, flag },
                )
                .await
            }
            Err(e) => Err(e.into()),
        };
        self.finish("flag_for_safety_review", result)
    }

    /// 完成安全复审（SafetyReview -> Approved / Rejected）
    pub async fn complete_safety_review(
        &self,
        cmd: CompleteSafetyReviewCommand,
    ) -> OperationResult<ContentRecord> {
        let outcome = cmd.outcome;
        let plan = Transition {
            operation: "complete_safety_review",
            action: ContentAction::SafetyReview,
            allowed_from: &[ValidationStatus::SafetyReview],
            expected: "in safety review",
            target: outcome.target_status(),
            notes: cmd.notes.clone(),
        };
        let note = cmd.notes.clone();
        let notes = cmd.notes;
        let result = self
            .transition(
                cmd.content_id,
                cmd.actor_id,
                plan,
                move |content, actor_id| {
                    content.mark_reviewed(actor_id);
                    if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
                        content.add_safety_note(actor_id, note);
                    }
                },
                move |transition| ValidationEvent::SafetyReviewCompleted {
                    transition,
                    outcome,
                    notes,
                },
            )
            .await;
        self.finish("complete_safety_review", result)
    }

    /// 归档（任一非终态 -> Archived）
    pub async fn archive(&self, cmd: ArchiveContentCommand) -> OperationResult<ContentRecord> {
        let plan = Transition {
            operation: "archive",
            action: ContentAction::Archive,
            allowed_from: &[
                ValidationStatus::Pending,
                ValidationStatus::UnderReview,
                ValidationStatus::SafetyReview,
            ],
            expected: "pending, under review or in safety review",
            target: ValidationStatus::Archived,
            notes: cmd.reason.clone(),
        };
        let reason = cmd.reason;
        let result = self
            .transition(
                cmd.content_id,
                cmd.actor_id,
                plan,
                |_, _| {},
                move |transition| ValidationEvent::ContentArchived { transition, reason },
            )
            .await;
        self.finish("archive", result)
    }

    // ---------------------------------------------------------------
    // 查询
    // ---------------------------------------------------------------

    /// 待审核内容，按创建时间升序
    pub async fn list_under_review(
        &self,
        query: ListUnderReviewQuery,
    ) -> OperationResult<PagedResult<ContentRecord>> {
        let result = self
            .list_by_status(ValidationStatus::UnderReview, query.pagination)
            .await;
        self.finish("list_under_review", result)
    }

    /// 安全复审中的内容，按创建时间升序
    pub async fn list_flagged_for_safety(
        &self,
        query: ListFlaggedForSafetyQuery,
    ) -> OperationResult<PagedResult<ContentRecord>> {
        let result = self
            .list_by_status(ValidationStatus::SafetyReview, query.pagination)
            .await;
        self.finish("list_flagged_for_safety", result)
    }

    /// 审核历史，按追加顺序
    pub async fn validation_history(
        &self,
        query: ValidationHistoryQuery,
    ) -> OperationResult<PagedResult<ValidationHistoryEntry>> {
        let result = self.handle_history(query).await;
        self.finish("validation_history", result)
    }

    /// 获取内容详情
    pub async fn get_content(&self, content_id: ContentId) -> OperationResult<ContentRecord> {
        let result = self.load_content(&content_id).await;
        self.finish("get_content", result)
    }

    // ---------------------------------------------------------------
    // 内部实现
    // ---------------------------------------------------------------

    async fn handle_submit(&self, cmd: SubmitContentCommand) -> AppResult<ContentRecord> {
        cmd.validate()?;

        let actor = self.load_actor(&cmd.actor_id).await?;
        let mut content = ContentRecord::new(actor.id, cmd.title.trim());
        if let Some(specialization) = cmd.required_specialization {
            content = content.with_required_specialization(specialization);
        }

        self.authorize(&actor, &content, ContentAction::Create)?;

        let entry = ValidationHistoryEntry::new(
            content.id,
            actor.id,
            None,
            ValidationStatus::Pending,
            None,
        );
        self.commit(&content, &entry).await?;
        content.set_version(content.version() + 1);

        tracing::info!(
            content_id = %content.id,
            actor_id = %actor.id,
            "Content submitted"
        );
        counter!("content_transitions_total",
            "operation" => "submit_content",
            "to" => ValidationStatus::Pending.as_str()
        )
        .increment(1);

        let transition = TransitionInfo::new(content.id, actor.id, None, ValidationStatus::Pending);
        self.publish(ValidationEvent::ContentSubmitted {
            transition,
            title: content.title.clone(),
        })
        .await;

        Ok(content)
    }

    async fn transition<A, B>(
        &self,
        content_id: ContentId,
        actor_id: UserId,
        plan: Transition,
        apply: A,
        build_event: B,
    ) -> AppResult<ContentRecord>
    where
        A: FnOnce(&mut ContentRecord, UserId) + Send,
        B: FnOnce(TransitionInfo) -> ValidationEvent + Send,
    {
        let guard = self.locks.acquire(content_id).await;

        let mut content = self.load_content(&content_id).await?;
        let actor = self.load_actor(&actor_id).await?;

        self.authorize(&actor, &content, plan.action)?;

        let previous = content.status();
        if !plan.allowed_from.contains(&previous) {
            return Err(ModerationError::UnexpectedStatus {
                content_id,
                operation: plan.operation,
                expected: plan.expected,
                actual: previous,
            }
            .into());
        }

        content.transition_to(plan.target, actor.id)?;
        apply(&mut content, actor.id);

        let entry =
            ValidationHistoryEntry::new(content_id, actor.id, Some(previous), plan.target, plan.notes);
        self.commit(&content, &entry).await?;
        content.set_version(content.version() + 1);

        drop(guard);
        self.locks.prune_idle();

        tracing::info!(
            content_id = %content_id,
            actor_id = %actor.id,
            from = %previous,
            to = %plan.target,
            operation = plan.operation,
            "Content status changed"
        );
        counter!("content_transitions_total",
            "operation" => plan.operation,
            "to" => plan.target.as_str()
        )
        .increment(1);

        let transition = TransitionInfo::new(content_id, actor.id, Some(previous), plan.target);
        self.publish(build_event(transition)).await;

        Ok(content)
    }

    fn authorize<C: ContentResource + ?Sized>(
        &self,
        actor: &Account,
        content: &C,
        action: ContentAction,
    ) -> AppResult<()> {
        ensure_content_action(actor, content, action).inspect_err(|e| {
            tracing::warn!(
                actor_id = %actor.id,
                action = %action,
                error = %e,
                "Content action denied"
            );
            counter!("content_action_denials_total", "action" => action.as_str()).increment(1);
        })
    }

    /// 内容更新与历史条目在同一工作单元内提交
    async fn commit(&self, content: &ContentRecord, entry: &ValidationHistoryEntry) -> AppResult<()> {
        let mut uow = self.uow_factory.begin().await?;

        let staged = match uow.save_content(content).await {
            Ok(()) => uow.append_history(entry).await,
            Err(e) => Err(e),
        };

        if let Err(e) = staged {
            if let Err(rollback_error) = uow.rollback().await {
                tracing::error!(
                    content_id = %content.id,
                    error = %rollback_error,
                    "Failed to roll back unit of work"
                );
            }
            return Err(e);
        }

        uow.commit().await
    }

    /// 发布转换事件及对应的 StatusChanged 事件
    async fn publish(&self, event: ValidationEvent) {
        let status_changed = event.status_changed();
        self.publisher.publish_batch(vec![event, status_changed]).await;
    }

    async fn load_content(&self, content_id: &ContentId) -> AppResult<ContentRecord> {
        self.contents
            .find_by_id(content_id)
            .await?
            .ok_or_else(|| ModerationError::ContentNotFound(*content_id).into())
    }

    async fn load_actor(&self, actor_id: &UserId) -> AppResult<Account> {
        self.accounts
            .find_by_id(actor_id)
            .await?
            .ok_or_else(|| ModerationError::AccountNotFound(*actor_id).into())
    }

    async fn list_by_status(
        &self,
        status: ValidationStatus,
        pagination: Option<Pagination>,
    ) -> AppResult<PagedResult<ContentRecord>> {
        let pagination = self.settings.resolve_pagination(pagination);
        let (items, total) = self
            .contents
            .query(&ContentQuery::by_status(status, pagination))
            .await?;
        Ok(PagedResult::new(items, total, &pagination))
    }

    async fn handle_history(
        &self,
        query: ValidationHistoryQuery,
    ) -> AppResult<PagedResult<ValidationHistoryEntry>> {
        self.load_content(&query.content_id).await?;

        let pagination = self.settings.resolve_pagination(query.pagination);
        let (items, total) = self
            .history
            .list_by_content(&query.content_id, &pagination)
            .await?;
        Ok(PagedResult::new(items, total, &pagination))
    }

    /// 统一记录结果并转换为对外返回结构
    fn finish<T>(&self, operation: &'static str, result: AppResult<T>) -> OperationResult<T> {
        match &result {
            Ok(_) => {
                counter!("moderation_operations_total",
                    "operation" => operation,
                    "outcome" => "success"
                )
                .increment(1);
            }
            Err(e) => {
                log_failure(operation, e);
                counter!("moderation_operations_total",
                    "operation" => operation,
                    "outcome" => e.kind().code()
                )
                .increment(1);
            }
        }
        result.into()
    }
}

fn log_failure(operation: &'static str, error: &AppError) {
    match error.kind() {
        ErrorKind::Persistence
        | ErrorKind::Internal
        | ErrorKind::HandlerFailure
        | ErrorKind::Configuration => {
            tracing::error!(operation, error = %error, "Moderation operation failed");
        }
        _ => {
            tracing::warn!(operation, error = %error, "Moderation operation rejected");
        }
    }
}
