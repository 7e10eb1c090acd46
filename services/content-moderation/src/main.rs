//! Content Moderation Service - 服务入口
//!
//! 加载配置、初始化遥测、装配模块，并用内存数据跑一遍完整的审核流程。

use std::sync::Arc;

use content_moderation::ModerationModule;
use content_moderation::application::validation::{
    ApproveContentCommand, AssignForReviewCommand, CompleteSafetyReviewCommand,
    FlagForSafetyReviewCommand, ListFlaggedForSafetyQuery, SubmitContentCommand,
    ValidationHistoryQuery,
};
use content_moderation::domain::account::AccountRepository;
use content_moderation::domain::content::{SafetyFlag, SafetyOutcome, SafetySeverity};
use content_moderation::domain::navigation::destinations;
use content_moderation::infrastructure::notification::LoggingNotifier;
use content_moderation::infrastructure::session::SharedSessionContext;
use spot_auth_core::{Account, AccountType, ActorContext, Specialization};
use spot_config::AppConfig;
use spot_errors::{AppError, OperationResult};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = AppConfig::load(&config_dir)?;

    spot_telemetry::init_from_config(&config.telemetry);
    if config.telemetry.metrics_enabled {
        if let Err(e) = spot_telemetry::init_metrics() {
            tracing::warn!(error = %e, "Metrics exporter not installed");
        }
    }

    info!(app = %config.app_name, env = %config.app_env, "Starting content moderation service");

    let module = ModerationModule::in_memory(&config, Arc::new(LoggingNotifier))?;
    run_walkthrough(&module).await?;

    info!(tallies = ?module.analytics.snapshot(), "Walkthrough finished");
    Ok(())
}

/// 提交 -> 分配 -> 安全标记 -> 完成复审 -> 查看历史
async fn run_walkthrough(module: &ModerationModule) -> Result<(), AppError> {
    let forager = Account::new("River Forager", AccountType::Standard);
    let moderator = Account::active_moderator("Dr. Mycelia", Specialization::Mycology);
    let admin = Account::new("Site Admin", AccountType::Administrator);
    for account in [&forager, &moderator, &admin] {
        module.accounts.save(account).await?;
    }

    let session = SharedSessionContext::new();
    session.sign_in(moderator.clone(), module.settings.session_ttl);
    for destination in [
        destinations::MODERATION_QUEUE,
        destinations::SAFETY_REVIEW_QUEUE,
        destinations::ADMIN_DASHBOARD,
    ] {
        let allowed = module.guard.can_navigate_current(&session, destination);
        info!(
            destination,
            allowed,
            reason = ?module.guard.access_denied_message_current(&session, destination),
            "Navigation check"
        );
    }
    info!(
        destinations = ?module.guard.accessible_destinations(&session.current_session()),
        "Moderator menu"
    );

    let workflow = &module.workflow;
    let content = expect_value(
        workflow
            .submit_content(SubmitContentCommand {
                actor_id: forager.id,
                title: "Golden chanterelles under the oaks".to_string(),
                required_specialization: Some(Specialization::Mycology),
            })
            .await,
    )?;

    expect_value(
        workflow
            .assign_for_review(AssignForReviewCommand {
                content_id: content.id,
                actor_id: moderator.id,
                notes: Some("Taking this one".to_string()),
            })
            .await,
    )?;

    expect_value(
        workflow
            .flag_for_safety_review(FlagForSafetyReviewCommand {
                content_id: content.id,
                actor_id: moderator.id,
                flag: SafetyFlag::new(
                    SafetySeverity::High,
                    "Photo may show jack-o'-lantern mushrooms",
                ),
            })
            .await,
    )?;

    let flagged = expect_value(
        workflow
            .list_flagged_for_safety(ListFlaggedForSafetyQuery::default())
            .await,
    )?;
    info!(flagged = flagged.total, "Safety queue loaded");

    let reviewed = expect_value(
        workflow
            .complete_safety_review(CompleteSafetyReviewCommand {
                content_id: content.id,
                actor_id: admin.id,
                outcome: SafetyOutcome::Cleared,
                notes: Some("Gill structure confirms chanterelle".to_string()),
            })
            .await,
    )?;
    info!(status = %reviewed.status(), "Safety review completed");

    // 终态之后的转换会被拒绝
    let late_approval = workflow
        .approve(ApproveContentCommand {
            content_id: content.id,
            actor_id: moderator.id,
            notes: None,
        })
        .await;
    info!(
        success = late_approval.success,
        error = ?late_approval.error_message,
        "Second approval attempt"
    );

    let history = expect_value(
        workflow
            .validation_history(ValidationHistoryQuery::new(content.id))
            .await,
    )?;
    for entry in &history.items {
        info!(
            from = ?entry.previous_status,
            to = %entry.new_status,
            validator = %entry.validator_id,
            notes = ?entry.notes,
            "History entry"
        );
    }

    Ok(())
}

fn expect_value<T>(result: OperationResult<T>) -> Result<T, AppError> {
    if !result.success {
        return Err(AppError::internal(
            result
                .error_message
                .unwrap_or_else(|| "operation failed".to_string()),
        ));
    }
    result
        .value
        .ok_or_else(|| AppError::internal("operation returned no value"))
}
