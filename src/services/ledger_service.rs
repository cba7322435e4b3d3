use crate::entities::user_entity as users;
use crate::entities::users::{Plan, SubscriptionStatus};
use crate::error::{AppError, AppResult};
use crate::models::billing::FREE_PLAN_CREDITS;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::sync::Arc;

/// Gate decision rule ("credits model"): enterprise is unlimited, everyone
/// else needs a positive balance.
pub fn can_generate(plan: Plan, credits: i64) -> bool {
    plan.is_unlimited() || credits > 0
}

/// True when `now` is in a later calendar month (UTC) than `last_reset`.
pub fn month_rolled_over(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.year() > last_reset.year()
        || (now.year() == last_reset.year() && now.month() > last_reset.month())
}

/// Atomic read-modify-write operations over the per-account credits ledger.
/// Every method is a single SQL statement against the `users` row; no
/// multi-account transaction exists.
#[derive(Clone)]
pub struct LedgerService {
    pool: Arc<DatabaseConnection>,
}

impl LedgerService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::SubscriptionId.eq(subscription_id))
            .one(self.pool.as_ref())
            .await?)
    }

    /// Conditional decrement: `UPDATE users SET credits = credits - 1 WHERE
    /// id = ? AND credits > 0`. Two concurrent requests racing for the last
    /// credit resolve at the database; exactly one sees `rows_affected == 1`.
    pub async fn try_consume_credit(&self, user_id: i64) -> AppResult<bool> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).sub(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::Credits.gt(0))
            .exec(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Bumps both usage counters after a successful generation.
    pub async fn record_generation(&self, user_id: i64) -> AppResult<()> {
        users::Entity::update_many()
            .col_expr(
                users::Column::TotalGenerations,
                Expr::col(users::Column::TotalGenerations).add(1),
            )
            .col_expr(
                users::Column::ThisMonthGenerations,
                Expr::col(users::Column::ThisMonthGenerations).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(users::Column::Id.eq(user_id))
            .exec(self.pool.as_ref())
            .await?;

        Ok(())
    }

    /// Additive grant used by one-time credit-pack purchases.
    pub async fn grant_credits(&self, user_id: i64, amount: i64) -> AppResult<i64> {
        users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(amount),
            )
            .col_expr(users::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(users::Column::Id.eq(user_id))
            .exec(self.pool.as_ref())
            .await?;

        let user = self.find_by_id(user_id).await?;
        Ok(user.credits)
    }

    /// Subscription activation: plan, allotment and subscription linkage are
    /// set (not accumulated), which makes webhook replays idempotent.
    #[allow(clippy::too_many_arguments)]
    pub async fn activate_subscription(
        &self,
        user_id: i64,
        plan: Plan,
        subscription_id: Option<String>,
        subscription_plan_id: Option<String>,
        payer_id: Option<String>,
        next_billing_time: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let user = self.find_by_id(user_id).await?;
        let mut model = user.into_active_model();
        model.plan = Set(plan);
        model.credits = Set(plan.monthly_allotment());
        model.subscription_id = Set(subscription_id);
        model.subscription_plan_id = Set(subscription_plan_id);
        model.payer_id = Set(payer_id);
        model.subscription_status = Set(Some(SubscriptionStatus::Active));
        model.next_billing_time = Set(next_billing_time);
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }

    /// Cancellation drops the account back to the free tier and its default
    /// allotment.
    pub async fn cancel_subscription(&self, user_id: i64) -> AppResult<()> {
        let user = self.find_by_id(user_id).await?;
        let mut model = user.into_active_model();
        model.plan = Set(Plan::Free);
        model.credits = Set(FREE_PLAN_CREDITS);
        model.subscription_status = Set(Some(SubscriptionStatus::Cancelled));
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }

    /// Suspension only flips the status; plan and credits stay untouched.
    pub async fn set_subscription_status(
        &self,
        user_id: i64,
        status: SubscriptionStatus,
    ) -> AppResult<()> {
        let user = self.find_by_id(user_id).await?;
        let mut model = user.into_active_model();
        model.subscription_status = Set(Some(status));
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }

    /// On a recurring payment: if the calendar month changed since the last
    /// reset, zero the monthly counter and restore the tier allotment.
    pub async fn reset_monthly_usage_if_rolled_over(&self, user_id: i64) -> AppResult<bool> {
        let user = self.find_by_id(user_id).await?;
        let now = Utc::now();

        if !month_rolled_over(user.last_reset_date, now) {
            return Ok(false);
        }

        let allotment = user.plan.monthly_allotment();
        let mut model = user.into_active_model();
        model.this_month_generations = Set(0);
        model.credits = Set(allotment);
        model.last_reset_date = Set(now);
        model.updated_at = Set(now);
        model.update(self.pool.as_ref()).await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn test_can_generate() {
        assert!(can_generate(Plan::Free, 1));
        assert!(!can_generate(Plan::Free, 0));
        assert!(!can_generate(Plan::Pro, 0));
        assert!(can_generate(Plan::Enterprise, 0));
    }

    #[test]
    fn test_month_rolled_over() {
        let jan = Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 30, 0).unwrap();
        let later_jan = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 0).unwrap();
        let next_year = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        assert!(month_rolled_over(jan, feb));
        assert!(!month_rolled_over(jan, later_jan));
        assert!(month_rolled_over(feb, next_year));
    }

    #[tokio::test]
    async fn test_try_consume_credit_success() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let ledger = LedgerService::new(Arc::new(db));
        assert!(ledger.try_consume_credit(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_try_consume_credit_denied_when_no_rows_match() {
        // rows_affected == 0 is the "credits already at zero" outcome of the
        // conditional update.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let ledger = LedgerService::new(Arc::new(db));
        assert!(!ledger.try_consume_credit(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_cloned_service_shares_the_pool() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let ledger = LedgerService::new(Arc::new(db));
        let handle = ledger.clone();

        assert!(ledger.try_consume_credit(1).await.unwrap());
        assert!(!handle.try_consume_credit(1).await.unwrap());
    }
}
