//! Date-plan persistence.
//!
//! Plans are created by the app's planning flow; this layer reads, lists
//! and deletes them. Store failures keep the underlying message.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DatePlan, Venue};
use crate::{Error, Result};

/// Backing store for saved date plans.
#[async_trait]
pub trait DatePlanStore: Send + Sync {
    async fn get_date_plan(&self, id: Uuid) -> Result<DatePlan>;

    /// Delete a plan owned by `user_id`. Another user's plan is `NotFound`.
    async fn delete_date_plan(&self, id: Uuid, user_id: &str) -> Result<()>;

    /// Plans owned by `user_id`, newest first.
    async fn list_date_plans(&self, user_id: &str) -> Result<Vec<DatePlan>>;

    async fn insert_date_plan(&self, plan: DatePlan) -> Result<()>;
}

fn plan_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Date plan {} not found", id))
}

/// Date plan row from database
#[derive(Debug, sqlx::FromRow)]
struct DatePlanRow {
    id: Uuid,
    user_id: String,
    title: String,
    city: Option<String>,
    venues: Json<Vec<Venue>>,
    scheduled_for: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<DatePlanRow> for DatePlan {
    fn from(row: DatePlanRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            city: row.city,
            venues: row.venues.0,
            scheduled_for: row.scheduled_for,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed store over the `date_plans` table
/// (see `migrations/0001_create_date_plans.sql`).
pub struct PgDatePlanStore {
    pool: PgPool,
}

impl PgDatePlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatePlanStore for PgDatePlanStore {
    async fn get_date_plan(&self, id: Uuid) -> Result<DatePlan> {
        let row: Option<DatePlanRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, city, venues, scheduled_for, created_at
            FROM date_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("Failed to fetch date plan: {}", e)))?;

        row.map(DatePlan::from).ok_or_else(|| plan_not_found(id))
    }

    async fn delete_date_plan(&self, id: Uuid, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM date_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("Failed to delete date plan: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(plan_not_found(id));
        }

        Ok(())
    }

    async fn list_date_plans(&self, user_id: &str) -> Result<Vec<DatePlan>> {
        let rows: Vec<DatePlanRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, city, venues, scheduled_for, created_at
            FROM date_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("Failed to list date plans: {}", e)))?;

        Ok(rows.into_iter().map(DatePlan::from).collect())
    }

    async fn insert_date_plan(&self, plan: DatePlan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO date_plans (id, user_id, title, city, venues, scheduled_for, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan.id)
        .bind(&plan.user_id)
        .bind(&plan.title)
        .bind(&plan.city)
        .bind(Json(&plan.venues))
        .bind(plan.scheduled_for)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("Failed to insert date plan: {}", e)))?;

        Ok(())
    }
}

/// In-process store for local runs and tests.
#[derive(Default)]
pub struct MemoryDatePlanStore {
    plans: RwLock<HashMap<Uuid, DatePlan>>,
}

impl MemoryDatePlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatePlanStore for MemoryDatePlanStore {
    async fn get_date_plan(&self, id: Uuid) -> Result<DatePlan> {
        self.plans
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| plan_not_found(id))
    }

    async fn delete_date_plan(&self, id: Uuid, user_id: &str) -> Result<()> {
        let mut plans = self.plans.write().await;
        match plans.get(&id) {
            Some(plan) if plan.user_id == user_id => {
                plans.remove(&id);
                Ok(())
            }
            _ => Err(plan_not_found(id)),
        }
    }

    async fn list_date_plans(&self, user_id: &str) -> Result<Vec<DatePlan>> {
        let mut plans: Vec<DatePlan> = self
            .plans
            .read()
            .await
            .values()
            .filter(|plan| plan.user_id == user_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn insert_date_plan(&self, plan: DatePlan) -> Result<()> {
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            return Err(Error::Store(format!("Date plan {} already exists", plan.id)));
        }
        plans.insert(plan.id, plan);
        Ok(())
    }
}
