use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

/// Fixed goal vocabulary the UI offers.
pub const GOAL_VOCABULARY: &[&str] = &[
    "lose_weight",
    "build_muscle",
    "increase_strength",
    "improve_endurance",
    "improve_flexibility",
    "general_fitness",
];

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FitnessGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalsRequest {
    pub goals: Vec<String>,
}

pub fn validate_goals(goals: &[String]) -> Result<(), AppError> {
    for goal in goals {
        if !GOAL_VOCABULARY.contains(&goal.as_str()) {
            return Err(AppError::Validation(format!("Unknown goal: {}", goal)));
        }
    }
    Ok(())
}

impl FitnessGoal {
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FitnessGoal>(
            "SELECT id, user_id, goal, created_at
             FROM fitness_goals
             WHERE user_id = $1
             ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Goal updates replace the whole set: delete-all then insert, inside the
    /// caller's transaction.
    pub async fn replace_all(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        goals: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM fitness_goals WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        for goal in goals {
            sqlx::query("INSERT INTO fitness_goals (user_id, goal) VALUES ($1, $2)")
                .bind(user_id)
                .bind(goal)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}
