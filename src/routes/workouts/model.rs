use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// One prescribed exercise inside a workout, joined with its catalog name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutExerciseDetail {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub muscle_group: String,
    pub position: i32,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutExerciseInput {
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub exercises: Vec<WorkoutExerciseInput>,
}

impl Workout {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workout>(
            "SELECT id, user_id, name, description, is_public, created_at
             FROM workouts
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The caller's workouts plus anything marked public.
    pub async fn list_visible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workout>(
            "SELECT id, user_id, name, description, is_public, created_at
             FROM workouts
             WHERE user_id = $1 OR is_public
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn exercises_of(pool: &PgPool, workout_id: Uuid) -> Result<Vec<WorkoutExerciseDetail>, sqlx::Error> {
        sqlx::query_as::<_, WorkoutExerciseDetail>(
            "SELECT we.id, we.workout_id, we.exercise_id, e.name AS exercise_name,
                    e.muscle_group, we.position, we.sets, we.reps, we.weight
             FROM workout_exercises we
             JOIN exercises e ON e.id = we.exercise_id
             WHERE we.workout_id = $1
             ORDER BY we.position",
        )
        .bind(workout_id)
        .fetch_all(pool)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        req: &CreateWorkoutRequest,
    ) -> Result<Self, sqlx::Error> {
        let workout = sqlx::query_as::<_, Workout>(
            "INSERT INTO workouts (user_id, name, description, is_public)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, name, description, is_public, created_at",
        )
        .bind(user_id)
        .bind(req.name.trim())
        .bind(req.description.as_deref())
        .bind(req.is_public)
        .fetch_one(&mut **tx)
        .await?;

        Self::insert_exercise_list(tx, workout.id, &req.exercises).await?;

        Ok(workout)
    }

    /// Replace-on-write: drop the whole exercise list and recreate it in
    /// request order. Last write wins under concurrent edits.
    pub async fn replace_exercise_list(
        tx: &mut Transaction<'_, Postgres>,
        workout_id: Uuid,
        exercises: &[WorkoutExerciseInput],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(workout_id)
            .execute(&mut **tx)
            .await?;

        Self::insert_exercise_list(tx, workout_id, exercises).await
    }

    async fn insert_exercise_list(
        tx: &mut Transaction<'_, Postgres>,
        workout_id: Uuid,
        exercises: &[WorkoutExerciseInput],
    ) -> Result<(), sqlx::Error> {
        for (position, exercise) in exercises.iter().enumerate() {
            sqlx::query(
                "INSERT INTO workout_exercises (workout_id, exercise_id, position, sets, reps, weight)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(workout_id)
            .bind(exercise.exercise_id)
            .bind(position as i32)
            .bind(exercise.sets)
            .bind(exercise.reps)
            .bind(exercise.weight)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        // Child workout_exercises rows go with the FK cascade.
        sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
