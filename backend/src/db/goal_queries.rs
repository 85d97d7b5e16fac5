use sqlx::PgPool;
use crate::models::Goal;

pub async fn create(pool: &PgPool, goal: &Goal) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO goals (id, owner, goal_name, target_amount, current_progress, deadline, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)"
    )
        .bind(goal.id)
        .bind(&goal.owner)
        .bind(&goal.goal_name)
        .bind(&goal.target_amount)
        .bind(&goal.current_progress)
        .bind(goal.deadline)
        .bind(goal.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn fetch_by_owner(pool: &PgPool, owner: &str) -> Result<Vec<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        "SELECT id, owner, goal_name, target_amount, current_progress, deadline, created_at
         FROM goals
         WHERE owner = $1
         ORDER BY created_at ASC"
    )
        .bind(owner)
        .fetch_all(pool)
        .await
}
