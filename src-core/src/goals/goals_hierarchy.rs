//! Maps nested goal graphs onto the normalized goals/stages/tasks tables.
//!
//! Free functions over a borrowed connection so the repository can compose
//! them inside a single transaction. Reads assemble the tree bottom-up after
//! all children are loaded; writes insert parent rows before their children.

use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::SqliteConnection;
use log::debug;

use crate::schema::{goals, notification_settings, stages, tasks};

use super::goals_model::{
    Goal, GoalDb, NewGoalDb, NewStageDb, NewTaskDb, Stage, StageDb, Task, TaskDb,
};

/// Loads stages and tasks for the given goal rows and assembles full domain
/// goals, preserving the order of `goal_rows`.
///
/// Stages come back ordered by `order_index` ascending; tasks by id for
/// stable retrieval. Goals without stages and stages without tasks yield
/// empty lists.
pub fn load_goal_trees(
    conn: &mut SqliteConnection,
    goal_rows: Vec<GoalDb>,
) -> Result<Vec<Goal>, DieselError> {
    if goal_rows.is_empty() {
        return Ok(Vec::new());
    }

    let stage_rows = StageDb::belonging_to(&goal_rows)
        .order(stages::order_index.asc())
        .load::<StageDb>(conn)?;

    let grouped_tasks = TaskDb::belonging_to(&stage_rows)
        .order(tasks::id.asc())
        .load::<TaskDb>(conn)?
        .grouped_by(&stage_rows);

    let grouped_stages: Vec<Vec<(StageDb, Vec<TaskDb>)>> = stage_rows
        .into_iter()
        .zip(grouped_tasks)
        .collect::<Vec<_>>()
        .grouped_by(&goal_rows);

    Ok(goal_rows
        .into_iter()
        .zip(grouped_stages)
        .map(|(goal_row, stage_group)| {
            let stage_list = stage_group
                .into_iter()
                .map(|(stage_row, task_rows)| {
                    let task_list = task_rows.into_iter().map(Task::from).collect();
                    stage_row.into_domain(task_list)
                })
                .collect();
            goal_row.into_domain(stage_list)
        })
        .collect())
}

/// Inserts a full goal graph, parent rows before children, and returns the
/// assembled goal with every generated identity filled in.
pub fn insert_goal_tree(conn: &mut SqliteConnection, goal: &Goal) -> Result<Goal, DieselError> {
    let now = chrono::Utc::now().naive_utc();
    let goal_row: GoalDb = diesel::insert_into(goals::table)
        .values(&NewGoalDb::from_domain(goal, now))
        .returning(GoalDb::as_returning())
        .get_result(conn)?;

    debug!(
        "Inserted goal {} with {} stages",
        goal_row.id,
        goal.stages.len()
    );

    let stage_list = insert_stage_trees(conn, goal_row.id, &goal.stages)?;
    Ok(goal_row.into_domain(stage_list))
}

/// Inserts the given stages and their tasks under `goal_id`, assigning
/// 1-based order indexes from list position.
pub fn insert_stage_trees(
    conn: &mut SqliteConnection,
    goal_id: i32,
    stage_list: &[Stage],
) -> Result<Vec<Stage>, DieselError> {
    let mut inserted = Vec::with_capacity(stage_list.len());

    for (position, stage) in stage_list.iter().enumerate() {
        let stage_row: StageDb = diesel::insert_into(stages::table)
            .values(&NewStageDb::from_domain(stage, goal_id, position as i32 + 1))
            .returning(StageDb::as_returning())
            .get_result(conn)?;

        let mut task_list = Vec::with_capacity(stage.tasks.len());
        for task in &stage.tasks {
            let task_row: TaskDb = diesel::insert_into(tasks::table)
                .values(&NewTaskDb::from_domain(task, stage_row.id))
                .returning(TaskDb::as_returning())
                .get_result(conn)?;
            task_list.push(Task::from(task_row));
        }

        inserted.push(stage_row.into_domain(task_list));
    }

    Ok(inserted)
}

/// Destructive-replace of a goal's stage subtree: every existing stage and
/// its tasks are deleted, then the supplied list is inserted fresh.
///
/// Child identities are not preserved across this call; callers that need to
/// keep them must use the in-place update path instead.
pub fn replace_stage_trees(
    conn: &mut SqliteConnection,
    goal_id: i32,
    stage_list: &[Stage],
) -> Result<Vec<Stage>, DieselError> {
    let stage_ids: Vec<i32> = stages::table
        .filter(stages::goal_id.eq(goal_id))
        .select(stages::id)
        .load(conn)?;

    diesel::delete(tasks::table.filter(tasks::stage_id.eq_any(&stage_ids))).execute(conn)?;
    diesel::delete(stages::table.filter(stages::goal_id.eq(goal_id))).execute(conn)?;

    debug!(
        "Replaced {} stages of goal {} with {} new ones",
        stage_ids.len(),
        goal_id,
        stage_list.len()
    );

    insert_stage_trees(conn, goal_id, stage_list)
}

/// Updates the goal's own fields plus any stages and tasks in the supplied
/// graph that already carry an identity.
///
/// Children without an identity are ignored (this path never inserts) and
/// sibling rows not present in the graph are left untouched.
pub fn update_nodes_in_place(
    conn: &mut SqliteConnection,
    goal_id: i32,
    goal: &Goal,
) -> Result<(), DieselError> {
    let now = chrono::Utc::now().naive_utc();
    let affected = diesel::update(goals::table.find(goal_id))
        .set((
            goals::title.eq(&goal.title),
            goals::description.eq(&goal.description),
            goals::updated_at.eq(now),
        ))
        .execute(conn)?;
    if affected == 0 {
        return Err(DieselError::NotFound);
    }

    for stage in &goal.stages {
        let stage_id = match stage.id {
            Some(stage_id) => stage_id,
            None => continue,
        };
        diesel::update(stages::table.find(stage_id))
            .set((
                stages::title.eq(&stage.title),
                stages::description.eq(&stage.description),
                stages::order_index.eq(stage.order_index),
                stages::is_completed.eq(stage.is_completed),
            ))
            .execute(conn)?;

        for task in &stage.tasks {
            let task_id = match task.id {
                Some(task_id) => task_id,
                None => continue,
            };
            diesel::update(tasks::table.find(task_id))
                .set((
                    tasks::title.eq(&task.title),
                    tasks::description.eq(&task.description),
                    tasks::is_completed.eq(task.is_completed),
                    tasks::evidence.eq(&task.evidence),
                ))
                .execute(conn)?;
        }
    }

    Ok(())
}

/// Deletes a goal and its whole subtree, children first (tasks, stages,
/// notification settings, then the goal row) so the result does not depend
/// on the store's cascade support. Returns the number of goal rows removed.
pub fn delete_goal_tree(conn: &mut SqliteConnection, goal_id: i32) -> Result<usize, DieselError> {
    let stage_ids: Vec<i32> = stages::table
        .filter(stages::goal_id.eq(goal_id))
        .select(stages::id)
        .load(conn)?;

    diesel::delete(tasks::table.filter(tasks::stage_id.eq_any(&stage_ids))).execute(conn)?;
    diesel::delete(stages::table.filter(stages::goal_id.eq(goal_id))).execute(conn)?;
    diesel::delete(
        notification_settings::table.filter(notification_settings::goal_id.eq(goal_id)),
    )
    .execute(conn)?;

    let affected = diesel::delete(goals::table.find(goal_id)).execute(conn)?;
    debug!(
        "Deleted goal {} ({} stages, {} row(s))",
        goal_id,
        stage_ids.len(),
        affected
    );
    Ok(affected)
}
