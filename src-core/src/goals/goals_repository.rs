use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::db::get_connection;
use crate::schema::goals;

use super::goals_errors::{GoalError, Result};
use super::goals_hierarchy;
use super::goals_model::{Goal, GoalDb};
use super::goals_traits::GoalRepositoryTrait;

/// Repository for managing goal hierarchies in the database.
///
/// Every multi-row write runs inside a single transaction, so a failed call
/// never leaves a partially written subtree behind.
pub struct GoalRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl GoalRepository {
    /// Creates a new GoalRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        GoalRepository { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| GoalError::DatabaseError(e.to_string()))
    }

    /// Lists all goals, most recently updated first, each with its full
    /// stage/task subtree. An empty store yields an empty list.
    pub fn list_all(&self) -> Result<Vec<Goal>> {
        let mut conn = self.connection()?;

        let goal_rows = goals::table
            .order(goals::updated_at.desc())
            .load::<GoalDb>(&mut conn)?;

        goals_hierarchy::load_goal_trees(&mut conn, goal_rows).map_err(GoalError::from)
    }

    /// Retrieves a single goal with its full subtree.
    pub fn get(&self, goal_id: i32) -> Result<Goal> {
        let mut conn = self.connection()?;

        let goal_row = goals::table
            .find(goal_id)
            .first::<GoalDb>(&mut conn)
            .map_err(|e| match e {
                DieselError::NotFound => {
                    GoalError::NotFound(format!("Goal with id {} not found", goal_id))
                }
                _ => GoalError::from(e),
            })?;

        let mut loaded = goals_hierarchy::load_goal_trees(&mut conn, vec![goal_row])?;
        Ok(loaded.remove(0))
    }

    /// Persists a goal graph.
    ///
    /// Without an id the whole subtree is inserted and identities are
    /// assigned. With an id the goal's own fields are updated and the stage
    /// subtree is destructively replaced, so child identities change.
    pub fn save(&self, goal: Goal) -> Result<Goal> {
        goal.validate()?;
        let mut conn = self.connection()?;

        let saved = conn
            .transaction::<Goal, DieselError, _>(|conn| match goal.id {
                Some(goal_id) => {
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

                    let stage_list =
                        goals_hierarchy::replace_stage_trees(conn, goal_id, &goal.stages)?;
                    let goal_row = goals::table.find(goal_id).first::<GoalDb>(conn)?;
                    Ok(goal_row.into_domain(stage_list))
                }
                None => goals_hierarchy::insert_goal_tree(conn, &goal),
            })
            .map_err(|e| match e {
                DieselError::NotFound => GoalError::NotFound(format!(
                    "Goal with id {} not found",
                    goal.id.unwrap_or_default()
                )),
                _ => GoalError::from(e),
            })?;

        debug!(
            "Saved goal {:?} with {} stages",
            saved.id,
            saved.stages.len()
        );
        Ok(saved)
    }

    /// Updates goal fields and, for every stage or task in the supplied
    /// graph that already carries an identity, the matching row in place.
    /// Unidentified children are not inserted and siblings stay untouched.
    /// Returns the reloaded goal.
    pub fn update(&self, goal: Goal) -> Result<Goal> {
        goal.validate()?;
        let goal_id = goal.id.ok_or_else(|| {
            GoalError::InvalidData("Goal id is required for updates".to_string())
        })?;

        let mut conn = self.connection()?;
        conn.transaction::<(), DieselError, _>(|conn| {
            goals_hierarchy::update_nodes_in_place(conn, goal_id, &goal)
        })
        .map_err(|e| match e {
            DieselError::NotFound => {
                GoalError::NotFound(format!("Goal with id {} not found", goal_id))
            }
            _ => GoalError::from(e),
        })?;

        self.get(goal_id)
    }

    /// Deletes a goal and its subtree, returning the number of goal rows
    /// removed.
    pub fn delete(&self, goal_id: i32) -> Result<usize> {
        let mut conn = self.connection()?;

        let affected = conn
            .transaction::<usize, DieselError, _>(|conn| {
                goals_hierarchy::delete_goal_tree(conn, goal_id)
            })
            .map_err(GoalError::from)?;

        if affected == 0 {
            return Err(GoalError::NotFound(format!(
                "Goal with id {} not found",
                goal_id
            )));
        }

        Ok(affected)
    }

    /// Persists a fresh copy of the given goal: new identities throughout,
    /// completion flags reset, evidence cleared.
    pub fn duplicate(&self, goal: &Goal) -> Result<Goal> {
        self.save(goal.duplicate())
    }
}

impl GoalRepositoryTrait for GoalRepository {
    fn list_all(&self) -> Result<Vec<Goal>> {
        GoalRepository::list_all(self)
    }

    fn get(&self, goal_id: i32) -> Result<Goal> {
        GoalRepository::get(self, goal_id)
    }

    fn save(&self, goal: Goal) -> Result<Goal> {
        GoalRepository::save(self, goal)
    }

    fn update(&self, goal: Goal) -> Result<Goal> {
        GoalRepository::update(self, goal)
    }

    fn delete(&self, goal_id: i32) -> Result<usize> {
        GoalRepository::delete(self, goal_id)
    }

    fn duplicate(&self, goal: &Goal) -> Result<Goal> {
        GoalRepository::duplicate(self, goal)
    }
}
