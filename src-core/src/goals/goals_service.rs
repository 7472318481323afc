use async_trait::async_trait;
use std::sync::Arc;

use super::goals_builder::parse_goal_definition;
use super::goals_errors::Result;
use super::goals_model::Goal;
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};

/// Service facade the presentation layer talks to.
pub struct GoalService<T: GoalRepositoryTrait> {
    goal_repo: Arc<T>,
}

impl<T: GoalRepositoryTrait> GoalService<T> {
    pub fn new(goal_repo: Arc<T>) -> Self {
        GoalService { goal_repo }
    }
}

#[async_trait]
impl<T: GoalRepositoryTrait + Send + Sync> GoalServiceTrait for GoalService<T> {
    fn get_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.list_all()
    }

    fn get_goal(&self, goal_id: i32) -> Result<Goal> {
        self.goal_repo.get(goal_id)
    }

    async fn save_goal(&self, goal: Goal) -> Result<Goal> {
        self.goal_repo.save(goal)
    }

    async fn update_goal(&self, goal: Goal) -> Result<Goal> {
        self.goal_repo.update(goal)
    }

    async fn delete_goal(&self, goal_id: i32) -> Result<usize> {
        self.goal_repo.delete(goal_id)
    }

    async fn duplicate_goal(&self, goal: &Goal) -> Result<Goal> {
        self.goal_repo.duplicate(goal)
    }

    /// Parses an externally supplied goal definition and persists it.
    /// Parse failures surface before anything is written.
    async fn import_goal(&self, definition: &str) -> Result<Goal> {
        let goal = parse_goal_definition(definition)?;
        self.goal_repo.save(goal)
    }
}
