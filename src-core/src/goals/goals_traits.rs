use async_trait::async_trait;

use super::goals_errors::Result;
use super::goals_model::Goal;

/// Trait for goal repository operations
pub trait GoalRepositoryTrait: Send + Sync {
    fn list_all(&self) -> Result<Vec<Goal>>;
    fn get(&self, goal_id: i32) -> Result<Goal>;
    fn save(&self, goal: Goal) -> Result<Goal>;
    fn update(&self, goal: Goal) -> Result<Goal>;
    fn delete(&self, goal_id: i32) -> Result<usize>;
    fn duplicate(&self, goal: &Goal) -> Result<Goal>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: i32) -> Result<Goal>;
    async fn save_goal(&self, goal: Goal) -> Result<Goal>;
    async fn update_goal(&self, goal: Goal) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: i32) -> Result<usize>;
    async fn duplicate_goal(&self, goal: &Goal) -> Result<Goal>;
    async fn import_goal(&self, definition: &str) -> Result<Goal>;
}
