use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::goals_errors::{GoalError, Result};

/// Domain model for a goal and its ordered stages.
///
/// `id` is `None` until the goal has been persisted; the store assigns the
/// identity on first insert and it never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub stages: Vec<Stage>,
}

/// A phase of a goal, ordered by `order_index` and itself completable.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: Option<i32>,
    pub goal_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_completed: bool,
    pub tasks: Vec<Task>,
}

/// Smallest unit of work within a stage.
///
/// `evidence` is an opaque reference to an external artifact (a file path or
/// URI supplied by the media picker); the core never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<i32>,
    pub stage_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub evidence: Option<String>,
}

impl Goal {
    /// Percentage of completed stages, 0 when the goal has no stages.
    pub fn progress(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        let completed = self.stages.iter().filter(|s| s.is_completed).count();
        completed as f64 / self.stages.len() as f64 * 100.0
    }

    /// Validates the goal graph before it is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GoalError::InvalidData(
                "Goal title cannot be empty".to_string(),
            ));
        }
        for stage in &self.stages {
            stage.validate()?;
        }
        Ok(())
    }

    /// Builds an unsaved copy of this goal: every identity cleared, all
    /// completion flags reset, task evidence removed, order and text kept.
    pub fn duplicate(&self) -> Goal {
        let now = chrono::Utc::now().naive_utc();
        Goal {
            id: None,
            title: format!("{} (Copy)", self.title),
            description: self.description.clone(),
            created_at: now,
            updated_at: now,
            stages: self.stages.iter().map(Stage::duplicate).collect(),
        }
    }
}

impl Stage {
    /// Percentage of completed tasks, 0 when the stage has no tasks.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        completed as f64 / self.tasks.len() as f64 * 100.0
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GoalError::InvalidData(
                "Stage title cannot be empty".to_string(),
            ));
        }
        for task in &self.tasks {
            task.validate()?;
        }
        Ok(())
    }

    fn duplicate(&self) -> Stage {
        Stage {
            id: None,
            goal_id: None,
            title: self.title.clone(),
            description: self.description.clone(),
            order_index: self.order_index,
            is_completed: false,
            tasks: self.tasks.iter().map(Task::duplicate).collect(),
        }
    }
}

impl Task {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GoalError::InvalidData(
                "Task title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn duplicate(&self) -> Task {
        Task {
            id: None,
            stage_id: None,
            title: self.title.clone(),
            description: self.description.clone(),
            is_completed: false,
            evidence: None,
        }
    }
}

/// Database model for goals
#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDb {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct NewGoalDb {
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for stages
#[derive(
    Queryable,
    Identifiable,
    Associations,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(GoalDb, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::stages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StageDb {
    pub id: i32,
    pub goal_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_completed: bool,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::stages)]
pub struct NewStageDb {
    pub goal_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_completed: bool,
}

/// Database model for tasks
#[derive(
    Queryable,
    Identifiable,
    Associations,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(StageDb, foreign_key = stage_id))]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskDb {
    pub id: i32,
    pub stage_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub evidence: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTaskDb {
    pub stage_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub evidence: Option<String>,
}

// Conversion implementations
impl GoalDb {
    /// Assembles the domain goal from its row and already-loaded stages.
    pub fn into_domain(self, stages: Vec<Stage>) -> Goal {
        Goal {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            stages,
        }
    }
}

impl StageDb {
    pub fn into_domain(self, tasks: Vec<Task>) -> Stage {
        Stage {
            id: Some(self.id),
            goal_id: Some(self.goal_id),
            title: self.title,
            description: self.description,
            order_index: self.order_index,
            is_completed: self.is_completed,
            tasks,
        }
    }
}

impl From<TaskDb> for Task {
    fn from(db: TaskDb) -> Self {
        Task {
            id: Some(db.id),
            stage_id: Some(db.stage_id),
            title: db.title,
            description: db.description,
            is_completed: db.is_completed,
            evidence: db.evidence,
        }
    }
}

impl NewGoalDb {
    pub fn from_domain(goal: &Goal, now: NaiveDateTime) -> Self {
        NewGoalDb {
            title: goal.title.clone(),
            description: goal.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl NewStageDb {
    /// `position` is the stage's 1-based position in the supplied list; it
    /// becomes the persisted `order_index`.
    pub fn from_domain(stage: &Stage, goal_id: i32, position: i32) -> Self {
        NewStageDb {
            goal_id,
            title: stage.title.clone(),
            description: stage.description.clone(),
            order_index: position,
            is_completed: stage.is_completed,
        }
    }
}

impl NewTaskDb {
    pub fn from_domain(task: &Task, stage_id: i32) -> Self {
        NewTaskDb {
            stage_id,
            title: task.title.clone(),
            description: task.description.clone(),
            is_completed: task.is_completed,
            evidence: task.evidence.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        Task {
            title: "task".to_string(),
            is_completed: completed,
            ..Default::default()
        }
    }

    fn stage(completed: bool, tasks: Vec<Task>) -> Stage {
        Stage {
            title: "stage".to_string(),
            is_completed: completed,
            tasks,
            ..Default::default()
        }
    }

    #[test]
    fn goal_progress_counts_completed_stages() {
        let goal = Goal {
            title: "goal".to_string(),
            stages: vec![stage(true, vec![]), stage(false, vec![]), stage(true, vec![])],
            ..Default::default()
        };
        assert_eq!(goal.progress().round(), 67.0);
    }

    #[test]
    fn goal_progress_is_zero_without_stages() {
        let goal = Goal {
            title: "goal".to_string(),
            ..Default::default()
        };
        assert_eq!(goal.progress(), 0.0);
    }

    #[test]
    fn stage_progress_counts_completed_tasks() {
        let s = stage(false, vec![task(true), task(false)]);
        assert_eq!(s.progress(), 50.0);
    }

    #[test]
    fn stage_progress_is_zero_without_tasks() {
        assert_eq!(stage(false, vec![]).progress(), 0.0);
    }

    #[test]
    fn duplicate_clears_identities_completion_and_evidence() {
        let source = Goal {
            id: Some(7),
            title: "Learn Rust".to_string(),
            description: Some("own the borrow checker".to_string()),
            stages: vec![Stage {
                id: Some(3),
                goal_id: Some(7),
                title: "Basics".to_string(),
                order_index: 1,
                is_completed: true,
                tasks: vec![Task {
                    id: Some(11),
                    stage_id: Some(3),
                    title: "Read the book".to_string(),
                    is_completed: true,
                    evidence: Some("file:///notes.md".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let copy = source.duplicate();

        assert_eq!(copy.id, None);
        assert_eq!(copy.title, "Learn Rust (Copy)");
        assert_eq!(copy.description, source.description);
        let stage = &copy.stages[0];
        assert_eq!(stage.id, None);
        assert_eq!(stage.goal_id, None);
        assert_eq!(stage.order_index, 1);
        assert!(!stage.is_completed);
        let task = &stage.tasks[0];
        assert_eq!(task.id, None);
        assert_eq!(task.title, "Read the book");
        assert!(!task.is_completed);
        assert_eq!(task.evidence, None);
    }

    #[test]
    fn validate_rejects_blank_titles_anywhere_in_the_graph() {
        let mut goal = Goal {
            title: "ok".to_string(),
            stages: vec![stage(false, vec![task(false)])],
            ..Default::default()
        };
        assert!(goal.validate().is_ok());

        goal.stages[0].tasks[0].title = "   ".to_string();
        assert!(matches!(goal.validate(), Err(GoalError::InvalidData(_))));
    }
}
