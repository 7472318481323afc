//! Builds goal graphs from externally supplied JSON definitions.
//!
//! The expected shape is the fixed schema handed to the LLM prompt layer:
//! `{title, description, stages: [{title, description, tasks: [{title, description}]}]}`.

use serde::Deserialize;

use super::goals_errors::{GoalError, Result};
use super::goals_model::{Goal, Stage, Task};

#[derive(Debug, Deserialize)]
struct GoalDefinition {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stages: Vec<StageDefinition>,
}

#[derive(Debug, Deserialize)]
struct StageDefinition {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Deserialize)]
struct TaskDefinition {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

/// Parses a JSON goal definition into an unsaved goal graph.
///
/// All identities are `None`, stage order comes from list position and
/// nothing is marked completed. Malformed input fails with a descriptive
/// error; no partial graph is ever produced.
pub fn parse_goal_definition(input: &str) -> Result<Goal> {
    let definition: GoalDefinition = serde_json::from_str(input)
        .map_err(|e| GoalError::ParseError(format!("invalid goal definition JSON: {}", e)))?;

    let now = chrono::Utc::now().naive_utc();
    let stages = definition
        .stages
        .into_iter()
        .enumerate()
        .map(|(index, stage)| Stage {
            id: None,
            goal_id: None,
            title: stage.title,
            description: stage.description,
            order_index: index as i32 + 1,
            is_completed: false,
            tasks: stage
                .tasks
                .into_iter()
                .map(|task| Task {
                    id: None,
                    stage_id: None,
                    title: task.title,
                    description: task.description,
                    is_completed: false,
                    evidence: None,
                })
                .collect(),
        })
        .collect();

    let goal = Goal {
        id: None,
        title: definition.title,
        description: definition.description,
        created_at: now,
        updated_at: now,
        stages,
    };
    goal.validate()?;

    Ok(goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_definition() {
        let input = r#"{
            "title": "Run a marathon",
            "description": "42.2km",
            "stages": [
                {"title": "Base building", "description": "8 weeks", "tasks": [
                    {"title": "Run 5k", "description": "easy pace"},
                    {"title": "Run 10k"}
                ]},
                {"title": "Race prep", "tasks": []}
            ]
        }"#;

        let goal = parse_goal_definition(input).unwrap();
        assert_eq!(goal.id, None);
        assert_eq!(goal.title, "Run a marathon");
        assert_eq!(goal.stages.len(), 2);
        assert_eq!(goal.stages[0].order_index, 1);
        assert_eq!(goal.stages[1].order_index, 2);
        assert_eq!(goal.stages[0].tasks.len(), 2);
        assert_eq!(goal.stages[0].tasks[1].description, None);
        assert!(!goal.stages[0].tasks[0].is_completed);
        assert_eq!(goal.stages[0].tasks[0].evidence, None);
    }

    #[test]
    fn rejects_malformed_json_with_a_reason() {
        let err = parse_goal_definition("{\"title\": ").unwrap_err();
        match err {
            GoalError::ParseError(reason) => assert!(reason.contains("JSON")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_title() {
        let err = parse_goal_definition(r#"{"stages": []}"#).unwrap_err();
        assert!(matches!(err, GoalError::ParseError(_)));
    }

    #[test]
    fn rejects_blank_stage_title() {
        let input = r#"{"title": "g", "stages": [{"title": "  "}]}"#;
        let err = parse_goal_definition(input).unwrap_err();
        assert!(matches!(err, GoalError::InvalidData(_)));
    }
}
