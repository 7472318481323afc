use std::sync::Arc;

use summit_core::goals::{GoalError, GoalRepository, GoalService, GoalServiceTrait};

mod common;

fn service(pool: Arc<summit_core::db::DbPool>) -> GoalService<GoalRepository> {
    GoalService::new(Arc::new(GoalRepository::new(pool)))
}

#[tokio::test]
async fn import_goal_parses_and_persists_a_definition() {
    let (_dir, pool) = common::setup_store();
    let service = service(pool);

    let definition = r#"{
        "title": "Ship the app",
        "description": "v1.0 in the store",
        "stages": [
            {"title": "Build", "description": "core features", "tasks": [
                {"title": "Persistence", "description": "local store"},
                {"title": "Screens"}
            ]},
            {"title": "Release", "tasks": [{"title": "Submit"}]}
        ]
    }"#;

    let imported = service.import_goal(definition).await.unwrap();
    assert!(imported.id.is_some());
    assert_eq!(imported.stages.len(), 2);
    assert_eq!(imported.stages[0].tasks.len(), 2);

    let listed = service.get_goals().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Ship the app");
}

#[tokio::test]
async fn import_goal_rejects_malformed_input_without_writing() {
    let (_dir, pool) = common::setup_store();
    let service = service(pool);

    let err = service.import_goal("not json at all").await.unwrap_err();
    assert!(matches!(err, GoalError::ParseError(_)));

    assert!(service.get_goals().unwrap().is_empty());
}

#[tokio::test]
async fn service_delegates_the_full_goal_lifecycle() {
    let (_dir, pool) = common::setup_store();
    let service = service(pool);

    let goal = service
        .import_goal(r#"{"title": "Read 12 books", "stages": [{"title": "Q1"}]}"#)
        .await
        .unwrap();
    let goal_id = goal.id.unwrap();

    let copy = service.duplicate_goal(&goal).await.unwrap();
    assert_eq!(copy.title, "Read 12 books (Copy)");
    assert_ne!(copy.id, goal.id);

    let mut renamed = goal;
    renamed.title = "Read 24 books".to_string();
    let updated = service.update_goal(renamed).await.unwrap();
    assert_eq!(updated.title, "Read 24 books");
    assert_eq!(service.get_goal(goal_id).unwrap().title, "Read 24 books");

    service.delete_goal(goal_id).await.unwrap();
    let remaining = service.get_goals().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, copy.id);
}
