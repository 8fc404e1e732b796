//! End-to-end tests against a running server.

use serde_json::{json, Value};
use task_api::http::response::{ErrorResponse, MessageResponse, TaskListResponse, TaskResponse};

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_is_up() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "UP" }));

    server.store.append("does not matter");
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    server.stop().await;
}

#[tokio::test]
async fn test_create_task() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/tasks"))
        .json(&json!({ "title": "Buy milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let header = res.headers()["x-trace-id"].to_str().unwrap().to_string();
    let body: TaskResponse = res.json().await.unwrap();
    assert_eq!(body.trace_id.to_string(), header);
    assert_eq!(body.message, "Task created");
    assert_eq!(body.task.id.get(), 1);
    assert_eq!(body.task.title, "Buy milk");
    assert!(!body.task.completed);
    assert_eq!(server.store.len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let server = TestServer::start().await;

    for payload in [json!({}), json!({ "title": "" }), json!({ "title": null })] {
        let res = server
            .client
            .post(server.url("/tasks"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "payload {payload}");

        let header = res.headers()["x-trace-id"].to_str().unwrap().to_string();
        let body: ErrorResponse = res.json().await.unwrap();
        assert_eq!(body.error, "Title is required");
        assert_eq!(body.trace_id.to_string(), header);
    }

    // No body at all behaves like an empty object
    let res = server.client.post(server.url("/tasks")).send().await.unwrap();
    assert_eq!(res.status(), 400);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Title is required");

    assert!(server.store.is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/tasks"))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Invalid request body");
    assert!(server.store.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_list_tasks_in_insertion_order() {
    let server = TestServer::start().await;
    for title in ["a", "b", "c"] {
        server.create(title).await;
    }

    let res = server.client.get(server.url("/tasks")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: TaskListResponse = res.json().await.unwrap();
    let titles: Vec<_> = body.data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    server.stop().await;
}

#[tokio::test]
async fn test_update_completed() {
    let server = TestServer::start().await;
    let first = server.create("first").await;
    let second = server.create("second").await;
    let before = server.store.list();

    let res = server
        .client
        .put(server.url(&format!("/tasks/{first}")))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: TaskResponse = res.json().await.unwrap();
    assert_eq!(body.message, "Task updated");
    assert!(body.task.completed);

    let after = server.store.list();
    assert_eq!(after[0].title, before[0].title);
    assert_eq!(after[0].created_at, before[0].created_at);
    assert!(after[0].completed);
    assert_eq!(after[1], before[1]);
    assert_eq!(after[1].id.get(), second);

    server.stop().await;
}

#[tokio::test]
async fn test_update_without_completed_keeps_value() {
    let server = TestServer::start().await;
    let id = server.create("sticky").await;

    server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();

    let res = server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({ "title": "renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: TaskResponse = res.json().await.unwrap();
    assert!(body.task.completed);
    assert_eq!(body.task.title, "sticky");

    server.stop().await;
}

#[tokio::test]
async fn test_update_unknown_task() {
    let server = TestServer::start().await;
    server.create("only").await;
    let before = server.store.list();

    for path in ["/tasks/99", "/tasks/abc"] {
        let res = server
            .client
            .put(server.url(path))
            .json(&json!({ "completed": true }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
        let body: ErrorResponse = res.json().await.unwrap();
        assert_eq!(body.error, "Task not found");
    }

    assert_eq!(server.store.list(), before);
    server.stop().await;
}

#[tokio::test]
async fn test_update_mistyped_field_on_unknown_task_is_not_found() {
    let server = TestServer::start().await;

    let res = server
        .client
        .put(server.url("/tasks/99"))
        .json(&json!({ "completed": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Task not found");

    server.stop().await;
}

#[tokio::test]
async fn test_update_mistyped_field_on_existing_task_is_rejected() {
    let server = TestServer::start().await;
    let id = server.create("typed").await;

    let res = server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({ "completed": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Invalid request body");
    assert!(!server.store.list()[0].completed);

    server.stop().await;
}

#[tokio::test]
async fn test_update_unparseable_body_is_rejected_before_lookup() {
    let server = TestServer::start().await;

    let res = server
        .client
        .put(server.url("/tasks/99"))
        .header("content-type", "application/json")
        .body("{\"completed\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Invalid request body");

    server.stop().await;
}

#[tokio::test]
async fn test_empty_json_body_counts_as_empty_object() {
    let server = TestServer::start().await;
    let id = server.create("unchanged").await;

    let res = server
        .client
        .post(server.url("/tasks"))
        .header("content-type", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Title is required");

    let res = server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .header("content-type", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: TaskResponse = res.json().await.unwrap();
    assert!(!body.task.completed);

    server.stop().await;
}

#[tokio::test]
async fn test_delete_scenario() {
    let server = TestServer::start().await;

    let id = server.create("Buy milk").await;
    assert_eq!(id, 1);

    let res = server.client.post(server.url("/tasks")).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), 400);

    let res = server.client.delete(server.url("/tasks/1")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: MessageResponse = res.json().await.unwrap();
    assert_eq!(body.message, "Task deleted");

    let res = server.client.get(server.url("/tasks")).send().await.unwrap();
    let body: TaskListResponse = res.json().await.unwrap();
    assert!(body.data.is_empty());

    let res = server.client.delete(server.url("/tasks/1")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: ErrorResponse = res.json().await.unwrap();
    assert_eq!(body.error, "Task not found");

    server.stop().await;
}

#[tokio::test]
async fn test_ids_unique_after_deletes() {
    let server = TestServer::start().await;
    let a = server.create("a").await;
    let b = server.create("b").await;

    let res = server.client.delete(server.url(&format!("/tasks/{a}"))).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let c = server.create("c").await;
    assert_ne!(c, b);
    assert_eq!(c, 3);

    let res = server.client.get(server.url("/tasks")).send().await.unwrap();
    let body: TaskListResponse = res.json().await.unwrap();
    let ids: Vec<_> = body.data.iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![b, c]);

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_creates() {
    let server = TestServer::start().await;

    let requests = (0..50).map(|i| {
        let client = server.client.clone();
        let url = server.url("/tasks");
        async move {
            let res = client
                .post(url)
                .json(&json!({ "title": format!("task {i}") }))
                .send()
                .await
                .unwrap();
            let body: TaskResponse = res.json().await.unwrap();
            body.task.id
        }
    });
    let handles: Vec<_> = requests.map(tokio::spawn).collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert_eq!(server.store.len(), 50);

    server.stop().await;
}
