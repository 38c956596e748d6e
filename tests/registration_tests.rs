mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_capacity_is_enforced() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Music").await;
    let concert = app.create_event(&admin, "Concert", "Music", 1).await;

    app.sign_up("User A", "a@example.com", "secret-123").await;
    app.sign_up("User B", "b@example.com", "secret-123").await;
    let token_a = app.login("a@example.com", "secret-123").await;
    let token_b = app.login("b@example.com", "secret-123").await;

    let (status, body) = app.register(&token_a, concert).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["event_id"], concert);

    let (status, body) = app.register(&token_b, concert).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "capacity_exceeded");

    let (status, body) = app
        .request("GET", &format!("/eventos/{concert}/cupos"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["registered"], 1);
    assert_eq!(body["data"]["remaining"], 0);
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Sports").await;
    let event = app.create_event(&admin, "Marathon", "Sports", 10).await;

    app.sign_up("Runner", "runner@example.com", "secret-123").await;
    let token = app.login("runner@example.com", "secret-123").await;

    let (status, _) = app.register(&token, event).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.register(&token, event).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_registration_for_missing_event() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app.register(&admin, 4242).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_capacity() {
    const CAPACITY: i32 = 3;
    const CONTENDERS: usize = 12;

    let app = Arc::new(spawn_app().await);
    let admin = app.admin_token().await;

    app.create_category(&admin, "Festivals").await;
    let event = app.create_event(&admin, "Summer Fest", "Festivals", CAPACITY).await;

    let mut user_ids = Vec::with_capacity(CONTENDERS);
    for i in 0..CONTENDERS {
        let id = app
            .sign_up(&format!("Fan {i}"), &format!("fan{i}@example.com"), "secret-123")
            .await;
        user_ids.push(id);
    }

    let mut handles = Vec::with_capacity(CONTENDERS);
    for user_id in user_ids {
        let app = Arc::clone(&app);
        let admin = admin.clone();
        handles.push(tokio::spawn(async move {
            app.request(
                "POST",
                "/inscripciones",
                Some(&admin),
                Some(json!({ "event_id": event, "user_id": user_id })),
            )
            .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::CREATED => admitted += 1,
            StatusCode::CONFLICT => assert_eq!(body["code"], "capacity_exceeded"),
            other => panic!("unexpected status {other}: {body}"),
        }
    }

    assert_eq!(admitted, CAPACITY);

    let (_, body) = app
        .request(
            "GET",
            &format!("/inscripciones?event_id={event}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), CAPACITY as usize);
}

#[tokio::test]
async fn test_clients_only_see_their_own_registrations() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Talks").await;
    let event = app.create_event(&admin, "Keynote", "Talks", 10).await;

    let a_id = app.sign_up("User A", "a@example.com", "secret-123").await;
    app.sign_up("User B", "b@example.com", "secret-123").await;
    let token_a = app.login("a@example.com", "secret-123").await;
    let token_b = app.login("b@example.com", "secret-123").await;

    let (_, body) = app.register(&token_a, event).await;
    let registration_id = body["data"]["id"].as_i64().unwrap();
    app.register(&token_b, event).await;

    let (status, body) = app
        .request("GET", "/inscripciones", Some(&token_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], a_id);

    let (status, _) = app
        .request(
            "GET",
            &format!("/inscripciones?user_id={a_id}"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "GET",
            &format!("/inscripciones/{registration_id}"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/inscripciones/{registration_id}"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.request("GET", "/inscripciones", Some(&admin), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_delete_cascades() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let category = app.create_category(&admin, "Cinema").await;
    let first = app.create_event(&admin, "Premiere", "Cinema", 5).await;
    let second = app.create_event(&admin, "Retrospective", "Cinema", 5).await;

    app.sign_up("Viewer", "viewer@example.com", "secret-123").await;
    let viewer = app.login("viewer@example.com", "secret-123").await;
    app.register(&viewer, first).await;
    app.register(&viewer, second).await;

    let (status, _) = app
        .request("DELETE", &format!("/categorias/{category}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for event in [first, second] {
        let (status, _) = app
            .request("GET", &format!("/eventos/{event}"), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, body) = app.request("GET", "/inscripciones", Some(&admin), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_delete_removes_registrations() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Games").await;
    let event = app.create_event(&admin, "Tournament", "Games", 5).await;

    let player = app.sign_up("Player", "player@example.com", "secret-123").await;
    let token = app.login("player@example.com", "secret-123").await;
    app.register(&token, event).await;

    let (status, _) = app
        .request("DELETE", &format!("/usuarios/{player}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .request("GET", &format!("/eventos/{event}/cupos"), Some(&admin), None)
        .await;
    assert_eq!(body["data"]["registered"], 0);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .request("GET", "/stats/dashboard", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_events"], 0);
    assert_eq!(body["data"]["top_event"]["name"], "N/A");

    app.create_category(&admin, "Music").await;
    let big = app.create_event(&admin, "Big Show", "Music", 10).await;
    let small = app.create_event(&admin, "Small Show", "Music", 10).await;
    app.create_event(&admin, "Empty Show", "Music", 10).await;

    for i in 0..3 {
        let email = format!("fan{i}@example.com");
        app.sign_up(&format!("Fan {i}"), &email, "secret-123").await;
        let token = app.login(&email, "secret-123").await;
        app.register(&token, big).await;
        if i == 0 {
            app.register(&token, small).await;
        }
    }

    let (status, body) = app
        .request("GET", "/stats/dashboard", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_events"], 3);
    assert_eq!(body["data"]["active_registrations"], 4);
    assert_eq!(body["data"]["average_registrations_per_event"], 2.0);
    assert_eq!(body["data"]["top_event"]["name"], "Big Show");
    assert_eq!(body["data"]["top_event"]["registrations"], 3);
}

#[tokio::test]
async fn test_capacity_cannot_shrink_below_registrations() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Workshops").await;
    let event = app.create_event(&admin, "Pottery", "Workshops", 2).await;

    for email in ["a@example.com", "b@example.com"] {
        app.sign_up("Potter", email, "secret-123").await;
        let token = app.login(email, "secret-123").await;
        let (status, _) = app.register(&token, event).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(
            "PUT",
            &format!("/eventos/{event}"),
            Some(&admin),
            Some(json!({ "capacity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], "conflict");

    let (_, body) = app
        .request("GET", &format!("/eventos/{event}/cupos"), Some(&admin), None)
        .await;
    assert_eq!(body["data"]["capacity"], 2);
    assert_eq!(body["data"]["registered"], 2);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/eventos/{event}"),
            Some(&admin),
            Some(json!({ "capacity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["capacity"], 2);
}

#[tokio::test]
async fn test_available_lists_future_events_with_free_slots() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Music").await;
    let open = app.create_event(&admin, "Open Show", "Music", 5).await;
    let full = app.create_event(&admin, "Full Show", "Music", 1).await;

    let (status, body) = app
        .request(
            "POST",
            "/eventos",
            Some(&admin),
            Some(json!({
                "name": "Old Show",
                "description": "Already happened",
                "start_date": "2020-01-01",
                "end_date": "2020-01-02",
                "venue": "Main hall",
                "capacity": 5,
                "category": "Music",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = app.register(&admin, full).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request("GET", "/eventos?available=true", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![open]);

    let (_, body) = app.request("GET", "/eventos", Some(&admin), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_event_delete_removes_registrations() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "Talks").await;
    let doomed = app.create_event(&admin, "Cancelled Talk", "Talks", 5).await;
    let kept = app.create_event(&admin, "Kept Talk", "Talks", 5).await;

    app.sign_up("Listener", "listener@example.com", "secret-123").await;
    let token = app.login("listener@example.com", "secret-123").await;
    app.register(&token, doomed).await;
    app.register(&token, kept).await;

    let (status, _) = app
        .request("DELETE", &format!("/eventos/{doomed}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .request(
            "GET",
            &format!("/inscripciones?event_id={doomed}"),
            Some(&admin),
            None,
        )
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.request("GET", "/inscripciones", Some(&admin), None).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["event_id"], kept);

    let (status, _) = app
        .request("DELETE", &format!("/eventos/{doomed}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_ids_are_not_reused() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_category(&admin, "First").await;
    let second = app.create_category(&admin, "Second").await;

    let (status, _) = app
        .request("DELETE", &format!("/categorias/{second}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let third = app.create_category(&admin, "Third").await;
    assert!(third > second, "id {third} reused after deleting {second}");

    let event = app.create_event(&admin, "Gone", "First", 5).await;
    app.request("DELETE", &format!("/eventos/{event}"), Some(&admin), None)
        .await;
    let next = app.create_event(&admin, "Next", "First", 5).await;
    assert!(next > event);
}
