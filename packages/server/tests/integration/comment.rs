use crate::common::{TestApp, routes};

#[tokio::test]
async fn comment_create_list_delete_round_trip() {
    let app = TestApp::spawn().await;
    let (machine_id, material_id, user_id) = app.seed_refs().await;
    let (test_id, _) = app
        .create_test(machine_id, material_id, user_id, None)
        .await;

    let res = app
        .post(
            &routes::comments(test_id),
            &serde_json::json!({
                "user_id": user_id,
                "content": "Great contrast at 60% power.",
            }),
        )
        .await;
    assert_eq!(res.status, 201, "create comment failed: {}", res.text);
    let comment_id = res.id();
    assert!(res.body["author"].as_str().unwrap().starts_with("user_"));

    let res = app.get(&routes::comments(test_id)).await;
    assert_eq!(res.status, 200);
    let items = res.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0]["content"].as_str().unwrap(),
        "Great contrast at 60% power."
    );

    let res = app.delete(&routes::comment(test_id, comment_id)).await;
    assert_eq!(res.status, 204);

    let res = app.get(&routes::comments(test_id)).await;
    assert_eq!(res.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn comment_on_missing_test_returns_404() {
    let app = TestApp::spawn().await;
    let user_id = app.register_user().await;

    let res = app
        .post(
            &routes::comments(9999),
            &serde_json::json!({ "user_id": user_id, "content": "hello" }),
        )
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn comment_requires_content() {
    let app = TestApp::spawn().await;
    let (machine_id, material_id, user_id) = app.seed_refs().await;
    let (test_id, _) = app
        .create_test(machine_id, material_id, user_id, None)
        .await;

    let res = app
        .post(
            &routes::comments(test_id),
            &serde_json::json!({ "user_id": user_id, "content": "   " }),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn delete_checks_comment_belongs_to_test() {
    let app = TestApp::spawn().await;
    let (machine_id, material_id, user_id) = app.seed_refs().await;
    let (test_a, _) = app
        .create_test(machine_id, material_id, user_id, None)
        .await;
    let (test_b, _) = app
        .create_test(machine_id, material_id, user_id, None)
        .await;

    let res = app
        .post(
            &routes::comments(test_a),
            &serde_json::json!({ "user_id": user_id, "content": "on A" }),
        )
        .await;
    let comment_id = res.id();

    // Deleting A's comment through B's URL is a 404, not a delete.
    let res = app.delete(&routes::comment(test_b, comment_id)).await;
    assert_eq!(res.status, 404);

    let res = app.get(&routes::comments(test_a)).await;
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}
