use crate::common::{TestApp, routes};

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "username": "laser_lise",
        "email": "lise@example.com",
        "password": "pass12345",
    });
    let res = app.post(routes::REGISTER, &body).await;
    assert_eq!(res.status, 201, "register failed: {}", res.text);
    assert_eq!(res.body["username"].as_str().unwrap(), "laser_lise");

    let res = app
        .post(
            routes::LOGIN,
            &serde_json::json!({
                "email": "lise@example.com",
                "password": "pass12345",
            }),
        )
        .await;
    assert_eq!(res.status, 200, "login failed: {}", res.text);
    let token = res.body["token"].as_str().unwrap().to_string();

    let me = app.get_with_token(routes::ME, &token).await;
    assert_eq!(me.status, 200);
    assert_eq!(me.body["username"].as_str().unwrap(), "laser_lise");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "username": "first_user",
        "email": "shared@example.com",
        "password": "pass12345",
    });
    assert_eq!(app.post(routes::REGISTER, &body).await.status, 201);

    let body = serde_json::json!({
        "username": "second_user",
        "email": "shared@example.com",
        "password": "pass12345",
    });
    let res = app.post(routes::REGISTER, &body).await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");
}

#[tokio::test]
async fn register_validates_fields() {
    let app = TestApp::spawn().await;

    // Bad username characters.
    let res = app
        .post(
            routes::REGISTER,
            &serde_json::json!({
                "username": "no spaces allowed",
                "email": "a@example.com",
                "password": "pass12345",
            }),
        )
        .await;
    assert_eq!(res.status, 400);

    // Short password.
    let res = app
        .post(
            routes::REGISTER,
            &serde_json::json!({
                "username": "fine_name",
                "email": "a@example.com",
                "password": "short",
            }),
        )
        .await;
    assert_eq!(res.status, 400);

    // Email without '@'.
    let res = app
        .post(
            routes::REGISTER,
            &serde_json::json!({
                "username": "fine_name",
                "email": "not-an-email",
                "password": "pass12345",
            }),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "username": "victim",
        "email": "victim@example.com",
        "password": "pass12345",
    });
    assert_eq!(app.post(routes::REGISTER, &body).await.status, 201);

    let res = app
        .post(
            routes::LOGIN,
            &serde_json::json!({
                "email": "victim@example.com",
                "password": "wrong-password",
            }),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_rejects_unknown_email() {
    let app = TestApp::spawn().await;
    let res = app
        .post(
            routes::LOGIN,
            &serde_json::json!({
                "email": "ghost@example.com",
                "password": "pass12345",
            }),
        )
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn me_requires_token() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::ME).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "TOKEN_MISSING");

    let res = app.get_with_token(routes::ME, "garbage.token.here").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "TOKEN_INVALID");
}
