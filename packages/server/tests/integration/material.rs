use crate::common::{TestApp, routes};

#[tokio::test]
async fn material_create_get_delete() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::MATERIALS,
            &serde_json::json!({
                "name": "Anodized aluminum",
                "category": "metal",
                "thickness": 0.8,
                "color": "black",
            }),
        )
        .await;
    assert_eq!(res.status, 201, "create failed: {}", res.text);
    let id = res.id();

    let res = app.get(&routes::material(id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"].as_str().unwrap(), "Anodized aluminum");
    assert_eq!(res.body["thickness"].as_f64().unwrap(), 0.8);

    let res = app.delete(&routes::material(id)).await;
    assert_eq!(res.status, 204);
    assert_eq!(app.get(&routes::material(id)).await.status, 404);
}

#[tokio::test]
async fn materials_list_ordered_by_name() {
    let app = TestApp::spawn().await;
    for name in ["Walnut", "Acrylic", "Slate"] {
        let res = app
            .post(routes::MATERIALS, &serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, 201);
    }

    let res = app.get(routes::MATERIALS).await;
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acrylic", "Slate", "Walnut"]);
}

#[tokio::test]
async fn machine_filter_returns_only_tested_materials() {
    let app = TestApp::spawn().await;
    let (machine_id, tested_material, user_id) = app.seed_refs().await;
    let untested_material = app.create_material("Never engraved").await;

    app.create_test(machine_id, tested_material, user_id, None)
        .await;

    let res = app
        .get(&format!("{}?machine_id={machine_id}", routes::MATERIALS))
        .await;
    assert_eq!(res.status, 200);
    let ids: Vec<i64> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&(tested_material as i64)));
    assert!(!ids.contains(&(untested_material as i64)));
}

#[tokio::test]
async fn material_rejects_non_positive_thickness() {
    let app = TestApp::spawn().await;
    let res = app
        .post(
            routes::MATERIALS,
            &serde_json::json!({ "name": "Paper", "thickness": 0.0 }),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn material_referenced_by_test_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let (machine_id, material_id, user_id) = app.seed_refs().await;
    app.create_test(machine_id, material_id, user_id, None).await;

    let res = app.delete(&routes::material(material_id)).await;
    assert_eq!(res.status, 409);
}
