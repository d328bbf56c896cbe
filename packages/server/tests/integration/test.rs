use crate::common::{TestApp, jpeg_bytes, png_bytes, routes, test_fields};

mod create {
    use super::*;

    #[tokio::test]
    async fn create_without_image_uses_default_sentinel() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let (test_id, image) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;
        assert_eq!(image, "default.jpg");

        // No blob was written.
        assert!(app.uploaded_files().is_empty());

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.status, 200);
        assert_eq!(details.body["image"].as_str().unwrap(), "default.jpg");
    }

    #[tokio::test]
    async fn create_applies_documented_parameter_defaults() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let (test_id, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.status, 200);
        assert_eq!(details.body["speed"].as_f64().unwrap(), 800.0);
        assert_eq!(details.body["power"].as_f64().unwrap(), 60.0);
        assert_eq!(details.body["frequency"].as_f64().unwrap(), 30.0);
        assert!(details.body["pulse"].is_null());
        assert_eq!(details.body["z_offset"].as_f64().unwrap(), 0.0);
        assert_eq!(details.body["nb_passes"].as_i64().unwrap(), 1);
        assert_eq!(details.body["sweep"].as_i64().unwrap(), 1);
        assert_eq!(details.body["hatch"].as_f64().unwrap(), 0.0);
        assert_eq!(details.body["row_interval"].as_f64().unwrap(), 0.05);
        assert_eq!(details.body["wobble"].as_f64().unwrap(), 0.0);
    }

    #[tokio::test]
    async fn create_with_image_stores_blob_under_generated_name() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let (_, image) = app
            .create_test(
                machine_id,
                material_id,
                user_id,
                Some(("photo.png", png_bytes(), "image/png")),
            )
            .await;

        assert_ne!(image, "default.jpg");
        assert!(image.ends_with(".png"));
        assert_eq!(app.uploaded_files(), vec![image]);
    }

    #[tokio::test]
    async fn create_missing_title_has_no_side_effects() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.retain(|(name, _)| *name != "title");

        let res = app
            .post_test_form(
                routes::TESTS,
                &fields,
                Some(("photo.png", png_bytes(), "image/png")),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        // Neither a blob nor any rows were written.
        assert!(app.uploaded_files().is_empty());
        let list = app.get(routes::TESTS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn create_rejects_non_image_payload() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let fields = test_fields(machine_id, material_id, user_id);
        let res = app
            .post_test_form(
                routes::TESTS,
                &fields,
                // Declared as PNG, but the bytes say GIF. Sniffing wins.
                Some(("evil.png", b"GIF89a.........".to_vec(), "image/png")),
            )
            .await;
        assert_eq!(res.status, 400);
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_oversized_image() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let mut big = png_bytes();
        big.resize(5 * 1024 * 1024 + 1, 0);

        let fields = test_fields(machine_id, material_id, user_id);
        let res = app
            .post_test_form(routes::TESTS, &fields, Some(("big.png", big, "image/png")))
            .await;
        assert_eq!(res.status, 400);
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_non_numeric_parameter() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.push(("hatch", "not-a-number".to_string()));

        let res = app.post_test_form(routes::TESTS, &fields, None).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn create_rejects_negative_setting() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.retain(|(name, _)| *name != "speed");
        fields.push(("speed", "-5".to_string()));

        let res = app.post_test_form(routes::TESTS, &fields, None).await;
        assert_eq!(res.status, 400);
    }
}

mod list_and_detail {
    use super::*;

    #[tokio::test]
    async fn list_shows_joined_names_newest_first() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let (first, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;
        let (second, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        let res = app.get(routes::TESTS).await;
        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        // Newest first.
        assert_eq!(items[0]["test_id"].as_i64().unwrap() as i32, second);
        assert_eq!(items[1]["test_id"].as_i64().unwrap() as i32, first);
        assert_eq!(items[0]["machine_name"].as_str().unwrap(), "LaserPecker 4");
        assert_eq!(items[0]["material_name"].as_str().unwrap(), "Stainless 304");
    }

    #[tokio::test]
    async fn detail_includes_author_username() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let (test_id, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.status, 200);
        assert!(
            details.body["author"]
                .as_str()
                .unwrap()
                .starts_with("user_")
        );
        assert_eq!(details.body["title"].as_str().unwrap(), "Inox 60W");
    }

    #[tokio::test]
    async fn detail_of_missing_test_returns_404() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::test(4242)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn update_replaces_fields_and_parameters() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.retain(|(name, _)| !matches!(*name, "title" | "speed" | "user_id"));
        fields.push(("title", "Inox 80W rework".to_string()));
        fields.push(("speed", "1200".to_string()));
        fields.push(("nb_passes", "3".to_string()));

        let res = app.put_test_form(&routes::test(test_id), &fields, None).await;
        assert_eq!(res.status, 200, "update failed: {}", res.text);

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.body["title"].as_str().unwrap(), "Inox 80W rework");
        assert_eq!(details.body["speed"].as_f64().unwrap(), 1200.0);
        assert_eq!(details.body["nb_passes"].as_i64().unwrap(), 3);
    }

    #[tokio::test]
    async fn update_retains_omitted_optional_settings() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.push(("hatch", "0.8".to_string()));
        fields.push(("pulse", "200".to_string()));
        let res = app.post_test_form(routes::TESTS, &fields, None).await;
        assert_eq!(res.status, 201);
        let test_id = res.body["test_id"].as_i64().unwrap() as i32;

        // Update without hatch or pulse: both keep their stored values.
        let fields = test_fields(machine_id, material_id, user_id);
        let res = app.put_test_form(&routes::test(test_id), &fields, None).await;
        assert_eq!(res.status, 200);

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.body["hatch"].as_f64().unwrap(), 0.8);
        assert_eq!(details.body["pulse"].as_f64().unwrap(), 200.0);
    }

    #[tokio::test]
    async fn update_with_new_image_deletes_previous_blob_after_commit() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, old_image) = app
            .create_test(
                machine_id,
                material_id,
                user_id,
                Some(("old.png", png_bytes(), "image/png")),
            )
            .await;

        let fields = test_fields(machine_id, material_id, user_id);
        let res = app
            .put_test_form(
                &routes::test(test_id),
                &fields,
                Some(("new.jpg", jpeg_bytes(), "image/jpeg")),
            )
            .await;
        assert_eq!(res.status, 200, "update failed: {}", res.text);
        let new_image = res.body["image"].as_str().unwrap().to_string();

        assert_ne!(new_image, old_image);
        // Only the replacement remains on disk.
        assert_eq!(app.uploaded_files(), vec![new_image.clone()]);

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.body["image"].as_str().unwrap(), new_image);
    }

    #[tokio::test]
    async fn update_without_image_keeps_existing_reference() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, image) = app
            .create_test(
                machine_id,
                material_id,
                user_id,
                Some(("keep.png", png_bytes(), "image/png")),
            )
            .await;

        let fields = test_fields(machine_id, material_id, user_id);
        let res = app.put_test_form(&routes::test(test_id), &fields, None).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["image"].as_str().unwrap(), image);
        assert_eq!(app.uploaded_files(), vec![image]);
    }

    #[tokio::test]
    async fn update_of_missing_test_returns_404() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;

        let fields = test_fields(machine_id, material_id, user_id);
        let res = app.put_test_form(&routes::test(999), &fields, None).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn update_validation_error_leaves_record_untouched() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        let mut fields = test_fields(machine_id, material_id, user_id);
        fields.retain(|(name, _)| *name != "frequency");

        let res = app.put_test_form(&routes::test(test_id), &fields, None).await;
        assert_eq!(res.status, 400);

        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.body["frequency"].as_f64().unwrap(), 30.0);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_rows_and_releases_blob() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, _) = app
            .create_test(
                machine_id,
                material_id,
                user_id,
                Some(("gone.png", png_bytes(), "image/png")),
            )
            .await;

        let res = app.delete(&routes::test(test_id)).await;
        assert_eq!(res.status, 204);

        assert!(app.uploaded_files().is_empty());
        let details = app.get(&routes::test(test_id)).await;
        assert_eq!(details.status, 404);
    }

    #[tokio::test]
    async fn delete_with_default_image_succeeds() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (test_id, image) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;
        assert_eq!(image, "default.jpg");

        let res = app.delete(&routes::test(test_id)).await;
        assert_eq!(res.status, 204);
    }

    #[tokio::test]
    async fn delete_of_missing_test_returns_404() {
        let app = TestApp::spawn().await;
        let res = app.delete(&routes::test(31337)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn deleted_test_disappears_from_list() {
        let app = TestApp::spawn().await;
        let (machine_id, material_id, user_id) = app.seed_refs().await;
        let (keep, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;
        let (gone, _) = app
            .create_test(machine_id, material_id, user_id, None)
            .await;

        app.delete(&routes::test(gone)).await;

        let res = app.get(routes::TESTS).await;
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["test_id"].as_i64().unwrap() as i32, keep);
    }
}
