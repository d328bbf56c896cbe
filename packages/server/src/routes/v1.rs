use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/tests", test_routes())
        .nest("/machines", machine_routes())
        .nest("/materials", material_routes())
        .nest("/images", image_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn test_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::test::list_tests,
            handlers::test::create_test
        ))
        .routes(routes!(
            handlers::test::get_test,
            handlers::test::update_test,
            handlers::test::delete_test
        ))
        .nest("/{id}/comments", comment_routes())
        .layer(handlers::test::upload_body_limit())
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::comment::list_comments,
            handlers::comment::create_comment
        ))
        .routes(routes!(handlers::comment::delete_comment))
}

fn machine_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::machine::list_machines,
            handlers::machine::create_machine
        ))
        .routes(routes!(
            handlers::machine::get_machine,
            handlers::machine::update_machine,
            handlers::machine::delete_machine
        ))
}

fn material_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::material::list_materials,
            handlers::material::create_material
        ))
        .routes(routes!(
            handlers::material::get_material,
            handlers::material::delete_material
        ))
}

fn image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::image::get_image))
}
