#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use canteen_api::{
    config::AppConfig,
    entity::{
        MenuItems, OrderItems, Orders, Sessions, StudentProfiles, TeacherProfiles, Users,
        menu_items::ActiveModel as MenuItemActive, users::ActiveModel as UserActive,
    },
    routes::create_api_router,
    state::AppState,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, Schema, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        session_ttl_hours: 24,
    }
}

/// Fresh in-memory database with every table created from the entities.
pub async fn setup_state() -> anyhow::Result<AppState> {
    // One connection, kept open: each sqlite memory connection is its own db.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let orm = Database::connect(opts).await?;

    let backend = orm.get_database_backend();
    let schema = Schema::new(backend);
    let tables = [
        schema.create_table_from_entity(Users),
        schema.create_table_from_entity(StudentProfiles),
        schema.create_table_from_entity(TeacherProfiles),
        schema.create_table_from_entity(Sessions),
        schema.create_table_from_entity(MenuItems),
        schema.create_table_from_entity(Orders),
        schema.create_table_from_entity(OrderItems),
    ];
    for table in tables {
        orm.execute(backend.build(&table)).await?;
    }

    Ok(AppState {
        orm,
        config: test_config(),
    })
}

pub fn app(state: &AppState) -> Router {
    create_api_router().with_state(state.clone())
}

/// Insert a user directly; the password hash is a placeholder.
pub async fn create_user(state: &AppState, username: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set("dummy".into()),
        is_student: Set(true),
        is_teacher: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(user.id)
}

pub async fn create_menu_item(
    state: &AppState,
    name: &str,
    price: i64,
    is_available: bool,
) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        price: Set(price),
        is_available: Set(is_available),
        preparation_time: Set(5),
        options: Set(serde_json::json!([])),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
