use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{ChangeStatusRequest, OrderList, OrderRequest, StatusChanged, StatusOptions},
    error::AppResult,
    middleware::{auth::AuthUser, json::JsonBody},
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/completed/", get(completed_orders))
        .route("/orders/pending/", get(pending_orders))
        .route("/orders/status_options/", get(status_options))
        .route("/orders/{id}/", get(get_order).put(update_order))
        .route("/orders/{id}/accept/", post(accept_order))
        .route("/orders/{id}/reject/", post(reject_order))
        .route("/orders/{id}/change_status/", post(change_status))
}

#[utoipa::path(
    get,
    path = "/orders/",
    responses(
        (status = 200, description = "All orders with their items", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order and items created", body = ApiResponse<Order>),
        (status = 400, description = "Field errors keyed by field name"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    actor: Option<AuthUser>,
    JsonBody(payload): JsonBody<OrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let resp = order_service::create_order(&state, actor.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/orders/completed/",
    responses(
        (status = 200, description = "Fulfilled orders", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn completed_orders(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::completed_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/pending/",
    responses(
        (status = 200, description = "Unfulfilled orders with a non-negative status", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn pending_orders(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::pending_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/status_options/",
    responses(
        (status = 200, description = "Status name to code table", body = ApiResponse<StatusOptions>)
    ),
    tag = "Orders"
)]
pub async fn status_options() -> Json<ApiResponse<StatusOptions>> {
    Json(order_service::status_options())
}

#[utoipa::path(
    get,
    path = "/orders/{id}/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/orders/{id}/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Payload validated; order returned unchanged", body = ApiResponse<Order>),
        (status = 400, description = "Field errors keyed by field name"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<OrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/accept/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order moved to Preparing", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn accept_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::accept_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/reject/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order moved to Rejected by Canteen", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn reject_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::reject_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/change_status/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Order status changed", body = ApiResponse<StatusChanged>),
        (status = 400, description = "Status missing or not recognised"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Stored status no longer matches expected_status"),
    ),
    tag = "Orders"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<JsonBody<ChangeStatusRequest>>,
) -> AppResult<Json<ApiResponse<StatusChanged>>> {
    let payload = body.map(|JsonBody(payload)| payload).unwrap_or_default();
    let resp = order_service::change_status(&state, id, payload).await?;
    Ok(Json(resp))
}
