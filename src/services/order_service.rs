use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        ChangeStatusRequest, OrderList, OrderRequest, StatusChanged, StatusOptions,
        ValidOrderItem,
    },
    entity::{
        menu_items::{Column as MenuCol, Entity as MenuItems, Model as MenuItemModel},
        order_items::{ActiveModel as OrderItemActive, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, PaymentMethod},
    response::{ApiResponse, Meta},
    state::AppState,
    status::{self, OrderStatus, parse_status_code, status_label},
    validation::{FieldErrors, REQUIRED, optional_integer},
};

pub async fn list_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    list_where(state, Condition::all(), "Orders").await
}

/// Orders whose fulfillment flag is set.
pub async fn completed_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::IsFulfilled.eq(true));
    list_where(state, condition, "Completed orders").await
}

/// Unfulfilled orders the canteen still has to work on (status >= 0).
pub async fn pending_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all()
        .add(OrderCol::IsFulfilled.eq(false))
        .add(OrderCol::Status.gte(0));
    list_where(state, condition, "Pending orders").await
}

async fn list_where(
    state: &AppState,
    condition: Condition,
    message: &str,
) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::TimeIssued)
        .all(&state.orm)
        .await?;
    let items = with_items(&state.orm, orders).await?;

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success(message, OrderList { items }, Some(meta)))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = find_order(&state.orm, id).await?;
    let order = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub fn status_options() -> ApiResponse<StatusOptions> {
    ApiResponse::success(
        "Status options",
        StatusOptions {
            options: status::status_options(),
        },
        None,
    )
}

pub async fn accept_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = set_status(state, id, OrderStatus::Preparing.code()).await?;
    Ok(ApiResponse::success("Order accepted", order, Some(Meta::empty())))
}

pub async fn reject_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = set_status(state, id, OrderStatus::RejectedByCanteen.code()).await?;
    Ok(ApiResponse::success("Order rejected", order, Some(Meta::empty())))
}

/// Any recognised code may follow any other. With `expected_status` the
/// write is conditional on the stored code; without it the last writer wins.
pub async fn change_status(
    state: &AppState,
    id: Uuid,
    payload: ChangeStatusRequest,
) -> AppResult<ApiResponse<StatusChanged>> {
    let order = find_order(&state.orm, id).await?;

    let requested = match payload.status {
        Some(value) if !value.is_null() => value,
        _ => return Err(AppError::MissingStatus),
    };
    let code = parse_status_code(&requested)
        .filter(|code| OrderStatus::from_code(*code).is_some())
        .ok_or_else(|| AppError::StatusNotRecognised(requested.clone()))?;

    let mut errors = FieldErrors::new();
    let expected = optional_integer::<i32>(&mut errors, "expected_status", payload.expected_status);
    errors.into_result(())?;

    match expected {
        Some(expected) => {
            let result = Orders::update_many()
                .col_expr(OrderCol::Status, Expr::value(code))
                .filter(OrderCol::Id.eq(id))
                .filter(OrderCol::Status.eq(expected))
                .exec(&state.orm)
                .await?;
            if result.rows_affected == 0 {
                return Err(AppError::Conflict(format!(
                    "order status is no longer {}",
                    status_label(expected)
                )));
            }
        }
        None => {
            let mut active: OrderActive = order.into();
            active.status = Set(code);
            active.update(&state.orm).await?;
        }
    }

    tracing::info!(order_id = %id, status = code, "order status changed");

    Ok(ApiResponse::success(
        "Order status changed",
        StatusChanged {
            status: status_label(code),
            status_code: code,
        },
        Some(Meta::empty()),
    ))
}

/// Validates the nested items against the menu, then writes the order and
/// its items in one transaction.
pub async fn create_order(
    state: &AppState,
    actor: Option<&AuthUser>,
    payload: OrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let payload = payload.validate()?;
    let mut errors = FieldErrors::new();

    let user_id = payload.user.or(actor.map(|a| a.user_id));
    match user_id {
        None => errors.add("user", REQUIRED),
        Some(id) => {
            if Users::find_by_id(id).one(&state.orm).await?.is_none() {
                errors.add("user", format!("Invalid pk \"{id}\" - object does not exist."));
            }
        }
    }

    let menu = menu_by_name(&state.orm, &payload.items).await?;
    for (idx, item) in payload.items.iter().enumerate() {
        match menu.get(&item.menu_item) {
            None => errors.add(
                format!("items[{idx}].menu_item"),
                format!("Object with name={} does not exist.", item.menu_item),
            ),
            Some(m) if !m.is_available => errors.add(
                format!("items[{idx}].menu_item"),
                format!("{} is not available right now.", item.menu_item),
            ),
            Some(_) => {}
        }
    }
    let user_id = match (user_id, errors.is_empty()) {
        (Some(id), true) => id,
        _ => return Err(errors.into()),
    };

    let total_price = match payload.total_price {
        Some(total) => total,
        None => payload
            .items
            .iter()
            .filter_map(|item| {
                menu.get(&item.menu_item)
                    .map(|m| m.price.saturating_mul(item.quantity.into()))
            })
            .fold(0_i64, i64::saturating_add),
    };

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_price: Set(total_price),
        is_fulfilled: Set(payload.is_fulfilled),
        payment_method: Set(payload.payment_method.as_str().to_string()),
        status: Set(OrderStatus::Pending.code()),
        transaction_id: Set(payload.transaction_id),
        time_issued: Set(Utc::now().into()),
        time_scheduled: Set(None),
        time_prepared: Set(None),
        time_delivered: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        let Some(menu_item) = menu.get(&item.menu_item) else {
            continue;
        };
        let saved = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(menu_item.id),
            quantity: Set(item.quantity),
            selected_options: Set(serde_json::json!(item.selected_options)),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(saved, menu_item.name.clone()));
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %order.user_id, items = items.len(), "order created");

    Ok(ApiResponse::success(
        "Order created",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

/// Accepts and validates an order payload but changes nothing: what an
/// order update should mean has not been decided yet.
pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: OrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let order = find_order(&state.orm, id).await?;
    payload.validate()?;
    tracing::debug!(order_id = %id, "order update requested; left unchanged");

    let order = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order unchanged", order, Some(Meta::empty())))
}

async fn set_status(state: &AppState, id: Uuid, code: i32) -> AppResult<Order> {
    let order = find_order(&state.orm, id).await?;
    let mut active: OrderActive = order.into();
    active.status = Set(code);
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %id, status = code, "order status set");

    with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    match Orders::find_by_id(id).one(conn).await? {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

async fn menu_by_name<C: ConnectionTrait>(
    conn: &C,
    items: &[ValidOrderItem],
) -> AppResult<HashMap<String, MenuItemModel>> {
    let names: HashSet<&str> = items.iter().map(|i| i.menu_item.as_str()).collect();
    if names.is_empty() {
        return Ok(HashMap::new());
    }
    let menu = MenuItems::find()
        .filter(MenuCol::Name.is_in(names))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.name.clone(), m))
        .collect();
    Ok(menu)
}

/// Attach items (with their menu item names) to each order, keeping order.
/// Two queries regardless of how many orders there are.
async fn with_items<C: ConnectionTrait>(conn: &C, orders: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let items = orders.load_many(OrderItems, conn).await?;

    let menu_ids: HashSet<Uuid> = items.iter().flatten().map(|i| i.menu_item_id).collect();
    let names: HashMap<Uuid, String> = if menu_ids.is_empty() {
        HashMap::new()
    } else {
        MenuItems::find()
            .filter(MenuCol::Id.is_in(menu_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect()
    };

    let result = orders
        .into_iter()
        .zip(items)
        .map(|(order, items)| {
            let items = items
                .into_iter()
                .map(|item| {
                    let name = names.get(&item.menu_item_id).cloned().unwrap_or_default();
                    order_item_from_entity(item, name)
                })
                .collect();
            order_from_entity(order, items)
        })
        .collect();
    Ok(result)
}

fn order_from_entity(model: OrderModel, items: Vec<OrderItem>) -> Order {
    Order {
        id: model.id,
        user: model.user_id,
        total_price: model.total_price,
        is_fulfilled: model.is_fulfilled,
        payment_method: PaymentMethod::parse(&model.payment_method).unwrap_or_default(),
        status: status_label(model.status),
        status_code: model.status,
        transaction_id: model.transaction_id,
        time_issued: model.time_issued.with_timezone(&Utc),
        time_scheduled: model.time_scheduled.map(|dt| dt.with_timezone(&Utc)),
        time_prepared: model.time_prepared.map(|dt| dt.with_timezone(&Utc)),
        time_delivered: model.time_delivered.map(|dt| dt.with_timezone(&Utc)),
        items,
    }
}

fn order_item_from_entity(model: OrderItemModel, menu_item: String) -> OrderItem {
    OrderItem {
        id: model.id,
        menu_item,
        quantity: model.quantity,
        selected_options: serde_json::from_value(model.selected_options).unwrap_or_default(),
    }
}
