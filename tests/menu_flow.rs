mod common;

use axum::http::StatusCode;
use canteen_api::{
    dto::menu_items::MenuItemRequest, error::AppError, services::menu_service,
};
use serde_json::json;
use uuid::Uuid;

fn dosa() -> MenuItemRequest {
    MenuItemRequest {
        name: Some("Masala Dosa".into()),
        price: Some(6000.into()),
        is_available: Some(true.into()),
        preparation_time: Some(10.into()),
        options: Some(json!(["extra chutney", "no onion"])),
    }
}

#[tokio::test]
async fn created_item_reads_back_unchanged() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let created = menu_service::create_menu_item(&state, dosa())
        .await?
        .data
        .unwrap();
    let fetched = menu_service::get_menu_item(&state, created.id).await?;
    assert!(fetched.meta.is_some());
    let fetched = fetched.data.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.name, "Masala Dosa");
    assert_eq!(fetched.price, 6000);
    assert!(fetched.is_available);
    assert_eq!(fetched.preparation_time, 10);
    assert_eq!(fetched.options, vec!["extra chutney", "no onion"]);

    let listed = menu_service::list_menu_items(&state).await?;
    assert_eq!(listed.data.unwrap().items, vec![created]);
    assert_eq!(listed.meta.unwrap().total, Some(1));
    Ok(())
}

#[tokio::test]
async fn updating_missing_item_is_not_found() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let result = menu_service::update_menu_item(&state, Uuid::new_v4(), dosa()).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let result = menu_service::get_menu_item(&state, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn update_replaces_all_fields() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let created = menu_service::create_menu_item(&state, dosa())
        .await?
        .data
        .unwrap();

    let updated = menu_service::update_menu_item(
        &state,
        created.id,
        MenuItemRequest {
            name: Some("Rava Dosa".into()),
            price: Some(7000.into()),
            is_available: Some(false.into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Rava Dosa");
    assert_eq!(updated.price, 7000);
    assert!(!updated.is_available);
    assert_eq!(updated.preparation_time, 0);
    assert!(updated.options.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_names_are_field_errors() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    menu_service::create_menu_item(&state, dosa()).await?;

    match menu_service::create_menu_item(&state, dosa()).await {
        Err(AppError::Validation(errors)) => assert!(errors.get("name").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn renaming_onto_a_taken_name_is_a_field_error() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    common::create_menu_item(&state, "Lassi", 3000, true).await?;
    let tea = common::create_menu_item(&state, "Tea", 1000, true).await?;

    let renamed = menu_service::update_menu_item(
        &state,
        tea,
        MenuItemRequest {
            name: Some("Lassi".into()),
            price: Some(1000.into()),
            ..Default::default()
        },
    )
    .await;
    match renamed {
        Err(AppError::Validation(errors)) => assert!(errors.get("name").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    // Keeping its own name is not a clash.
    menu_service::update_menu_item(
        &state,
        tea,
        MenuItemRequest {
            name: Some("Tea".into()),
            price: Some(1200.into()),
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn http_create_get_and_errors() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/menu_item/add/",
            &json!({ "name": "Samosa", "price": 1500, "options": ["chutney"] }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["is_available"], json!(true));

    let response = common::send(
        common::app(&state),
        common::empty_request("GET", &format!("/menu_item/{id}/")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["data"]["name"], "Samosa");

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/menu_item/add/", &json!({ "price": -3 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["name"], json!(["This field is required."]));
    assert!(body["data"]["price"].is_array());

    let response = common::send(
        common::app(&state),
        common::json_request(
            "PUT",
            &format!("/menu_item/{}/", Uuid::new_v4()),
            &json!({ "name": "Tea", "price": 1000 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn http_numeric_strings_are_coerced_and_junk_is_keyed() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/menu_item/add/",
            &json!({ "name": "Tea", "price": "50", "is_available": "false" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["price"], 50);
    assert_eq!(body["data"]["is_available"], json!(false));

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/menu_item/add/",
            &json!({ "name": "Coffee", "price": "abc", "preparation_time": [] }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["price"], json!(["A valid integer is required."]));
    assert_eq!(
        body["data"]["preparation_time"],
        json!(["A valid integer is required."])
    );
    assert!(body["data"].get("error").is_none());

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/menu_item/add/", &json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
