use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Order, PaymentMethod},
    validation::{
        FieldErrors, INVALID_STRING, non_negative, optional_bool, optional_integer,
        optional_text, optional_uuid, required_text, string_list,
    },
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Menu item name.
    #[schema(value_type = Option<String>)]
    pub menu_item: Option<Value>,
    #[schema(value_type = Option<i32>)]
    pub quantity: Option<Value>,
    #[schema(value_type = Option<Vec<String>>)]
    pub selected_options: Option<Value>,
}

/// Order payload. Timestamps and status are read-only and not accepted here.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderRequest {
    /// Owner; defaults to the logged-in user when omitted.
    #[schema(value_type = Option<Uuid>)]
    pub user: Option<Value>,
    /// Defaults to the sum of menu price times quantity.
    #[schema(value_type = Option<i64>)]
    pub total_price: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub is_fulfilled: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub payment_method: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub transaction_id: Option<Value>,
    pub items: Option<Vec<OrderItemRequest>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrderItem {
    pub menu_item: String,
    pub quantity: i32,
    pub selected_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrder {
    pub user: Option<Uuid>,
    pub total_price: Option<i64>,
    pub is_fulfilled: bool,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub items: Vec<ValidOrderItem>,
}

impl OrderItemRequest {
    pub fn validate(self) -> Result<ValidOrderItem, FieldErrors> {
        let mut errors = FieldErrors::new();
        let menu_item = required_text(&mut errors, "menu_item", self.menu_item);
        let quantity = optional_integer::<i32>(&mut errors, "quantity", self.quantity).unwrap_or(1);
        if quantity < 1 {
            errors.add("quantity", "Ensure this value is greater than or equal to 1.");
        }
        let selected_options = string_list(&mut errors, "selected_options", self.selected_options);

        match menu_item {
            Some(menu_item) => errors.into_result(ValidOrderItem {
                menu_item,
                quantity,
                selected_options,
            }),
            None => Err(errors),
        }
    }
}

impl OrderRequest {
    /// Shape checks only; the user and menu item lookups happen against the
    /// database in the order service.
    pub fn validate(self) -> Result<ValidOrder, FieldErrors> {
        let mut errors = FieldErrors::new();

        let user = optional_uuid(&mut errors, "user", self.user);
        let total_price = optional_integer::<i64>(&mut errors, "total_price", self.total_price);
        if let Some(total) = total_price {
            non_negative(&mut errors, "total_price", total);
        }
        let is_fulfilled = optional_bool(&mut errors, "is_fulfilled", self.is_fulfilled).unwrap_or(false);

        let payment_method = match self.payment_method {
            None | Some(Value::Null) => PaymentMethod::default(),
            Some(Value::String(raw)) => PaymentMethod::parse(&raw).unwrap_or_else(|| {
                errors.add("payment_method", format!("\"{raw}\" is not a valid choice."));
                PaymentMethod::default()
            }),
            Some(_) => {
                errors.add("payment_method", INVALID_STRING);
                PaymentMethod::default()
            }
        };

        let transaction_id = optional_text(&mut errors, "transaction_id", self.transaction_id, false)
            .filter(|t| !t.is_empty());

        let mut items = Vec::new();
        for (idx, item) in self.items.unwrap_or_default().into_iter().enumerate() {
            match item.validate() {
                Ok(item) => items.push(item),
                Err(item_errors) => errors.extend_prefixed(&format!("items[{idx}]"), item_errors),
            }
        }

        errors.into_result(ValidOrder {
            user,
            total_price,
            is_fulfilled,
            payment_method,
            transaction_id,
            items,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    /// Integer code, or its string form.
    #[schema(value_type = Option<i32>)]
    pub status: Option<Value>,
    /// When set, the write only happens if the stored code still equals it.
    #[schema(value_type = Option<i32>)]
    pub expected_status: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChanged {
    pub status: String,
    pub status_code: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StatusOptions {
    pub options: BTreeMap<String, i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
