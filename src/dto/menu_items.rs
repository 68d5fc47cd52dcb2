use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    models::MenuItem,
    validation::{
        FieldErrors, non_negative, optional_bool, optional_integer, required_integer,
        required_text, string_list,
    },
};

/// Create and full-update payload for a menu item.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MenuItemRequest {
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    /// Minor currency units; numeric strings are accepted.
    #[schema(value_type = Option<i64>)]
    pub price: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub is_available: Option<Value>,
    #[schema(value_type = Option<i32>)]
    pub preparation_time: Option<Value>,
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidMenuItem {
    pub name: String,
    pub price: i64,
    pub is_available: bool,
    pub preparation_time: i32,
    pub options: Vec<String>,
}

impl MenuItemRequest {
    pub fn validate(self) -> Result<ValidMenuItem, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", self.name);
        if name.as_ref().is_some_and(|n| n.chars().count() > 100) {
            errors.add("name", "Ensure this field has no more than 100 characters.");
        }
        let price = required_integer::<i64>(&mut errors, "price", self.price);
        if let Some(price) = price {
            non_negative(&mut errors, "price", price);
        }
        let preparation_time =
            optional_integer::<i32>(&mut errors, "preparation_time", self.preparation_time)
                .unwrap_or(0);
        non_negative(&mut errors, "preparation_time", preparation_time.into());
        let is_available =
            optional_bool(&mut errors, "is_available", self.is_available).unwrap_or(true);
        let options = string_list(&mut errors, "options", self.options);

        match (name, price) {
            (Some(name), Some(price)) => errors.into_result(ValidMenuItem {
                name,
                price,
                is_available,
                preparation_time,
                options,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuItemList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}
