//! Named order states and their integer codes.
//!
//! Codes are stored as-is on `orders.status`; nothing here restricts which
//! state may follow which. Negative codes mark orders the canteen will not
//! work on, which is what the pending view filters out.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::validation::integer_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    RejectedByCanteen,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::RejectedByCanteen,
        OrderStatus::Cancelled,
    ];

    pub fn code(self) -> i32 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::RejectedByCanteen => -1,
            OrderStatus::Cancelled => -2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::RejectedByCanteen => "Rejected by Canteen",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Forward lookup table, name -> code.
pub fn status_options() -> BTreeMap<String, i32> {
    OrderStatus::ALL
        .into_iter()
        .map(|s| (s.name().to_string(), s.code()))
        .collect()
}

/// Display label for a stored code. Codes outside the table can only get
/// into the database by hand, but they still have to render.
pub fn status_label(code: i32) -> String {
    match OrderStatus::from_code(code) {
        Some(status) => status.name().to_string(),
        None => format!("Unknown ({code})"),
    }
}

/// Accepts `3` as well as `"3"`; anything else is not a code.
pub fn parse_status_code(value: &Value) -> Option<i32> {
    integer_value(value).and_then(|n| i32::try_from(n).ok())
}
