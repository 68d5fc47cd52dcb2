use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StudentProfile {
    pub id: Uuid,
    pub user: Uuid,
    pub roll_number: String,
    pub department: String,
    pub year_of_study: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TeacherProfile {
    pub id: Uuid,
    pub user: Uuid,
    pub employee_id: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
    pub preparation_time: i32,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Upi];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    /// Menu item name.
    pub menu_item: String,
    pub quantity: i32,
    pub selected_options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user: Uuid,
    pub total_price: i64,
    pub is_fulfilled: bool,
    pub payment_method: PaymentMethod,
    /// Display name of the status code.
    pub status: String,
    pub status_code: i32,
    pub transaction_id: Option<String>,
    pub time_issued: DateTime<Utc>,
    pub time_scheduled: Option<DateTime<Utc>>,
    pub time_prepared: Option<DateTime<Utc>>,
    pub time_delivered: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}
