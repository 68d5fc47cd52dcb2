use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, MeResponse, SignUpRequest},
        menu_items::{MenuItemList, MenuItemRequest},
        orders::{
            ChangeStatusRequest, OrderItemRequest, OrderList, OrderRequest, StatusChanged,
            StatusOptions,
        },
        profiles::{StudentProfileRequest, TeacherProfileRequest},
    },
    models::{MenuItem, Order, OrderItem, PaymentMethod, StudentProfile, TeacherProfile, User},
    response::{ApiResponse, Meta},
    routes::{accounts, health, menu_items, orders},
    validation::FieldErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        menu_items::list_menu_items,
        menu_items::create_menu_item,
        menu_items::get_menu_item,
        menu_items::update_menu_item,
        orders::list_orders,
        orders::create_order,
        orders::completed_orders,
        orders::pending_orders,
        orders::status_options,
        orders::get_order,
        orders::update_order,
        orders::accept_order,
        orders::reject_order,
        orders::change_status,
        accounts::signup,
        accounts::login,
        accounts::logout,
        accounts::student_registration,
        accounts::teacher_registration,
        accounts::me
    ),
    components(
        schemas(
            User,
            StudentProfile,
            TeacherProfile,
            MenuItem,
            Order,
            OrderItem,
            PaymentMethod,
            MenuItemRequest,
            MenuItemList,
            OrderRequest,
            OrderItemRequest,
            OrderList,
            ChangeStatusRequest,
            StatusChanged,
            StatusOptions,
            SignUpRequest,
            LoginRequest,
            MeResponse,
            StudentProfileRequest,
            TeacherProfileRequest,
            FieldErrors,
            Meta,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<StatusChanged>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Menu", description = "Menu catalog endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Accounts", description = "Sign-up, login and profile endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
