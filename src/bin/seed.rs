use canteen_api::{
    db::{create_orm_conn, run_migrations},
    entity::{
        menu_items::{ActiveModel as MenuItemActive, Column as MenuCol, Entity as MenuItems},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let orm = create_orm_conn(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let student_id = ensure_user(&orm, "student", "student123", true, false).await?;
    let teacher_id = ensure_user(&orm, "teacher", "teacher123", false, true).await?;
    seed_menu(&orm).await?;

    println!("Seed completed. Student ID: {student_id}, Teacher ID: {teacher_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    username: &str,
    password: &str,
    is_student: bool,
    is_teacher: bool,
) -> anyhow::Result<Uuid> {
    if let Some(user) = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(orm)
        .await?
    {
        return Ok(user.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@canteen.local")),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set(password_hash),
        is_student: Set(is_student),
        is_teacher: Set(is_teacher),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    Ok(user.id)
}

async fn seed_menu(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let items: [(&str, i64, i32, &[&str]); 5] = [
        ("Masala Dosa", 6000, 10, &["extra chutney", "no onion"]),
        ("Veg Sandwich", 4000, 5, &["grilled", "no cheese"]),
        ("Samosa", 1500, 2, &[]),
        ("Filter Coffee", 2000, 3, &["less sugar", "no sugar"]),
        ("Veg Thali", 9000, 15, &["extra roti"]),
    ];

    for (name, price, preparation_time, options) in items {
        let exists = MenuItems::find()
            .filter(MenuCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        MenuItemActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(price),
            is_available: Set(true),
            preparation_time: Set(preparation_time),
            options: Set(serde_json::json!(options)),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded menu items");
    Ok(())
}
