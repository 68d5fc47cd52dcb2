pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod sessions;
pub mod student_profiles;
pub mod teacher_profiles;
pub mod users;

pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use sessions::Entity as Sessions;
pub use student_profiles::Entity as StudentProfiles;
pub use teacher_profiles::Entity as TeacherProfiles;
pub use users::Entity as Users;
