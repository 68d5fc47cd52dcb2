use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::profiles::{StudentProfileRequest, TeacherProfileRequest},
    entity::{
        student_profiles::{
            ActiveModel as StudentActive, Column as StudentCol, Entity as StudentProfiles,
            Model as StudentModel,
        },
        teacher_profiles::{
            ActiveModel as TeacherActive, Column as TeacherCol, Entity as TeacherProfiles,
            Model as TeacherModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    models::{StudentProfile, TeacherProfile},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::FieldErrors,
};

const PROFILE_TAKEN: &str = "This user already has a profile.";

pub async fn register_student(
    state: &AppState,
    payload: StudentProfileRequest,
) -> AppResult<ApiResponse<StudentProfile>> {
    let payload = payload.validate()?;

    let txn = state.orm.begin().await?;
    ensure_profile_free(&txn, payload.user).await?;
    let profile = StudentActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user),
        roll_number: Set(payload.roll_number),
        department: Set(payload.department),
        year_of_study: Set(payload.year_of_study),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_unique(e, "user", PROFILE_TAKEN))?;
    txn.commit().await?;

    tracing::info!(user_id = %profile.user_id, "student profile registered");

    Ok(ApiResponse::success(
        "Student profile created",
        student_from_entity(profile),
        Some(Meta::empty()),
    ))
}

pub async fn register_teacher(
    state: &AppState,
    payload: TeacherProfileRequest,
) -> AppResult<ApiResponse<TeacherProfile>> {
    let payload = payload.validate()?;

    let txn = state.orm.begin().await?;
    ensure_profile_free(&txn, payload.user).await?;
    let profile = TeacherActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user),
        employee_id: Set(payload.employee_id),
        department: Set(payload.department),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_unique(e, "user", PROFILE_TAKEN))?;
    txn.commit().await?;

    tracing::info!(user_id = %profile.user_id, "teacher profile registered");

    Ok(ApiResponse::success(
        "Teacher profile created",
        teacher_from_entity(profile),
        Some(Meta::empty()),
    ))
}

/// The user must exist and hold neither kind of profile yet. The user row
/// stays locked until the caller's transaction ends, so a student and a
/// teacher registration for the same user cannot both pass.
async fn ensure_profile_free<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    let user = Users::find_by_id(user_id).lock_exclusive().one(conn).await?;
    if user.is_none() {
        return Err(FieldErrors::single(
            "user",
            format!("Invalid pk \"{user_id}\" - object does not exist."),
        )
        .into());
    }

    let students = StudentProfiles::find()
        .filter(StudentCol::UserId.eq(user_id))
        .count(conn)
        .await?;
    let teachers = TeacherProfiles::find()
        .filter(TeacherCol::UserId.eq(user_id))
        .count(conn)
        .await?;
    if students + teachers > 0 {
        return Err(FieldErrors::single("user", PROFILE_TAKEN).into());
    }
    Ok(())
}

pub(crate) fn student_from_entity(model: StudentModel) -> StudentProfile {
    StudentProfile {
        id: model.id,
        user: model.user_id,
        roll_number: model.roll_number,
        department: model.department,
        year_of_study: model.year_of_study,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn teacher_from_entity(model: TeacherModel) -> TeacherProfile {
    TeacherProfile {
        id: model.id,
        user: model.user_id,
        employee_id: model.employee_id,
        department: model.department,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
