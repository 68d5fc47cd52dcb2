use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, MeResponse, SignUpRequest},
    entity::{
        sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
        student_profiles::Entity as StudentProfiles,
        teacher_profiles::Entity as TeacherProfiles,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::profile_service::{student_from_entity, teacher_from_entity},
    state::AppState,
    validation::{FieldErrors, REQUIRED, optional_text},
};

pub const STUDENT_REGISTRATION_PATH: &str = "/student-registration/";
// Teachers are sent to the student form too; the target has never been
// split and there is no product decision on where it should go.
pub const TEACHER_REGISTRATION_REDIRECT: &str = "/student-registration/";
pub const LOGIN_REDIRECT: &str = "/menu_item/";
pub const LOGOUT_REDIRECT: &str = "/login/";

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug)]
pub struct SignUpResult {
    pub user: User,
    /// Where to send the client next, when the user picked a role.
    pub redirect_to: Option<&'static str>,
}

pub async fn sign_up(state: &AppState, payload: SignUpRequest) -> AppResult<SignUpResult> {
    let payload = payload.validate()?;

    let password_hash = hash_password(&payload.password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        password_hash: Set(password_hash),
        is_student: Set(payload.is_student),
        is_teacher: Set(payload.is_teacher),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique(e, "username", USERNAME_TAKEN))?;

    tracing::info!(user_id = %user.id, username = %user.username, "user signed up");

    let redirect_to = if user.is_student {
        Some(STUDENT_REGISTRATION_PATH)
    } else if user.is_teacher {
        Some(TEACHER_REGISTRATION_REDIRECT)
    } else {
        None
    };

    Ok(SignUpResult {
        user: user_from_entity(user),
        redirect_to,
    })
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let mut errors = FieldErrors::new();
    let username = optional_text(&mut errors, "username", payload.username, false)
        .filter(|u| !u.is_empty());
    let password =
        optional_text(&mut errors, "password", payload.password, true).filter(|p| !p.is_empty());
    if username.is_none() && errors.get("username").is_none() {
        errors.add("username", REQUIRED);
    }
    if password.is_none() && errors.get("password").is_none() {
        errors.add("password", REQUIRED);
    }

    let (Some(username), Some(password)) = (username, password) else {
        return Err(errors.into());
    };

    let user = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash)? => u,
        _ => {
            tracing::info!(username = %username, "login rejected");
            return Err(FieldErrors::single("non_field_errors", INVALID_CREDENTIALS).into());
        }
    };

    let now = Utc::now();
    let purged = Sessions::delete_many()
        .filter(SessionCol::UserId.eq(user.id))
        .filter(SessionCol::ExpiresAt.lte(now.fixed_offset()))
        .exec(&state.orm)
        .await?;
    if purged.rows_affected > 0 {
        tracing::debug!(user_id = %user.id, purged = purged.rows_affected, "expired sessions removed");
    }

    let expires_at = now
        .checked_add_signed(Duration::hours(state.config.session_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        created_at: Set(now.into()),
        expires_at: Set(expires_at.into()),
    }
    .insert(&state.orm)
    .await?;

    let claims = Claims {
        sub: user.id.to_string(),
        sid: session.id.to_string(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "user logged in");

    Ok(LoginResponse {
        token,
        user: user_from_entity(user),
    })
}

/// Drops the caller's session if there is one. Logging out twice is fine.
pub async fn logout_user(state: &AppState, user: Option<&AuthUser>) -> AppResult<()> {
    if let Some(user) = user {
        Sessions::delete_by_id(user.session_id)
            .exec(&state.orm)
            .await?;
        tracing::info!(user_id = %user.user_id, session_id = %user.session_id, "user logged out");
    }
    Ok(())
}

/// Turn a token into the caller's identity. Every failure is `Unauthorized`
/// except database errors.
pub async fn resolve_session(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;
    let session_id = Uuid::parse_str(&decoded.claims.sid).map_err(|_| AppError::Unauthorized)?;

    let session = Sessions::find_by_id(session_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if session.user_id != user_id {
        return Err(AppError::Unauthorized);
    }
    if session.expires_at <= Utc::now() {
        Sessions::delete_by_id(session.id).exec(&state.orm).await?;
        return Err(AppError::Unauthorized);
    }

    let user = session
        .find_related(Users)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        session_id,
    })
}

pub async fn me(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let user = Users::find_by_id(auth.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let student_profile = user
        .find_related(StudentProfiles)
        .one(&state.orm)
        .await?
        .map(student_from_entity);
    let teacher_profile = user
        .find_related(TeacherProfiles)
        .one(&state.orm)
        .await?
        .map(teacher_from_entity);

    Ok(ApiResponse::success(
        "OK",
        MeResponse {
            user: user_from_entity(user),
            student_profile,
            teacher_profile,
        },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        is_student: model.is_student,
        is_teacher: model.is_teacher,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
