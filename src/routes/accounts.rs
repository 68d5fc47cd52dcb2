use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite, time::Duration},
};

use crate::{
    dto::{
        auth::{LoginRequest, MeResponse, SignUpRequest},
        profiles::{StudentProfileRequest, TeacherProfileRequest},
    },
    error::AppResult,
    middleware::{
        auth::{AuthUser, SESSION_COOKIE},
        json::JsonBody,
    },
    models::{StudentProfile, TeacherProfile, User},
    response::{ApiResponse, Meta},
    services::{
        auth_service::{self, LOGIN_REDIRECT, LOGOUT_REDIRECT},
        profile_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", post(signup))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/student-registration/", post(student_registration))
        .route("/teacher-registration/", post(teacher_registration))
        .route("/me/", get(me))
}

#[utoipa::path(
    post,
    path = "/signup/",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created without a role", body = ApiResponse<User>),
        (status = 303, description = "User created; continue at the profile registration form"),
        (status = 400, description = "Field errors keyed by field name"),
    ),
    tag = "Accounts"
)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> AppResult<Response> {
    let result = auth_service::sign_up(&state, payload).await?;
    let resp = match result.redirect_to {
        Some(target) => Redirect::to(target).into_response(),
        None => (
            StatusCode::CREATED,
            Json(ApiResponse::success("User created", result.user, Some(Meta::empty()))),
        )
            .into_response(),
    };
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Session established; token set in the session cookie"),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Redirect> {
    let resp = auth_service::login_user(&state, payload).await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, resp.token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::hours(state.config.session_ttl_hours));
    cookies.add(cookie);

    Ok(Redirect::to(LOGIN_REDIRECT))
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 303, description = "Session removed; redirect to the login page"),
    ),
    tag = "Accounts"
)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    user: Option<AuthUser>,
) -> AppResult<Redirect> {
    auth_service::logout_user(&state, user.as_ref()).await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookies.add(cookie);

    Ok(Redirect::to(LOGOUT_REDIRECT))
}

#[utoipa::path(
    post,
    path = "/student-registration/",
    request_body = StudentProfileRequest,
    responses(
        (status = 201, description = "Student profile created", body = ApiResponse<StudentProfile>),
        (status = 400, description = "Field errors keyed by field name"),
    ),
    tag = "Accounts"
)]
pub async fn student_registration(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<StudentProfileRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StudentProfile>>)> {
    let resp = profile_service::register_student(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/teacher-registration/",
    request_body = TeacherProfileRequest,
    responses(
        (status = 201, description = "Teacher profile created", body = ApiResponse<TeacherProfile>),
        (status = 400, description = "Field errors keyed by field name"),
    ),
    tag = "Accounts"
)]
pub async fn teacher_registration(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TeacherProfileRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TeacherProfile>>)> {
    let resp = profile_service::register_teacher(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/me/",
    responses(
        (status = 200, description = "Current user and profile", body = ApiResponse<MeResponse>),
        (status = 401, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let resp = auth_service::me(&state, &user).await?;
    Ok(Json(resp))
}
