mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use canteen_api::{
    dto::{
        auth::{LoginRequest, SignUpRequest},
        profiles::{StudentProfileRequest, TeacherProfileRequest},
    },
    entity::{Sessions, Users, sessions},
    error::AppError,
    services::{auth_service, profile_service},
    state::AppState,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use uuid::Uuid;

const PASSWORD: &str = "masala-dosa-42";

async fn sign_up(state: &AppState, username: &str) -> anyhow::Result<Uuid> {
    let result = auth_service::sign_up(
        state,
        SignUpRequest {
            username: Some(username.into()),
            password: Some(PASSWORD.into()),
            ..Default::default()
        },
    )
    .await?;
    Ok(result.user.id)
}

fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("session={token}"))
        .body(Body::empty())
        .unwrap()
}

fn session_cookie(response: &axum::http::Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let (pair, _) = set_cookie.split_once(';').unwrap();
    let (name, value) = pair.split_once('=').unwrap();
    assert_eq!(name, "session");
    value.to_string()
}

#[tokio::test]
async fn signup_responds_by_role() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/signup/", &json!({ "username": "plain", "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["username"], "plain");
    assert!(body["data"].get("password_hash").is_none());

    for (username, role) in [("stu", "is_student"), ("tea", "is_teacher")] {
        let response = common::send(
            common::app(&state),
            common::json_request(
                "POST",
                "/signup/",
                &json!({ "username": username, "password": PASSWORD, role: true }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/student-registration/"
        );
    }

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/signup/", &json!({ "username": "plain", "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["data"]["username"].is_array());

    assert_eq!(Users::find().count(&state.orm).await?, 3);
    Ok(())
}

#[tokio::test]
async fn login_creates_a_session_and_wrong_password_does_not() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user_id = sign_up(&state, "asha").await?;

    let result = auth_service::login_user(
        &state,
        LoginRequest {
            username: Some("asha".into()),
            password: Some("not-the-password".into()),
        },
    )
    .await;
    match result {
        Err(AppError::Validation(errors)) => assert!(errors.get("non_field_errors").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    let result = auth_service::login_user(
        &state,
        LoginRequest {
            username: Some("nobody".into()),
            password: Some(PASSWORD.into()),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(Sessions::find().count(&state.orm).await?, 0);

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            username: Some("asha".into()),
            password: Some(PASSWORD.into()),
        },
    )
    .await?;
    assert_eq!(login.user.id, user_id);
    assert_eq!(Sessions::find().count(&state.orm).await?, 1);

    let auth = auth_service::resolve_session(&state, &login.token).await?;
    assert_eq!(auth.user_id, user_id);
    assert_eq!(auth.username, "asha");
    Ok(())
}

#[tokio::test]
async fn cookie_session_lifecycle_over_http() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    sign_up(&state, "ravi").await?;

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/login/", &json!({ "username": "ravi", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(
        body["data"]["non_field_errors"],
        json!(["Unable to log in with provided credentials."])
    );

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/login/", &json!({ "username": "ravi", "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/menu_item/");
    let token = session_cookie(&response);

    let response = common::send(common::app(&state), get_with_cookie("/me/", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["user"]["username"], "ravi");
    assert!(body["data"]["student_profile"].is_null());

    let response = common::send(
        common::app(&state),
        Request::builder()
            .method("POST")
            .uri("/logout/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login/");
    assert_eq!(Sessions::find().count(&state.orm).await?, 0);

    let response = common::send(common::app(&state), get_with_cookie("/me/", &token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::send(common::app(&state), common::empty_request("GET", "/me/")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out without a session still redirects.
    let response = common::send(common::app(&state), common::empty_request("POST", "/logout/")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn a_user_holds_at_most_one_profile() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = sign_up(&state, "meena").await?;

    let student = StudentProfileRequest {
        user: Some(json!(user)),
        roll_number: Some("CS-21-042".into()),
        department: Some("CSE".into()),
        year_of_study: Some(3.into()),
    };
    let profile = profile_service::register_student(&state, student).await?.data.unwrap();
    assert_eq!(profile.user, user);
    assert_eq!(profile.year_of_study, 3);

    let again = profile_service::register_student(
        &state,
        StudentProfileRequest {
            user: Some(json!(user)),
            roll_number: Some("CS-21-043".into()),
            department: Some("CSE".into()),
            year_of_study: Some(3.into()),
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::Validation(_))));

    let teacher = profile_service::register_teacher(
        &state,
        TeacherProfileRequest {
            user: Some(json!(user)),
            employee_id: Some("EMP-7".into()),
            department: Some("CSE".into()),
        },
    )
    .await;
    match teacher {
        Err(AppError::Validation(errors)) => assert!(errors.get("user").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    let orphan = profile_service::register_teacher(
        &state,
        TeacherProfileRequest {
            user: Some(json!(Uuid::new_v4())),
            employee_id: Some("EMP-8".into()),
            department: Some("ECE".into()),
        },
    )
    .await;
    assert!(matches!(orphan, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn teacher_registration_over_http() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = sign_up(&state, "kiran").await?;

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/teacher-registration/",
            &json!({ "user": user, "employee_id": "EMP-1", "department": "Physics" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["employee_id"], "EMP-1");

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/student-registration/",
            &json!({ "user": user, "roll_number": "R-1", "department": "Physics", "year_of_study": 2 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn quoted_cookie_values_are_accepted_and_logout_clears_the_cookie() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    sign_up(&state, "farah").await?;

    let response = common::send(
        common::app(&state),
        common::json_request("POST", "/login/", &json!({ "username": "farah", "password": PASSWORD })),
    )
    .await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    let token = session_cookie(&response);

    let response = common::send(
        common::app(&state),
        get_with_cookie("/me/", &format!("\"{token}\"")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::send(
        common::app(&state),
        Request::builder()
            .method("POST")
            .uri("/logout/")
            .header(header::COOKIE, format!("theme=dark; session={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("session=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(Sessions::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn signup_coerces_form_style_flags() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/signup/",
            &json!({ "username": "gita", "password": PASSWORD, "is_student": "true" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = common::send(
        common::app(&state),
        common::json_request(
            "POST",
            "/signup/",
            &json!({ "username": "hema", "password": PASSWORD, "is_teacher": "perhaps" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["is_teacher"], json!(["Must be a valid boolean."]));
    Ok(())
}

#[tokio::test]
async fn racing_registrations_leave_one_profile() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = sign_up(&state, "ishaan").await?;

    let student = StudentProfileRequest {
        user: Some(json!(user)),
        roll_number: Some("ME-22-007".into()),
        department: Some("Mech".into()),
        year_of_study: Some(1.into()),
    };
    let teacher = TeacherProfileRequest {
        user: Some(json!(user)),
        employee_id: Some("EMP-9".into()),
        department: Some("Mech".into()),
    };
    let (student, teacher) = tokio::join!(
        profile_service::register_student(&state, student),
        profile_service::register_teacher(&state, teacher),
    );

    assert_eq!(usize::from(student.is_ok()) + usize::from(teacher.is_ok()), 1);
    let failed = match (student, teacher) {
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => err,
        _ => unreachable!(),
    };
    assert!(matches!(failed, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn racing_signups_with_one_username_are_field_errors() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let request = || SignUpRequest {
        username: Some("jaya".into()),
        password: Some(PASSWORD.into()),
        ..Default::default()
    };

    let (first, second) = tokio::join!(
        auth_service::sign_up(&state, request()),
        auth_service::sign_up(&state, request()),
    );
    let failed = match (first, second) {
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => err,
        other => panic!("expected exactly one signup to fail, got {other:?}"),
    };
    match failed {
        AppError::Validation(errors) => assert!(errors.get("username").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(Users::find().count(&state.orm).await?, 1);
    Ok(())
}

async fn expire_session(state: &AppState, id: Uuid) -> anyhow::Result<()> {
    let session = Sessions::find_by_id(id).one(&state.orm).await?.unwrap();
    let mut active: sessions::ActiveModel = session.into();
    active.expires_at = Set((Utc::now() - Duration::hours(1)).into());
    active.update(&state.orm).await?;
    Ok(())
}

fn login_request() -> LoginRequest {
    LoginRequest {
        username: Some("kavya".into()),
        password: Some(PASSWORD.into()),
    }
}

#[tokio::test]
async fn expired_sessions_are_deleted() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    sign_up(&state, "kavya").await?;

    // Seen expired on use.
    let first = auth_service::login_user(&state, login_request()).await?;
    let first_id = auth_service::resolve_session(&state, &first.token).await?.session_id;
    expire_session(&state, first_id).await?;
    let result = auth_service::resolve_session(&state, &first.token).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
    assert!(Sessions::find_by_id(first_id).one(&state.orm).await?.is_none());

    // Swept at the next login.
    let second = auth_service::login_user(&state, login_request()).await?;
    let second_id = auth_service::resolve_session(&state, &second.token).await?.session_id;
    expire_session(&state, second_id).await?;
    let third = auth_service::login_user(&state, login_request()).await?;
    assert!(Sessions::find_by_id(second_id).one(&state.orm).await?.is_none());
    assert_eq!(Sessions::find().count(&state.orm).await?, 1);
    auth_service::resolve_session(&state, &third.token).await?;
    Ok(())
}
