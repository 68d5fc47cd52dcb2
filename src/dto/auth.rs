use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    models::{StudentProfile, TeacherProfile, User},
    validation::{FieldErrors, REQUIRED, optional_bool, optional_text, required_text},
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct SignUpRequest {
    #[schema(value_type = Option<String>)]
    pub username: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub first_name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub last_name: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub is_student: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub is_teacher: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidSignUp {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<ValidSignUp, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required_text(&mut errors, "username", self.username);
        if username.as_ref().is_some_and(|u| u.chars().any(char::is_whitespace)) {
            errors.add("username", "Enter a valid username without spaces.");
        }

        // Passwords are taken verbatim, surrounding spaces included.
        let password = match self.password {
            None | Some(Value::Null) => {
                errors.add("password", REQUIRED);
                None
            }
            value => optional_text(&mut errors, "password", value, true),
        };
        let password = password.filter(|p| {
            let long_enough = p.chars().count() >= MIN_PASSWORD_LEN;
            if !long_enough {
                errors.add(
                    "password",
                    format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
                );
            }
            long_enough
        });

        let email = optional_text(&mut errors, "email", self.email, false).unwrap_or_default();
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        let first_name =
            optional_text(&mut errors, "first_name", self.first_name, false).unwrap_or_default();
        let last_name =
            optional_text(&mut errors, "last_name", self.last_name, false).unwrap_or_default();

        let is_student = optional_bool(&mut errors, "is_student", self.is_student).unwrap_or(false);
        let is_teacher = optional_bool(&mut errors, "is_teacher", self.is_teacher).unwrap_or(false);
        if is_student && is_teacher {
            errors.add(
                "non_field_errors",
                "A user cannot be both a student and a teacher.",
            );
        }

        match (username, password) {
            (Some(username), Some(password)) => errors.into_result(ValidSignUp {
                username,
                password,
                email,
                first_name,
                last_name,
                is_student,
                is_teacher,
            }),
            _ => Err(errors),
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct LoginRequest {
    #[schema(value_type = Option<String>)]
    pub username: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    /// Session id.
    pub sid: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
    pub student_profile: Option<StudentProfile>,
    pub teacher_profile: Option<TeacherProfile>,
}
