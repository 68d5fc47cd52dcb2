use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{FieldErrors, required_integer, required_text, required_uuid};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StudentProfileRequest {
    #[schema(value_type = Option<Uuid>)]
    pub user: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub roll_number: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub department: Option<Value>,
    #[schema(value_type = Option<i32>)]
    pub year_of_study: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidStudentProfile {
    pub user: Uuid,
    pub roll_number: String,
    pub department: String,
    pub year_of_study: i32,
}

impl StudentProfileRequest {
    pub fn validate(self) -> Result<ValidStudentProfile, FieldErrors> {
        let mut errors = FieldErrors::new();
        let user = required_uuid(&mut errors, "user", self.user);
        let roll_number = required_text(&mut errors, "roll_number", self.roll_number);
        let department = required_text(&mut errors, "department", self.department);
        let year_of_study = required_integer::<i32>(&mut errors, "year_of_study", self.year_of_study);
        if year_of_study.is_some_and(|y| !(1..=10).contains(&y)) {
            errors.add("year_of_study", "Ensure this value is between 1 and 10.");
        }

        match (user, roll_number, department, year_of_study) {
            (Some(user), Some(roll_number), Some(department), Some(year_of_study)) => {
                errors.into_result(ValidStudentProfile {
                    user,
                    roll_number,
                    department,
                    year_of_study,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TeacherProfileRequest {
    #[schema(value_type = Option<Uuid>)]
    pub user: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub employee_id: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub department: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidTeacherProfile {
    pub user: Uuid,
    pub employee_id: String,
    pub department: String,
}

impl TeacherProfileRequest {
    pub fn validate(self) -> Result<ValidTeacherProfile, FieldErrors> {
        let mut errors = FieldErrors::new();
        let user = required_uuid(&mut errors, "user", self.user);
        let employee_id = required_text(&mut errors, "employee_id", self.employee_id);
        let department = required_text(&mut errors, "department", self.department);

        match (user, employee_id, department) {
            (Some(user), Some(employee_id), Some(department)) => {
                errors.into_result(ValidTeacherProfile {
                    user,
                    employee_id,
                    department,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_year_is_bounded() {
        let errors = StudentProfileRequest {
            user: Some(Uuid::new_v4().to_string().into()),
            roll_number: Some("CS-21-042".into()),
            department: Some("CSE".into()),
            year_of_study: Some(0.into()),
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("year_of_study").is_some());
    }

    #[test]
    fn teacher_requires_all_fields() {
        let errors = TeacherProfileRequest::default().validate().unwrap_err();
        for field in ["user", "employee_id", "department"] {
            assert!(errors.get(field).is_some(), "{field} should be required");
        }
    }

    #[test]
    fn student_fields_accept_strings() {
        let user = Uuid::new_v4();
        let valid = StudentProfileRequest {
            user: Some(user.to_string().into()),
            roll_number: Some(42.into()),
            department: Some("CSE".into()),
            year_of_study: Some("2".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.user, user);
        assert_eq!(valid.roll_number, "42");
        assert_eq!(valid.year_of_study, 2);

        let errors = StudentProfileRequest {
            user: Some("someone".into()),
            year_of_study: Some("second".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("user").is_some());
        assert!(errors.get("year_of_study").is_some());
    }
}
