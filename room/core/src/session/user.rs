//! Current user types
//!
//! Shapes returned by `/doctor/me` and `/student/me`. Field names follow the
//! API's camelCase JSON; anything the API omits falls back to a default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the consultation the signed-in user is on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Clinician; can record treatments
    Doctor,
    /// Patient
    Student,
}

impl UserType {
    /// API path that returns the signed-in user of this type
    #[must_use]
    pub fn me_path(self) -> &'static str {
        match self {
            Self::Doctor => "/doctor/me",
            Self::Student => "/student/me",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctor => write!(f, "doctor"),
            Self::Student => write!(f, "student"),
        }
    }
}

/// Gender as reported by the API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other / unspecified
    Others,
}

/// Fields shared by every user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: String,
    /// Birthday (ISO date string as sent by the API)
    pub birthday: String,
    /// Phone number
    pub phone: String,
    /// Gender, if set
    pub gender: Option<Gender>,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub avatar: String,
    /// Account balance
    pub balance: f64,
}

/// A clinician
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Doctor {
    /// Common user fields
    #[serde(flatten)]
    pub user: User,
    /// Short biography
    pub brief_info: String,
    /// Whether the doctor is currently accepting bookings
    pub is_active: bool,
    /// Creation timestamp
    pub create_at: String,
    /// Last update timestamp
    pub update_at: String,
}

/// A patient
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Student {
    /// Common user fields
    #[serde(flatten)]
    pub user: User,
    /// Student code
    pub student_code: String,
    /// Contact email
    pub email: String,
}

/// The resolved signed-in user
#[derive(Clone, Debug, PartialEq)]
pub enum CurrentUser {
    /// Signed in through the doctor route
    Doctor(Doctor),
    /// Signed in through the student route
    Student(Student),
}

impl CurrentUser {
    /// Decode a `/…/me` response body for the given user type
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body does not match the user shape.
    pub fn from_json(user_type: UserType, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match user_type {
            UserType::Doctor => Self::Doctor(serde_json::from_value(value)?),
            UserType::Student => Self::Student(serde_json::from_value(value)?),
        })
    }

    /// Common user fields
    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Self::Doctor(d) => &d.user,
            Self::Student(s) => &s.user,
        }
    }

    /// The user's type
    #[must_use]
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Doctor(_) => UserType::Doctor,
            Self::Student(_) => UserType::Student,
        }
    }

    /// Name to show in the room header
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.user().name.as_str();
        if name.is_empty() {
            self.user().id.as_str()
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_doctor_from_json() {
        let body = json!({
            "id": "d-1",
            "name": "Dr. Tran",
            "gender": "FEMALE",
            "balance": 12.5,
            "briefInfo": "General practice",
            "isActive": true
        });

        let user = CurrentUser::from_json(UserType::Doctor, body).unwrap();
        assert_eq!(user.user_type(), UserType::Doctor);
        assert_eq!(user.display_name(), "Dr. Tran");
        assert_eq!(user.user().gender, Some(Gender::Female));

        let CurrentUser::Doctor(doctor) = user else {
            panic!("expected doctor");
        };
        assert_eq!(doctor.brief_info, "General practice");
        assert!(doctor.is_active);
    }

    #[test]
    fn test_student_missing_fields_default() {
        let body = json!({ "id": "s-9", "studentCode": "SE1234" });

        let user = CurrentUser::from_json(UserType::Student, body).unwrap();
        assert_eq!(user.display_name(), "s-9");

        let CurrentUser::Student(student) = user else {
            panic!("expected student");
        };
        assert_eq!(student.student_code, "SE1234");
        assert_eq!(student.email, "");
    }

    #[test]
    fn test_me_paths() {
        assert_eq!(UserType::Doctor.me_path(), "/doctor/me");
        assert_eq!(UserType::Student.me_path(), "/student/me");
    }

    #[test]
    fn test_bad_body_is_error() {
        let body = json!({ "id": 42 });
        assert!(CurrentUser::from_json(UserType::Student, body).is_err());
    }
}
