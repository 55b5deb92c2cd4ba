use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::users::repo_types::User;
use crate::users::services::is_valid_email;

/// Request body for user creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated creation input. Email is trimmed and lowercased.
#[derive(Debug)]
pub struct CreateUserInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<CreateUserInput, ApiError> {
        let full_name = self.full_name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        if full_name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation("All fields are required".into()));
        }
        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
        Ok(CreateUserInput {
            full_name,
            email,
            password: self.password,
        })
    }
}

/// Request body for user update. The email names the target record and is
/// never changed by this operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct UpdateUserInput {
    pub email: String,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UpdateUserInput, ApiError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ApiError::Validation("Email is required".into()));
        }
        // An empty string means "leave unchanged", same as an absent field.
        let full_name = self
            .full_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let password = self.password.filter(|v| !v.is_empty());
        Ok(UpdateUserInput {
            email,
            full_name,
            password,
        })
    }
}

/// Request body for user deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub email: String,
}

impl DeleteUserRequest {
    pub fn validate(self) -> Result<String, ApiError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ApiError::Validation("Email is required".into()));
        }
        Ok(email)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn create_requires_all_fields() {
        let request: CreateUserRequest = serde_json::from_str("{}").unwrap();
        let err = request.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "All fields are required"));

        let request: CreateUserRequest =
            serde_json::from_value(serde_json::json!({"fullName": "Ann", "email": "a@x.com"}))
                .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_normalizes_email() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Ann",
            "email": "  A@X.Com ",
            "password": "pw1"
        }))
        .unwrap();
        let input = request.validate().expect("valid input");
        assert_eq!(input.email, "a@x.com");
        assert_eq!(input.full_name, "Ann");
    }

    #[test]
    fn create_rejects_malformed_email() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Ann",
            "email": "not-an-email",
            "password": "pw1"
        }))
        .unwrap();
        let err = request.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Invalid email"));
    }

    #[test]
    fn update_treats_empty_password_as_absent() {
        let request: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "fullName": "Ann2",
            "password": ""
        }))
        .unwrap();
        let input = request.validate().expect("valid input");
        assert_eq!(input.full_name.as_deref(), Some("Ann2"));
        assert!(input.password.is_none());
    }

    #[test]
    fn update_requires_email() {
        let request: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({"fullName": "Ann2"})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn user_json_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Ann".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            image_path: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "Ann");
        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["imagePath"], serde_json::Value::Null);
    }
}
