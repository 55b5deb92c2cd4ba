use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bytes::Bytes;
use tracing::{info, instrument};

use crate::error::{ApiError, AppJson};
use crate::state::AppState;
use crate::users::dto::{
    CreateUserRequest, DeleteUserRequest, MessageResponse, UpdateUserRequest,
    UpdatedUserResponse, UploadResponse,
};
use crate::users::repo_types::{NewUser, User, UserChanges};
use crate::users::services::hash_password;

/// Body cap for the upload route; leaves headroom over the per-file limit
/// enforced by the image store.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_user))
        .route("/edit", put(update_user))
        .route("/delete", delete(delete_user))
        .route("/getAll", get(get_all_users))
        .route(
            "/uploadImage",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let input = payload.validate()?;

    // Pre-check for a clean message; the unique index still backstops a
    // racing create for the same email.
    if User::find_by_email(&state.db, &input.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&input.password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            full_name: input.full_name,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UpdatedUserResponse>, ApiError> {
    let input = payload.validate()?;

    let password_hash = match input.password.as_deref() {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let changes = UserChanges {
        full_name: input.full_name,
        password_hash,
        image_path: None,
    };

    let user = User::update_by_email(&state.db, &input.email, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, email = %user.email, "user updated");
    Ok(Json(UpdatedUserResponse {
        message: "User updated successfully".into(),
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DeleteUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.validate()?;

    let user = User::delete_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, email = %user.email, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

/// POST /user/uploadImage (multipart)
/// Exactly one file under the `image` field, plus an `email` text field
/// naming the target user.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut email: Option<String> = None;
    let mut image: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name() {
            if name != "image" {
                return Err(ApiError::Validation(format!(
                    "Unexpected file field '{name}'"
                )));
            }
            if image.is_some() {
                return Err(ApiError::Validation(
                    "Only one image may be uploaded".into(),
                ));
            }
            let file_name = file_name.to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            image = Some((file_name, content_type, data));
        } else if name == "email" {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            email = Some(value.trim().to_lowercase());
        }
    }

    let Some((file_name, content_type, data)) = image else {
        return Err(ApiError::Validation("No file uploaded".into()));
    };
    let email = email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation("Email is required".into()))?;

    // File is written before the user lookup; a 404 below leaves the file
    // behind, and stored files are never cleaned up.
    let stored = state.images.store(&file_name, &content_type, data).await?;

    let changes = UserChanges {
        image_path: Some(stored.path.clone()),
        ..Default::default()
    };
    let user = User::update_by_email(&state.db, &email, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, email = %user.email, path = %stored.path, "image uploaded");
    Ok(Json(UploadResponse {
        message: "Image uploaded and user updated successfully".into(),
        file_path: stored.path,
    }))
}
