//! Multipart image upload extraction.
//!
//! [`ProfileImageUpload`] reads a `multipart/form-data` body into
//! [`UploadedFile`]s, enforcing the size and MIME limits from
//! [`UploadConfig`](userhub_config::UploadConfig). Decoding the image is left
//! to the service.

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::StatusCode,
};
use userhub_config::UploadConfig;
use userhub_core::AppError;

use crate::state::AppState;

/// Form field name clients are expected to use for the image.
pub const IMAGE_FIELD: &str = "image";

/// One file part of a multipart request, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Extractor for `POST /users/upload_profile_image`.
///
/// Parts that carry a filename or are named `image` are treated as files;
/// other form fields are skipped. At least one file is required.
#[derive(Debug, Clone)]
pub struct ProfileImageUpload {
    pub files: Vec<UploadedFile>,
}

impl ProfileImageUpload {
    /// The image to store: the first file part.
    pub fn into_image(self) -> Result<UploadedFile, AppError> {
        self.files
            .into_iter()
            .next()
            .ok_or_else(|| AppError::bad_request(anyhow!("No image sent")))
    }
}

impl FromRequest<AppState> for ProfileImageUpload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|e| {
            AppError::bad_request(anyhow!("Invalid multipart request: {}", e.body_text()))
        })?;

        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&state.upload_config, e))?
        {
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            if file_name.is_none() && field_name != IMAGE_FIELD {
                continue;
            }

            let declared_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(&state.upload_config, e))?;

            let file = check_file(
                &state.upload_config,
                UploadedFile {
                    content_type: content_type_of(declared_type.as_deref(), &bytes),
                    field_name,
                    file_name,
                    bytes,
                },
            )?;

            tracing::debug!(
                file.field = %file.field_name,
                file.size = file.size(),
                file.content_type = %file.content_type,
                "Received upload part"
            );
            files.push(file);
        }

        if files.is_empty() {
            return Err(AppError::bad_request(anyhow!("No image sent")));
        }

        Ok(ProfileImageUpload { files })
    }
}

/// A body cut off by the route's length limit is reported like any other
/// oversized image.
fn multipart_error(config: &UploadConfig, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::bad_request(anyhow!(
            "Image too large (max {} bytes)",
            config.max_bytes
        ));
    }
    AppError::new(e.status(), anyhow!(e.body_text()))
}

/// Declared content type, or one sniffed from the bytes when the client sent
/// none or a generic one.
fn content_type_of(declared: Option<&str>, bytes: &[u8]) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_ascii_lowercase(),
        _ => image::guess_format(bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
    }
}

fn check_file(config: &UploadConfig, file: UploadedFile) -> Result<UploadedFile, AppError> {
    if file.bytes.is_empty() {
        return Err(AppError::bad_request(anyhow!("No image sent")));
    }

    if file.size() > config.max_bytes {
        return Err(AppError::bad_request(anyhow!(
            "Image too large: {} bytes (max {} bytes)",
            file.size(),
            config.max_bytes
        )));
    }

    if !config.is_allowed(&file.content_type) {
        return Err(AppError::bad_request(anyhow!(
            "Unsupported image type '{}'. Allowed: {}",
            file.content_type,
            config.allowed_mime_types.join(", ")
        )));
    }

    Ok(file)
}
