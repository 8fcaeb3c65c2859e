//! Featured image upload.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

use nexiler_core::authoring::{FeaturedImage, ImageUpload};
use nexiler_shared::dto::ImageUploadResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;

/// POST /api/admin/uploads/image
///
/// The raw request body is the image; `Content-Type` names its format.
pub async fn upload_image(
    identity: Identity,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let size = body.len();
    let image = FeaturedImage::from_upload(&ImageUpload::new(content_type, body.to_vec()))?;
    tracing::info!(user_id = %identity.user.id, size, "Image uploaded");

    Ok(HttpResponse::Ok().json(ImageUploadResponse {
        data_url: image.into_string(),
        size,
    }))
}
