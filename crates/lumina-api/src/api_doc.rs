//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use lumina_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lumina API",
        version = "0.1.0",
        description = "Photo storage API: upload, thumbnail derivation, retrieval and deletion of image artifacts backed by an object store."
    ),
    paths(
        handlers::image_upload::upload_image,
        handlers::image_get::get_image,
        handlers::image_get::list_images,
        handlers::image_download::download_image,
        handlers::image_update::update_image,
        handlers::image_delete::delete_image,
        handlers::signed_url::signed_url,
    ),
    components(schemas(
        models::ImageResponse,
        models::SignedUrlResponse,
        models::UpdateImageRequest,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image upload, retrieval and deletion")
    )
)]
pub struct ApiDoc;

/// The OpenAPI spec served at `/api/v0/openapi.json`.
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
