//! Photo uploads for child and volunteer profiles.

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::api::views::{NoticeBody, ViewError, ViewScope};
use crate::api::SharedState;
use crate::appwrite::unique_id;

const FILE_FIELD: &str = "file";

#[derive(ToSchema, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    pub file_id: String,
    pub url: String,
}

/// Multipart body of a photo upload.
#[derive(ToSchema)]
pub struct PhotoUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ViewError> {
    let invalid = |err: axum::extract::multipart::MultipartError| {
        debug!("Invalid upload: {err}");
        ViewError::Validation("Invalid upload.".to_string())
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ViewError::Validation(
                "Only image files can be uploaded.".to_string(),
            ));
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("photo")
            .to_string();
        let bytes = field.bytes().await.map_err(invalid)?;
        if bytes.is_empty() {
            return Err(ViewError::Validation(
                "The uploaded file is empty.".to_string(),
            ));
        }

        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ViewError::Validation("File is required.".to_string()))
}

#[utoipa::path(
    post,
    path = "/photos",
    request_body(content = PhotoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = UploadedPhoto),
        (status = 422, description = "Missing or non-image file", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "photos"
)]
pub async fn upload_photo(
    state: Extension<SharedState>,
    scope: ViewScope,
    multipart: Multipart,
) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => return err.into_response(),
    };

    let file_id = unique_id();
    let storage = state.appwrite().storage();
    let stored = scope
        .run(storage.create_file(
            state.bucket_id(),
            &file_id,
            &upload.file_name,
            &upload.content_type,
            upload.bytes,
        ))
        .await;

    match stored {
        Ok(file) => {
            info!(file_id = %file.id, "Photo uploaded");
            (
                StatusCode::CREATED,
                Json(UploadedPhoto {
                    url: storage.file_view_url(state.bucket_id(), &file.id),
                    file_id: file.id,
                }),
            )
                .into_response()
        }
        Err(err) => ViewError::backend("Failed to upload photo", &err).into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::state::test_support::state;
    use axum::{body::Body, http::Request, routing::post, Router};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "zamcare-boundary";

    fn multipart_request(content_type: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"kid.png\"\r\nContent-Type: {content_type}\r\n\r\nPNGDATA\r\n--{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/photos")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app(uri: &str) -> Router {
        Router::new()
            .route("/photos", post(upload_photo))
            .layer(Extension(state(uri)))
    }

    #[tokio::test]
    async fn image_is_stored_and_url_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/photos/files"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "f1",
                "bucketId": "photos",
                "name": "kid.png",
                "mimeType": "image/png",
                "sizeOriginal": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(multipart_request("image/png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["fileId"], json!("f1"));
        assert!(body["url"]
            .as_str()
            .unwrap()
            .ends_with("/storage/buckets/photos/files/f1/view?project=zamcare-test"));
    }

    #[tokio::test]
    async fn non_image_is_rejected_without_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(multipart_request("text/plain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
