use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::instrument;

use super::{decode_json, Appwrite, AppwriteError, Auth, StoredFile};

/// Blob storage endpoints. All calls use the server key.
#[derive(Clone, Copy, Debug)]
pub struct StorageApi<'a> {
    client: &'a Appwrite,
}

impl<'a> StorageApi<'a> {
    pub(crate) fn new(client: &'a Appwrite) -> Self {
        Self { client }
    }

    /// Upload a blob as `file_id` into `bucket_id`.
    ///
    /// # Errors
    /// Returns an error if the content type is invalid or the backend rejects
    /// the upload.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, AppwriteError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|err| AppwriteError::Config(format!("invalid content type: {err}")))?;
        let form = Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let response = self
            .client
            .request(
                Method::POST,
                &format!("/storage/buckets/{bucket_id}/files"),
                Auth::Key,
            )
            .multipart(form)
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// Public view URL of a stored file.
    #[must_use]
    pub fn file_view_url(&self, bucket_id: &str, file_id: &str) -> String {
        format!(
            "{}?project={}",
            self.client
                .url(&format!("/storage/buckets/{bucket_id}/files/{file_id}/view")),
            self.client.project_id()
        )
    }
}
