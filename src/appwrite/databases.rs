use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::instrument;

use super::query::to_params;
use super::{
    decode_json, expect_empty, Appwrite, AppwriteError, Auth, Document, DocumentList, Query,
};

/// Document store endpoints for one database. All calls use the server key.
#[derive(Clone, Copy, Debug)]
pub struct DatabasesApi<'a> {
    client: &'a Appwrite,
    database_id: &'a str,
}

impl<'a> DatabasesApi<'a> {
    pub(crate) fn new(client: &'a Appwrite, database_id: &'a str) -> Self {
        Self {
            client,
            database_id,
        }
    }

    fn documents_path(&self, collection: &str) -> String {
        format!(
            "/databases/{}/collections/{collection}/documents",
            self.database_id
        )
    }

    fn document_path(&self, collection: &str, id: &str) -> String {
        format!("{}/{id}", self.documents_path(collection))
    }

    /// # Errors
    /// Returns an error on transport failure, non-success status, or when a
    /// document does not decode into `T`.
    #[instrument(skip(self, queries))]
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>, AppwriteError> {
        let response = self
            .client
            .request(Method::GET, &self.documents_path(collection), Auth::Key)
            .query(&to_params(queries))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// # Errors
    /// Returns an HTTP 404 error when the document does not exist.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Document<T>, AppwriteError> {
        let response = self
            .client
            .request(Method::GET, &self.document_path(collection, id), Auth::Key)
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// # Errors
    /// Returns an error if the backend rejects the document.
    #[instrument(skip(self, data))]
    pub async fn create<T, B>(
        &self,
        collection: &str,
        id: &str,
        data: &B,
    ) -> Result<Document<T>, AppwriteError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .request(Method::POST, &self.documents_path(collection), Auth::Key)
            .json(&json!({"documentId": id, "data": data}))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// Partial update; only the attributes present in `data` change.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, data))]
    pub async fn update<T, B>(
        &self,
        collection: &str,
        id: &str,
        data: &B,
    ) -> Result<Document<T>, AppwriteError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .request(
                Method::PATCH,
                &self.document_path(collection, id),
                Auth::Key,
            )
            .json(&json!({"data": data}))
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        decode_json(response).await
    }

    /// # Errors
    /// Returns an error if the backend refuses the delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), AppwriteError> {
        let response = self
            .client
            .request(
                Method::DELETE,
                &self.document_path(collection, id),
                Auth::Key,
            )
            .send()
            .await
            .map_err(AppwriteError::from_reqwest)?;
        expect_empty(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::appwrite::test_support::{client, API_KEY};
    use crate::appwrite::{AppwriteError, Document, Query};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Opportunity {
        title: String,
        is_available: bool,
    }

    const DOCS: &str = "/v1/databases/main/collections/volunteer_opportunities/documents";

    #[tokio::test]
    async fn list_sends_queries_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCS))
            .and(header("X-Appwrite-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [
                    {"$id": "o1", "title": "Reading club", "isAvailable": true}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        let list = appwrite
            .databases("main")
            .list::<Opportunity>(
                "volunteer_opportunities",
                &[Query::equal("isAvailable", true)],
            )
            .await
            .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "o1");
        assert!(list.documents[0].data.is_available);

        let requests = server.received_requests().await.unwrap();
        let queries: Vec<serde_json::Value> = requests[0]
            .url
            .query_pairs()
            .filter(|(key, _)| key == "queries[]")
            .map(|(_, value)| serde_json::from_str(&value).unwrap())
            .collect();
        assert_eq!(
            queries,
            vec![json!({"method": "equal", "attribute": "isAvailable", "values": [true]})]
        );
    }

    #[tokio::test]
    async fn list_with_wrong_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [{"$id": "o1", "title": 7}]
            })))
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        let err = appwrite
            .databases("main")
            .list::<Opportunity>("volunteer_opportunities", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppwriteError::Decode(_)));
    }

    #[tokio::test]
    async fn create_wraps_data_with_document_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DOCS))
            .and(body_json(json!({
                "documentId": "o2",
                "data": {"title": "Painting", "isAvailable": true}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "o2",
                "$createdAt": "2024-05-01T10:00:00.000+00:00",
                "title": "Painting",
                "isAvailable": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        let body = Opportunity {
            title: "Painting".into(),
            is_available: true,
        };
        let created: Document<Opportunity> = appwrite
            .databases("main")
            .create("volunteer_opportunities", "o2", &body)
            .await
            .unwrap();
        assert_eq!(created.id, "o2");
        assert!(created.created_at.is_some());
    }

    #[tokio::test]
    async fn update_patches_partial_data() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{DOCS}/o1")))
            .and(body_json(json!({"data": {"isAvailable": false}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "o1",
                "title": "Reading club",
                "isAvailable": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        let updated: Document<Opportunity> = appwrite
            .databases("main")
            .update(
                "volunteer_opportunities",
                "o1",
                &json!({"isAvailable": false}),
            )
            .await
            .unwrap();
        assert!(!updated.data.is_available);
    }

    #[tokio::test]
    async fn get_missing_document_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/missing")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Document with the requested ID could not be found.",
                "code": 404,
                "type": "document_not_found"
            })))
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        let err = appwrite
            .databases("main")
            .get::<Opportunity>("volunteer_opportunities", "missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{DOCS}/o1")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let appwrite = client(&server.uri());
        appwrite
            .databases("main")
            .delete("volunteer_opportunities", "o1")
            .await
            .unwrap();
    }
}
