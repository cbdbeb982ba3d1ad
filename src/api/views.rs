//! Entity list views.
//!
//! A view fetches its list once, applies a single create/update/delete against
//! the backend and patches the fetched list in place. The list is never
//! re-fetched after a write; a failed write returns the untouched list with an
//! error notice.
//!
//! Every backend call made on behalf of a view runs inside its [`ViewScope`].
//! Cancelling or dropping the scope abandons outstanding calls and discards
//! late responses.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{convert::Infallible, future::Future, sync::Arc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use super::state::AppState;
use crate::appwrite::{unique_id, AppwriteError, Document, Query};

/// Upper bound on documents fetched by a list view.
pub const LIST_LIMIT: u32 = 100;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing message returned alongside a view.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeBody {
    pub notice: Notice,
}

/// List view body: the (possibly patched) items and an optional notice.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<Document<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{0}")]
    Validation(String),
    #[error("Deletion requires confirmation.")]
    NotConfirmed,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

impl ViewError {
    /// Map a backend failure to a view error, logging the details.
    pub fn backend(context: &str, err: &AppwriteError) -> Self {
        if err.is_not_found() {
            debug!("{context}: {err}");
            return Self::NotFound(format!("{context}: not found."));
        }
        error!("{context}: {err}");
        Self::Backend(format!("{context}. Please try again."))
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotConfirmed => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(NoticeBody {
                notice: self.notice(),
            }),
        )
            .into_response()
    }
}

/// Non-empty checks run before any network call.
pub trait Validate {
    /// # Errors
    /// Returns [`ViewError::Validation`] naming the first missing field.
    fn validate(&self) -> Result<(), ViewError>;
}

/// Fail with a validation error when `value` is blank.
///
/// # Errors
/// Returns [`ViewError::Validation`] when the trimmed value is empty.
pub fn require(field: &str, value: &str) -> Result<(), ViewError> {
    if value.trim().is_empty() {
        Err(ViewError::Validation(format!("{field} is required.")))
    } else {
        Ok(())
    }
}

/// Unwrap a JSON body extracted as `Option<Json<T>>`.
///
/// A missing, mistyped or unparsable body is reported like any other
/// validation failure, with a notice body instead of the extractor's plain
/// text rejection.
///
/// # Errors
/// Returns [`ViewError::Validation`] when the body could not be extracted.
pub fn require_payload<T>(payload: Option<Json<T>>) -> Result<T, ViewError> {
    match payload {
        Some(Json(payload)) => Ok(payload),
        None => Err(ViewError::Validation(
            "Missing or malformed request body.".to_string(),
        )),
    }
}

/// Split a comma separated form field into trimmed, non-empty entries.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmQuery {
    /// Must be `true` for the delete to run.
    pub confirm: Option<bool>,
}

/// Proof that the user confirmed a delete.
#[derive(Debug)]
pub struct Confirmed(());

impl ConfirmQuery {
    /// # Errors
    /// Returns [`ViewError::NotConfirmed`] unless `confirm=true` was given.
    pub fn confirmed(&self) -> Result<Confirmed, ViewError> {
        if self.confirm == Some(true) {
            Ok(Confirmed(()))
        } else {
            Err(ViewError::NotConfirmed)
        }
    }
}

/// Cancels a [`ViewScope`] from outside the view.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Lifetime of one view. Dropping it cancels every call still running in it.
#[derive(Debug)]
pub struct ViewScope {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.tx),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Run a backend call inside the scope.
    ///
    /// # Errors
    /// Returns [`AppwriteError::Cancelled`] if the scope is cancelled before or
    /// while the call runs; the call's own error otherwise.
    pub async fn run<T, F>(&self, call: F) -> Result<T, AppwriteError>
    where
        F: Future<Output = Result<T, AppwriteError>>,
    {
        let rx = self.tx.subscribe();
        if self.is_cancelled() {
            return Err(AppwriteError::Cancelled);
        }

        tokio::select! {
            biased;
            () = cancelled(rx) => Err(AppwriteError::Cancelled),
            result = call => result,
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

async fn cancelled(mut rx: watch::Receiver<bool>) {
    loop {
        let is_cancelled = *rx.borrow_and_update();
        if is_cancelled {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ViewScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new())
    }
}

/// A fetched list of one collection, patched in place by writes.
#[derive(Debug)]
pub struct ListView<T> {
    collection: String,
    items: Vec<Document<T>>,
}

impl<T> ListView<T>
where
    T: DeserializeOwned + Serialize,
{
    /// Fetch the list once.
    ///
    /// # Errors
    /// Returns [`ViewError::Backend`] if the fetch fails; nothing is retried.
    pub async fn load(
        state: &AppState,
        scope: &ViewScope,
        collection: &str,
        queries: &[Query],
    ) -> Result<Self, ViewError> {
        let mut queries = queries.to_vec();
        queries.push(Query::limit(LIST_LIMIT));

        let list = scope
            .run(state.databases().list::<T>(collection, &queries))
            .await
            .map_err(|err| ViewError::backend(&format!("Failed to load {collection}"), &err))?;

        Ok(Self {
            collection: collection.to_string(),
            items: list.documents,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[Document<T>] {
        &self.items
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Document<T>> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Create a document and append it to the list exactly once.
    ///
    /// # Errors
    /// Returns a view error if the backend rejects the document; the list is
    /// left unchanged.
    pub async fn create<B>(
        &mut self,
        state: &AppState,
        scope: &ViewScope,
        body: &B,
    ) -> Result<Document<T>, ViewError>
    where
        B: Serialize + Sync,
        T: Clone,
    {
        let id = unique_id();
        let created = scope
            .run(
                state
                    .databases()
                    .create::<T, B>(&self.collection, &id, body),
            )
            .await
            .map_err(|err| {
                ViewError::backend(&format!("Failed to create {}", self.collection), &err)
            })?;

        self.items.retain(|item| item.id != created.id);
        self.items.push(created.clone());
        Ok(created)
    }

    /// Update a listed document and replace it in place.
    ///
    /// # Errors
    /// Returns [`ViewError::NotFound`] without calling the backend when the id is
    /// not in the list, or a backend error; the list is left unchanged.
    pub async fn update<B>(
        &mut self,
        state: &AppState,
        scope: &ViewScope,
        id: &str,
        patch: &B,
    ) -> Result<Document<T>, ViewError>
    where
        B: Serialize + Sync + ?Sized,
        T: Clone,
    {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return Err(ViewError::NotFound(format!("{id} was not found.")));
        };

        let updated = scope
            .run(
                state
                    .databases()
                    .update::<T, B>(&self.collection, id, patch),
            )
            .await
            .map_err(|err| {
                ViewError::backend(&format!("Failed to update {}", self.collection), &err)
            })?;

        self.items[position] = updated.clone();
        Ok(updated)
    }

    /// Update a listed document that the write moves out of this view's
    /// selection, then drop it from the list.
    ///
    /// # Errors
    /// Same as [`ListView::update`]; the list is left unchanged on failure.
    pub async fn update_and_remove<B>(
        &mut self,
        state: &AppState,
        scope: &ViewScope,
        id: &str,
        patch: &B,
    ) -> Result<Document<T>, ViewError>
    where
        B: Serialize + Sync + ?Sized,
        T: Clone,
    {
        let updated = self.update(state, scope, id, patch).await?;
        self.items.retain(|item| item.id != id);
        Ok(updated)
    }

    /// Delete a confirmed document and remove it from the list.
    ///
    /// # Errors
    /// Returns a backend error; the list is left unchanged.
    pub async fn delete(
        &mut self,
        state: &AppState,
        scope: &ViewScope,
        id: &str,
        _confirmed: Confirmed,
    ) -> Result<(), ViewError> {
        scope
            .run(state.databases().delete(&self.collection, id))
            .await
            .map_err(|err| {
                ViewError::backend(&format!("Failed to delete {}", self.collection), &err)
            })?;

        self.items.retain(|item| item.id != id);
        Ok(())
    }

    /// Render the list with the outcome of a write.
    pub fn respond<R>(self, outcome: Result<R, ViewError>, success: &str) -> Response {
        match outcome {
            Ok(_) => (
                StatusCode::OK,
                Json(ListResponse {
                    items: self.items,
                    notice: Some(Notice::success(success)),
                }),
            )
                .into_response(),
            Err(err) => (
                err.status(),
                Json(ListResponse {
                    items: self.items,
                    notice: Some(err.notice()),
                }),
            )
                .into_response(),
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Document<T>> {
        self.items
    }
}

impl<T> IntoResponse for ListView<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(ListResponse {
            items: self.items,
            notice: None,
        })
        .into_response()
    }
}
