//! Role dashboards.
//!
//! Each dashboard fetches its lists concurrently inside the request scope and
//! adds the sidebar for the cached role. The cached role only picks sidebar
//! entries; every dashboard is reachable with any live session.

use axum::{extract::Extension, http::HeaderMap, Json};
use serde::Serialize;

use super::auth::{sidebar_actions, RoleCache, SidebarAction};
use super::opportunities::available;
use super::requests::load_pending;
use crate::api::records::{
    ChildDonation, ChildProfile, Opportunity, VolunteerProfile, VolunteerRequest,
};
use crate::api::views::{ListView, NoticeBody, ViewError, ViewScope};
use crate::api::SharedState;
use crate::appwrite::{Document, Query};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub sidebar: Vec<SidebarAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Document<ChildProfile>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteers: Option<Vec<Document<VolunteerProfile>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<Document<Opportunity>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_donations: Option<Vec<Document<ChildDonation>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_requests: Option<Vec<Document<VolunteerRequest>>>,
}

fn sidebar(headers: &HeaderMap, opportunities: &[Document<Opportunity>]) -> Vec<SidebarAction> {
    let role = RoleCache::from_headers(headers).get();
    sidebar_actions(role.as_ref(), !opportunities.is_empty())
}

#[utoipa::path(
    get,
    path = "/home",
    responses(
        (status = 200, description = "Children, volunteers, available opportunities and sidebar"),
        (status = 303, description = "No session; redirect to login"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "dashboards"
)]
pub async fn home(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<Json<Dashboard>, ViewError> {
    let collections = state.collections();
    let open = available();
    let (children, volunteers, opportunities) = tokio::try_join!(
        ListView::<ChildProfile>::load(&state, &scope, &collections.children, &[]),
        ListView::<VolunteerProfile>::load(&state, &scope, &collections.volunteers, &[]),
        ListView::<Opportunity>::load(&state, &scope, &collections.opportunities, &open),
    )?;
    let opportunities = opportunities.into_items();

    Ok(Json(Dashboard {
        sidebar: sidebar(&headers, &opportunities),
        children: Some(children.into_items()),
        volunteers: Some(volunteers.into_items()),
        opportunities: Some(opportunities),
        ..Dashboard::default()
    }))
}

#[utoipa::path(
    get,
    path = "/board",
    responses(
        (status = 200, description = "Children, available opportunities and sidebar"),
        (status = 303, description = "No session; redirect to login"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "dashboards"
)]
/// Donor board.
pub async fn board(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<Json<Dashboard>, ViewError> {
    let collections = state.collections();
    let open = available();
    let (children, opportunities) = tokio::try_join!(
        ListView::<ChildProfile>::load(&state, &scope, &collections.children, &[]),
        ListView::<Opportunity>::load(&state, &scope, &collections.opportunities, &open),
    )?;
    let opportunities = opportunities.into_items();

    Ok(Json(Dashboard {
        sidebar: sidebar(&headers, &opportunities),
        children: Some(children.into_items()),
        opportunities: Some(opportunities),
        ..Dashboard::default()
    }))
}

#[utoipa::path(
    get,
    path = "/orphanage",
    responses(
        (status = 200, description = "Opportunities by date, children, volunteers, child donations, pending requests and sidebar"),
        (status = 303, description = "No session; redirect to login"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "dashboards"
)]
pub async fn orphanage(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<Json<Dashboard>, ViewError> {
    let collections = state.collections();
    let by_date = [Query::order_asc("date")];
    let (opportunities, children, volunteers, donations, requests) = tokio::try_join!(
        ListView::<Opportunity>::load(&state, &scope, &collections.opportunities, &by_date),
        ListView::<ChildProfile>::load(&state, &scope, &collections.children, &[]),
        ListView::<VolunteerProfile>::load(&state, &scope, &collections.volunteers, &[]),
        ListView::<ChildDonation>::load(&state, &scope, &collections.child_donations, &[]),
        load_pending(&state, &scope),
    )?;
    let opportunities = opportunities.into_items();

    Ok(Json(Dashboard {
        sidebar: sidebar(&headers, &opportunities),
        children: Some(children.into_items()),
        volunteers: Some(volunteers.into_items()),
        opportunities: Some(opportunities),
        child_donations: Some(donations.into_items()),
        volunteer_requests: Some(requests.into_items()),
    }))
}

#[utoipa::path(
    get,
    path = "/volunteer",
    responses(
        (status = 200, description = "Available opportunities, volunteers and sidebar"),
        (status = 303, description = "No session; redirect to login"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "dashboards"
)]
pub async fn volunteer(
    headers: HeaderMap,
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<Json<Dashboard>, ViewError> {
    let collections = state.collections();
    let open = available();
    let (opportunities, volunteers) = tokio::try_join!(
        ListView::<Opportunity>::load(&state, &scope, &collections.opportunities, &open),
        ListView::<VolunteerProfile>::load(&state, &scope, &collections.volunteers, &[]),
    )?;
    let opportunities = opportunities.into_items();

    Ok(Json(Dashboard {
        sidebar: sidebar(&headers, &opportunities),
        volunteers: Some(volunteers.into_items()),
        opportunities: Some(opportunities),
        ..Dashboard::default()
    }))
}
