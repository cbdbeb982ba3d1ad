//! Monetary and goods donations.
//!
//! Monetary donations are recorded before payment; the response carries the
//! receipt id and the configured payment link. Donations reference children
//! and orphanages by name only.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{unix_millis, valid_email};
use crate::api::records::{ChildDonation, GoodsDonation, OrphanageDonation};
use crate::api::views::{
    require, require_payload, ListView, Notice, NoticeBody, Validate, ViewError, ViewScope,
};
use crate::api::SharedState;
use crate::appwrite::{unique_id, Document};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    #[serde(default)]
    pub donor_name: String,
    #[serde(default)]
    pub donor_city: String,
    #[serde(default)]
    pub donor_email: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub comment: String,
}

impl Validate for Donor {
    fn validate(&self) -> Result<(), ViewError> {
        require("Donor name", &self.donor_name)?;
        require("Donor city", &self.donor_city)?;
        require("Donor email", &self.donor_email)?;
        if !valid_email(self.donor_email.trim()) {
            return Err(ViewError::Validation("Invalid email address.".to_string()));
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(ViewError::Validation(
                "Amount must be greater than zero.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChildDonationForm {
    #[serde(flatten)]
    pub donor: Donor,
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub child_city: String,
}

impl Validate for ChildDonationForm {
    fn validate(&self) -> Result<(), ViewError> {
        self.donor.validate()?;
        require("Child name", &self.child_name)?;
        require("Child city", &self.child_city)
    }
}

impl ChildDonationForm {
    fn into_donation(self, millis: u128) -> ChildDonation {
        let donor_name = self.donor.donor_name.trim().to_string();
        let child_name = self.child_name.trim().to_string();
        let child_city = self.child_city.trim().to_string();
        let receipt_id = format!(
            "{donor_name}-{child_name}-{child_city}-{}-{millis}",
            self.donor.amount
        );
        ChildDonation {
            donor_name,
            donor_city: self.donor.donor_city.trim().to_string(),
            donor_email: self.donor.donor_email.trim().to_string(),
            amount: self.donor.amount,
            child_name,
            child_city,
            receipt_id,
            comment: self.donor.comment.trim().to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrphanageDonationForm {
    #[serde(flatten)]
    pub donor: Donor,
    #[serde(default)]
    pub orphanage_name: String,
}

impl Validate for OrphanageDonationForm {
    fn validate(&self) -> Result<(), ViewError> {
        self.donor.validate()?;
        require("Orphanage name", &self.orphanage_name)
    }
}

impl OrphanageDonationForm {
    fn into_donation(self, millis: u128) -> OrphanageDonation {
        let donor_name = self.donor.donor_name.trim().to_string();
        let orphanage_name = self.orphanage_name.trim().to_string();
        let receipt_id = format!(
            "{donor_name}-{orphanage_name}-{}-{millis}",
            self.donor.amount
        );
        OrphanageDonation {
            donor_name,
            donor_city: self.donor.donor_city.trim().to_string(),
            donor_email: self.donor.donor_email.trim().to_string(),
            amount: self.donor.amount,
            orphanage_name,
            receipt_id,
            comment: self.donor.comment.trim().to_string(),
        }
    }
}

impl Validate for GoodsDonation {
    fn validate(&self) -> Result<(), ViewError> {
        require("Orphanage", &self.orphanage)?;
        require("Donation items", &self.donation_items)?;
        require("Delivery date", &self.delivery_date)?;
        require("Contact name", &self.contact_name)?;
        require("Contact email", &self.contact_email)?;
        if valid_email(self.contact_email.trim()) {
            Ok(())
        } else {
            Err(ViewError::Validation("Invalid email address.".to_string()))
        }
    }
}

/// Recorded monetary donation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt<T> {
    pub receipt_id: String,
    pub document: Document<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    pub notice: Notice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedGoods {
    pub document: Document<GoodsDonation>,
    pub notice: Notice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDetails {
    pub child_donations: Vec<Document<ChildDonation>>,
    pub orphanage_donations: Vec<Document<OrphanageDonation>>,
    pub goods_donations: Vec<Document<GoodsDonation>>,
}

#[derive(ToSchema, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub payment_link: String,
}

async fn record<T>(
    state: &SharedState,
    scope: &ViewScope,
    collection: &str,
    donation: &T,
) -> Result<Document<T>, ViewError>
where
    T: Serialize + serde::de::DeserializeOwned + Sync,
{
    scope
        .run(
            state
                .databases()
                .create::<T, T>(collection, &unique_id(), donation),
        )
        .await
        .map_err(|err| ViewError::backend("Failed to save donation", &err))
}

fn receipt<T: Serialize>(
    state: &SharedState,
    receipt_id: String,
    document: Document<T>,
) -> Response {
    info!(receipt_id = %receipt_id, "Donation recorded");
    let notice = Notice::success(format!(
        "Donation successfully recorded with Receipt ID: {receipt_id}"
    ));
    (
        StatusCode::CREATED,
        Json(DonationReceipt {
            receipt_id,
            document,
            payment_link: state.config().payment_link().map(ToString::to_string),
            notice,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/donations/child",
    request_body = ChildDonationForm,
    responses(
        (status = 201, description = "Donation recorded; receipt id and payment link"),
        (status = 422, description = "Missing required field or non-positive amount", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "donations"
)]
pub async fn donate_to_child(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<ChildDonationForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = form.validate() {
        return err.into_response();
    }

    let donation = form.into_donation(unix_millis());
    let collection = &state.collections().child_donations;
    match record(&state, &scope, collection, &donation).await {
        Ok(document) => receipt(&state, donation.receipt_id, document),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/donations/orphanage",
    request_body = OrphanageDonationForm,
    responses(
        (status = 201, description = "Donation recorded; receipt id and payment link"),
        (status = 422, description = "Missing required field or non-positive amount", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "donations"
)]
pub async fn donate_to_orphanage(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<OrphanageDonationForm>>,
) -> Response {
    let form = match require_payload(payload) {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = form.validate() {
        return err.into_response();
    }

    let donation = form.into_donation(unix_millis());
    match record(
        &state,
        &scope,
        &state.collections().orphanage_donations,
        &donation,
    )
    .await
    {
        Ok(document) => receipt(&state, donation.receipt_id, document),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/goods",
    request_body = GoodsDonation,
    responses(
        (status = 201, description = "Goods donation recorded"),
        (status = 422, description = "Missing required field", body = NoticeBody),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "donations"
)]
pub async fn donate_goods(
    state: Extension<SharedState>,
    scope: ViewScope,
    payload: Option<Json<GoodsDonation>>,
) -> Response {
    let goods = match require_payload(payload) {
        Ok(goods) => goods,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = goods.validate() {
        return err.into_response();
    }

    match record(&state, &scope, &state.collections().goods_donations, &goods).await {
        Ok(document) => (
            StatusCode::CREATED,
            Json(RecordedGoods {
                document,
                notice: Notice::success("Donation submitted successfully!"),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/donation-details",
    responses(
        (status = 200, description = "Child, orphanage and goods donations"),
        (status = 502, description = "Backend failure", body = NoticeBody)
    ),
    tag = "donations"
)]
pub async fn donation_details(
    state: Extension<SharedState>,
    scope: ViewScope,
) -> Result<Json<DonationDetails>, ViewError> {
    let collections = state.collections();
    let (children, orphanages, goods) = tokio::try_join!(
        ListView::<ChildDonation>::load(&state, &scope, &collections.child_donations, &[]),
        ListView::<OrphanageDonation>::load(&state, &scope, &collections.orphanage_donations, &[]),
        ListView::<GoodsDonation>::load(&state, &scope, &collections.goods_donations, &[]),
    )?;

    Ok(Json(DonationDetails {
        child_donations: children.into_items(),
        orphanage_donations: orphanages.into_items(),
        goods_donations: goods.into_items(),
    }))
}

#[utoipa::path(
    get,
    path = "/payment",
    responses(
        (status = 200, description = "Payment page link", body = PaymentLink),
        (status = 404, description = "No payment link configured", body = NoticeBody)
    ),
    tag = "donations"
)]
pub async fn payment(state: Extension<SharedState>) -> Result<Json<PaymentLink>, ViewError> {
    state
        .config()
        .payment_link()
        .map(|link| {
            Json(PaymentLink {
                payment_link: link.to_string(),
            })
        })
        .ok_or_else(|| ViewError::NotFound("Online payment is not available.".to_string()))
}
