//! Typed records stored in the document database.
//!
//! Attribute names follow the stored camelCase schema. There is no referential
//! integrity between collections: donations reference children and orphanages
//! by name.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status given to every new volunteer request.
pub const REQUEST_STATUS_PENDING: &str = "pending";

/// `users` document; its id is the account id.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education_status: String,
    #[serde(default)]
    pub health_status: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationMethod {
    #[default]
    Email,
    Phone,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    pub name: String,
    #[serde(default)]
    pub profile_picture_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub availability: bool,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub communication_method: CommunicationMethod,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildDonation {
    pub donor_name: String,
    #[serde(default)]
    pub donor_city: String,
    #[serde(default)]
    pub donor_email: String,
    pub amount: f64,
    pub child_name: String,
    #[serde(default)]
    pub child_city: String,
    pub receipt_id: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrphanageDonation {
    pub donor_name: String,
    #[serde(default)]
    pub donor_city: String,
    #[serde(default)]
    pub donor_email: String,
    pub amount: f64,
    pub orphanage_name: String,
    pub receipt_id: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoodsDonation {
    #[serde(default)]
    pub orphanage: String,
    #[serde(default)]
    pub donation_items: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRequest {
    pub volunteer_name: String,
    pub message: String,
    #[serde(default)]
    pub status: String,
}
