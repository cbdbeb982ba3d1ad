use axum::Json;
use utoipa::openapi::{Contact, InfoBuilder, License, Tag};
use utoipa::OpenApi;

use super::handlers::{
    auth, children, dashboards, donations, health, opportunities, photos, profile, requests,
    root, volunteers,
};
use super::records::{
    ChildDonation, ChildProfile, CommunicationMethod, GoodsDonation, Opportunity,
    OrphanageDonation, UserProfile, VolunteerProfile, VolunteerRequest,
};
use super::views::{Notice, NoticeBody, NoticeLevel};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::session::session,
        auth::login::login,
        auth::signup::signup,
        auth::logout::logout,
        auth::recovery::recovery,
        auth::role::role,
        profile::profile,
        dashboards::home,
        dashboards::board,
        dashboards::orphanage,
        dashboards::volunteer,
        children::list_children,
        children::child_detail,
        children::create_child,
        children::update_child,
        children::delete_child,
        volunteers::list_volunteers,
        volunteers::volunteer_detail,
        volunteers::create_volunteer,
        volunteers::update_volunteer,
        volunteers::update_contact,
        volunteers::delete_volunteer,
        opportunities::list_opportunities,
        opportunities::create_opportunity,
        opportunities::update_availability,
        donations::donate_to_child,
        donations::donate_to_orphanage,
        donations::donate_goods,
        donations::donation_details,
        donations::payment,
        requests::submit_request,
        requests::list_requests,
        requests::decide_request,
        photos::upload_photo,
    ),
    components(schemas(
        Notice,
        NoticeLevel,
        NoticeBody,
        UserProfile,
        ChildProfile,
        CommunicationMethod,
        VolunteerProfile,
        Opportunity,
        ChildDonation,
        OrphanageDonation,
        GoodsDonation,
        VolunteerRequest,
        auth::SidebarAction,
    ))
)]
struct ApiDoc;

/// The `OpenAPI` document, with info taken from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info = cargo_info();
    spec.tags = Some(
        [
            ("auth", "Signup, login, logout, recovery and role routing"),
            ("dashboards", "Role dashboards with sidebar actions"),
            ("children", "Children profiles"),
            ("volunteers", "Volunteer profiles"),
            ("opportunities", "Volunteer opportunities"),
            ("donations", "Monetary and goods donations"),
            ("requests", "Volunteer requests"),
            ("photos", "Profile photo uploads"),
            ("health", "Service health"),
        ]
        .into_iter()
        .map(|(name, description)| {
            let mut tag = Tag::new(name);
            tag.description = Some(description.to_string());
            tag
        })
        .collect(),
    );
    spec
}

/// Served at `/api-docs/openapi.json`.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn cargo_info() -> utoipa::openapi::Info {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();
    info
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `:` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(':').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team ZamCare"));
            assert_eq!(contact.email.as_deref(), Some("team@zamcare.org"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
        }
    }

    #[test]
    fn openapi_documents_views() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "donations"));
        for path in [
            "/login",
            "/children/{id}",
            "/volunteers/{id}/contact",
            "/requests/{id}",
            "/profile",
            "/opportunities/{id}/availability",
            "/donations/child",
            "/photos",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn parse_author_splits_name_and_email() {
        assert_eq!(
            parse_author("Team ZamCare <team@zamcare.org>"),
            (Some("Team ZamCare"), Some("team@zamcare.org"))
        );
        assert_eq!(parse_author("Ann"), (Some("Ann"), None));
    }
}
