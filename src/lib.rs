//! # ZamCare (donor, volunteer and orphanage coordination)
//!
//! `zamcare` serves the views of the ZamCare coordination application. Users
//! sign up as donors, volunteers or orphanages, browse children profiles and
//! volunteer opportunities, and record monetary or goods donations.
//!
//! ## Backend
//!
//! All persistence, authentication, session management and file storage are
//! delegated to an Appwrite-compatible backend reached over its REST API. The
//! service owns a single [`appwrite::Appwrite`] client per process and threads
//! it through an explicit application context; there are no global clients.
//!
//! ## Sessions and roles
//!
//! - **Route gate:** every protected view first asks the backend for a live
//!   session. Without one the request is redirected to `/login` and the view
//!   never runs, so no document-store call is made on behalf of anonymous users.
//! - **Role resolution:** the `role` attribute of the user document decides the
//!   landing page after login (`donor` → `/board`, `volunteer` → `/volunteer`,
//!   `orphanage` → `/orphanage`, anything else → `/home`). The last resolved role
//!   is cached on the client under the `userRole` key and only drives sidebar
//!   actions; it is never used for authorization.
//!
//! ## Entity views
//!
//! List views fetch once, apply a create/update/delete against the backend and
//! patch the fetched list in place instead of re-fetching. Deletes require an
//! explicit `confirm=true`; without it no backend call is made.

pub mod api;
pub mod appwrite;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
