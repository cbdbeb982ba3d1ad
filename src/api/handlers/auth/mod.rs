//! Authentication: session gate, role resolution and the login flows.

pub mod gate;
pub mod login;
pub mod logout;
pub mod principal;
pub mod recovery;
pub mod role;
pub mod session;
pub mod signup;
pub mod types;

pub use gate::require_session;
pub use principal::Principal;
pub use role::{landing_path, resolve_role, sidebar_actions, Role, RoleCache, SidebarAction};
