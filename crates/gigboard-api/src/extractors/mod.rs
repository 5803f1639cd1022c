//! Custom Axum extractors.

pub mod current_user;
pub mod list;

pub use current_user::{CurrentUser, USER_ID_HEADER};
pub use list::ListParams;
