//! Terminal front end for oracli.
//!
//! - Line editing with keyword completion and history recall
//! - No-echo password prompt

pub mod editor;
pub mod password;

pub use editor::{new_editor, LineEditor};
pub use password::read_password;
