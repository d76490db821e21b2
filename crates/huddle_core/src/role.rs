//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
///
/// # Examples
///
/// ```
/// use huddle_core::Role;
///
/// assert_eq!(format!("{}", Role::System), "system");
/// assert_ne!(Role::User, Role::Assistant);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    #[display("system")]
    System,
    /// Prompt text from the pipeline
    #[display("user")]
    User,
    /// Text produced by the model
    #[display("assistant")]
    Assistant,
}
