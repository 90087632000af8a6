//! What happens to referencing tales when an SCP is deleted.

use serde::{Deserialize, Serialize};

/// Policy applied when deleting an SCP that tales still reference.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ScpDeletePolicy {
    /// Delete anyway; referencing tales keep a dangling key
    #[default]
    #[display("tolerate")]
    Tolerate,
    /// Refuse the deletion while any tale references the entry
    #[display("block")]
    Block,
    /// Delete and strip the key from every referencing tale
    #[display("cascade")]
    Cascade,
}

impl std::str::FromStr for ScpDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tolerate" => Ok(ScpDeletePolicy::Tolerate),
            "block" => Ok(ScpDeletePolicy::Block),
            "cascade" => Ok(ScpDeletePolicy::Cascade),
            _ => Err(format!("Unknown delete policy: {}", s)),
        }
    }
}
