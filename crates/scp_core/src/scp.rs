//! SCP entry documents.

use crate::DocumentId;
use scp_error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored SCP entry.
///
/// `referencing_tale_ids` is owned by the reference-consistency protocol:
/// it always holds the identifiers of the live tales whose `scp_refs`
/// name this entry, and is never written through a client patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scp<Id: DocumentId> {
    /// Unique human-assigned key, e.g. "SCP-173"
    pub scp_id: String,
    /// Display title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Object class (Safe, Euclid, Keter, ...)
    #[serde(default)]
    pub classification: Option<String>,
    /// Community rating
    #[serde(default)]
    pub rating: Option<i32>,
    /// Canonical wiki URL
    #[serde(default)]
    pub url: Option<String>,
    /// Series the entry belongs to
    #[serde(default)]
    pub series: Option<String>,
    /// Image URL
    #[serde(default)]
    pub photo: Option<String>,
    /// Author
    #[serde(default)]
    pub creator: Option<String>,
    /// Tales that reference this entry
    #[serde(default)]
    pub referencing_tale_ids: BTreeSet<Id>,
}

impl<Id: DocumentId> Scp<Id> {
    /// Materialize a freshly inserted entry with an empty back-reference set.
    pub fn from_new(new: NewScp) -> Self {
        Self {
            scp_id: new.scp_id,
            title: new.title,
            description: new.description,
            classification: new.classification,
            rating: new.rating,
            url: new.url,
            series: new.series,
            photo: new.photo,
            creator: new.creator,
            referencing_tale_ids: BTreeSet::new(),
        }
    }

    /// Apply a merge patch: only fields present in `patch` change.
    pub fn apply(&mut self, patch: &ScpPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        merge(&mut self.description, &patch.description);
        merge(&mut self.classification, &patch.classification);
        if patch.rating.is_some() {
            self.rating = patch.rating;
        }
        merge(&mut self.url, &patch.url);
        merge(&mut self.series, &patch.series);
        merge(&mut self.photo, &patch.photo);
        merge(&mut self.creator, &patch.creator);
    }
}

fn merge(target: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

/// Payload for creating an SCP entry.
///
/// # Examples
///
/// ```
/// use scp_core::NewScp;
///
/// let scp = NewScp::new("SCP-173", "The Sculpture").with_classification("Euclid");
/// assert!(scp.validate().is_ok());
/// assert_eq!(scp.classification.as_deref(), Some("Euclid"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_", strip_option, into)]
pub struct NewScp {
    /// Unique human-assigned key
    #[setters(skip)]
    pub scp_id: String,
    /// Display title
    #[setters(skip)]
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Object class
    #[serde(default)]
    pub classification: Option<String>,
    /// Community rating
    #[serde(default)]
    pub rating: Option<i32>,
    /// Canonical wiki URL
    #[serde(default)]
    pub url: Option<String>,
    /// Series the entry belongs to
    #[serde(default)]
    pub series: Option<String>,
    /// Image URL
    #[serde(default)]
    pub photo: Option<String>,
    /// Author
    #[serde(default)]
    pub creator: Option<String>,
}

impl NewScp {
    /// Create a payload with the two required fields.
    pub fn new(scp_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            scp_id: scp_id.into(),
            title: title.into(),
            description: None,
            classification: None,
            rating: None,
            url: None,
            series: None,
            photo: None,
            creator: None,
        }
    }

    /// Reject blank keys and titles.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("scp_id", &self.scp_id)?;
        require_non_blank("title", &self.title)
    }
}

/// Merge patch for an SCP entry's descriptive fields.
///
/// The key and the back-reference set cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ScpPatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New object class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// New rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    /// New URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// New series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// New image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// New author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl ScpPatch {
    /// True when the patch names no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A patch may not blank out the title.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => require_non_blank("title", title),
            None => Ok(()),
        }
    }
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}
