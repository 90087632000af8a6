//! Tale documents.

use crate::DocumentId;
use crate::scp::require_non_blank;
use scp_error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored tale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScpTale<Id: DocumentId> {
    /// Store-assigned identifier
    pub id: Id,
    /// Display title
    pub title: String,
    /// Body text
    #[serde(default)]
    pub content: Option<String>,
    /// Community rating
    #[serde(default)]
    pub rating: Option<i32>,
    /// Canonical wiki URL
    #[serde(default)]
    pub url: Option<String>,
    /// Keys of the SCPs this tale references, in author order
    #[serde(default)]
    pub scp_refs: Vec<String>,
}

impl<Id: DocumentId> ScpTale<Id> {
    /// Materialize a freshly inserted tale.
    pub fn from_new(id: Id, new: NewTale) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            rating: new.rating,
            url: new.url,
            scp_refs: new.scp_refs,
        }
    }

    /// Distinct referenced keys.
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        self.scp_refs.iter().cloned().collect()
    }

    /// Apply a merge patch: only fields present in `patch` change.
    pub fn apply(&mut self, patch: &TalePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if patch.content.is_some() {
            self.content.clone_from(&patch.content);
        }
        if patch.rating.is_some() {
            self.rating = patch.rating;
        }
        if patch.url.is_some() {
            self.url.clone_from(&patch.url);
        }
        if let Some(refs) = &patch.scp_refs {
            self.scp_refs = refs.clone();
        }
    }
}

/// Payload for creating a tale.
///
/// # Examples
///
/// ```
/// use scp_core::NewTale;
///
/// let tale = NewTale::new("Tuftos' Proposal").with_scp_refs(vec!["SCP-001".to_string()]);
/// assert!(tale.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_", strip_option, into)]
pub struct NewTale {
    /// Display title
    #[setters(skip)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub content: Option<String>,
    /// Community rating
    #[serde(default)]
    pub rating: Option<i32>,
    /// Canonical wiki URL
    #[serde(default)]
    pub url: Option<String>,
    /// Keys of the SCPs this tale references
    #[serde(default)]
    pub scp_refs: Vec<String>,
}

impl NewTale {
    /// Create a payload with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            rating: None,
            url: None,
            scp_refs: Vec::new(),
        }
    }

    /// Reject blank titles and blank reference keys.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)?;
        validate_refs(&self.scp_refs)
    }
}

/// Merge patch for a tale.
///
/// `scp_refs`, when present, replaces the whole reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_", strip_option, into)]
pub struct TalePatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    /// New URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Replacement reference list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp_refs: Option<Vec<String>>,
}

impl TalePatch {
    /// True when the patch names no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A patch may not blank out the title or name a blank key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        match &self.scp_refs {
            Some(refs) => validate_refs(refs),
            None => Ok(()),
        }
    }
}

fn validate_refs(refs: &[String]) -> Result<(), ValidationError> {
    if refs.iter().any(|key| key.trim().is_empty()) {
        return Err(ValidationError::new("scp_refs", "must not contain blank keys"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_keys_collapse_duplicates() {
        let tale = ScpTale::from_new(
            7u64,
            NewTale::new("Dust").with_scp_refs(vec![
                "SCP-049".to_string(),
                "SCP-035".to_string(),
                "SCP-049".to_string(),
            ]),
        );
        let keys: Vec<_> = tale.referenced_keys().into_iter().collect();
        assert_eq!(keys, vec!["SCP-035", "SCP-049"]);
        assert_eq!(tale.scp_refs.len(), 3);
    }

    #[test]
    fn patch_replaces_reference_list() {
        let mut tale = ScpTale::from_new(
            1u64,
            NewTale::new("Old").with_scp_refs(vec!["A".to_string()]),
        );
        tale.apply(&TalePatch::default().with_scp_refs(vec!["B".to_string()]));
        assert_eq!(tale.scp_refs, vec!["B"]);
        assert_eq!(tale.title, "Old");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<TalePatch, _> =
            serde_json::from_str(r#"{"title": "x", "referencing_tale_ids": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_reference_keys_are_rejected() {
        let tale = NewTale::new("T").with_scp_refs(vec![" ".to_string()]);
        assert_eq!(tale.validate().unwrap_err().field, "scp_refs");
    }
}
