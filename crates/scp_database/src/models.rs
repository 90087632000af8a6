//! Diesel row types for the `scps` and `scp_tales` tables.

use crate::schema::{scp_tales, scps};
use diesel::prelude::*;
use scp_core::{NewScp, NewTale, Scp, ScpPatch, ScpTale, TalePatch};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Row read from the `scps` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScpRow {
    pub scp_id: String,
    pub title: String,
    pub description: Option<String>,
    pub classification: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub series: Option<String>,
    pub photo: Option<String>,
    pub creator: Option<String>,
    pub referencing_tale_ids: Vec<Uuid>,
}

impl From<ScpRow> for Scp<Uuid> {
    fn from(row: ScpRow) -> Self {
        Self {
            scp_id: row.scp_id,
            title: row.title,
            description: row.description,
            classification: row.classification,
            rating: row.rating,
            url: row.url,
            series: row.series,
            photo: row.photo,
            creator: row.creator,
            referencing_tale_ids: row.referencing_tale_ids.into_iter().collect::<BTreeSet<_>>(),
        }
    }
}

/// Row written to the `scps` table; the back-reference set starts empty.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scps)]
pub struct NewScpRow {
    pub scp_id: String,
    pub title: String,
    pub description: Option<String>,
    pub classification: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub series: Option<String>,
    pub photo: Option<String>,
    pub creator: Option<String>,
}

impl From<&NewScp> for NewScpRow {
    fn from(scp: &NewScp) -> Self {
        Self {
            scp_id: scp.scp_id.clone(),
            title: scp.title.clone(),
            description: scp.description.clone(),
            classification: scp.classification.clone(),
            rating: scp.rating,
            url: scp.url.clone(),
            series: scp.series.clone(),
            photo: scp.photo.clone(),
            creator: scp.creator.clone(),
        }
    }
}

/// Field-level update of an SCP; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = scps)]
pub struct ScpChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub classification: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub series: Option<String>,
    pub photo: Option<String>,
    pub creator: Option<String>,
}

impl From<&ScpPatch> for ScpChangeset {
    fn from(patch: &ScpPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            classification: patch.classification.clone(),
            rating: patch.rating,
            url: patch.url.clone(),
            series: patch.series.clone(),
            photo: patch.photo.clone(),
            creator: patch.creator.clone(),
        }
    }
}

/// Row read from the `scp_tales` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scp_tales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaleRow {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub scp_refs: Vec<String>,
}

impl From<TaleRow> for ScpTale<Uuid> {
    fn from(row: TaleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            rating: row.rating,
            url: row.url,
            scp_refs: row.scp_refs,
        }
    }
}

/// Row written to the `scp_tales` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scp_tales)]
pub struct NewTaleRow {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub scp_refs: Vec<String>,
}

impl NewTaleRow {
    /// Build an insertable row under a freshly assigned identifier.
    pub fn new(id: Uuid, tale: &NewTale) -> Self {
        Self {
            id,
            title: tale.title.clone(),
            content: tale.content.clone(),
            rating: tale.rating,
            url: tale.url.clone(),
            scp_refs: tale.scp_refs.clone(),
        }
    }
}

/// Field-level update of a tale; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = scp_tales)]
pub struct TaleChangeset {
    pub title: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i32>,
    pub url: Option<String>,
    pub scp_refs: Option<Vec<String>>,
}

impl From<&TalePatch> for TaleChangeset {
    fn from(patch: &TalePatch) -> Self {
        Self {
            title: patch.title.clone(),
            content: patch.content.clone(),
            rating: patch.rating,
            url: patch.url.clone(),
            scp_refs: patch.scp_refs.clone(),
        }
    }
}
