//! PostgreSQL implementation of DocumentStore.

use crate::models::{NewScpRow, NewTaleRow, ScpChangeset, ScpRow, TaleChangeset, TaleRow};
use crate::schema::{scp_tales, scps};
use crate::{DatabaseResult, PgPool};

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use scp_core::{NewScp, NewTale, Scp, ScpPatch, ScpTale, TalePatch};
use scp_error::{DatabaseError, DatabaseErrorKind, ScpArchiveResult};
use scp_interface::DocumentStore;
use std::collections::BTreeSet;
use tracing::{debug, instrument};
use uuid::Uuid;

const ADD_TALE_REFERENCE: &str = "UPDATE scps \
    SET referencing_tale_ids = array_append(referencing_tale_ids, $2) \
    WHERE scp_id = $1 AND NOT ($2 = ANY(referencing_tale_ids))";

const REMOVE_TALE_REFERENCE: &str = "UPDATE scps \
    SET referencing_tale_ids = array_remove(referencing_tale_ids, $2) \
    WHERE scp_id = $1 AND $2 = ANY(referencing_tale_ids)";

const REMOVE_SCP_REFERENCE: &str = "UPDATE scp_tales \
    SET scp_refs = array_remove(scp_refs, $2) \
    WHERE id = $1 AND $2 = ANY(scp_refs)";

/// PostgreSQL document store using Diesel over an r2d2 pool.
///
/// Each SCP row carries its back-reference set as a `uuid[]` column, and
/// each tale row its forward references as a `text[]` column. Set-style
/// updates are single conditional `UPDATE` statements, so every
/// add/remove is atomic per row without explicit locking.
///
/// # Example
/// ```no_run
/// use scp_database::{PostgresStore, establish_pool};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = establish_pool("postgres://localhost/scp_archive", 8)?;
/// let store = PostgresStore::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a blocking Diesel operation on a pooled connection.
    async fn with_conn<F, T>(&self, op: F) -> ScpArchiveResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?;
        Ok(result?)
    }
}

fn as_count(affected: usize) -> u64 {
    affected as u64
}

fn as_offset(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl DocumentStore for PostgresStore {
    type TaleId = Uuid;

    #[instrument(skip(self))]
    async fn find_scp(&self, scp_id: &str) -> ScpArchiveResult<Option<Scp<Uuid>>> {
        let scp_id = scp_id.to_string();
        self.with_conn(move |conn| {
            let row = scps::table
                .find(&scp_id)
                .select(ScpRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Scp::from))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_scps(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<Scp<Uuid>>> {
        self.with_conn(move |conn| {
            let rows = scps::table
                .order(scps::seq.asc())
                .offset(as_offset(skip))
                .limit(as_offset(limit))
                .select(ScpRow::as_select())
                .load(conn)?;
            debug!(count = rows.len(), "Loaded SCP page");
            Ok(rows.into_iter().map(Scp::from).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn count_scps(&self) -> ScpArchiveResult<u64> {
        self.with_conn(|conn| {
            let count: i64 = scps::table.count().get_result(conn)?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    #[instrument(skip(self, scp), fields(scp_id = %scp.scp_id))]
    async fn insert_scp(&self, scp: &NewScp) -> ScpArchiveResult<()> {
        let row = NewScpRow::from(scp);
        self.with_conn(move |conn| {
            diesel::insert_into(scps::table).values(&row).execute(conn)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update_scp(&self, scp_id: &str, patch: &ScpPatch) -> ScpArchiveResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        let scp_id = scp_id.to_string();
        let changes = ScpChangeset::from(patch);
        self.with_conn(move |conn| {
            let affected = diesel::update(scps::table.find(&scp_id))
                .set(&changes)
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_scp(&self, scp_id: &str) -> ScpArchiveResult<u64> {
        let scp_id = scp_id.to_string();
        self.with_conn(move |conn| {
            let affected = diesel::delete(scps::table.find(&scp_id)).execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn add_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        let scp_id = scp_id.to_string();
        let tale_id = *tale_id;
        self.with_conn(move |conn| {
            let affected = diesel::sql_query(ADD_TALE_REFERENCE)
                .bind::<Text, _>(&scp_id)
                .bind::<diesel::sql_types::Uuid, _>(tale_id)
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        let scp_id = scp_id.to_string();
        let tale_id = *tale_id;
        self.with_conn(move |conn| {
            let affected = diesel::sql_query(REMOVE_TALE_REFERENCE)
                .bind::<Text, _>(&scp_id)
                .bind::<diesel::sql_types::Uuid, _>(tale_id)
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self, tale_ids), fields(count = tale_ids.len()))]
    async fn replace_tale_references(
        &self,
        scp_id: &str,
        tale_ids: &BTreeSet<Uuid>,
    ) -> ScpArchiveResult<u64> {
        let scp_id = scp_id.to_string();
        let ids: Vec<Uuid> = tale_ids.iter().copied().collect();
        self.with_conn(move |conn| {
            let affected = diesel::update(scps::table.find(&scp_id))
                .set(scps::referencing_tale_ids.eq(ids))
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_tale(&self, id: &Uuid) -> ScpArchiveResult<Option<ScpTale<Uuid>>> {
        let id = *id;
        self.with_conn(move |conn| {
            let row = scp_tales::table
                .find(id)
                .select(TaleRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(ScpTale::from))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_tales(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<ScpTale<Uuid>>> {
        self.with_conn(move |conn| {
            let rows = scp_tales::table
                .order(scp_tales::seq.asc())
                .offset(as_offset(skip))
                .limit(as_offset(limit))
                .select(TaleRow::as_select())
                .load(conn)?;
            debug!(count = rows.len(), "Loaded tale page");
            Ok(rows.into_iter().map(ScpTale::from).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn count_tales(&self) -> ScpArchiveResult<u64> {
        self.with_conn(|conn| {
            let count: i64 = scp_tales::table.count().get_result(conn)?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    #[instrument(skip(self, tale), fields(refs = tale.scp_refs.len()))]
    async fn insert_tale(&self, tale: &NewTale) -> ScpArchiveResult<Uuid> {
        let row = NewTaleRow::new(Uuid::new_v4(), tale);
        self.with_conn(move |conn| {
            diesel::insert_into(scp_tales::table)
                .values(&row)
                .execute(conn)?;
            Ok(row.id)
        })
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update_tale(&self, id: &Uuid, patch: &TalePatch) -> ScpArchiveResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        let id = *id;
        let changes = TaleChangeset::from(patch);
        self.with_conn(move |conn| {
            let affected = diesel::update(scp_tales::table.find(id))
                .set(&changes)
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_tale(&self, id: &Uuid) -> ScpArchiveResult<u64> {
        let id = *id;
        self.with_conn(move |conn| {
            let affected = diesel::delete(scp_tales::table.find(id)).execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_scp_reference(&self, tale_id: &Uuid, scp_id: &str) -> ScpArchiveResult<u64> {
        let tale_id = *tale_id;
        let scp_id = scp_id.to_string();
        self.with_conn(move |conn| {
            let affected = diesel::sql_query(REMOVE_SCP_REFERENCE)
                .bind::<diesel::sql_types::Uuid, _>(tale_id)
                .bind::<Text, _>(&scp_id)
                .execute(conn)?;
            Ok(as_count(affected))
        })
        .await
    }
}
