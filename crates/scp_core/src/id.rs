//! Opaque document identifiers.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier of a tale document.
///
/// The reference protocol only needs identifiers to be comparable and
/// printable, so stores are free to pick their own scheme (UUIDs for
/// Postgres, caller-assigned strings for older deployments).
pub trait DocumentId:
    Clone + Eq + Ord + Hash + Debug + Display + Send + Sync + 'static
{
}

impl<T> DocumentId for T where
    T: Clone + Eq + Ord + Hash + Debug + Display + Send + Sync + 'static
{
}
