//! Change records
//!
//! A [`Change`] describes one difference detected between two versions of an
//! object graph. Every kind of change is a variant of the [`Change`] sum type
//! and shares a [`ChangeHeader`]: the identity of the affected object, an
//! optional snapshot of it and, once the change has been committed, the commit
//! metadata.
//!
//! Records are immutable values. Attaching commit metadata returns a new
//! record and leaves the original untouched, so records can be shared freely
//! across threads.
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::{
    commit::CommitMetadata,
    ids::GlobalId,
    printer::{PrettyValuePrinter, ValuePrinter},
    snapshot::Snapshot,
    utils::error::{ChangeError, ChangeResult},
};

pub mod new_object;
pub mod removed;

pub use new_object::NewObject;
pub use removed::ObjectRemoved;

/// Fields shared by every kind of change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeHeader {
    affected_id: GlobalId,
    affected_snapshot: Option<Snapshot>,
    commit_metadata: Option<Arc<CommitMetadata>>,
}

impl ChangeHeader {
    pub fn new(
        affected_id: GlobalId,
        affected_snapshot: Option<Snapshot>,
        commit_metadata: Option<Arc<CommitMetadata>>,
    ) -> Self {
        Self {
            affected_id,
            affected_snapshot,
            commit_metadata,
        }
    }

    #[inline]
    pub fn affected_id(&self) -> &GlobalId {
        &self.affected_id
    }

    #[inline]
    pub fn affected_snapshot(&self) -> Option<&Snapshot> {
        self.affected_snapshot.as_ref()
    }

    #[inline]
    pub fn commit_metadata(&self) -> Option<&CommitMetadata> {
        self.commit_metadata.as_deref()
    }

    /// Copy of this header carrying `metadata`.
    pub(crate) fn attached(&self, metadata: Arc<CommitMetadata>) -> Self {
        if let Some(previous) = &self.commit_metadata {
            warn!(
                "Change on {} re-attached from commit {} to commit {}",
                self.affected_id, previous.id, metadata.id
            );
        }
        Self {
            affected_id: self.affected_id.clone(),
            affected_snapshot: self.affected_snapshot.clone(),
            commit_metadata: Some(metadata),
        }
    }
}

/// Fails with [`ChangeError::InvalidArgument`] when no printer is supplied.
pub(crate) fn require_printer<'a>(
    printer: Option<&'a dyn ValuePrinter>,
    operation: &'static str,
) -> ChangeResult<&'a dyn ValuePrinter> {
    printer.ok_or(ChangeError::InvalidArgument {
        argument: "value_printer",
        operation,
    })
}

/// One detected change.
///
/// Further kinds (value changes, collection changes, ...) are added as new
/// variants; the enum is `#[non_exhaustive]` so downstream matches keep a
/// fallback arm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIs, EnumTryAs)]
#[non_exhaustive]
pub enum Change {
    NewObject(NewObject),
    ObjectRemoved(ObjectRemoved),
}

impl From<NewObject> for Change {
    fn from(value: NewObject) -> Self {
        Change::NewObject(value)
    }
}

impl From<ObjectRemoved> for Change {
    fn from(value: ObjectRemoved) -> Self {
        Change::ObjectRemoved(value)
    }
}

impl Change {
    pub fn header(&self) -> &ChangeHeader {
        match self {
            Change::NewObject(change) => change.header(),
            Change::ObjectRemoved(change) => change.header(),
        }
    }

    pub fn affected_id(&self) -> &GlobalId {
        self.header().affected_id()
    }

    pub fn affected_snapshot(&self) -> Option<&Snapshot> {
        self.header().affected_snapshot()
    }

    pub fn commit_metadata(&self) -> Option<&CommitMetadata> {
        self.header().commit_metadata()
    }

    /// A copy of this change attached to the given commit.
    pub fn attach_commit(&self, metadata: impl Into<Arc<CommitMetadata>>) -> Self {
        match self {
            Change::NewObject(change) => change.attach_commit(metadata).into(),
            Change::ObjectRemoved(change) => change.attach_commit(metadata).into(),
        }
    }

    /// Human-readable description of this change.
    pub fn pretty_print(&self, printer: Option<&dyn ValuePrinter>) -> ChangeResult<String> {
        match self {
            Change::NewObject(change) => change.pretty_print(printer),
            Change::ObjectRemoved(change) => change.pretty_print(printer),
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .pretty_print(Some(&PrettyValuePrinter))
            .map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}
