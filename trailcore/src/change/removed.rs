use std::sync::Arc;

use serde::{Deserialize, Serialize};
use trailmeta::property::PropertyDescriptor;

use crate::{
    change::{ChangeHeader, require_printer},
    commit::CommitMetadata,
    ids::GlobalId,
    printer::ValuePrinter,
    snapshot::{Snapshot, Tracked},
    utils::error::ChangeResult,
};

/// Object removed from a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRemoved {
    header: ChangeHeader,
}

impl ObjectRemoved {
    /// A removal not yet attached to any commit.
    pub fn new(removed: GlobalId, removed_snapshot: Option<Snapshot>) -> Self {
        Self::with_commit(removed, removed_snapshot, None)
    }

    pub fn with_commit(
        removed: GlobalId,
        removed_snapshot: Option<Snapshot>,
        commit_metadata: Option<CommitMetadata>,
    ) -> Self {
        Self {
            header: ChangeHeader::new(removed, removed_snapshot, commit_metadata.map(Arc::new)),
        }
    }

    /// Removal of `object`, with its last state captured through `properties`.
    pub fn of<T: Tracked + ?Sized>(object: &T, properties: &[PropertyDescriptor]) -> Self {
        Self::new(object.global_id(), Some(Snapshot::capture(object, properties)))
    }

    #[inline]
    pub fn header(&self) -> &ChangeHeader {
        &self.header
    }

    pub fn affected_id(&self) -> &GlobalId {
        self.header.affected_id()
    }

    pub fn affected_snapshot(&self) -> Option<&Snapshot> {
        self.header.affected_snapshot()
    }

    pub fn commit_metadata(&self) -> Option<&CommitMetadata> {
        self.header.commit_metadata()
    }

    /// A copy of this removal attached to the given commit. `self` is left untouched.
    pub fn attach_commit(&self, metadata: impl Into<Arc<CommitMetadata>>) -> Self {
        Self {
            header: self.header.attached(metadata.into()),
        }
    }

    /// `object removed: <global id>`.
    ///
    /// The printer is required but not consulted: the message only depends on
    /// the identity of the removed object.
    pub fn pretty_print(&self, printer: Option<&dyn ValuePrinter>) -> ChangeResult<String> {
        require_printer(printer, "ObjectRemoved::pretty_print")?;
        Ok(format!("object removed: {}", self.affected_id().value()))
    }
}
