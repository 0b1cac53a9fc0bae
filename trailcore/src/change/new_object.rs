use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    change::{ChangeHeader, require_printer},
    commit::CommitMetadata,
    ids::GlobalId,
    printer::ValuePrinter,
    snapshot::Snapshot,
    utils::error::ChangeResult,
};

/// Object added to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewObject {
    header: ChangeHeader,
}

impl NewObject {
    pub fn new(created: GlobalId, created_snapshot: Option<Snapshot>) -> Self {
        Self::with_commit(created, created_snapshot, None)
    }

    pub fn with_commit(
        created: GlobalId,
        created_snapshot: Option<Snapshot>,
        commit_metadata: Option<CommitMetadata>,
    ) -> Self {
        Self {
            header: ChangeHeader::new(created, created_snapshot, commit_metadata.map(Arc::new)),
        }
    }

    #[inline]
    pub fn header(&self) -> &ChangeHeader {
        &self.header
    }

    pub fn affected_id(&self) -> &GlobalId {
        self.header.affected_id()
    }

    pub fn attach_commit(&self, metadata: impl Into<Arc<CommitMetadata>>) -> Self {
        Self {
            header: self.header.attached(metadata.into()),
        }
    }

    pub fn pretty_print(&self, printer: Option<&dyn ValuePrinter>) -> ChangeResult<String> {
        require_printer(printer, "NewObject::pretty_print")?;
        Ok(format!("new object: {}", self.affected_id().value()))
    }
}
