use super::ShardFormula;
use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document headed for a bulk request, reduced to what routing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

impl BulkDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            routing: None,
        }
    }

    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// The key the cluster hashes: explicit routing, else the id.
    pub fn routing_key(&self) -> &str {
        self.routing.as_deref().unwrap_or(&self.id)
    }
}

/// Buckets documents by destination shard, keeping input order per bucket.
pub fn group_documents<I>(formula: &ShardFormula, docs: I) -> Result<BTreeMap<u32, Vec<BulkDocument>>>
where
    I: IntoIterator<Item = BulkDocument>,
{
    let mut groups: BTreeMap<u32, Vec<BulkDocument>> = BTreeMap::new();
    for doc in docs {
        let shard = formula.shard_for(&doc.id, doc.routing_key())?;
        groups.entry(shard).or_default().push(doc);
    }
    Ok(groups)
}
