//! Artifact index for one scan.

use std::collections::HashMap;

use socket_api::models::Artifact;

/// Lookup of a scan's artifacts by id.
///
/// Artifact ids are unique within a scan response. Should the API ever
/// repeat one, the first occurrence wins and the rest are reported.
#[derive(Debug)]
pub struct ArtifactIndex<'a> {
    ordered: Vec<&'a Artifact>,
    by_id: HashMap<&'a str, &'a Artifact>,
    duplicates: usize,
}

impl<'a> ArtifactIndex<'a> {
    pub fn new(artifacts: &'a [Artifact]) -> Self {
        let mut ordered = Vec::with_capacity(artifacts.len());
        let mut by_id = HashMap::with_capacity(artifacts.len());
        let mut duplicates = 0;

        for artifact in artifacts {
            if artifact.id.is_empty() {
                ordered.push(artifact);
                continue;
            }
            if by_id.contains_key(artifact.id.as_str()) {
                duplicates += 1;
                tracing::warn!(
                    id = %artifact.id,
                    package = %artifact,
                    "duplicate artifact id in scan, ignoring"
                );
                continue;
            }
            by_id.insert(artifact.id.as_str(), artifact);
            ordered.push(artifact);
        }

        Self {
            ordered,
            by_id,
            duplicates,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Artifact> {
        self.by_id.get(id).copied()
    }

    /// Unique artifacts in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Artifact> + '_ {
        self.ordered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn direct_count(&self) -> usize {
        self.ordered.iter().filter(|a| a.direct).count()
    }

    pub fn transitive_count(&self) -> usize {
        self.len() - self.direct_count()
    }

    /// Direct dependencies that pulled `artifact` in, as `name@version`.
    /// Ids missing from the scan are returned as-is.
    pub fn ancestors(&self, artifact: &Artifact) -> Vec<String> {
        artifact
            .top_level_ancestors
            .iter()
            .map(|id| match self.get(id) {
                Some(a) => format!("{}@{}", a.full_name(), a.version),
                None => id.clone(),
            })
            .collect()
    }
}
