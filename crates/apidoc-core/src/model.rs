//! The document model handed to renderers.

use crate::diagnostics::Diagnostics;
use crate::grouper::VersionedEndpoint;
use serde::Serialize;

/// Versioned endpoints sorted by group then name, plus everything that was
/// reported on the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentModel {
    pub endpoints: Vec<VersionedEndpoint>,
    pub diagnostics: Diagnostics,
}

impl DocumentModel {
    pub fn get(&self, group: &str, name: &str) -> Option<&VersionedEndpoint> {
        self.endpoints
            .binary_search_by(|e| (e.group.as_str(), e.name.as_str()).cmp(&(group, name)))
            .ok()
            .map(|i| &self.endpoints[i])
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        let mut last: Option<&str> = None;
        self.endpoints.iter().filter_map(move |e| {
            let group = e.group.as_str();
            (last != Some(group)).then(|| {
                last = Some(group);
                group
            })
        })
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}
