use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque handle to a deployable artifact.
///
/// The scheduling core never inspects the handle; backends decide how to
/// materialize the artifact it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    uri: String,
}

impl ResourceHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Package coordinates addressing a deployable artifact in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: Option<String>,
    pub version: String,
    pub extension: String,
}

impl fmt::Display for ArtifactCoordinates {
    /// `group:artifact:extension[:classifier]:version`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Resolves package coordinates to a byte-addressable resource.
///
/// Kept separate from the `Scheduler` capability: the scheduling core only
/// needs a handle, not the fetching machinery behind it.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, coordinates: &ArtifactCoordinates) -> Result<ResourceHandle>;
}
