//! Coordinate-to-URI resolver for test fixtures.
//!
//! Real deployments resolve package coordinates against an artifact
//! repository and hand back something byte-addressable. Conformance
//! fixtures only need a stable opaque handle, so this resolver formats the
//! coordinates into a URI without fetching anything.

use async_trait::async_trait;
use schedcheck_core::{ArtifactCoordinates, ResourceHandle, ResourceResolver, Result};

pub struct CoordinateResolver {
    scheme: String,
}

impl CoordinateResolver {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }
}

impl Default for CoordinateResolver {
    fn default() -> Self {
        Self::new("artifact")
    }
}

#[async_trait]
impl ResourceResolver for CoordinateResolver {
    async fn resolve(&self, coordinates: &ArtifactCoordinates) -> Result<ResourceHandle> {
        Ok(ResourceHandle::new(format!("{}://{}", self.scheme, coordinates)))
    }
}
