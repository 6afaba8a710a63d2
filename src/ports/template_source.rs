//! Template Source Port - Interface for organization template storage.
//!
//! Organizations author their own conversation templates; this port
//! fetches them in the wire shape
//! [`TemplateRegistry::load_org_templates`] consumes.
//!
//! [`TemplateRegistry::load_org_templates`]:
//! crate::domain::templates::TemplateRegistry::load_org_templates

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::templates::StoredTemplate;

/// Failure modes of the template backend.
#[derive(Debug, Error)]
pub enum TemplateSourceError {
    #[error("template backend unavailable: {0}")]
    Unavailable(String),

    #[error("stored template is malformed: {0}")]
    Malformed(String),
}

/// Port for fetching an organization's authored templates.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Returns the organization's templates, enablement and priority
    /// included. Disabled templates are returned too; the registry
    /// keeps them listed but unresolvable.
    async fn active_templates(&self, org_id: &str)
        -> Result<Vec<StoredTemplate>, TemplateSourceError>;
}
