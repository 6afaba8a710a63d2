//! Conversation templates: reusable, versioned starting points for
//! conversational form configs, and the registry that serves them.

mod builtin;
mod registry;
mod template;

pub use builtin::built_in_templates;
pub use registry::{LoadReport, StoredTemplate, TemplateError, TemplateFilter, TemplateRegistry};
pub use template::{
    AppliedTemplate, ConfigOverrides, ConversationTemplate, StrategyKind, TemplateCategory,
    TemplateMetadata,
};
