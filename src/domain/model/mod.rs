//! Topic and schema model.
//!
//! Pure data contracts shared by the prompt strategies, the state
//! machine, the template registry, and the mapping processor. The only
//! behavior here is construction-time validation.

mod config;
mod limits;
mod persona;
mod schema;
mod topic;

pub use config::ConversationalFormConfig;
pub use limits::ConversationLimits;
pub use persona::{ConversationPersona, PersonaStyle};
pub use schema::{validate_schema, ExtractionField, ExtractionSchema, FieldType, FieldValidation};
pub use topic::{validate_topics, ConversationTopic, DepthTarget, TopicCoverage, TopicPriority};
