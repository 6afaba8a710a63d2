//! Post-conversation processing: mapping loosely-typed extractions onto
//! a strict form schema and assembling the submission payload.

mod matcher;
mod metadata;
mod processor;

pub use matcher::{match_field, FieldMatch, MatchStrategy};
pub use metadata::{
    AuthenticatedUser, ConversationMetadata, MappingReportRow, SchemaFieldSummary,
    TopicCoverageSnapshot,
};
pub use processor::{
    process, FormField, MappingError, ProcessOutcome, ProcessorOptions, SubmissionData,
};
