//! The template registry: an explicit, owned collection of templates
//! with built-in and organization-supplied entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use super::builtin::built_in_templates;
use super::template::{AppliedTemplate, ConfigOverrides, ConversationTemplate, TemplateCategory};

/// Failures raised by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template '{0}' not found")]
    NotFound(String),
}

/// A template as persisted by an organization, with its listing
/// priority and enablement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub template: ConversationTemplate,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Criteria for listing templates. Default matches everything enabled.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub category: Option<TemplateCategory>,
    /// Matches templates carrying this metadata tag.
    pub tag: Option<String>,
    /// Restrict the listing to built-in templates.
    pub built_in_only: bool,
    /// Include disabled templates in the listing.
    pub include_disabled: bool,
}

/// Outcome of loading a batch of organization templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Ids skipped because they collide with a built-in.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    template: ConversationTemplate,
    priority: i32,
    enabled: bool,
    built_in: bool,
    /// Insertion order, used to break priority ties deterministically.
    seq: u64,
}

/// Owned, mutable collection of conversation templates.
///
/// Callers construct a registry (usually via [`with_built_ins`]) and
/// pass references where template resolution is needed; there is no
/// process-wide instance.
///
/// [`with_built_ins`]: TemplateRegistry::with_built_ins
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: HashMap<String, RegistryEntry>,
    next_seq: u64,
}

impl TemplateRegistry {
    /// Creates an empty registry with no templates at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in templates.
    pub fn with_built_ins() -> Self {
        let mut registry = Self::new();
        registry.initialize_built_ins();
        registry
    }

    /// Seeds the built-in templates. Idempotent: built-ins already
    /// present are left untouched, preserving any enablement changes.
    pub fn initialize_built_ins(&mut self) {
        for stored in built_in_templates() {
            if self.entries.contains_key(&stored.template.id) {
                continue;
            }
            self.insert(stored.template.clone(), stored.priority, stored.enabled, true);
        }
    }

    fn insert(
        &mut self,
        template: ConversationTemplate,
        priority: i32,
        enabled: bool,
        built_in: bool,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            template.id.clone(),
            RegistryEntry {
                template,
                priority,
                enabled,
                built_in,
                seq,
            },
        );
    }

    /// Registers (or replaces) a template. Replacing logs a warning so
    /// accidental id reuse is visible.
    pub fn register(&mut self, template: ConversationTemplate, priority: i32) {
        self.register_with_enabled(template, priority, true);
    }

    /// [`register`](Self::register) with explicit enablement.
    pub fn register_with_enabled(
        &mut self,
        template: ConversationTemplate,
        priority: i32,
        enabled: bool,
    ) {
        if let Some(existing) = self.entries.get(&template.id) {
            warn!(
                template_id = %template.id,
                replaced_built_in = existing.built_in,
                "replacing already-registered template"
            );
        }
        self.insert(template, priority, enabled, false);
    }

    /// Looks up an enabled template by id.
    pub fn get(&self, id: &str) -> Option<&ConversationTemplate> {
        self.entries
            .get(id)
            .filter(|e| e.enabled)
            .map(|e| &e.template)
    }

    /// Whether a template id names a built-in.
    pub fn is_built_in(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|e| e.built_in)
    }

    /// Lists templates matching the filter, highest priority first.
    /// Ties preserve registration order.
    pub fn get_all(&self, filter: &TemplateFilter) -> Vec<&ConversationTemplate> {
        let mut matched: Vec<&RegistryEntry> = self
            .entries
            .values()
            .filter(|e| filter.include_disabled || e.enabled)
            .filter(|e| !filter.built_in_only || e.built_in)
            .filter(|e| {
                filter
                    .category
                    .is_none_or(|category| e.template.category == category)
            })
            .filter(|e| {
                filter
                    .tag
                    .as_ref()
                    .is_none_or(|tag| e.template.metadata.tags.iter().any(|t| t == tag))
            })
            .collect();

        matched.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        matched.into_iter().map(|e| &e.template).collect()
    }

    /// Enables or disables a template without removing it.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), TemplateError> {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.enabled = enabled;
                Ok(())
            }
            None => Err(TemplateError::NotFound(id.to_string())),
        }
    }

    /// Instantiates a config from a template, applying any overrides.
    pub fn apply(
        &self,
        id: &str,
        overrides: &ConfigOverrides,
    ) -> Result<AppliedTemplate, TemplateError> {
        let template = self
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        let mut config = template.to_config();
        overrides.apply_to(&mut config);

        Ok(AppliedTemplate {
            config,
            template_id: template.id.clone(),
            has_customizations: !overrides.is_empty(),
        })
    }

    /// Loads organization templates. Entries whose id collides with a
    /// built-in are skipped with a warning; built-ins always win.
    pub fn load_org_templates(&mut self, stored: &[StoredTemplate]) -> LoadReport {
        let mut report = LoadReport::default();
        for item in stored {
            if self.is_built_in(&item.template.id) {
                warn!(
                    template_id = %item.template.id,
                    "organization template collides with a built-in, skipping"
                );
                report.skipped.push(item.template.id.clone());
                continue;
            }
            self.insert(item.template.clone(), item.priority, item.enabled, false);
            report.loaded += 1;
        }
        report
    }

    /// Removes every non-built-in template.
    pub fn unload_org_templates(&mut self) {
        self.entries.retain(|_, e| e.built_in);
    }

    /// Total number of templates, including disabled ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
