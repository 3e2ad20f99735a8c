//! Template storage backed by a directory of `<id>.html` files

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use super::types::{is_valid_template_id, Template, TemplateError, TemplateResult};
use crate::config::TemplateConfig;
use crate::metrics::TemplateMetrics;

/// Read-only template cache.
///
/// Templates are loaded and parsed on first use and kept for the life of the
/// process. Malformed templates are never cached.
pub struct TemplateStore {
    dir: PathBuf,
    templates: DashMap<String, Arc<Template>>,
}

impl TemplateStore {
    /// Create a store reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            templates: DashMap::new(),
        }
    }

    pub fn from_config(config: &TemplateConfig) -> Self {
        Self::new(config.dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a template identifier to its parsed template
    pub async fn resolve(&self, id: &str) -> TemplateResult<Arc<Template>> {
        if let Some(template) = self.templates.get(id) {
            return Ok(template.clone());
        }

        if !is_valid_template_id(id) {
            return Err(TemplateError::NotFound(id.to_string()));
        }

        let path = self.dir.join(format!("{}.html", id));
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                TemplateMetrics::record_load("not_found");
                return Err(TemplateError::NotFound(id.to_string()));
            }
            Err(e) => {
                TemplateMetrics::record_load("unreadable");
                return Err(TemplateError::Unreadable {
                    id: id.to_string(),
                    source: e,
                });
            }
        };

        let template = match Template::parse(id, source) {
            Ok(template) => Arc::new(template),
            Err(e) => {
                TemplateMetrics::record_load("malformed");
                return Err(e);
            }
        };

        TemplateMetrics::record_load("loaded");
        tracing::debug!(template_id = %id, path = %path.display(), "Template loaded");

        // A concurrent load may have won; keep whichever landed first
        let cached = self
            .templates
            .entry(id.to_string())
            .or_insert(template)
            .clone();
        Ok(cached)
    }

    /// Register template text directly, bypassing the filesystem
    pub fn insert(&self, id: &str, source: impl Into<String>) -> TemplateResult<()> {
        if !is_valid_template_id(id) {
            return Err(TemplateError::NotFound(id.to_string()));
        }
        let template = Template::parse(id, source)?;
        self.templates.insert(id.to_string(), Arc::new(template));
        Ok(())
    }

    /// Load every listed template, failing on the first defect
    pub async fn warm(&self, ids: &[&str]) -> TemplateResult<()> {
        for id in ids {
            self.resolve(id).await?;
        }
        tracing::info!(count = ids.len(), dir = %self.dir.display(), "Templates warmed");
        Ok(())
    }

    /// Check if a template is cached
    pub fn is_cached(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Number of cached templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }
}

/// Create an Arc-wrapped template store
pub fn create_template_store(config: &TemplateConfig) -> Arc<TemplateStore> {
    Arc::new(TemplateStore::from_config(config))
}
