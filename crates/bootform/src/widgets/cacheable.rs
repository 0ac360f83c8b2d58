//! A select whose options are fetched lazily, with optional output caching.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{SelectWidget, Widget};
use crate::cstruct::Cstruct;
use crate::error::{FormError, Result};
use crate::field::Field;

/// Produces `(value, label)` pairs at render time.
pub type ValuesSource = Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// Rendered widget output keyed by cache key.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: Mutex<HashMap<String, String>>,
}

impl RenderCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached markup for `key`, rendering and storing it on a miss.
    pub fn get_or_render<F>(&self, key: &str, render: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        {
            let entries = self
                .entries
                .lock()
                .map_err(|_| FormError::Render("render cache lock poisoned".to_string()))?;
            if let Some(hit) = entries.get(key) {
                debug!(key, "render cache hit");
                return Ok(hit.clone());
            }
        }

        debug!(key, "render cache miss");
        let markup = render()?;
        self.entries
            .lock()
            .map_err(|_| FormError::Render("render cache lock poisoned".to_string()))?
            .insert(key.to_string(), markup.clone());
        Ok(markup)
    }

    /// Drops every entry.
    pub fn invalidate(&self) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| FormError::Render("render cache lock poisoned".to_string()))?
            .clear();
        Ok(())
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select widget whose choices are static values, then `get_values()`,
/// then appended values. Nothing is fetched until the widget renders.
#[derive(Clone)]
pub struct CacheableSelectWidget {
    /// Values listed first.
    pub values: Vec<(String, String)>,
    /// Values listed last.
    pub append_values: Vec<(String, String)>,
    get_values: Option<ValuesSource>,
    cache: Option<Arc<RenderCache>>,
    cache_key_args: Vec<String>,
    blank_label: Option<String>,
}

impl std::fmt::Debug for CacheableSelectWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheableSelectWidget")
            .field("values", &self.values)
            .field("append_values", &self.append_values)
            .field("cache_key_args", &self.cache_key_args)
            .finish_non_exhaustive()
    }
}

impl Default for CacheableSelectWidget {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            append_values: Vec::new(),
            get_values: None,
            cache: None,
            cache_key_args: Vec::new(),
            blank_label: SelectWidget::default().blank_label,
        }
    }
}

impl CacheableSelectWidget {
    /// Creates a widget with no values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the values fetched at render time.
    #[must_use]
    pub fn get_values<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    {
        self.get_values = Some(Arc::new(source));
        self
    }

    /// Sets the static leading values.
    #[must_use]
    pub fn values(mut self, values: Vec<(String, String)>) -> Self {
        self.values = values;
        self
    }

    /// Sets the trailing values.
    #[must_use]
    pub fn append_values(mut self, values: Vec<(String, String)>) -> Self {
        self.append_values = values;
        self
    }

    /// Caches rendered output in `cache`; `key_args` vary the key.
    ///
    /// Without key args the output is never cached.
    #[must_use]
    pub fn cached<I, S>(mut self, cache: Arc<RenderCache>, key_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache = Some(cache);
        self.cache_key_args = key_args.into_iter().map(Into::into).collect();
        self
    }

    /// Disables the blank option.
    #[must_use]
    pub fn no_blank(mut self) -> Self {
        self.blank_label = None;
        self
    }

    /// Returns the full list of choices.
    pub fn dynamic_values(&self) -> Vec<(String, String)> {
        let mut values = self.values.clone();
        if let Some(source) = &self.get_values {
            values.extend(source());
        }
        values.extend(self.append_values.iter().cloned());
        values
    }

    fn cache_key(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let value = serde_json::to_string(cstruct)?;
        let mut parts = vec![self.template().to_string(), field.name.clone(), value];
        parts.extend(self.cache_key_args.iter().cloned());
        Ok(parts.join(":"))
    }

    fn render_select(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let select = SelectWidget {
            choices: self.dynamic_values(),
            blank_label: self.blank_label.clone(),
        };
        select.serialize(field, cstruct)
    }
}

impl Widget for CacheableSelectWidget {
    fn template(&self) -> &str {
        "select"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        match &self.cache {
            Some(cache) if !self.cache_key_args.is_empty() => {
                let key = self.cache_key(field, cstruct)?;
                cache.get_or_render(&key, || self.render_select(field, cstruct))
            }
            _ => self.render_select(field, cstruct),
        }
    }
}
