use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::error::RunError;
use crate::languages::LanguageRegistry;
use crate::widget::{Widget, WidgetConfig};

pub const DEFAULT_MAX_WIDGETS: usize = 1024;

/// All live widgets of the process, keyed by id
///
/// Widgets stay until they are removed, so the store holds at most
/// `max_widgets` of them and refuses to create more.
pub struct WidgetStore {
    widgets: RwLock<HashMap<u32, Arc<Widget>>>,
    next_id: AtomicU32,
    max_widgets: usize,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_WIDGETS)
    }

    pub fn with_limit(max_widgets: usize) -> Self {
        Self {
            widgets: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(0),
            max_widgets,
        }
    }

    /// Creates a widget; fails if the language is not in the registry or the
    /// store is full
    pub fn create(
        &self,
        config: WidgetConfig,
        languages: &LanguageRegistry,
    ) -> Result<Arc<Widget>, RunError> {
        let language = languages.resolve(&config.language)?.clone();
        let mut widgets = self.widgets.write();
        if widgets.len() >= self.max_widgets {
            return Err(RunError::StoreFull {
                limit: self.max_widgets,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let widget = Arc::new(Widget::new(id, config, language));
        widgets.insert(id, widget.clone());
        Ok(widget)
    }

    pub fn get(&self, id: u32) -> Option<Arc<Widget>> {
        self.widgets.read().get(&id).cloned()
    }

    pub fn remove(&self, id: u32) -> Option<Arc<Widget>> {
        self.widgets.write().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.read().is_empty()
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(language: &str) -> WidgetConfig {
        WidgetConfig {
            code: "print(1)".to_string(),
            language: language.to_string(),
            title: None,
            stdin: None,
        }
    }

    #[test]
    fn test_create_get_remove() {
        let store = WidgetStore::new();
        let languages = LanguageRegistry::builtin();

        let a = store.create(config("python"), &languages).unwrap();
        let b = store.create(config("go"), &languages).unwrap();
        assert_eq!((a.id, b.id), (0, 1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().language.display_name, "Go");

        assert!(store.remove(0).is_some());
        assert!(store.get(0).is_none());
        assert!(store.remove(0).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_full_store_rejects_until_removal() {
        let store = WidgetStore::with_limit(2);
        let languages = LanguageRegistry::builtin();

        store.create(config("python"), &languages).unwrap();
        store.create(config("python"), &languages).unwrap();
        let err = store.create(config("python"), &languages).unwrap_err();
        assert_eq!(err, RunError::StoreFull { limit: 2 });
        assert_eq!(store.len(), 2);

        store.remove(0).unwrap();
        let widget = store.create(config("python"), &languages).unwrap();
        assert_eq!(widget.id, 2);
    }

    #[test]
    fn test_unknown_language_creates_nothing() {
        let store = WidgetStore::new();
        let err = store
            .create(config("cobol"), &LanguageRegistry::builtin())
            .unwrap_err();
        assert_eq!(err, RunError::UnknownLanguage("cobol".to_string()));
        assert!(store.is_empty());
    }
}
