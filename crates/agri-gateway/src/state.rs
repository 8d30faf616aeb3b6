//! Shared read-only state, built once before the listener binds.

use agri_core::{DataPaths, KnowledgeBase, LabelAliases, ModelRegistry, NutrientTable};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    /// `None` when the fertilizer CSV could not be read.
    pub nutrients: Option<Arc<NutrientTable>>,
    /// `None` when the disease knowledge base could not be read.
    pub knowledge_base: Option<Arc<KnowledgeBase>>,
    pub aliases: Arc<LabelAliases>,
}

impl AppState {
    /// Load every artifact and reference file. Failures are logged and leave
    /// the corresponding piece absent; startup continues.
    pub fn load(paths: &DataPaths) -> Self {
        let registry = ModelRegistry::from_paths(paths);

        let table_path = paths.data(&paths.fertilizer_table);
        let nutrients = match NutrientTable::load(&table_path) {
            Ok(table) => {
                tracing::info!(path = %table_path.display(), crops = table.len(), "Fertilizer table loaded");
                Some(Arc::new(table))
            }
            Err(e) => {
                tracing::error!(path = %table_path.display(), error = %e, "Fertilizer table unavailable");
                None
            }
        };

        let kb_path = paths.data(&paths.disease_knowledge_base);
        let knowledge_base = match KnowledgeBase::load(&kb_path) {
            Ok(kb) => {
                tracing::info!(path = %kb_path.display(), records = kb.len(), "Disease knowledge base loaded");
                Some(Arc::new(kb))
            }
            Err(e) => {
                tracing::warn!(path = %kb_path.display(), error = %e, "Disease knowledge base unavailable; cause/cure will be omitted");
                None
            }
        };

        let aliases = match &paths.label_aliases {
            Some(file) => {
                let alias_path = paths.data(file);
                LabelAliases::with_overrides(&alias_path).unwrap_or_else(|e| {
                    tracing::error!(path = %alias_path.display(), error = %e, "Label alias file rejected; using built-in table");
                    LabelAliases::default()
                })
            }
            None => LabelAliases::default(),
        };

        Self {
            registry: Arc::new(registry),
            nutrients,
            knowledge_base,
            aliases: Arc::new(aliases),
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            nutrients: None,
            knowledge_base: None,
            aliases: Arc::new(LabelAliases::default()),
        }
    }

    pub fn with_nutrients(mut self, table: NutrientTable) -> Self {
        self.nutrients = Some(Arc::new(table));
        self
    }

    pub fn with_knowledge_base(mut self, kb: KnowledgeBase) -> Self {
        self.knowledge_base = Some(Arc::new(kb));
        self
    }
}
