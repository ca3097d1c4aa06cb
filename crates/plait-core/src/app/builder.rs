//! CoreBuilder - wiring with fail-fast validation.
//!
//! Every port has an in-process default, so `Core::builder().build()` gives
//! a working core. Configuration is validated before anything is built.

use std::sync::Arc;

use tracing::info;

use super::runtime::Core;
use super::graph::TaskGraph;
use crate::admission::AdmissionGate;
use crate::config::{ConfigError, CoreConfig};
use crate::graph::InMemoryTaskStore;
use crate::ports::{Clock, IdGenerator, Scorer, SequentialIdGenerator, SystemClock, TaskStore};
use crate::scoring::ScoreEngine;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("an id generator was supplied together with a custom store; the store allocates its own ids")]
    IdsWithCustomStore,
}

#[derive(Default)]
pub struct CoreBuilder {
    config: CoreConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    scorer: Option<Arc<dyn Scorer>>,
    store: Option<Arc<dyn TaskStore>>,
}

impl CoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Id source for the built-in in-memory store.
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replace the score engine (e.g. with a remote scorer).
    pub fn scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Core, BuildError> {
        self.config.validate()?;

        let store = match (self.store, self.ids) {
            (Some(_), Some(_)) => return Err(BuildError::IdsWithCustomStore),
            (Some(store), None) => store,
            (None, ids) => {
                let ids = ids.unwrap_or_else(|| Arc::new(SequentialIdGenerator::new()));
                Arc::new(InMemoryTaskStore::new(ids)) as Arc<dyn TaskStore>
            }
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let scorer = self
            .scorer
            .unwrap_or_else(|| Arc::new(ScoreEngine::new(self.config.scoring.clone())));

        let graph = TaskGraph::new(store, scorer, Arc::clone(&clock), self.config.scoring.timeout());
        let gate = AdmissionGate::new(self.config.admission.clone());

        info!(
            general_limit = self.config.admission.general.limit,
            auth_limit = self.config.admission.auth.limit,
            scoring_timeout_ms = self.config.scoring.timeout_ms,
            "core ready"
        );
        Ok(Core::new(gate, graph, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreConfig;

    #[test]
    fn defaults_build() {
        assert!(CoreBuilder::new().build().is_ok());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = CoreConfig {
            scoring: ScoreConfig {
                horizon_hours: 0,
                ..ScoreConfig::default()
            },
            ..CoreConfig::default()
        };
        let result = CoreBuilder::new().config(config).build();
        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::Invalid {
                field: "scoring.horizon_hours",
                ..
            }))
        ));
    }

    #[test]
    fn ids_with_custom_store_is_rejected() {
        let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIdGenerator::new());
        let store = Arc::new(InMemoryTaskStore::new(Arc::clone(&ids)));
        let result = CoreBuilder::new().store(store).ids(ids).build();
        assert!(matches!(result, Err(BuildError::IdsWithCustomStore)));
    }
}
