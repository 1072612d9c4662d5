//! Generation pipeline.
//!
//! One run fetches the schema, builds the namespace tree and the runtime
//! service object, refreshes `eps.json`, fetches the dictionary keys,
//! synthesizes and formats the declaration file, and finally swaps the new
//! [`GenerationContext`] in. Stages run in sequence; each consumes the
//! previous stage's output.
//!
//! Overlapping triggers coalesce: a call to [`EpsGenerator::generate`]
//! while a run is in flight returns [`GenerationOutcome::Coalesced`] and
//! the in-flight run repeats once afterwards.
//!
//! # Examples
//!
//! ```no_run
//! use epsgen_codegen::pipeline::{EpsGenerator, GenerationOutcome};
//! use epsgen_core::GeneratorConfig;
//! use epsgen_schema::HttpTransport;
//!
//! # async fn example() -> epsgen_core::Result<()> {
//! let generator = EpsGenerator::new(GeneratorConfig::default(), HttpTransport::new())?;
//!
//! if let GenerationOutcome::Completed(report) = generator.generate().await? {
//!     println!("{} entities, written: {}", report.entity_count, report.declaration_written);
//! }
//! # Ok(())
//! # }
//! ```

use crate::format::{CodeFormatter, TabFormatter};
use crate::mapping::TypeMapper;
use crate::report::Collision;
use crate::service_code::ServiceCode;
use crate::synth::TypeSynthesizer;
use crate::tree::NamespaceTree;
use chrono::{DateTime, Utc};
use epsgen_core::{GeneratorConfig, Result, Target};
use epsgen_schema::cache::write_cache;
use epsgen_schema::fs::write_if_changed;
use epsgen_schema::{
    Entity, SchemaNormalizer, SchemaOrigin, SchemaTransport, fetch_dict_keys,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

/// State produced by the last completed run.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Normalized entity list.
    pub entities: Vec<Entity>,
    /// Namespace tree built from `entities`.
    pub tree: NamespaceTree,
    /// Runtime service object.
    pub service_code: ServiceCode,
}

/// Summary of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Target platform.
    pub target: Target,
    /// Schema URL requested.
    pub schema_url: String,
    /// Where the entity list came from.
    pub origin: SchemaOrigin,
    /// Number of entities after normalization.
    pub entity_count: usize,
    /// Whether `eps.json` changed on disk.
    pub cache_updated: bool,
    /// Path of the declaration file.
    pub declaration_path: PathBuf,
    /// Whether the declaration file changed on disk.
    pub declaration_written: bool,
    /// Names dropped during synthesis.
    pub collisions: Vec<Collision>,
    /// Type names referenced by the runtime service object.
    pub service_types: Vec<String>,
    /// Completion time.
    pub generated_at: DateTime<Utc>,
}

/// Result of [`EpsGenerator::generate`].
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// The run finished. Holds the report of the last repetition.
    Completed(GenerationReport),
    /// Another run was in flight and will repeat for this trigger.
    Coalesced,
    /// Generation is disabled in the configuration.
    Disabled,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const RUNNING_PENDING: u8 = 2;

/// Single-slot re-entrancy guard.
#[derive(Debug, Default)]
struct RunGate {
    state: AtomicU8,
}

impl RunGate {
    /// `true` when the caller should run; otherwise marks a pending rerun.
    fn try_acquire(&self) -> bool {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                Some(if state == IDLE { RUNNING } else { RUNNING_PENDING })
            });
        previous == Ok(IDLE)
    }

    /// `true` when the gate is released; `false` when a trigger arrived
    /// during the run and the caller must run again.
    fn release(&self) -> bool {
        if self
            .state
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return true;
        }
        self.state.store(RUNNING, Ordering::Release);
        false
    }

    fn reset(&self) {
        self.state.store(IDLE, Ordering::Release);
    }
}

/// Drives generation for one configuration.
#[derive(Debug)]
pub struct EpsGenerator<T> {
    config: GeneratorConfig,
    transport: Arc<T>,
    normalizer: SchemaNormalizer<Arc<T>>,
    synthesizer: TypeSynthesizer,
    formatter: Box<dyn CodeFormatter>,
    context: RwLock<Arc<GenerationContext>>,
    gate: RunGate,
}

impl<T: SchemaTransport> EpsGenerator<T> {
    /// Creates a generator with the configured mapping rules and the
    /// default formatter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the templates
    /// fail to register.
    pub fn new(config: GeneratorConfig, transport: T) -> Result<Self> {
        let mapper = TypeMapper::from_config(&config.eps.mapping);
        Self::with_mapper(config, transport, mapper)
    }

    /// Creates a generator with an explicit type mapper, for custom
    /// predicate rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the templates
    /// fail to register.
    pub fn with_mapper(config: GeneratorConfig, transport: T, mapper: TypeMapper) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(transport);
        Ok(Self {
            normalizer: SchemaNormalizer::new(Arc::clone(&transport), &config),
            synthesizer: TypeSynthesizer::new(config.target, mapper)?,
            formatter: Box::new(TabFormatter),
            context: RwLock::new(Arc::new(GenerationContext::default())),
            gate: RunGate::default(),
            transport,
            config,
        })
    }

    /// Replaces the output formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl CodeFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Path of the declaration file.
    #[must_use]
    pub fn declaration_path(&self) -> PathBuf {
        self.config
            .dist_dir()
            .join(self.config.target.declaration_file_name())
    }

    /// Context of the last completed run; empty before the first.
    #[must_use]
    pub fn context(&self) -> Arc<GenerationContext> {
        let guard = self.context.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Runs the pipeline, or coalesces into the run already in flight.
    ///
    /// # Errors
    ///
    /// Returns an error for brace-matching failures, a missing Service
    /// block, template failures, or when `eps.json` or the declaration
    /// file cannot be written. Schema and dictionary unavailability are
    /// not errors.
    pub async fn generate(&self) -> Result<GenerationOutcome> {
        if !self.config.eps.enable {
            debug!("eps generation disabled");
            return Ok(GenerationOutcome::Disabled);
        }
        if !self.gate.try_acquire() {
            debug!("generation in flight, trigger coalesced");
            return Ok(GenerationOutcome::Coalesced);
        }

        loop {
            match self.run_once().await {
                Ok(report) => {
                    if self.gate.release() {
                        return Ok(GenerationOutcome::Completed(report));
                    }
                    debug!("triggers arrived during the run, regenerating");
                }
                Err(e) => {
                    self.gate.reset();
                    return Err(e);
                }
            }
        }
    }

    async fn run_once(&self) -> Result<GenerationReport> {
        let fetched = self.normalizer.fetch().await;
        let entities = fetched.entities;
        let target = self.config.target;

        let tree = NamespaceTree::build(&entities, &self.config.namespace_id());
        let service_code = ServiceCode::build(&tree, &entities);

        let cache_updated = write_cache(self.normalizer.cache_path(), &entities, target).await?;

        let dict_keys = fetch_dict_keys(
            self.transport.as_ref(),
            &self.config.dict_url(),
            self.config.request_timeout(),
        )
        .await;

        let synthesized = self
            .synthesizer
            .synthesize(&entities, &tree, dict_keys.as_deref())?;

        let declaration_path = self.declaration_path();
        let declaration_written = if entities.is_empty() {
            debug!("entity list empty, {} left untouched", declaration_path.display());
            false
        } else {
            match self.formatter.format(&synthesized.text) {
                Ok(formatted) => write_if_changed(&declaration_path, &formatted).await?,
                Err(e) => {
                    error!("formatting {} failed, write skipped: {}", declaration_path.display(), e);
                    false
                }
            }
        };

        if declaration_written {
            info!("{} updated", declaration_path.display());
        }

        let report = GenerationReport {
            target,
            schema_url: self.normalizer.url().to_string(),
            origin: fetched.origin,
            entity_count: entities.len(),
            cache_updated,
            declaration_path,
            declaration_written,
            collisions: synthesized.collisions,
            service_types: service_code.types.clone(),
            generated_at: Utc::now(),
        };

        let context = Arc::new(GenerationContext {
            entities,
            tree,
            service_code,
        });
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = context;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_single_run() {
        let gate = RunGate::default();
        assert!(gate.try_acquire());
        assert!(gate.release());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_gate_coalesces_triggers() {
        let gate = RunGate::default();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert!(!gate.try_acquire());

        assert!(!gate.release());
        assert!(gate.release());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_gate_reset_after_error() {
        let gate = RunGate::default();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        gate.reset();
        assert!(gate.try_acquire());
    }
}
