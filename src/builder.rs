use std::sync::LazyLock;

use crate::builtins;
use crate::env;
use crate::error::EnvcfgError;
use crate::parser::{IntoParser, ParserManifest};
use crate::populate;
use crate::record::Record;
use crate::registry::Registry;
use crate::source::Source;

static SHARED: LazyLock<Envcfg> = LazyLock::new(Envcfg::with_builtins);

/// A parser registry bundled with the population entry points.
///
/// Instances are independent: parsers registered on one are invisible to
/// every other, so tests and isolated subsystems can register conflicting
/// conversions for the same type. The crate-level functions
/// ([`load`](crate::load), [`register_parser`](crate::register_parser), ...)
/// act on [`Envcfg::shared()`].
#[derive(Debug, Default)]
pub struct Envcfg {
    registry: Registry,
    prefix: Option<String>,
}

impl Envcfg {
    /// An instance with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An instance preloaded with the built-in conversions.
    pub fn with_builtins() -> Self {
        let engine = Self::new();
        let registered = builtins::register_builtins(&engine.registry);
        debug_assert!(registered.is_ok(), "builtin parsers collide: {registered:?}");
        if let Err(err) = registered {
            tracing::error!(%err, "failed to register builtin parsers");
        }
        engine
    }

    pub fn builder() -> EnvcfgBuilder {
        EnvcfgBuilder::new()
    }

    /// The process-wide instance used by the crate-level functions.
    pub fn shared() -> &'static Envcfg {
        &SHARED
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a typed conversion such as `fn(&str) -> Result<T, E>`.
    pub fn register<M, F: IntoParser<M>>(&self, parser: F) -> Result<(), EnvcfgError> {
        self.registry.register(parser.into_manifest())
    }

    /// Register a manifest built with [`ParserManifest::declare`].
    pub fn register_manifest(&self, manifest: ParserManifest) -> Result<(), EnvcfgError> {
        self.registry.register(manifest)
    }

    /// Populate `dest` from `source`.
    pub fn populate<S, R>(&self, source: &S, dest: &mut R) -> Result<(), EnvcfgError>
    where
        S: Source + ?Sized,
        R: Record,
    {
        populate::populate(&self.registry, self.prefix.as_deref(), source, dest)
    }

    /// Populate `dest` from a snapshot of the process environment.
    pub fn load<R: Record>(&self, dest: &mut R) -> Result<(), EnvcfgError> {
        self.populate(&env::process_env(), dest)
    }

    /// Build a default `R` and populate it from `source`.
    pub fn from_source<S, R>(&self, source: &S) -> Result<R, EnvcfgError>
    where
        S: Source + ?Sized,
        R: Record + Default,
    {
        let mut dest = R::default();
        self.populate(source, &mut dest)?;
        Ok(dest)
    }

    /// Build a default `R` and populate it from the process environment.
    pub fn from_env<R: Record + Default>(&self) -> Result<R, EnvcfgError> {
        self.from_source(&env::process_env())
    }
}

/// Builder for an [`Envcfg`] instance.
///
/// Builtins are included unless [`no_builtins`](Self::no_builtins) is called.
/// Queued parsers are registered in order at [`build`](Self::build), after
/// the builtins, so a duplicate surfaces there.
pub struct EnvcfgBuilder {
    builtins: bool,
    prefix: Option<String>,
    manifests: Vec<ParserManifest>,
}

impl EnvcfgBuilder {
    fn new() -> Self {
        Self {
            builtins: true,
            prefix: None,
            manifests: Vec::new(),
        }
    }

    /// Start from an empty registry.
    pub fn no_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Prepend `prefix` to every key looked up in the source.
    ///
    /// With prefix `APP_`, a field tagged `PORT` reads `APP_PORT`.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Queue a typed conversion.
    pub fn parser<M, F: IntoParser<M>>(mut self, parser: F) -> Self {
        self.manifests.push(parser.into_manifest());
        self
    }

    /// Queue a manifest.
    pub fn manifest(mut self, manifest: ParserManifest) -> Self {
        self.manifests.push(manifest);
        self
    }

    pub fn build(self) -> Result<Envcfg, EnvcfgError> {
        let registry = Registry::new();
        if self.builtins {
            builtins::register_builtins(&registry)?;
        }
        for manifest in self.manifests {
            registry.register(manifest)?;
        }
        Ok(Envcfg {
            registry,
            prefix: self.prefix,
        })
    }
}
