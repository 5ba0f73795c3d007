//! Populate typed configuration structs from environment-style key/value
//! sources. Tag the fields, register conversions for your own types, and go.
//!
//! ```
//! use envcfg::Record;
//!
//! #[derive(Record, Default)]
//! struct AppConfig {
//!     #[envcfg(env = "FOO", default = "hey there")]
//!     foo: String,
//!     #[envcfg(env = "BAR")]
//!     bar: i64,
//!     #[envcfg(env = "REFRESH_INTERVAL", default = "2h30m")]
//!     refresh_interval: std::time::Duration,
//! }
//!
//! let source = envcfg::env_list_to_map(["BAR=321"]);
//! let mut config = AppConfig::default();
//! envcfg::load_from_map(&source, &mut config)?;
//! assert_eq!(config.foo, "hey there");
//! assert_eq!(config.bar, 321);
//! assert_eq!(config.refresh_interval.as_secs(), 9000);
//! # Ok::<(), envcfg::EnvcfgError>(())
//! ```
//!
//! # Design: tags drive everything
//!
//! Each field says which source keys feed it and what to fall back to:
//!
//! - **`env = "A,B,C"`** names the keys. One key is the common case; several
//!   keys feed one conversion that takes that many strings, in tag order.
//! - **`default = "x,y,z"`** supplies one default per key, used positionally
//!   for the keys missing from the source. The counts must match.
//! - **`\,`** writes a literal comma inside a name or default.
//! - **`embed`** flattens a sub-struct into the enclosing one. Its tags are
//!   resolved as if they had been declared on the parent, at any depth.
//!
//! A plain nested struct field without a tag is left alone, inner tags and
//! all. With a tag, it is converted as a whole by a parser registered for
//! its type. Untagged fields are never touched.
//!
//! # Parsers
//!
//! A parser is any function of one to six `&str` arguments returning
//! `Result<T, E>`. It is looked up by its output type and its number of
//! arguments, so the same type can have a one-key parser and a three-key
//! parser side by side:
//!
//! ```
//! #[derive(Debug, PartialEq)]
//! struct Dsn(String);
//!
//! let engine = envcfg::Envcfg::with_builtins();
//! engine.register(|s: &str| -> Result<Dsn, String> { Ok(Dsn(s.into())) })?;
//! engine.register(|host: &str, port: &str, db: &str| -> Result<Dsn, String> {
//!     Ok(Dsn(format!("postgres://{host}:{port}/{db}")))
//! })?;
//! # Ok::<(), envcfg::EnvcfgError>(())
//! ```
//!
//! Registering a second parser for the same type and arity fails; nothing is
//! ever silently replaced. Conversions whose signature is only known at
//! runtime can be described with [`ParserManifest::declare`]; the registry
//! checks the declared shape once, at registration.
//!
//! Strings, booleans, every integer and float width, `char`, paths, IP and
//! socket addresses, durations (`300ms`, `2h30m`), MAC addresses
//! ([`HardwareAddr`]) and mail addresses ([`MailAddress`],
//! [`MailAddressList`]) are built in. With the `json` feature, [`json`] turns
//! any `DeserializeOwned` type into a parser; the `chrono`, `url` and
//! `templates` features add RFC 3339 timestamps, URLs and handlebars
//! templates.
//!
//! # Instances
//!
//! The crate-level functions act on one shared, builtin-loaded instance.
//! [`Envcfg::new`] and [`Envcfg::builder`] create independent instances
//! with their own registries, so tests and subsystems can scope their
//! parsers. The registry is behind a reader/writer lock: populating many
//! records at once never blocks, registration waits for readers to finish.
//!
//! # Error handling
//!
//! Malformed calls fail immediately with a single [`EnvcfgError`]: a bad
//! parser shape, a duplicate registration, or a default tag whose count
//! disagrees with its name tag (checked for the whole record before any field
//! is assigned).
//!
//! Bad data does not stop the pass. Every field is attempted; missing
//! values, missing parsers, conversion errors and panics inside conversions
//! are collected into [`EnvcfgError::Fields`] in declaration order:
//!
//! ```text
//! 2 errors occurred:
//!
//! * no DB_PORT value found, and DatabaseConfig.port has no default
//! * no LOG_LEVEL value found, and LogConfig.level has no default
//! ```
//!
//! Enable the `rich-errors` feature for [miette](https://docs.rs/miette)
//! diagnostics.

pub mod error;

mod builder;
mod builtins;
mod env;
mod parser;
mod populate;
mod record;
mod registry;
mod source;
mod tag;
mod types;
mod walk;

#[cfg(test)]
mod fixtures;

pub use builder::{Envcfg, EnvcfgBuilder};
#[cfg(feature = "json")]
pub use builtins::json;
pub use builtins::{ParseBoolError, ParseDurationError, parse_bool, parse_duration};
pub use env::{env_list_to_map, process_env};
pub use error::{EnvcfgError, FieldError};
pub use parser::{
    Arity, BoxError, BoxedValue, IntoParser, Invoker, Parser, ParserManifest, TypeDesc, TypeRole,
};
pub use record::{Field, FieldKind, Record, Slot};
pub use registry::Registry;
pub use source::Source;
pub use tag::{FieldSpec, split_tag};
#[cfg(feature = "templates")]
pub use types::Template;
pub use types::{
    HardwareAddr, MailAddress, MailAddressList, ParseHardwareAddrError, ParseMailAddressError,
};

#[cfg(feature = "derive")]
pub use envcfg_derive::Record;

/// Populate `dest` from the process environment using the shared instance.
pub fn load<R: Record>(dest: &mut R) -> Result<(), EnvcfgError> {
    Envcfg::shared().load(dest)
}

/// Populate `dest` from `source` using the shared instance.
pub fn load_from_map<S, R>(source: &S, dest: &mut R) -> Result<(), EnvcfgError>
where
    S: Source + ?Sized,
    R: Record,
{
    Envcfg::shared().populate(source, dest)
}

/// Register a typed conversion on the shared instance.
pub fn register_parser<M, F: IntoParser<M>>(parser: F) -> Result<(), EnvcfgError> {
    Envcfg::shared().register(parser)
}

/// Register a manifest on the shared instance.
pub fn register_manifest(manifest: ParserManifest) -> Result<(), EnvcfgError> {
    Envcfg::shared().register_manifest(manifest)
}
