//! Derive macro for `envcfg::Record`.

use proc_macro::TokenStream;

mod record;

/// Derive `envcfg::Record` for a struct with named fields.
///
/// ```ignore
/// #[derive(Record, Default)]
/// struct Config {
///     #[envcfg(env = "DB_HOST")]
///     host: String,
///
///     #[envcfg(env = "A,B,C", default = "three,two,one")]
///     combined: MyString,
///
///     #[envcfg(embed)]
///     logging: LogConfig,
///
///     // no attribute: never touched
///     scratch: Vec<u8>,
/// }
/// ```
///
/// `embed` recurses into the field, which must itself implement `Record`,
/// and cannot be combined with `env` or `default`. `default` requires `env`.
#[proc_macro_derive(Record, attributes(envcfg))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::process_derive_record(input)
}
