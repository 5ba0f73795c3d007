use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{EnvcfgError, FieldError};
use crate::parser::{Parser, ParserManifest, TypeDesc, TypeRole};

/// Conversion functions keyed by `(output type, arity)`.
///
/// Registration takes the write lock; lookups share the read lock, so
/// populating several records from one registry never serializes.
#[derive(Default)]
pub struct Registry {
    parsers: RwLock<HashMap<(TypeId, usize), Arc<Parser>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a manifest's shape and store it.
    ///
    /// Never replaces an existing entry: a second registration for the same
    /// output type and arity fails and leaves the first in place.
    pub fn register(&self, manifest: ParserManifest) -> Result<(), EnvcfgError> {
        let (name, inputs, outputs, invoke) = manifest.into_parts();

        let Some(invoke) = invoke else {
            return Err(EnvcfgError::NotAFunction {
                name: name.into_owned(),
            });
        };
        if inputs.is_empty() {
            return Err(EnvcfgError::NoParameters {
                parser: name.into_owned(),
            });
        }
        if let Some((position, input)) = inputs
            .iter()
            .enumerate()
            .find(|(_, input)| input.role() != TypeRole::Text)
        {
            return Err(EnvcfgError::InvalidParameterType {
                parser: name.into_owned(),
                position,
                type_name: input.name(),
            });
        }
        let [output, last] = outputs[..] else {
            return Err(EnvcfgError::WrongOutputArity {
                parser: name.into_owned(),
                count: outputs.len(),
            });
        };
        if last.role() != TypeRole::Error {
            return Err(EnvcfgError::LastOutputNotError {
                parser: name.into_owned(),
                type_name: last.name(),
            });
        }

        let arity = inputs.len();
        let mut parsers = self.parsers.write().unwrap_or_else(PoisonError::into_inner);
        if parsers.contains_key(&(output.id(), arity)) {
            return Err(EnvcfgError::DuplicateParser {
                type_name: output.name(),
                arity,
                parser: name.into_owned(),
            });
        }
        tracing::debug!(parser = %name, output = output.name(), arity, "registered parser");
        parsers.insert(
            (output.id(), arity),
            Arc::new(Parser::new(name, output, arity, invoke)),
        );
        Ok(())
    }

    /// The parser producing `target` from `arity` strings, or `None`.
    pub fn get(&self, target: TypeId, arity: usize) -> Option<Arc<Parser>> {
        self.parsers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(target, arity))
            .cloned()
    }

    /// Like [`get`](Self::get), reporting a miss against the destination
    /// field being populated.
    pub fn lookup(
        &self,
        target: TypeDesc,
        arity: usize,
        field: &'static str,
    ) -> Result<Arc<Parser>, FieldError> {
        self.get(target.id(), arity)
            .ok_or(FieldError::NoParserFound {
                type_name: target.name(),
                field,
            })
    }

    pub fn contains(&self, target: TypeId, arity: usize) -> bool {
        self.parsers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(target, arity))
    }

    pub fn len(&self) -> usize {
        self.parsers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parsers = self.parsers.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list().entries(parsers.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{BoxError, IntoParser};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Foo;

    /// Same shape as `Foo`, distinct type.
    #[derive(Debug, PartialEq)]
    struct Bar;

    fn foo3(_: &str, _: &str, _: &str) -> Result<Foo, String> {
        Ok(Foo)
    }

    fn register<M>(registry: &Registry, f: impl IntoParser<M>) -> Result<(), EnvcfgError> {
        registry.register(f.into_manifest())
    }

    #[test]
    fn unbound_manifest_is_not_a_function() {
        let registry = Registry::new();
        let manifest = ParserManifest::declare(
            "I can't even",
            vec![TypeDesc::text()],
            vec![TypeDesc::of::<Foo>(), TypeDesc::error::<BoxError>()],
        );
        let err = registry.register(manifest).unwrap_err();
        assert_eq!(err.to_string(), "envcfg: I can't even is not a func");
    }

    #[test]
    fn non_string_input_is_rejected() {
        let registry = Registry::new();
        let manifest = ParserManifest::declare(
            "parse_foo",
            vec![TypeDesc::text(), TypeDesc::of::<i32>()],
            vec![TypeDesc::of::<Foo>(), TypeDesc::error::<BoxError>()],
        )
        .bind(|_| Ok(Box::new(Foo)));
        let err = registry.register(manifest).unwrap_err();
        assert!(matches!(
            err,
            EnvcfgError::InvalidParameterType { position: 1, .. }
        ));
        assert_eq!(
            err.to_string(),
            "envcfg: parser should accept only string arguments. parse_foo accepts a i32 argument"
        );
    }

    #[test]
    fn zero_inputs_are_rejected() {
        let registry = Registry::new();
        let manifest = ParserManifest::declare(
            "constant",
            vec![],
            vec![TypeDesc::of::<Foo>(), TypeDesc::error::<BoxError>()],
        )
        .bind(|_| Ok(Box::new(Foo)));
        assert!(matches!(
            registry.register(manifest),
            Err(EnvcfgError::NoParameters { .. })
        ));
    }

    #[test]
    fn wrong_number_of_outputs_is_rejected() {
        let registry = Registry::new();
        let manifest = ParserManifest::declare(
            "parse_foo",
            vec![TypeDesc::text()],
            vec![
                TypeDesc::of::<Foo>(),
                TypeDesc::of::<String>(),
                TypeDesc::error::<BoxError>(),
            ],
        )
        .bind(|_| Ok(Box::new(Foo)));
        assert_eq!(
            registry.register(manifest).unwrap_err().to_string(),
            "envcfg: parser should return 2 arguments. parse_foo returns 3 arguments"
        );
    }

    #[test]
    fn last_output_must_be_an_error() {
        let registry = Registry::new();
        let manifest = ParserManifest::declare(
            "parse_foo",
            vec![TypeDesc::text()],
            vec![TypeDesc::of::<Foo>(), TypeDesc::of::<String>()],
        )
        .bind(|_| Ok(Box::new(Foo)));
        assert_eq!(
            registry.register(manifest).unwrap_err().to_string(),
            "envcfg: parser's last return value should be error. parse_foo's last return value is alloc::string::String"
        );
    }

    #[test]
    fn any_number_of_strings_is_accepted() {
        let registry = Registry::new();
        register(&registry, foo3).unwrap();
        assert!(registry.contains(TypeId::of::<Foo>(), 3));
        assert!(!registry.contains(TypeId::of::<Foo>(), 1));
    }

    #[test]
    fn duplicate_registration_keeps_the_first() {
        let registry = Registry::new();
        register(&registry, foo3).unwrap();
        let err = register(&registry, |_: &str, _: &str, _: &str| -> Result<Foo, String> {
            Err("second".into())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            EnvcfgError::DuplicateParser { arity: 3, .. }
        ));
        assert!(err.to_string().starts_with(
            "envcfg: a parser has already been registered for the envcfg::registry::tests::Foo type with 3 inputs.  cannot also register "
        ));

        let parser = registry.get(TypeId::of::<Foo>(), 3).unwrap();
        assert!(parser.name().ends_with("foo3"));
        let value = parser.invoke(&["a", "b", "c"]).unwrap();
        assert!(value.downcast::<Foo>().is_ok());
    }

    #[test]
    fn same_type_different_arity_coexists() {
        let registry = Registry::new();
        register(&registry, foo3).unwrap();
        register(&registry, |_: &str, _: &str, _: &str, _: &str| -> Result<Foo, String> {
            Ok(Foo)
        })
        .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn distinct_types_of_same_shape_coexist() {
        let registry = Registry::new();
        register(&registry, |_: &str| -> Result<Foo, String> { Ok(Foo) }).unwrap();
        register(&registry, |_: &str| -> Result<Bar, String> { Ok(Bar) }).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_miss_names_type_and_field() {
        let registry = Registry::new();
        let err = registry
            .lookup(TypeDesc::of::<Foo>(), 1, "b")
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::NoParserFound {
                type_name: "envcfg::registry::tests::Foo",
                field: "b",
            }
        );
    }

    #[test]
    fn concurrent_lookups_and_registrations() {
        let registry = Registry::new();
        register(&registry, |_: &str| -> Result<Foo, String> { Ok(Foo) }).unwrap();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(registry.get(TypeId::of::<Foo>(), 1).is_some());
                    }
                });
            }
            scope.spawn(|| {
                register(&registry, |_: &str| -> Result<Bar, String> { Ok(Bar) }).unwrap();
            });
        });

        assert!(registry.contains(TypeId::of::<Bar>(), 1));
    }
}
