//! Conversion functions and the manifests that describe them.
//!
//! A [`ParserManifest`] records a conversion's name, the declared types of
//! its inputs and outputs, and the type-erased function that runs it. The
//! registry validates the declared shape once, at registration.
//!
//! Most manifests come from plain Rust functions through [`IntoParser`]:
//! any `Fn(&str, ..) -> Result<T, E>` taking one to six string arguments.
//! Their shape is correct by construction. [`ParserManifest::declare`] builds
//! a manifest from an explicit description for conversions whose signature is
//! only known at runtime.

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A converted value, before it is moved into its field.
pub type BoxedValue = Box<dyn Any + Send>;

/// The error half of a conversion result.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Type-erased conversion: receives exactly `arity` strings, in tag order.
pub type Invoker = Arc<dyn Fn(&[&str]) -> Result<BoxedValue, BoxError> + Send + Sync>;

/// What a declared type can stand for in a conversion signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRole {
    /// A string input.
    Text,
    /// An error-capable output.
    Error,
    /// Anything else.
    Value,
}

/// Identity and display name of a type in a conversion signature.
#[derive(Clone, Copy)]
pub struct TypeDesc {
    id: TypeId,
    name: &'static str,
    role: TypeRole,
}

impl TypeDesc {
    /// Describe `T`. `String` and `&'static str` are described as text.
    pub fn of<T: ?Sized + Any>() -> Self {
        let id = TypeId::of::<T>();
        let role = if id == TypeId::of::<String>() || id == TypeId::of::<&'static str>() {
            TypeRole::Text
        } else {
            TypeRole::Value
        };
        Self {
            id,
            name: type_name::<T>(),
            role,
        }
    }

    /// A string input.
    pub fn text() -> Self {
        Self {
            id: TypeId::of::<&'static str>(),
            name: "&str",
            role: TypeRole::Text,
        }
    }

    /// Describe `E` as the error output of a conversion.
    pub fn error<E: ?Sized + Any>() -> Self {
        Self {
            role: TypeRole::Error,
            ..Self::of::<E>()
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn role(&self) -> TypeRole {
        self.role
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.role == other.role
    }
}

impl Eq for TypeDesc {}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.role)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A conversion function together with its declared signature.
#[derive(Clone)]
pub struct ParserManifest {
    name: Cow<'static, str>,
    inputs: Vec<TypeDesc>,
    outputs: Vec<TypeDesc>,
    invoke: Option<Invoker>,
}

impl ParserManifest {
    /// Describe a conversion without binding a function to it yet.
    ///
    /// Registering a manifest that was never [`bind`](Self::bind)-ed fails
    /// with [`NotAFunction`](crate::EnvcfgError::NotAFunction).
    pub fn declare(
        name: impl Into<Cow<'static, str>>,
        inputs: Vec<TypeDesc>,
        outputs: Vec<TypeDesc>,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            invoke: None,
        }
    }

    /// Attach the function that performs the conversion.
    pub fn bind<F>(mut self, invoke: F) -> Self
    where
        F: Fn(&[&str]) -> Result<BoxedValue, BoxError> + Send + Sync + 'static,
    {
        self.invoke = Some(Arc::new(invoke));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[TypeDesc] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TypeDesc] {
        &self.outputs
    }

    pub fn is_bound(&self) -> bool {
        self.invoke.is_some()
    }

    pub(crate) fn into_parts(self) -> ManifestParts {
        (self.name, self.inputs, self.outputs, self.invoke)
    }
}

pub(crate) type ManifestParts = (
    Cow<'static, str>,
    Vec<TypeDesc>,
    Vec<TypeDesc>,
    Option<Invoker>,
);

impl fmt::Debug for ParserManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserManifest")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A validated registry entry.
pub struct Parser {
    name: Cow<'static, str>,
    output: TypeDesc,
    arity: usize,
    invoke: Invoker,
}

impl Parser {
    pub(crate) fn new(
        name: Cow<'static, str>,
        output: TypeDesc,
        arity: usize,
        invoke: Invoker,
    ) -> Self {
        Self {
            name,
            output,
            arity,
            invoke,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> TypeDesc {
        self.output
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn invoke(&self, args: &[&str]) -> Result<BoxedValue, BoxError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Marker distinguishing [`IntoParser`] impls by input count.
pub struct Arity<const N: usize>;

/// Conversion of a typed function into a [`ParserManifest`].
///
/// `M` is a marker inferred from the function's signature; callers never
/// name it.
pub trait IntoParser<M> {
    fn into_manifest(self) -> ParserManifest;
}

impl IntoParser<()> for ParserManifest {
    fn into_manifest(self) -> ParserManifest {
        self
    }
}

macro_rules! text {
    ($_idx:tt) => {
        &str
    };
}

macro_rules! impl_into_parser {
    ($n:literal => $($idx:tt),+) => {
        impl<F, T, E> IntoParser<(Arity<$n>, T, E)> for F
        where
            F: Fn($(text!($idx)),+) -> Result<T, E> + Send + Sync + 'static,
            T: Any + Send,
            E: Into<BoxError> + 'static,
        {
            fn into_manifest(self) -> ParserManifest {
                ParserManifest::declare(
                    type_name::<F>(),
                    vec![TypeDesc::text(); $n],
                    vec![TypeDesc::of::<T>(), TypeDesc::error::<E>()],
                )
                .bind(move |args: &[&str]| {
                    (self)($(args[$idx]),+)
                        .map(|value| Box::new(value) as BoxedValue)
                        .map_err(Into::into)
                })
            }
        }
    };
}

impl_into_parser!(1 => 0);
impl_into_parser!(2 => 0, 1);
impl_into_parser!(3 => 0, 1, 2);
impl_into_parser!(4 => 0, 1, 2, 3);
impl_into_parser!(5 => 0, 1, 2, 3, 4);
impl_into_parser!(6 => 0, 1, 2, 3, 4, 5);
