//! Destination records and their fields.
//!
//! A [`Record`] describes its own fields in declaration order. Each field is
//! either a tagged leaf (handed to the populator), an embedded sub-record
//! (recursed into as if its fields were declared on the parent), or untagged
//! (skipped). `#[derive(Record)]` writes this impl for plain structs; it can
//! also be written by hand:
//!
//! ```
//! use envcfg::{Field, Record};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     scratch: Vec<u8>,
//! }
//!
//! impl Record for Server {
//!     fn record_name(&self) -> &'static str {
//!         "Server"
//!     }
//!
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::tagged("host", "HOST", &mut self.host).with_default("localhost"),
//!             Field::tagged("port", "PORT", &mut self.port),
//!             Field::untagged("scratch"),
//!         ]
//!     }
//! }
//! ```

use std::any::Any;

use crate::parser::{BoxedValue, TypeDesc};

/// A struct whose fields can be populated from a key/value source.
pub trait Record {
    /// Name used for this record in diagnostics, usually the type's name.
    fn record_name(&self) -> &'static str;

    /// The record's fields, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One field of a [`Record`].
pub struct Field<'a> {
    name: &'static str,
    kind: FieldKind<'a>,
}

/// How the walker treats a field.
pub enum FieldKind<'a> {
    /// A population target. `env` is the comma-separated name tag and
    /// `default` the optional comma-separated default tag.
    Tagged {
        env: &'static str,
        default: Option<&'static str>,
        slot: &'a mut dyn Slot,
    },
    /// A sub-record flattened into the enclosing record.
    Embedded(&'a mut dyn Record),
    /// Not a population target.
    Untagged,
}

impl<'a> Field<'a> {
    pub fn tagged(name: &'static str, env: &'static str, slot: &'a mut dyn Slot) -> Self {
        Self {
            name,
            kind: FieldKind::Tagged {
                env,
                default: None,
                slot,
            },
        }
    }

    pub fn embedded(name: &'static str, record: &'a mut dyn Record) -> Self {
        Self {
            name,
            kind: FieldKind::Embedded(record),
        }
    }

    pub fn untagged(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Untagged,
        }
    }

    /// Attach a default tag. Has no effect on embedded or untagged fields.
    pub fn with_default(mut self, tag: &'static str) -> Self {
        if let FieldKind::Tagged { default, .. } = &mut self.kind {
            *default = Some(tag);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind<'a> {
        &self.kind
    }

    pub fn into_kind(self) -> FieldKind<'a> {
        self.kind
    }
}

/// A type-erased assignment target.
///
/// Implemented for every `T: Any + Send`, so `&mut self.field` coerces to
/// `&mut dyn Slot` for any owned field type.
pub trait Slot {
    /// The type this slot holds.
    fn slot_type(&self) -> TypeDesc;

    /// Store `value` if it holds this slot's type; hand it back otherwise.
    fn fill(&mut self, value: BoxedValue) -> Result<(), BoxedValue>;
}

impl<T: Any + Send> Slot for T {
    fn slot_type(&self) -> TypeDesc {
        TypeDesc::of::<T>()
    }

    fn fill(&mut self, value: BoxedValue) -> Result<(), BoxedValue> {
        *self = *value.downcast::<T>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{DatabaseConfig, LayeredConfig};

    #[test]
    fn slot_fills_matching_type() {
        let mut port: u16 = 0;
        let slot: &mut dyn Slot = &mut port;
        assert!(slot.fill(Box::new(5432u16)).is_ok());
        assert_eq!(port, 5432);
    }

    #[test]
    fn slot_rejects_other_type() {
        let mut port: u16 = 0;
        let slot: &mut dyn Slot = &mut port;
        let rejected = slot.fill(Box::new("5432".to_string())).unwrap_err();
        assert_eq!(*rejected.downcast::<String>().unwrap(), "5432");
        assert_eq!(port, 0);
    }

    #[test]
    fn slot_reports_its_type() {
        let mut host = String::new();
        let slot: &mut dyn Slot = &mut host;
        assert_eq!(slot.slot_type(), TypeDesc::of::<String>());
    }

    #[test]
    fn fields_come_back_in_declaration_order() {
        let mut config = DatabaseConfig::default();
        let names: Vec<_> = config.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["host", "port", "password"]);
    }

    #[test]
    fn default_only_applies_to_tagged_fields() {
        let mut config = LayeredConfig::default();
        for field in config.fields() {
            let field = field.with_default("ignored");
            if let FieldKind::Embedded(_) | FieldKind::Untagged = field.kind() {
                continue;
            }
            assert!(matches!(
                field.kind(),
                FieldKind::Tagged {
                    default: Some("ignored"),
                    ..
                }
            ));
        }
    }
}
