//! Field population: value resolution, conversion and assignment.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{EnvcfgError, FieldError};
use crate::record::Record;
use crate::registry::Registry;
use crate::source::Source;
use crate::walk::{self, Leaf};

/// Populate every leaf of `record` from `source`.
///
/// Tag errors abort before any field is touched. Field errors are collected
/// in walk order and returned together.
pub fn populate<S: Source + ?Sized>(
    registry: &Registry,
    prefix: Option<&str>,
    source: &S,
    record: &mut dyn Record,
) -> Result<(), EnvcfgError> {
    let leaves = walk::collect_leaves(record)?;
    let errors: Vec<FieldError> = leaves
        .into_iter()
        .filter_map(|leaf| populate_leaf(registry, prefix, source, leaf).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(EnvcfgError::Fields(errors))
    }
}

fn populate_leaf<S: Source + ?Sized>(
    registry: &Registry,
    prefix: Option<&str>,
    source: &S,
    leaf: Leaf<'_>,
) -> Result<(), FieldError> {
    let Leaf {
        record,
        field,
        spec,
        slot,
    } = leaf;

    let mut values = Vec::with_capacity(spec.arity());
    for (index, name) in spec.names().iter().enumerate() {
        let key = match prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.clone(),
        };
        let value = match source.get(&key) {
            Some(value) => value,
            None => match spec.default_at(index) {
                Some(default) => {
                    tracing::debug!(key = %key, record, field, "using default");
                    default
                }
                None => {
                    return Err(FieldError::MissingValue { key, record, field });
                }
            },
        };
        values.push(value);
    }

    let target = slot.slot_type();
    let parser = registry.lookup(target, spec.arity(), field)?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| parser.invoke(&values)));
    let value = match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            return Err(FieldError::ConversionFailed {
                field,
                reason: err.to_string(),
            });
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(parser = parser.name(), record, field, %message, "parser panicked");
            return Err(FieldError::ConversionFailed {
                field,
                reason: format!("{} panicked: {message}", parser.name()),
            });
        }
    };

    slot.fill(value).map_err(|_| FieldError::ConversionFailed {
        field,
        reason: format!("{} did not return a {}", parser.name(), target.name()),
    })?;
    tracing::debug!(record, field, keys = ?spec.names(), "populated field");
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
