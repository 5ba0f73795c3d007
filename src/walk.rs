//! Record traversal.
//!
//! Fields are visited in declaration order. Embedded records are always
//! recursed into and their fields join the enclosing record's namespace.
//! Everything else is either a tagged leaf or skipped: a named nested record
//! is only a target when it carries its own name tag, and then it is
//! converted as a whole by a parser for its type, never walked.

use crate::error::EnvcfgError;
use crate::record::{FieldKind, Record, Slot};
use crate::tag::FieldSpec;

/// A population target found by the walker.
pub struct Leaf<'a> {
    /// Name of the record that declares the field.
    pub record: &'static str,
    pub field: &'static str,
    pub spec: FieldSpec,
    pub slot: &'a mut dyn Slot,
}

/// Collect every leaf of `record`, depth-first.
///
/// All tags are parsed here, so a malformed tag anywhere in the record fails
/// before any field is assigned.
pub fn collect_leaves<'a>(record: &'a mut dyn Record) -> Result<Vec<Leaf<'a>>, EnvcfgError> {
    let mut leaves = Vec::new();
    visit(record, &mut leaves)?;
    Ok(leaves)
}

fn visit<'a>(record: &'a mut dyn Record, leaves: &mut Vec<Leaf<'a>>) -> Result<(), EnvcfgError> {
    let record_name = record.record_name();
    for field in record.fields() {
        let name = field.name();
        match field.into_kind() {
            FieldKind::Embedded(inner) => visit(inner, leaves)?,
            FieldKind::Tagged { env, default, slot } => {
                if let Some(spec) = FieldSpec::parse(env, default)? {
                    leaves.push(Leaf {
                        record: record_name,
                        field: name,
                        spec,
                        slot,
                    });
                }
            }
            FieldKind::Untagged => {}
        }
    }
    Ok(())
}
