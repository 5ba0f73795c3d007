use thiserror::Error;

/// Errors returned by registration and population.
///
/// Registration and structural variants abort the call that produced them.
/// Field-level problems are collected across the whole record and returned
/// together as [`EnvcfgError::Fields`].
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum EnvcfgError {
    #[error("envcfg: {name} is not a func")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(envcfg::not_a_function),
            help("bind an invoker with ParserManifest::bind before registering")
        )
    )]
    NotAFunction { name: String },

    #[error("envcfg: parser should accept at least one string argument. {parser} accepts none")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::no_parameters)))]
    NoParameters { parser: String },

    #[error(
        "envcfg: parser should accept only string arguments. {parser} accepts a {type_name} argument"
    )]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::invalid_parameter_type)))]
    InvalidParameterType {
        parser: String,
        position: usize,
        type_name: &'static str,
    },

    #[error("envcfg: parser should return 2 arguments. {parser} returns {count} arguments")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::wrong_output_arity)))]
    WrongOutputArity { parser: String, count: usize },

    #[error(
        "envcfg: parser's last return value should be error. {parser}'s last return value is {type_name}"
    )]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::last_output_not_error)))]
    LastOutputNotError {
        parser: String,
        type_name: &'static str,
    },

    #[error(
        "envcfg: a parser has already been registered for the {type_name} type with {arity} inputs.  cannot also register {parser}"
    )]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(envcfg::duplicate_parser),
            help("use a separate Envcfg instance to scope conflicting parsers")
        )
    )]
    DuplicateParser {
        type_name: &'static str,
        arity: usize,
        parser: String,
    },

    #[error(
        "envcfg: env tag {names} has {name_count} names but default tag {defaults} has {default_count} values"
    )]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(envcfg::default_count_mismatch),
            help("escape literal commas in defaults as \\,")
        )
    )]
    DefaultCountMismatch {
        names: String,
        defaults: String,
        name_count: usize,
        default_count: usize,
    },

    #[error("{}", render_field_errors(.0))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::fields)))]
    Fields(#[cfg_attr(feature = "rich-errors", related)] Vec<FieldError>),
}

impl EnvcfgError {
    /// The per-field errors of an aggregated failure, or an empty slice for
    /// every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            EnvcfgError::Fields(errors) => errors,
            _ => &[],
        }
    }
}

/// A failure isolated to one destination field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum FieldError {
    #[error("no {key} value found, and {record}.{field} has no default")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(envcfg::missing_value), help("set {key} or add a default tag"))
    )]
    MissingValue {
        key: String,
        record: &'static str,
        field: &'static str,
    },

    #[error("no parser function found for type {type_name} (field {field})")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::no_parser_found)))]
    NoParserFound {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("envcfg: cannot populate {field}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envcfg::conversion_failed)))]
    ConversionFailed { field: &'static str, reason: String },
}

impl FieldError {
    /// Name of the destination field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::MissingValue { field, .. }
            | FieldError::NoParserFound { field, .. }
            | FieldError::ConversionFailed { field, .. } => field,
        }
    }
}

fn render_field_errors(errors: &[FieldError]) -> String {
    let header = match errors.len() {
        1 => "1 error occurred:".to_string(),
        n => format!("{n} errors occurred:"),
    };
    let items: Vec<String> = errors.iter().map(|e| format!("* {e}")).collect();
    format!("{header}\n\n{}", items.join("\n"))
}
