//! Declarative field binding for component configuration.
//!
//! A component declares its fields up front as [`FieldSpec`]s. Binding walks
//! the declared table once, evaluates `${...}` expressions, coerces each value
//! to its declared [`FieldKind`] and collects every problem before failing,
//! so a user sees all unknown or malformed fields at once. Only a fully valid
//! table is deserialized into the component's typed configuration.

use crate::loader::{ComponentError, EvaluationError, ExpressionEvaluator, ResolverContext};
use serde::de::DeserializeOwned;
use std::path::Path;
use toml::{Table, Value};

/// Target type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain string. Integers, floats and booleans are accepted and rendered.
    String,
    /// Boolean, or the strings `true`/`false`.
    Bool,
    /// Integer, or a string holding one.
    Integer,
    /// Filesystem path, kept as written.
    Path,
    /// List of strings. A single string becomes a one-element list.
    StringList,
    /// Table of string values.
    StringTable,
    /// Executable name looked up in the [`ResolverContext`], or an existing path.
    Executable,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Path => "path string",
            Self::StringList => "array of strings",
            Self::StringTable => "table of strings",
            Self::Executable => "executable name or path",
        }
    }
}

/// Declaration of one configurable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as written in the declaration.
    pub name: &'static str,
    /// Target type.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
}

impl FieldSpec {
    /// Declares a required field.
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Typed configuration of a pluggable component.
pub trait ComponentConfig: DeserializeOwned {
    /// Component kind, used in error messages.
    const COMPONENT: &'static str;

    /// Every field the component accepts.
    fn fields() -> &'static [FieldSpec];
}

/// A problem with a single declared field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field is not declared by the component.
    #[error("unknown field `{field}`")]
    Unknown {
        /// Field name.
        field: String,
    },

    /// A required field is absent.
    #[error("missing required field `{field}`")]
    Missing {
        /// Field name.
        field: String,
    },

    /// The value has the wrong type.
    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected type.
        expected: &'static str,
        /// Actual type or value.
        found: String,
    },

    /// A lookup in the resolver context failed.
    #[error("field `{field}`: `{value}` not found in {searched} resolvable location(s)")]
    Unresolvable {
        /// Field name.
        field: String,
        /// Value that was looked up.
        value: String,
        /// Number of locations searched.
        searched: usize,
    },

    /// An expression inside the value failed.
    #[error("field `{field}`: {source}")]
    Expression {
        /// Field name.
        field: String,
        /// Evaluation failure.
        source: EvaluationError,
    },
}

pub(crate) fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Binds `declared` onto the typed configuration `C`.
///
/// # Errors
///
/// Returns [`ComponentError::Fields`] listing every unknown, missing or
/// malformed field, or [`ComponentError::Binding`] if the coerced values
/// still do not deserialize into `C`.
pub fn bind<C: ComponentConfig>(
    declared: &Table,
    context: &ResolverContext,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<C, ComponentError> {
    let specs = C::fields();
    let mut errors = Vec::new();

    for name in declared.keys() {
        if !specs.iter().any(|s| s.name == name.as_str()) {
            errors.push(FieldError::Unknown {
                field: name.clone(),
            });
        }
    }

    let mut bound = Table::new();
    for spec in specs {
        let Some(raw) = declared.get(spec.name) else {
            if spec.required {
                errors.push(FieldError::Missing {
                    field: spec.name.to_string(),
                });
            }
            continue;
        };

        let value = match interpolate(raw, evaluator) {
            Ok(v) => v,
            Err(source) => {
                errors.push(FieldError::Expression {
                    field: spec.name.to_string(),
                    source,
                });
                continue;
            }
        };

        match coerce(spec, value, context) {
            Ok(v) => {
                bound.insert(spec.name.to_string(), v);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(ComponentError::Fields {
            component: C::COMPONENT.to_string(),
            errors,
        });
    }

    Value::Table(bound)
        .try_into()
        .map_err(|e: toml::de::Error| ComponentError::Binding {
            component: C::COMPONENT.to_string(),
            message: e.to_string(),
        })
}

/// Replaces `${...}` expressions throughout `value`.
///
/// A string that is exactly one expression takes the expression's value and
/// type. Expressions embedded in a longer string must yield scalars.
fn interpolate(
    value: &Value,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<Value, EvaluationError> {
    match value {
        Value::String(s) => interpolate_str(s, evaluator),
        Value::Array(items) => items
            .iter()
            .map(|item| interpolate(item, evaluator))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Table(table) => table
            .iter()
            .map(|(k, v)| interpolate(v, evaluator).map(|v| (k.clone(), v)))
            .collect::<Result<Table, _>>()
            .map(Value::Table),
        other => Ok(other.clone()),
    }
}

fn interpolate_str(s: &str, evaluator: &dyn ExpressionEvaluator) -> Result<Value, EvaluationError> {
    if let Some(body) = whole_expression(s) {
        return evaluator.evaluate(body);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let body = &rest[start + 2..start + 2 + len];
        out.push_str(&rest[..start]);
        out.push_str(&render_scalar(body, evaluator.evaluate(body)?)?);
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    Ok(Value::String(out))
}

fn whole_expression(s: &str) -> Option<&str> {
    let body = s.strip_prefix("${")?.strip_suffix('}')?;
    (!body.contains("${") && !body.contains('}')).then_some(body)
}

fn render_scalar(expression: &str, value: Value) -> Result<String, EvaluationError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(EvaluationError::NotScalar {
            expression: expression.to_string(),
            found: other.type_str(),
        }),
    }
}

fn coerce(spec: &FieldSpec, value: Value, context: &ResolverContext) -> Result<Value, FieldError> {
    let mismatch = |found: &Value| FieldError::TypeMismatch {
        field: spec.name.to_string(),
        expected: spec.kind.expected(),
        found: found.type_str().to_string(),
    };

    match spec.kind {
        FieldKind::String => match value {
            Value::String(_) => Ok(value),
            Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
                Ok(Value::String(value.to_string()))
            }
            other => Err(mismatch(&other)),
        },
        FieldKind::Bool => match value {
            Value::Boolean(_) => Ok(value),
            Value::String(ref s) => s
                .trim()
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|_| FieldError::TypeMismatch {
                    field: spec.name.to_string(),
                    expected: spec.kind.expected(),
                    found: format!("\"{s}\""),
                }),
            other => Err(mismatch(&other)),
        },
        FieldKind::Integer => match value {
            Value::Integer(_) => Ok(value),
            Value::String(ref s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| FieldError::TypeMismatch {
                    field: spec.name.to_string(),
                    expected: spec.kind.expected(),
                    found: format!("\"{s}\""),
                }),
            other => Err(mismatch(&other)),
        },
        FieldKind::Path => match value {
            Value::String(ref s) if !s.is_empty() => Ok(value),
            other => Err(mismatch(&other)),
        },
        FieldKind::StringList => match value {
            Value::String(s) => Ok(Value::Array(vec![Value::String(s)])),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(_) => Ok(item),
                    Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
                        Ok(Value::String(item.to_string()))
                    }
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(mismatch(&other)),
        },
        FieldKind::StringTable => match value {
            Value::Table(table) => table
                .into_iter()
                .map(|(k, v)| match v {
                    Value::String(_) => Ok((k, v)),
                    Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
                        Ok((k, Value::String(v.to_string())))
                    }
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<Table, _>>()
                .map(Value::Table),
            other => Err(mismatch(&other)),
        },
        FieldKind::Executable => match value {
            Value::String(name) if !name.is_empty() => context
                .find(&name)
                .or_else(|| Path::new(&name).is_file().then(|| name.clone().into()))
                .map(|p| Value::String(p.to_string_lossy().into_owned()))
                .ok_or_else(|| FieldError::Unresolvable {
                    field: spec.name.to_string(),
                    value: name,
                    searched: context.len(),
                }),
            other => Err(mismatch(&other)),
        },
    }
}
