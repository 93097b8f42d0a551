//! Type system errors

use thiserror::Error;

/// Compile-time typing failures
///
/// Every typing call returns these as data; none of them is recoverable within
/// the compilation of one function signature.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// A masked type was requested over a kind outside the supported set
    #[error(
        "Unsupported MaskedType value kind `{found}`. This is usually caused by attempting \
         to use a column of unsupported dtype in a UDF. Supported kinds are: {supported}"
    )]
    UnsupportedValueType {
        /// Offending kind
        found: String,
        /// Supported kinds
        supported: String,
    },

    /// No common type exists at a control-flow join
    #[error("Cannot unify {left} and {right}")]
    UnificationFailed {
        /// Type flowing from the first path
        left: String,
        /// Type flowing from the second path
        right: String,
    },

    /// No typing rule accepts the operand combination
    #[error("No applicable overload of `{op}` for operands ({operands})")]
    NoApplicableOperator {
        /// Operator symbol or name
        op: String,
        /// Comma separated operand types
        operands: String,
    },

    /// Two types cannot be converted into one another
    #[error("Cannot convert {from} to {to}")]
    IncompatibleCast {
        /// Source type
        from: String,
        /// Target type
        to: String,
    },

    /// Attribute or method lookup failed
    #[error("{ty} has no attribute `{attr}`")]
    UnknownAttribute {
        /// Receiver type
        ty: String,
        /// Attribute name
        attr: String,
    },

    /// Call with the wrong number of arguments
    #[error("{callee} takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Function or method name
        callee: String,
        /// Declared count
        expected: usize,
        /// Supplied count
        actual: usize,
    },

    /// Call with an argument of the wrong type
    #[error("{callee} expects {expected}, got {actual}")]
    ArgumentMismatch {
        /// Function or method name
        callee: String,
        /// Declared type
        expected: String,
        /// Supplied type
        actual: String,
    },

    /// The function's final expression cannot be packed into a masked result
    #[error("Cannot return a value of type {ty}")]
    InvalidReturn {
        /// Type of the returned expression
        ty: String,
    },

    /// Reference to a parameter the function does not have
    #[error("Unknown parameter #{index}")]
    UnknownParameter {
        /// Parameter index
        index: usize,
    },

    /// Typing rule exists but is switched off by configuration
    #[error("{feature} is disabled")]
    FeatureDisabled {
        /// Feature description
        feature: String,
    },

    /// Malformed type or operator name
    #[error("Cannot parse `{input}`: {reason}")]
    Parse {
        /// Input text
        input: String,
        /// What went wrong
        reason: String,
    },
}

impl TypeError {
    /// Build a [`TypeError::NoApplicableOperator`] naming every operand
    pub fn no_overload<T: std::fmt::Display>(op: impl std::fmt::Display, operands: &[T]) -> Self {
        TypeError::NoApplicableOperator {
            op: op.to_string(),
            operands: operands
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Build a [`TypeError::UnificationFailed`]
    pub fn cannot_unify(left: impl std::fmt::Display, right: impl std::fmt::Display) -> Self {
        TypeError::UnificationFailed {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overload_lists_operands() {
        let err = TypeError::no_overload("+", &["Masked(int32)", "string_view"]);
        assert_eq!(
            err.to_string(),
            "No applicable overload of `+` for operands (Masked(int32), string_view)"
        );
    }

    #[test]
    fn test_unsupported_message_is_verbatim() {
        let err = TypeError::UnsupportedValueType {
            found: "decimal128".to_string(),
            supported: "int32".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`decimal128`"));
        assert!(msg.ends_with("Supported kinds are: int32"));
    }
}
