// src/errors.rs
//! Symbol and namespace errors (E21xx).
//!
//! These are the recoverable diagnostics: the driver decides whether a
//! compilation continues past them. Caller-contract violations (popping
//! an empty namespace stack, linking an empty key chain) panic instead.

use miette::Diagnostic;
use thiserror::Error;

use crate::symbol::ValueKind;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("label '{name}' already defined")]
    #[diagnostic(code(E2101))]
    LabelRedefined { name: String },

    #[error("subroutine '{name}' already defined")]
    #[diagnostic(code(E2102))]
    SubroutineRedefined { name: String },

    #[error("bad const initialisation: string value for {kind} constant '{name}'")]
    #[diagnostic(
        code(E2103),
        help("only string and pmc constants may take a string initializer")
    )]
    BadConstInit { name: String, kind: ValueKind },

    #[error("global pmc constant '{name}' not allowed")]
    #[diagnostic(code(E2104))]
    GlobalPmcConstant { name: String },

    #[error("register number out of range '{name}'")]
    #[diagnostic(code(E2105))]
    BadMachineRegister { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_reference_the_offending_name() {
        let err = SymbolError::LabelRedefined {
            name: "loop_top".to_string(),
        };
        assert_eq!(err.to_string(), "label 'loop_top' already defined");

        let err = SymbolError::BadConstInit {
            name: "pi".to_string(),
            kind: ValueKind::Num,
        };
        assert!(err.to_string().contains("num constant 'pi'"));
    }
}
