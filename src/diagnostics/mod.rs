//! The diagnostic system (spec.md §4.7, §7).
//!
//! Every stage of the pipeline (lexer, raw parser, semantic analyser)
//! reports problems as [`Issue`]s instead of failing outright, following the
//! teacher crate's own `TypeError`/`FileLoadError` pattern of "a small typed
//! value with a message and a position" — just generalised into one shared,
//! localised, coded type instead of one ad hoc struct per stage.

mod messages;
pub mod terms;

use std::{env, fmt::Display};

use serde::Serialize;

use crate::source::SourceCode;

pub use messages::Diagnostics;

/// How serious an [`Issue`] is. Only [`Severity::Error`] affects the
/// process exit code (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// The locale a diagnostic message is rendered in. Selected from the
/// process locale the way `simple_logger`/`clap` pick up ambient
/// environment state in the teacher crate, via `CO_LOCALE` (falling back to
/// `LC_ALL`/`LANG`) rather than a full platform locale negotiation library,
/// since only three locales are ever catalogued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Locale {
    #[default]
    En,
    Be,
    Ru,
}

impl Locale {
    pub fn from_process_environment() -> Locale {
        for var in ["CO_LOCALE", "LC_ALL", "LC_MESSAGES", "LANG"] {
            if let Ok(value) = env::var(var) {
                if let Some(locale) = Locale::parse(&value) {
                    return locale;
                }
            }
        }
        Locale::default()
    }

    fn parse(value: &str) -> Option<Locale> {
        let head = value.split(['.', '_', '-']).next()?.to_lowercase();
        match head.as_str() {
            "be" => Some(Locale::Be),
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

/// A stable diagnostic code, E0001 through E0053 (spec.md reserves up to
/// E0054; not every nominal slot in that range corresponds to a distinct
/// diagnostic this implementation raises — see DESIGN.md for how the
/// overlapping ranges in spec.md §7 were consolidated into this single,
/// non-overlapping numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[rustfmt::skip]
pub enum Code {
    // Lexical: E0001-E0004
    NumericLiteralOutOfRange, MalformedExponent, UnknownNumericLiteral, UnknownCharacter,
    // Parser: E0005-E0012
    MissingVariableInitializer, MissingOperand, MissingSpecifier, MissingClosingDelimiter,
    KeywordUsedAsIdentifier, MalformedNode, MissingNode, UnexpectedToken,
    // Name resolution / registration: E0013-E0027
    EntityNameTaken, DuplicateFunctionDefinition, DuplicateMethodDefinition,
    DuplicateConstructorDefinition, CopyConstructorDefinition, ReferenceMarkerInFunctionDefinition,
    NativeFunctionWithBody, NativeMethodWithBody, NativeConstructorWithBody,
    FunctionDefinitionWithoutBody, MethodDefinitionWithoutBody, ConstructorDefinitionWithoutBody,
    MissingMainFunction, MainIsNotFunction, InvalidMainFunctionSignature,
    // Type resolver: E0028-E0030
    UnknownName, InvalidReferenceAsType, OverreferencedType,
    // Expression analyser: E0031-E0045
    NumericLiteralTooSmall, NumericLiteralTooBig, InvalidReferenceAsExpression,
    ThisReferenceOutsideMethod, UnknownObjectMember, UnknownStaticMemberName,
    ReferenceMethodAccessFromNonReference, AmbiguousOverloadedCall, InvalidCallArguments,
    ExpressionIsNotCallable, UndefinedOperator, MissingRightOperand,
    NonTypeExpressionAsCastTarget, NoTypeConversionFunction, InvalidConversionFunctionReturnType,
    // Statement analyser: E0046-E0053
    IncompatibleVariableInitializer, NonPlainVariableWithoutInitializer, InvalidConditionType,
    ReturnFromConstructor, IncompatibleReturnType, ReturnWithoutValue,
    UnreachableCode, MissingReturnStatement,
}

impl Code {
    #[rustfmt::skip]
    fn number(self) -> u32 {
        use Code::*;
        match self {
            NumericLiteralOutOfRange => 1, MalformedExponent => 2, UnknownNumericLiteral => 3,
            UnknownCharacter => 4,
            MissingVariableInitializer => 5, MissingOperand => 6, MissingSpecifier => 7,
            MissingClosingDelimiter => 8, KeywordUsedAsIdentifier => 9, MalformedNode => 10,
            MissingNode => 11, UnexpectedToken => 12,
            EntityNameTaken => 13, DuplicateFunctionDefinition => 14, DuplicateMethodDefinition => 15,
            DuplicateConstructorDefinition => 16, CopyConstructorDefinition => 17,
            ReferenceMarkerInFunctionDefinition => 18, NativeFunctionWithBody => 19,
            NativeMethodWithBody => 20, NativeConstructorWithBody => 21,
            FunctionDefinitionWithoutBody => 22, MethodDefinitionWithoutBody => 23,
            ConstructorDefinitionWithoutBody => 24, MissingMainFunction => 25,
            MainIsNotFunction => 26, InvalidMainFunctionSignature => 27,
            UnknownName => 28, InvalidReferenceAsType => 29, OverreferencedType => 30,
            NumericLiteralTooSmall => 31, NumericLiteralTooBig => 32,
            InvalidReferenceAsExpression => 33, ThisReferenceOutsideMethod => 34,
            UnknownObjectMember => 35, UnknownStaticMemberName => 36,
            ReferenceMethodAccessFromNonReference => 37, AmbiguousOverloadedCall => 38,
            InvalidCallArguments => 39, ExpressionIsNotCallable => 40, UndefinedOperator => 41,
            MissingRightOperand => 42, NonTypeExpressionAsCastTarget => 43,
            NoTypeConversionFunction => 44, InvalidConversionFunctionReturnType => 45,
            IncompatibleVariableInitializer => 46, NonPlainVariableWithoutInitializer => 47,
            InvalidConditionType => 48, ReturnFromConstructor => 49, IncompatibleReturnType => 50,
            ReturnWithoutValue => 51, UnreachableCode => 52, MissingReturnStatement => 53,
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{:04}", self.number())
    }
}

/// A secondary location attached to an [`Issue`] (spec.md §4.7): points at a
/// first definition for duplicate-definition errors, or at a candidate
/// signature for ambiguous-overload errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub location: Option<SourceCode>,
    pub text: String,
}

impl Note {
    pub fn new(location: Option<SourceCode>, text: impl Into<String>) -> Note {
        Note {
            location,
            text: text.into(),
        }
    }
}

/// One diagnostic: a severity, a stable code, a primary location, a
/// localised message and zero or more notes (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: Code,
    pub primary: SourceCode,
    pub message: String,
    pub notes: Vec<Note>,
}

impl Issue {
    pub fn with_notes(mut self, notes: Vec<Note>) -> Issue {
        self.notes = notes;
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: [{}] {} ({})", self.severity, self.code, self.message, self.primary)?;
        for note in &self.notes {
            match &note.location {
                Some(location) => writeln!(f, "  note: {} ({})", note.text, location)?,
                None => writeln!(f, "  note: {}", note.text)?,
            }
        }
        Ok(())
    }
}

/// The highest severity found in a batch of issues, used to compute the
/// process exit code (spec.md §6, §9's "compiler exits with the highest-
/// severity status observed").
pub fn worst_severity(issues: &[Issue]) -> Option<Severity> {
    issues
        .iter()
        .map(|issue| issue.severity)
        .max_by_key(|severity| match severity {
            Severity::Note => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        })
}
