//! Per-code message factories. One method per [`Code`], each producing the
//! localised text for all three catalogued locales via the `msg!` helper
//! below — a data-driven table keyed on `(code, locale)` as spec.md §9
//! suggests, just expressed as match arms instead of a lookup map, since
//! every factory also needs to interpolate typed arguments.

use super::{terms::Noun, Code, Issue, Locale, Note, Severity};
use crate::source::SourceCode;

macro_rules! msg {
    ($self:expr, en: $en:expr, be: $be:expr, ru: $ru:expr $(,)?) => {
        match $self.locale {
            Locale::En => format!($en),
            Locale::Be => format!($be),
            Locale::Ru => format!($ru),
        }
    };
}

/// Carries the active [`Locale`] so every diagnostic raised through it comes
/// out in the same language. One instance is created per compilation
/// (spec.md §4.7: "selected by the process locale") and threaded through
/// the analyser the way `Context`/`Scope` are threaded in the teacher's
/// typechecker.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    locale: Locale,
}

impl Diagnostics {
    pub fn new(locale: Locale) -> Diagnostics {
        Diagnostics { locale }
    }

    fn error(&self, code: Code, primary: SourceCode, message: String) -> Issue {
        Issue {
            severity: Severity::Error,
            code,
            primary,
            message,
            notes: vec![],
        }
    }

    fn warning(&self, code: Code, primary: SourceCode, message: String) -> Issue {
        Issue {
            severity: Severity::Warning,
            code,
            primary,
            message,
            notes: vec![],
        }
    }

    pub fn first_definition_note(&self, location: SourceCode) -> Note {
        Note::new(
            Some(location),
            msg!(self, en: "first defined here", be: "упершыню вызначана тут", ru: "впервые определено здесь"),
        )
    }

    pub fn candidate_note(&self, location: Option<SourceCode>, signature: &str) -> Note {
        Note::new(
            location,
            msg!(self,
                en: "candidate: {signature}",
                be: "кандыдат: {signature}",
                ru: "кандидат: {signature}",
            ),
        )
    }

    // ---- Lexical: E0001-E0004 -------------------------------------------

    pub fn numeric_literal_out_of_range(&self, primary: SourceCode, literal: &str) -> Issue {
        self.error(
            Code::NumericLiteralOutOfRange,
            primary,
            msg!(self,
                en: "numeric literal '{literal}' is out of range",
                be: "лічбавы літарал '{literal}' па-за дыяпазонам",
                ru: "числовой литерал '{literal}' вне диапазона",
            ),
        )
    }

    pub fn malformed_exponent(&self, primary: SourceCode, literal: &str) -> Issue {
        self.error(
            Code::MalformedExponent,
            primary,
            msg!(self,
                en: "malformed exponent in numeric literal '{literal}'",
                be: "няправільны парадак у лічбавым літарале '{literal}'",
                ru: "некорректный показатель степени в числовом литерале '{literal}'",
            ),
        )
    }

    pub fn unknown_numeric_literal(&self, primary: SourceCode, literal: &str) -> Issue {
        self.error(
            Code::UnknownNumericLiteral,
            primary,
            msg!(self,
                en: "'{literal}' is not a valid numeric literal",
                be: "'{literal}' не з'яўляецца прыдатным лічбавым літаралам",
                ru: "'{literal}' не является допустимым числовым литералом",
            ),
        )
    }

    pub fn unknown_character(&self, primary: SourceCode, ch: char) -> Issue {
        self.error(
            Code::UnknownCharacter,
            primary,
            msg!(self,
                en: "unknown character '{ch}'",
                be: "невядомы сімвал '{ch}'",
                ru: "неизвестный символ '{ch}'",
            ),
        )
    }

    // ---- Parser: E0005-E0012 --------------------------------------------

    pub fn missing_variable_initializer(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::MissingVariableInitializer,
            primary,
            msg!(self,
                en: "expected an expression after '='",
                be: "чакаўся выраз пасля '='",
                ru: "ожидалось выражение после '='",
            ),
        )
    }

    pub fn missing_operand(&self, primary: SourceCode, operator: &str) -> Issue {
        self.error(
            Code::MissingOperand,
            primary,
            msg!(self,
                en: "operator '{operator}' is missing an operand",
                be: "аператару '{operator}' не хапае аперанда",
                ru: "оператору '{operator}' не хватает операнда",
            ),
        )
    }

    pub fn missing_specifier(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::MissingSpecifier,
            primary,
            msg!(self,
                en: "expected a specifier here",
                be: "чакаўся спецыфікатар тут",
                ru: "ожидался спецификатор здесь",
            ),
        )
    }

    pub fn missing_closing_delimiter(&self, primary: SourceCode, delimiter: &str) -> Issue {
        self.error(
            Code::MissingClosingDelimiter,
            primary,
            msg!(self,
                en: "expected closing '{delimiter}'",
                be: "чакалася закрывальная '{delimiter}'",
                ru: "ожидалась закрывающая '{delimiter}'",
            ),
        )
    }

    pub fn keyword_used_as_identifier(&self, primary: SourceCode, keyword: &str) -> Issue {
        self.error(
            Code::KeywordUsedAsIdentifier,
            primary,
            msg!(self,
                en: "'{keyword}' is a keyword and cannot be used as an identifier",
                be: "'{keyword}' з'яўляецца ключавым словам і не можа быць ідэнтыфікатарам",
                ru: "'{keyword}' является ключевым словом и не может быть идентификатором",
            ),
        )
    }

    pub fn malformed_node(&self, primary: SourceCode, what: &str) -> Issue {
        self.error(
            Code::MalformedNode,
            primary,
            msg!(self,
                en: "malformed {what}",
                be: "няправільна пабудаваны {what}",
                ru: "некорректно построенный {what}",
            ),
        )
    }

    pub fn missing_node(&self, primary: SourceCode, what: &str) -> Issue {
        self.error(
            Code::MissingNode,
            primary,
            msg!(self,
                en: "expected {what}",
                be: "чакаўся {what}",
                ru: "ожидался {what}",
            ),
        )
    }

    pub fn unexpected_token(&self, primary: SourceCode, found: &str) -> Issue {
        self.error(
            Code::UnexpectedToken,
            primary,
            msg!(self,
                en: "unexpected token '{found}'",
                be: "нечаканы токен '{found}'",
                ru: "неожиданный токен '{found}'",
            ),
        )
    }

    // ---- Name resolution / registration: E0013-E0027 ---------------------

    pub fn entity_name_taken(&self, primary: SourceCode, name: &str, first: Option<SourceCode>) -> Issue {
        let message = msg!(self,
            en: "'{name}' is already defined in this scope",
            be: "'{name}' ужо вызначана ў гэтай вобласці бачнасці",
            ru: "'{name}' уже определено в этой области видимости",
        );
        let mut issue = self.error(Code::EntityNameTaken, primary, message);
        if let Some(first) = first {
            issue.notes.push(self.first_definition_note(first));
        }
        issue
    }

    pub fn duplicate_function_definition(&self, primary: SourceCode, name: &str, first: SourceCode) -> Issue {
        self.error(
            Code::DuplicateFunctionDefinition,
            primary,
            msg!(self,
                en: "a function '{name}' with this exact parameter list is already defined",
                be: "функцыя '{name}' з такім жа спісам параметраў ужо вызначана",
                ru: "функция '{name}' с таким же списком параметров уже определена",
            ),
        )
        .with_notes(vec![self.first_definition_note(first)])
    }

    pub fn duplicate_method_definition(
        &self,
        primary: SourceCode,
        container: &str,
        name: &str,
        first: SourceCode,
    ) -> Issue {
        self.error(
            Code::DuplicateMethodDefinition,
            primary,
            msg!(self,
                en: "'{container}' already has a method '{name}' with this exact parameter list",
                be: "'{container}' ужо мае метад '{name}' з такім жа спісам параметраў",
                ru: "у '{container}' уже есть метод '{name}' с таким же списком параметров",
            ),
        )
        .with_notes(vec![self.first_definition_note(first)])
    }

    pub fn duplicate_constructor_definition(&self, primary: SourceCode, container: &str, first: SourceCode) -> Issue {
        self.error(
            Code::DuplicateConstructorDefinition,
            primary,
            msg!(self,
                en: "'{container}' already has a constructor with this exact parameter list",
                be: "'{container}' ужо мае канструктар з такім жа спісам параметраў",
                ru: "у '{container}' уже есть конструктор с таким же списком параметров",
            ),
        )
        .with_notes(vec![self.first_definition_note(first)])
    }

    pub fn copy_constructor_definition(&self, primary: SourceCode, container: &str) -> Issue {
        self.error(
            Code::CopyConstructorDefinition,
            primary,
            msg!(self,
                en: "'{container}' cannot declare a copy constructor; one is synthesised automatically",
                be: "'{container}' не можа аб'яўляць канструктар капіявання; ён ствараецца аўтаматычна",
                ru: "'{container}' не может объявлять конструктор копирования; он создаётся автоматически",
            ),
        )
    }

    pub fn reference_marker_in_function_definition(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::ReferenceMarkerInFunctionDefinition,
            primary,
            msg!(self,
                en: "free function '{name}' cannot be marked as a reference",
                be: "свабодная функцыя '{name}' не можа быць пазначана як спасылка",
                ru: "свободная функция '{name}' не может быть помечена как ссылка",
            ),
        )
    }

    pub fn native_function_with_body(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::NativeFunctionWithBody,
            primary,
            msg!(self,
                en: "native function '{name}' cannot have a body",
                be: "натыўная функцыя '{name}' не можа мець цела",
                ru: "нативная функция '{name}' не может иметь тело",
            ),
        )
    }

    pub fn native_method_with_body(&self, primary: SourceCode, container: &str, name: &str) -> Issue {
        self.error(
            Code::NativeMethodWithBody,
            primary,
            msg!(self,
                en: "native method '{container}.{name}' cannot have a body",
                be: "натыўны метад '{container}.{name}' не можа мець цела",
                ru: "нативный метод '{container}.{name}' не может иметь тело",
            ),
        )
    }

    pub fn native_constructor_with_body(&self, primary: SourceCode, container: &str) -> Issue {
        self.error(
            Code::NativeConstructorWithBody,
            primary,
            msg!(self,
                en: "native constructor of '{container}' cannot have a body",
                be: "натыўны канструктар '{container}' не можа мець цела",
                ru: "нативный конструктор '{container}' не может иметь тело",
            ),
        )
    }

    pub fn function_definition_without_body(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::FunctionDefinitionWithoutBody,
            primary,
            msg!(self,
                en: "function '{name}' must have a body unless it is native",
                be: "функцыя '{name}' мусіць мець цела, калі яна не натыўная",
                ru: "функция '{name}' должна иметь тело, если она не нативная",
            ),
        )
    }

    pub fn method_definition_without_body(&self, primary: SourceCode, container: &str, name: &str) -> Issue {
        self.error(
            Code::MethodDefinitionWithoutBody,
            primary,
            msg!(self,
                en: "method '{container}.{name}' must have a body unless it is native",
                be: "метад '{container}.{name}' мусіць мець цела, калі ён не натыўны",
                ru: "метод '{container}.{name}' должен иметь тело, если он не нативный",
            ),
        )
    }

    pub fn constructor_definition_without_body(&self, primary: SourceCode, container: &str) -> Issue {
        self.error(
            Code::ConstructorDefinitionWithoutBody,
            primary,
            msg!(self,
                en: "constructor of '{container}' must have a body unless it is native",
                be: "канструктар '{container}' мусіць мець цела, калі ён не натыўны",
                ru: "конструктор '{container}' должен иметь тело, если он не нативный",
            ),
        )
    }

    pub fn missing_main_function(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::MissingMainFunction,
            primary,
            msg!(self,
                en: "no 'main' function found in this program",
                be: "у гэтай праграме не знойдзена функцыя 'main'",
                ru: "в этой программе не найдена функция 'main'",
            ),
        )
    }

    pub fn main_is_not_function(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::MainIsNotFunction,
            primary,
            msg!(self,
                en: "'main' must be a function",
                be: "'main' мусіць быць функцыяй",
                ru: "'main' должна быть функцией",
            ),
        )
    }

    pub fn invalid_main_function_signature(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::InvalidMainFunctionSignature,
            primary,
            msg!(self,
                en: "'main' must have signature '() -> void'",
                be: "'main' мусіць мець сігнатуру '() -> void'",
                ru: "'main' должна иметь сигнатуру '() -> void'",
            ),
        )
    }

    // ---- Type resolver: E0028-E0030 --------------------------------------

    pub fn unknown_name(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::UnknownName,
            primary,
            msg!(self,
                en: "cannot find '{name}' in this scope",
                be: "немагчыма знайсці '{name}' у гэтай вобласці бачнасці",
                ru: "не удаётся найти '{name}' в этой области видимости",
            ),
        )
    }

    pub fn invalid_reference_as_type(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::InvalidReferenceAsType,
            primary,
            msg!(self,
                en: "'{name}' is not a type",
                be: "'{name}' не з'яўляецца тыпам",
                ru: "'{name}' не является типом",
            ),
        )
    }

    pub fn overreferenced_type(&self, primary: SourceCode, type_name: &str) -> Issue {
        self.error(
            Code::OverreferencedType,
            primary,
            msg!(self,
                en: "'{type_name}' is already a reference type and cannot be referenced again",
                be: "'{type_name}' ужо з'яўляецца тыпам-спасылкай і не можа быць спасланы зноў",
                ru: "'{type_name}' уже является ссылочным типом и не может быть снова ссылкой",
            ),
        )
    }

    // ---- Expression analyser: E0031-E0045 --------------------------------

    pub fn numeric_literal_too_small(&self, primary: SourceCode, target_type: &str) -> Issue {
        self.error(
            Code::NumericLiteralTooSmall,
            primary,
            msg!(self,
                en: "literal is too small to fit in '{target_type}'",
                be: "літарал занадта малы для тыпу '{target_type}'",
                ru: "литерал слишком мал для типа '{target_type}'",
            ),
        )
    }

    pub fn numeric_literal_too_big(&self, primary: SourceCode, target_type: &str) -> Issue {
        self.error(
            Code::NumericLiteralTooBig,
            primary,
            msg!(self,
                en: "literal is too big to fit in '{target_type}'",
                be: "літарал занадта вялікі для тыпу '{target_type}'",
                ru: "литерал слишком велик для типа '{target_type}'",
            ),
        )
    }

    pub fn invalid_reference_as_expression(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::InvalidReferenceAsExpression,
            primary,
            msg!(self,
                en: "'{name}' cannot be used as an expression",
                be: "'{name}' не можа быць выкарыстаны як выраз",
                ru: "'{name}' не может быть использовано как выражение",
            ),
        )
    }

    pub fn this_reference_outside_method(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::ThisReferenceOutsideMethod,
            primary,
            msg!(self,
                en: "'this' can only be used inside a method",
                be: "'this' можа быць выкарыстаны толькі ўнутры метаду",
                ru: "'this' может использоваться только внутри метода",
            ),
        )
    }

    pub fn unknown_object_member(&self, primary: SourceCode, type_name: &str, member: &str) -> Issue {
        self.error(
            Code::UnknownObjectMember,
            primary,
            msg!(self,
                en: "'{type_name}' has no member named '{member}'",
                be: "'{type_name}' не мае члена з імем '{member}'",
                ru: "у '{type_name}' нет члена с именем '{member}'",
            ),
        )
    }

    pub fn unknown_static_member_name(&self, primary: SourceCode, type_name: &str, member: &str) -> Issue {
        self.error(
            Code::UnknownStaticMemberName,
            primary,
            msg!(self,
                en: "'{type_name}' has no static member named '{member}'",
                be: "'{type_name}' не мае статычнага члена з імем '{member}'",
                ru: "у '{type_name}' нет статического члена с именем '{member}'",
            ),
        )
    }

    pub fn reference_method_access_from_non_reference(
        &self,
        primary: SourceCode,
        type_name: &str,
        method: &str,
    ) -> Issue {
        self.error(
            Code::ReferenceMethodAccessFromNonReference,
            primary,
            msg!(self,
                en: "method '{method}' is only defined on '{type_name}&' and needs a reference receiver",
                be: "метад '{method}' вызначаны толькі на '{type_name}&' і патрабуе спасылачнага атрымальніка",
                ru: "метод '{method}' определён только на '{type_name}&' и требует ссылочного получателя",
            ),
        )
    }

    pub fn ambiguous_overloaded_call(&self, primary: SourceCode, name: &str, candidates: Vec<Note>) -> Issue {
        self.error(
            Code::AmbiguousOverloadedCall,
            primary,
            msg!(self,
                en: "call to '{name}' is ambiguous between multiple overloads",
                be: "выклік '{name}' неадназначны паміж некалькімі перагрузкамі",
                ru: "вызов '{name}' неоднозначен между несколькими перегрузками",
            ),
        )
        .with_notes(candidates)
    }

    pub fn invalid_call_arguments(&self, primary: SourceCode, name: &str) -> Issue {
        self.error(
            Code::InvalidCallArguments,
            primary,
            msg!(self,
                en: "no overload of '{name}' accepts these argument types",
                be: "ніводная перагрузка '{name}' не прымае гэтыя тыпы аргументаў",
                ru: "ни одна перегрузка '{name}' не принимает эти типы аргументов",
            ),
        )
    }

    pub fn expression_is_not_callable(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::ExpressionIsNotCallable,
            primary,
            msg!(self,
                en: "this expression is not callable",
                be: "гэты выраз нельга выклікаць",
                ru: "это выражение нельзя вызвать",
            ),
        )
    }

    pub fn undefined_operator(&self, primary: SourceCode, method_name: &str, type_name: &str) -> Issue {
        self.error(
            Code::UndefinedOperator,
            primary,
            msg!(self,
                en: "'{type_name}' has no method '{method_name}' to satisfy this operator",
                be: "'{type_name}' не мае метаду '{method_name}' для гэтага аператара",
                ru: "у '{type_name}' нет метода '{method_name}' для этого оператора",
            ),
        )
    }

    pub fn missing_right_operand(&self, primary: SourceCode, operator: &str) -> Issue {
        self.error(
            Code::MissingRightOperand,
            primary,
            msg!(self,
                en: "operator '{operator}' expects a right-hand operand",
                be: "аператар '{operator}' патрабуе правы аперанд",
                ru: "оператор '{operator}' требует правый операнд",
            ),
        )
    }

    pub fn non_type_expression_as_cast_target(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::NonTypeExpressionAsCastTarget,
            primary,
            msg!(self,
                en: "the target of a cast must be a type",
                be: "мэта пераўтварэння мусіць быць тыпам",
                ru: "целью преобразования должен быть тип",
            ),
        )
    }

    pub fn no_type_conversion_function(&self, primary: SourceCode, from_type: &str, to_type: &str) -> Issue {
        self.error(
            Code::NoTypeConversionFunction,
            primary,
            msg!(self,
                en: "no conversion from '{from_type}' to '{to_type}' exists",
                be: "не існуе пераўтварэння з '{from_type}' у '{to_type}'",
                ru: "не существует преобразования из '{from_type}' в '{to_type}'",
            ),
        )
    }

    pub fn invalid_conversion_function_return_type(
        &self,
        primary: SourceCode,
        expected: &str,
        actual: &str,
    ) -> Issue {
        self.error(
            Code::InvalidConversionFunctionReturnType,
            primary,
            msg!(self,
                en: "this conversion function returns '{actual}', not the expected '{expected}'",
                be: "гэтая функцыя пераўтварэння вяртае '{actual}', а не чаканы '{expected}'",
                ru: "эта функция преобразования возвращает '{actual}', а не ожидаемый '{expected}'",
            ),
        )
    }

    // ---- Statement analyser: E0046-E0053 ---------------------------------

    pub fn incompatible_variable_initializer(&self, primary: SourceCode, type_name: &str) -> Issue {
        self.error(
            Code::IncompatibleVariableInitializer,
            primary,
            msg!(self,
                en: "no constructor of '{type_name}' accepts this initializer",
                be: "ніводны канструктар '{type_name}' не прымае гэты ініцыялізатар",
                ru: "ни один конструктор '{type_name}' не принимает этот инициализатор",
            ),
        )
    }

    pub fn non_plain_variable_without_initializer(&self, primary: SourceCode, type_name: &str) -> Issue {
        self.error(
            Code::NonPlainVariableWithoutInitializer,
            primary,
            msg!(self,
                en: "'{type_name}' has no default constructor, so a variable of this type needs an initializer",
                be: "'{type_name}' не мае канструктара па змаўчанні, таму зменнай гэтага тыпу патрэбны ініцыялізатар",
                ru: "у '{type_name}' нет конструктора по умолчанию, поэтому переменной этого типа нужен инициализатор",
            ),
        )
    }

    pub fn invalid_condition_type(&self, primary: SourceCode, context: &str, actual_type: &str) -> Issue {
        self.error(
            Code::InvalidConditionType,
            primary,
            msg!(self,
                en: "condition of '{context}' must be 'bool', found '{actual_type}'",
                be: "умова '{context}' мусіць быць 'bool', а не '{actual_type}'",
                ru: "условие '{context}' должно быть 'bool', а не '{actual_type}'",
            ),
        )
    }

    pub fn return_from_constructor(&self, primary: SourceCode) -> Issue {
        self.error(
            Code::ReturnFromConstructor,
            primary,
            msg!(self,
                en: "constructors cannot contain a 'return' statement",
                be: "канструктары не могуць утрымліваць аператар 'return'",
                ru: "конструкторы не могут содержать оператор 'return'",
            ),
        )
    }

    pub fn incompatible_return_type(&self, primary: SourceCode, expected: &str, actual: &str) -> Issue {
        self.error(
            Code::IncompatibleReturnType,
            primary,
            msg!(self,
                en: "expected return type '{expected}', found '{actual}'",
                be: "чакаўся тып вяртання '{expected}', а атрымалі '{actual}'",
                ru: "ожидался тип возврата '{expected}', получен '{actual}'",
            ),
        )
    }

    pub fn return_without_value(&self, primary: SourceCode, expected: &str) -> Issue {
        self.error(
            Code::ReturnWithoutValue,
            primary,
            msg!(self,
                en: "expected a value of type '{expected}' to return",
                be: "чакалася значэнне тыпу '{expected}' для вяртання",
                ru: "ожидалось значение типа '{expected}' для возврата",
            ),
        )
    }

    pub fn unreachable_code(&self, primary: SourceCode) -> Issue {
        self.warning(
            Code::UnreachableCode,
            primary,
            msg!(self,
                en: "unreachable code after a 'return' statement",
                be: "недасяжны код пасля аператара 'return'",
                ru: "недостижимый код после оператора 'return'",
            ),
        )
    }

    pub fn missing_return_statement(&self, primary: SourceCode, function_name: &str) -> Issue {
        self.error(
            Code::MissingReturnStatement,
            primary,
            msg!(self,
                en: "not all control-flow paths of '{function_name}' return a value",
                be: "не ўсе шляхі выканання '{function_name}' вяртаюць значэнне",
                ru: "не все пути выполнения '{function_name}' возвращают значение",
            ),
        )
    }

    /// A short human-readable description of a symbol kind, used by callers
    /// that build their own sentence around it (e.g. "expected a type, found
    /// a <description>").
    pub fn describe(&self, noun: Noun) -> &'static str {
        noun.described(self.locale)
    }
}
