//! Grammatical terms used to build natural-sounding diagnostics in all three
//! locales. English barely inflects nouns, but Belarusian and Russian do, so
//! a "noun" here is a small bundle of case forms rather than a bare string,
//! and callers pick the form that fits the sentence they are building.

use super::Locale;

/// The six forms a [`Noun`] needs to appear naturally in a sentence.
/// `indefinite`/`definite`/`no_determiner` only matter for English
/// ("a function" / "the function" / "function"); Belarusian and Russian
/// have no articles, so those three collapse onto the nominative there.
#[derive(Debug, Clone, Copy)]
pub struct Forms {
    pub nominative: &'static str,
    pub genitive: &'static str,
    pub accusative: &'static str,
    pub instrumental: &'static str,
    pub indefinite: &'static str,
    pub definite: &'static str,
    pub no_determiner: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Nominative,
    Genitive,
    Accusative,
    Instrumental,
    /// English-only: "a function" vs "the function" vs bare "function".
    Indefinite,
    Definite,
    NoDeterminer,
}

impl Forms {
    pub fn get(&self, case: Case) -> &'static str {
        match case {
            Case::Nominative => self.nominative,
            Case::Genitive => self.genitive,
            Case::Accusative => self.accusative,
            Case::Instrumental => self.instrumental,
            Case::Indefinite => self.indefinite,
            Case::Definite => self.definite,
            Case::NoDeterminer => self.no_determiner,
        }
    }
}

/// A noun describing a kind of symbol, used in `description()`-style
/// diagnostic phrases ("the function 'foo'", "метад 'bar'", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noun {
    Type,
    Function,
    Method,
    Constructor,
    Variable,
    Field,
    Parameter,
    Namespace,
    Expression,
}

impl Noun {
    pub fn forms(self, locale: Locale) -> Forms {
        use Noun::*;
        match (self, locale) {
            (Type, Locale::En) => Forms {
                nominative: "type",
                genitive: "type's",
                accusative: "type",
                instrumental: "type",
                indefinite: "a type",
                definite: "the type",
                no_determiner: "type",
            },
            (Type, Locale::Be) => Forms {
                nominative: "тып",
                genitive: "тыпу",
                accusative: "тып",
                instrumental: "тыпам",
                indefinite: "тып",
                definite: "тып",
                no_determiner: "тып",
            },
            (Type, Locale::Ru) => Forms {
                nominative: "тип",
                genitive: "типа",
                accusative: "тип",
                instrumental: "типом",
                indefinite: "тип",
                definite: "тип",
                no_determiner: "тип",
            },
            (Function, Locale::En) => Forms {
                nominative: "function",
                genitive: "function's",
                accusative: "function",
                instrumental: "function",
                indefinite: "a function",
                definite: "the function",
                no_determiner: "function",
            },
            (Function, Locale::Be) => Forms {
                nominative: "функцыя",
                genitive: "функцыі",
                accusative: "функцыю",
                instrumental: "функцыяй",
                indefinite: "функцыя",
                definite: "функцыя",
                no_determiner: "функцыя",
            },
            (Function, Locale::Ru) => Forms {
                nominative: "функция",
                genitive: "функции",
                accusative: "функцию",
                instrumental: "функцией",
                indefinite: "функция",
                definite: "функция",
                no_determiner: "функция",
            },
            (Method, Locale::En) => Forms {
                nominative: "method",
                genitive: "method's",
                accusative: "method",
                instrumental: "method",
                indefinite: "a method",
                definite: "the method",
                no_determiner: "method",
            },
            (Method, Locale::Be) => Forms {
                nominative: "метад",
                genitive: "метаду",
                accusative: "метад",
                instrumental: "метадам",
                indefinite: "метад",
                definite: "метад",
                no_determiner: "метад",
            },
            (Method, Locale::Ru) => Forms {
                nominative: "метод",
                genitive: "метода",
                accusative: "метод",
                instrumental: "методом",
                indefinite: "метод",
                definite: "метод",
                no_determiner: "метод",
            },
            (Constructor, Locale::En) => Forms {
                nominative: "constructor",
                genitive: "constructor's",
                accusative: "constructor",
                instrumental: "constructor",
                indefinite: "a constructor",
                definite: "the constructor",
                no_determiner: "constructor",
            },
            (Constructor, Locale::Be) => Forms {
                nominative: "канструктар",
                genitive: "канструктара",
                accusative: "канструктар",
                instrumental: "канструктарам",
                indefinite: "канструктар",
                definite: "канструктар",
                no_determiner: "канструктар",
            },
            (Constructor, Locale::Ru) => Forms {
                nominative: "конструктор",
                genitive: "конструктора",
                accusative: "конструктор",
                instrumental: "конструктором",
                indefinite: "конструктор",
                definite: "конструктор",
                no_determiner: "конструктор",
            },
            (Variable, Locale::En) => Forms {
                nominative: "variable",
                genitive: "variable's",
                accusative: "variable",
                instrumental: "variable",
                indefinite: "a variable",
                definite: "the variable",
                no_determiner: "variable",
            },
            (Variable, Locale::Be) => Forms {
                nominative: "зменная",
                genitive: "зменнай",
                accusative: "зменную",
                instrumental: "зменнай",
                indefinite: "зменная",
                definite: "зменная",
                no_determiner: "зменная",
            },
            (Variable, Locale::Ru) => Forms {
                nominative: "переменная",
                genitive: "переменной",
                accusative: "переменную",
                instrumental: "переменной",
                indefinite: "переменная",
                definite: "переменная",
                no_determiner: "переменная",
            },
            (Field, Locale::En) => Forms {
                nominative: "field",
                genitive: "field's",
                accusative: "field",
                instrumental: "field",
                indefinite: "a field",
                definite: "the field",
                no_determiner: "field",
            },
            (Field, Locale::Be) => Forms {
                nominative: "поле",
                genitive: "поля",
                accusative: "поле",
                instrumental: "полем",
                indefinite: "поле",
                definite: "поле",
                no_determiner: "поле",
            },
            (Field, Locale::Ru) => Forms {
                nominative: "поле",
                genitive: "поля",
                accusative: "поле",
                instrumental: "полем",
                indefinite: "поле",
                definite: "поле",
                no_determiner: "поле",
            },
            (Parameter, Locale::En) => Forms {
                nominative: "parameter",
                genitive: "parameter's",
                accusative: "parameter",
                instrumental: "parameter",
                indefinite: "a parameter",
                definite: "the parameter",
                no_determiner: "parameter",
            },
            (Parameter, Locale::Be) => Forms {
                nominative: "параметр",
                genitive: "параметра",
                accusative: "параметр",
                instrumental: "параметрам",
                indefinite: "параметр",
                definite: "параметр",
                no_determiner: "параметр",
            },
            (Parameter, Locale::Ru) => Forms {
                nominative: "параметр",
                genitive: "параметра",
                accusative: "параметр",
                instrumental: "параметром",
                indefinite: "параметр",
                definite: "параметр",
                no_determiner: "параметр",
            },
            (Namespace, Locale::En) => Forms {
                nominative: "namespace",
                genitive: "namespace's",
                accusative: "namespace",
                instrumental: "namespace",
                indefinite: "a namespace",
                definite: "the namespace",
                no_determiner: "namespace",
            },
            (Namespace, Locale::Be) => Forms {
                nominative: "прастора імёнаў",
                genitive: "прасторы імёнаў",
                accusative: "прастору імёнаў",
                instrumental: "прасторай імёнаў",
                indefinite: "прастора імёнаў",
                definite: "прастора імёнаў",
                no_determiner: "прастора імёнаў",
            },
            (Namespace, Locale::Ru) => Forms {
                nominative: "пространство имён",
                genitive: "пространства имён",
                accusative: "пространство имён",
                instrumental: "пространством имён",
                indefinite: "пространство имён",
                definite: "пространство имён",
                no_determiner: "пространство имён",
            },
            (Expression, Locale::En) => Forms {
                nominative: "expression",
                genitive: "expression's",
                accusative: "expression",
                instrumental: "expression",
                indefinite: "an expression",
                definite: "the expression",
                no_determiner: "expression",
            },
            (Expression, Locale::Be) => Forms {
                nominative: "выраз",
                genitive: "выразу",
                accusative: "выраз",
                instrumental: "выразам",
                indefinite: "выраз",
                definite: "выраз",
                no_determiner: "выраз",
            },
            (Expression, Locale::Ru) => Forms {
                nominative: "выражение",
                genitive: "выражения",
                accusative: "выражение",
                instrumental: "выражением",
                indefinite: "выражение",
                definite: "выражение",
                no_determiner: "выражение",
            },
        }
    }

    /// A natural phrase such as "the function" / "функцыя" for the given
    /// locale, used as the subject of most diagnostics.
    pub fn described(self, locale: Locale) -> &'static str {
        let case = match locale {
            Locale::En => Case::Definite,
            _ => Case::Nominative,
        };
        self.forms(locale).get(case)
    }
}

/// Adjectives compose with [`Noun`]s; Belarusian/Russian agree in gender,
/// which `forms` below encodes directly rather than via a generic agreement
/// algorithm (there are only two adjectives and a handful of nouns).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjective {
    Valid,
    Overloaded,
}

impl Adjective {
    /// Render this adjective agreeing with `noun` in `locale`.
    pub fn agreeing_with(self, noun: Noun, locale: Locale) -> &'static str {
        use Adjective::*;
        use Noun::*;
        let feminine = matches!(noun, Variable | Type) && matches!(locale, Locale::Be | Locale::Ru);
        match (self, locale, feminine) {
            (Valid, Locale::En, _) => "valid",
            (Valid, Locale::Be, true) => "прыдатная",
            (Valid, Locale::Be, false) => "прыдатны",
            (Valid, Locale::Ru, true) => "подходящая",
            (Valid, Locale::Ru, false) => "подходящий",
            (Overloaded, Locale::En, _) => "overloaded",
            (Overloaded, Locale::Be, true) => "перагружаная",
            (Overloaded, Locale::Be, false) => "перагружаны",
            (Overloaded, Locale::Ru, true) => "перегруженная",
            (Overloaded, Locale::Ru, false) => "перегруженный",
        }
    }
}
