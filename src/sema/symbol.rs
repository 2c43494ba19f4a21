//! Symbol & Type model (spec.md §3, §4.1).
//!
//! Entities are stored behind `Rc<RefCell<_>>` handles — spec.md §9 asks for
//! "stable handles into arenas rather than owning pointers" to support
//! cyclic symbol graphs (a type referencing itself through a method
//! parameter); `Rc`/`RefCell` is the idiomatic stand-in for that arena the
//! teacher's own `TypeScope` (`Rc<RefCell<ScopeFrame>>`) already reaches for.
//!
//! `Function`, `Method` and `Constructor` share every field spec.md gives
//! them except identity (a constructor has no name or return type of its
//! own); rather than three near-identical structs we model all three as one
//! [`Callable`] tagged by [`CallableKind`], matching the capability-set
//! framing spec.md itself uses ("Function: ...", "Method: like Function
//! but...", "Constructor: ..."). See DESIGN.md.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{diagnostics::terms::Noun, source::SourceCode};

pub type TypeRef = Rc<RefCell<TypeData>>;
pub type VariableRef = Rc<RefCell<VariableData>>;
pub type CallableRef = Rc<RefCell<Callable>>;

/// A variable: a local, a parameter, a field, or a global.
#[derive(Debug)]
pub struct VariableData {
    pub name: String,
    pub ty: TypeRef,
    pub definition_site: Option<SourceCode>,
}

impl VariableData {
    pub fn new(name: impl Into<String>, ty: TypeRef, definition_site: Option<SourceCode>) -> VariableRef {
        Rc::new(RefCell::new(VariableData {
            name: name.into(),
            ty,
            definition_site,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableTag {
    Function,
    Method,
    Constructor,
}

#[derive(Debug, Clone)]
pub enum CallableKind {
    Function { name: String },
    Method { name: String, container: TypeRef },
    Constructor { container: TypeRef },
}

impl CallableKind {
    pub fn tag(&self) -> CallableTag {
        match self {
            CallableKind::Function { .. } => CallableTag::Function,
            CallableKind::Method { .. } => CallableTag::Method,
            CallableKind::Constructor { .. } => CallableTag::Constructor,
        }
    }

    pub fn name(&self) -> String {
        match self {
            CallableKind::Function { name } | CallableKind::Method { name, .. } => name.clone(),
            CallableKind::Constructor { container } => container.borrow().name.clone(),
        }
    }

    pub fn container(&self) -> Option<TypeRef> {
        match self {
            CallableKind::Function { .. } => None,
            CallableKind::Method { container, .. } | CallableKind::Constructor { container } => Some(container.clone()),
        }
    }
}

/// A function, method or constructor (spec.md §3's Function/Method/
/// Constructor capability sets, unified — see module docs).
#[derive(Debug)]
pub struct Callable {
    pub kind: CallableKind,
    pub params: Vec<VariableRef>,
    /// `None` only for constructors, which have no declared return type.
    pub return_type: Option<TypeRef>,
    pub native: bool,
    pub body: RefCell<crate::sema::typed::TypedCodeBlock>,
    pub definition_site: Option<SourceCode>,
}

impl Callable {
    pub fn param_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.borrow().ty.clone()).collect()
    }

    pub fn is_copy_constructor(&self) -> bool {
        let Some(container) = self.kind.container() else {
            return false;
        };
        self.kind.tag() == CallableTag::Constructor
            && self.params.len() == 1
            && Rc::ptr_eq(&self.params[0].borrow().ty, &container)
    }

    pub fn signature_string(&self) -> String {
        let return_part = self
            .return_type
            .as_ref()
            .map(|t| t.borrow().name.clone())
            .unwrap_or_else(|| "void".to_string());
        let params = self
            .param_types()
            .iter()
            .map(|t| t.borrow().name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        match &self.kind {
            CallableKind::Function { name } => format!("{return_part} {name}({params})"),
            CallableKind::Method { name, container } => {
                format!("{return_part} {}.{name}({params})", container.borrow().name)
            }
            CallableKind::Constructor { container } => format!("{}({params})", container.borrow().name),
        }
    }
}

/// An overload set: two or more [`Callable`]s sharing a name in one scope
/// (spec.md §3's OverloadedFunction/OverloadedMethod, unified the same way
/// as [`Callable`] itself).
pub type OverloadSet = Rc<RefCell<Vec<CallableRef>>>;

/// A value type (spec.md §3's `Type`). Reference types are represented as
/// the same struct with `is_reference_alias_of` pointing back at the value
/// type they alias, so `Type` and `ReferenceType` share one Rust type the
/// way the spec's own "every non-reference type has exactly one lazily
/// built ReferenceType alias" wants: the alias differs only by that flag and
/// by owning the synthesised `assign` method.
#[derive(Debug)]
pub struct TypeData {
    pub name: String,
    pub native: bool,
    pub fields: Vec<VariableRef>,
    pub methods: HashMap<String, OverloadSet>,
    pub constructors: Vec<CallableRef>,
    pub definition_site: Option<SourceCode>,
    /// `None` for a value type until its reference alias is built on
    /// demand; `Some(self)`-ish back-pointer stored on the alias itself.
    reference: RefCell<Option<TypeRef>>,
    /// `Some(value_type)` if this `TypeData` *is* a reference alias.
    pub aliased_value_type: Option<TypeRef>,
}

impl TypeData {
    pub fn new_value_type(name: impl Into<String>, native: bool, definition_site: Option<SourceCode>) -> TypeRef {
        Rc::new(RefCell::new(TypeData {
            name: name.into(),
            native,
            fields: vec![],
            methods: HashMap::new(),
            constructors: vec![],
            definition_site,
            reference: RefCell::new(None),
            aliased_value_type: None,
        }))
    }

    pub fn is_reference(&self) -> bool {
        self.aliased_value_type.is_some()
    }

    pub fn noun(&self) -> Noun {
        Noun::Type
    }

    /// `Type.addField` (spec.md §4.1): fields never overload, a name clash
    /// is always `EntityNameTaken`.
    pub fn add_field(&mut self, field: VariableRef, diagnostics: crate::Diagnostics) -> Vec<crate::Issue> {
        let name = field.borrow().name.clone();
        if let Some(existing) = self.fields.iter().find(|f| f.borrow().name == name) {
            return vec![diagnostics.entity_name_taken(
                field.borrow().definition_site.clone().unwrap(),
                &name,
                existing.borrow().definition_site.clone(),
            )];
        }
        self.fields.push(field);
        vec![]
    }

    /// `Type.addMethod` (spec.md §4.1): merges into an overload set on a
    /// name collision with another method, or raises
    /// `DuplicateMethodDefinition` on an identical parameter-type sequence.
    pub fn add_method(&mut self, name: &str, method: CallableRef, diagnostics: crate::Diagnostics) -> Vec<crate::Issue> {
        let container_name = self.name.clone();
        match self.methods.get(name).cloned() {
            None => {
                self.methods.insert(name.to_string(), Rc::new(RefCell::new(vec![method])));
                vec![]
            }
            Some(set) => {
                if let Some(clash) = set.borrow().iter().find(|c| crate::sema::scope::same_signature(c, &method)) {
                    return vec![diagnostics.duplicate_method_definition(
                        method.borrow().definition_site.clone().unwrap(),
                        &container_name,
                        name,
                        clash.borrow().definition_site.clone().unwrap(),
                    )];
                }
                set.borrow_mut().push(method);
                vec![]
            }
        }
    }

    /// `Type.addConstructor` (spec.md §4.1): raises
    /// `DuplicateConstructorDefinition` on an identical parameter-type
    /// sequence, `CopyConstructorDefinition` for a user-written copy
    /// constructor (those are synthesised automatically).
    pub fn add_constructor(&mut self, constructor: CallableRef, diagnostics: crate::Diagnostics) -> Vec<crate::Issue> {
        let container_name = self.name.clone();
        if constructor.borrow().is_copy_constructor() {
            return vec![diagnostics.copy_constructor_definition(
                constructor.borrow().definition_site.clone().unwrap(),
                &container_name,
            )];
        }
        if let Some(clash) = self
            .constructors
            .iter()
            .find(|c| crate::sema::scope::same_signature(c, &constructor))
        {
            return vec![diagnostics.duplicate_constructor_definition(
                constructor.borrow().definition_site.clone().unwrap(),
                &container_name,
                clash.borrow().definition_site.clone().unwrap(),
            )];
        }
        self.constructors.push(constructor);
        vec![]
    }

    /// `ConstructorContainer.resolveConstructor` (spec.md §4.1): the unique
    /// constructor whose parameter list accepts `arg_types`, if any.
    pub fn resolve_constructor(&self, unknown_type: &TypeRef, arg_types: &[TypeRef]) -> Option<CallableRef> {
        resolve_best_match(unknown_type, &self.constructors, arg_types)
    }
}

/// `Applicable.resolveOverload` (spec.md §4.1), shared by free functions,
/// methods and constructors: the unique best-matching candidate, or `None`
/// if there is no match or more than one equally good one (callers
/// distinguish those two cases via [`OverloadResolution`]).
///
/// Ranks candidates only by applicability, not by closeness of match: an
/// exact-type candidate and a candidate reached only through a `T&`→`T`
/// deref conversion are both treated as equally applicable and tie into
/// `Ambiguous` rather than the exact match winning. colang's own tie-break
/// rule here isn't retained anywhere in this pack to check against, so this
/// is left as the conservative (over-reports ambiguity rather than guesses)
/// behaviour until that can be confirmed.
pub fn resolve_overload(unknown_type: &TypeRef, candidates: &[CallableRef], arg_types: &[TypeRef]) -> OverloadResolution {
    let applicable: Vec<CallableRef> = candidates
        .iter()
        .filter(|c| {
            let c = c.borrow();
            c.params.len() == arg_types.len()
                && c.params
                    .iter()
                    .zip(arg_types.iter())
                    .all(|(p, a)| is_implicitly_convertible(unknown_type, a, &p.borrow().ty))
        })
        .cloned()
        .collect();

    match applicable.len() {
        0 => OverloadResolution::NoMatch,
        1 => OverloadResolution::Unique(applicable[0].clone()),
        _ => OverloadResolution::Ambiguous(applicable),
    }
}

fn resolve_best_match(unknown_type: &TypeRef, candidates: &[CallableRef], arg_types: &[TypeRef]) -> Option<CallableRef> {
    match resolve_overload(unknown_type, candidates, arg_types) {
        OverloadResolution::Unique(callable) => Some(callable),
        _ => None,
    }
}

pub enum OverloadResolution {
    Unique(CallableRef),
    Ambiguous(Vec<CallableRef>),
    NoMatch,
}

/// Build (or fetch) the lazily-constructed reference alias of `value_type`.
/// `value_type` must itself not already be a reference type — callers check
/// `OverreferencedType` before calling this (spec.md §4.3).
pub fn reference_of(value_type: &TypeRef) -> TypeRef {
    debug_assert!(!value_type.borrow().is_reference());
    if let Some(existing) = value_type.borrow().reference.borrow().clone() {
        return existing;
    }
    let alias = Rc::new(RefCell::new(TypeData {
        name: format!("{}&", value_type.borrow().name),
        native: true,
        fields: vec![],
        methods: HashMap::new(),
        constructors: vec![],
        definition_site: None,
        reference: RefCell::new(None),
        aliased_value_type: Some(value_type.clone()),
    }));
    install_assign_method(&alias, value_type);
    *value_type.borrow().reference.borrow_mut() = Some(alias.clone());
    alias
}

fn install_assign_method(reference_type: &TypeRef, value_type: &TypeRef) {
    use crate::sema::typed::TypedCodeBlock;
    let this_param = VariableData::new("rhs", value_type.clone(), None);
    let assign = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Method {
            name: "assign".to_string(),
            container: reference_type.clone(),
        },
        params: vec![this_param],
        return_type: Some(reference_type.clone()),
        native: true,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: None,
    }));
    reference_type
        .borrow_mut()
        .methods
        .insert("assign".to_string(), Rc::new(RefCell::new(vec![assign])));
}

/// `a` converts to `b` iff they are the same type, `a` is `unknownType`,
/// `b` is `unknownType`, or `a` is the reference alias of `b` (spec.md
/// §4.1's conversion rules: `T&` converts to `T`, `T` does not convert to
/// `T&`).
pub fn is_implicitly_convertible(unknown_type: &TypeRef, a: &TypeRef, b: &TypeRef) -> bool {
    if Rc::ptr_eq(a, unknown_type) || Rc::ptr_eq(b, unknown_type) {
        return true;
    }
    if Rc::ptr_eq(a, b) {
        return true;
    }
    if let Some(aliased) = &a.borrow().aliased_value_type {
        return Rc::ptr_eq(aliased, b);
    }
    false
}

/// The non-reference form of `ty`: itself if it's already a value type,
/// otherwise the value type it aliases.
pub fn dereferenced(ty: &TypeRef) -> TypeRef {
    ty.borrow().aliased_value_type.clone().unwrap_or_else(|| ty.clone())
}

pub fn least_upper_bound(unknown_type: &TypeRef, a: &TypeRef, b: &TypeRef) -> Option<TypeRef> {
    if is_implicitly_convertible(unknown_type, b, a) {
        Some(a.clone())
    } else if is_implicitly_convertible(unknown_type, a, b) {
        Some(b.clone())
    } else {
        None
    }
}

impl fmt::Display for CallableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallableTag::Function => "function",
            CallableTag::Method => "method",
            CallableTag::Constructor => "constructor",
        })
    }
}
