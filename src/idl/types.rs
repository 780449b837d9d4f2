//! Varlink IDL Type Definitions
//!
//! Passive data structures for the members of an interface. Lookup and
//! resolution live on [`super::Interface`].

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Int,
    Float,
    String,

    /// `<element>[]`
    Array(Box<Type>),

    /// `(name: type, ...)`, fields in declaration order
    Struct(Vec<Field>),

    /// Reference to a `type` declared in the same interface, resolved by name
    /// at use time.
    Alias(String),
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn alias(name: impl Into<String>) -> Self {
        Type::Alias(name.into())
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }
}

/// A named struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// `type Name <type>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAlias {
    pub name: String,
    pub description: String,
    pub ty: Type,
}

/// `method Name(<input>) -> (<output>)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub description: String,
    pub input: Type,
    pub output: Type,
}

/// `error Name [<payload>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDecl {
    pub name: String,
    pub description: String,
    pub payload: Option<Type>,
}

/// One declaration inside an interface, in the order it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Alias(TypeAlias),
    Method(Method),
    Error(ErrorDecl),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Alias(alias) => &alias.name,
            Member::Method(method) => &method.name,
            Member::Error(error) => &error.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Member::Alias(alias) => &alias.description,
            Member::Method(method) => &method.description,
            Member::Error(error) => &error.description,
        }
    }
}

impl From<TypeAlias> for Member {
    fn from(alias: TypeAlias) -> Self {
        Member::Alias(alias)
    }
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

impl From<ErrorDecl> for Member {
    fn from(error: ErrorDecl) -> Self {
        Member::Error(error)
    }
}
