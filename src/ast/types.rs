use std::fmt::Display;

/// The two value types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "bool" => Some(Type::Bool),
            "int" => Some(Type::Int),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
        }
    }
}
