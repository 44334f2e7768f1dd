#[cfg(test)]
mod test;

use std::fmt::Display;

use log::trace;
use ordermap::OrderMap;
use thiserror::Error;

use crate::lexer::token::Keyword;

/// Storage class of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Static, Kind::Field, Kind::Argument, Kind::Local];

    pub fn is_class_scope(&self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }

    fn slot(&self) -> usize {
        match self {
            Kind::Static => 0,
            Kind::Field => 1,
            Kind::Argument => 2,
            Kind::Local => 3,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Argument => "argument",
            Kind::Local => "local",
        })
    }
}

impl TryFrom<Keyword> for Kind {
    type Error = SymbolError;

    fn try_from(kw: Keyword) -> Result<Self, Self::Error> {
        match kw {
            Keyword::Static => Ok(Kind::Static),
            Keyword::Field => Ok(Kind::Field),
            Keyword::Var => Ok(Kind::Local),
            _ => Err(SymbolError::InvalidKind(kw.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolError {
    #[error("`{name}` is already defined as a {kind} in this scope")]
    DuplicateSymbol { name: String, kind: Kind },

    #[error("undeclared identifier `{0}`")]
    UnresolvedSymbol(String),

    #[error("`{0}` is not a variable kind")]
    InvalidKind(String),

    #[error("field `{0}` used in a function, where no object is bound")]
    FieldWithoutReceiver(String),
}

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

type Scope = OrderMap<String, Symbol>;

/// Two-tier name resolver: class scope for statics and fields, subroutine
/// scope for arguments and locals. Lookups try the subroutine scope first.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: Scope,
    subroutine_scope: Scope,
    counts: [u16; 4],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every subroutine-scope entry and zeroes the argument and local
    /// counters. Static and field counts belong to the class and survive.
    pub fn reset_subroutine_scope(&mut self) {
        self.subroutine_scope.clear();
        self.counts[Kind::Argument.slot()] = 0;
        self.counts[Kind::Local.slot()] = 0;
    }

    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> SymbolResult<&Symbol> {
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };

        if let Some(prev) = scope.get(name) {
            return Err(SymbolError::DuplicateSymbol {
                name: name.to_string(),
                kind: prev.kind,
            });
        }

        let index = self.counts[kind.slot()];
        self.counts[kind.slot()] += 1;
        trace!("define {kind} {ty} {name} -> {index}");

        let symbol = scope.entry(name.to_string()).or_insert(Symbol {
            name: name.to_string(),
            ty: ty.to_string(),
            kind,
            index,
        });
        Ok(symbol)
    }

    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counts[kind.slot()]
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// `None` plays the role of the NONE kind: the name is not a variable.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> SymbolResult<&str> {
        self.resolve(name).map(|s| s.ty.as_str())
    }

    pub fn index_of(&self, name: &str) -> SymbolResult<u16> {
        self.resolve(name).map(|s| s.index)
    }

    pub fn resolve(&self, name: &str) -> SymbolResult<&Symbol> {
        self.lookup(name)
            .ok_or_else(|| SymbolError::UnresolvedSymbol(name.to_string()))
    }

    /// Symbols of one kind in declaration order.
    pub fn symbols(&self, kind: Kind) -> impl Iterator<Item = &Symbol> {
        let scope = if kind.is_class_scope() {
            &self.class_scope
        } else {
            &self.subroutine_scope
        };
        scope.values().filter(move |s| s.kind == kind)
    }
}
