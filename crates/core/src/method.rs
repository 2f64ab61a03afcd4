//! Owners of instruction streams: classes, methods and their locations.

use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary class name in internal form (`com/example/Foo`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    /// Accepts both `com.example.Foo` and `com/example/Foo`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().replace('.', "/"))
    }

    pub fn as_internal(&self) -> &str {
        &self.0
    }

    /// Dotted source form (`com.example.Foo`).
    pub fn as_java_name(&self) -> String {
        self.0.replace('/', ".")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_java_name())
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        ClassName::new(name)
    }
}

/// Method name plus descriptor; overloads differ only in the descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodName {
    pub name: String,
    pub descriptor: String,
}

impl MethodName {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Where a method lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub class: ClassName,
    pub method: MethodName,
}

impl Location {
    pub fn new(class: impl Into<ClassName>, name: &str, descriptor: &str) -> Self {
        Self {
            class: class.into(),
            method: MethodName::new(name, descriptor),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// A method body as handed over by the class loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub location: Location,
    pub instructions: Vec<Instruction>,
}

impl Method {
    pub fn new(location: Location, instructions: Vec<Instruction>) -> Self {
        Self {
            location,
            instructions,
        }
    }

    /// Source line in effect at each instruction index, from the `Line` markers.
    pub fn line_at(&self, index: usize) -> Option<u32> {
        self.instructions
            .iter()
            .take(index.saturating_add(1))
            .rev()
            .find_map(|insn| match insn {
                Instruction::Line(line) => Some(*line),
                _ => None,
            })
    }
}
