//! Per-file registries of declared classes, enums, functions and variables.
//!
//! Records are created when their header line is recognized and are never
//! removed while a file is being converted. Lookups answer questions such
//! as "is this word a known type?" while later lines are rewritten.

use std::collections::{BTreeMap, HashMap};

/// Target type used when a declaration names no type.
pub const DEFAULT_TYPE: &str = "object";

/// A declared variable, field or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub access_modifiers: Vec<String>,
    pub var_type: String,
    pub is_array: bool,
    /// The emitted declaration must construct its value (`new T()`).
    pub is_new: bool,
    pub name: String,
    /// Initializer expression; empty when there is none.
    pub assignment: String,
}

impl Default for VariableInfo {
    fn default() -> Self {
        Self {
            access_modifiers: Vec::new(),
            var_type: DEFAULT_TYPE.to_string(),
            is_array: false,
            is_new: false,
            name: String::new(),
            assignment: String::new(),
        }
    }
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            ..Self::default()
        }
    }
}

/// A class or module and its field declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    name: String,
    variables: HashMap<String, VariableInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a field. The first declaration of a name wins.
    pub fn add_variable(&mut self, variable: VariableInfo) {
        self.variables
            .entry(variable.name.clone())
            .or_insert(variable);
    }

    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.get(name)
    }
}

/// An enum declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumInfo {
    access_modifiers: Vec<String>,
    name: String,
    values: BTreeMap<String, i64>,
    next_value: i64,
}

impl EnumInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier, keeping insertion order and skipping duplicates.
    pub fn add_access_modifier(&mut self, modifier: &str) {
        if !self.access_modifiers.iter().any(|m| m == modifier) {
            self.access_modifiers.push(modifier.to_string());
        }
    }

    pub fn access_modifiers(&self) -> &[String] {
        &self.access_modifiers
    }

    /// Assign the name if none has been assigned yet.
    pub fn add_name(&mut self, name: &str) {
        if self.name.is_empty() {
            self.name = name.to_string();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record an enumerator. The first value recorded for a name wins.
    pub fn add_value(&mut self, name: &str, value: i64) {
        if !self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            self.next_value = value.saturating_add(1);
        }
    }

    /// Record an enumerator with no explicit value: one past the previous.
    pub fn add_implicit_value(&mut self, name: &str) {
        self.add_value(name, self.next_value);
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }
}

/// A function, sub, constructor or property accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub access_modifiers: Vec<String>,
    /// Return type; `None` for constructors.
    pub return_type: Option<String>,
    pub name: String,
    /// Each parameter's ops; after type resolution a parameter reads
    /// `[type, name]`, optionally followed by `=` and a default value.
    pub parameters: Vec<Vec<String>>,
    pub(crate) variables: HashMap<String, VariableInfo>,
}

impl Default for FunctionInfo {
    fn default() -> Self {
        Self {
            access_modifiers: Vec::new(),
            return_type: Some(DEFAULT_TYPE.to_string()),
            name: String::new(),
            parameters: Vec::new(),
            variables: HashMap::new(),
        }
    }
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Register a local. Re-declaring a name only replaces its type.
    pub fn add_variable(&mut self, variable: VariableInfo) {
        match self.variables.get_mut(&variable.name) {
            Some(existing) => existing.var_type = variable.var_type,
            None => {
                self.variables.insert(variable.name.clone(), variable);
            }
        }
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.get(name)
    }
}

/// All registries for one file.
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    pub classes: HashMap<String, ClassInfo>,
    pub enums: HashMap<String, EnumInfo>,
    pub functions: HashMap<String, FunctionInfo>,
    /// Variables declared outside any class or function.
    pub variables: HashMap<String, VariableInfo>,
}

impl SymbolTables {
    /// Register a class. An existing record with the same name is kept.
    pub fn add_class(&mut self, name: &str) {
        let info = ClassInfo::new(name);
        self.classes.entry(info.name().to_string()).or_insert(info);
    }

    /// Register an enum. An existing record with the same name is kept.
    pub fn add_enum(&mut self, info: EnumInfo) {
        self.enums.entry(info.name().to_string()).or_insert(info);
    }

    /// Register a function. An existing record with the same name is kept.
    pub fn add_function(&mut self, info: FunctionInfo) {
        self.functions.entry(info.name.clone()).or_insert(info);
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// True for any user-declared type name.
    pub fn is_user_type(&self, name: &str) -> bool {
        self.is_class(name) || self.is_enum(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_first_write_wins() {
        let mut info = EnumInfo::new();
        info.add_name("Color");
        info.add_name("Shade");
        info.add_access_modifier("public");
        info.add_access_modifier("public");
        info.add_value("Red", 1);
        info.add_value("Red", 7);
        info.add_implicit_value("Green");

        assert_eq!(info.name(), "Color");
        assert_eq!(info.access_modifiers(), ["public"]);
        assert_eq!(info.value("Red"), Some(1));
        assert_eq!(info.value("Green"), Some(2));
    }

    #[test]
    fn test_implicit_enum_values_start_at_zero() {
        let mut info = EnumInfo::new();
        info.add_implicit_value("A");
        info.add_implicit_value("B");
        assert_eq!(info.value("A"), Some(0));
        assert_eq!(info.value("B"), Some(1));
    }

    #[test]
    fn test_function_redeclaration_overwrites_type_only() {
        let mut info = FunctionInfo::new("Total");
        let mut first = VariableInfo::new("sum", "int");
        first.assignment = "0".to_string();
        info.add_variable(first);
        info.add_variable(VariableInfo::new("sum", "long"));
        let sum = info.variable("sum").unwrap();
        assert_eq!(sum.var_type, "long");
        assert_eq!(sum.assignment, "0");
    }

    #[test]
    fn test_class_registration_keeps_first() {
        let mut tables = SymbolTables::default();
        tables.add_class("Foo");
        tables
            .classes
            .get_mut("Foo")
            .unwrap()
            .add_variable(VariableInfo::new("x", "int"));
        tables.add_class("Foo");
        assert!(tables.classes["Foo"].variable("x").is_some());
        assert!(tables.is_user_type("Foo"));
        assert!(!tables.is_user_type("Bar"));
    }
}
