//! Field registry mapping names to field indices and declarations.

use log::debug;

use crate::xplt::types::models::{Dictionary, Scope, StorageFormat, ValueType};

/// Where a registered field comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Declared in the file; `index` is the item's position in its scope list.
    Dictionary { index: usize },
    /// Added because a field named `trigger` was declared.
    Derived { trigger: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub value_type: ValueType,
    /// Format as declared.
    pub format: StorageFormat,
    pub scope: Scope,
    pub source: FieldSource,
}

impl FieldDescriptor {
    /// Format of the per-state container. Nodal data is always one value
    /// per node whatever the declaration says.
    pub fn container_format(&self) -> StorageFormat {
        match self.scope {
            Scope::Node => StorageFormat::PerItem,
            _ => self.format,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, FieldSource::Derived { .. })
    }
}

struct DerivedField {
    name: &'static str,
    scope: Scope,
    value_type: ValueType,
    format: StorageFormat,
}

const fn derived(name: &'static str, scope: Scope, value_type: ValueType, format: StorageFormat) -> DerivedField {
    DerivedField {
        name,
        scope,
        value_type,
        format,
    }
}

/// Fields added when a field with the trigger name is declared.
const DERIVED_FIELDS: &[(&str, &[DerivedField])] = &[
    (
        "displacement",
        &[
            derived("Lagrange strain", Scope::Element, ValueType::Mat3Sym, StorageFormat::PerItem),
            derived("position", Scope::Node, ValueType::Vec3, StorageFormat::PerItem),
            derived("initial position", Scope::Node, ValueType::Vec3, StorageFormat::PerItem),
        ],
    ),
    (
        "stress",
        &[derived("pressure", Scope::Element, ValueType::Float, StorageFormat::PerItem)],
    ),
    (
        "nodal stress",
        &[derived("nodal pressure", Scope::Element, ValueType::Float, StorageFormat::PerItemMultiValue)],
    ),
    (
        "shell thickness",
        &[derived("shell strain", Scope::Element, ValueType::Mat3Sym, StorageFormat::PerItem)],
    ),
    (
        "fluid pressure",
        &[derived("solid stress", Scope::Element, ValueType::Mat3Sym, StorageFormat::PerItem)],
    ),
    (
        "elasticity",
        &[derived("elasticity eigenvalues", Scope::Element, ValueType::Vec3, StorageFormat::PerItem)],
    ),
];

/// Registry of every field of a loaded file.
///
/// The field index returned by registration is the key into each state's
/// data maps.
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    fields: Vec<FieldDescriptor>,
}

impl DataManager {
    /// Registers the nodal, domain and surface items of `dictionary`, stores
    /// the assigned field index back into each item, then appends the derived
    /// fields their names trigger.
    pub fn register_dictionary(&mut self, dictionary: &mut Dictionary) {
        for scope in [Scope::Node, Scope::Element, Scope::Face] {
            for (index, item) in dictionary.items_mut(scope).iter_mut().enumerate() {
                let field = self.fields.len();
                self.fields.push(FieldDescriptor {
                    name: item.name.clone(),
                    value_type: item.value_type,
                    format: item.format,
                    scope,
                    source: FieldSource::Dictionary { index },
                });
                item.field = Some(field);
                debug!(
                    "Registered {} field {} '{}' ({}, {})",
                    scope, field, item.name, item.value_type, item.format
                );
            }
        }

        for &(trigger, extra) in DERIVED_FIELDS {
            if !self.fields.iter().any(|f| f.name == trigger && !f.is_derived()) {
                continue;
            }
            for d in extra {
                debug!("Adding derived field '{}' (from '{}')", d.name, trigger);
                self.fields.push(FieldDescriptor {
                    name: d.name.to_string(),
                    value_type: d.value_type,
                    format: d.format,
                    scope: d.scope,
                    source: FieldSource::Derived { trigger },
                });
            }
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Index of the first field called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields of one scope that are read from state sections.
    pub fn dictionary_fields(&self, scope: Scope) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.scope == scope && !f.is_derived())
    }
}
