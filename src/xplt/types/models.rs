//! Core data structures for XPLT format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - File header and format epoch
//! - Dictionary declarations (value types, storage formats, scopes)
//! - The closed element type table

use std::fmt;

use super::error::{Result, XpltError};

/// The two wire-layout epochs of the XPLT container.
///
/// The split is a convention of the container: versions up to 4 use the
/// legacy layout, anything above uses the 2.0 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatEpoch {
    Legacy,
    V2,
}

impl TryFrom<u32> for FormatEpoch {
    type Error = XpltError;
    fn try_from(version: u32) -> Result<Self> {
        match version {
            0 => Err(XpltError::UnsupportedVersion(version)),
            1..=4 => Ok(Self::Legacy),
            _ => Ok(Self::V2),
        }
    }
}

impl fmt::Display for FormatEpoch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatEpoch::Legacy => write!(f, "legacy"),
            FormatEpoch::V2 => write!(f, "2.0"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Zlib,
}

impl TryFrom<u32> for Compression {
    type Error = XpltError;
    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            _ => Err(XpltError::InvalidFormat(format!("Unknown compression flag: {}", value))),
        }
    }
}

/// Parsed file header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Raw version number as stored in the file.
    pub version: u32,
    pub epoch: FormatEpoch,
    /// Applies to state sections only.
    pub compression: Compression,
    /// Legacy files declare the node count up front.
    pub node_count: Option<u32>,
    /// Legacy files declare the face slot width globally.
    pub max_facet_nodes: Option<u32>,
    pub author: Option<String>,
    pub software: Option<String>,
}

/// Value type of a dictionary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Float,
    Vec3,
    Mat3Sym,
    /// Three-component tensor stored as its diagonal.
    Mat3Diagonal,
    Tens4Sym,
    Mat3General,
}

impl ValueType {
    pub const ALL: [ValueType; 6] = [
        ValueType::Float,
        ValueType::Vec3,
        ValueType::Mat3Sym,
        ValueType::Mat3Diagonal,
        ValueType::Tens4Sym,
        ValueType::Mat3General,
    ];

    /// Number of `f32` components one value occupies on the wire.
    pub fn components(&self) -> usize {
        match self {
            ValueType::Float => 1,
            ValueType::Vec3 => 3,
            ValueType::Mat3Sym => 6,
            ValueType::Mat3Diagonal => 3,
            ValueType::Tens4Sym => 21,
            ValueType::Mat3General => 9,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ValueType::Float => 0,
            ValueType::Vec3 => 1,
            ValueType::Mat3Sym => 2,
            ValueType::Mat3Diagonal => 3,
            ValueType::Tens4Sym => 4,
            ValueType::Mat3General => 5,
        }
    }
}

impl TryFrom<u32> for ValueType {
    type Error = XpltError;
    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Float),
            1 => Ok(Self::Vec3),
            2 => Ok(Self::Mat3Sym),
            3 => Ok(Self::Mat3Diagonal),
            4 => Ok(Self::Tens4Sym),
            5 => Ok(Self::Mat3General),
            _ => Err(XpltError::UnknownValueType(code)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueType::Float => "float",
            ValueType::Vec3 => "vec3",
            ValueType::Mat3Sym => "mat3 (symmetric)",
            ValueType::Mat3Diagonal => "mat3 (diagonal)",
            ValueType::Tens4Sym => "tens4 (symmetric)",
            ValueType::Mat3General => "mat3",
        };
        write!(f, "{}", name)
    }
}

/// How many values a field stores per mesh item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFormat {
    /// One value per node of the region, shared by the items touching it.
    PerNodeOfItem,
    /// One value per item.
    PerItem,
    /// One value per local node of each item.
    PerItemMultiValue,
    /// One value for the whole region.
    PerRegionConstant,
}

impl StorageFormat {
    pub const ALL: [StorageFormat; 4] = [
        StorageFormat::PerNodeOfItem,
        StorageFormat::PerItem,
        StorageFormat::PerItemMultiValue,
        StorageFormat::PerRegionConstant,
    ];

    pub fn code(&self) -> u32 {
        match self {
            StorageFormat::PerNodeOfItem => 0,
            StorageFormat::PerItem => 1,
            StorageFormat::PerItemMultiValue => 2,
            StorageFormat::PerRegionConstant => 3,
        }
    }
}

impl TryFrom<u32> for StorageFormat {
    type Error = XpltError;
    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::PerNodeOfItem),
            1 => Ok(Self::PerItem),
            2 => Ok(Self::PerItemMultiValue),
            3 => Ok(Self::PerRegionConstant),
            _ => Err(XpltError::UnknownStorageFormat(code)),
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StorageFormat::PerNodeOfItem => "per node of item",
            StorageFormat::PerItem => "per item",
            StorageFormat::PerItemMultiValue => "per item (multi value)",
            StorageFormat::PerRegionConstant => "per region",
        };
        write!(f, "{}", name)
    }
}

/// The mesh entity a dictionary field is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Material,
    Node,
    Element,
    Face,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Scope::Global => "global",
            Scope::Material => "material",
            Scope::Node => "nodal",
            Scope::Element => "domain",
            Scope::Face => "surface",
        };
        write!(f, "{}", name)
    }
}

/// A single field declaration from the dictionary section.
#[derive(Debug, Clone, PartialEq)]
pub struct DictItem {
    pub name: String,
    pub value_type: ValueType,
    pub format: StorageFormat,
    pub scope: Scope,
    /// Array length for array-valued items (2.0 layout only).
    pub array_size: Option<u32>,
    /// Component names of array-valued items (2.0 layout only).
    pub array_names: Vec<String>,
    /// Index of the registered field in the data manager, if any.
    pub field: Option<usize>,
}

/// All field declarations of a file, grouped by scope.
///
/// The position of an item inside its scope list is what state sections refer
/// to (1-based on the wire).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    pub global: Vec<DictItem>,
    pub material: Vec<DictItem>,
    pub nodal: Vec<DictItem>,
    pub domain: Vec<DictItem>,
    pub surface: Vec<DictItem>,
}

impl Dictionary {
    pub fn items(&self, scope: Scope) -> &[DictItem] {
        match scope {
            Scope::Global => &self.global,
            Scope::Material => &self.material,
            Scope::Node => &self.nodal,
            Scope::Element => &self.domain,
            Scope::Face => &self.surface,
        }
    }

    pub fn items_mut(&mut self, scope: Scope) -> &mut Vec<DictItem> {
        match scope {
            Scope::Global => &mut self.global,
            Scope::Material => &mut self.material,
            Scope::Node => &mut self.nodal,
            Scope::Element => &mut self.domain,
            Scope::Face => &mut self.surface,
        }
    }

    /// Resolves a 1-based state variable id to the item it names.
    pub fn lookup(&self, scope: Scope, var_id: u32) -> Result<&DictItem> {
        let items = self.items(scope);
        (var_id as usize)
            .checked_sub(1)
            .and_then(|index| items.get(index))
            .ok_or(XpltError::IndexOutOfRange {
                what: "state variable",
                index: (var_id as usize).wrapping_sub(1),
                len: items.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.material.len() + self.nodal.len() + self.domain.len() + self.surface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Element types with a fixed node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Hex8,
    Penta6,
    Tet4,
    Quad4,
    Tri3,
    Truss2,
    Hex20,
    Tet10,
    Tet15,
    Hex27,
    Tri6,
    Quad8,
    Quad9,
    Penta15,
    Tet20,
    Pyra5,
}

impl ElementType {
    pub const ALL: [ElementType; 16] = [
        ElementType::Hex8,
        ElementType::Penta6,
        ElementType::Tet4,
        ElementType::Quad4,
        ElementType::Tri3,
        ElementType::Truss2,
        ElementType::Hex20,
        ElementType::Tet10,
        ElementType::Tet15,
        ElementType::Hex27,
        ElementType::Tri6,
        ElementType::Quad8,
        ElementType::Quad9,
        ElementType::Penta15,
        ElementType::Tet20,
        ElementType::Pyra5,
    ];

    /// Decodes an element type code. The legacy layout only knows codes 0-9.
    pub fn from_code(code: u32, epoch: FormatEpoch) -> Result<Self> {
        let kind = match code {
            0 => Self::Hex8,
            1 => Self::Penta6,
            2 => Self::Tet4,
            3 => Self::Quad4,
            4 => Self::Tri3,
            5 => Self::Truss2,
            6 => Self::Hex20,
            7 => Self::Tet10,
            8 => Self::Tet15,
            9 => Self::Hex27,
            10 => Self::Tri6,
            11 => Self::Quad8,
            12 => Self::Quad9,
            13 => Self::Penta15,
            14 => Self::Tet20,
            16 => Self::Pyra5,
            _ => return Err(XpltError::UnknownElementType(code)),
        };
        if epoch == FormatEpoch::Legacy && code > 9 {
            return Err(XpltError::UnknownElementType(code));
        }
        Ok(kind)
    }

    pub fn code(&self) -> u32 {
        match self {
            ElementType::Hex8 => 0,
            ElementType::Penta6 => 1,
            ElementType::Tet4 => 2,
            ElementType::Quad4 => 3,
            ElementType::Tri3 => 4,
            ElementType::Truss2 => 5,
            ElementType::Hex20 => 6,
            ElementType::Tet10 => 7,
            ElementType::Tet15 => 8,
            ElementType::Hex27 => 9,
            ElementType::Tri6 => 10,
            ElementType::Quad8 => 11,
            ElementType::Quad9 => 12,
            ElementType::Penta15 => 13,
            ElementType::Tet20 => 14,
            ElementType::Pyra5 => 16,
        }
    }

    /// Number of node indices each element of this type carries.
    pub fn node_count(&self) -> usize {
        match self {
            ElementType::Hex8 => 8,
            ElementType::Penta6 => 6,
            ElementType::Tet4 => 4,
            ElementType::Quad4 => 4,
            ElementType::Tri3 => 3,
            ElementType::Truss2 => 2,
            ElementType::Hex20 => 20,
            ElementType::Tet10 => 10,
            ElementType::Tet15 => 15,
            ElementType::Hex27 => 27,
            ElementType::Tri6 => 6,
            ElementType::Quad8 => 8,
            ElementType::Quad9 => 9,
            ElementType::Penta15 => 15,
            ElementType::Tet20 => 20,
            ElementType::Pyra5 => 5,
        }
    }

    pub fn is_shell(&self) -> bool {
        matches!(
            self,
            ElementType::Quad4 | ElementType::Tri3 | ElementType::Tri6 | ElementType::Quad8 | ElementType::Quad9
        )
    }

    pub fn is_beam(&self) -> bool {
        matches!(self, ElementType::Truss2)
    }

    pub fn is_solid(&self) -> bool {
        !self.is_shell() && !self.is_beam()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElementType::Hex8 => "hex8",
            ElementType::Penta6 => "penta6",
            ElementType::Tet4 => "tet4",
            ElementType::Quad4 => "quad4",
            ElementType::Tri3 => "tri3",
            ElementType::Truss2 => "truss2",
            ElementType::Hex20 => "hex20",
            ElementType::Tet10 => "tet10",
            ElementType::Tet15 => "tet15",
            ElementType::Hex27 => "hex27",
            ElementType::Tri6 => "tri6",
            ElementType::Quad8 => "quad8",
            ElementType::Quad9 => "quad9",
            ElementType::Penta15 => "penta15",
            ElementType::Tet20 => "tet20",
            ElementType::Pyra5 => "pyra5",
        };
        write!(f, "{}", name)
    }
}
