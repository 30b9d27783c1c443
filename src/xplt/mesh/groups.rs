//! Element, face and node groupings read from the file, and the wrappers
//! built on top of the canonical mesh.

use crate::xplt::types::models::ElementType;

/// One element as listed in a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainElement {
    pub id: i32,
    pub nodes: Vec<usize>,
}

/// A material-homogeneous group of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub element_type: ElementType,
    /// Zero-based material (legacy) or part (2.0) index.
    pub material: usize,
    pub name: String,
    pub elements: Vec<DomainElement>,
    /// Mesh index of the domain's first element.
    pub first_element: usize,
    /// Filled in once the mesh is built.
    pub node_map: LocalNodeMap,
}

impl Domain {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Mesh indices of the domain's elements.
    pub fn element_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.first_element..self.first_element + self.elements.len()
    }
}

/// Local numbering of the nodes of a group of items.
///
/// Nodes get consecutive local ids in order of first appearance while walking
/// the items in order. Per-node data of a region is stored in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalNodeMap {
    /// Global node index of each local node.
    pub nodes: Vec<usize>,
    /// Local index of every item node, item by item.
    pub item_nodes: Vec<usize>,
    /// Node count of each item.
    pub counts: Vec<usize>,
}

impl LocalNodeMap {
    pub fn build<'a, I>(items: I, node_count: usize) -> Self
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut local_of = vec![usize::MAX; node_count];
        let mut map = LocalNodeMap::default();
        for nodes in items {
            for &n in nodes {
                if local_of[n] == usize::MAX {
                    local_of[n] = map.nodes.len();
                    map.nodes.push(n);
                }
                map.item_nodes.push(local_of[n]);
            }
            map.counts.push(nodes.len());
        }
        map
    }
}

/// One face as listed in a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFace {
    pub id: i32,
    /// Nodes in declared order.
    pub nodes: Vec<usize>,
    /// Canonical face index, or `None` when the face could not be matched.
    pub resolved: Option<usize>,
    /// Declared index of the node at each canonical position.
    pub canonical_order: Vec<usize>,
}

/// A named group of faces as declared in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDef {
    pub id: u32,
    pub name: String,
    /// Value slots per face for multi-value face data.
    pub max_facet_nodes: usize,
    pub faces: Vec<SurfaceFace>,
    /// Filled in once the mesh is built.
    pub node_map: LocalNodeMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSet {
    pub id: u32,
    pub name: String,
    pub nodes: Vec<usize>,
}

/// A named part (2.0) or material (legacy).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: usize,
    pub name: String,
    /// Default rendering color, RGBA.
    pub color: [u8; 4],
    pub enabled: bool,
}

const PALETTE: [[u8; 4]; 16] = [
    [199, 81, 81, 255],
    [81, 141, 199, 255],
    [120, 199, 81, 255],
    [199, 180, 81, 255],
    [160, 81, 199, 255],
    [81, 199, 186, 255],
    [199, 128, 81, 255],
    [128, 128, 199, 255],
    [199, 81, 150, 255],
    [81, 199, 120, 255],
    [170, 170, 170, 255],
    [150, 100, 60, 255],
    [100, 150, 60, 255],
    [60, 100, 150, 255],
    [150, 60, 100, 255],
    [220, 220, 120, 255],
];

impl Material {
    pub fn new(id: usize, name: String) -> Self {
        Self {
            id,
            name,
            color: PALETTE[id % PALETTE.len()],
            enabled: true,
        }
    }
}

/// Elements of one material/part, by mesh index.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub material: usize,
    pub name: String,
    pub elements: Vec<usize>,
}

/// Canonical faces of a declared surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: u32,
    pub name: String,
    pub faces: Vec<usize>,
}
