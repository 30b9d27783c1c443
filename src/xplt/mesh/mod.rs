//! Finite element mesh populated by the reader.
//!
//! The mesh owns nodes and elements, the canonical face list derived from
//! element adjacency and a node-to-face table used to resolve declared
//! surface faces.

pub mod faces;
pub mod groups;

use log::debug;

use crate::xplt::types::error::{Result, XpltError};
use crate::xplt::types::models::ElementType;
use faces::{Face, FaceSource};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i32,
    pub position: [f32; 3],
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: i32,
    pub kind: ElementType,
    pub material: usize,
    pub nodes: Vec<usize>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    faces: Vec<Face>,
    node_faces: Vec<Vec<usize>>,
}

fn reserve<T>(v: &mut Vec<T>, n: usize, what: &str) -> Result<()> {
    v.try_reserve_exact(n)
        .map_err(|_| XpltError::Allocation(format!("{} {}", n, what)))
}

impl Mesh {
    /// Allocates a mesh with exact node and element capacity.
    pub fn with_capacity(node_count: usize, element_count: usize) -> Result<Self> {
        let mut mesh = Mesh::default();
        reserve(&mut mesh.nodes, node_count, "nodes")?;
        reserve(&mut mesh.elements, element_count, "elements")?;
        Ok(mesh)
    }

    pub fn add_node(&mut self, id: i32, position: [f32; 3]) {
        self.nodes.push(Node {
            id,
            position,
            enabled: true,
        });
    }

    /// Adds an element after checking its connectivity against the node list.
    pub fn add_element(&mut self, id: i32, kind: ElementType, material: usize, nodes: Vec<usize>) -> Result<()> {
        if nodes.len() != kind.node_count() {
            return Err(XpltError::CountMismatch {
                item_type: format!("nodes of element {}", id),
                expected: kind.node_count() as u64,
                found: nodes.len() as u64,
            });
        }
        if let Some(&bad) = nodes.iter().find(|&&n| n >= self.nodes.len()) {
            return Err(XpltError::IndexOutOfRange {
                what: "node",
                index: bad,
                len: self.nodes.len(),
            });
        }
        self.elements.push(Element {
            id,
            kind,
            material,
            nodes,
            enabled: true,
        });
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Faces having `node` as a corner.
    pub fn node_faces(&self, node: usize) -> &[usize] {
        self.node_faces.get(node).map_or(&[], |v| v.as_slice())
    }

    /// Propagates material visibility: an element is enabled iff its material
    /// is, a node iff any incident element is.
    pub fn update_enabled(&mut self, material_enabled: impl Fn(usize) -> bool) {
        for node in &mut self.nodes {
            node.enabled = false;
        }
        for el in &mut self.elements {
            el.enabled = material_enabled(el.material);
            if el.enabled {
                for &n in &el.nodes {
                    self.nodes[n].enabled = true;
                }
            }
        }
    }

    /// Rebuilds the canonical face list and the node-to-face table.
    pub fn build_faces(&mut self) {
        let sources: Vec<FaceSource<'_>> = self
            .elements
            .iter()
            .map(|el| FaceSource {
                kind: el.kind,
                material: el.material,
                nodes: &el.nodes,
                enabled: el.enabled,
            })
            .collect();
        let faces = faces::build_faces(&sources);
        self.node_faces = faces::build_node_face_table(self.nodes.len(), &faces);
        debug!("Built {} faces for {} elements", faces.len(), self.elements.len());
        self.faces = faces;
    }

    /// Finds the canonical face with the same corner nodes as `nodes`.
    pub fn find_face(&self, nodes: &[usize]) -> Option<usize> {
        let kind = faces::FaceType::from_node_count(nodes.len())?;
        let corners = &nodes[..kind.corners()];
        self.node_faces(corners[0])
            .iter()
            .copied()
            .find(|&f| self.faces[f].matches(corners))
    }
}
