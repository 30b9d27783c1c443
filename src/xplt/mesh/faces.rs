//! Canonical face derivation and face matching.

use std::collections::HashMap;

use crate::xplt::types::models::ElementType;

/// Shape of a face, by node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceType {
    Tri3,
    Tri6,
    Tri7,
    Quad4,
    Quad8,
    Quad9,
}

impl FaceType {
    pub fn from_node_count(n: usize) -> Option<Self> {
        match n {
            3 => Some(FaceType::Tri3),
            4 => Some(FaceType::Quad4),
            6 => Some(FaceType::Tri6),
            7 => Some(FaceType::Tri7),
            8 => Some(FaceType::Quad8),
            9 => Some(FaceType::Quad9),
            _ => None,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            FaceType::Tri3 => 3,
            FaceType::Tri6 => 6,
            FaceType::Tri7 => 7,
            FaceType::Quad4 => 4,
            FaceType::Quad8 => 8,
            FaceType::Quad9 => 9,
        }
    }

    /// Corner nodes lead the node list.
    pub fn corners(&self) -> usize {
        match self {
            FaceType::Tri3 | FaceType::Tri6 | FaceType::Tri7 => 3,
            FaceType::Quad4 | FaceType::Quad8 | FaceType::Quad9 => 4,
        }
    }
}

/// A face of the canonical (derived) face list.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub kind: FaceType,
    pub nodes: Vec<usize>,
    /// Element the face was taken from.
    pub element: usize,
    /// Index of the face within that element.
    pub local: usize,
}

impl Face {
    pub fn corners(&self) -> &[usize] {
        &self.nodes[..self.kind.corners()]
    }

    /// True if `corners` lists the same corner nodes, starting anywhere and
    /// running in either direction. Repeated corners of a collapsed face are
    /// dropped on both sides first, so a degenerate quad matches a triangle.
    pub fn matches(&self, corners: &[usize]) -> bool {
        same_cycle(&distinct(self.corners()), &distinct(corners))
    }
}

/// `nodes` without repeats, keeping first occurrences in order.
fn distinct(nodes: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(nodes.len());
    for &n in nodes {
        if !out.contains(&n) {
            out.push(n);
        }
    }
    out
}

fn same_cycle(a: &[usize], b: &[usize]) -> bool {
    let n = a.len();
    if n != b.len() || n == 0 {
        return false;
    }
    let Some(start) = a.iter().position(|&x| x == b[0]) else {
        return false;
    };
    let forward = (0..n).all(|k| a[(start + k) % n] == b[k]);
    let backward = (0..n).all(|k| a[(start + n - k) % n] == b[k]);
    forward || backward
}

/// Local node lists of each face of a solid element.
///
/// Quadratic solids list corners first, then mid-edge nodes, then the face
/// center where the element has one. Tet15 and Tet20 faces are reduced to
/// their six and three leading nodes respectively.
pub fn element_faces(kind: ElementType) -> &'static [&'static [usize]] {
    match kind {
        ElementType::Hex8 => &[
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[3, 0, 4, 7],
            &[3, 2, 1, 0],
            &[4, 5, 6, 7],
        ],
        ElementType::Hex20 => &[
            &[0, 1, 5, 4, 8, 17, 12, 16],
            &[1, 2, 6, 5, 9, 18, 13, 17],
            &[2, 3, 7, 6, 10, 19, 14, 18],
            &[3, 0, 4, 7, 11, 16, 15, 19],
            &[3, 2, 1, 0, 10, 9, 8, 11],
            &[4, 5, 6, 7, 12, 13, 14, 15],
        ],
        ElementType::Hex27 => &[
            &[0, 1, 5, 4, 8, 17, 12, 16, 20],
            &[1, 2, 6, 5, 9, 18, 13, 17, 21],
            &[2, 3, 7, 6, 10, 19, 14, 18, 22],
            &[3, 0, 4, 7, 11, 16, 15, 19, 23],
            &[3, 2, 1, 0, 10, 9, 8, 11, 24],
            &[4, 5, 6, 7, 12, 13, 14, 15, 25],
        ],
        ElementType::Penta6 => &[
            &[0, 1, 4, 3],
            &[1, 2, 5, 4],
            &[0, 3, 5, 2],
            &[0, 2, 1],
            &[3, 4, 5],
        ],
        ElementType::Penta15 => &[
            &[0, 1, 4, 3, 6, 13, 9, 12],
            &[1, 2, 5, 4, 7, 14, 10, 13],
            &[0, 3, 5, 2, 12, 11, 14, 8],
            &[0, 2, 1, 8, 7, 6],
            &[3, 4, 5, 9, 10, 11],
        ],
        ElementType::Tet4 | ElementType::Tet20 => &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[2, 1, 0]],
        ElementType::Tet10 | ElementType::Tet15 => &[
            &[0, 1, 3, 4, 8, 7],
            &[1, 2, 3, 5, 9, 8],
            &[2, 0, 3, 6, 7, 9],
            &[2, 1, 0, 5, 4, 6],
        ],
        ElementType::Pyra5 => &[&[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4], &[3, 2, 1, 0]],
        ElementType::Quad4
        | ElementType::Tri3
        | ElementType::Tri6
        | ElementType::Quad8
        | ElementType::Quad9
        | ElementType::Truss2 => &[],
    }
}

/// Minimal element view needed to derive faces.
pub struct FaceSource<'a> {
    pub kind: ElementType,
    pub material: usize,
    pub nodes: &'a [usize],
    pub enabled: bool,
}

fn corner_key(nodes: &[usize], local: &[usize]) -> Vec<usize> {
    let corners = FaceType::from_node_count(local.len()).map_or(local.len(), |t| t.corners());
    let mut key: Vec<usize> = local[..corners].iter().map(|&i| nodes[i]).collect();
    key.sort_unstable();
    key
}

/// Derives the canonical face list.
///
/// A solid face is kept if no other enabled solid element shares it, or if
/// the neighbour belongs to a different material. Every enabled shell element
/// contributes itself. Disabled elements contribute nothing.
pub fn build_faces(elements: &[FaceSource<'_>]) -> Vec<Face> {
    let mut owners: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
    for (e, el) in elements.iter().enumerate() {
        if !el.enabled || !el.kind.is_solid() {
            continue;
        }
        for local in element_faces(el.kind) {
            owners.entry(corner_key(el.nodes, local)).or_default().push(e);
        }
    }

    let mut faces = Vec::new();
    for (e, el) in elements.iter().enumerate() {
        if !el.enabled {
            continue;
        }
        if el.kind.is_shell() {
            if let Some(kind) = FaceType::from_node_count(el.nodes.len()) {
                faces.push(Face {
                    kind,
                    nodes: el.nodes.to_vec(),
                    element: e,
                    local: 0,
                });
            }
            continue;
        }
        if !el.kind.is_solid() {
            continue;
        }
        for (f, local) in element_faces(el.kind).iter().enumerate() {
            let key = corner_key(el.nodes, local);
            let exterior = match owners.get(&key) {
                Some(shared) => shared
                    .iter()
                    .filter(|&&other| other != e)
                    .all(|&other| elements[other].material != el.material),
                None => true,
            };
            if !exterior {
                continue;
            }
            if let Some(kind) = FaceType::from_node_count(local.len()) {
                faces.push(Face {
                    kind,
                    nodes: local.iter().map(|&i| el.nodes[i]).collect(),
                    element: e,
                    local: f,
                });
            }
        }
    }
    faces
}

/// For each node, the faces that contain it as a corner.
pub fn build_node_face_table(node_count: usize, faces: &[Face]) -> Vec<Vec<usize>> {
    let mut table = vec![Vec::new(); node_count];
    for (i, face) in faces.iter().enumerate() {
        for &n in face.corners() {
            if let Some(list) = table.get_mut(n) {
                if list.last() != Some(&i) {
                    list.push(i);
                }
            }
        }
    }
    table
}

/// Position of each declared node in canonical order.
///
/// Entry `k` is the index into `declared` of the node at canonical position
/// `k`, counting only the distinct nodes of the canonical face. Positions
/// whose node does not occur in `declared` keep `k`.
pub fn face_permutation(declared: &[usize], canonical: &[usize]) -> Vec<usize> {
    let canonical = distinct(canonical);
    (0..declared.len())
        .map(|k| {
            canonical
                .get(k)
                .and_then(|node| declared.iter().position(|d| d == node))
                .unwrap_or(k)
        })
        .collect()
}
