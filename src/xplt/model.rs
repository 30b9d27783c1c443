//! The in-memory result of a load.

use log::{debug, info, warn};

use super::data::manager::DataManager;
use super::mesh::faces::face_permutation;
use super::mesh::groups::{Domain, LocalNodeMap, Material, NodeSet, Part, Surface, SurfaceDef};
use super::mesh::Mesh;
use super::state::State;
use super::types::error::{Result, XpltError};
use super::types::models::{Dictionary, Header};

/// Raw geometry as read from the mesh/geometry section.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Node id and position.
    pub nodes: Vec<(i32, [f32; 3])>,
    pub domains: Vec<Domain>,
    pub surfaces: Vec<SurfaceDef>,
    pub node_sets: Vec<NodeSet>,
    pub materials: Vec<Material>,
}

/// What to do with a surface face that matches no mesh face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceResolution {
    /// Abort the load.
    Strict,
    /// Leave the face unresolved and skip its data.
    Tolerant,
}

/// A loaded XPLT file: mesh, field registry and time-ordered states.
#[derive(Debug, Clone)]
pub struct Model {
    pub header: Header,
    pub dictionary: Dictionary,
    pub data: DataManager,
    pub mesh: Mesh,
    pub domains: Vec<Domain>,
    /// Surfaces as declared, with each face's resolution.
    pub surface_defs: Vec<SurfaceDef>,
    pub node_sets: Vec<NodeSet>,
    pub materials: Vec<Material>,
    pub parts: Vec<Part>,
    pub surfaces: Vec<Surface>,
    /// Number of declared faces left unresolved.
    pub unresolved_faces: usize,
    states: Vec<State>,
}

impl Model {
    /// Builds the mesh and the groupings from the raw sections.
    ///
    /// Registers the dictionary, allocates the mesh, propagates enabled
    /// flags, derives canonical faces, resolves declared surface faces and
    /// builds the local node maps used by per-node data.
    pub fn build(
        header: Header,
        mut dictionary: Dictionary,
        geometry: Geometry,
        resolution: FaceResolution,
    ) -> Result<Self> {
        let Geometry {
            nodes,
            mut domains,
            mut surfaces,
            node_sets,
            mut materials,
        } = geometry;

        let mut data = DataManager::default();
        data.register_dictionary(&mut dictionary);

        let element_count: usize = domains.iter().map(|d| d.element_count()).sum();
        let mut mesh = Mesh::with_capacity(nodes.len(), element_count)?;
        for &(id, position) in &nodes {
            mesh.add_node(id, position);
        }

        let mut first = 0;
        for (i, domain) in domains.iter_mut().enumerate() {
            if domain.material >= materials.len() {
                materials
                    .try_reserve_exact(domain.material + 1 - materials.len())
                    .map_err(|_| XpltError::Allocation(format!("{} materials", domain.material + 1)))?;
            }
            while materials.len() <= domain.material {
                let id = materials.len();
                materials.push(Material::new(id, format!("Material{}", id + 1)));
            }
            domain.first_element = first;
            for el in &domain.elements {
                mesh.add_element(el.id, domain.element_type, domain.material, el.nodes.clone())
                    .map_err(|e| XpltError::Context {
                        context: format!("Invalid element {} in domain {}", el.id, i + 1),
                        source: Box::new(e),
                    })?;
            }
            domain.node_map = LocalNodeMap::build(
                domain.elements.iter().map(|el| el.nodes.as_slice()),
                mesh.node_count(),
            );
            first += domain.element_count();
        }

        mesh.update_enabled(|m| materials.get(m).map_or(true, |mat| mat.enabled));
        mesh.build_faces();

        let mut unresolved = 0;
        for (s, surface) in surfaces.iter_mut().enumerate() {
            for (j, face) in surface.faces.iter_mut().enumerate() {
                if let Some(&bad) = face.nodes.iter().find(|&&n| n >= mesh.node_count()) {
                    return Err(XpltError::IndexOutOfRange {
                        what: "surface node",
                        index: bad,
                        len: mesh.node_count(),
                    });
                }
                match mesh.find_face(&face.nodes) {
                    Some(f) => {
                        face.canonical_order = face_permutation(&face.nodes, &mesh.faces()[f].nodes);
                        face.resolved = Some(f);
                    }
                    None => match resolution {
                        FaceResolution::Strict => {
                            return Err(XpltError::UnresolvedFace { surface: s, face: j });
                        }
                        FaceResolution::Tolerant => {
                            warn!("Face {} of surface {} ('{}') has no match in the mesh", j, s + 1, surface.name);
                            face.resolved = None;
                            face.canonical_order = (0..face.nodes.len()).collect();
                            unresolved += 1;
                        }
                    },
                }
            }
            surface.node_map = LocalNodeMap::build(
                surface.faces.iter().map(|f| f.nodes.as_slice()),
                mesh.node_count(),
            );
        }

        for set in &node_sets {
            if let Some(&bad) = set.nodes.iter().find(|&&n| n >= mesh.node_count()) {
                return Err(XpltError::IndexOutOfRange {
                    what: "node set node",
                    index: bad,
                    len: mesh.node_count(),
                });
            }
        }

        // Material ids equal their position in `materials`.
        let mut parts: Vec<Part> = materials
            .iter()
            .map(|mat| Part {
                material: mat.id,
                name: mat.name.clone(),
                elements: Vec::new(),
            })
            .collect();
        for (i, el) in mesh.elements().iter().enumerate() {
            if let Some(part) = parts.get_mut(el.material) {
                part.elements.push(i);
            }
        }

        let surface_groups = surfaces
            .iter()
            .map(|s| Surface {
                id: s.id,
                name: s.name.clone(),
                faces: s.faces.iter().filter_map(|f| f.resolved).collect(),
            })
            .collect();

        info!(
            "Mesh built: {} nodes, {} elements, {} faces, {} domains, {} surfaces, {} node sets",
            mesh.node_count(),
            mesh.element_count(),
            mesh.face_count(),
            domains.len(),
            surfaces.len(),
            node_sets.len()
        );
        debug!("{} fields registered, {} unresolved surface faces", data.len(), unresolved);

        Ok(Model {
            header,
            dictionary,
            data,
            mesh,
            domains,
            surface_defs: surfaces,
            node_sets,
            materials,
            parts,
            surfaces: surface_groups,
            unresolved_faces: unresolved,
            states: Vec::new(),
        })
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn times(&self) -> Vec<f32> {
        self.states.iter().map(|s| s.time).collect()
    }

    pub(crate) fn states_mut(&mut self) -> &mut Vec<State> {
        &mut self.states
    }

    /// Shows or hides a material. Element and node flags follow; the canonical
    /// faces stay as derived at load time.
    pub fn set_material_enabled(&mut self, material: usize, enabled: bool) -> Result<()> {
        let len = self.materials.len();
        let mat = self.materials.get_mut(material).ok_or(XpltError::IndexOutOfRange {
            what: "material",
            index: material,
            len,
        })?;
        mat.enabled = enabled;
        let materials = &self.materials;
        self.mesh
            .update_enabled(|m| materials.get(m).map_or(true, |mat| mat.enabled));
        Ok(())
    }
}
