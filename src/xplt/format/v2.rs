//! Reader for the 2.0 layout (versions above 4).
//!
//! # Mesh Structure
//! ```text
//! MESH
//! ├── NODE_SECTION
//! │   ├── NODE_HEADER  { NODE_SIZE, NODE_DIM, NODE_NAME }
//! │   └── NODE_COORDS  per node: i32 id, DIM f32
//! ├── DOMAIN_SECTION   { DOMAIN { DOMAIN_HDR, DOM_ELEM_LIST } }
//! ├── SURFACE_SECTION  { SURFACE { SURFACE_HDR, FACE_LIST } }
//! ├── NODESET_SECTION  { NODESET { NODESET_HDR, NODESET_LIST } }
//! └── PARTS_SECTION    { PART { PART_ID, PART_NAME } }
//! ```
//!
//! Dictionary items may add ARRAYSIZE and ARRAYNAME children, and the state
//! header may carry a STATUS flag next to the id and time.
//!
//! The mesh may sit inside ROOT or follow it as a top-level chunk. Names are
//! length-prefixed, faces carry their own node count and the face slot width
//! is declared per surface.

use std::io::Read;

use log::{debug, info, trace};

use super::common::{self, one_based, place_materials, to_index};
use super::tags::{v2, DI_NAME_SIZE, MAX_STRING};
use super::{FormatStrategy, RootSections};
use crate::xplt::archive::{Archive, ChunkStatus};
use crate::xplt::mesh::faces::FaceType;
use crate::xplt::mesh::groups::{Domain, LocalNodeMap, NodeSet, SurfaceDef, SurfaceFace};
use crate::xplt::model::{FaceResolution, Geometry, Model};
use crate::xplt::state::State;
use crate::xplt::types::error::{Result, ResultExt, XpltError};
use crate::xplt::types::models::{DictItem, Dictionary, ElementType, FormatEpoch, Scope, StorageFormat, ValueType};

const DEFAULT_MAX_FACET_NODES: usize = 4;

/// Strategy for files with header version above 4.
#[derive(Debug, Clone, Default)]
pub struct XpltReader2;

impl XpltReader2 {
    pub fn new() -> Self {
        Self
    }
}

fn read_nodes<R: Read>(ar: &mut Archive<R>, geometry: &mut Geometry) -> Result<()> {
    let mut size = None;
    let mut dim = 3;

    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::NODE_HEADER => {
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v2::NODE_SIZE => size = Some(ar.read_u32()? as usize),
                        v2::NODE_DIM => dim = ar.read_u32()? as usize,
                        v2::NODE_NAME => {
                            let name = ar.read_string(MAX_STRING)?;
                            debug!("Node section '{}'", name);
                        }
                        tag => trace!("Skipping node header chunk {:#010x}", tag),
                    }
                    ar.close_chunk()?;
                }
            }
            v2::NODE_COORDS => {
                let count = size.ok_or_else(|| {
                    XpltError::InvalidFormat("Node coordinates before the node header".to_string())
                })?;
                if !(1..=3).contains(&dim) {
                    return Err(XpltError::InvalidFormat(format!("Unsupported node dimension {}", dim)));
                }
                let expected = count * (dim + 1) * 4;
                if ar.remaining() != expected {
                    return Err(XpltError::SizeMismatch {
                        context: "node coordinates".to_string(),
                        expected: expected as u64,
                        found: ar.remaining() as u64,
                    });
                }
                let mut nodes = Vec::new();
                nodes
                    .try_reserve_exact(count)
                    .map_err(|_| XpltError::Allocation(format!("{} nodes", count)))?;
                let mut coords = [0.0f32; 3];
                for _ in 0..count {
                    let id = ar.read_i32()?;
                    ar.read_f32_array(&mut coords[..dim])?;
                    nodes.push((id, coords));
                }
                geometry.nodes = nodes;
            }
            tag => trace!("Skipping node section chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }
    Ok(())
}

fn read_domain<R: Read>(ar: &mut Archive<R>) -> Result<Domain> {
    let mut element_type = None;
    let mut part = None;
    let mut count = 0;
    let mut name = String::new();
    let mut elements = Vec::new();

    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::DOMAIN_HDR => {
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v2::DOM_ELEM_TYPE => {
                            element_type = Some(ElementType::from_code(ar.read_u32()?, FormatEpoch::V2)?)
                        }
                        v2::DOM_PART_ID => part = Some(one_based(ar.read_u32()?, "part")?),
                        v2::DOM_ELEMS => count = ar.read_u32()? as usize,
                        v2::DOM_NAME => name = ar.read_string(MAX_STRING)?,
                        tag => trace!("Skipping domain header chunk {:#010x}", tag),
                    }
                    ar.close_chunk()?;
                }
            }
            v2::DOM_ELEM_LIST => {
                let kind = element_type
                    .ok_or_else(|| XpltError::InvalidFormat("Element list before element type".to_string()))?;
                elements = common::read_element_list(ar, v2::ELEMENT, kind, count)?;
            }
            tag => trace!("Skipping domain chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }

    if elements.len() != count {
        return Err(XpltError::CountMismatch {
            item_type: "elements".to_string(),
            expected: count as u64,
            found: elements.len() as u64,
        });
    }
    let element_type =
        element_type.ok_or_else(|| XpltError::InvalidFormat("Domain without an element type".to_string()))?;
    let material = part.ok_or_else(|| XpltError::InvalidFormat("Domain without a part id".to_string()))?;
    debug!(
        "Domain '{}': {} {} elements, part {}",
        name,
        elements.len(),
        element_type,
        material + 1
    );
    Ok(Domain {
        element_type,
        material,
        name,
        elements,
        first_element: 0,
        node_map: LocalNodeMap::default(),
    })
}

/// A face is its id, its node count and `slots` node entries of which the
/// first `nn` are used.
fn read_face<R: Read>(ar: &mut Archive<R>, slots: usize) -> Result<SurfaceFace> {
    let size = (slots + 2) * 4;
    if ar.remaining() != size {
        return Err(XpltError::SizeMismatch {
            context: "surface face".to_string(),
            expected: size as u64,
            found: ar.remaining() as u64,
        });
    }
    let id = ar.read_i32()?;
    let nn = to_index(ar.read_i32()?, "face node count")?;
    let mut raw = vec![0i32; slots];
    ar.read_i32_array(&mut raw)?;
    if nn > slots || FaceType::from_node_count(nn).is_none() {
        return Err(XpltError::InvalidFormat(format!(
            "Face {} has an unsupported node count of {}",
            id, nn
        )));
    }
    let nodes = raw[..nn]
        .iter()
        .map(|&n| to_index(n, "face node"))
        .collect::<Result<Vec<_>>>()?;
    Ok(SurfaceFace {
        id,
        nodes,
        resolved: None,
        canonical_order: Vec::new(),
    })
}

fn read_surface<R: Read>(ar: &mut Archive<R>) -> Result<SurfaceDef> {
    let mut id = 0;
    let mut count = 0;
    let mut name = String::new();
    let mut slots = DEFAULT_MAX_FACET_NODES;
    let mut faces = Vec::new();

    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::SURFACE_HDR => {
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v2::SURFACE_ID => id = ar.read_u32()?,
                        v2::SURFACE_FACES => count = ar.read_u32()? as usize,
                        v2::SURFACE_NAME => name = ar.read_string(MAX_STRING)?,
                        v2::SURFACE_MAX_FACET_NODES => slots = ar.read_u32()? as usize,
                        tag => trace!("Skipping surface header chunk {:#010x}", tag),
                    }
                    ar.close_chunk()?;
                }
            }
            v2::FACE_LIST => {
                while ar.open_chunk()? == ChunkStatus::Open {
                    if ar.chunk_id()? == v2::FACE {
                        faces.push(read_face(ar, slots)?);
                    }
                    ar.close_chunk()?;
                }
            }
            tag => trace!("Skipping surface chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }

    if faces.len() != count {
        return Err(XpltError::CountMismatch {
            item_type: format!("faces of surface '{}'", name),
            expected: count as u64,
            found: faces.len() as u64,
        });
    }
    debug!("Surface {} '{}': {} faces, {} slots", id, name, faces.len(), slots);
    Ok(SurfaceDef {
        id,
        name,
        max_facet_nodes: slots,
        faces,
        node_map: LocalNodeMap::default(),
    })
}

fn read_node_set<R: Read>(ar: &mut Archive<R>) -> Result<NodeSet> {
    let mut id = 0;
    let mut name = String::new();
    let mut size = 0;
    let mut nodes = Vec::new();

    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::NODESET_HDR => {
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v2::NODESET_ID => id = ar.read_u32()?,
                        v2::NODESET_NAME => name = ar.read_string(MAX_STRING)?,
                        v2::NODESET_SIZE => size = ar.read_u32()? as usize,
                        tag => trace!("Skipping node set header chunk {:#010x}", tag),
                    }
                    ar.close_chunk()?;
                }
            }
            v2::NODESET_LIST => nodes = common::read_node_list(ar, size)?,
            tag => trace!("Skipping node set chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }
    debug!("Node set {} '{}': {} nodes", id, name, nodes.len());
    Ok(NodeSet { id, name, nodes })
}

fn read_parts<R: Read>(ar: &mut Archive<R>) -> Result<Vec<(usize, String)>> {
    let mut parts = Vec::new();
    while ar.open_chunk()? == ChunkStatus::Open {
        if ar.chunk_id()? == v2::PART {
            let mut id = None;
            let mut name = String::new();
            while ar.open_chunk()? == ChunkStatus::Open {
                match ar.chunk_id()? {
                    v2::PART_ID => id = Some(one_based(ar.read_u32()?, "part")?),
                    v2::PART_NAME => name = ar.read_string(MAX_STRING)?,
                    tag => trace!("Skipping part chunk {:#010x}", tag),
                }
                ar.close_chunk()?;
            }
            let id = id.ok_or_else(|| XpltError::InvalidFormat("Part without an id".to_string()))?;
            debug!("Part {} '{}'", id + 1, name);
            parts.push((id, name));
        }
        ar.close_chunk()?;
    }
    Ok(parts)
}

/// Runs `read` on every `child` chunk of an open section.
fn read_list<R: Read, T>(
    ar: &mut Archive<R>,
    child: u32,
    what: &str,
    out: &mut Vec<T>,
    read: fn(&mut Archive<R>) -> Result<T>,
) -> Result<()> {
    while ar.open_chunk()? == ChunkStatus::Open {
        if ar.chunk_id()? == child {
            let item = read(ar).with_context(|| format!("Reading {} {}", what, out.len() + 1))?;
            out.push(item);
        }
        ar.close_chunk()?;
    }
    Ok(())
}

fn read_dictionary<R: Read>(ar: &mut Archive<R>) -> Result<Dictionary> {
    let mut dictionary = Dictionary::default();
    while ar.open_chunk()? == ChunkStatus::Open {
        let id = ar.chunk_id()?;
        let scope = match id {
            v2::DIC_GLOBAL => Some(Scope::Global),
            v2::DIC_NODAL => Some(Scope::Node),
            v2::DIC_DOMAIN => Some(Scope::Element),
            v2::DIC_SURFACE => Some(Scope::Face),
            _ => None,
        };
        let Some(scope) = scope else {
            debug!("Skipping dictionary chunk {:#010x}", id);
            ar.close_chunk()?;
            continue;
        };
        while ar.open_chunk()? == ChunkStatus::Open {
            if ar.chunk_id()? == v2::DIC_ITEM {
                let item = read_item(ar, scope).with_context(|| format!("Reading {} dictionary item", scope))?;
                debug!("Dictionary item '{}': {} {} {}", item.name, scope, item.value_type, item.format);
                dictionary.items_mut(scope).push(item);
            }
            ar.close_chunk()?;
        }
        ar.close_chunk()?;
    }
    common::log_dictionary(&dictionary);
    Ok(dictionary)
}

fn read_item<R: Read>(ar: &mut Archive<R>, scope: Scope) -> Result<DictItem> {
    let mut value_type = None;
    let mut format = None;
    let mut name = None;
    let mut array_size = None;
    let mut array_names = Vec::new();
    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::DIC_ITEM_TYPE => value_type = Some(ValueType::try_from(ar.read_u32()?)?),
            v2::DIC_ITEM_FMT => format = Some(StorageFormat::try_from(ar.read_u32()?)?),
            v2::DIC_ITEM_NAME => name = Some(common::strip_name(&ar.read_fixed_string(DI_NAME_SIZE)?)),
            v2::DIC_ITEM_ARRAYSIZE => array_size = Some(ar.read_u32()?),
            v2::DIC_ITEM_ARRAYNAME => {
                while ar.remaining() > 0 {
                    array_names.push(ar.read_string(MAX_STRING)?);
                }
            }
            tag => trace!("Skipping dictionary item chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }
    let mut item = common::dictionary_item(scope, name, value_type, format)?;
    item.array_size = array_size;
    item.array_names = array_names;
    Ok(item)
}

fn read_state_header<R: Read>(ar: &mut Archive<R>, state: &mut State) -> Result<()> {
    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v2::STATE_HDR_ID => state.id = Some(ar.read_u32()?),
            v2::STATE_HDR_TIME => state.time = ar.read_f32()?,
            v2::STATE_STATUS => state.status = Some(ar.read_u32()?),
            tag => trace!("Skipping state header chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }
    Ok(())
}

fn read_state_data<R: Read>(ar: &mut Archive<R>, state: &mut State, model: &Model) -> Result<()> {
    while ar.open_chunk()? == ChunkStatus::Open {
        let id = ar.chunk_id()?;
        let scope = match id {
            v2::GLOBAL_DATA => Some(Scope::Global),
            v2::MATERIAL_DATA => Some(Scope::Material),
            v2::NODE_DATA => Some(Scope::Node),
            v2::ELEMENT_DATA => Some(Scope::Element),
            v2::FACE_DATA => Some(Scope::Face),
            _ => None,
        };
        match scope {
            Some(scope) => {
                read_variables(ar, state, model, scope).with_context(|| format!("Reading {} data", scope))?
            }
            None => debug!("Skipping state data chunk {:#010x}", id),
        }
        ar.close_chunk()?;
    }
    Ok(())
}

fn read_variables<R: Read>(ar: &mut Archive<R>, state: &mut State, model: &Model, scope: Scope) -> Result<()> {
    while ar.open_chunk()? == ChunkStatus::Open {
        if ar.chunk_id()? == v2::STATE_VARIABLE {
            let mut var_id = None;
            while ar.open_chunk()? == ChunkStatus::Open {
                match ar.chunk_id()? {
                    v2::STATE_VAR_ID => var_id = Some(ar.read_u32()?),
                    v2::STATE_VAR_DATA => {
                        let var_id = common::require(var_id, "Variable data precedes the variable id")?;
                        let item = model.dictionary.lookup(scope, var_id)?;
                        common::read_variable_data(ar, state, model, item)
                            .with_context(|| format!("Reading variable '{}'", item.name))?;
                    }
                    tag => trace!("Skipping variable chunk {:#010x}", tag),
                }
                ar.close_chunk()?;
            }
        }
        ar.close_chunk()?;
    }
    Ok(())
}

impl<R: Read> FormatStrategy<R> for XpltReader2 {
    fn epoch(&self) -> FormatEpoch {
        FormatEpoch::V2
    }

    /// Surfaces of 2.0 files may reference faces hidden inside the mesh, so
    /// unmatched faces are tolerated.
    fn face_resolution(&self) -> FaceResolution {
        FaceResolution::Tolerant
    }

    fn read_root(&mut self, ar: &mut Archive<R>) -> Result<RootSections> {
        let mut sections = RootSections::default();
        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v2::DICTIONARY => {
                    sections.dictionary = read_dictionary(ar).context("Reading dictionary")?
                }
                v2::MESH => sections.geometry = Some(self.read_mesh(ar).context("Reading mesh")?),
                tag => debug!("Skipping root chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        Ok(sections)
    }

    fn read_mesh(&mut self, ar: &mut Archive<R>) -> Result<Geometry> {
        let mut geometry = Geometry::default();
        let mut parts = Vec::new();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v2::NODE_SECTION => read_nodes(ar, &mut geometry).context("Reading nodes")?,
                v2::DOMAIN_SECTION => read_list(ar, v2::DOMAIN, "domain", &mut geometry.domains, read_domain)?,
                v2::SURFACE_SECTION => read_list(ar, v2::SURFACE, "surface", &mut geometry.surfaces, read_surface)?,
                v2::NODESET_SECTION => {
                    read_list(ar, v2::NODESET, "node set", &mut geometry.node_sets, read_node_set)?
                }
                v2::PARTS_SECTION => parts = read_parts(ar).context("Reading parts")?,
                tag => debug!("Skipping mesh chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        geometry.materials = place_materials(parts, "Part")?;

        info!(
            "Mesh: {} nodes, {} domains, {} surfaces, {} node sets, {} parts",
            geometry.nodes.len(),
            geometry.domains.len(),
            geometry.surfaces.len(),
            geometry.node_sets.len(),
            geometry.materials.len()
        );
        Ok(geometry)
    }

    fn read_state(&mut self, ar: &mut Archive<R>, model: &Model) -> Result<State> {
        let mut state = State::new(&model.data, &model.mesh)?;
        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v2::STATE_HEADER => read_state_header(ar, &mut state).context("Reading state header")?,
                v2::STATE_DATA => read_state_data(ar, &mut state, model).context("Reading state data")?,
                tag => debug!("Skipping state chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        common::finish_state(&mut state, model);
        Ok(state)
    }
}
