//! Reader for the legacy layout (versions 1-4).
//!
//! # Root Structure
//! ```text
//! ROOT
//! ├── HEADER              (read by the dispatcher)
//! ├── DICTIONARY
//! │   └── DIC_GLOBAL | DIC_MATERIAL | DIC_NODAL | DIC_DOMAIN | DIC_SURFACE
//! │       └── DIC_ITEM { TYPE, FMT, NAME char[64] }
//! ├── MATERIALS
//! │   └── MATERIAL { MAT_ID, MAT_NAME char[64] }
//! └── GEOMETRY
//!     ├── NODE_SECTION    { NODE_COORDS: 3 * N f32 }
//!     ├── DOMAIN_SECTION  { DOMAIN { DOMAIN_HDR, DOM_ELEM_LIST } }
//!     ├── SURFACE_SECTION { SURFACE { SURFACE_HDR, FACE_LIST } }
//!     └── NODESET_SECTION { NODESET { NODESET_HDR, NODESET_LIST } }
//! ```
//!
//! Each STATE holds a STATE_HEADER { id, time } and a STATE_DATA tree of
//! scope chunks, each listing STATE_VARIABLE { VAR_ID, VAR_DATA }.
//!
//! Names are fixed 64-byte fields and every face occupies the header's
//! `max_facet_nodes` slots.

use std::io::Read;

use log::{debug, info, trace};

use super::common::{self, one_based, place_materials, to_index};
use super::tags::{v1, DI_NAME_SIZE};
use super::{FormatStrategy, RootSections};
use crate::xplt::archive::{Archive, ChunkStatus};
use crate::xplt::mesh::faces::FaceType;
use crate::xplt::mesh::groups::{Domain, LocalNodeMap, NodeSet, SurfaceDef, SurfaceFace};
use crate::xplt::model::{FaceResolution, Geometry, Model};
use crate::xplt::state::State;
use crate::xplt::types::error::{Result, ResultExt, XpltError};
use crate::xplt::types::models::{
    DictItem, Dictionary, ElementType, FormatEpoch, Header, Scope, StorageFormat, ValueType,
};

const DEFAULT_MAX_FACET_NODES: usize = 4;

/// Strategy for files with header version 1 to 4.
#[derive(Debug, Clone)]
pub struct LegacyReader {
    node_count: Option<usize>,
    max_facet_nodes: usize,
}

impl LegacyReader {
    pub fn new(header: &Header) -> Self {
        Self {
            node_count: header.node_count.map(|n| n as usize),
            max_facet_nodes: header
                .max_facet_nodes
                .map_or(DEFAULT_MAX_FACET_NODES, |n| n as usize),
        }
    }

    fn read_dictionary<R: Read>(&self, ar: &mut Archive<R>) -> Result<Dictionary> {
        let mut dictionary = Dictionary::default();
        while ar.open_chunk()? == ChunkStatus::Open {
            let id = ar.chunk_id()?;
            let scope = match id {
                v1::DIC_GLOBAL => Some(Scope::Global),
                v1::DIC_MATERIAL => Some(Scope::Material),
                v1::DIC_NODAL => Some(Scope::Node),
                v1::DIC_DOMAIN => Some(Scope::Element),
                v1::DIC_SURFACE => Some(Scope::Face),
                _ => None,
            };
            let Some(scope) = scope else {
                debug!("Skipping dictionary chunk {:#010x}", id);
                ar.close_chunk()?;
                continue;
            };
            while ar.open_chunk()? == ChunkStatus::Open {
                if ar.chunk_id()? == v1::DIC_ITEM {
                    let item = self
                        .read_item(ar, scope)
                        .with_context(|| format!("Reading {} dictionary item", scope))?;
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

    fn read_item<R: Read>(&self, ar: &mut Archive<R>, scope: Scope) -> Result<DictItem> {
        let mut value_type = None;
        let mut format = None;
        let mut name = None;
        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::DIC_ITEM_TYPE => value_type = Some(ValueType::try_from(ar.read_u32()?)?),
                v1::DIC_ITEM_FMT => format = Some(StorageFormat::try_from(ar.read_u32()?)?),
                v1::DIC_ITEM_NAME => name = Some(common::strip_name(&ar.read_fixed_string(DI_NAME_SIZE)?)),
                tag => trace!("Skipping dictionary item chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        common::dictionary_item(scope, name, value_type, format)
    }

    fn read_materials<R: Read>(&self, ar: &mut Archive<R>) -> Result<Vec<(usize, String)>> {
        let mut defs = Vec::new();
        while ar.open_chunk()? == ChunkStatus::Open {
            if ar.chunk_id()? == v1::MATERIAL {
                let mut id = None;
                let mut name = String::new();
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v1::MAT_ID => id = Some(one_based(ar.read_u32()?, "material")?),
                        v1::MAT_NAME => name = ar.read_fixed_string(DI_NAME_SIZE)?,
                        tag => trace!("Skipping material chunk {:#010x}", tag),
                    }
                    ar.close_chunk()?;
                }
                let id = id.ok_or_else(|| XpltError::InvalidFormat("Material without an id".to_string()))?;
                debug!("Material {} '{}'", id + 1, name);
                defs.push((id, name));
            }
            ar.close_chunk()?;
        }
        Ok(defs)
    }

    fn read_nodes<R: Read>(&self, ar: &mut Archive<R>, geometry: &mut Geometry) -> Result<()> {
        while ar.open_chunk()? == ChunkStatus::Open {
            if ar.chunk_id()? == v1::NODE_COORDS {
                let coords = ar.read_f32_remaining()?;
                if coords.len() % 3 != 0 {
                    return Err(XpltError::SizeMismatch {
                        context: "node coordinates".to_string(),
                        expected: (coords.len() / 3 * 12) as u64,
                        found: (coords.len() * 4) as u64,
                    });
                }
                let count = coords.len() / 3;
                if let Some(declared) = self.node_count {
                    if declared != count {
                        return Err(XpltError::CountMismatch {
                            item_type: "nodes".to_string(),
                            expected: declared as u64,
                            found: count as u64,
                        });
                    }
                }
                geometry.nodes = coords
                    .chunks_exact(3)
                    .enumerate()
                    .map(|(i, c)| (i as i32 + 1, [c[0], c[1], c[2]]))
                    .collect();
            }
            ar.close_chunk()?;
        }
        Ok(())
    }

    fn read_domain<R: Read>(&self, ar: &mut Archive<R>) -> Result<Domain> {
        let mut element_type = None;
        let mut material = None;
        let mut count = 0;
        let mut name = String::new();
        let mut elements = Vec::new();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::DOMAIN_HDR => {
                    while ar.open_chunk()? == ChunkStatus::Open {
                        match ar.chunk_id()? {
                            v1::DOM_ELEM_TYPE => {
                                element_type = Some(ElementType::from_code(ar.read_u32()?, FormatEpoch::Legacy)?)
                            }
                            v1::DOM_MAT_ID => material = Some(one_based(ar.read_u32()?, "material")?),
                            v1::DOM_ELEMS => count = ar.read_u32()? as usize,
                            v1::DOM_NAME => name = ar.read_fixed_string(DI_NAME_SIZE)?,
                            tag => trace!("Skipping domain header chunk {:#010x}", tag),
                        }
                        ar.close_chunk()?;
                    }
                }
                v1::DOM_ELEM_LIST => {
                    let kind = element_type
                        .ok_or_else(|| XpltError::InvalidFormat("Element list before element type".to_string()))?;
                    elements = common::read_element_list(ar, v1::ELEMENT, kind, count)?;
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
        let material = material.ok_or_else(|| XpltError::InvalidFormat("Domain without a material".to_string()))?;
        debug!(
            "Domain '{}': {} {} elements, material {}",
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

    /// Reads one face of `max_facet_nodes` slots. A quad whose last node
    /// repeats the third is a triangle.
    fn read_face<R: Read>(&self, ar: &mut Archive<R>) -> Result<SurfaceFace> {
        let slots = self.max_facet_nodes;
        let size = (slots + 1) * 4;
        if ar.remaining() != size {
            return Err(XpltError::SizeMismatch {
                context: "surface face".to_string(),
                expected: size as u64,
                found: ar.remaining() as u64,
            });
        }
        let id = ar.read_i32()?;
        let mut raw = vec![0i32; slots];
        ar.read_i32_array(&mut raw)?;
        let mut nodes = raw
            .into_iter()
            .map(|n| to_index(n, "face node"))
            .collect::<Result<Vec<_>>>()?;
        if nodes.len() == 4 && nodes[3] == nodes[2] {
            nodes.truncate(3);
        }
        if FaceType::from_node_count(nodes.len()).is_none() {
            return Err(XpltError::InvalidFormat(format!(
                "Face {} has an unsupported node count of {}",
                id,
                nodes.len()
            )));
        }
        Ok(SurfaceFace {
            id,
            nodes,
            resolved: None,
            canonical_order: Vec::new(),
        })
    }

    fn read_surface<R: Read>(&self, ar: &mut Archive<R>) -> Result<SurfaceDef> {
        let mut id = 0;
        let mut count = 0;
        let mut name = String::new();
        let mut faces = Vec::new();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::SURFACE_HDR => {
                    while ar.open_chunk()? == ChunkStatus::Open {
                        match ar.chunk_id()? {
                            v1::SURFACE_ID => id = ar.read_u32()?,
                            v1::SURFACE_FACES => count = ar.read_u32()? as usize,
                            v1::SURFACE_NAME => name = ar.read_fixed_string(DI_NAME_SIZE)?,
                            tag => trace!("Skipping surface header chunk {:#010x}", tag),
                        }
                        ar.close_chunk()?;
                    }
                }
                v1::FACE_LIST => {
                    while ar.open_chunk()? == ChunkStatus::Open {
                        if ar.chunk_id()? == v1::FACE {
                            faces.push(self.read_face(ar)?);
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
        debug!("Surface {} '{}': {} faces", id, name, faces.len());
        Ok(SurfaceDef {
            id,
            name,
            max_facet_nodes: self.max_facet_nodes,
            faces,
            node_map: LocalNodeMap::default(),
        })
    }

    fn read_node_set<R: Read>(&self, ar: &mut Archive<R>) -> Result<NodeSet> {
        let mut id = 0;
        let mut name = String::new();
        let mut size = 0;
        let mut nodes = Vec::new();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::NODESET_HDR => {
                    while ar.open_chunk()? == ChunkStatus::Open {
                        match ar.chunk_id()? {
                            v1::NODESET_ID => id = ar.read_u32()?,
                            v1::NODESET_NAME => name = ar.read_fixed_string(DI_NAME_SIZE)?,
                            v1::NODESET_SIZE => size = ar.read_u32()? as usize,
                            tag => trace!("Skipping node set header chunk {:#010x}", tag),
                        }
                        ar.close_chunk()?;
                    }
                }
                v1::NODESET_LIST => nodes = common::read_node_list(ar, size)?,
                tag => trace!("Skipping node set chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        debug!("Node set {} '{}': {} nodes", id, name, nodes.len());
        Ok(NodeSet { id, name, nodes })
    }

    fn read_state_header<R: Read>(&self, ar: &mut Archive<R>, state: &mut State) -> Result<()> {
        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::STATE_HDR_ID => state.id = Some(ar.read_u32()?),
                v1::STATE_HDR_TIME => state.time = ar.read_f32()?,
                tag => trace!("Skipping state header chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        Ok(())
    }

    fn read_state_data<R: Read>(&self, ar: &mut Archive<R>, state: &mut State, model: &Model) -> Result<()> {
        while ar.open_chunk()? == ChunkStatus::Open {
            let id = ar.chunk_id()?;
            let scope = match id {
                v1::GLOBAL_DATA => Some(Scope::Global),
                v1::MATERIAL_DATA => Some(Scope::Material),
                v1::NODE_DATA => Some(Scope::Node),
                v1::ELEMENT_DATA => Some(Scope::Element),
                v1::FACE_DATA => Some(Scope::Face),
                _ => None,
            };
            match scope {
                Some(scope) => self
                    .read_variables(ar, state, model, scope)
                    .with_context(|| format!("Reading {} data", scope))?,
                None => debug!("Skipping state data chunk {:#010x}", id),
            }
            ar.close_chunk()?;
        }
        Ok(())
    }

    fn read_variables<R: Read>(
        &self,
        ar: &mut Archive<R>,
        state: &mut State,
        model: &Model,
        scope: Scope,
    ) -> Result<()> {
        while ar.open_chunk()? == ChunkStatus::Open {
            if ar.chunk_id()? == v1::STATE_VARIABLE {
                let mut var_id = None;
                while ar.open_chunk()? == ChunkStatus::Open {
                    match ar.chunk_id()? {
                        v1::STATE_VAR_ID => var_id = Some(ar.read_u32()?),
                        v1::STATE_VAR_DATA => {
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

    fn read_sections<R: Read>(
        &self,
        ar: &mut Archive<R>,
        child: u32,
        what: &str,
        mut read: impl FnMut(&mut Archive<R>) -> Result<()>,
    ) -> Result<()> {
        let mut index = 0;
        while ar.open_chunk()? == ChunkStatus::Open {
            if ar.chunk_id()? == child {
                index += 1;
                read(ar).with_context(|| format!("Reading {} {}", what, index))?;
            }
            ar.close_chunk()?;
        }
        Ok(())
    }
}

impl<R: Read> FormatStrategy<R> for LegacyReader {
    fn epoch(&self) -> FormatEpoch {
        FormatEpoch::Legacy
    }

    fn face_resolution(&self) -> FaceResolution {
        FaceResolution::Strict
    }

    fn read_root(&mut self, ar: &mut Archive<R>) -> Result<RootSections> {
        let mut sections = RootSections::default();
        let mut materials = Vec::new();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::DICTIONARY => {
                    sections.dictionary = self.read_dictionary(ar).context("Reading dictionary")?
                }
                v1::MATERIALS => materials = self.read_materials(ar).context("Reading materials")?,
                v1::GEOMETRY => sections.geometry = Some(self.read_mesh(ar).context("Reading geometry")?),
                tag => debug!("Skipping root chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }

        if let Some(geometry) = sections.geometry.as_mut() {
            geometry.materials = place_materials(materials, "Material")?;
        }
        Ok(sections)
    }

    fn read_mesh(&mut self, ar: &mut Archive<R>) -> Result<Geometry> {
        let mut geometry = Geometry::default();

        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::NODE_SECTION => self.read_nodes(ar, &mut geometry).context("Reading nodes")?,
                v1::DOMAIN_SECTION => self.read_sections(ar, v1::DOMAIN, "domain", |ar| {
                    geometry.domains.push(self.read_domain(ar)?);
                    Ok(())
                })?,
                v1::SURFACE_SECTION => self.read_sections(ar, v1::SURFACE, "surface", |ar| {
                    geometry.surfaces.push(self.read_surface(ar)?);
                    Ok(())
                })?,
                v1::NODESET_SECTION => self.read_sections(ar, v1::NODESET, "node set", |ar| {
                    geometry.node_sets.push(self.read_node_set(ar)?);
                    Ok(())
                })?,
                tag => debug!("Skipping geometry chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }

        info!(
            "Geometry: {} nodes, {} domains, {} surfaces, {} node sets",
            geometry.nodes.len(),
            geometry.domains.len(),
            geometry.surfaces.len(),
            geometry.node_sets.len()
        );
        Ok(geometry)
    }

    fn read_state(&mut self, ar: &mut Archive<R>, model: &Model) -> Result<State> {
        let mut state = State::new(&model.data, &model.mesh)?;
        while ar.open_chunk()? == ChunkStatus::Open {
            match ar.chunk_id()? {
                v1::STATE_HEADER => self.read_state_header(ar, &mut state).context("Reading state header")?,
                v1::STATE_DATA => self.read_state_data(ar, &mut state, model).context("Reading state data")?,
                tag => debug!("Skipping state chunk {:#010x}", tag),
            }
            ar.close_chunk()?;
        }
        common::finish_state(&mut state, model);
        Ok(state)
    }
}
