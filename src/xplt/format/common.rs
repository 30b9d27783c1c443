//! Helpers shared by both layout readers: id conversions, element and node
//! lists, and the writers that move one region of state data into its
//! container.

use std::io::Read;

use log::{debug, info, trace};

use crate::xplt::archive::{Archive, ChunkStatus};
use crate::xplt::data::container::FieldData;
use crate::xplt::mesh::groups::{Domain, DomainElement, Material, SurfaceDef};
use crate::xplt::model::Model;
use crate::xplt::state::State;
use crate::xplt::types::error::{Result, ResultExt, XpltError};
use crate::xplt::types::models::{DictItem, Dictionary, ElementType, Scope, StorageFormat, ValueType};
use crate::xplt::types::value::Value;

/// Name of the element field copied into each state's shell thickness buffer.
pub const SHELL_THICKNESS: &str = "shell thickness";

/// Keeps the part of a dictionary name before the first `=`.
pub fn strip_name(name: &str) -> String {
    match name.split_once('=') {
        Some((left, _)) => left.to_string(),
        None => name.to_string(),
    }
}

/// Converts a stored node or element index, rejecting negative values.
pub fn to_index(raw: i32, what: &str) -> Result<usize> {
    usize::try_from(raw).map_err(|_| XpltError::InvalidFormat(format!("Negative {} index {}", what, raw)))
}

/// Converts a stored 1-based id to a 0-based index.
pub fn one_based(raw: u32, what: &str) -> Result<usize> {
    (raw as usize)
        .checked_sub(1)
        .ok_or_else(|| XpltError::InvalidFormat(format!("{} id 0 is not valid", what)))
}

/// Orders `(index, name)` declarations by index. Missing indices get a
/// generated name.
pub fn place_materials(defs: Vec<(usize, String)>, prefix: &str) -> Result<Vec<Material>> {
    let len = defs.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut names: Vec<Option<String>> = Vec::new();
    names
        .try_reserve_exact(len)
        .map_err(|_| XpltError::Allocation(format!("{} materials", len)))?;
    names.resize(len, None);
    for (index, name) in defs {
        names[index] = Some(name);
    }
    Ok(names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Material::new(i, name.unwrap_or_else(|| format!("{}{}", prefix, i + 1))))
        .collect())
}

/// Unwraps a mandatory field of a section, naming the section otherwise.
pub fn require<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| XpltError::InvalidFormat(what.to_string()))
}

/// Assembles a dictionary item once its chunks are read.
pub fn dictionary_item(
    scope: Scope,
    name: Option<String>,
    value_type: Option<ValueType>,
    format: Option<StorageFormat>,
) -> Result<DictItem> {
    Ok(DictItem {
        name: require(name, "Dictionary item without a name")?,
        value_type: require(value_type, "Dictionary item without a type")?,
        format: require(format, "Dictionary item without a format")?,
        scope,
        array_size: None,
        array_names: Vec::new(),
        field: None,
    })
}

/// Logs the per-scope item counts of a finished dictionary.
pub fn log_dictionary(dictionary: &Dictionary) {
    info!(
        "Dictionary: {} global, {} material, {} nodal, {} domain, {} surface items",
        dictionary.global.len(),
        dictionary.material.len(),
        dictionary.nodal.len(),
        dictionary.domain.len(),
        dictionary.surface.len()
    );
}

/// Reads the children of an open element list chunk.
///
/// Every `element_tag` chunk must hold exactly an id and `node_count(element_type)`
/// node indices.
pub fn read_element_list<R: Read>(
    ar: &mut Archive<R>,
    element_tag: u32,
    element_type: ElementType,
    expected: usize,
) -> Result<Vec<DomainElement>> {
    let node_count = element_type.node_count();
    let mut elements = Vec::new();
    elements
        .try_reserve_exact(expected)
        .map_err(|_| XpltError::Allocation(format!("{} elements", expected)))?;
    let mut raw = vec![0i32; node_count];

    while ar.open_chunk()? == ChunkStatus::Open {
        if ar.chunk_id()? == element_tag {
            let size = (node_count + 1) * 4;
            if ar.remaining() != size {
                return Err(XpltError::SizeMismatch {
                    context: format!("{} element", element_type),
                    expected: size as u64,
                    found: ar.remaining() as u64,
                });
            }
            let id = ar.read_i32()?;
            ar.read_i32_array(&mut raw)?;
            let nodes = raw
                .iter()
                .map(|&n| to_index(n, "node"))
                .collect::<Result<Vec<_>>>()?;
            elements.push(DomainElement { id, nodes });
        }
        ar.close_chunk()?;
    }

    if elements.len() != expected {
        return Err(XpltError::CountMismatch {
            item_type: "elements".to_string(),
            expected: expected as u64,
            found: elements.len() as u64,
        });
    }
    Ok(elements)
}

/// Reads a NODESET_LIST payload of exactly `size` node indices.
pub fn read_node_list<R: Read>(ar: &mut Archive<R>, size: usize) -> Result<Vec<usize>> {
    if ar.remaining() != size * 4 {
        return Err(XpltError::SizeMismatch {
            context: "node set list".to_string(),
            expected: (size * 4) as u64,
            found: ar.remaining() as u64,
        });
    }
    let mut raw = vec![0i32; size];
    ar.read_i32_array(&mut raw)?;
    raw.into_iter().map(|n| to_index(n, "node set node")).collect()
}

/// Runs the passes that follow a fully read state.
pub fn finish_state(state: &mut State, model: &Model) {
    let thickness = model
        .data
        .dictionary_fields(Scope::Element)
        .find(|(_, f)| f.name == SHELL_THICKNESS)
        .map(|(i, _)| i);
    if let Some(field) = thickness {
        state.fill_shell_thickness(field, model.mesh.element_count());
    }
    debug!("State at t = {} read", state.time);
}

/// Reads the region chunks of an open variable data chunk into the state
/// container of `item`.
///
/// The container was allocated from this very item, so a value type or
/// storage format that disagrees with the payload surfaces as a size
/// mismatch in `read_values`.
pub fn read_variable_data<R: Read>(
    ar: &mut Archive<R>,
    state: &mut State,
    model: &Model,
    item: &DictItem,
) -> Result<()> {
    if matches!(item.scope, Scope::Global | Scope::Material) {
        trace!("Discarding {} variable '{}'", item.scope, item.name);
        return Ok(());
    }

    let field = item
        .field
        .ok_or_else(|| XpltError::InvalidFormat(format!("Variable '{}' is not registered", item.name)))?;
    let data = state
        .data_mut(item.scope, field)
        .ok_or_else(|| XpltError::InvalidFormat(format!("No state storage for '{}'", item.name)))?;

    while ar.open_chunk()? == ChunkStatus::Open {
        let region = ar.chunk_id()?;
        match item.scope {
            Scope::Node => read_node_region(ar, data, model, item.value_type, region)?,
            Scope::Element => {
                let index = one_based(region, "domain")?;
                let domain = model.domains.get(index).ok_or(XpltError::IndexOutOfRange {
                    what: "domain",
                    index,
                    len: model.domains.len(),
                })?;
                read_domain_region(ar, data, domain, item.value_type)
                    .with_context(|| format!("Reading domain {}", region))?;
            }
            Scope::Face => {
                let index = one_based(region, "surface")?;
                let surface = model.surface_defs.get(index).ok_or(XpltError::IndexOutOfRange {
                    what: "surface",
                    index,
                    len: model.surface_defs.len(),
                })?;
                read_surface_region(ar, data, surface, item.value_type)
                    .with_context(|| format!("Reading surface {}", region))?;
            }
            Scope::Global | Scope::Material => {}
        }
        ar.close_chunk()?;
    }
    Ok(())
}

fn read_node_region<R: Read>(
    ar: &mut Archive<R>,
    data: &mut FieldData,
    model: &Model,
    value_type: ValueType,
    region: u32,
) -> Result<()> {
    if region != 1 {
        return Err(XpltError::IndexOutOfRange {
            what: "node region",
            index: (region as usize).wrapping_sub(1),
            len: 1,
        });
    }
    let node_count = model.mesh.node_count();
    let values = ar.read_values(value_type, node_count)?;
    match data {
        FieldData::PerItem(d) => {
            let items: Vec<usize> = (0..node_count).collect();
            d.add_items(&items, &values)
        }
        other => Err(XpltError::FormatMismatch {
            field: "nodal data".to_string(),
            detail: format!("stored as {}", other.format()),
        }),
    }
}

fn read_domain_region<R: Read>(
    ar: &mut Archive<R>,
    data: &mut FieldData,
    domain: &Domain,
    value_type: ValueType,
) -> Result<()> {
    let items: Vec<usize> = domain.element_indices().collect();
    match data {
        FieldData::PerItem(d) => {
            let values = ar.read_values(value_type, items.len())?;
            d.add_items(&items, &values)
        }
        FieldData::PerNodeOfItem(d) => {
            let map = &domain.node_map;
            let values = ar.read_values(value_type, map.nodes.len())?;
            d.add_nodal(&values, &items, &map.item_nodes, Some(&map.counts))
        }
        FieldData::PerItemMultiValue(d) => {
            let per_item = domain.element_type.node_count();
            let values = ar.read_values(value_type, items.len() * per_item)?;
            for (&item, run) in items.iter().zip(values.chunks_exact(per_item)) {
                d.add_multi(item, per_item, run)?;
            }
            Ok(())
        }
        FieldData::PerRegionConstant(d) => {
            let values = ar.read_values(value_type, 1)?;
            d.add_region(&items, values[0])
        }
    }
}

/// Face values are stored in declared node order and reordered here to the
/// node order of the matching canonical face. Unresolved faces are skipped.
fn read_surface_region<R: Read>(
    ar: &mut Archive<R>,
    data: &mut FieldData,
    surface: &SurfaceDef,
    value_type: ValueType,
) -> Result<()> {
    let faces = &surface.faces;
    match data {
        FieldData::PerItem(d) => {
            let values = ar.read_values(value_type, faces.len())?;
            for (face, value) in faces.iter().zip(values) {
                if let Some(f) = face.resolved {
                    d.add(f, value)?;
                }
            }
            Ok(())
        }
        FieldData::PerNodeOfItem(d) => {
            let map = &surface.node_map;
            let values = ar.read_values(value_type, map.nodes.len())?;
            let mut items = Vec::new();
            let mut counts = Vec::new();
            let mut local_nodes = Vec::new();
            let mut offset = 0;
            for (face, &n) in faces.iter().zip(&map.counts) {
                if let Some(f) = face.resolved {
                    items.push(f);
                    counts.push(n);
                    local_nodes.extend(face.canonical_order.iter().map(|&k| map.item_nodes[offset + k]));
                }
                offset += n;
            }
            d.add_nodal(&values, &items, &local_nodes, Some(&counts))
        }
        FieldData::PerItemMultiValue(d) => {
            let slots = surface.max_facet_nodes;
            let values = ar.read_values(value_type, faces.len() * slots)?;
            let mut canonical: Vec<Value> = Vec::with_capacity(slots);
            for (face, row) in faces.iter().zip(values.chunks_exact(slots.max(1))) {
                if face.nodes.len() > slots {
                    return Err(XpltError::InvalidFormat(format!(
                        "Face {} has {} nodes but only {} value slots",
                        face.id,
                        face.nodes.len(),
                        slots
                    )));
                }
                if let Some(f) = face.resolved {
                    canonical.clear();
                    canonical.extend(face.canonical_order.iter().map(|&k| row[k]));
                    d.add_multi(f, face.nodes.len(), &canonical)?;
                }
            }
            Ok(())
        }
        FieldData::PerRegionConstant(d) => {
            let values = ar.read_values(value_type, 1)?;
            let items: Vec<usize> = faces.iter().filter_map(|f| f.resolved).collect();
            d.add_region(&items, values[0])
        }
    }
}
