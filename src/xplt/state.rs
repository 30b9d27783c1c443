//! Per-timestep data.

use std::collections::BTreeMap;

use super::data::container::FieldData;
use super::data::manager::DataManager;
use super::mesh::Mesh;
use super::types::error::Result;
use super::types::models::Scope;

/// One timestep: a time value and the data of every dictionary field.
#[derive(Debug, Clone)]
pub struct State {
    pub time: f32,
    /// State id from the state header, when present.
    pub id: Option<u32>,
    /// Solver status flag (2.0 layout only).
    pub status: Option<u32>,
    nodes: BTreeMap<usize, FieldData>,
    elements: BTreeMap<usize, FieldData>,
    faces: BTreeMap<usize, FieldData>,
    /// Shell thickness at each local node of each element; empty for
    /// elements without thickness data.
    pub shell_thickness: Vec<Vec<f32>>,
}

impl State {
    /// Allocates empty containers for every dictionary field, sized to the mesh.
    pub fn new(data: &DataManager, mesh: &Mesh) -> Result<Self> {
        let mut state = State {
            time: 0.0,
            id: None,
            status: None,
            nodes: BTreeMap::new(),
            elements: BTreeMap::new(),
            faces: BTreeMap::new(),
            shell_thickness: Vec::new(),
        };
        for (index, field) in data.fields().iter().enumerate() {
            if field.is_derived() {
                continue;
            }
            let (map, count) = match field.scope {
                Scope::Node => (&mut state.nodes, mesh.node_count()),
                Scope::Element => (&mut state.elements, mesh.element_count()),
                Scope::Face => (&mut state.faces, mesh.face_count()),
                Scope::Global | Scope::Material => continue,
            };
            map.insert(index, FieldData::new(field.value_type, field.container_format(), count)?);
        }
        Ok(state)
    }

    /// Data of a field, looked up by field index in whichever scope holds it.
    pub fn data(&self, field: usize) -> Option<&FieldData> {
        self.nodes
            .get(&field)
            .or_else(|| self.elements.get(&field))
            .or_else(|| self.faces.get(&field))
    }

    pub fn data_mut(&mut self, scope: Scope, field: usize) -> Option<&mut FieldData> {
        match scope {
            Scope::Node => self.nodes.get_mut(&field),
            Scope::Element => self.elements.get_mut(&field),
            Scope::Face => self.faces.get_mut(&field),
            Scope::Global | Scope::Material => None,
        }
    }

    pub fn node_data(&self, field: usize) -> Option<&FieldData> {
        self.nodes.get(&field)
    }

    pub fn element_data(&self, field: usize) -> Option<&FieldData> {
        self.elements.get(&field)
    }

    pub fn face_data(&self, field: usize) -> Option<&FieldData> {
        self.faces.get(&field)
    }

    /// Copies a multi-value float field into [`State::shell_thickness`].
    pub fn fill_shell_thickness(&mut self, field: usize, element_count: usize) {
        let mut thickness = vec![Vec::new(); element_count];
        if let Some(FieldData::PerItemMultiValue(d)) = self.elements.get(&field) {
            let mut values = Vec::new();
            for (e, h) in thickness.iter_mut().enumerate() {
                if d.eval_nodes(e, &mut values) {
                    *h = values.iter().filter_map(|v| v.as_float()).collect();
                }
            }
        }
        self.shell_thickness = thickness;
    }
}

/// Which states a load keeps.
///
/// Every state is parsed regardless; the policy only decides which ones are
/// kept in the model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatePolicy {
    #[default]
    All,
    FirstOnly,
    LastOnly,
    FirstAndLast,
    /// Zero-based indices of the states to keep.
    Explicit(Vec<usize>),
}

impl StatePolicy {
    /// Adds the `index`-th parsed state to `kept` according to the policy.
    pub fn retain(&self, kept: &mut Vec<State>, index: usize, state: State) {
        match self {
            StatePolicy::All => kept.push(state),
            StatePolicy::FirstOnly => {
                if index == 0 {
                    kept.push(state);
                }
            }
            StatePolicy::LastOnly => {
                kept.clear();
                kept.push(state);
            }
            StatePolicy::FirstAndLast => {
                if kept.len() == 2 {
                    kept.pop();
                }
                kept.push(state);
            }
            StatePolicy::Explicit(indices) => {
                if indices.contains(&index) {
                    kept.push(state);
                }
            }
        }
    }
}
