//! Builders for in-memory XPLT files.
#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use xplt_reader::xplt::archive::FEBIO_TAG;
use xplt_reader::xplt::format::tags::{v1, v2, DI_NAME_SIZE};

pub fn chunk(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.write_u32::<LittleEndian>(id).unwrap();
    out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
    out.extend_from_slice(payload);
    out
}

pub fn branch(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    chunk(id, &children.concat())
}

pub fn u32s(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_u32::<LittleEndian>(v).unwrap();
    }
    out
}

pub fn i32s(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_i32::<LittleEndian>(v).unwrap();
    }
    out
}

pub fn f32s(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_f32::<LittleEndian>(v).unwrap();
    }
    out
}

pub fn u32_chunk(id: u32, value: u32) -> Vec<u8> {
    chunk(id, &u32s(&[value]))
}

/// NUL-padded fixed-width name.
pub fn fixed(name: &str, width: usize) -> Vec<u8> {
    let mut out = name.as_bytes().to_vec();
    out.resize(width, 0);
    out
}

/// Length-prefixed string.
pub fn string(s: &str) -> Vec<u8> {
    let mut out = u32s(&[s.len() as u32]);
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn file(top_level: &[Vec<u8>]) -> Vec<u8> {
    let mut out = u32s(&[FEBIO_TAG]);
    for c in top_level {
        out.extend_from_slice(c);
    }
    out
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Legacy,
    V2,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub value_type: u32,
    pub format: u32,
}

pub fn field(name: &str, value_type: u32, format: u32) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        value_type,
        format,
    }
}

#[derive(Debug, Clone)]
pub struct DomainSpec {
    pub element_type: u32,
    /// 1-based.
    pub material: u32,
    pub name: String,
    pub elements: Vec<(i32, Vec<i32>)>,
}

#[derive(Debug, Clone)]
pub struct SurfaceSpec {
    pub id: u32,
    pub name: String,
    pub max_facet_nodes: u32,
    pub faces: Vec<(i32, Vec<i32>)>,
}

#[derive(Debug, Clone)]
pub struct NodeSetSpec {
    pub id: u32,
    pub name: String,
    pub nodes: Vec<i32>,
}

/// One state variable: a 1-based dictionary id and its region payloads.
#[derive(Debug, Clone)]
pub struct VarSpec {
    pub id: u32,
    pub regions: Vec<(u32, Vec<f32>)>,
}

pub fn var(id: u32, regions: Vec<(u32, Vec<f32>)>) -> VarSpec {
    VarSpec { id, regions }
}

#[derive(Debug, Clone, Default)]
pub struct StateSpec {
    pub time: f32,
    pub status: Option<u32>,
    pub global: Vec<VarSpec>,
    pub nodal: Vec<VarSpec>,
    pub domain: Vec<VarSpec>,
    pub surface: Vec<VarSpec>,
}

impl StateSpec {
    pub fn at(time: f32) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }
}

/// A whole plot file described field by field.
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub layout: Layout,
    pub version: u32,
    pub compression: u32,
    pub max_facet_nodes: Option<u32>,
    pub global: Vec<FieldSpec>,
    pub nodal: Vec<FieldSpec>,
    pub domain: Vec<FieldSpec>,
    pub surface: Vec<FieldSpec>,
    pub materials: Vec<String>,
    pub nodes: Vec<[f32; 3]>,
    pub domains: Vec<DomainSpec>,
    pub surfaces: Vec<SurfaceSpec>,
    pub node_sets: Vec<NodeSetSpec>,
    /// 2.0 only: write the mesh as a top-level chunk after ROOT.
    pub mesh_after_root: bool,
    pub states: Vec<StateSpec>,
}

/// Two unit hexahedra side by side along x, sharing the face 1-2-6-5.
pub fn two_hex_nodes() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [2.0, 0.0, 0.0],
        [2.0, 1.0, 0.0],
        [2.0, 0.0, 1.0],
        [2.0, 1.0, 1.0],
    ]
}

pub const HEX_A: [i32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
pub const HEX_B: [i32; 8] = [1, 8, 9, 2, 5, 10, 11, 6];

impl PlotSpec {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            version: match layout {
                Layout::Legacy => 3,
                Layout::V2 => 0x31,
            },
            compression: 0,
            max_facet_nodes: None,
            global: Vec::new(),
            nodal: Vec::new(),
            domain: Vec::new(),
            surface: Vec::new(),
            materials: Vec::new(),
            nodes: Vec::new(),
            domains: Vec::new(),
            surfaces: Vec::new(),
            node_sets: Vec::new(),
            mesh_after_root: false,
            states: Vec::new(),
        }
    }

    /// Two hex8 elements in one domain of material 1, or one domain each
    /// when `split` is set.
    pub fn two_hex(layout: Layout, split: bool) -> Self {
        let mut plot = Self::new(layout);
        plot.nodes = two_hex_nodes();
        if split {
            plot.materials = vec!["left".to_string(), "right".to_string()];
            plot.domains = vec![
                DomainSpec {
                    element_type: 0,
                    material: 1,
                    name: "left".to_string(),
                    elements: vec![(1, HEX_A.to_vec())],
                },
                DomainSpec {
                    element_type: 0,
                    material: 2,
                    name: "right".to_string(),
                    elements: vec![(2, HEX_B.to_vec())],
                },
            ];
        } else {
            plot.materials = vec!["solid".to_string()];
            plot.domains = vec![DomainSpec {
                element_type: 0,
                material: 1,
                name: "solid".to_string(),
                elements: vec![(1, HEX_A.to_vec()), (2, HEX_B.to_vec())],
            }];
        }
        plot
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut root = vec![self.header(), self.dictionary()];
        let mut top = Vec::new();
        match self.layout {
            Layout::Legacy => {
                root.push(self.legacy_materials());
                root.push(self.mesh());
            }
            Layout::V2 => {
                if !self.mesh_after_root {
                    root.push(self.mesh());
                }
            }
        }
        top.push(branch(v1::ROOT, &root));
        if self.layout == Layout::V2 && self.mesh_after_root {
            top.push(self.mesh());
        }
        for state in &self.states {
            top.push(self.state(state));
        }
        file(&top)
    }

    fn header(&self) -> Vec<u8> {
        let mut children = vec![u32_chunk(v1::HDR_VERSION, self.version)];
        match self.layout {
            Layout::Legacy => {
                children.push(u32_chunk(v1::HDR_NODES, self.nodes.len() as u32));
                children.push(u32_chunk(
                    v1::HDR_MAX_FACET_NODES,
                    self.max_facet_nodes.unwrap_or(4),
                ));
            }
            Layout::V2 => {
                children.push(chunk(v2::HDR_AUTHOR, &string("tester")));
                children.push(chunk(v2::HDR_SOFTWARE, &string("fixture builder")));
            }
        }
        children.push(u32_chunk(v1::HDR_COMPRESSION, self.compression));
        branch(v1::HEADER, &children)
    }

    fn dictionary(&self) -> Vec<u8> {
        let list = |id: u32, fields: &[FieldSpec]| {
            let items: Vec<Vec<u8>> = fields
                .iter()
                .map(|f| {
                    branch(
                        v1::DIC_ITEM,
                        &[
                            u32_chunk(v1::DIC_ITEM_TYPE, f.value_type),
                            u32_chunk(v1::DIC_ITEM_FMT, f.format),
                            chunk(v1::DIC_ITEM_NAME, &fixed(&f.name, DI_NAME_SIZE)),
                        ],
                    )
                })
                .collect();
            branch(id, &items)
        };
        branch(
            v1::DICTIONARY,
            &[
                list(v1::DIC_GLOBAL, &self.global),
                list(v1::DIC_NODAL, &self.nodal),
                list(v1::DIC_DOMAIN, &self.domain),
                list(v1::DIC_SURFACE, &self.surface),
            ],
        )
    }

    fn legacy_materials(&self) -> Vec<u8> {
        let materials: Vec<Vec<u8>> = self
            .materials
            .iter()
            .enumerate()
            .map(|(i, name)| {
                branch(
                    v1::MATERIAL,
                    &[
                        u32_chunk(v1::MAT_ID, i as u32 + 1),
                        chunk(v1::MAT_NAME, &fixed(name, DI_NAME_SIZE)),
                    ],
                )
            })
            .collect();
        branch(v1::MATERIALS, &materials)
    }

    fn name(&self, name: &str) -> Vec<u8> {
        match self.layout {
            Layout::Legacy => fixed(name, DI_NAME_SIZE),
            Layout::V2 => string(name),
        }
    }

    fn mesh(&self) -> Vec<u8> {
        let mut sections = vec![self.node_section()];

        let domains: Vec<Vec<u8>> = self
            .domains
            .iter()
            .map(|d| {
                let elements: Vec<Vec<u8>> = d
                    .elements
                    .iter()
                    .map(|(id, nodes)| {
                        let mut payload = i32s(&[*id]);
                        payload.extend(i32s(nodes));
                        chunk(v1::ELEMENT, &payload)
                    })
                    .collect();
                branch(
                    v1::DOMAIN,
                    &[
                        branch(
                            v1::DOMAIN_HDR,
                            &[
                                u32_chunk(v1::DOM_ELEM_TYPE, d.element_type),
                                u32_chunk(v1::DOM_MAT_ID, d.material),
                                u32_chunk(v1::DOM_ELEMS, d.elements.len() as u32),
                                chunk(v1::DOM_NAME, &self.name(&d.name)),
                            ],
                        ),
                        branch(v1::DOM_ELEM_LIST, &elements),
                    ],
                )
            })
            .collect();
        sections.push(branch(v1::DOMAIN_SECTION, &domains));

        if !self.surfaces.is_empty() {
            let surfaces: Vec<Vec<u8>> = self.surfaces.iter().map(|s| self.surface(s)).collect();
            sections.push(branch(v1::SURFACE_SECTION, &surfaces));
        }

        if !self.node_sets.is_empty() {
            let sets: Vec<Vec<u8>> = self
                .node_sets
                .iter()
                .map(|s| {
                    branch(
                        v1::NODESET,
                        &[
                            branch(
                                v1::NODESET_HDR,
                                &[
                                    u32_chunk(v1::NODESET_ID, s.id),
                                    chunk(v1::NODESET_NAME, &self.name(&s.name)),
                                    u32_chunk(v1::NODESET_SIZE, s.nodes.len() as u32),
                                ],
                            ),
                            chunk(v1::NODESET_LIST, &i32s(&s.nodes)),
                        ],
                    )
                })
                .collect();
            sections.push(branch(v1::NODESET_SECTION, &sets));
        }

        if self.layout == Layout::V2 {
            let parts: Vec<Vec<u8>> = self
                .materials
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    branch(
                        v2::PART,
                        &[u32_chunk(v2::PART_ID, i as u32 + 1), chunk(v2::PART_NAME, &string(name))],
                    )
                })
                .collect();
            sections.push(branch(v2::PARTS_SECTION, &parts));
        }

        branch(v1::GEOMETRY, &sections)
    }

    fn node_section(&self) -> Vec<u8> {
        match self.layout {
            Layout::Legacy => {
                let coords: Vec<f32> = self.nodes.iter().flatten().copied().collect();
                branch(v1::NODE_SECTION, &[chunk(v1::NODE_COORDS, &f32s(&coords))])
            }
            Layout::V2 => {
                let mut coords = Vec::new();
                for (i, p) in self.nodes.iter().enumerate() {
                    coords.extend(i32s(&[i as i32 + 1]));
                    coords.extend(f32s(p));
                }
                branch(
                    v2::NODE_SECTION,
                    &[
                        branch(
                            v2::NODE_HEADER,
                            &[
                                u32_chunk(v2::NODE_SIZE, self.nodes.len() as u32),
                                u32_chunk(v2::NODE_DIM, 3),
                                chunk(v2::NODE_NAME, &string("nodes")),
                            ],
                        ),
                        chunk(v2::NODE_COORDS, &coords),
                    ],
                )
            }
        }
    }

    fn surface(&self, s: &SurfaceSpec) -> Vec<u8> {
        let slots = s.max_facet_nodes as usize;
        let faces: Vec<Vec<u8>> = s
            .faces
            .iter()
            .map(|(id, nodes)| {
                let mut padded = nodes.clone();
                let mut payload = i32s(&[*id]);
                match self.layout {
                    Layout::Legacy => {
                        // A triangle repeats its last node in the fourth slot.
                        while padded.len() < slots {
                            padded.push(*nodes.last().unwrap());
                        }
                    }
                    Layout::V2 => {
                        payload.extend(i32s(&[nodes.len() as i32]));
                        padded.resize(slots, 0);
                    }
                }
                payload.extend(i32s(&padded));
                chunk(v1::FACE, &payload)
            })
            .collect();

        let mut header = vec![
            u32_chunk(v1::SURFACE_ID, s.id),
            u32_chunk(v1::SURFACE_FACES, s.faces.len() as u32),
            chunk(v1::SURFACE_NAME, &self.name(&s.name)),
        ];
        if self.layout == Layout::V2 {
            header.push(u32_chunk(v2::SURFACE_MAX_FACET_NODES, s.max_facet_nodes));
        }
        branch(
            v1::SURFACE,
            &[branch(v1::SURFACE_HDR, &header), branch(v1::FACE_LIST, &faces)],
        )
    }

    fn state(&self, state: &StateSpec) -> Vec<u8> {
        let vars = |id: u32, vars: &[VarSpec]| {
            let vars: Vec<Vec<u8>> = vars
                .iter()
                .map(|v| {
                    let regions: Vec<Vec<u8>> = v.regions.iter().map(|(r, data)| chunk(*r, &f32s(data))).collect();
                    branch(
                        v1::STATE_VARIABLE,
                        &[u32_chunk(v1::STATE_VAR_ID, v.id), branch(v1::STATE_VAR_DATA, &regions)],
                    )
                })
                .collect();
            branch(id, &vars)
        };

        let mut header = vec![chunk(v1::STATE_HDR_TIME, &f32s(&[state.time]))];
        if let Some(status) = state.status {
            header.push(u32_chunk(v2::STATE_STATUS, status));
        }
        let payload = [
            branch(v1::STATE_HEADER, &header),
            branch(
                v1::STATE_DATA,
                &[
                    vars(v1::GLOBAL_DATA, &state.global),
                    vars(v1::NODE_DATA, &state.nodal),
                    vars(v1::ELEMENT_DATA, &state.domain),
                    vars(v1::FACE_DATA, &state.surface),
                ],
            ),
        ]
        .concat();

        match self.compression {
            1 => chunk(v1::STATE, &zlib(&payload)),
            _ => chunk(v1::STATE, &payload),
        }
    }
}
