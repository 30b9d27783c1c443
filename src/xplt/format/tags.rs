//! Chunk id tables for both layout epochs.
//!
//! The two tables share most values but differ in what lives under the
//! geometry/mesh chunk and in the header, so they are kept apart.

/// Chunk ids of the legacy layout (versions 1-4).
pub mod v1 {
    pub const ROOT: u32 = 0x0100_0000;
    pub const HEADER: u32 = 0x0101_0000;
    pub const HDR_VERSION: u32 = 0x0101_0001;
    pub const HDR_NODES: u32 = 0x0101_0002;
    pub const HDR_MAX_FACET_NODES: u32 = 0x0101_0003;
    pub const HDR_COMPRESSION: u32 = 0x0101_0004;
    pub const DICTIONARY: u32 = 0x0102_0000;
    pub const DIC_ITEM: u32 = 0x0102_0001;
    pub const DIC_ITEM_TYPE: u32 = 0x0102_0002;
    pub const DIC_ITEM_FMT: u32 = 0x0102_0003;
    pub const DIC_ITEM_NAME: u32 = 0x0102_0004;
    pub const DIC_GLOBAL: u32 = 0x0102_1000;
    pub const DIC_MATERIAL: u32 = 0x0102_2000;
    pub const DIC_NODAL: u32 = 0x0102_3000;
    pub const DIC_DOMAIN: u32 = 0x0102_4000;
    pub const DIC_SURFACE: u32 = 0x0102_5000;
    pub const MATERIALS: u32 = 0x0103_0000;
    pub const MATERIAL: u32 = 0x0103_0001;
    pub const MAT_ID: u32 = 0x0103_0002;
    pub const MAT_NAME: u32 = 0x0103_0003;
    pub const GEOMETRY: u32 = 0x0104_0000;
    pub const NODE_SECTION: u32 = 0x0104_1000;
    pub const NODE_COORDS: u32 = 0x0104_1001;
    pub const DOMAIN_SECTION: u32 = 0x0104_2000;
    pub const DOMAIN: u32 = 0x0104_2100;
    pub const DOMAIN_HDR: u32 = 0x0104_2101;
    pub const DOM_ELEM_TYPE: u32 = 0x0104_2102;
    pub const DOM_MAT_ID: u32 = 0x0104_2103;
    // Element count and name ids are in the 0x0103 range on the wire.
    pub const DOM_ELEMS: u32 = 0x0103_2104;
    pub const DOM_NAME: u32 = 0x0103_2105;
    pub const DOM_ELEM_LIST: u32 = 0x0104_2200;
    pub const ELEMENT: u32 = 0x0104_2201;
    pub const SURFACE_SECTION: u32 = 0x0104_3000;
    pub const SURFACE: u32 = 0x0104_3100;
    pub const SURFACE_HDR: u32 = 0x0104_3101;
    pub const SURFACE_ID: u32 = 0x0104_3102;
    pub const SURFACE_FACES: u32 = 0x0104_3103;
    pub const SURFACE_NAME: u32 = 0x0104_3104;
    pub const FACE_LIST: u32 = 0x0104_3200;
    pub const FACE: u32 = 0x0104_3201;
    pub const NODESET_SECTION: u32 = 0x0104_4000;
    pub const NODESET: u32 = 0x0104_4100;
    pub const NODESET_HDR: u32 = 0x0104_4101;
    pub const NODESET_ID: u32 = 0x0104_4102;
    pub const NODESET_NAME: u32 = 0x0104_4103;
    pub const NODESET_SIZE: u32 = 0x0104_4104;
    pub const NODESET_LIST: u32 = 0x0104_4200;
    pub const STATE: u32 = 0x0200_0000;
    pub const STATE_HEADER: u32 = 0x0201_0000;
    pub const STATE_HDR_ID: u32 = 0x0201_0001;
    pub const STATE_HDR_TIME: u32 = 0x0201_0002;
    pub const STATE_DATA: u32 = 0x0202_0000;
    pub const STATE_VARIABLE: u32 = 0x0202_0001;
    pub const STATE_VAR_ID: u32 = 0x0202_0002;
    pub const STATE_VAR_DATA: u32 = 0x0202_0003;
    pub const GLOBAL_DATA: u32 = 0x0202_0100;
    pub const MATERIAL_DATA: u32 = 0x0202_0200;
    pub const NODE_DATA: u32 = 0x0202_0300;
    pub const ELEMENT_DATA: u32 = 0x0202_0400;
    pub const FACE_DATA: u32 = 0x0202_0500;
}

/// Chunk ids of the 2.0 layout (versions above 4).
pub mod v2 {
    pub const ROOT: u32 = 0x0100_0000;
    pub const HEADER: u32 = 0x0101_0000;
    pub const HDR_VERSION: u32 = 0x0101_0001;
    pub const HDR_COMPRESSION: u32 = 0x0101_0004;
    pub const HDR_AUTHOR: u32 = 0x0101_0005;
    pub const HDR_SOFTWARE: u32 = 0x0101_0006;
    pub const DICTIONARY: u32 = 0x0102_0000;
    pub const DIC_ITEM: u32 = 0x0102_0001;
    pub const DIC_ITEM_TYPE: u32 = 0x0102_0002;
    pub const DIC_ITEM_FMT: u32 = 0x0102_0003;
    pub const DIC_ITEM_NAME: u32 = 0x0102_0004;
    pub const DIC_ITEM_ARRAYSIZE: u32 = 0x0102_0005;
    pub const DIC_ITEM_ARRAYNAME: u32 = 0x0102_0006;
    pub const DIC_GLOBAL: u32 = 0x0102_1000;
    pub const DIC_NODAL: u32 = 0x0102_3000;
    pub const DIC_DOMAIN: u32 = 0x0102_4000;
    pub const DIC_SURFACE: u32 = 0x0102_5000;
    pub const MESH: u32 = 0x0104_0000;
    pub const NODE_SECTION: u32 = 0x0104_1000;
    pub const NODE_HEADER: u32 = 0x0104_1100;
    pub const NODE_SIZE: u32 = 0x0104_1101;
    pub const NODE_DIM: u32 = 0x0104_1102;
    pub const NODE_NAME: u32 = 0x0104_1103;
    pub const NODE_COORDS: u32 = 0x0104_1200;
    pub const DOMAIN_SECTION: u32 = 0x0104_2000;
    pub const DOMAIN: u32 = 0x0104_2100;
    pub const DOMAIN_HDR: u32 = 0x0104_2101;
    pub const DOM_ELEM_TYPE: u32 = 0x0104_2102;
    pub const DOM_PART_ID: u32 = 0x0104_2103;
    pub const DOM_ELEMS: u32 = 0x0103_2104;
    pub const DOM_NAME: u32 = 0x0103_2105;
    pub const DOM_ELEM_LIST: u32 = 0x0104_2200;
    pub const ELEMENT: u32 = 0x0104_2201;
    pub const SURFACE_SECTION: u32 = 0x0104_3000;
    pub const SURFACE: u32 = 0x0104_3100;
    pub const SURFACE_HDR: u32 = 0x0104_3101;
    pub const SURFACE_ID: u32 = 0x0104_3102;
    pub const SURFACE_FACES: u32 = 0x0104_3103;
    pub const SURFACE_NAME: u32 = 0x0104_3104;
    pub const SURFACE_MAX_FACET_NODES: u32 = 0x0104_3105;
    pub const FACE_LIST: u32 = 0x0104_3200;
    pub const FACE: u32 = 0x0104_3201;
    pub const NODESET_SECTION: u32 = 0x0104_4000;
    pub const NODESET: u32 = 0x0104_4100;
    pub const NODESET_HDR: u32 = 0x0104_4101;
    pub const NODESET_ID: u32 = 0x0104_4102;
    pub const NODESET_NAME: u32 = 0x0104_4103;
    pub const NODESET_SIZE: u32 = 0x0104_4104;
    pub const NODESET_LIST: u32 = 0x0104_4200;
    pub const PARTS_SECTION: u32 = 0x0104_5000;
    pub const PART: u32 = 0x0104_5100;
    pub const PART_ID: u32 = 0x0104_5101;
    pub const PART_NAME: u32 = 0x0104_5102;
    pub const STATE: u32 = 0x0200_0000;
    pub const STATE_HEADER: u32 = 0x0201_0000;
    pub const STATE_HDR_ID: u32 = 0x0201_0001;
    pub const STATE_HDR_TIME: u32 = 0x0201_0002;
    pub const STATE_STATUS: u32 = 0x0201_0003;
    pub const STATE_DATA: u32 = 0x0202_0000;
    pub const STATE_VARIABLE: u32 = 0x0202_0001;
    pub const STATE_VAR_ID: u32 = 0x0202_0002;
    pub const STATE_VAR_DATA: u32 = 0x0202_0003;
    pub const GLOBAL_DATA: u32 = 0x0202_0100;
    pub const MATERIAL_DATA: u32 = 0x0202_0200;
    pub const NODE_DATA: u32 = 0x0202_0300;
    pub const ELEMENT_DATA: u32 = 0x0202_0400;
    pub const FACE_DATA: u32 = 0x0202_0500;
}

/// Width of dictionary item names in both layouts.
pub const DI_NAME_SIZE: usize = 64;

/// Upper bound for length-prefixed strings.
pub const MAX_STRING: usize = 256;
