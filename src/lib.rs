//! # xplt-reader
//!
//! A reader for FEBio XPLT plot files, both the legacy layout (versions up
//! to 4) and the 2.0 layout.
//!
//! A load produces a [`Model`]: the finite element mesh with its canonical
//! boundary faces, the field dictionary and the time-ordered states, each
//! holding typed data per node, element or face.
//!
//! ```no_run
//! use xplt_reader::{load, LoadOptions, StatePolicy};
//!
//! let options = LoadOptions::new().with_states(StatePolicy::LastOnly);
//! let model = load("run.xplt", &options)?;
//! println!("{} nodes, {} states", model.mesh.node_count(), model.state_count());
//! # Ok::<(), xplt_reader::LoadError>(())
//! ```
pub mod xplt;

// Re-export the main types for convenience
pub use xplt::{
    data::{
        container::{FieldData, ItemData},
        manager::{DataManager, FieldDescriptor},
    },
    load, load_from_reader,
    mesh::Mesh,
    model::Model,
    state::{State, StatePolicy},
    types::{
        error::{LoadError, XpltError},
        models::{Compression, DictItem, Dictionary, ElementType, FormatEpoch, Header, Scope, StorageFormat, ValueType},
        value::Value,
    },
    LoadOptions,
};
