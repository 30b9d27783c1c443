mod common;

use common::{field, var, Layout, PlotSpec, StateSpec, SurfaceSpec, HEX_A, HEX_B};
use xplt_reader::xplt::data::manager::FieldSource;
use xplt_reader::{load_from_reader, LoadOptions, Scope, StorageFormat, Value, ValueType};

fn load(plot: &PlotSpec) -> xplt_reader::Model {
    load_from_reader(plot.to_bytes().as_slice(), &LoadOptions::default())
        .unwrap_or_else(|e| panic!("Load failed:\n{}", e))
}

#[test]
fn every_type_format_and_scope_round_trips() {
    for layout in [Layout::Legacy, Layout::V2] {
        let mut plot = PlotSpec::new(layout);
        for vt in ValueType::ALL {
            for fmt in StorageFormat::ALL {
                let name = |scope: &str| format!("{} {} {}", scope, vt.code(), fmt.code());
                plot.nodal.push(field(&name("n"), vt.code(), fmt.code()));
                plot.domain.push(field(&name("e"), vt.code(), fmt.code()));
                plot.surface.push(field(&name("f"), vt.code(), fmt.code()));
            }
        }
        let model = load(&plot);

        for (scope, prefix) in [(Scope::Node, "n"), (Scope::Element, "e"), (Scope::Face, "f")] {
            let items = model.dictionary.items(scope);
            assert_eq!(items.len(), 24, "{:?} {} items", layout, scope);
            let mut k = 0;
            for vt in ValueType::ALL {
                for fmt in StorageFormat::ALL {
                    let item = &items[k];
                    assert_eq!(item.name, format!("{} {} {}", prefix, vt.code(), fmt.code()));
                    assert_eq!(item.value_type, vt);
                    assert_eq!(item.format, fmt);
                    assert_eq!(item.scope, scope);

                    let index = item.field.expect("dictionary items are registered");
                    let descriptor = model.data.field(index).unwrap();
                    assert_eq!(descriptor.name, item.name);
                    assert_eq!(descriptor.value_type, vt);
                    assert_eq!(descriptor.format, fmt);
                    assert_eq!(descriptor.source, FieldSource::Dictionary { index: k });
                    let stored = if scope == Scope::Node { StorageFormat::PerItem } else { fmt };
                    assert_eq!(descriptor.container_format(), stored);
                    k += 1;
                }
            }
        }
        assert_eq!(model.data.len(), 72, "No derived fields without trigger names");
    }
}

/// Number of values in one region payload, and the payload positions each
/// item reads back, for a field of `scope` stored with format `code`.
///
/// The mesh is two hexahedra in one domain, whose local node order equals the
/// global one, and a surface holding canonical face 0 in canonical order.
fn payload_layout(scope: Scope, code: u32) -> (usize, Vec<(usize, Vec<usize>)>) {
    let nodes = |hex: [i32; 8]| hex.iter().map(|&n| n as usize).collect::<Vec<_>>();
    match (scope, code) {
        (Scope::Node, _) => (12, (0..12).map(|i| (i, vec![i])).collect()),
        (Scope::Element, 0) => (12, vec![(0, nodes(HEX_A)), (1, nodes(HEX_B))]),
        (Scope::Element, 1) => (2, vec![(0, vec![0]), (1, vec![1])]),
        (Scope::Element, 2) => (16, vec![(0, (0..8).collect()), (1, (8..16).collect())]),
        (Scope::Element, _) => (1, vec![(0, vec![0]), (1, vec![0])]),
        (_, 0) | (_, 2) => (4, vec![(0, vec![0, 1, 2, 3])]),
        _ => (1, vec![(0, vec![0])]),
    }
}

/// Component `c` of payload value `k` of the field declared `f`-th.
fn component(f: usize, k: usize, c: usize) -> f32 {
    (f * 1000 + k * 32 + c) as f32
}

#[test]
fn every_type_format_and_scope_reads_state_data() {
    let scopes = [(Scope::Node, "n"), (Scope::Element, "e"), (Scope::Face, "f")];
    for layout in [Layout::Legacy, Layout::V2] {
        let mut plot = PlotSpec::two_hex(layout, false);
        plot.surfaces = vec![SurfaceSpec {
            id: 1,
            name: "contact".to_string(),
            max_facet_nodes: 4,
            faces: vec![(1, vec![0, 1, 5, 4])],
        }];
        let mut state = StateSpec::at(1.0);
        let mut f = 0;
        for (scope, prefix) in scopes {
            let mut var_id = 1;
            for vt in ValueType::ALL {
                for fmt in StorageFormat::ALL {
                    let declared = field(&format!("{} {} {}", prefix, vt.code(), fmt.code()), vt.code(), fmt.code());
                    let (count, _) = payload_layout(scope, fmt.code());
                    let payload: Vec<f32> = (0..count)
                        .flat_map(|k| (0..vt.components()).map(move |c| component(f, k, c)))
                        .collect();
                    let (fields, vars) = match scope {
                        Scope::Node => (&mut plot.nodal, &mut state.nodal),
                        Scope::Element => (&mut plot.domain, &mut state.domain),
                        _ => (&mut plot.surface, &mut state.surface),
                    };
                    fields.push(declared);
                    vars.push(var(var_id, vec![(1, payload)]));
                    var_id += 1;
                    f += 1;
                }
            }
        }
        plot.states = vec![state];
        let model = load(&plot);
        let state = model.state(0).unwrap();

        let mut f = 0;
        for (scope, _) in scopes {
            for item in model.dictionary.items(scope) {
                let vt = item.value_type;
                let data = state.data(item.field.unwrap()).unwrap();
                for (target, positions) in payload_layout(scope, item.format.code()).1 {
                    let expected: Vec<Value> = positions
                        .iter()
                        .map(|&k| {
                            let comps: Vec<f32> = (0..vt.components()).map(|c| component(f, k, c)).collect();
                            Value::from_components(vt, &comps).unwrap()
                        })
                        .collect();
                    assert_eq!(
                        data.values(target),
                        expected,
                        "{:?} '{}' item {}",
                        layout,
                        item.name,
                        target
                    );
                }
                f += 1;
            }
        }
        assert_eq!(f, 72);
    }
}

#[test]
fn field_indices_follow_nodal_domain_surface_order() {
    let mut plot = PlotSpec::new(Layout::V2);
    plot.surface.push(field("contact pressure", 0, 1));
    plot.nodal.push(field("velocity", 1, 0));
    plot.domain.push(field("strain energy", 0, 1));
    plot.global.push(field("time step", 0, 1));
    let model = load(&plot);

    assert_eq!(model.data.find("velocity"), Some(0));
    assert_eq!(model.data.find("strain energy"), Some(1));
    assert_eq!(model.data.find("contact pressure"), Some(2));
    assert_eq!(model.data.find("time step"), None, "Global items are not registered");
    assert_eq!(model.dictionary.global.len(), 1);
}

#[test]
fn names_are_cut_at_the_first_equals_sign() {
    let mut plot = PlotSpec::new(Layout::Legacy);
    plot.nodal.push(field("displacement=disp=x", 1, 0));
    plot.domain.push(field("von mises", 0, 1));
    let model = load(&plot);
    assert_eq!(model.dictionary.nodal[0].name, "displacement");
    assert_eq!(model.dictionary.domain[0].name, "von mises");
}

#[test]
fn trigger_names_add_derived_fields() {
    let mut plot = PlotSpec::new(Layout::V2);
    plot.nodal.push(field("displacement", 1, 0));
    plot.domain.push(field("stress", 2, 1));
    plot.domain.push(field("shell thickness", 0, 2));
    plot.domain.push(field("stress xx", 0, 1));
    let model = load(&plot);

    let derived: Vec<(&str, Scope, ValueType, StorageFormat)> = model
        .data
        .fields()
        .iter()
        .filter(|f| f.is_derived())
        .map(|f| (f.name.as_str(), f.scope, f.value_type, f.format))
        .collect();
    assert_eq!(
        derived,
        vec![
            ("Lagrange strain", Scope::Element, ValueType::Mat3Sym, StorageFormat::PerItem),
            ("position", Scope::Node, ValueType::Vec3, StorageFormat::PerItem),
            ("initial position", Scope::Node, ValueType::Vec3, StorageFormat::PerItem),
            ("pressure", Scope::Element, ValueType::Float, StorageFormat::PerItem),
            ("shell strain", Scope::Element, ValueType::Mat3Sym, StorageFormat::PerItem),
        ]
    );
    assert_eq!(model.data.len(), 4 + 5);
    assert!(model.data.find("nodal pressure").is_none());
    assert!(model.data.find("elasticity eigenvalues").is_none());
}

#[test]
fn remaining_triggers() {
    let mut plot = PlotSpec::new(Layout::Legacy);
    plot.domain.push(field("nodal stress", 2, 2));
    plot.domain.push(field("fluid pressure", 0, 1));
    plot.domain.push(field("elasticity", 4, 1));
    let model = load(&plot);

    let nodal_pressure = model.data.field(model.data.find("nodal pressure").unwrap()).unwrap();
    assert_eq!(nodal_pressure.format, StorageFormat::PerItemMultiValue);
    assert_eq!(nodal_pressure.value_type, ValueType::Float);
    let solid_stress = model.data.field(model.data.find("solid stress").unwrap()).unwrap();
    assert_eq!(solid_stress.value_type, ValueType::Mat3Sym);
    let eigen = model.data.field(model.data.find("elasticity eigenvalues").unwrap()).unwrap();
    assert_eq!(eigen.value_type, ValueType::Vec3);
}

#[test]
fn unknown_value_type_is_fatal() {
    let mut plot = PlotSpec::new(Layout::V2);
    plot.domain.push(field("bad", 9, 1));
    let err = load_from_reader(plot.to_bytes().as_slice(), &LoadOptions::default()).unwrap_err();
    assert_eq!(err.messages()[0], "Unknown value type: 9");
    assert!(err.count() >= 2, "Section context is attached: {}", err);
    assert!(err.message().contains("Reading dictionary"));
}

#[test]
fn unknown_storage_format_is_fatal() {
    let mut plot = PlotSpec::new(Layout::Legacy);
    plot.nodal.push(field("bad", 0, 4));
    let err = load_from_reader(plot.to_bytes().as_slice(), &LoadOptions::default()).unwrap_err();
    assert_eq!(err.messages()[0], "Unknown storage format: 4");
}
