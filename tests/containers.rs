use xplt_reader::xplt::data::container::{ItemData, PerItem, PerItemMultiValue, PerNodeOfItem, PerRegionConstant};
use xplt_reader::{FieldData, StorageFormat, Value, ValueType, XpltError};

#[test]
fn per_item_values_are_typed() {
    let mut data = ItemData::<PerItem>::new(ValueType::Vec3, 3).unwrap();
    data.add(2, Value::Vec3([1.0, 2.0, 3.0])).unwrap();

    assert_eq!(data.format(), StorageFormat::PerItem);
    assert_eq!(data.eval(2), Some(Value::Vec3([1.0, 2.0, 3.0])));
    assert_eq!(data.eval(0), None);
    assert_eq!(data.active_count(), 1);

    match data.add(1, Value::Float(1.0)) {
        Err(XpltError::TypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, ValueType::Vec3);
            assert_eq!(found, ValueType::Float);
        }
        other => panic!("Expected a type mismatch, got {:?}", other),
    }
    assert!(!data.active(1), "A rejected value leaves the item inactive");
    assert!(matches!(
        data.add(3, Value::Vec3([0.0; 3])),
        Err(XpltError::IndexOutOfRange { index: 3, len: 3, .. })
    ));
}

#[test]
fn region_constant_is_shared_by_the_region() {
    let mut data = ItemData::<PerRegionConstant>::new(ValueType::Float, 5).unwrap();
    data.add_region(&[1, 2, 4], Value::Float(7.0)).unwrap();
    for item in [1, 2, 4] {
        assert_eq!(data.eval(item), Some(Value::Float(7.0)));
    }
    assert!(!data.active(0));
    assert!(!data.active(3));
    assert_eq!(data.active_count(), 3);
}

#[test]
fn multi_value_requires_one_value_per_local_node() {
    let mut data = ItemData::<PerItemMultiValue>::new(ValueType::Float, 2).unwrap();
    let values: Vec<Value> = (0..3).map(|i| Value::Float(i as f32)).collect();
    data.add_multi(0, 3, &values).unwrap();

    let mut out = Vec::new();
    assert!(data.eval_nodes(0, &mut out));
    assert_eq!(out, values);
    assert!(!data.eval_nodes(1, &mut out));
    assert!(out.is_empty());

    assert!(matches!(
        data.add_multi(1, 4, &values),
        Err(XpltError::CountMismatch { expected: 4, found: 3, .. })
    ));
}

#[test]
fn nodal_values_are_scattered_onto_items() {
    let mut data = ItemData::<PerNodeOfItem>::new(ValueType::Float, 4).unwrap();
    let node_values: Vec<Value> = [10.0, 20.0, 30.0, 40.0].into_iter().map(Value::Float).collect();
    // Item 1 is a triangle, item 3 a quad sharing two of its nodes.
    data.add_nodal(&node_values, &[1, 3], &[0, 1, 2, 2, 1, 3, 0], Some(&[3, 4])).unwrap();

    let mut out = Vec::new();
    assert!(data.eval_nodes(3, &mut out));
    assert_eq!(out, vec![Value::Float(30.0), Value::Float(20.0), Value::Float(40.0), Value::Float(10.0)]);
    assert!(!data.active(0));

    data.add_nodal(&node_values, &[0, 2], &[3, 2, 1, 0], None).unwrap();
    assert!(data.eval_nodes(2, &mut out));
    assert_eq!(out, vec![Value::Float(20.0), Value::Float(10.0)]);

    assert!(matches!(
        data.add_nodal(&node_values, &[0], &[0, 9], None),
        Err(XpltError::IndexOutOfRange { what: "local node", index: 9, .. })
    ));
    assert!(matches!(
        data.add_nodal(&node_values, &[0, 1], &[0, 1, 2], Some(&[1, 1])),
        Err(XpltError::CountMismatch { .. })
    ));
}

#[test]
fn field_data_dispatches_on_format() {
    for format in StorageFormat::ALL {
        let data = FieldData::new(ValueType::Mat3Sym, format, 6).unwrap();
        assert_eq!(data.format(), format);
        assert_eq!(data.value_type(), ValueType::Mat3Sym);
        assert_eq!(data.item_count(), 6);
        assert!(data.values(0).is_empty());
    }
}

#[test]
fn values_are_built_from_exact_component_counts() {
    let sym = Value::from_components(ValueType::Mat3Sym, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    assert_eq!(sym, Value::Mat3Sym([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    assert_eq!(sym.components().len(), 6);

    let tens: Vec<f32> = (0..21).map(|i| i as f32).collect();
    let t = Value::from_components(ValueType::Tens4Sym, &tens).unwrap();
    assert_eq!(t.value_type(), ValueType::Tens4Sym);
    assert_eq!(t.components(), tens.as_slice());

    assert!(matches!(
        Value::from_components(ValueType::Mat3General, &[0.0; 6]),
        Err(XpltError::SizeMismatch { expected: 36, found: 24, .. })
    ));
    assert_eq!(Value::zero(ValueType::Mat3Diagonal), Value::Mat3Diagonal([0.0; 3]));
}
