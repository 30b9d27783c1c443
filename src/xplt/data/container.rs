//! Typed mesh-data containers.
//!
//! An [`ItemData<F>`] holds values of one [`ValueType`] attached to the items
//! (nodes, elements or faces) of a mesh. The storage format `F` is a marker
//! type deciding which `add`/`eval` forms exist:
//!
//! | marker | stored per item | eval |
//! |---|---|---|
//! | [`PerItem`] | one value | [`ItemData::eval`] |
//! | [`PerRegionConstant`] | one value shared by the region | [`ItemData::eval`] |
//! | [`PerItemMultiValue`] | one value per local node | [`ItemData::eval_nodes`] |
//! | [`PerNodeOfItem`] | one value per local node, scattered from region nodes | [`ItemData::eval_nodes`] |
//!
//! [`FieldData`] is the runtime form used by states, one variant per format.

use std::marker::PhantomData;

use crate::xplt::types::error::{Result, XpltError};
use crate::xplt::types::models::{StorageFormat, ValueType};
use crate::xplt::types::value::Value;

/// A storage format marker.
pub trait Layout {
    const FORMAT: StorageFormat;
}

/// Zero-cost marker for values per region node.
#[derive(Debug, Clone, Copy)]
pub struct PerNodeOfItem;

/// Zero-cost marker for one value per item.
#[derive(Debug, Clone, Copy)]
pub struct PerItem;

/// Zero-cost marker for one value per local node of each item.
#[derive(Debug, Clone, Copy)]
pub struct PerItemMultiValue;

/// Zero-cost marker for one value per region.
#[derive(Debug, Clone, Copy)]
pub struct PerRegionConstant;

impl Layout for PerNodeOfItem {
    const FORMAT: StorageFormat = StorageFormat::PerNodeOfItem;
}

impl Layout for PerItem {
    const FORMAT: StorageFormat = StorageFormat::PerItem;
}

impl Layout for PerItemMultiValue {
    const FORMAT: StorageFormat = StorageFormat::PerItemMultiValue;
}

impl Layout for PerRegionConstant {
    const FORMAT: StorageFormat = StorageFormat::PerRegionConstant;
}

/// Where an item's values live in the flat component buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    /// Index of the first value (not component).
    first: usize,
    count: usize,
}

/// Values of one type attached to mesh items in storage format `F`.
#[derive(Debug, Clone)]
pub struct ItemData<F: Layout> {
    value_type: ValueType,
    slots: Vec<Option<Slot>>,
    components: Vec<f32>,
    _format: PhantomData<F>,
}

impl<F: Layout> ItemData<F> {
    /// Creates an empty container for `item_count` items.
    ///
    /// The slot table is allocated fallibly so that a huge mesh reports an
    /// allocation error instead of aborting.
    pub fn new(value_type: ValueType, item_count: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(item_count)
            .map_err(|_| XpltError::Allocation(format!("{} data for {} items", value_type, item_count)))?;
        slots.resize(item_count, None);
        Ok(Self {
            value_type,
            slots,
            components: Vec::new(),
            _format: PhantomData,
        })
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn format(&self) -> StorageFormat {
        F::FORMAT
    }

    pub fn item_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the item was assigned data.
    pub fn active(&self, item: usize) -> bool {
        matches!(self.slots.get(item), Some(Some(_)))
    }

    /// Number of items that were assigned data.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn check_item(&self, item: usize) -> Result<()> {
        if item >= self.slots.len() {
            return Err(XpltError::IndexOutOfRange {
                what: "item",
                index: item,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    fn push(&mut self, value: &Value) -> Result<usize> {
        if value.value_type() != self.value_type {
            return Err(XpltError::TypeMismatch {
                field: format!("{} container", F::FORMAT),
                expected: self.value_type,
                found: value.value_type(),
            });
        }
        let index = self.components.len() / self.value_type.components();
        self.components
            .try_reserve(self.value_type.components())
            .map_err(|_| XpltError::Allocation("field values".to_string()))?;
        self.components.extend_from_slice(value.components());
        Ok(index)
    }

    fn value_at(&self, index: usize) -> Result<Value> {
        let stride = self.value_type.components();
        Value::from_components(self.value_type, &self.components[index * stride..(index + 1) * stride])
    }

    fn push_run(&mut self, item: usize, values: &[Value]) -> Result<()> {
        self.check_item(item)?;
        let first = self.components.len() / self.value_type.components();
        for v in values {
            self.push(v)?;
        }
        self.slots[item] = Some(Slot {
            first,
            count: values.len(),
        });
        Ok(())
    }

    fn single(&self, item: usize) -> Option<Value> {
        let slot = (*self.slots.get(item)?)?;
        self.value_at(slot.first).ok()
    }

    fn run(&self, item: usize, out: &mut Vec<Value>) -> bool {
        out.clear();
        match self.slots.get(item) {
            Some(Some(slot)) => {
                for i in slot.first..slot.first + slot.count {
                    match self.value_at(i) {
                        Ok(v) => out.push(v),
                        Err(_) => return false,
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl ItemData<PerItem> {
    pub fn add(&mut self, item: usize, value: Value) -> Result<()> {
        self.check_item(item)?;
        let index = self.push(&value)?;
        self.slots[item] = Some(Slot { first: index, count: 1 });
        Ok(())
    }

    /// Assigns `values[i]` to `items[i]`.
    pub fn add_items(&mut self, items: &[usize], values: &[Value]) -> Result<()> {
        if items.len() != values.len() {
            return Err(XpltError::CountMismatch {
                item_type: "values per item".to_string(),
                expected: items.len() as u64,
                found: values.len() as u64,
            });
        }
        for (&item, value) in items.iter().zip(values) {
            self.add(item, *value)?;
        }
        Ok(())
    }

    pub fn eval(&self, item: usize) -> Option<Value> {
        self.single(item)
    }
}

impl ItemData<PerRegionConstant> {
    /// Stores `value` once and shares it with every item of the region.
    pub fn add_region(&mut self, items: &[usize], value: Value) -> Result<()> {
        for &item in items {
            self.check_item(item)?;
        }
        let index = self.push(&value)?;
        for &item in items {
            self.slots[item] = Some(Slot { first: index, count: 1 });
        }
        Ok(())
    }

    /// Returns the region's value; every item of a region yields the same one.
    pub fn eval(&self, item: usize) -> Option<Value> {
        self.single(item)
    }
}

impl ItemData<PerItemMultiValue> {
    /// Assigns one value per local node of `item`.
    pub fn add_multi(&mut self, item: usize, local_node_count: usize, values: &[Value]) -> Result<()> {
        if values.len() != local_node_count {
            return Err(XpltError::CountMismatch {
                item_type: format!("values of item {}", item),
                expected: local_node_count as u64,
                found: values.len() as u64,
            });
        }
        self.push_run(item, values)
    }

    /// Fills `out` with one value per local node. Returns false for inactive items.
    pub fn eval_nodes(&self, item: usize, out: &mut Vec<Value>) -> bool {
        self.run(item, out)
    }
}

impl ItemData<PerNodeOfItem> {
    /// Scatters region node values onto items.
    ///
    /// `local_nodes` is the concatenation, item by item, of indices into
    /// `node_values`. `counts[i]` is the number of local nodes of `items[i]`;
    /// without it every item takes `local_nodes.len() / items.len()` entries.
    pub fn add_nodal(
        &mut self,
        node_values: &[Value],
        items: &[usize],
        local_nodes: &[usize],
        counts: Option<&[usize]>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let uniform;
        let counts = match counts {
            Some(c) => c,
            None => {
                uniform = vec![local_nodes.len() / items.len(); items.len()];
                &uniform
            }
        };
        if counts.len() != items.len() || counts.iter().sum::<usize>() != local_nodes.len() {
            return Err(XpltError::CountMismatch {
                item_type: "local node indices".to_string(),
                expected: counts.iter().sum::<usize>() as u64,
                found: local_nodes.len() as u64,
            });
        }

        let mut offset = 0;
        let mut run = Vec::new();
        for (&item, &n) in items.iter().zip(counts) {
            run.clear();
            for &local in &local_nodes[offset..offset + n] {
                let value = node_values.get(local).ok_or(XpltError::IndexOutOfRange {
                    what: "local node",
                    index: local,
                    len: node_values.len(),
                })?;
                run.push(*value);
            }
            self.push_run(item, &run)?;
            offset += n;
        }
        Ok(())
    }

    /// Fills `out` with one value per local node. Returns false for inactive items.
    pub fn eval_nodes(&self, item: usize, out: &mut Vec<Value>) -> bool {
        self.run(item, out)
    }
}

/// A field's per-state data in whichever storage format it was declared.
#[derive(Debug, Clone)]
pub enum FieldData {
    PerNodeOfItem(ItemData<PerNodeOfItem>),
    PerItem(ItemData<PerItem>),
    PerItemMultiValue(ItemData<PerItemMultiValue>),
    PerRegionConstant(ItemData<PerRegionConstant>),
}

impl FieldData {
    pub fn new(value_type: ValueType, format: StorageFormat, item_count: usize) -> Result<Self> {
        Ok(match format {
            StorageFormat::PerNodeOfItem => FieldData::PerNodeOfItem(ItemData::new(value_type, item_count)?),
            StorageFormat::PerItem => FieldData::PerItem(ItemData::new(value_type, item_count)?),
            StorageFormat::PerItemMultiValue => {
                FieldData::PerItemMultiValue(ItemData::new(value_type, item_count)?)
            }
            StorageFormat::PerRegionConstant => {
                FieldData::PerRegionConstant(ItemData::new(value_type, item_count)?)
            }
        })
    }

    pub fn format(&self) -> StorageFormat {
        match self {
            FieldData::PerNodeOfItem(_) => StorageFormat::PerNodeOfItem,
            FieldData::PerItem(_) => StorageFormat::PerItem,
            FieldData::PerItemMultiValue(_) => StorageFormat::PerItemMultiValue,
            FieldData::PerRegionConstant(_) => StorageFormat::PerRegionConstant,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            FieldData::PerNodeOfItem(d) => d.value_type(),
            FieldData::PerItem(d) => d.value_type(),
            FieldData::PerItemMultiValue(d) => d.value_type(),
            FieldData::PerRegionConstant(d) => d.value_type(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            FieldData::PerNodeOfItem(d) => d.item_count(),
            FieldData::PerItem(d) => d.item_count(),
            FieldData::PerItemMultiValue(d) => d.item_count(),
            FieldData::PerRegionConstant(d) => d.item_count(),
        }
    }

    pub fn active(&self, item: usize) -> bool {
        match self {
            FieldData::PerNodeOfItem(d) => d.active(item),
            FieldData::PerItem(d) => d.active(item),
            FieldData::PerItemMultiValue(d) => d.active(item),
            FieldData::PerRegionConstant(d) => d.active(item),
        }
    }

    /// All values of one item: a single value for per-item and region data,
    /// one per local node otherwise. Empty when the item is inactive.
    pub fn values(&self, item: usize) -> Vec<Value> {
        let mut out = Vec::new();
        match self {
            FieldData::PerNodeOfItem(d) => {
                d.eval_nodes(item, &mut out);
            }
            FieldData::PerItemMultiValue(d) => {
                d.eval_nodes(item, &mut out);
            }
            FieldData::PerItem(d) => out.extend(d.eval(item)),
            FieldData::PerRegionConstant(d) => out.extend(d.eval(item)),
        }
        out
    }

    pub fn as_per_item(&self) -> Option<&ItemData<PerItem>> {
        match self {
            FieldData::PerItem(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_per_node_of_item(&self) -> Option<&ItemData<PerNodeOfItem>> {
        match self {
            FieldData::PerNodeOfItem(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_multi_value(&self) -> Option<&ItemData<PerItemMultiValue>> {
        match self {
            FieldData::PerItemMultiValue(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_region_constant(&self) -> Option<&ItemData<PerRegionConstant>> {
        match self {
            FieldData::PerRegionConstant(d) => Some(d),
            _ => None,
        }
    }
}
