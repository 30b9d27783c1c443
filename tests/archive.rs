mod common;

use std::io::Cursor;

use common::{branch, chunk, file, u32s, zlib};
use proptest::prelude::*;
use xplt_reader::xplt::archive::{Archive, ChunkStatus, CHUNK_END};
use xplt_reader::{Compression, ValueType, XpltError};

#[derive(Debug, Clone, PartialEq)]
enum Tree {
    /// Even id, raw u32 payload.
    Leaf(u32, Vec<u32>),
    /// Odd id, nested children.
    Node(u32, Vec<Tree>),
}

fn encode(tree: &Tree) -> Vec<u8> {
    match tree {
        Tree::Leaf(id, values) => chunk(*id, &u32s(values)),
        Tree::Node(id, children) => {
            let children: Vec<Vec<u8>> = children.iter().map(encode).collect();
            branch(*id, &children)
        }
    }
}

fn decode(ar: &mut Archive<Cursor<Vec<u8>>>) -> Vec<Tree> {
    let mut out = Vec::new();
    while ar.open_chunk().unwrap() == ChunkStatus::Open {
        let id = ar.chunk_id().unwrap();
        if id % 2 == 0 {
            let mut values = vec![0u32; ar.remaining() / 4];
            ar.read_u32_array(&mut values).unwrap();
            out.push(Tree::Leaf(id, values));
        } else {
            out.push(Tree::Node(id, decode(ar)));
        }
        ar.close_chunk().unwrap();
    }
    out
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = (0u32..1000, prop::collection::vec(any::<u32>(), 0..8)).prop_map(|(k, v)| Tree::Leaf(2 * k, v));
    leaf.prop_recursive(4, 64, 6, |inner| {
        (0u32..1000, prop::collection::vec(inner, 0..6)).prop_map(|(k, c)| Tree::Node(2 * k + 1, c))
    })
}

proptest! {
    #[test]
    fn nested_chunks_read_back_as_written(
        trees in prop::collection::vec(arb_tree(), 0..4),
        compressed in any::<bool>(),
    ) {
        let top: Vec<Vec<u8>> = trees
            .iter()
            .map(|t| {
                let bytes = encode(t);
                if compressed {
                    // Top-level payloads are stored deflated behind the same id/size header.
                    chunk(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), &zlib(&bytes[8..]))
                } else {
                    bytes
                }
            })
            .collect();
        let mut ar = Archive::open(Cursor::new(file(&top))).unwrap();
        if compressed {
            ar.set_compression(Compression::Zlib);
        }
        let decoded = decode(&mut ar);
        prop_assert_eq!(decoded, trees);
        prop_assert_eq!(ar.depth(), 0);
    }
}

#[test]
fn wrong_file_tag_is_rejected() {
    let mut bytes = file(&[]);
    bytes[0] = b'X';
    match Archive::open(Cursor::new(bytes)) {
        Err(XpltError::NotXplt(_)) => {}
        other => panic!("Expected NotXplt, got {:?}", other),
    }
}

#[test]
fn closing_a_chunk_skips_unread_children() {
    let inner = branch(0x11, &[chunk(0x20, &u32s(&[1, 2, 3])), chunk(0x22, &u32s(&[4]))]);
    let top = branch(0x01, &[inner, chunk(0x30, &u32s(&[99]))]);
    let mut ar = Archive::open(Cursor::new(file(&[top]))).unwrap();

    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::Open);
    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::Open);
    assert_eq!(ar.chunk_id().unwrap(), 0x11);
    ar.close_chunk().unwrap();

    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::Open);
    assert_eq!(ar.chunk_id().unwrap(), 0x30);
    assert_eq!(ar.read_u32().unwrap(), 99);
    ar.close_chunk().unwrap();

    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::End);
    ar.close_chunk().unwrap();
    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::End, "Clean EOF ends the top level");
}

#[test]
fn end_marker_terminates_a_level() {
    let mut payload = chunk(0x20, &u32s(&[7]));
    payload.extend(u32s(&[CHUNK_END]));
    payload.extend(chunk(0x22, &u32s(&[8])));
    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x01, &payload)]))).unwrap();

    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::Open);
    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::Open);
    ar.close_chunk().unwrap();
    assert_eq!(ar.open_chunk().unwrap(), ChunkStatus::End);
}

#[test]
fn child_larger_than_parent_is_fatal() {
    let mut payload = u32s(&[0x20, 100]);
    payload.extend(u32s(&[1]));
    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x01, &payload)]))).unwrap();
    ar.open_chunk().unwrap();
    match ar.open_chunk() {
        Err(XpltError::ChunkOverrun { requested: 100, .. }) => {}
        other => panic!("Expected a chunk overrun, got {:?}", other),
    }
}

#[test]
fn reading_past_chunk_end_is_fatal() {
    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x02, &u32s(&[5]))]))).unwrap();
    ar.open_chunk().unwrap();
    assert_eq!(ar.read_u32().unwrap(), 5);
    assert!(matches!(ar.read_u32(), Err(XpltError::ChunkOverrun { .. })));
}

#[test]
fn truncated_stream_is_a_short_read() {
    let mut bytes = file(&[chunk(0x02, &u32s(&[5, 6]))]);
    bytes.truncate(bytes.len() - 2);
    let mut ar = Archive::open(Cursor::new(bytes)).unwrap();
    assert!(matches!(ar.open_chunk(), Err(XpltError::ShortRead(_))));
}

#[test]
fn close_without_open_is_a_nesting_violation() {
    let mut ar = Archive::open(Cursor::new(file(&[]))).unwrap();
    assert!(matches!(ar.close_chunk(), Err(XpltError::NestingViolation(_))));
}

#[test]
fn read_values_requires_exact_payload_size() {
    let top = chunk(0x02, &common::f32s(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    let mut ar = Archive::open(Cursor::new(file(&[top.clone()]))).unwrap();
    ar.open_chunk().unwrap();
    let values = ar.read_values(ValueType::Vec3, 2).unwrap();
    assert_eq!(values[1].components(), &[4.0, 5.0, 6.0]);

    let mut ar = Archive::open(Cursor::new(file(&[top]))).unwrap();
    ar.open_chunk().unwrap();
    match ar.read_values(ValueType::Mat3Sym, 2) {
        Err(XpltError::SizeMismatch { expected: 48, found: 24, .. }) => {}
        other => panic!("Expected a size mismatch, got {:?}", other),
    }
}

#[test]
fn strings_are_length_checked() {
    let payload = [common::string("abc"), common::fixed("name=1", 8)].concat();
    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x02, &payload)]))).unwrap();
    ar.open_chunk().unwrap();
    assert_eq!(ar.read_string(16).unwrap(), "abc");
    assert_eq!(ar.read_fixed_string(8).unwrap(), "name=1");

    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x02, &common::string("too long"))]))).unwrap();
    ar.open_chunk().unwrap();
    assert!(matches!(ar.read_string(4), Err(XpltError::InvalidFormat(_))));
}

#[test]
fn corrupt_zlib_payload_is_reported() {
    let mut ar = Archive::open(Cursor::new(file(&[chunk(0x02, &[1, 2, 3, 4, 5])]))).unwrap();
    ar.set_compression(Compression::Zlib);
    assert!(matches!(ar.open_chunk(), Err(XpltError::DecompressionError(_))));
}
