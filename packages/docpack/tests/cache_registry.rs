use docpack::docpack_markup::{Document, Element, Serializer};
use docpack::{BackingStore, Package, PartCacheRegistry, PartId};

fn ids(count: usize) -> Vec<PartId> {
    let mut package = Package::new();
    (0..count)
        .map(|i| package.add_part(format!("/{i}.xml"), "application/xml", Vec::new()).unwrap())
        .collect()
}

#[test]
fn test_registry_entries_are_per_part() {
    let ids = ids(2);
    let mut registry = PartCacheRegistry::new();
    let first = BackingStore::new(b"<a>first</a>".to_vec());
    let second = BackingStore::new(b"<b>second</b>".to_vec());

    registry.get_or_create_tree(ids[0], &first).unwrap();
    registry.get_or_create_tree(ids[1], &second).unwrap();
    assert_eq!(registry.len(), 2);

    assert!(registry.invalidate(ids[0]).is_some());
    assert!(!registry.is_cached(ids[0]));
    assert_eq!(registry.get(ids[1]).unwrap().tree().root.value(), "second");
}

#[test]
fn test_cached_tree_ignores_other_stores() {
    let ids = ids(1);
    let mut registry = PartCacheRegistry::new();
    let original = BackingStore::new(b"<a>original</a>".to_vec());
    let replacement = BackingStore::new(b"<a>replacement</a>".to_vec());

    registry.get_or_create_tree(ids[0], &original).unwrap();
    let entry = registry.get_or_create_tree(ids[0], &replacement).unwrap();

    assert_eq!(entry.tree().root.value(), "original");
    assert_eq!(entry.checksum(), original.checksum());
}

#[test]
fn test_write_back_records_new_generation() {
    let ids = ids(1);
    let mut registry = PartCacheRegistry::new();
    let mut store = BackingStore::new(b"<a/>".to_vec());
    let tree = Document::new(Element::new("a").with_child(Element::new("b")));

    registry
        .write_back(ids[0], tree.clone(), &mut store, &Serializer::new())
        .unwrap();

    assert_eq!(store.bytes(), b"<a><b/></a>");
    assert_eq!(store.generation(), 1);

    let entry = registry.get(ids[0]).unwrap();
    assert_eq!(entry.tree(), &tree);
    assert_eq!(entry.generation(), 1);
    assert_eq!(entry.checksum(), store.checksum());
    assert!(!entry.is_dirty());
    assert!(!registry.is_stale(ids[0], &store));
}

#[test]
fn test_invalidate_all_empties_registry() {
    let ids = ids(3);
    let mut registry = PartCacheRegistry::new();
    let store = BackingStore::new(b"<a/>".to_vec());
    for &id in &ids {
        registry.get_or_create_tree(id, &store).unwrap();
    }

    assert!(registry.invalidate_all(ids.iter().copied()).is_empty());
    assert!(registry.is_empty());
}

#[test]
fn test_malformed_bytes_report_position() {
    let ids = ids(1);
    let mut registry = PartCacheRegistry::new();
    let store = BackingStore::new(b"<a></b>".to_vec());

    let err = registry.get_or_create_tree(ids[0], &store).unwrap_err();
    assert_eq!(err.pos(), 3);
}
