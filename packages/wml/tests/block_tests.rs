use docpack::{Package, PackageConfig, PartId, PartState};
use docpack_wml::{create_empty_document, w, Paragraph, WordDocument};

fn tree_paragraphs(package: &mut Package, main: PartId) -> Vec<String> {
    let tree = package.get_tree(main).unwrap();
    tree.descendants(w::P).map(|p| p.value()).collect()
}

fn typed_paragraphs(package: &mut Package, main: PartId) -> Vec<String> {
    package.get_typed_model::<WordDocument>(main).unwrap().body.texts()
}

#[test]
fn test_must_begin_block_to_use_tree() {
    let (mut package, main) = create_empty_document(PackageConfig::default()).unwrap();

    package
        .get_typed_model::<WordDocument>(main)
        .unwrap()
        .body
        .push_paragraph("First");

    package.enter_tree_session().unwrap();
    assert_eq!(tree_paragraphs(&mut package, main), vec!["First"]);

    package
        .get_typed_model::<WordDocument>(main)
        .unwrap()
        .body
        .push_paragraph("Second");
    package.save().unwrap();

    // no new block: the cached tree still predates the save
    assert_eq!(tree_paragraphs(&mut package, main), vec!["First"]);

    package.enter_tree_session().unwrap();
    assert_eq!(tree_paragraphs(&mut package, main), vec!["First", "Second"]);
}

#[test]
fn test_must_end_block_to_use_typed_model() {
    let (mut package, main) = create_empty_document(PackageConfig::default()).unwrap();

    package
        .get_typed_model::<WordDocument>(main)
        .unwrap()
        .body
        .push_paragraph("Added through SDK");

    package.enter_tree_session().unwrap();
    {
        let mut tree = package.get_tree(main).unwrap();
        let body = tree.find_mut(w::BODY).unwrap();
        body.add_child(Paragraph::element("Added through PowerTools"));
    }
    package.put_tree(main).unwrap();

    // the live typed model has not seen the write-back yet
    assert_eq!(typed_paragraphs(&mut package, main), vec!["Added through SDK"]);
    assert!(package.part_status(main).unwrap().typed_stale);

    package.exit_tree_session(None).unwrap();
    assert_eq!(
        typed_paragraphs(&mut package, main),
        vec!["Added through SDK", "Added through PowerTools"]
    );
}

#[test]
fn test_tree_edit_without_put_never_reaches_typed_model() -> anyhow::Result<()> {
    let (mut package, main) = create_empty_document(PackageConfig::default())?;
    package.get_typed_model::<WordDocument>(main)?.body.push_paragraph("Kept");

    package.enter_tree_session()?;
    package
        .get_tree(main)?
        .find_mut(w::BODY)
        .unwrap()
        .add_child(Paragraph::element("Never put"));
    assert_eq!(package.part_state(main)?, PartState::TreeDirty);

    package.exit_tree_session(None)?;
    assert_eq!(typed_paragraphs(&mut package, main), vec!["Kept"]);

    // the cached tree still holds the edit until the next block begins
    assert_eq!(tree_paragraphs(&mut package, main), vec!["Kept", "Never put"]);
    package.enter_tree_session()?;
    assert_eq!(tree_paragraphs(&mut package, main), vec!["Kept"]);
    Ok(())
}

#[test]
fn test_empty_document_part() {
    let (package, main) = create_empty_document(PackageConfig::default()).unwrap();
    let part = package.part(main).unwrap();

    assert_eq!(part.name(), docpack_wml::MAIN_DOCUMENT_PART);
    assert_eq!(package.part_by_name("/word/document.xml").unwrap(), main);

    let doc = docpack_markup::parse(part.store().bytes()).unwrap();
    assert!(doc.declaration.is_some());
    assert_eq!(doc.root.name, w::DOCUMENT);
    assert!(!doc.root.element(w::BODY).unwrap().has_elements());
}
