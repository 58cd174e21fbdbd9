//! End-to-end tests for the commands that work on single classes and
//! definitions: `update-modified`, `force-remove-class`, `change-object`
//! and `export`.

mod common;
use common::prelude::*;

use classpkg::definition::ClassDocument;
use classpkg::store::{ClassStore, ContentObject, FileStore, ObjectAttribute};

/// Installs `article` (title, body) and `news` (title, lead) and one
/// article object. Returns the fixture and the object id.
fn seeded() -> (TestFixture, u64) {
    let fixture = TestFixture::new().with_package(
        "site",
        &[
            ClassXml::new("article")
                .name("Article")
                .attribute(AttributeXml::new("title", "ezstring").placement(1))
                .attribute(AttributeXml::new("body", "ezxmltext").placement(2)),
            ClassXml::new("news")
                .attribute(AttributeXml::new("title", "ezstring").placement(1))
                .attribute(AttributeXml::new("lead", "eztext").placement(2)),
        ],
    );
    fixture
        .command()
        .arg("install")
        .arg(fixture.package_pattern())
        .assert()
        .success();

    let mut file = FileStore::open(fixture.store_path()).unwrap();
    let store = file.store_mut();
    let article = store.class_by_identifier("article").unwrap().unwrap();
    let object = store
        .create_object(ContentObject {
            class_id: article.id,
            name: "Launch".to_string(),
            language: "eng-GB".to_string(),
            ..Default::default()
        })
        .unwrap();
    for attribute in store.attributes(article.id).unwrap() {
        store
            .create_object_attribute(ObjectAttribute {
                object_id: object,
                class_attribute_id: attribute.id,
                language: "eng-GB".to_string(),
                data: format!("{} data", attribute.identifier),
                ..Default::default()
            })
            .unwrap();
    }
    file.save().unwrap();
    (fixture, object)
}

#[test]
fn test_update_modified_stamps_and_normalizes() {
    let fixture = TestFixture::new().with_package(
        "site",
        &[ClassXml::new("article")
            .attribute(AttributeXml::new("title", "ezstring").placement(5))
            .attribute(AttributeXml::new("body", "ezxmltext").placement(9))],
    );
    let path = fixture.class_path("site", "article");

    fixture
        .command()
        .arg("update-modified")
        .arg("--timestamp")
        .arg("1500000000")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let doc = ClassDocument::open(&path).unwrap();
    let def = doc.definition("eng-GB").unwrap();
    assert_eq!(def.modified, "1500000000");
    let placements: Vec<u32> = def.attributes.iter().map(|a| a.placement).collect();
    assert_eq!(placements, vec![1, 2]);
    assert!(doc.to_xml_string().unwrap().contains("<!-- body -->"));
}

#[test]
fn test_update_modified_without_remote_block() {
    let fixture = TestFixture::new().with_file(
        "class-bare.xml",
        "<content-class><identifier>bare</identifier></content-class>",
    );

    fixture
        .command()
        .arg("update-modified")
        .arg("class-bare.xml")
        .assert()
        .success()
        .stdout(predicate::str::contains("no modified stamp"));

    let doc = ClassDocument::open(fixture.path().join("class-bare.xml")).unwrap();
    assert_eq!(doc.identifier().unwrap(), "bare");
}

#[test]
fn test_update_modified_missing_file() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("update-modified")
        .arg("class-missing.xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Class definition not found"));
}

#[test]
fn test_force_remove_dry_run_changes_nothing() {
    let (fixture, _) = seeded();
    let before = std::fs::read_to_string(fixture.store_path()).unwrap();

    fixture
        .command()
        .arg("force-remove-class")
        .arg("--dry-run")
        .arg("article")
        .assert()
        .success()
        .stdout(predicate::str::contains("Class article: exists"))
        .stdout(predicate::str::contains("Content objects: 1"))
        .stdout(predicate::str::contains("Dry run, nothing removed."));

    let after = std::fs::read_to_string(fixture.store_path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_force_remove_deletes_class_and_objects() {
    let (fixture, _) = seeded();

    fixture
        .command()
        .arg("force-remove-class")
        .arg("article")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed class article and 1 object(s)"));

    let file = FileStore::open(fixture.store_path()).unwrap();
    assert!(file.store().class_by_identifier("article").unwrap().is_none());
    assert_eq!(file.store().object_count(), 0);
}

#[test]
fn test_force_remove_unknown_class_suggests() {
    let (fixture, _) = seeded();

    fixture
        .command()
        .arg("force-remove-class")
        .arg("artcle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Class not found: artcle"))
        .stderr(predicate::str::contains("Did you mean 'article'?"));
}

#[test]
fn test_change_object_moves_matching_attributes() {
    let (fixture, object) = seeded();

    fixture
        .command()
        .arg("change-object")
        .arg(object.to_string())
        .arg("--identifier")
        .arg("news")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 attribute(s) kept, 1 created, 1 removed",
        ));

    let file = FileStore::open(fixture.store_path()).unwrap();
    let store = file.store();
    let news = store.class_by_identifier("news").unwrap().unwrap();
    assert_eq!(store.object(object).unwrap().unwrap().class_id, news.id);
    let data: Vec<String> = store
        .object_attributes_of_object(object)
        .unwrap()
        .into_iter()
        .map(|a| a.data)
        .collect();
    assert!(data.contains(&"title data".to_string()));
    assert!(!data.contains(&"body data".to_string()));
}

#[test]
fn test_change_object_unknown_object() {
    let (fixture, _) = seeded();

    fixture
        .command()
        .arg("change-object")
        .arg("9999")
        .arg("--identifier")
        .arg("news")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Content object not found: 9999"));
}

#[test]
fn test_export_writes_definition() {
    let (fixture, _) = seeded();
    let out = fixture.path().join("exported");

    fixture
        .command()
        .arg("export")
        .arg("article")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("class-article.xml"));

    let doc = ClassDocument::open(out.join("class-article.xml")).unwrap();
    let def = doc.definition("eng-GB").unwrap();
    assert_eq!(def.identifier, "article");
    assert_eq!(def.display_name(), "Article");
    assert_eq!(def.attributes.len(), 2);
}

#[test]
fn test_export_unknown_class() {
    let (fixture, _) = seeded();

    fixture
        .command()
        .arg("export")
        .arg("newz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'news'?"));
}
