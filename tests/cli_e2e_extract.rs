//! End-to-end tests for the `classpkg extract` command.

mod common;
use common::prelude::*;

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// A gzip'd tar holding `package.xml` and one class definition.
fn package_archive(class: &ClassXml) -> Vec<u8> {
    gzip_tar(vec![
        (
            "package.xml".to_string(),
            common::manifest_xml("blog", &[class.identifier()]),
        ),
        (
            format!("ezcontentclass/class-{}.xml", class.identifier()),
            class.to_xml(),
        ),
    ])
}

fn gzip_tar(entries: Vec<(String, String)>) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content.as_bytes()).unwrap();
    }
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_extract_unpacks_and_normalizes() {
    let legacy = ClassXml::new("blog_post").attribute(AttributeXml::new("title", "ezstring").placement(7));
    let fixture = TestFixture::new()
        .with_binary_file("blog-1.0-1.ezpkg", &package_archive(&legacy))
        .with_file("notes.txt", "ignored");

    fixture
        .command()
        .arg("extract")
        .arg(format!("{}/*", fixture.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 class definition(s)"));

    fixture.child("blog/package.xml").assert(predicate::path::exists());
    let definition = fixture.child("blog/ezcontentclass/class-blog_post.xml");
    definition.assert(predicate::str::contains("<placement>1</placement>"));
    definition.assert(predicate::str::contains("<!-- title -->"));
}

#[test]
fn test_extract_without_match() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("extract")
        .arg(format!("{}/*.ezpkg", fixture.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No package archives match"));
}

#[test]
fn test_extract_invalid_glob() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("extract")
        .arg("[")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid glob pattern"));
}

#[test]
fn test_extract_reports_bad_archive_and_continues() {
    let broken = gzip_tar(vec![(
        "ezcontentclass/class-broken.xml".to_string(),
        "<content-class><identifier>".to_string(),
    )]);
    let fixture = TestFixture::new()
        .with_binary_file("aaa-1.0-1.ezpkg", &broken)
        .with_binary_file("blog-1.0-1.ezpkg", &package_archive(&ClassXml::new("blog_post")));

    fixture
        .command()
        .arg("extract")
        .arg(format!("{}/*.ezpkg", fixture.path().display()))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed extracting"))
        .stdout(predicate::str::contains("aaa-1.0-1.ezpkg"))
        .stdout(predicate::str::contains("1 class definition(s)"));

    fixture
        .child("blog/ezcontentclass/class-blog_post.xml")
        .assert(predicate::path::exists());
}
