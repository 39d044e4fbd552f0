// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::Error;

fn create_descriptor(dir: &Path, name: &str) {
    let path = dir.join(DESCRIPTOR_FILENAME);
    let content = format!("api: rezcfg/v0\nname: {name}\nversion: 1.0.0\nuuid: repository.{name}\n");
    std::fs::write(path, content).expect("Failed to write descriptor");
}

#[rstest]
fn test_find_in_start_directory() {
    let tmp = TempDir::new().unwrap();
    create_descriptor(tmp.path(), "hello");

    let descriptor = discover_descriptor(tmp.path()).expect("Should discover descriptor");
    assert_eq!(descriptor.name, "hello");
}

#[rstest]
fn test_walks_up_to_parent() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("src").join("plugin");
    std::fs::create_dir_all(&nested).unwrap();
    create_descriptor(tmp.path(), "parent");

    let descriptor = discover_descriptor(&nested).expect("Should find parent descriptor");
    assert_eq!(descriptor.name, "parent");
}

#[rstest]
fn test_nearest_descriptor_wins() {
    let tmp = TempDir::new().unwrap();
    let child = tmp.path().join("child");
    std::fs::create_dir(&child).unwrap();
    create_descriptor(tmp.path(), "parent");
    create_descriptor(&child, "child");

    let descriptor = discover_descriptor(&child).unwrap();
    assert_eq!(descriptor.name, "child");
}

#[rstest]
fn test_explicit_file_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("other.yaml");
    std::fs::write(&path, "name: other\nversion: 2.0.0\nuuid: x\n").unwrap();

    let found = find_descriptor(&path).unwrap();
    assert_eq!(found, dunce::canonicalize(&path).unwrap());
    assert_eq!(discover_descriptor(&path).unwrap().name, "other");
}

#[rstest]
fn test_missing_path() {
    let tmp = TempDir::new().unwrap();
    let result = find_descriptor(tmp.path().join("does-not-exist"));
    assert!(matches!(result, Err(Error::NotFoundAtPath(_))));
}

#[rstest]
fn test_source_path_is_recorded() {
    let tmp = TempDir::new().unwrap();
    create_descriptor(tmp.path(), "hello");

    let descriptor = discover_descriptor(tmp.path()).unwrap();
    let source = descriptor.source_path.expect("source_path should be set");
    assert!(source.ends_with(DESCRIPTOR_FILENAME));
}
