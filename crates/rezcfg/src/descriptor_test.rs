// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

const XSTUDIO: &str = include_str!("../../../packages/xstudio/package.yaml");

#[rstest]
fn test_parse_minimal_descriptor() {
    let yaml = r#"
api: rezcfg/v0
name: hello
version: 1.0.0
uuid: repository.hello
"#;
    let descriptor = PackageDescriptor::from_yaml(yaml).expect("Should parse minimal descriptor");
    assert_eq!(descriptor.api, ApiVersion::V0);
    assert_eq!(descriptor.name, "hello");
    assert!(descriptor.requires.is_empty());
    assert!(descriptor.variants.is_empty());
    assert!(descriptor.release.is_none());
    assert!(descriptor.validate().is_ok());
}

#[rstest]
fn test_api_defaults_to_v0() {
    let descriptor =
        PackageDescriptor::from_yaml("name: hello\nversion: 1.0.0\nuuid: x\n").unwrap();
    assert_eq!(descriptor.api, ApiVersion::V0);
}

#[rstest]
fn test_parse_xstudio_descriptor() {
    let descriptor = PackageDescriptor::from_yaml(XSTUDIO).expect("Should parse xstudio");
    descriptor.validate().expect("xstudio descriptor should be valid");

    assert_eq!(descriptor.name, "xstudio");
    assert_eq!(descriptor.version, "0.1.0");
    assert_eq!(descriptor.authors, vec!["DNEG"]);
    assert_eq!(descriptor.description.as_deref(), Some("Media review tool"));
    assert_eq!(descriptor.uuid, "repository.xstudio");
    assert_eq!(descriptor.release_mode().unwrap(), Some(ReleaseMode::External));

    assert_eq!(descriptor.requires.len(), 14);
    assert_eq!(descriptor.requires[0], Requirement::new("openssl", Some("1.1.1")));
    assert_eq!(descriptor.requires[11], Requirement::new("qt", Some("5.15")));
    assert_eq!(descriptor.requires[13], Requirement::new("freetype", None));
    assert!(descriptor.private_build_requires.is_empty());

    assert_eq!(descriptor.variants.len(), 1);
    assert_eq!(descriptor.variants[0].os(), Some("centos-7"));

    assert_eq!(
        descriptor.pre_build_commands,
        vec!["source /opt/rh/devtoolset-9/enable"]
    );
    assert_eq!(descriptor.commands.len(), 1);
    assert_eq!(descriptor.commands[0].variable(), Some("REZ_XSTUDIO_ROOT"));
}

#[rstest]
fn test_requirement_order_is_preserved() {
    let descriptor = PackageDescriptor::from_yaml(XSTUDIO).unwrap();
    let names: Vec<_> = descriptor.requires.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"openssl"));
    assert_eq!(names.last(), Some(&"freetype"));
    assert_eq!(names[7], "actor_framework");
}

#[rstest]
fn test_parse_invalid_yaml() {
    let yaml = r#"
name: hello
requires: [
  unclosed bracket
"#;
    let result = PackageDescriptor::from_yaml(yaml);
    assert!(matches!(result, Err(Error::InvalidYaml { .. })));
}

#[rstest]
fn test_parse_unknown_api() {
    let result = PackageDescriptor::from_yaml("api: rezcfg/v9\nname: a\nversion: 1.0.0\n");
    assert!(matches!(result, Err(Error::InvalidYaml { .. })));
}

#[rstest]
fn test_parse_invalid_requirement_string() {
    let yaml = "name: a\nversion: 1.0.0\nrequires:\n  - 9lives-1.0\n";
    assert!(matches!(
        PackageDescriptor::from_yaml(yaml),
        Err(Error::InvalidYaml { .. })
    ));
}

fn valid() -> PackageDescriptor {
    PackageDescriptor::from_yaml(XSTUDIO).unwrap()
}

#[rstest]
fn test_duplicate_requirement_rejected() {
    let mut descriptor = valid();
    descriptor.requires.push(Requirement::new("qt", Some("6.5")));
    let err = descriptor.validate().unwrap_err();
    assert!(matches!(err, Error::DuplicateRequirement(name) if name == "qt"));
}

#[rstest]
fn test_duplicate_across_build_requires_rejected() {
    let mut descriptor = valid();
    descriptor
        .private_build_requires
        .push(Requirement::new("fmt", None));
    let err = descriptor.validate().unwrap_err();
    assert!(matches!(err, Error::DuplicateRequirement(name) if name == "fmt"));
}

#[rstest]
fn test_self_requirement_rejected() {
    let mut descriptor = valid();
    descriptor.requires.push(Requirement::new("xstudio", None));
    assert!(matches!(
        descriptor.validate(),
        Err(Error::ValidationFailed(_))
    ));
}

#[rstest]
#[case("")]
#[case("x studio")]
#[case("-xstudio")]
fn test_invalid_name_rejected(#[case] name: &str) {
    let mut descriptor = valid();
    descriptor.name = name.to_string();
    assert!(matches!(
        descriptor.validate(),
        Err(Error::ValidationFailed(_))
    ));
}

#[rstest]
#[case("")]
#[case("1.0")]
#[case("latest")]
fn test_invalid_version_rejected(#[case] version: &str) {
    let mut descriptor = valid();
    descriptor.version = version.to_string();
    assert!(matches!(
        descriptor.validate(),
        Err(Error::InvalidVersion { .. })
    ));
}

#[rstest]
fn test_missing_uuid_rejected() {
    let mut descriptor = valid();
    descriptor.uuid = String::new();
    assert!(matches!(
        descriptor.validate(),
        Err(Error::ValidationFailed(_))
    ));
}

#[rstest]
fn test_duplicate_variant_rejected() {
    let mut descriptor = valid();
    let variant = descriptor.variants[0].clone();
    descriptor.variants.push(variant);
    assert!(matches!(
        descriptor.validate(),
        Err(Error::ValidationFailed(_))
    ));
}

#[rstest]
fn test_ensure_buildable_requires_variant() {
    let mut descriptor = valid();
    assert!(descriptor.ensure_buildable().is_ok());
    descriptor.variants.clear();
    assert!(descriptor.validate().is_ok());
    assert!(matches!(
        descriptor.ensure_buildable(),
        Err(Error::NoVariants(_))
    ));
}

#[rstest]
fn test_unknown_release_mode_in_descriptor() {
    let mut descriptor = valid();
    descriptor.release = Some(ReleaseConfig {
        mode: "staging".to_string(),
    });
    assert!(descriptor.validate().is_ok());
    assert!(matches!(
        descriptor.release_mode(),
        Err(Error::UnknownReleaseMode { .. })
    ));
}

#[rstest]
fn test_load_sets_source_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join(crate::DESCRIPTOR_FILENAME);
    std::fs::write(&path, XSTUDIO).unwrap();

    let descriptor = PackageDescriptor::load(&path).unwrap();
    assert_eq!(descriptor.source_path.as_deref(), Some(path.as_path()));
}

#[rstest]
fn test_load_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let result = PackageDescriptor::load(tmp.path().join("missing.yaml"));
    assert!(matches!(result, Err(Error::ReadFailed { .. })));
}

#[rstest]
fn test_serialize_round_trip_keeps_fields() {
    let descriptor = valid();
    let yaml = serde_yaml::to_string(&descriptor).unwrap();
    let reparsed = PackageDescriptor::from_yaml(yaml).unwrap();
    assert_eq!(reparsed.requires, descriptor.requires);
    assert_eq!(reparsed.variants, descriptor.variants);
    assert_eq!(reparsed.commands, descriptor.commands);
    assert_eq!(reparsed.release, descriptor.release);
}

#[rstest]
fn test_default_descriptor() {
    let descriptor = PackageDescriptor::default();
    assert_eq!(descriptor.api, ApiVersion::V0);
    assert!(descriptor.name.is_empty());
    assert!(descriptor.requires.is_empty());
    assert!(descriptor.release.is_none());
    assert!(descriptor.source_path.is_none());
}
