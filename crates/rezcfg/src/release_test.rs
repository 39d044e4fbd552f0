// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;
use std::collections::HashMap;

use rstest::rstest;

use super::*;

/// Records how many lookups were made against it.
#[derive(Default)]
struct CountingEnv {
    inner: HashMap<String, String>,
    lookups: Cell<usize>,
}

impl EnvSource for CountingEnv {
    fn var(&self, name: &str) -> Option<&str> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.var(name)
    }
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[rstest]
#[case(ReleaseMode::Internal, "/repo/int")]
#[case(ReleaseMode::External, "/repo/ext")]
fn test_resolve_returns_variable_value(#[case] mode: ReleaseMode, #[case] expected: &str) {
    let vars = env(&[(RELEASE_INT_VAR, "/repo/int"), (RELEASE_EXT_VAR, "/repo/ext")]);
    let path = resolve_release_path(mode, &vars).expect("Should resolve");
    assert_eq!(path, expected);
}

#[rstest]
#[case(ReleaseMode::Internal, RELEASE_EXT_VAR, RELEASE_INT_VAR)]
#[case(ReleaseMode::External, RELEASE_INT_VAR, RELEASE_EXT_VAR)]
fn test_missing_variable_is_not_defaulted(
    #[case] mode: ReleaseMode,
    #[case] present: &str,
    #[case] missing: &str,
) {
    let vars = env(&[(present, "/repo/other")]);
    let err = resolve_release_path(mode, &vars).expect_err("Should fail");
    match err {
        Error::MissingEnvironmentVariable(name) => assert_eq!(name, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn test_external_scenario() {
    let vars = env(&[
        ("SSE_REZ_REPO_RELEASE_INT", "/repo/int"),
        ("SSE_REZ_REPO_RELEASE_EXT", "/repo/ext"),
    ]);
    assert_eq!(
        resolve_release_path(ReleaseMode::External, &vars).unwrap(),
        "/repo/ext"
    );

    let vars = env(&[("SSE_REZ_REPO_RELEASE_INT", "/repo/int")]);
    let err = resolve_release_path(ReleaseMode::External, &vars).unwrap_err();
    assert!(
        matches!(err, Error::MissingEnvironmentVariable(ref name) if name == "SSE_REZ_REPO_RELEASE_EXT")
    );
}

#[rstest]
fn test_empty_value_is_returned_as_set() {
    let vars = env(&[(RELEASE_INT_VAR, "")]);
    let path = resolve_release_path(ReleaseMode::Internal, &vars).unwrap();
    assert_eq!(path, "");
}

#[rstest]
#[case("int", ReleaseMode::Internal)]
#[case("internal", ReleaseMode::Internal)]
#[case("ext", ReleaseMode::External)]
#[case("external", ReleaseMode::External)]
fn test_parse_release_mode(#[case] tag: &str, #[case] expected: ReleaseMode) {
    assert_eq!(tag.parse::<ReleaseMode>().unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("INT")]
#[case(" ext")]
#[case("staging")]
fn test_unknown_mode_performs_no_lookups(#[case] tag: &str) {
    let vars = CountingEnv {
        inner: env(&[(RELEASE_INT_VAR, "/repo/int"), (RELEASE_EXT_VAR, "/repo/ext")]),
        ..Default::default()
    };
    let err = resolve_release_path_str(tag, &vars).expect_err("Should reject unknown mode");
    match err {
        Error::UnknownReleaseMode { mode, expected } => {
            assert_eq!(mode, tag);
            assert_eq!(expected, vec!["int", "ext"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(vars.lookups.get(), 0);
}

#[rstest]
fn test_known_mode_performs_one_lookup() {
    let vars = CountingEnv {
        inner: env(&[(RELEASE_EXT_VAR, "/repo/ext")]),
        ..Default::default()
    };
    resolve_release_path_str("ext", &vars).unwrap();
    assert_eq!(vars.lookups.get(), 1);
}

#[rstest]
fn test_every_mode_maps_to_a_distinct_variable() {
    let mut variables: Vec<_> = ReleaseMode::ALL.iter().map(|m| m.variable()).collect();
    variables.sort_unstable();
    variables.dedup();
    assert_eq!(variables.len(), ReleaseMode::ALL.len());
}

#[rstest]
fn test_release_target_records_variable() {
    let vars: EnvSnapshot = [(RELEASE_INT_VAR, "/repo/int")].into_iter().collect();
    let target = ReleaseTarget::resolve(ReleaseMode::Internal, &vars).unwrap();
    assert_eq!(target.mode, ReleaseMode::Internal);
    assert_eq!(target.variable, RELEASE_INT_VAR);
    assert_eq!(target.path, "/repo/int");
}

#[rstest]
fn test_release_mode_serializes_as_tag() {
    let yaml = serde_yaml::to_string(&ReleaseMode::External).unwrap();
    assert_eq!(yaml.trim(), "ext");
    let mode: ReleaseMode = serde_yaml::from_str("internal").unwrap();
    assert_eq!(mode, ReleaseMode::Internal);
}

#[rstest]
fn test_concurrent_resolutions_are_independent() {
    let vars = env(&[(RELEASE_INT_VAR, "/repo/int"), (RELEASE_EXT_VAR, "/repo/ext")]);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let vars = &vars;
                s.spawn(move || {
                    let mode = ReleaseMode::ALL[i % 2];
                    (mode, resolve_release_path(mode, vars).unwrap())
                })
            })
            .collect();
        for handle in handles {
            let (mode, path) = handle.join().unwrap();
            assert_eq!(path, format!("/repo/{}", mode.tag()));
        }
    });
}
