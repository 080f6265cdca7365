//! Lifecycle operations against an isolated state root

#![cfg(unix)]

use ah_core::{EngineConfig, Error, InstallOutcome, PackageManager};
use ah_test_utils::TestState;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn manager(state: &TestState) -> PackageManager {
    PackageManager::new(EngineConfig::new(state.root()).with_offline(true))
}

#[rstest]
#[case::missing_descriptor(None, Some("alias x='true'\n"))]
#[case::missing_alias_file(Some("name: broken\nversion: 1.0.0\n"), None)]
#[case::unparsable_descriptor(Some("name: [\n"), Some("alias x='true'\n"))]
fn broken_packages_are_rejected_without_mutation(
    #[case] descriptor: Option<&str>,
    #[case] aliases: Option<&str>,
) {
    let state = TestState::new();
    state.add_raw_package("broken", descriptor, aliases);
    let manager = manager(&state);

    assert!(matches!(
        manager.install("broken"),
        Err(Error::InvalidPackage { .. })
    ));
    assert!(matches!(
        manager.enable("broken"),
        Err(Error::InvalidPackage { .. })
    ));
    assert!(state.active_names().is_empty());
    assert!(!state.layout().timestamp_file().exists());
}

#[test]
fn unknown_package_is_not_found() {
    let state = TestState::new();
    let manager = manager(&state);
    assert!(matches!(
        manager.install("ghost"),
        Err(Error::PackageNotFound { .. })
    ));
    assert!(matches!(
        manager.enable("ghost"),
        Err(Error::PackageNotFound { .. })
    ));
}

#[test]
fn enable_twice_leaves_one_entry_and_same_aliases() {
    let state = TestState::new();
    state.add_package("git", &[("gs", "git status"), ("gd", "git diff")]);
    let manager = manager(&state);

    manager.enable("git").unwrap();
    let first = state.compiled();
    manager.enable("git").unwrap();

    assert_eq!(state.active_names(), vec!["git"]);
    let alias_lines = |s: &str| {
        let mut lines: Vec<String> = s
            .lines()
            .filter(|l| l.starts_with("alias "))
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    };
    assert_eq!(alias_lines(&first), alias_lines(&state.compiled()));
}

#[test]
fn disable_then_enable_restores_link_target() {
    let state = TestState::new();
    state.add_package("git", &[("gs", "git status")]);
    let manager = manager(&state);

    manager.enable("git").unwrap();
    let before = manager.active().target("git").unwrap();
    manager.disable("git").unwrap();
    assert_eq!(manager.active().target("git").unwrap(), None);
    manager.enable("git").unwrap();

    assert_eq!(manager.active().target("git").unwrap(), before);
}

#[test]
fn remove_of_inactive_package_is_a_noop_that_recompiles() {
    let state = TestState::new();
    state.add_package("git", &[("gs", "git status")]);
    let manager = manager(&state);

    assert!(!manager.remove("git").unwrap());
    assert!(state.layout().alias_file().is_file());
    assert!(state.layout().registry_entry("git").is_dir());
}

#[test]
fn remove_keeps_registry_copy() {
    let state = TestState::new();
    state.add_package("git", &[("gs", "git status")]);
    let manager = manager(&state);

    manager.enable("git").unwrap();
    assert!(manager.remove("git").unwrap());

    assert!(state.active_names().is_empty());
    assert!(state.layout().registry_entry("git").join("alias.sh").is_file());
    assert!(!state.compiled().contains("alias gs="));
}

#[test]
fn list_on_empty_state_is_empty() {
    let state = TestState::empty();
    let manager = manager(&state);
    assert!(manager.list(false).unwrap().is_empty());
    assert!(manager.list(true).unwrap().is_empty());
    assert!(!state.layout().active_dir().exists());
}

#[test]
fn install_reports_conflicts_and_enable_performs_mutation() {
    // active = {pkgA: ll -> ls -la}; candidate pkgB: ll -> ls -lah
    let state = TestState::new();
    state.add_package("pkgA", &[("ll", "ls -la")]);
    state.add_package("pkgB", &[("ll", "ls -lah"), ("la", "ls -A")]);
    let manager = manager(&state);
    manager.enable("pkgA").unwrap();

    match manager.install("pkgB").unwrap() {
        InstallOutcome::Conflicts { preview, conflicts } => {
            assert_eq!(preview.metadata.name, "pkgB");
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].alias, "ll");
            assert_eq!(conflicts[0].existing.package, "pkgA");
        }
        other => panic!("expected conflicts, got {other:?}"),
    }
    assert_eq!(state.active_names(), vec!["pkgA"]);

    manager.enable("pkgB").unwrap();
    assert_eq!(state.active_names(), vec!["pkgA", "pkgB"]);
    let compiled = state.compiled();
    assert!(compiled.find("'ls -la'").unwrap() < compiled.find("'ls -lah'").unwrap());
}

#[test]
fn invalid_names_never_touch_the_filesystem() {
    let state = TestState::new();
    let manager = manager(&state);
    for name in ["../escape", ".hidden", ""] {
        assert!(matches!(manager.enable(name), Err(Error::InvalidName { .. })));
        assert!(matches!(manager.disable(name), Err(Error::InvalidName { .. })));
    }
}
