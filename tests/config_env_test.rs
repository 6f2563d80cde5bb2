//! DEXLINK_* environment overrides.
//!
//! Kept in its own test binary with a single test: env vars are process-global.

use tempfile::TempDir;

use dexlink::application::ApplicationError;
use dexlink::config::Settings;
use dexlink::domain::{AnnotationPolicy, UnmatchedNodes};

#[test]
fn given_env_vars_when_load_then_override_local_config() {
    // Arrange
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("dexlink.toml"),
        "policy = \"lineage\"\n\n[output]\nindent = 8\n",
    )
    .unwrap();
    std::env::set_var("DEXLINK_POLICY", "evolves");
    std::env::set_var("DEXLINK_OUTPUT__INDENT", "2");
    std::env::set_var("DEXLINK_ANNOTATE__UNMATCHED_NODES", "prune");

    // Act
    let settings = Settings::load(Some(project.path())).unwrap();

    // Assert
    assert_eq!(settings.policy, AnnotationPolicy::Evolves);
    assert_eq!(settings.output.indent, 2);
    assert_eq!(settings.annotate.unmatched_nodes, UnmatchedNodes::Prune);

    // Arrange - unparseable value
    std::env::set_var("DEXLINK_OUTPUT__INDENT", "wide");

    // Act
    let err = Settings::load(Some(project.path())).unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("DEXLINK_OUTPUT__INDENT"), "{err}");

    for key in [
        "DEXLINK_POLICY",
        "DEXLINK_OUTPUT__INDENT",
        "DEXLINK_ANNOTATE__UNMATCHED_NODES",
    ] {
        std::env::remove_var(key);
    }
}
