//! Compile-time checks that core types can cross thread boundaries.

use kpm_core::cli::{ExitCode, OutputFormat};
use kpm_core::{
    ArtifactCoordinate, ArtifactId, Error, Language, PluginIdentifier, RunContext, Settings,
    VersionSpec,
};

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_domain_types_are_send_sync() {
    assert_send_sync::<ArtifactId>();
    assert_send_sync::<ArtifactCoordinate>();
    assert_send_sync::<VersionSpec>();
    assert_send_sync::<Language>();
    assert_send_sync::<PluginIdentifier>();
}

#[test]
fn test_runtime_types_are_send_sync() {
    assert_send_sync::<RunContext>();
    assert_send_sync::<Settings>();
    assert_send_sync::<OutputFormat>();
    assert_send_sync::<ExitCode>();
    assert_send_sync::<Error>();
}
