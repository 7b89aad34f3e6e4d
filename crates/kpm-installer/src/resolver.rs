//! Plugin key and version resolution.

use crate::error::{InstallError, Result};
use crate::transport::ArtifactTransport;
use kpm_core::{ArtifactCoordinate, ArtifactId, Language, VersionSpec};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Default packaging for explicit coordinates that do not name one.
pub const DEFAULT_PACKAGING: &str = "jar";

const JAVA_GROUP: &str = "org.kill-bill.billing.plugin.java";
const RUBY_GROUP: &str = "org.kill-bill.billing.plugin.ruby";

/// Built-in mapping from a plugin key to its artifact identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownPlugin {
    /// User-facing plugin key
    pub key: &'static str,
    /// Group identifier
    pub group_id: &'static str,
    /// Artifact identifier
    pub artifact_id: &'static str,
    /// Packaging
    pub packaging: &'static str,
    /// Implementation language
    pub language: Language,
}

const fn java(key: &'static str, artifact_id: &'static str) -> KnownPlugin {
    KnownPlugin {
        key,
        group_id: JAVA_GROUP,
        artifact_id,
        packaging: "jar",
        language: Language::Java,
    }
}

/// Plugin keys resolvable without explicit coordinates.
pub const KNOWN_PLUGINS: &[KnownPlugin] = &[
    java("analytics", "analytics-plugin"),
    java("adyen", "adyen-plugin"),
    java("avatax", "avatax-plugin"),
    java("email-notifications", "email-notifications-plugin"),
    java("payment-test", "payment-test-plugin"),
    java("stripe", "stripe-plugin"),
    KnownPlugin {
        key: "braintree_blue",
        group_id: RUBY_GROUP,
        artifact_id: "braintree_blue-plugin",
        packaging: "tar.gz",
        language: Language::Ruby,
    },
];

/// Looks up a built-in plugin key.
///
/// # Examples
///
/// ```
/// use kpm_installer::known_plugin;
///
/// assert_eq!(known_plugin("analytics").unwrap().artifact_id, "analytics-plugin");
/// assert!(known_plugin("unknown").is_none());
/// ```
#[must_use]
pub fn known_plugin(key: &str) -> Option<&'static KnownPlugin> {
    KNOWN_PLUGINS.iter().find(|plugin| plugin.key == key)
}

/// What the caller asked to install.
///
/// Explicit fields override the built-in table entry for `key` field by
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRequest {
    /// Plugin key recorded in the registry
    pub key: String,
    /// Explicit group identifier
    pub group_id: Option<String>,
    /// Explicit artifact identifier
    pub artifact_id: Option<String>,
    /// Explicit packaging
    pub packaging: Option<String>,
    /// Explicit classifier
    pub classifier: Option<String>,
    /// Requested version
    pub version: VersionSpec,
}

impl PluginRequest {
    /// Creates a request that relies on the built-in table.
    #[must_use]
    pub fn new(key: impl Into<String>, version: VersionSpec) -> Self {
        Self {
            key: key.into(),
            version,
            ..Self::default()
        }
    }

    /// Sets explicit group and artifact identifiers.
    #[must_use]
    pub fn with_coordinates(
        mut self,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        self.group_id = Some(group_id.into());
        self.artifact_id = Some(artifact_id.into());
        self
    }

    /// Sets an explicit packaging.
    #[must_use]
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = Some(packaging.into());
        self
    }

    /// Sets a classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }
}

/// A request pinned to a concrete coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlugin {
    /// Plugin key recorded in the registry
    pub key: String,
    /// Concrete coordinate
    pub coordinate: ArtifactCoordinate,
    /// Implementation language
    pub language: Language,
}

/// Turns [`PluginRequest`]s into concrete coordinates.
///
/// Version listings are cached per artifact identity for the lifetime of the
/// resolver, which the installer keeps for one command invocation.
#[derive(Debug, Default)]
pub struct CoordinateResolver {
    listings: HashMap<ArtifactId, Vec<String>>,
}

impl CoordinateResolver {
    /// Creates a resolver with an empty listing cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the versionless identity and language of a request.
    ///
    /// Makes no transport calls.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Resolution`] for an unknown key without
    /// explicit group and artifact, and [`InstallError::InvalidArgument`] for
    /// an empty key or empty explicit field.
    pub fn resolve_id(request: &PluginRequest) -> Result<(ArtifactId, Language)> {
        let key = request.key.trim();
        if key.is_empty() {
            return Err(InstallError::InvalidArgument(
                "plugin key cannot be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("group", &request.group_id),
            ("artifact", &request.artifact_id),
            ("packaging", &request.packaging),
            ("classifier", &request.classifier),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(InstallError::InvalidArgument(format!(
                    "{field} cannot be empty"
                )));
            }
        }

        let known = known_plugin(key);
        let group_id = request
            .group_id
            .as_deref()
            .or_else(|| known.map(|plugin| plugin.group_id));
        let artifact_id = request
            .artifact_id
            .as_deref()
            .or_else(|| known.map(|plugin| plugin.artifact_id));

        let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
            return Err(InstallError::Resolution {
                key: key.to_string(),
                reason: "unknown plugin key; pass both group and artifact to install it"
                    .to_string(),
            });
        };

        let packaging = request
            .packaging
            .as_deref()
            .or_else(|| known.map(|plugin| plugin.packaging))
            .unwrap_or(DEFAULT_PACKAGING);

        let language = match (known, &request.packaging) {
            (Some(plugin), None) => plugin.language,
            _ => Language::from_packaging(packaging),
        };

        let mut id = ArtifactId::new(group_id, artifact_id, packaging);
        id.classifier.clone_from(&request.classifier);
        Ok((id, language))
    }

    /// Resolves a request to a concrete coordinate.
    ///
    /// "latest" picks the last entry of the repository's listing.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Resolution`] if the identity cannot be
    /// resolved or no versions are published, and [`InstallError::Fetch`] if
    /// the listing fails.
    pub fn resolve<T>(&mut self, transport: &T, request: &PluginRequest) -> Result<ResolvedPlugin>
    where
        T: ArtifactTransport + ?Sized,
    {
        let (id, language) = Self::resolve_id(request)?;

        let version = match &request.version {
            VersionSpec::Exact(version) => version.clone(),
            VersionSpec::Latest => self
                .list_versions(transport, &id)?
                .last()
                .cloned()
                .ok_or_else(|| InstallError::Resolution {
                    key: id.to_string(),
                    reason: "repository lists no versions".to_string(),
                })?,
        };

        let coordinate = ArtifactCoordinate::new(id, version);
        tracing::debug!("Resolved '{}' to {}", request.key, coordinate);

        Ok(ResolvedPlugin {
            key: request.key.trim().to_string(),
            coordinate,
            language,
        })
    }

    /// Published versions of `id`, oldest first, fetched at most once.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Fetch`] if the listing fails. Failures are not
    /// cached.
    pub fn list_versions<T>(&mut self, transport: &T, id: &ArtifactId) -> Result<&[String]>
    where
        T: ArtifactTransport + ?Sized,
    {
        let versions = match self.listings.entry(id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let versions =
                    transport
                        .list_versions(id)
                        .map_err(|source| InstallError::Fetch {
                            coordinate: id.to_string(),
                            source,
                        })?;
                entry.insert(versions)
            }
        };

        Ok(versions)
    }
}
