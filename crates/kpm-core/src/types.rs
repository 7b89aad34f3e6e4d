//! Strong domain types for plugin artifacts.
//!
//! Artifacts are addressed with Maven-style coordinates. An [`ArtifactId`]
//! names a fetchable binary independently of its version; an
//! [`ArtifactCoordinate`] pins it to one concrete version. The "latest"
//! sentinel only ever lives in [`VersionSpec`], so an unresolved version can
//! never reach a persisted coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version token that requests the newest published version.
///
/// Matched case-insensitively.
pub const LATEST: &str = "latest";

/// Artifact identity without a version.
///
/// # Examples
///
/// ```
/// use kpm_core::ArtifactId;
///
/// let id = ArtifactId::new("org.example", "foo-plugin", "jar").with_classifier("jdk17");
/// assert_eq!(id.to_string(), "org.example:foo-plugin:jar:jdk17");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    /// Group identifier (e.g. `org.kill-bill.billing.plugin.java`)
    pub group_id: String,
    /// Artifact identifier (e.g. `analytics-plugin`)
    pub artifact_id: String,
    /// Packaging, which doubles as the file extension (e.g. `jar`, `tar.gz`)
    pub packaging: String,
    /// Optional classifier appended to the file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactId {
    /// Creates an artifact identity without a classifier.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            packaging: packaging.into(),
            classifier: None,
        }
    }

    /// Sets the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// Fully-qualified artifact coordinate with a concrete version.
///
/// The string form (`group:artifact:packaging[:classifier]:version`) is the
/// key used by the checksum store.
///
/// # Examples
///
/// ```
/// use kpm_core::{ArtifactCoordinate, ArtifactId};
///
/// let id = ArtifactId::new("org.example", "foo-plugin", "jar").with_classifier("jdk17");
/// let coordinate = ArtifactCoordinate::new(id, "1.2.0");
///
/// assert_eq!(coordinate.to_string(), "org.example:foo-plugin:jar:jdk17:1.2.0");
/// assert_eq!(coordinate.file_name(), "foo-plugin-1.2.0-jdk17.jar");
/// assert_eq!(coordinate.base_file_name(), "foo-plugin-1.2.0.jar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    /// Versionless identity
    #[serde(flatten)]
    pub id: ArtifactId,
    /// Concrete version
    pub version: String,
}

impl ArtifactCoordinate {
    /// Pins an artifact identity to a version.
    #[must_use]
    pub fn new(id: ArtifactId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: version.into(),
        }
    }

    /// File name of the artifact as published, classifier included.
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.id.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.id.artifact_id, self.version, classifier, self.id.packaging
            ),
            None => self.base_file_name(),
        }
    }

    /// File name of the artifact without its classifier.
    ///
    /// Plugin names are derived from this form.
    #[must_use]
    pub fn base_file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.id.artifact_id, self.version, self.id.packaging
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.version)
    }
}

/// Requested version: a literal version or the "latest" sentinel.
///
/// # Examples
///
/// ```
/// use kpm_core::VersionSpec;
///
/// assert_eq!("LATEST".parse::<VersionSpec>().unwrap(), VersionSpec::Latest);
/// assert_eq!(
///     "0.7.1".parse::<VersionSpec>().unwrap(),
///     VersionSpec::Exact("0.7.1".to_string())
/// );
/// assert!("".parse::<VersionSpec>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionSpec {
    /// Newest version listed by the repository
    #[default]
    Latest,
    /// Version used verbatim
    Exact(String),
}

impl VersionSpec {
    /// Returns `true` for the "latest" sentinel.
    #[must_use]
    pub const fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl FromStr for VersionSpec {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "version cannot be empty".to_string(),
            ));
        }
        if token.eq_ignore_ascii_case(LATEST) {
            Ok(Self::Latest)
        } else {
            Ok(Self::Exact(token.to_string()))
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

/// Plugin implementation language, which selects the install subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// JVM plugins packaged as jars
    Java,
    /// Ruby plugins packaged as tarballs
    Ruby,
}

impl Language {
    /// Infers the language from a packaging type.
    ///
    /// Tarballs are Ruby plugins; everything else is treated as Java.
    #[must_use]
    pub fn from_packaging(packaging: &str) -> Self {
        if packaging == "tar.gz" || packaging == "tgz" {
            Self::Ruby
        } else {
            Self::Java
        }
    }

    /// Directory name under `plugins/`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Ruby => "ruby",
        }
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "java" => Ok(Self::Java),
            "ruby" => Ok(Self::Ruby),
            other => Err(crate::Error::InvalidArgument(format!(
                "unknown plugin language: '{other}' (expected: java or ruby)"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for an enabled plugin, as stored in the identifier registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginIdentifier {
    /// Name derived from the artifact file name
    pub plugin_name: String,
    /// Group identifier
    pub group_id: String,
    /// Artifact identifier
    pub artifact_id: String,
    /// Packaging
    pub packaging: String,
    /// Installed version
    pub version: String,
    /// Implementation language
    pub language: Language,
}
