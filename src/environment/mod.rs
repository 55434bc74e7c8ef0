//! Per-deployment URL resolution.
//!
//! The self-hosted backend and the managed cloud backend expose different
//! routing trees under the same logical path space. Callers always write
//! logical paths in the self-hosted form (`/v1/datasets`); this module maps
//! them onto the physical tree of the selected [`Mode`].
//!
//! | Mode  | Logical path   | Physical URL                  |
//! |-------|----------------|-------------------------------|
//! | local | `/v1/datasets` | `{local}/api/v1/datasets`     |
//! | cloud | `/v1/datasets` | `{cloud}/api/datasets`        |
//! | cloud | `/health`      | `{cloud}/health`              |

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Logical path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Path prefix shared by both deployments for non-liveness endpoints.
pub const API_PREFIX: &str = "/api";

/// Version segment that only the self-hosted tree carries.
const VERSION_SEGMENT: &str = "v1";

/// Target deployment of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Self-hosted backend, bearer session token.
    Local,
    /// Managed cloud backend, API key header.
    Cloud,
}

impl Mode {
    /// Lowercase name used in logs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// How logical paths are rewritten for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathConvention {
    /// `/api` + logical path, verbatim.
    ApiPrefixed,
    /// Liveness at the host root; everything else under `/api` with the
    /// version segment stripped.
    Unversioned,
}

impl PathConvention {
    /// Rewrite a logical path into `(prefix, physical path)`.
    ///
    /// A logical path without a leading `/` is treated as if it had one.
    #[must_use]
    pub fn rewrite(self, logical_path: &str) -> (&'static str, String) {
        let logical_path = with_leading_slash(logical_path);
        let logical_path = logical_path.as_ref();
        match self {
            Self::ApiPrefixed => (API_PREFIX, logical_path.to_string()),
            Self::Unversioned => {
                if is_health_path(logical_path) {
                    ("", logical_path.to_string())
                } else {
                    (API_PREFIX, strip_version_segment(logical_path))
                }
            }
        }
    }
}

/// Base URL and rewrite rule of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    /// Deployment mode.
    pub mode: Mode,
    /// Root URL without trailing `/`.
    pub base_url: String,
    /// Path rewrite rule.
    pub path_convention: PathConvention,
}

/// Physical target of a logical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Full physical URL.
    pub url: String,
    /// Prefix inserted between base URL and path (`/api` or empty).
    pub prefix: &'static str,
}

/// Maps logical paths onto the physical URL of each deployment.
///
/// Descriptors are fixed at construction for the lifetime of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentResolver {
    local: EnvironmentDescriptor,
    cloud: EnvironmentDescriptor,
}

impl EnvironmentResolver {
    /// Create a resolver from the two base URLs.
    #[must_use]
    pub fn new(local_base_url: impl Into<String>, cloud_base_url: impl Into<String>) -> Self {
        Self {
            local: EnvironmentDescriptor {
                mode: Mode::Local,
                base_url: trim_base(local_base_url.into()),
                path_convention: PathConvention::ApiPrefixed,
            },
            cloud: EnvironmentDescriptor {
                mode: Mode::Cloud,
                base_url: trim_base(cloud_base_url.into()),
                path_convention: PathConvention::Unversioned,
            },
        }
    }

    /// Create a resolver from client configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.local_base_url, &config.cloud_base_url)
    }

    /// Descriptor for a mode.
    #[must_use]
    pub const fn descriptor(&self, mode: Mode) -> &EnvironmentDescriptor {
        match mode {
            Mode::Local => &self.local,
            Mode::Cloud => &self.cloud,
        }
    }

    /// Resolve a logical path for the given mode.
    #[must_use]
    pub fn resolve(&self, mode: Mode, logical_path: &str) -> ResolvedEndpoint {
        let descriptor = self.descriptor(mode);
        let (prefix, path) = descriptor.path_convention.rewrite(logical_path);
        ResolvedEndpoint {
            url: format!("{}{prefix}{path}", descriptor.base_url),
            prefix,
        }
    }

    /// Liveness URL of a deployment, always at the host root.
    #[must_use]
    pub fn liveness_url(&self, mode: Mode) -> String {
        format!("{}{HEALTH_PATH}", self.descriptor(mode).base_url)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn with_leading_slash(logical_path: &str) -> Cow<'_, str> {
    if logical_path.starts_with('/') {
        Cow::Borrowed(logical_path)
    } else {
        Cow::Owned(format!("/{logical_path}"))
    }
}

fn is_health_path(logical_path: &str) -> bool {
    let path = logical_path.split(['?', '#']).next().unwrap_or_default();
    path == HEALTH_PATH || path == "/health/"
}

/// Remove the first `v1` segment from the path portion, keeping any query.
fn strip_version_segment(logical_path: &str) -> String {
    let (path, rest) = logical_path
        .find(['?', '#'])
        .map_or((logical_path, ""), |idx| logical_path.split_at(idx));

    let mut removed = false;
    let kept: Vec<&str> = path
        .split('/')
        .filter(|segment| {
            if !removed && *segment == VERSION_SEGMENT {
                removed = true;
                false
            } else {
                true
            }
        })
        .collect();

    let mut stripped = kept.join("/");
    stripped.push_str(rest);
    stripped
}
