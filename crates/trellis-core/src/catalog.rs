//! Built-in icon catalog.
//!
//! A static table of provider icons. Each [`Icon`] names the image it expects
//! under an icon root directory as `<provider>/<category>/<name>.png`; the
//! renderer resolves that path against the configured root at render time.

use std::{fmt, path::PathBuf};

/// A built-in provider icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Icon {
    provider: &'static str,
    category: &'static str,
    name: &'static str,
}

impl Icon {
    pub const fn new(provider: &'static str, category: &'static str, name: &'static str) -> Self {
        Self {
            provider,
            category,
            name,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Path of the icon image relative to an icon root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.provider)
            .join(self.category)
            .join(format!("{}.png", self.name))
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.provider, self.category, self.name)
    }
}

/// On-premises software.
pub mod onprem {
    /// Version control hosts.
    pub mod vcs {
        use crate::catalog::Icon;

        pub const GITHUB: Icon = Icon::new("onprem", "vcs", "github");
        pub const GITLAB: Icon = Icon::new("onprem", "vcs", "gitlab");
        pub const GITEA: Icon = Icon::new("onprem", "vcs", "gitea");
    }

    /// CI/CD servers.
    pub mod ci {
        use crate::catalog::Icon;

        pub const JENKINS: Icon = Icon::new("onprem", "ci", "jenkins");
        pub const TEKTON: Icon = Icon::new("onprem", "ci", "tekton");
    }
}

/// Kubernetes resources.
pub mod k8s {
    pub mod compute {
        use crate::catalog::Icon;

        pub const POD: Icon = Icon::new("k8s", "compute", "pod");
        pub const JOB: Icon = Icon::new("k8s", "compute", "job");
        pub const DEPLOYMENT: Icon = Icon::new("k8s", "compute", "deploy");
        pub const STATEFUL_SET: Icon = Icon::new("k8s", "compute", "sts");
    }

    pub mod network {
        use crate::catalog::Icon;

        pub const INGRESS: Icon = Icon::new("k8s", "network", "ing");
        pub const SERVICE: Icon = Icon::new("k8s", "network", "svc");
    }

    pub mod others {
        use crate::catalog::Icon;

        pub const CRD: Icon = Icon::new("k8s", "others", "crd");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(
            onprem::vcs::GITHUB.relative_path(),
            Path::new("onprem").join("vcs").join("github.png")
        );
        assert_eq!(
            k8s::network::INGRESS.relative_path(),
            Path::new("k8s").join("network").join("ing.png")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(k8s::others::CRD.to_string(), "k8s.others.crd");
    }
}
