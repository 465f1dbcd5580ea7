//! The CI/CD Operator architecture figure.
//!
//! This is the one authoritative definition of the figure: git hosts push
//! through the cluster ingress to the operator's webhook server, which queues
//! integration jobs that schedule Tekton pipeline runs.

use std::path::Path;

use trellis::{
    Diagram, TrellisError,
    attributes::RenderAttributes,
    catalog::{
        k8s::{
            compute::POD,
            network::INGRESS,
            others::CRD,
        },
        onprem::vcs::{GITHUB, GITLAB},
    },
    config::DiagramConfig,
    graph::{Link, NodeKind, Parent},
};

pub const ARCHITECTURE_TITLE: &str = "Architecture";

pub const TEKTON_ICON_URL: &str =
    "https://cd.foundation/wp-content/uploads/sites/78/2020/04/tekton-icon-color-1.png";

/// File name the Tekton icon is saved under.
pub const TEKTON_ICON_FILE: &str = "tekton.png";

const FONT: &str = "Open Sans";

/// Layers the figure's house style under the configured attributes: tighter
/// padding and Open Sans throughout. Anything set in `config` still wins.
pub fn house_style(config: DiagramConfig) -> DiagramConfig {
    let graph = config.graph_attrs().clone().layered_over(
        RenderAttributes::new()
            .with_pad("0.5")
            .with_fontname(FONT)
            .with_labelfontname(FONT),
    );
    let node = config
        .node_attrs()
        .clone()
        .layered_over(RenderAttributes::new().with_fontname(FONT).with_labelfontname(FONT));
    config.with_graph_attrs(graph).with_node_attrs(node)
}

/// Declares the architecture figure into `d`. `tekton_icon` must already
/// exist on disk; it backs the pipeline and task run nodes.
///
/// # Errors
///
/// [`TrellisError::AssetMissing`] if `tekton_icon` does not exist.
pub fn architecture(d: &mut Diagram, tekton_icon: &Path) -> Result<(), TrellisError> {
    let remote_git = d.cluster("Remote Git", Parent::Root)?;
    let github = d.node(GITHUB, "github", remote_git)?;
    let gitlab = d.node(GITLAB, "gitlab", remote_git)?;

    let k8s_cluster = d.cluster("K8s cluster", Parent::Root)?;
    let integration_config = d.node(CRD, "IntegrationConfig", k8s_cluster)?;
    let integration_job = d.node(CRD, "IntegrationJob", k8s_cluster)?;
    let ingress = d.node(INGRESS, "", k8s_cluster)?;

    let operator = d.cluster("CI/CD Operator", k8s_cluster)?;
    let webhook_server = d.node(POD, "Webhook server", operator)?;

    d.chain(github)?
        .then(ingress, Link::directed().with_label("PullRequest/Push/Tag"))?
        .then(webhook_server, Link::directed())?;
    d.connect(webhook_server, integration_job, Link::directed().with_label("Queued"))?;

    let pipeline_run = d.node(NodeKind::custom(tekton_icon), "PipelineRun", k8s_cluster)?;
    d.connect(integration_job, pipeline_run, Link::directed().with_label("Scheduled"))?;

    let task_runs = (1..=3)
        .map(|i| d.node(NodeKind::custom(tekton_icon), format!("TaskRun-{i}"), k8s_cluster))
        .collect::<Result<Vec<_>, _>>()?;
    // Highest-numbered run first, each feeding its own pod.
    for &task_run in task_runs.iter().rev() {
        let pod = d.node(POD, "", k8s_cluster)?;
        d.chain(pipeline_run)?
            .then(task_run, Link::directed())?
            .then(pod, Link::directed())?;
    }

    d.connect(integration_config, gitlab, Link::directed().with_label("Register Webhook"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use trellis::graph::{Child, NodeKind};

    use super::*;

    #[test]
    fn test_architecture_structure() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join(TEKTON_ICON_FILE);
        fs::write(&icon, b"png").unwrap();
        let mut d = Diagram::open(ARCHITECTURE_TITLE, DiagramConfig::default());

        architecture(&mut d, &icon).unwrap();
        let graph = d.graph();

        assert_eq!(graph.nodes_count(), 13);
        assert_eq!(graph.edges_count(), 11);
        assert_eq!(graph.clusters_count(), 3);
        let top_level: Vec<_> = graph
            .root_children()
            .iter()
            .filter(|child| matches!(child, Child::Cluster(_)))
            .collect();
        assert_eq!(top_level.len(), 2);

        let tekton_nodes = graph
            .nodes()
            .filter(|(_, node)| matches!(node.kind(), NodeKind::Custom(path) if path == &icon))
            .count();
        assert_eq!(tekton_nodes, 4);

        let task_runs = graph
            .nodes()
            .filter(|(_, node)| node.label().starts_with("TaskRun-"))
            .count();
        assert_eq!(task_runs, 3);
    }

    #[test]
    fn test_house_style_yields_to_config() {
        let config =
            DiagramConfig::default().with_graph_attrs(RenderAttributes::new().with_pad("1.0"));

        let styled = house_style(config);

        assert_eq!(styled.graph_attrs().pad(), Some("1.0"));
        assert_eq!(styled.graph_attrs().fontname(), Some(FONT));
        assert_eq!(styled.node_attrs().labelfontname(), Some(FONT));
    }
}
