//! Example: a small web service diagram written as DOT text.
//!
//! Run with `cargo run -p trellis --example web_service`. The DOT output
//! does not need Graphviz; switch the format to `Png` to render an image.

use trellis::{
    Diagram,
    catalog::{k8s, onprem},
    config::{DiagramConfig, OutputFormat},
    graph::{Link, Parent},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DiagramConfig::default()
        .with_format(OutputFormat::Dot)
        .with_output_dir(std::env::temp_dir());

    let output = Diagram::scope("Web Service", config, |d| {
        let remote = d.cluster("Remote Git", Parent::Root)?;
        let github = d.node(onprem::vcs::GITHUB, "github", remote)?;

        let cluster = d.cluster("K8s cluster", Parent::Root)?;
        let ingress = d.node(k8s::network::INGRESS, "ingress", cluster)?;
        let service = d.node(k8s::network::SERVICE, "service", cluster)?;
        let pods: Vec<_> = (1..=3)
            .map(|i| d.node(k8s::compute::POD, format!("pod {i}"), cluster))
            .collect::<Result<_, _>>()?;

        d.chain(github)?
            .then(ingress, Link::directed().with_label("Push"))?
            .then(service, Link::directed())?
            .fan_out(pods, Link::directed())?;
        Ok(())
    })?;

    println!("Wrote {}", output.display());
    Ok(())
}
