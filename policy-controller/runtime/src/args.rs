use crate::{apply_policies, input::PassDescription, plugins::PluginMetrics};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "mesh-policy",
    about = "Applies traffic policies to the resources generated for a proxy"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "mesh=info,warn",
        env = "MESH_POLICY_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// A JSON description of the pass: the proxy, the policies matched to it, and the resources
    /// generated for it.
    #[clap(long, short)]
    input: PathBuf,

    /// Where to write the configured resources. Defaults to stdout.
    #[clap(long, short)]
    output: Option<PathBuf>,

    /// Writes metrics to stderr after the pass.
    #[clap(long)]
    print_metrics: bool,
}

impl Args {
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            input,
            output,
            print_metrics,
        } = self;

        log_format
            .try_init(log_level)
            .map_err(|error| anyhow!("failed to initialize logging: {error}"))?;

        let mut prom = <Registry>::default();
        let metrics = PluginMetrics::register(prom.sub_registry_with_prefix("policy_apply"));

        let bytes = tokio::fs::read(&input)
            .await
            .with_context(|| format!("failed to read {}", input.display()))?;
        let pass = serde_json::from_slice::<PassDescription>(&bytes)
            .with_context(|| format!("invalid pass description in {}", input.display()))?;
        let (proxy, mut resources) = pass.into_parts();

        info!(proxy = %proxy.id, resources = resources.len(), "Applying policies");
        apply_policies(&proxy, &mut resources, &metrics)
            .with_context(|| format!("failed to configure proxy {}", proxy.id))?;
        info!(proxy = %proxy.id, "Configured");

        let configured = serde_json::to_vec_pretty(&resources.iter().collect::<Vec<_>>())?;
        match output {
            Some(path) => tokio::fs::write(&path, &configured)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&configured).await?;
                stdout.flush().await?;
            }
        }

        if print_metrics {
            let mut buf = String::new();
            prometheus_client::encoding::text::encode(&mut buf, &prom)?;
            let mut stderr = tokio::io::stderr();
            stderr.write_all(buf.as_bytes()).await?;
            stderr.flush().await?;
        }

        Ok(())
    }
}
