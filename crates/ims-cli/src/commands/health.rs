//! Health command - check that the gateway is up

use anyhow::Result;
use ims_client::GatewayClient;

use crate::output::OutputContext;

pub async fn health(client: &GatewayClient, ctx: &OutputContext) -> Result<()> {
    let status = client.health().await?;
    ctx.success(&format!("{} is {}", client.base_url(), status.trim()));
    Ok(())
}
