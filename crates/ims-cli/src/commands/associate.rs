//! Association commands - link products to suppliers and categories

use anyhow::Result;
use ims_client::{
    Association, CategoryPortal, GatewayClient, PortalClient, ProductPortal, SupplierPortal,
};

use crate::output::{OutputContext, OutputFormat, RawRow};

pub async fn associate(
    client: &GatewayClient,
    with: Association,
    owner_id: &str,
    p_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let products = PortalClient::<ProductPortal>::new(client.clone());
    products.associate(with, owner_id, p_id).await?;
    ctx.success(&format!("Linked product {} to {} {}", p_id, with.owner(), owner_id));
    Ok(())
}

pub async fn dissociate(
    client: &GatewayClient,
    with: Association,
    owner_id: &str,
    p_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let products = PortalClient::<ProductPortal>::new(client.clone());
    products.dissociate(with, owner_id, p_id).await?;
    ctx.success(&format!(
        "Unlinked product {} from {} {}",
        p_id,
        with.owner(),
        owner_id
    ));
    Ok(())
}

/// Products linked to one supplier or category
pub async fn products(
    client: &GatewayClient,
    of: Association,
    owner_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let rows = match of {
        Association::Supplier => {
            PortalClient::<SupplierPortal>::new(client.clone())
                .products(owner_id)
                .await?
        }
        Association::Category => {
            PortalClient::<CategoryPortal>::new(client.clone())
                .products(owner_id)
                .await?
        }
    };

    if rows.is_empty() && ctx.format == OutputFormat::Table {
        ctx.info(&format!("No products linked to {} {}", of.owner(), owner_id));
        return Ok(());
    }

    let rows: Vec<RawRow> = rows.into_iter().map(|columns| RawRow { columns }).collect();
    ctx.print(&rows);
    Ok(())
}
