//! Record commands - list, create, read, update and delete through a portal

use anyhow::Result;
use ims_client::{FormInput, GatewayClient, Portal, PortalClient};
use ims_core::EntityKind;

use crate::output::{AsRow, IdRow, OutputContext, OutputFormat};

fn portal<P: Portal>(client: &GatewayClient) -> PortalClient<P> {
    PortalClient::new(client.clone())
}

/// List the ids of all records of one kind
pub async fn list(client: &GatewayClient, kind: EntityKind, ctx: &OutputContext) -> Result<()> {
    let ids = with_portal!(kind, P => portal::<P>(client).list().await?);
    if ids.is_empty() && ctx.format == OutputFormat::Table {
        ctx.info(&format!("No {}", kind.plural()));
        return Ok(());
    }

    let rows: Vec<IdRow> = ids.into_iter().map(IdRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Create a record from `key=value` fields
pub async fn create(
    client: &GatewayClient,
    kind: EntityKind,
    fields: &[String],
    ctx: &OutputContext,
) -> Result<()> {
    let input = FormInput::from_pairs(fields)?;
    let id = with_portal!(kind, P => portal::<P>(client).create(&input).await?);
    ctx.success(&format!("Created {} {}", kind, id));
    Ok(())
}

/// Show one record
pub async fn read(
    client: &GatewayClient,
    kind: EntityKind,
    id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    with_portal!(kind, P => read_as::<P>(client, id, ctx).await)
}

async fn read_as<P: Portal>(client: &GatewayClient, id: &str, ctx: &OutputContext) -> Result<()>
where
    P::Record: AsRow,
{
    let record = portal::<P>(client).read(id).await?;
    ctx.print_one(&record.as_row());
    Ok(())
}

/// Replace every field of a record
pub async fn update(
    client: &GatewayClient,
    kind: EntityKind,
    id: &str,
    fields: &[String],
    ctx: &OutputContext,
) -> Result<()> {
    let input = FormInput::from_pairs(fields)?;
    let result = with_portal!(kind, P => portal::<P>(client).update(id, &input).await?);
    ctx.success(&format!("Updated {} {}", kind, id));
    if !result.is_null() {
        ctx.print_value("result", &result);
    }
    Ok(())
}

pub async fn delete(
    client: &GatewayClient,
    kind: EntityKind,
    id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    with_portal!(kind, P => portal::<P>(client).delete(id).await?);
    ctx.success(&format!("Deleted {} {}", kind, id));
    Ok(())
}
