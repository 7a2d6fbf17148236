//! Glue catalog over the box-office bucket
//!
//! Consumes the bucket name published by `box-office-mojo`; the entry
//! point records the matching dependency edge.

use crate::config::Config;
use anyhow::Result;
use stackkit::{App, Attrs, PropertyBag};

pub const NAME: &str = "box-office-catalog";
const SECTION: &str = "box_office_catalog";

const DATABASE_NAME: &str = "box_office_db";

pub fn box_office_catalog(app: &mut App, cfg: &Config, props: PropertyBag) -> Result<()> {
    let env = cfg.env_target(SECTION)?;
    let crawler_role = cfg.get(SECTION, "crawler_role")?.to_string();
    let bucket = props.get_str("box_office_bucket")?.to_string();

    let stack = app.stack(NAME, env.clone())?;

    stack.declare(
        "box-office-db",
        "AWS::Glue::Database",
        Attrs::new()
            .set("CatalogId", env.account.as_str())
            .set("DatabaseInput", Attrs::new().set("Name", DATABASE_NAME)),
    )?;

    stack.declare(
        "box-office-crawler",
        "AWS::Glue::Crawler",
        Attrs::new()
            .set("Name", "box-office-crawler")
            .set("Role", crawler_role)
            .set("DatabaseName", DATABASE_NAME)
            .set(
                "Targets",
                Attrs::new().set(
                    "S3Targets",
                    vec![Attrs::new().set("Path", format!("s3://{bucket}/"))],
                ),
            )
            .set(
                "SchemaChangePolicy",
                Attrs::new()
                    .set("UpdateBehavior", "UPDATE_IN_DATABASE")
                    .set("DeleteBehavior", "DEPRECATE_IN_DATABASE"),
            ),
    )?;

    Ok(())
}
