//! Console tables.

use crate::db::permissions::Permission;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// Applied migrations as `(version, name, applied_at)`.
    pub fn migrations(history: &[(u32, String, String)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["VERSION", "NAME", "APPLIED AT"]);
        for (version, name, applied_at) in history {
            table.add_row(row![version, name, applied_at]);
        }
        table.printstd();

        Ok(())
    }

    pub fn permissions(permissions: &[Permission]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "APP", "MODEL", "CODENAME", "NAME"]);
        for permission in permissions {
            let (app_label, model) = permission.kind.natural_key();
            table.add_row(row![permission.id.unwrap_or(0), app_label, model, permission.codename, permission.name]);
        }
        table.printstd();

        Ok(())
    }
}
