//! Admin commands - employees, settings, backup and restore. All require an
//! admin login.

use crate::{
    cli::AppContext,
    core::{
        admin::{self, EmployeeForm, SettingsForm},
        backup,
    },
    entities::Role,
    errors::{Error, Result},
};
use clap::{Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Role as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Full access
    Admin,
    /// Inventory and sales only
    Employee,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Self::Admin,
            RoleArg::Employee => Self::Employee,
        }
    }
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List employee accounts
    Employees,
    /// Create an employee account
    AddEmployee {
        /// Login name
        #[arg(long)]
        username: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Access level
        #[arg(long, value_enum, default_value_t = RoleArg::Employee)]
        role: RoleArg,
        /// Password
        #[arg(long)]
        password: String,
    },
    /// Edit an employee account; omitted fields keep their current value
    UpdateEmployee {
        /// Account id
        id: i64,
        /// Login name
        #[arg(long)]
        username: Option<String>,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Access level
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        /// New password
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete an employee account
    DeleteEmployee {
        /// Account id
        id: i64,
    },
    /// Show store settings
    Settings,
    /// Change store settings; omitted fields keep their current value
    SetSettings {
        /// Low-stock threshold
        #[arg(long)]
        low_stock_threshold: Option<i64>,
        /// Profit margin in percent
        #[arg(long)]
        profit_margin: Option<f64>,
        /// Store name
        #[arg(long)]
        store_name: Option<String>,
    },
    /// Write a JSON backup of all data
    Backup {
        /// Output file; defaults to qubic-store-backup-YYYY-MM-DD.json
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a JSON backup
    Restore {
        /// Backup file to read
        file: PathBuf,
    },
}

/// Runs an admin subcommand.
#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &AppContext, command: AdminCommand, out: &mut dyn Write) -> Result<()> {
    let store = ctx.store();
    let session = &ctx.session;
    let reserved = ctx.reserved_admin();

    match command {
        AdminCommand::Employees => {
            let employees = admin::list_employees(store, session, reserved).await?;
            if employees.is_empty() {
                writeln!(out, "No employees found")?;
            }
            for e in employees {
                writeln!(
                    out,
                    "#{:<5} {:<16} {:<24} {:<9} {}",
                    e.id,
                    e.username,
                    e.name,
                    e.role,
                    e.created.format("%Y-%m-%d")
                )?;
            }
        }
        AdminCommand::AddEmployee {
            username,
            name,
            role,
            password,
        } => {
            let form = EmployeeForm {
                username,
                name,
                role: role.into(),
                password,
            };
            let user = admin::save_employee(store, session, reserved, None, &form).await?;
            writeln!(out, "✅ Employee added: #{} {}", user.id, user.username)?;
        }
        AdminCommand::UpdateEmployee {
            id,
            username,
            name,
            role,
            password,
        } => {
            session.require_admin("managing employees")?;
            let current = store
                .get_user(id)
                .await?
                .ok_or(Error::NotFound { entity: "user", id })?;
            let form = EmployeeForm {
                username: username.unwrap_or(current.username),
                name: name.unwrap_or(current.name),
                role: role.map_or(current.role, Role::from),
                password: password.unwrap_or_default(),
            };
            let user = admin::save_employee(store, session, reserved, Some(id), &form).await?;
            writeln!(out, "✅ Employee updated: #{} {}", user.id, user.username)?;
        }
        AdminCommand::DeleteEmployee { id } => {
            admin::delete_employee(store, session, reserved, id).await?;
            writeln!(out, "✅ Employee #{id} deleted")?;
        }
        AdminCommand::Settings => {
            let settings = admin::load_settings(store, session).await?;
            writeln!(out, "Store name:          {}", settings.store_name)?;
            writeln!(out, "Low stock threshold: {}", settings.low_stock_threshold)?;
            writeln!(out, "Profit margin:       {}%", settings.profit_margin)?;
            match settings.last_backup {
                Some(at) => writeln!(out, "Last backup:         {}", at.format("%Y-%m-%d %H:%M"))?,
                None => writeln!(out, "Last backup:         never")?,
            }
        }
        AdminCommand::SetSettings {
            low_stock_threshold,
            profit_margin,
            store_name,
        } => {
            let current = admin::load_settings(store, session).await?;
            let form = SettingsForm {
                low_stock_threshold: low_stock_threshold.unwrap_or(current.low_stock_threshold),
                profit_margin: profit_margin.unwrap_or(current.profit_margin),
                store_name: store_name.unwrap_or(current.store_name),
            };
            admin::save_settings(store, session, &form).await?;
            writeln!(out, "✅ Settings saved")?;
        }
        AdminCommand::Backup { output } => {
            let json = admin::create_backup(store, session).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(backup::backup_file_name(chrono::Utc::now().date_naive()))
            });
            std::fs::write(&path, json)?;
            admin::mark_backup_taken(store, session).await?;
            info!("Backup written to {}", path.display());
            writeln!(out, "✅ Backup written to {}", path.display())?;
        }
        AdminCommand::Restore { file } => {
            session.require_admin("restoring backups")?;
            let json = std::fs::read_to_string(&file)?;
            let snapshot = admin::restore_backup(store, session, &json).await?;
            writeln!(
                out,
                "✅ Restored {} users, {} products, {} transactions",
                snapshot.users.len(),
                snapshot.products.len(),
                snapshot.transactions.len()
            )?;
        }
    }
    Ok(())
}
