//! # Employee Commands

use clap::{Args, Subcommand};
use furnstock_core::{Employee, NewEmployee};
use tracing::info;

use super::{or_dash, Context};
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    /// List employees
    List,

    /// Show one employee
    Show { id: String },

    /// Register an employee
    Add(EmployeeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct EmployeeArgs {
    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub middle_name: Option<String>,

    #[arg(long)]
    pub position: Option<String>,
}

impl From<EmployeeArgs> for NewEmployee {
    fn from(args: EmployeeArgs) -> Self {
        NewEmployee {
            last_name: args.last_name,
            first_name: args.first_name,
            middle_name: args.middle_name,
            position: args.position,
        }
    }
}

pub async fn run(ctx: &Context, cmd: EmployeeCommand) -> CliResult<String> {
    match cmd {
        EmployeeCommand::List => {
            let employees = ctx.db.employees().list().await?;
            ctx.render(&employees, |e| render_list(e))
        }
        EmployeeCommand::Show { id } => {
            let employee = ctx
                .db
                .employees()
                .get_by_id(&id)
                .await?
                .ok_or_else(|| CliError::not_found("Employee", &id))?;
            ctx.render(&employee, |e| {
                format!(
                    "{} ({})\nPosition  {}",
                    e.full_name(),
                    e.id,
                    or_dash(e.position.as_deref())
                )
            })
        }
        EmployeeCommand::Add(args) => {
            let employee = ctx.db.employees().insert(&args.into()).await?;
            info!(id = %employee.id, "Employee added");
            ctx.render(&employee, |e| {
                format!("Added employee {} ({})", e.full_name(), e.id)
            })
        }
    }
}

fn render_list(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "No employees".to_string();
    }

    employees
        .iter()
        .map(|e| {
            format!(
                "{:<36}  {:<40} {}",
                e.id,
                e.full_name(),
                or_dash(e.position.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::text_context;

    #[tokio::test]
    async fn test_add_and_list() {
        let ctx = text_context().await;
        let out = run(
            &ctx,
            EmployeeCommand::Add(EmployeeArgs {
                last_name: "Petrova".into(),
                first_name: "Anna".into(),
                middle_name: Some("Sergeevna".into()),
                position: None,
            }),
        )
        .await
        .unwrap();
        assert!(out.starts_with("Added employee Petrova Anna Sergeevna"));

        let out = run(&ctx, EmployeeCommand::List).await.unwrap();
        assert!(out.contains("Petrova Anna Sergeevna"));
        assert!(out.trim_end().ends_with('-'));
    }

    #[tokio::test]
    async fn test_missing_first_name() {
        let ctx = text_context().await;
        let result = run(
            &ctx,
            EmployeeCommand::Add(EmployeeArgs {
                last_name: "Petrova".into(),
                first_name: "  ".into(),
                middle_name: None,
                position: None,
            }),
        )
        .await;
        assert!(result.is_err());
    }
}
