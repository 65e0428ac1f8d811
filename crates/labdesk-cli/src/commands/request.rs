//! Maintenance request commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::output;
use labdesk_core::identity::Role;
use labdesk_core::notifier::WebNotifier;
use labdesk_core::request::{self, model, NewRequest};

#[derive(Subcommand)]
pub enum RequestCommands {
    /// Open a new maintenance request
    New(NewArgs),

    /// List requests
    List(ListArgs),

    /// Show one request in full
    Show(ShowArgs),

    /// Save field values for one step
    Save(SaveArgs),

    /// Advance a request past its current step
    Advance(AdvanceArgs),

    /// Record admin approval
    Approve(DecideArgs),

    /// Record admin rejection
    Reject(DecideArgs),

    /// Export a request snapshot
    Export(ExportArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Complaint details
    pub details: String,

    /// Problem type (system, furniture, civil, electrical, workshop)
    #[arg(long = "type")]
    pub type_of_problem: String,

    /// Date of the problem report (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Department raising the request
    #[arg(long, default_value = "")]
    pub department: String,

    /// Location of the problem
    #[arg(long, default_value = "")]
    pub location: String,

    /// Mark the complaint as recurring
    #[arg(long)]
    pub recurring: bool,

    /// How many times the problem recurred
    #[arg(long)]
    pub times: Option<u32>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only requests parked at this step
    #[arg(long)]
    pub step: Option<u8>,

    /// Only requests of this problem type
    #[arg(long = "type")]
    pub type_of_problem: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Request ID
    pub id: String,
}

#[derive(Args)]
pub struct SaveArgs {
    /// Request ID
    pub id: String,

    /// Step ordinal to save into
    pub step: u8,

    /// Acting role (admin, lab_incharge, lab_assistant)
    #[arg(long)]
    pub role: String,

    /// Field values as NAME=VALUE (repeatable)
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct AdvanceArgs {
    /// Request ID
    pub id: String,

    /// Acting role (admin, lab_incharge, lab_assistant)
    #[arg(long)]
    pub role: String,
}

#[derive(Args)]
pub struct DecideArgs {
    /// Request ID
    pub id: String,

    /// Free-text remarks recorded with the decision
    #[arg(long)]
    pub remarks: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Request ID
    pub id: String,

    /// Output format (csv, json)
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}

fn parse_role(raw: &str) -> Result<Role> {
    Role::parse(raw)
        .ok_or_else(|| anyhow::anyhow!("Unknown role '{}'. Valid roles: admin, lab_incharge, lab_assistant", raw))
}

fn parse_field(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) => Ok((name.trim().to_string(), value.to_string())),
        None => Err(anyhow::anyhow!("Expected NAME=VALUE, got '{}'", raw)),
    }
}

pub async fn execute(cmd: RequestCommands) -> Result<()> {
    let pool = labdesk_db::init_pool_from_env().await?;
    let notifier = WebNotifier::new();

    match cmd {
        RequestCommands::New(args) => {
            let input = NewRequest {
                type_of_problem: args.type_of_problem,
                date: args
                    .date
                    .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string()),
                department: args.department,
                location: args.location,
                complaint_details: args.details,
                recurring_complaint: args.recurring,
                recurring_times: args.times,
            };

            // Opening a ticket is the Lab In-charge's step.
            let req = request::create_request(&pool, Role::LabIncharge, &input).await?;
            notifier.notify_dashboard_refresh().await;

            println!(
                "{} Opened request {} ({})",
                "✓".green().bold(),
                req.id.cyan(),
                req.type_of_problem.as_str()
            );
        }

        RequestCommands::List(args) => {
            let problem_type = match args.type_of_problem.as_deref() {
                Some(raw) => Some(
                    model::ProblemType::parse(raw)
                        .ok_or_else(|| anyhow::anyhow!("Unknown problem type '{}'", raw))?,
                ),
                None => None,
            };
            let requests = request::list_requests(&pool, args.step, problem_type).await?;
            output::print_requests_table(&requests);
        }

        RequestCommands::Show(args) => {
            let req = request::get_request(&pool, &args.id).await?;
            output::print_request(&req);
        }

        RequestCommands::Save(args) => {
            let role = parse_role(&args.role)?;
            let fields = args
                .fields
                .iter()
                .map(|f| parse_field(f))
                .collect::<Result<Vec<_>>>()?;

            let req = request::save_step(&pool, &args.id, role, args.step, &fields).await?;
            notifier
                .notify_request_updated(&req.id, req.current_step)
                .await;

            println!(
                "{} Saved {} field(s) into step {} of {}",
                "✓".green().bold(),
                fields.len(),
                args.step,
                args.id.dimmed()
            );
        }

        RequestCommands::Advance(args) => {
            let role = parse_role(&args.role)?;
            let req = request::advance_request(&pool, &args.id, role).await?;
            notifier
                .notify_request_updated(&req.id, req.current_step)
                .await;

            println!(
                "{} Request {} advanced to step {}",
                "✓".green().bold(),
                args.id.dimmed(),
                req.current_step.to_string().cyan()
            );
        }

        RequestCommands::Approve(args) => {
            let req = request::record_decision(
                &pool,
                &args.id,
                Role::Admin,
                model::Decision::Approve,
                args.remarks.as_deref(),
            )
            .await?;
            notifier
                .notify_decision_recorded(&req.id, req.admin_approval_status.as_str())
                .await;

            println!(
                "{} Request {} approved, moved to closure",
                "✓".green().bold(),
                args.id.dimmed()
            );
        }

        RequestCommands::Reject(args) => {
            let req = request::record_decision(
                &pool,
                &args.id,
                Role::Admin,
                model::Decision::Reject,
                args.remarks.as_deref(),
            )
            .await?;
            notifier
                .notify_decision_recorded(&req.id, req.admin_approval_status.as_str())
                .await;

            println!(
                "{} Request {} rejected, moved to closure",
                "✗".red().bold(),
                args.id.dimmed()
            );
        }

        RequestCommands::Export(args) => {
            let req = request::get_request(&pool, &args.id).await?;
            let rendered = match args.format.as_str() {
                "csv" => labdesk_core::export::to_csv(&req),
                "json" => serde_json::to_string_pretty(&labdesk_core::export::snapshot(&req))?,
                other => anyhow::bail!("Unknown export format '{}'. Use csv or json.", other),
            };

            match args.output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!(
                        "{} Exported {} to {}",
                        "✓".green().bold(),
                        args.id.dimmed(),
                        path.display().to_string().cyan()
                    );
                }
                None => print!("{}", rendered),
            }
        }
    }

    Ok(())
}
