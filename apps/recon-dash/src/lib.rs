pub mod browse;
pub mod render;

use std::{path::PathBuf, sync::Arc};

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use tracing_subscriber::EnvFilter;

use recon_client::{HttpReconApi, SessionContext};
use recon_domain::ReconStatus;
use recon_query::{QuerySettings, ResultQueryController, StatusOverrideWorkflow};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Sign in and store the session token.
	Login {
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	/// Create an analyst account and sign in.
	Register {
		#[arg(long)]
		username: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	Logout,
	Whoami,
	/// Show the status breakdown, optionally for one upload job.
	Stats {
		#[arg(long)]
		job_id: Option<String>,
	},
	/// Print one page of reconciliation results.
	Results {
		#[arg(long, default_value_t = 1)]
		page: u32,
		#[arg(long, default_value = "")]
		search: String,
		#[arg(long)]
		status: Option<ReconStatus>,
	},
	/// Print the change history of one record.
	Audit { id: String },
	/// Set a record's status by hand. The note is stored in the audit trail.
	Override {
		id: String,
		#[arg(long)]
		status: ReconStatus,
		#[arg(long)]
		note: String,
	},
	/// Upload a CSV of transactions for reconciliation.
	Upload { file: PathBuf },
	/// Interactive results view driven by commands on stdin.
	Browse,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = recon_config::load(&args.config)?;
	init_tracing(&config)?;
	let session = Arc::new(SessionContext::init(&config.session.credentials_path));
	let api = HttpReconApi::new(&config.api, session)?;
	let settings = QuerySettings::from_config(&config);

	match args.command {
		Command::Login { email, password } => {
			let user = api.login(&email, &password).await?;

			println!("Signed in as {} <{}>.", user.username, user.email);
		},
		Command::Register { username, email, password } => {
			let user = api.register(&username, &email, &password).await?;

			println!("Registered and signed in as {} <{}>.", user.username, user.email);
		},
		Command::Logout => {
			api.logout();

			println!("Signed out.");
		},
		Command::Whoami => match api.session().current_user() {
			Some(user) => println!("{} <{}> ({:?})", user.username, user.email, user.role),
			None => println!("Not signed in."),
		},
		Command::Stats { job_id } => {
			let stats = api.fetch_stats(job_id.as_deref()).await?;

			print!("{}", render::stats(&stats));
		},
		Command::Results { page, search, status } => {
			let query = recon_domain::ResultsQuery {
				page: page.max(1),
				limit: api.page_limit(),
				search,
				status,
			};
			let page = api.fetch_results(&query).await?;

			print!("{}", render::results_page(&page));
		},
		Command::Audit { id } => {
			let entries = api.fetch_audit_trail(&id).await?;

			print!("{}", render::audit_entries(&id, &entries));
		},
		Command::Override { id, status, note } => override_once(api, settings, id, status, note).await?,
		Command::Upload { file } => {
			let receipt = api.upload(&file).await?;

			match receipt.job_id {
				Some(job_id) => println!("Upload accepted. Job {job_id}."),
				None => println!("Upload accepted."),
			}
		},
		Command::Browse => browse::run(api, settings).await?,
	}

	Ok(())
}

async fn override_once(
	api: HttpReconApi,
	settings: QuerySettings,
	id: String,
	status: ReconStatus,
	note: String,
) -> color_eyre::Result<()> {
	let api = Arc::new(api);
	let controller = ResultQueryController::spawn(api.clone(), settings);
	let mut workflow = StatusOverrideWorkflow::new(api, Arc::new(controller.refresher()));

	workflow.open(id.as_str(), status);
	workflow.set_note(note);
	workflow.submit().await?;

	println!("Status of {id} set to {status}.");
	print!("{}", render::results_view(&controller.snapshot()));

	Ok(())
}

fn init_tracing(config: &recon_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
