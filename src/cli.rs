use std::path::PathBuf;

mod fill_data_library;
mod generate;
mod init;
mod terminal;

use clap::ArgAction;
use training::{TopicType, TrainingOptions};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the training material
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Create a topic and, optionally, a tutorial inside it
    ///
    /// Existing topics and tutorials are left untouched.
    Init(init::Command),

    /// Fill the data library of a tutorial from a Zenodo record
    FillDataLibrary(fill_data_library::Command),

    /// Regenerate the hands-on document of a tutorial from a workflow
    #[command(name = "generate-from-wf")]
    GenerateFromWf(generate::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::FillDataLibrary(command) => command.run(&root)?,
            Self::GenerateFromWf(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// Audience of a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum TopicTarget {
    /// Tutorials for Galaxy users
    #[default]
    Use,
    /// Tutorials for Galaxy administrators
    Admin,
}

impl From<TopicTarget> for TopicType {
    fn from(target: TopicTarget) -> Self {
        match target {
            TopicTarget::Use => Self::Use,
            TopicTarget::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct TopicArgs {
    /// Directory name of the topic
    #[arg(long, value_name = "NAME")]
    topic_name: String,
}

#[derive(Debug, Clone, clap::Args)]
struct WorkflowArgs {
    /// Local workflow file (.ga)
    #[arg(long, value_name = "PATH", conflicts_with = "workflow_id")]
    workflow: Option<PathBuf>,

    /// Id of a workflow stored on Galaxy
    #[arg(long, value_name = "ID")]
    workflow_id: Option<String>,

    /// Base URL of the Galaxy instance
    #[arg(long, value_name = "URL")]
    galaxy_url: Option<String>,

    /// API key for the Galaxy instance
    #[arg(long, value_name = "KEY")]
    galaxy_api_key: Option<String>,
}

impl WorkflowArgs {
    fn apply(self, options: &mut TrainingOptions) {
        options.workflow = self.workflow;
        options.workflow_id = self.workflow_id;
        options.galaxy_url = self.galaxy_url;
        options.galaxy_api_key = self.galaxy_api_key;
    }
}
