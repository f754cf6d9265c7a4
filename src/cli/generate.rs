use std::path::{Path, PathBuf};

use tracing::instrument;
use training::{Config, Training, TrainingOptions};

use super::{TopicArgs, WorkflowArgs, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    topic: TopicArgs,

    /// Directory name of the tutorial
    #[arg(long, value_name = "NAME")]
    tutorial_name: String,

    #[command(flatten)]
    workflow: WorkflowArgs,

    /// Mapping from Zenodo formats to Galaxy datatypes
    #[arg(long, value_name = "PATH")]
    datatypes: Option<PathBuf>,
}

impl Command {
    fn options(self) -> TrainingOptions {
        let mut options = TrainingOptions {
            topic_name: Some(self.topic.topic_name),
            tutorial_name: Some(self.tutorial_name),
            datatypes: self.datatypes,
            ..TrainingOptions::default()
        };
        self.workflow.apply(&mut options);
        options
    }

    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = Config::load_or_default(root);
        let training = Training::new(root, self.options(), &config)?;
        training.generate_tuto_from_wf()?;

        let tutorial = training.check_topic_init_tuto()?;
        println!(
            "{}",
            format!("Hands-on document of '{}' generated", tutorial.name()).success()
        );
        for path in [&tutorial.paths().tuto_fp, &tutorial.paths().wf_fp] {
            println!("  {}", path.display().to_string().dim());
        }

        Ok(())
    }
}
