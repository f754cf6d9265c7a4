use std::path::{Path, PathBuf};

use tracing::instrument;
use training::{Config, Training, TrainingOptions};

use super::{TopicArgs, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    topic: TopicArgs,

    /// Directory name of the tutorial
    #[arg(long, value_name = "NAME")]
    tutorial_name: String,

    /// Zenodo record with the input data
    ///
    /// Replaces the link stored in the tutorial metadata.
    #[arg(long, value_name = "URL")]
    zenodo_link: Option<String>,

    /// Mapping from Zenodo formats to Galaxy datatypes
    #[arg(long, value_name = "PATH")]
    datatypes: Option<PathBuf>,
}

impl Command {
    fn options(self) -> TrainingOptions {
        TrainingOptions {
            topic_name: Some(self.topic.topic_name),
            tutorial_name: Some(self.tutorial_name),
            zenodo_link: self.zenodo_link,
            datatypes: self.datatypes,
            ..TrainingOptions::default()
        }
    }

    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = Config::load_or_default(root);
        let training = Training::new(root, self.options(), &config)?;
        training.fill_data_library()?;

        let tutorial = training.check_topic_init_tuto()?;
        println!(
            "{}",
            format!(
                "Data library of '{}' filled from {}",
                tutorial.name(),
                tutorial.zenodo_link
            )
            .success()
        );
        println!(
            "  {}",
            tutorial.paths().data_lib_fp.display().to_string().dim()
        );

        Ok(())
    }
}
