use std::path::{Path, PathBuf};

use tracing::instrument;
use training::{Config, Training, TrainingOptions};

use super::{TopicArgs, TopicTarget, WorkflowArgs, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    topic: TopicArgs,

    /// Title of the topic
    #[arg(long, value_name = "TITLE")]
    topic_title: Option<String>,

    /// Audience of the topic
    #[arg(long, value_name = "TARGET")]
    topic_target: Option<TopicTarget>,

    /// Summary of the topic
    #[arg(long, value_name = "SUMMARY")]
    topic_summary: Option<String>,

    /// Directory name of the tutorial
    #[arg(long, value_name = "NAME")]
    tutorial_name: Option<String>,

    /// Title of the tutorial
    #[arg(long, value_name = "TITLE")]
    tutorial_title: Option<String>,

    /// Do not write a hands-on document
    #[arg(long)]
    no_hands_on: bool,

    /// Write a slide deck
    #[arg(long)]
    slides: bool,

    #[command(flatten)]
    workflow: WorkflowArgs,

    /// Zenodo record with the input data
    #[arg(long, value_name = "URL")]
    zenodo_link: Option<String>,

    /// Mapping from Zenodo formats to Galaxy datatypes
    #[arg(long, value_name = "PATH")]
    datatypes: Option<PathBuf>,
}

impl Command {
    pub(super) fn options(self) -> TrainingOptions {
        let mut options = TrainingOptions {
            topic_name: Some(self.topic.topic_name),
            topic_title: self.topic_title,
            topic_target: self.topic_target.map(Into::into),
            topic_summary: self.topic_summary,
            tutorial_name: self.tutorial_name,
            tutorial_title: self.tutorial_title,
            no_hands_on: self.no_hands_on,
            slides: self.slides,
            zenodo_link: self.zenodo_link,
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
        let created = training.init_training()?;

        let topic = &training.topic;
        if created.topic {
            println!(
                "{}",
                format!("Created topic '{}' in {}", topic.name, topic.dir().display()).success()
            );
        } else {
            println!("{}", format!("Topic '{}' already exists", topic.name).dim());
        }

        if let Some(name) = &training.options().tutorial_name {
            if created.tutorial {
                println!(
                    "{}",
                    format!(
                        "Created tutorial '{name}' in {}",
                        topic.tuto_folder().join(name).display()
                    )
                    .success()
                );
            } else {
                println!(
                    "{}",
                    format!("Tutorial '{name}' already exists; nothing was changed").warning()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn command(tutorial: Option<&str>) -> Command {
        Command {
            topic: TopicArgs {
                topic_name: "assembly".to_string(),
            },
            topic_title: Some("Assembly".to_string()),
            topic_target: Some(TopicTarget::Admin),
            topic_summary: None,
            tutorial_name: tutorial.map(ToString::to_string),
            tutorial_title: None,
            no_hands_on: false,
            slides: false,
            workflow: WorkflowArgs {
                workflow: None,
                workflow_id: None,
                galaxy_url: None,
                galaxy_api_key: None,
            },
            zenodo_link: None,
            datatypes: None,
        }
    }

    #[test]
    fn init_creates_topic_and_tutorial() {
        let tmp = tempdir().unwrap();

        command(Some("unicycler"))
            .run(tmp.path())
            .expect("init should succeed");

        let topic = tmp.path().join("topics").join("assembly");
        assert!(topic.join("metadata.yaml").is_file());
        assert!(topic.join("tutorials").join("unicycler").join("tutorial.md").is_file());
        assert!(tmp.path().join("metadata").join("assembly.yaml").is_file());
    }

    #[test]
    fn init_honours_configured_directories() {
        let tmp = tempdir().unwrap();
        let config = Config {
            topics_dir: PathBuf::from("content"),
            ..Config::default()
        };
        config.save(&Config::path(tmp.path())).unwrap();

        command(None).run(tmp.path()).expect("init should succeed");

        assert!(tmp.path().join("content").join("assembly").is_dir());
        assert!(!tmp.path().join("topics").exists());
    }

    #[test]
    fn slides_without_tutorial_fail() {
        let tmp = tempdir().unwrap();
        let command = Command {
            slides: true,
            ..command(None)
        };

        assert!(command.run(tmp.path()).is_err());
        assert!(!tmp.path().join("topics").exists());
    }
}
