use std::path::{Path, PathBuf};

use super::{Config, Error, Topic, TopicType, Tutorial};
use crate::remote::{GalaxyClient, ZenodoClient};

/// The options of one invocation.
///
/// Every field is optional; unset fields fall back to the configuration of
/// the material or to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingOptions {
    /// Directory name of the topic.
    pub topic_name: Option<String>,
    /// Title of the topic.
    pub topic_title: Option<String>,
    /// Audience of the topic.
    pub topic_target: Option<TopicType>,
    /// Summary of the topic.
    pub topic_summary: Option<String>,
    /// Directory name of the tutorial.
    pub tutorial_name: Option<String>,
    /// Title of the tutorial.
    pub tutorial_title: Option<String>,
    /// Skip the hands-on document.
    pub no_hands_on: bool,
    /// Write a slide deck.
    pub slides: bool,
    /// Local workflow file.
    pub workflow: Option<PathBuf>,
    /// Id of a workflow stored on Galaxy.
    pub workflow_id: Option<String>,
    /// Zenodo record with the input data.
    pub zenodo_link: Option<String>,
    /// Mapping from Zenodo formats to Galaxy datatypes.
    pub datatypes: Option<PathBuf>,
    /// Base URL of the Galaxy instance.
    pub galaxy_url: Option<String>,
    /// API key for that Galaxy instance.
    pub galaxy_api_key: Option<String>,
}

/// What [`Training::init_training`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Created {
    /// The topic did not exist and was created.
    pub topic: bool,
    /// A tutorial name was given, the tutorial did not exist and was
    /// created.
    pub tutorial: bool,
}

/// One invocation against the training material at a root directory.
///
/// A session owns the [`Topic`] it works on. Tutorials are built on demand
/// and borrow the session.
#[derive(Debug)]
pub struct Training {
    options: TrainingOptions,
    root: PathBuf,
    topics_dir: PathBuf,
    /// The topic named by the options.
    pub topic: Topic,
    galaxy_url: Option<String>,
    galaxy_api_key: Option<String>,
    datatypes: PathBuf,
    zenodo: ZenodoClient,
}

impl Training {
    /// Start a session for the material at `root`.
    ///
    /// The topic comes from the options. When its metadata is already on
    /// disk, the stored title, summary and type take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored topic metadata cannot be read or the
    /// HTTP client cannot be initialised.
    pub fn new(root: &Path, options: TrainingOptions, config: &Config) -> Result<Self, Error> {
        let topics_dir = root.join(&config.topics_dir);
        let mut topic = Topic::default()
            .with_parent_dir(&topics_dir)
            .with_metadata_dir(root.join(&config.metadata_dir));
        topic.init_from_kwds(&options);
        if topic.metadata_fp().is_file() {
            tracing::debug!("loading topic metadata from {}", topic.metadata_fp().display());
            topic.init_from_metadata()?;
        }

        let galaxy_url = options
            .galaxy_url
            .clone()
            .or_else(|| config.galaxy_url.clone());
        let galaxy_api_key = options
            .galaxy_api_key
            .clone()
            .or_else(|| config.galaxy_api_key.clone());
        let datatypes = options
            .datatypes
            .clone()
            .unwrap_or_else(|| root.join(&config.datatypes));

        Ok(Self {
            zenodo: ZenodoClient::new(config.zenodo_api.as_str())?,
            options,
            root: root.to_path_buf(),
            topics_dir,
            topic,
            galaxy_url,
            galaxy_api_key,
            datatypes,
        })
    }

    /// The root of the material.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the topics.
    #[must_use]
    pub fn topics_dir(&self) -> &Path {
        &self.topics_dir
    }

    /// The options of the invocation.
    #[must_use]
    pub const fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Base URL of the configured Galaxy, if any.
    #[must_use]
    pub fn galaxy_url(&self) -> Option<&str> {
        self.galaxy_url.as_deref()
    }

    /// The datatype mapping file.
    #[must_use]
    pub fn datatypes(&self) -> &Path {
        &self.datatypes
    }

    /// The Zenodo client.
    #[must_use]
    pub const fn zenodo(&self) -> &ZenodoClient {
        &self.zenodo
    }

    /// A client for the configured Galaxy, when both a URL and an API key
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn galaxy_client(&self) -> Result<Option<GalaxyClient>, Error> {
        let url = self.galaxy_url.as_deref().filter(|url| !url.is_empty());
        let key = self.galaxy_api_key.as_deref().filter(|key| !key.is_empty());
        match (url, key) {
            (Some(url), Some(key)) => Ok(Some(GalaxyClient::new(url, key)?)),
            _ => Ok(None),
        }
    }

    fn tutorial_name(&self) -> Option<&str> {
        self.options
            .tutorial_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    fn check_tutorial_options(&self) -> Result<(), Error> {
        if self.tutorial_name().is_some() {
            return Ok(());
        }
        if self.options.slides {
            return Err(Error::Configuration(
                "A tutorial name is needed to create the skeleton of a tutorial slide deck"
                    .to_string(),
            ));
        }
        if self.options.workflow.is_some() || self.options.workflow_id.is_some() {
            return Err(Error::Configuration(
                "A tutorial name is needed to create the skeleton of the tutorial from a workflow"
                    .to_string(),
            ));
        }
        if self.options.zenodo_link.is_some() {
            return Err(Error::Configuration(
                "A tutorial name is needed to add Zenodo information".to_string(),
            ));
        }
        Ok(())
    }

    /// Create the topic if it is missing and, when a tutorial name is given,
    /// the tutorial if it is missing.
    ///
    /// The options are checked before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if tutorial options are given without
    /// a tutorial name, and an error if creating either fails.
    pub fn init_training(&self) -> Result<Created, Error> {
        self.check_tutorial_options()?;
        let mut created = Created::default();

        if !self.topic.exists() {
            tracing::info!("The topic {} does not exist. It will be created", self.topic.name);
            self.topic.create_topic_structure()?;
            created.topic = true;
        }

        if self.tutorial_name().is_some() {
            let mut tutorial = Tutorial::from_options(self, &self.topic, &self.options);
            if tutorial.exists() {
                tracing::debug!(
                    "The tutorial {} in topic {} already exists",
                    tutorial.name(),
                    self.topic.name
                );
            } else {
                tracing::info!(
                    "The tutorial {} in topic {} does not exist. It will be created.",
                    tutorial.name(),
                    self.topic.name
                );
                tutorial.create_tutorial()?;
                created.tutorial = true;
            }
        }

        Ok(created)
    }

    /// Load the tutorial named by the options from an existing topic.
    ///
    /// The workflow and datatype options override the stored values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the topic or tutorial does not exist,
    /// and [`Error::Configuration`] if no tutorial name is given.
    pub fn check_topic_init_tuto(&self) -> Result<Tutorial<'_>, Error> {
        if !self.topic.exists() {
            return Err(Error::not_found("topic", self.topic.dir()));
        }
        let Some(name) = self.tutorial_name() else {
            return Err(Error::Configuration(
                "A tutorial name is needed to work on an existing tutorial".to_string(),
            ));
        };

        let mut tutorial = Tutorial::from_existing(self, &self.topic, name)?;
        if let Some(datatypes) = &self.options.datatypes {
            tutorial.datatype_fp.clone_from(datatypes);
        }
        if let Some(workflow) = &self.options.workflow {
            tutorial.init_wf_fp = Some(workflow.clone());
        }
        if let Some(workflow_id) = &self.options.workflow_id {
            tutorial.init_wf_id = Some(workflow_id.clone());
        }
        Ok(tutorial)
    }

    /// Fill the data library of an existing tutorial from Zenodo.
    ///
    /// A Zenodo link in the options replaces the one stored in the tutorial
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if there is no Zenodo link at all,
    /// and an error if the tutorial cannot be loaded or Zenodo fails.
    pub fn fill_data_library(&self) -> Result<(), Error> {
        let mut tutorial = self.check_topic_init_tuto()?;
        let link = self
            .options
            .zenodo_link
            .as_deref()
            .filter(|link| !link.is_empty());

        match (link, tutorial.zenodo_link.is_empty()) {
            (Some(link), false) => {
                tracing::info!(
                    "The data library and the metadata will be updated with the new Zenodo link"
                );
                link.clone_into(&mut tutorial.zenodo_link);
            }
            (None, false) => {
                tracing::info!(
                    "The data library will be extracted using the Zenodo link in the metadata of the tutorial"
                );
            }
            (Some(link), true) => {
                tracing::info!(
                    "The data library will be created and the metadata will be filled with the new Zenodo link"
                );
                link.clone_into(&mut tutorial.zenodo_link);
            }
            (None, true) => {
                return Err(Error::Configuration(
                    "A Zenodo link should be provided either in the metadata file or as argument of the command"
                        .to_string(),
                ));
            }
        }

        tutorial.prepare_data_library_from_zenodo()?;
        tutorial.write_hands_on_tutorial()
    }

    /// Regenerate the hands-on document of an existing tutorial from a
    /// workflow and store the workflow next to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no workflow file or id is given,
    /// and an error if the tutorial cannot be loaded or the workflow
    /// converted.
    pub fn generate_tuto_from_wf(&self) -> Result<(), Error> {
        let mut tutorial = self.check_topic_init_tuto()?;
        if !tutorial.has_workflow() {
            return Err(Error::Configuration(
                "A path to a local workflow or the id of a workflow on a running Galaxy instance should be provided"
                    .to_string(),
            ));
        }

        tutorial.create_hands_on_tutorial()?;
        tutorial.export_workflow_file()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mockito::Matcher;
    use serde_json::json;
    use serde_yaml::Value;
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;
    use crate::{DataLibrary, storage::load_yaml};

    fn options(tutorial: Option<&str>) -> TrainingOptions {
        TrainingOptions {
            topic_name: Some("sequence-analysis".to_string()),
            topic_title: Some("Sequence analysis".to_string()),
            topic_summary: Some("Reads in, variants out".to_string()),
            tutorial_name: tutorial.map(ToString::to_string),
            tutorial_title: tutorial.map(|name| format!("Title of {name}")),
            ..TrainingOptions::default()
        }
    }

    fn training(tmp: &TempDir, options: TrainingOptions) -> Training {
        Training::new(tmp.path(), options, &Config::default()).unwrap()
    }

    fn write_workflow(tmp: &TempDir) -> PathBuf {
        let path = tmp.path().join("workflow.ga");
        fs::write(&path, workflow().to_string()).unwrap();
        path
    }

    fn workflow() -> serde_json::Value {
        json!({
            "name": "wf",
            "steps": {
                "0": {"id": 0, "name": "Input dataset", "type": "data_input", "tool_state": "{}"},
                "1": {"id": 1, "name": "Sort", "type": "tool", "tool_id": "sort1",
                      "tool_state": "{\"order\": \"\\\"DESC\\\"\", \"input\": {\"__class__\": \"ConnectedValue\"}}",
                      "input_connections": {"input": {"id": 0, "output_name": "output"}}}
            }
        })
    }

    #[test]
    fn options_override_config() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            galaxy_url: Some("https://config.example.org".to_string()),
            galaxy_api_key: Some("config-key".to_string()),
            ..Config::default()
        };
        let options = TrainingOptions {
            galaxy_url: Some("https://cli.example.org".to_string()),
            datatypes: Some(PathBuf::from("types.yaml")),
            ..options(None)
        };

        let training = Training::new(tmp.path(), options, &config).unwrap();

        assert_eq!(training.galaxy_url(), Some("https://cli.example.org"));
        assert_eq!(training.datatypes(), Path::new("types.yaml"));
        assert_eq!(training.topics_dir(), tmp.path().join("topics"));
        assert_eq!(training.topic.dir(), tmp.path().join("topics").join("sequence-analysis"));
        let client = training.galaxy_client().unwrap().unwrap();
        assert_eq!(client.url(), "https://cli.example.org");
    }

    #[test]
    fn galaxy_client_needs_url_and_key() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, TrainingOptions {
            galaxy_url: Some("https://usegalaxy.org".to_string()),
            ..options(None)
        });

        assert!(training.galaxy_client().unwrap().is_none());
    }

    #[test_case(TrainingOptions { slides: true, ..options(None) }; "slides")]
    #[test_case(TrainingOptions { workflow: Some(PathBuf::from("wf.ga")), ..options(None) }; "workflow file")]
    #[test_case(TrainingOptions { workflow_id: Some("ID".to_string()), ..options(None) }; "workflow id")]
    #[test_case(TrainingOptions { zenodo_link: Some("https://zenodo.org/record/1".to_string()), ..options(None) }; "zenodo link")]
    fn tutorial_options_need_a_tutorial_name(options: TrainingOptions) {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options);

        let result = training.init_training();

        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(!training.topic.exists());
    }

    #[test]
    fn existing_topic_with_other_type() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("topics").join("sequence-analysis");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("metadata.yaml"),
            "---\nname: sequence-analysis\ntype: admin-dev\ntitle: Stored title\nsummary: Stored summary\n",
        )
        .unwrap();

        let training = training(&tmp, options(Some("qc")));
        let created = training.init_training().unwrap();

        assert_eq!(training.topic.kind, TopicType::Other("admin-dev".to_string()));
        assert_eq!(created, Created { topic: false, tutorial: true });
        let metadata: Value = load_yaml(&training.topic.metadata_fp()).unwrap();
        assert_eq!(metadata["type"], Value::from("admin-dev"));
    }

    #[test]
    fn init_topic_only() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(None));

        let created = training.init_training().unwrap();

        assert_eq!(created, Created { topic: true, tutorial: false });
        assert!(training.topic.metadata_fp().is_file());
        assert!(fs::read_dir(training.topic.tuto_folder()).unwrap().next().is_none());
    }

    #[test]
    fn init_topic_and_tutorial() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(Some("qc")));

        let created = training.init_training().unwrap();

        assert_eq!(created, Created { topic: true, tutorial: true });
        let tuto_fp = training.topic.tuto_folder().join("qc").join("tutorial.md");
        assert!(tuto_fp.is_file());
        let metadata: Value = load_yaml(&training.topic.metadata_fp()).unwrap();
        assert_eq!(metadata["title"], Value::from("Sequence analysis"));
        assert_eq!(metadata["material"][0]["name"], Value::from("qc"));
    }

    #[test]
    fn init_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        training(&tmp, options(Some("qc"))).init_training().unwrap();

        let created = training(&tmp, options(Some("qc"))).init_training().unwrap();

        assert_eq!(created, Created::default());
    }

    #[test]
    fn second_tutorial_in_existing_topic() {
        let tmp = TempDir::new().unwrap();
        training(&tmp, options(Some("qc"))).init_training().unwrap();

        let training = training(&tmp, TrainingOptions {
            topic_title: Some("Ignored title".to_string()),
            ..options(Some("mapping"))
        });
        let created = training.init_training().unwrap();

        assert_eq!(created, Created { topic: false, tutorial: true });
        assert_eq!(training.topic.title, "Sequence analysis");
        let metadata: Value = load_yaml(&training.topic.metadata_fp()).unwrap();
        let names: Vec<_> = metadata["material"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|material| material["name"].as_str())
            .collect();
        assert_eq!(names, ["qc", "mapping"]);
    }

    #[test]
    fn existing_tutorial_needs_topic() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(Some("qc")));

        let result = training.check_topic_init_tuto();

        assert!(matches!(result, Err(Error::NotFound { what: "topic", .. })));
    }

    #[test]
    fn existing_tutorial_needs_name() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(None));
        training.init_training().unwrap();

        let result = training.check_topic_init_tuto();

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn existing_tutorial_takes_workflow_options() {
        let tmp = TempDir::new().unwrap();
        training(&tmp, options(Some("qc"))).init_training().unwrap();
        let training = training(&tmp, TrainingOptions {
            workflow_id: Some("ID".to_string()),
            datatypes: Some(PathBuf::from("types.yaml")),
            ..options(Some("qc"))
        });

        let tutorial = training.check_topic_init_tuto().unwrap();

        assert_eq!(tutorial.title, "Title of qc");
        assert_eq!(tutorial.init_wf_id.as_deref(), Some("ID"));
        assert_eq!(tutorial.datatype_fp, PathBuf::from("types.yaml"));
    }

    #[test]
    fn fill_data_library_needs_a_link() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(Some("qc")));
        training.init_training().unwrap();

        let result = training.fill_data_library();

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn fill_data_library() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/api/records/1321885")
            .with_body(
                r#"{"files": [{"key": "reads.fastq", "type": "fastq",
                    "links": {"self": "https://zenodo.org/api/files/abc/reads.fastq"}}]}"#,
            )
            .create();
        let tmp = TempDir::new().unwrap();
        let config = Config {
            zenodo_api: format!("{}/api", server.url()),
            ..Config::default()
        };
        Training::new(tmp.path(), options(Some("qc")), &config)
            .unwrap()
            .init_training()
            .unwrap();
        let training = Training::new(
            tmp.path(),
            TrainingOptions {
                zenodo_link: Some("https://doi.org/10.5281/zenodo.1321885".to_string()),
                ..options(Some("qc"))
            },
            &config,
        )
        .unwrap();

        training.fill_data_library().unwrap();

        let tutorial = training.check_topic_init_tuto().unwrap();
        assert_eq!(tutorial.zenodo_link, "https://doi.org/10.5281/zenodo.1321885");
        let library = DataLibrary::load(&tutorial.paths().data_lib_fp).unwrap();
        let topic = library.folder("Sequence analysis").unwrap();
        assert_eq!(topic.description.as_deref(), Some("Reads in, variants out"));
        let metadata: Value = load_yaml(&training.topic.metadata_fp()).unwrap();
        assert_eq!(
            metadata["material"][0]["zenodo_link"],
            Value::from("https://doi.org/10.5281/zenodo.1321885")
        );
        let document = fs::read_to_string(&tutorial.paths().tuto_fp).unwrap();
        assert!(document.contains("[Zenodo](https://doi.org/10.5281/zenodo.1321885)"));
        assert!(document.contains(">    https://zenodo.org/api/files/abc/reads.fastq\n"));
        assert!(!document.contains("[Zenodo]()"));
        assert_eq!(
            tutorial.zenodo_file_links,
            ["https://zenodo.org/api/files/abc/reads.fastq"]
        );
    }

    #[test]
    fn generate_keeps_zenodo_links() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/api/records/1321885")
            .with_body(
                r#"{"files": [{"key": "reads.fastq", "type": "fastq",
                    "links": {"self": "https://zenodo.org/api/files/abc/reads.fastq"}}]}"#,
            )
            .create();
        let tmp = TempDir::new().unwrap();
        let config = Config {
            zenodo_api: format!("{}/api", server.url()),
            ..Config::default()
        };
        let with_link = TrainingOptions {
            zenodo_link: Some("https://zenodo.org/record/1321885".to_string()),
            ..options(Some("qc"))
        };
        Training::new(tmp.path(), options(Some("qc")), &config)
            .unwrap()
            .init_training()
            .unwrap();
        Training::new(tmp.path(), with_link, &config)
            .unwrap()
            .fill_data_library()
            .unwrap();
        let workflow = write_workflow(&tmp);
        let training = Training::new(
            tmp.path(),
            TrainingOptions {
                workflow: Some(workflow),
                ..options(Some("qc"))
            },
            &config,
        )
        .unwrap();

        training.generate_tuto_from_wf().unwrap();

        let tutorial = training.check_topic_init_tuto().unwrap();
        assert!(tutorial.body.contains("## Sub-step with **Sort**"));
        assert!(tutorial.body.contains("[Zenodo](https://zenodo.org/record/1321885)"));
        assert!(tutorial.body.contains(">    https://zenodo.org/api/files/abc/reads.fastq\n"));
    }

    #[test]
    fn generate_needs_a_workflow() {
        let tmp = TempDir::new().unwrap();
        let training = training(&tmp, options(Some("qc")));
        training.init_training().unwrap();

        let result = training.generate_tuto_from_wf();

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn generate_from_local_workflow() {
        let tmp = TempDir::new().unwrap();
        training(&tmp, options(Some("qc"))).init_training().unwrap();
        let workflow = write_workflow(&tmp);
        let training = training(&tmp, TrainingOptions {
            workflow: Some(workflow),
            ..options(Some("qc"))
        });

        training.generate_tuto_from_wf().unwrap();

        let tutorial = training.check_topic_init_tuto().unwrap();
        assert!(tutorial.body.contains("## Sub-step with **Sort**"));
        assert!(!tutorial.body.contains("**My Tool**"));
        assert!(tutorial.paths().wf_fp.is_file());
    }

    #[test]
    fn generate_from_running_galaxy() {
        let mut server = mockito::Server::new();
        let _user = server
            .mock("GET", "/api/users/current")
            .match_header("x-api-key", "secret")
            .with_body(r#"{"id": "f2db41e1fa331b3e", "username": "trainer"}"#)
            .create();
        let _workflow = server
            .mock("GET", "/api/workflows/abc123/download")
            .match_query(Matcher::Any)
            .with_body(workflow().to_string())
            .create();
        let _tool = server
            .mock("GET", "/api/tools/sort1")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"name": "Sort", "inputs": [
                    {"name": "input", "label": "Sort Query", "type": "data"},
                    {"name": "order", "label": "Order", "type": "select", "value": "ASC",
                     "options": [["Descending", "DESC", false], ["Ascending", "ASC", true]]}
                ]}"#,
            )
            .create();
        let tmp = TempDir::new().unwrap();
        training(&tmp, options(Some("qc"))).init_training().unwrap();
        let training = training(&tmp, TrainingOptions {
            workflow_id: Some("abc123".to_string()),
            galaxy_url: Some(server.url()),
            galaxy_api_key: Some("secret".to_string()),
            ..options(Some("qc"))
        });

        training.generate_tuto_from_wf().unwrap();

        let tutorial = training.check_topic_init_tuto().unwrap();
        assert!(tutorial.body.contains("## Sub-step with **Sort**"));
        assert!(tutorial.body.contains("Sort Query"));
        assert!(tutorial.body.contains("(Input dataset)"));
        let exported: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&tutorial.paths().wf_fp).unwrap()).unwrap();
        assert_eq!(exported, workflow());
    }
}
