use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{
    DataLibrary, DatatypeMap, Error, Material, Requirement, Topic, Training, TrainingOptions,
    data_library::LibraryFile,
};
use crate::{
    remote::{self, OfflineCatalog},
    storage::{TutorialDocument, templates, yaml},
    workflow::{hands_on_boxes_from_local_galaxy, hands_on_boxes_from_running_galaxy},
};

/// The front matter of `tutorial.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialMetadata {
    /// Tutorial title.
    #[serde(default)]
    pub title: String,
    /// Zenodo record with the input data.
    #[serde(default)]
    pub zenodo_link: String,
    /// Questions answered by the tutorial.
    #[serde(default)]
    pub questions: Vec<String>,
    /// Learning objectives.
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Expected duration.
    #[serde(default)]
    pub time_estimation: String,
    /// Take-home messages.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Authors of the tutorial.
    #[serde(default)]
    pub contributors: Vec<String>,
    /// Prerequisites specific to the tutorial.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<Requirement>,
}

/// The files and folders of a tutorial, derived from its name and topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialPaths {
    /// The tutorial directory.
    pub dir: PathBuf,
    /// The hands-on document.
    pub tuto_fp: PathBuf,
    /// The slide deck.
    pub slide_fp: PathBuf,
    /// The data-library manifest.
    pub data_lib_fp: PathBuf,
    /// The folder of workflows.
    pub wf_dir: PathBuf,
    /// The main workflow.
    pub wf_fp: PathBuf,
    /// The folder of interactive tours.
    pub tour_dir: PathBuf,
}

impl TutorialPaths {
    fn new(topic: &Topic, name: &str) -> Self {
        let dir = topic.tuto_folder().join(name);
        let wf_dir = dir.join("workflows");
        Self {
            tuto_fp: dir.join("tutorial.md"),
            slide_fp: dir.join("slides.html"),
            data_lib_fp: dir.join("data-library.yaml"),
            wf_fp: wf_dir.join("main_workflow.ga"),
            tour_dir: dir.join("tours"),
            wf_dir,
            dir,
        }
    }
}

/// One lesson inside a topic.
///
/// A tutorial borrows the [`Training`] session it belongs to and the
/// [`Topic`] it lives in, and cannot outlive either.
#[derive(Debug)]
pub struct Tutorial<'a> {
    training: &'a Training,
    topic: &'a Topic,
    name: String,
    paths: TutorialPaths,
    /// Human-readable title.
    pub title: String,
    /// Zenodo record with the input data; may be empty.
    pub zenodo_link: String,
    /// Whether to write a hands-on document.
    pub hands_on: bool,
    /// Whether to write a slide deck.
    pub slides: bool,
    /// Id of a workflow stored on the configured Galaxy.
    pub init_wf_id: Option<String>,
    /// Local workflow file.
    pub init_wf_fp: Option<PathBuf>,
    /// Mapping from Zenodo formats to Galaxy datatypes.
    pub datatype_fp: PathBuf,
    /// Questions answered by the tutorial.
    pub questions: Vec<String>,
    /// Learning objectives.
    pub objectives: Vec<String>,
    /// Expected duration.
    pub time_estimation: String,
    /// Take-home messages.
    pub key_points: Vec<String>,
    /// Authors of the tutorial.
    pub contributors: Vec<String>,
    /// Prerequisites specific to the tutorial.
    pub requirements: Vec<Requirement>,
    /// The data-library manifest.
    pub data_lib: DataLibrary,
    /// The markdown body of the hands-on document.
    pub body: String,
    /// Download URLs of the Zenodo files.
    pub zenodo_file_links: Vec<String>,
}

impl<'a> Tutorial<'a> {
    /// A tutorial with default values.
    #[must_use]
    pub fn new(training: &'a Training, topic: &'a Topic) -> Self {
        let name = "new_tuto".to_string();
        Self {
            training,
            topic,
            paths: TutorialPaths::new(topic, &name),
            name,
            title: "The new tutorial".to_string(),
            zenodo_link: String::new(),
            hands_on: true,
            slides: false,
            init_wf_id: None,
            init_wf_fp: None,
            datatype_fp: training.datatypes().to_path_buf(),
            questions: Vec::new(),
            objectives: Vec::new(),
            time_estimation: String::new(),
            key_points: Vec::new(),
            contributors: Vec::new(),
            requirements: Vec::new(),
            data_lib: DataLibrary::default(),
            body: templates::tutorial_body("", &templates::default_hands_on_box()),
            zenodo_file_links: Vec::new(),
        }
    }

    /// A new tutorial seeded from the options of an invocation.
    #[must_use]
    pub fn from_options(
        training: &'a Training,
        topic: &'a Topic,
        options: &TrainingOptions,
    ) -> Self {
        let mut tutorial = Self::new(training, topic);

        if let Some(name) = &options.tutorial_name {
            tutorial.set_name(name);
        }
        if let Some(title) = &options.tutorial_title {
            tutorial.title.clone_from(title);
        }
        tutorial.hands_on = !options.no_hands_on;
        tutorial.slides = options.slides;
        tutorial.init_wf_id.clone_from(&options.workflow_id);
        tutorial.init_wf_fp.clone_from(&options.workflow);
        if let Some(link) = &options.zenodo_link {
            tutorial.zenodo_link.clone_from(link);
        }
        if let Some(datatypes) = &options.datatypes {
            tutorial.datatype_fp.clone_from(datatypes);
        }

        tutorial.questions = to_strings(&[
            "Which biological questions are addressed by the tutorial?",
            "Which bioinformatics techniques is important to know for this type of data?",
        ]);
        tutorial.objectives = to_strings(&[
            "The learning objectives are the goals of the tutorial",
            "They will be informed by your audience and will communicate to them and to yourself what you should focus on during the course",
            "They are single sentences describing what a learner should be able to do once they have completed the tutorial",
            "You can use Bloom's Taxonomy to write effective learning objectives",
        ]);
        tutorial.time_estimation = "3H".to_string();
        tutorial.key_points = to_strings(&[
            "The take-home messages",
            "They will appear at the end of the tutorial",
        ]);
        tutorial.contributors = to_strings(&["contributor1", "contributor2"]);
        tutorial.body = templates::tutorial_body(
            &tutorial.zenodo_link,
            &templates::default_hands_on_box(),
        );

        tutorial
    }

    /// Load a tutorial already present in the topic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the tutorial directory or its
    /// `tutorial.md` is missing, and an error if the document or the
    /// data-library manifest cannot be read.
    pub fn from_existing(
        training: &'a Training,
        topic: &'a Topic,
        name: &str,
    ) -> Result<Self, Error> {
        let mut tutorial = Self::new(training, topic);
        tutorial.set_name(name);

        if !tutorial.exists() {
            return Err(Error::not_found("tutorial", &tutorial.paths.dir));
        }
        let tuto_fp = tutorial.paths.tuto_fp.clone();
        if !tuto_fp.is_file() {
            return Err(Error::not_found("tutorial document", tuto_fp));
        }

        let document = TutorialDocument::load(&tuto_fp).map_err(|source| Error::Markdown {
            path: tuto_fp.clone(),
            source,
        })?;
        let metadata = document.metadata;
        tutorial.title = metadata.title;
        tutorial.zenodo_link = metadata.zenodo_link;
        tutorial.questions = metadata.questions;
        tutorial.objectives = metadata.objectives;
        tutorial.time_estimation = metadata.time_estimation;
        tutorial.key_points = metadata.key_points;
        tutorial.contributors = metadata.contributors;
        tutorial.requirements = metadata.requirements;
        tutorial.zenodo_file_links = templates::data_upload_links(&document.body);
        tutorial.body = document.body;
        tutorial.slides = tutorial.paths.slide_fp.is_file();

        tutorial.init_data_lib()?;
        Ok(tutorial)
    }

    /// The directory name of the tutorial.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the tutorial; every derived path follows.
    pub fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
        self.set_dir_name();
    }

    /// Recompute the paths derived from the name.
    pub fn set_dir_name(&mut self) {
        self.paths = TutorialPaths::new(self.topic, &self.name);
    }

    /// The files and folders of the tutorial.
    #[must_use]
    pub const fn paths(&self) -> &TutorialPaths {
        &self.paths
    }

    /// The topic the tutorial belongs to.
    #[must_use]
    pub const fn topic(&self) -> &Topic {
        self.topic
    }

    /// Whether the tutorial directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.paths.dir.is_dir()
    }

    /// Whether a workflow file or workflow id is available.
    #[must_use]
    pub fn has_workflow(&self) -> bool {
        self.init_wf_fp.is_some() || self.workflow_id().is_some()
    }

    fn workflow_id(&self) -> Option<&str> {
        self.init_wf_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The front matter of the hands-on document.
    #[must_use]
    pub fn metadata(&self) -> TutorialMetadata {
        TutorialMetadata {
            title: self.title.clone(),
            zenodo_link: self.zenodo_link.clone(),
            questions: self.questions.clone(),
            objectives: self.objectives.clone(),
            time_estimation: self.time_estimation.clone(),
            key_points: self.key_points.clone(),
            contributors: self.contributors.clone(),
            requirements: self.requirements.clone(),
        }
    }

    /// Render the front matter as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be serialized.
    pub fn get_tuto_metata(&self) -> Result<String, Error> {
        TutorialDocument::front_matter(&self.metadata()).map_err(|source| {
            Error::Yaml(yaml::Error::Parse {
                path: self.paths.tuto_fp.clone(),
                source,
            })
        })
    }

    /// The entry describing the tutorial in the topic metadata.
    #[must_use]
    pub fn material(&self) -> Material {
        Material {
            title: self.title.clone(),
            name: self.name.clone(),
            kind: "tutorial".to_string(),
            zenodo_link: self.zenodo_link.clone(),
            hands_on: self.hands_on,
            slides: self.slides,
            workflows: self.has_workflow() || self.paths.wf_fp.is_file(),
            questions: self.questions.clone(),
            objectives: self.objectives.clone(),
            time_estimation: self.time_estimation.clone(),
            key_points: self.key_points.clone(),
            contributors: self.contributors.clone(),
        }
    }

    /// Load the data-library manifest, or keep the in-memory one when there
    /// is no file, and make sure it has a folder for this tutorial inside the
    /// folder of its topic.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing manifest cannot be read.
    pub fn init_data_lib(&mut self) -> Result<(), Error> {
        if self.paths.data_lib_fp.is_file() {
            self.data_lib = DataLibrary::load(&self.paths.data_lib_fp)?;
        }
        self.data_lib
            .with_tutorial_folder(&self.topic.title, &self.topic.summary, &self.title, |_| ());
        Ok(())
    }

    /// Build data-library entries for the files of the Zenodo record.
    ///
    /// Returns the entries with the record id, and remembers the download
    /// URLs for the hands-on document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalService`] if Zenodo fails or the link does
    /// not resolve to a record.
    pub fn get_files_from_zenodo(&mut self) -> Result<(Vec<LibraryFile>, String), Error> {
        let (record_id, record) = self
            .training
            .zenodo()
            .get_zenodo_record(&self.zenodo_link)?;
        let Some(record_id) = record_id else {
            return Err(Error::ExternalService(remote::Error::InvalidResponse(
                format!("no Zenodo record found for '{}'", self.zenodo_link),
            )));
        };

        let datatypes = DatatypeMap::load_or_default(&self.datatype_fp);
        let mut files = Vec::with_capacity(record.files.len());
        let mut links = Vec::with_capacity(record.files.len());
        for file in &record.files {
            let ext = datatypes.datatype_or_missing(file.format());
            files.push(LibraryFile::new(
                &file.links.self_link,
                ext,
                &self.zenodo_link,
            ));
            links.push(file.links.self_link.clone());
        }
        self.zenodo_file_links = links;

        Ok((files, record_id))
    }

    /// Add the Zenodo files to the data-library manifest and save it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or written, or if
    /// Zenodo fails.
    pub fn prepare_data_library_from_zenodo(&mut self) -> Result<(), Error> {
        self.init_data_lib()?;
        let (files, record_id) = self.get_files_from_zenodo()?;

        let added = self
            .data_lib
            .with_tutorial_folder(&self.topic.title, &self.topic.summary, &self.title, |folder| {
                folder.add_files(files)
            });
        tracing::info!("{added} files from Zenodo record {record_id} added to the data library");

        self.data_lib.save(&self.paths.data_lib_fp)?;
        Ok(())
    }

    /// Write `tutorial.md` and record the tutorial in the topic metadata.
    ///
    /// The data-upload box of the body is pointed at the current Zenodo
    /// record and lists its download URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_hands_on_tutorial(&mut self) -> Result<(), Error> {
        self.body =
            templates::fill_data_upload(&self.body, &self.zenodo_link, &self.zenodo_file_links);

        let document = TutorialDocument {
            metadata: self.metadata(),
            body: self.body.clone(),
        };
        document.save(&self.paths.tuto_fp)?;

        self.topic.upsert_material(&self.material())?;
        Ok(())
    }

    /// Render the hands-on sections from the workflow, when there is one, and
    /// write the hands-on document.
    ///
    /// A workflow id is exported from the configured Galaxy. A workflow file
    /// is read locally, with tool descriptions from the configured Galaxy
    /// when there is one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a workflow id without a Galaxy
    /// URL and API key, and an error if the workflow cannot be converted or
    /// the document written.
    pub fn create_hands_on_tutorial(&mut self) -> Result<(), Error> {
        let steps = if let Some(workflow_id) = self.workflow_id() {
            let client = self.training.galaxy_client()?.ok_or_else(|| {
                Error::Configuration(
                    "A Galaxy URL and API key are needed to export a workflow by id".to_string(),
                )
            })?;
            Some(hands_on_boxes_from_running_galaxy(workflow_id, &client)?)
        } else if let Some(path) = &self.init_wf_fp {
            let steps = match self.training.galaxy_client()? {
                Some(client) => hands_on_boxes_from_local_galaxy(path, &client)?,
                None => hands_on_boxes_from_local_galaxy(path, &OfflineCatalog)?,
            };
            Some(steps)
        } else {
            None
        };

        if let Some(steps) = steps {
            self.body = templates::tutorial_body(&self.zenodo_link, &steps);
        }
        self.write_hands_on_tutorial()
    }

    /// Copy the workflow into `workflows/main_workflow.ga`.
    ///
    /// A local file is copied as-is; a workflow id is exported from Galaxy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when there is no workflow, and an
    /// error if the workflow cannot be read, exported or written.
    pub fn export_workflow_file(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.paths.wf_dir)?;

        if let Some(path) = &self.init_wf_fp {
            if !path.is_file() {
                return Err(Error::not_found("workflow file", path));
            }
            fs::copy(path, &self.paths.wf_fp)?;
        } else if let Some(workflow_id) = self.workflow_id() {
            let client = self.training.galaxy_client()?.ok_or_else(|| {
                Error::Configuration(
                    "A Galaxy URL and API key are needed to export a workflow by id".to_string(),
                )
            })?;
            let workflow = client.export_workflow_dict(workflow_id)?;
            let content = serde_json::to_string_pretty(&workflow)
                .map_err(crate::workflow::Error::from)?;
            fs::write(&self.paths.wf_fp, content)?;
        } else {
            return Err(Error::Configuration(
                "No workflow file or workflow id to export".to_string(),
            ));
        }

        tracing::debug!("workflow written to {}", self.paths.wf_fp.display());
        Ok(())
    }

    fn write_slides(&self) -> Result<(), Error> {
        let slides = templates::tutorial_slides(&self.get_tuto_metata()?);
        write(&self.paths.slide_fp, &slides)
    }

    /// Create the tutorial directory and its content.
    ///
    /// Fills the data library when a Zenodo link is set, writes the
    /// hands-on document (from the workflow, when there is one) and the
    /// slides when requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the tutorial directory exists, and
    /// an error if any step fails. Nothing is rolled back.
    pub fn create_tutorial(&mut self) -> Result<(), Error> {
        if self.exists() {
            return Err(Error::already_exists("tutorial", &self.paths.dir));
        }

        fs::create_dir_all(&self.paths.dir)?;
        fs::create_dir_all(&self.paths.tour_dir)?;
        fs::create_dir_all(&self.paths.wf_dir)?;

        if !self.zenodo_link.is_empty() {
            tracing::info!("Create the data library from Zenodo");
            self.prepare_data_library_from_zenodo()?;
        }

        if self.hands_on {
            tracing::info!("Create tutorial skeleton from workflow (if it is provided)");
            self.create_hands_on_tutorial()?;
            if self.has_workflow() {
                self.export_workflow_file()?;
            }
        }

        if self.slides {
            self.write_slides()?;
        }

        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn write(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
