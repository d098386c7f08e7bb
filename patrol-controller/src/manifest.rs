//! Job manifest templating
//!
//! Specializes the base job manifest for one run. Only the job name,
//! namespace, run label (on the job and its pod template), container image and
//! container arguments are overridden; every other field of the base manifest
//! passes through untouched.

use patrol_core::domain::run::RunIdentity;
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every probe job name
pub const JOB_NAME_PREFIX: &str = "ping-patrol-tester-job-";

/// Label carrying the run identity on the job and its pods
pub const RUN_LABEL: &str = "job-id";

/// Errors raised while loading or specializing the base manifest
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read job template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job template: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Job template is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Job template field '{0}' must be a mapping")]
    NotAMapping(&'static str),
}

/// Job name for a run
pub fn job_name(run_id: &RunIdentity) -> String {
    format!("{}{}", JOB_NAME_PREFIX, run_id)
}

/// Loads a base manifest from a YAML or JSON file
pub fn load_template(path: &Path) -> Result<JsonValue, TemplateError> {
    let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_template(&text)
}

/// Parses a base manifest; YAML being a superset of JSON, both are accepted
pub fn parse_template(text: &str) -> Result<JsonValue, TemplateError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Where and with which image the probe job runs
#[derive(Debug, Clone)]
pub struct Placement {
    pub namespace: String,
    pub image: String,
}

/// A concrete manifest for one run
#[derive(Debug, Clone)]
pub struct JobManifest {
    document: JsonValue,
    name: String,
    container: Option<String>,
}

impl JobManifest {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the probe agent container, when the template names it
    pub fn container_name(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Arguments of the probe agent container
    pub fn container_args(&self) -> Vec<&str> {
        self.document
            .pointer("/spec/template/spec/containers/0/args")
            .and_then(JsonValue::as_array)
            .map(|args| args.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.document)
    }
}

/// Specializes `base` for one run
///
/// Fails before touching anything if `metadata` or
/// `spec.template.spec.containers[0]` is missing; unknown fields are kept.
pub fn template(
    base: &JsonValue,
    placement: &Placement,
    run_id: &RunIdentity,
    destinations: &[String],
) -> Result<JobManifest, TemplateError> {
    if !base.get("metadata").is_some_and(JsonValue::is_object) {
        return Err(TemplateError::MissingField("metadata"));
    }
    if !base
        .pointer("/spec/template/spec/containers/0")
        .is_some_and(JsonValue::is_object)
    {
        return Err(TemplateError::MissingField("spec.template.spec.containers[0]"));
    }

    let mut document = base.clone();
    let name = job_name(run_id);

    let metadata = object_at(&mut document, "/metadata", "metadata")?;
    metadata.insert("name".to_string(), JsonValue::String(name.clone()));
    metadata.insert(
        "namespace".to_string(),
        JsonValue::String(placement.namespace.clone()),
    );
    insert_run_label(metadata, run_id, "metadata.labels")?;

    let pod_template = object_at(&mut document, "/spec/template", "spec.template")?;
    let pod_metadata = pod_template
        .entry("metadata")
        .or_insert_with(|| JsonValue::Object(Map::new()))
        .as_object_mut()
        .ok_or(TemplateError::NotAMapping("spec.template.metadata"))?;
    insert_run_label(pod_metadata, run_id, "spec.template.metadata.labels")?;

    let container = object_at(
        &mut document,
        "/spec/template/spec/containers/0",
        "spec.template.spec.containers[0]",
    )?;
    container.insert(
        "image".to_string(),
        JsonValue::String(placement.image.clone()),
    );
    container.insert(
        "args".to_string(),
        JsonValue::Array(vec![
            JsonValue::String("--destinations".to_string()),
            JsonValue::String(destinations.join(",")),
        ]),
    );
    let container_name = container
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    Ok(JobManifest {
        document,
        name,
        container: container_name,
    })
}

fn object_at<'a>(
    document: &'a mut JsonValue,
    pointer: &str,
    field: &'static str,
) -> Result<&'a mut Map<String, JsonValue>, TemplateError> {
    document
        .pointer_mut(pointer)
        .ok_or(TemplateError::MissingField(field))?
        .as_object_mut()
        .ok_or(TemplateError::NotAMapping(field))
}

fn insert_run_label(
    metadata: &mut Map<String, JsonValue>,
    run_id: &RunIdentity,
    field: &'static str,
) -> Result<(), TemplateError> {
    let labels = metadata
        .entry("labels")
        .or_insert_with(|| JsonValue::Object(Map::new()))
        .as_object_mut()
        .ok_or(TemplateError::NotAMapping(field))?;
    labels.insert(
        RUN_LABEL.to_string(),
        JsonValue::String(run_id.to_string()),
    );
    Ok(())
}

/// A loaded base manifest plus the placement every run shares
#[derive(Debug, Clone)]
pub struct Templater {
    base: JsonValue,
    placement: Placement,
}

impl Templater {
    pub fn new(base: JsonValue, placement: Placement) -> Self {
        Self { base, placement }
    }

    pub fn render(
        &self,
        run_id: &RunIdentity,
        destinations: &[String],
    ) -> Result<JobManifest, TemplateError> {
        template(&self.base, &self.placement, run_id, destinations)
    }
}
