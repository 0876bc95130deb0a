//! Hosting endpoint declaration.
//!
//! A deployment manifest names the trained artifacts and the serving
//! container. From it we declare a model, an endpoint configuration and an
//! endpoint as an infrastructure template. Provisioning is left to the
//! infrastructure tooling that consumes the template.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::naming::hosted_model_name;

/// Template parameter carrying the deployment environment.
pub const ENVIRONMENT_PARAM: &str = "Environment";

/// Template parameter carrying the execution role.
pub const EXECUTION_ROLE_PARAM: &str = "SageMakerAPIExecutionRoleArn";

/// Name of the single production variant.
pub const VARIANT_NAME: &str = "variant-1";

/// Errors that can occur when reading a manifest or declaring an endpoint.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid instance_count '{0}': expected a positive integer")]
    InvalidInstanceCount(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifacts {
    #[serde(rename = "S3ModelArtifacts")]
    pub s3_model_artifacts: String,
}

/// Output of the training step, as recorded in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainedModel {
    #[serde(rename = "TrainingJobName")]
    pub training_job_name: String,

    #[serde(rename = "ModelArtifacts")]
    pub model_artifacts: ModelArtifacts,
}

/// Instance count may be written as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InstanceCount {
    Number(serde_json::Number),
    Text(String),
}

impl InstanceCount {
    fn value(&self) -> Result<u32, ManifestError> {
        let (parsed, raw) = match self {
            InstanceCount::Number(n) => (n.as_u64(), n.to_string()),
            InstanceCount::Text(s) => (s.trim().parse::<u64>().ok(), s.clone()),
        };

        parsed
            .filter(|n| *n >= 1)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(ManifestError::InvalidInstanceCount(raw))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentSettings {
    /// Serving container image
    pub container: String,
    pub instance_type: String,
    pub instance_count: InstanceCount,
}

/// Deployment manifest produced by the build pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentManifest {
    pub training: TrainedModel,
    pub deployment: DeploymentSettings,
}

impl DeploymentManifest {
    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.training.training_job_name.is_empty() {
            return Err(ManifestError::MissingField(
                "training.TrainingJobName".to_string(),
            ));
        }
        if self.deployment.container.is_empty() {
            return Err(ManifestError::MissingField(
                "deployment.container".to_string(),
            ));
        }
        self.deployment.instance_count.value()?;
        Ok(())
    }
}

/// A hosting endpoint declared from a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDeclaration {
    training_job_name: String,
    environment: Option<String>,
    image: String,
    model_data_url: String,
    instance_type: String,
    instance_count: u32,
}

impl EndpointDeclaration {
    /// Declare an endpoint for a manifest.
    ///
    /// With `environment` set the model name is a literal; otherwise it is
    /// joined from the `Environment` template parameter at deploy time.
    pub fn from_manifest(
        manifest: &DeploymentManifest,
        environment: Option<&str>,
    ) -> Result<Self, ManifestError> {
        Ok(Self {
            training_job_name: manifest.training.training_job_name.clone(),
            environment: environment.map(str::to_string),
            image: manifest.deployment.container.clone(),
            model_data_url: manifest.training.model_artifacts.s3_model_artifacts.clone(),
            instance_type: manifest.deployment.instance_type.clone(),
            instance_count: manifest.deployment.instance_count.value()?,
        })
    }

    /// Model name, when the environment is known.
    pub fn model_name(&self) -> Option<String> {
        self.environment
            .as_deref()
            .map(|env| hosted_model_name(&self.training_job_name, env))
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    fn model_name_expr(&self) -> JsonValue {
        match self.model_name() {
            Some(name) => JsonValue::String(name),
            None => json!({
                "Fn::Join": ["-", [self.training_job_name, { "Ref": ENVIRONMENT_PARAM }]]
            }),
        }
    }

    /// Render the declaration as an infrastructure template.
    pub fn to_template(&self) -> JsonValue {
        let mut environment_param = json!({ "Type": "String" });
        if let Some(env) = &self.environment {
            environment_param["Default"] = JsonValue::String(env.clone());
        }

        let model_name_attr = json!({ "Fn::GetAtt": ["Model", "ModelName"] });

        json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Parameters": {
                ENVIRONMENT_PARAM: environment_param,
                EXECUTION_ROLE_PARAM: { "Type": "String" }
            },
            "Resources": {
                "Model": {
                    "Type": "AWS::SageMaker::Model",
                    "Properties": {
                        "ExecutionRoleArn": { "Ref": EXECUTION_ROLE_PARAM },
                        "Containers": [{
                            "Image": self.image,
                            "ModelDataUrl": self.model_data_url,
                            "Environment": { "SAGEMAKER_TFS_NGINX_LOGLEVEL": "info" }
                        }],
                        "ModelName": self.model_name_expr()
                    }
                },
                "EndpointConfig": {
                    "Type": "AWS::SageMaker::EndpointConfig",
                    "Properties": {
                        "ProductionVariants": [{
                            "ModelName": model_name_attr,
                            "VariantName": VARIANT_NAME,
                            "InstanceType": self.instance_type,
                            "InitialInstanceCount": self.instance_count,
                            "InitialVariantWeight": 1.0
                        }],
                        "EndpointConfigName": model_name_attr
                    }
                },
                "Endpoint": {
                    "Type": "AWS::SageMaker::Endpoint",
                    "Properties": {
                        "EndpointConfigName": { "Fn::GetAtt": ["EndpointConfig", "EndpointConfigName"] },
                        "EndpointName": model_name_attr
                    }
                }
            }
        })
    }
}
