//! Resource naming for training jobs and hosted models.

use lazy_static::lazy_static;
use regex::Regex;

use crate::payload::PayloadError;

/// Longest name the training platform accepts for a job.
pub const MAX_JOB_NAME_LEN: usize = 63;

lazy_static! {
    /// Training job name rule: alphanumerics separated by single or repeated hyphens
    pub static ref JOB_NAME_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9](-*[a-zA-Z0-9])*$"
    ).unwrap();
}

/// Check a training job name against the platform's naming rule.
pub fn validate_job_name(name: &str) -> Result<(), PayloadError> {
    if name.len() > MAX_JOB_NAME_LEN {
        return Err(PayloadError::InvalidJobName {
            name: name.to_string(),
            reason: format!("longer than {} characters", MAX_JOB_NAME_LEN),
        });
    }

    if !JOB_NAME_PATTERN.is_match(name) {
        return Err(PayloadError::InvalidJobName {
            name: name.to_string(),
            reason: "must be alphanumeric with hyphens, not starting or ending with one"
                .to_string(),
        });
    }

    Ok(())
}

/// Name of the training job for one workflow execution.
///
/// `execution_id` is the last segment of the execution ARN.
pub fn training_job_name(model_prefix: &str, execution_id: &str) -> Result<String, PayloadError> {
    let name = format!("{}-{}", model_prefix, execution_id);
    validate_job_name(&name)?;
    Ok(name)
}

/// Name of the hosted model for an environment.
pub fn hosted_model_name(training_job_name: &str, environment: &str) -> String {
    format!("{}-{}", training_job_name, environment)
}
