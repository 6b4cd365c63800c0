use super::helpers::{create_or_fetch, patch_status};
use crate::error::Result;
use k8s_openapi::api::batch::v1::{Job, JobCondition, JobSpec, JobStatus};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::{Api, Client};

/// Writes the status the job controller writes once a `Job` has succeeded. The job is created
/// first if it does not exist.
pub async fn simulate_job_complete(client: &Client, name: &str, namespace: &str) -> Result<Job> {
    let api: Api<Job> = Api::namespaced(client.clone(), namespace);
    let existing = create_or_fetch(&api, &job(name, namespace), "Job").await?;

    let now = Time(chrono::Utc::now());
    let mut modified = existing.clone();
    let status = modified.status.get_or_insert_with(JobStatus::default);
    status.succeeded = Some(1);
    status.start_time = Some(now.clone());
    status.completion_time = Some(now.clone());
    status.conditions = Some(vec![
        condition(
            "SuccessCriteriaMet",
            "Job success criteria met",
            now.clone(),
        ),
        condition("Complete", "Job completed", now),
    ]);
    patch_status(&api, "Job", &existing, &modified).await
}

fn job(name: &str, namespace: &str) -> Job {
    Job {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..ObjectMeta::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "job".to_owned(),
                        image: Some("busybox".to_owned()),
                        ..Container::default()
                    }],
                    restart_policy: Some(String::from("Never")),
                    ..PodSpec::default()
                }),
                ..PodTemplateSpec::default()
            },
            ..JobSpec::default()
        }),
        ..Job::default()
    }
}

fn condition(type_: &str, message: &str, now: Time) -> JobCondition {
    JobCondition {
        type_: type_.to_owned(),
        status: "True".to_owned(),
        reason: Some(type_.to_owned()),
        message: Some(message.to_owned()),
        last_transition_time: Some(now),
        ..JobCondition::default()
    }
}
