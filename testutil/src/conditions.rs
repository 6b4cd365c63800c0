use k8s_openapi::api::batch::v1::JobCondition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition as MetaCondition, Time};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A status condition as written by controllers into `status.conditions`. Deserialization is
/// lenient so that conditions from any kind can be read.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

impl Condition {
    /// A condition with the given type and status, stamped with the current time.
    pub fn new<S1, S2, S3>(type_: S1, status: ConditionStatus, reason: S2, message: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            type_: type_.into(),
            status: status.to_string(),
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Some(Time(chrono::Utc::now())),
        }
    }
}

impl From<MetaCondition> for Condition {
    fn from(condition: MetaCondition) -> Self {
        Self {
            type_: condition.type_,
            status: condition.status,
            reason: condition.reason,
            message: condition.message,
            last_transition_time: Some(condition.last_transition_time),
        }
    }
}

impl From<JobCondition> for Condition {
    fn from(condition: JobCondition) -> Self {
        Self {
            type_: condition.type_,
            status: condition.status,
            reason: condition.reason.unwrap_or_default(),
            message: condition.message.unwrap_or_default(),
            last_transition_time: condition.last_transition_time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl Display for ConditionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
