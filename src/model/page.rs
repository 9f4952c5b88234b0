use crate::model::Question;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server-tracked request allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub max: u32,
    pub remaining: u32,
}

/// One page of results from the `/questions` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionsPage {
    /// Questions in the order the server delivered them
    pub items: Vec<Question>,

    /// Minimum number of seconds to wait before the next request
    #[serde(default)]
    pub backoff: Option<u64>,

    pub has_more: bool,
    pub quota_max: u32,
    pub quota_remaining: u32,
}

impl QuestionsPage {
    pub fn quota(&self) -> Quota {
        Quota {
            max: self.quota_max,
            remaining: self.quota_remaining,
        }
    }

    pub fn backoff_duration(&self) -> Option<Duration> {
        self.backoff.map(Duration::from_secs)
    }
}
