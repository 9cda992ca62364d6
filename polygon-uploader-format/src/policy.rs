use polygon_uploader_api::{FeedbackPolicy, PointsPolicy};

use crate::{GroupId, SAMPLES_GROUP};

/// The scoring and feedback policy declared for a group once all its tests are uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPolicy {
    /// How the points of the group are awarded.
    pub points_policy: PointsPolicy,
    /// How much feedback the participants get.
    pub feedback_policy: FeedbackPolicy,
}

impl GroupPolicy {
    /// The samples report each test independently and in full, every other group reports only
    /// pass/fail like an ICPC subtask.
    pub fn for_group(id: GroupId) -> GroupPolicy {
        if id == SAMPLES_GROUP {
            GroupPolicy {
                points_policy: PointsPolicy::EachTest,
                feedback_policy: FeedbackPolicy::Complete,
            }
        } else {
            GroupPolicy {
                points_policy: PointsPolicy::CompleteGroup,
                feedback_policy: FeedbackPolicy::Icpc,
            }
        }
    }
}
