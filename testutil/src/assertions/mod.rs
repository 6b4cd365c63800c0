//! Checks against live objects. Failures go to a [`Reporter`] so that a test can keep running and
//! see every failing check at once.

mod conditions;
mod reporter;
mod resources;

pub use conditions::{
    assert_condition_status, conditions_of, poll_until_condition, Polling, DEFAULT_POLL_INTERVAL,
};
pub use reporter::{Reporter, SoftAssertions};
pub use resources::{assert_resource_exists, assert_resource_not_exists};
