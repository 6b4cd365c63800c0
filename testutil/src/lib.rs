/*!

Helpers for tests of Kubernetes operators. The crate is meant to be used with a client from
[`envtest`](../envtest/index.html) or any other `kube::Client`.

- [`assertions`]: condition and existence checks that report through a [`Reporter`] instead of
  stopping the test at the first failure.
- [`builders`]: fluent builders for objects that tests create often.
- [`simulators`]: stand-ins that write the terminal status of objects whose controllers are not
  running.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub mod assertions;
pub mod builders;
mod conditions;
mod error;
pub mod merge_patch;
#[cfg(test)]
mod mock;
pub mod simulators;
pub mod status_code;
pub mod unstructured;

pub use assertions::{Reporter, SoftAssertions};
pub use conditions::{Condition, ConditionStatus};
pub use error::{Error, Result};
pub use merge_patch::MergePatch;
pub use status_code::HttpStatusCode;
