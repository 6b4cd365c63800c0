//! Stand-ins for controllers that do not run in the test environment. Each simulator creates the
//! object if needed and then writes the terminal status the real controller would eventually
//! write. Running a simulator twice leaves the same state as running it once.

mod external_secret;
mod helpers;
mod job;
mod kinds;
mod ready;

pub use external_secret::simulate_external_secret_sync;
pub use helpers::create_or_fetch;
pub use job::simulate_job_complete;
pub use kinds::CustomKind;
pub use ready::{
    simulate_certificate_ready, simulate_conditions, simulate_mariadb_ready,
    simulate_memcached_ready, simulate_rabbitmq_cluster_ready, simulate_ready,
};
