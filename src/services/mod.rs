pub mod activity_log;
pub mod provisioner;

pub use activity_log::ActivityLog;
pub use provisioner::DocumentProvisioner;
