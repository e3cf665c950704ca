pub mod executor;
pub mod identifiers;
pub mod planner;

pub use executor::Provisioner;
pub use identifiers::IdentifierPolicy;
pub use planner::{plan, PlanPolicy, Tenant};
