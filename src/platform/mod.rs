//! Typed accessors for platform resources.

mod client;
mod query;

pub use client::{ClientOptions, PlatformClient};
pub use query::ListQuery;

/// Resource type labels used by the accessors.
pub mod kinds {
  pub const EMPLOYEES: &str = "employees";
  pub const FLOWS: &str = "flows";
  pub const EMPLOYEE_SCREENING_FLOWS: &str = "employee-screening-flows";
  pub const LOCATIONS: &str = "locations";
  pub const INVITES: &str = "invites";
  pub const USERS: &str = "users";
}
