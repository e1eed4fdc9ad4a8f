//! Fixed role and division taxonomy
//!
//! Nine roles, three divisions. Every role belongs to exactly one division's
//! allowed set; the validator relies on this to check deployment verdicts.

mod divisions;
mod roles;

pub use divisions::{
    division_by_name, division_for_role, division_from_verdict, Division, DIVISIONS,
};
pub use roles::{role_by_name, role_by_type, Role, RoleKeywords, ROLES, ROLE_COUNT};
