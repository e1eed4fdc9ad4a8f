use super::roles::{role_by_type, Role};
use serde::Serialize;
use std::fmt;

/// A grouping that owns a disjoint subset of roles.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Division {
    pub name: &'static str,
    pub focus: &'static str,
    /// Spectral types of the roles this division accepts
    pub allowed_roles: &'static [u8],
}

impl Division {
    pub fn allows(&self, spectral_type: u8) -> bool {
        self.allowed_roles.contains(&spectral_type)
    }

    pub fn roles(&self) -> impl Iterator<Item = &'static Role> + '_ {
        self.allowed_roles.iter().filter_map(|t| role_by_type(*t))
    }

    /// The literal prefix every deployment verdict for this division starts with.
    pub fn verdict_prefix(&self) -> String {
        format!("Assigned to {}: ", self.name)
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub static DIVISIONS: [Division; 3] = [
    Division {
        name: "Experimental Research Unit",
        focus: "Generating new knowledge: theory, fieldwork and hunting down the anomalies \
                that break existing models.",
        allowed_roles: &[1, 2, 8],
    },
    Division {
        name: "Systems Integration Lab",
        focus: "Turning ideas into working systems: coordinating pipelines, designing \
                protocols and building the tools other people depend on.",
        allowed_roles: &[3, 4, 5],
    },
    Division {
        name: "Applied Impact Division",
        focus: "Carrying work out into the world: amplifying signal, growing communities \
                and keeping shared infrastructure safe and stable.",
        allowed_roles: &[6, 7, 9],
    },
];

pub fn division_by_name(name: &str) -> Option<&'static Division> {
    DIVISIONS.iter().find(|d| d.name == name)
}

/// Returns the division whose allowed set contains `spectral_type`.
pub fn division_for_role(spectral_type: u8) -> Option<&'static Division> {
    DIVISIONS.iter().find(|d| d.allows(spectral_type))
}

/// Finds the division whose verdict prefix `verdict` starts with.
pub fn division_from_verdict(verdict: &str) -> Option<&'static Division> {
    DIVISIONS
        .iter()
        .find(|d| verdict.starts_with(&d.verdict_prefix()))
}
