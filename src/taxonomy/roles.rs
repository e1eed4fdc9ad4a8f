use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Keyword lists describing the themes a role tends to write about.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoleKeywords {
    pub research: &'static [&'static str],
    pub technical: &'static [&'static str],
    pub impact: &'static [&'static str],
    pub stability: &'static [&'static str],
}

impl RoleKeywords {
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.research
            .iter()
            .chain(self.technical)
            .chain(self.impact)
            .chain(self.stability)
            .copied()
    }
}

/// One of the nine fixed personality archetypes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Role {
    /// 1-based index used as `spectralType` in model replies
    pub spectral_type: u8,
    pub name: &'static str,
    pub motto: &'static str,
    pub keywords: RoleKeywords,
}

impl Role {
    /// Counts keyword hits in `text`, case-insensitive, matching at word starts.
    pub fn keyword_hits(&self, text: &str) -> usize {
        ROLE_PATTERNS[self.index()].find_iter(text).count()
    }

    fn index(&self) -> usize {
        usize::from(self.spectral_type - 1)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.spectral_type)
    }
}

pub const ROLE_COUNT: usize = 9;

pub static ROLES: [Role; ROLE_COUNT] = [
    Role {
        spectral_type: 1,
        name: "Theory Architect",
        motto: "Every system begins as a hypothesis.",
        keywords: RoleKeywords {
            research: &["theory", "theories", "hypothes", "abstraction", "first principles"],
            technical: &["formal", "proof", "mathemat"],
            impact: &["paradigm", "foundational"],
            stability: &["rigor", "axiom"],
        },
    },
    Role {
        spectral_type: 2,
        name: "Field Researcher",
        motto: "Data from the wild beats data from the lab.",
        keywords: RoleKeywords {
            research: &["observation", "survey", "interview", "field notes", "ethnograph"],
            technical: &["dataset", "sampling"],
            impact: &["insight", "user behavior"],
            stability: &["longitudinal", "replicat"],
        },
    },
    Role {
        spectral_type: 3,
        name: "Lab Orchestrator",
        motto: "Many instruments, one score.",
        keywords: RoleKeywords {
            research: &["coordinat", "roadmap"],
            technical: &["orchestrat", "pipeline", "workflow", "integration"],
            impact: &["alignment", "cross-team"],
            stability: &["cadence", "playbook"],
        },
    },
    Role {
        spectral_type: 4,
        name: "Protocol Engineer",
        motto: "Consensus is a feature.",
        keywords: RoleKeywords {
            research: &["rfc", "standards"],
            technical: &["protocol", "consensus", "cryptograph", "smart contract", "onchain"],
            impact: &["interoperab", "decentraliz"],
            stability: &["backward compatib", "invariant"],
        },
    },
    Role {
        spectral_type: 5,
        name: "Toolsmith",
        motto: "Sharpen the tools and the work sharpens itself.",
        keywords: RoleKeywords {
            research: &["benchmark", "prototyp"],
            technical: &["tooling", "command-line", "library", "sdk", "developer experience"],
            impact: &["productivity", "open source"],
            stability: &["maintenance", "refactor"],
        },
    },
    Role {
        spectral_type: 6,
        name: "Signal Amplifier",
        motto: "Good ideas deserve a megaphone.",
        keywords: RoleKeywords {
            research: &["trend", "curat"],
            technical: &["thread", "newsletter", "storytell"],
            impact: &["reach", "audience", "viral", "amplif"],
            stability: &["consistency", "daily"],
        },
    },
    Role {
        spectral_type: 7,
        name: "Community Catalyst",
        motto: "Rooms come alive when someone strikes the first spark.",
        keywords: RoleKeywords {
            research: &["feedback", "listening"],
            technical: &["event", "hackathon", "onboarding"],
            impact: &["community", "mentor", "belonging", "collaborat"],
            stability: &["ritual", "weekly"],
        },
    },
    Role {
        spectral_type: 8,
        name: "Anomaly Hunter",
        motto: "The outlier is the signal.",
        keywords: RoleKeywords {
            research: &["anomal", "outlier", "edge case", "exploit"],
            technical: &["fuzzing", "reverse engineer", "audit"],
            impact: &["vulnerab", "disclosure"],
            stability: &["incident", "postmortem"],
        },
    },
    Role {
        spectral_type: 9,
        name: "Stability Warden",
        motto: "Uptime is a form of kindness.",
        keywords: RoleKeywords {
            research: &["risk", "reliabilit"],
            technical: &["monitoring", "infrastructure", "uptime", "on-call"],
            impact: &["trust", "safety"],
            stability: &["resilien", "redundan", "guardrail"],
        },
    },
];

static ROLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ROLES
        .iter()
        .map(|role| {
            let alternation = role
                .keywords
                .iter()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{})", alternation))
                .expect("role keyword pattern is valid")
        })
        .collect()
});

/// Looks up a role by its `spectralType` (1-9).
pub fn role_by_type(spectral_type: u8) -> Option<&'static Role> {
    ROLES.iter().find(|r| r.spectral_type == spectral_type)
}

/// Looks up a role by display name, ignoring ASCII case.
pub fn role_by_name(name: &str) -> Option<&'static Role> {
    ROLES.iter().find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_roles_are_numbered_one_to_nine() {
        for (i, role) in ROLES.iter().enumerate() {
            assert_eq!(usize::from(role.spectral_type), i + 1);
        }
    }

    #[test]
    fn test_role_names_unique() {
        let names: HashSet<_> = ROLES.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), ROLE_COUNT);
    }

    #[test]
    fn test_role_lookup() {
        assert_eq!(role_by_type(3).unwrap().name, "Lab Orchestrator");
        assert!(role_by_type(0).is_none());
        assert!(role_by_type(10).is_none());
        assert_eq!(role_by_name("toolsmith").unwrap().spectral_type, 5);
        assert!(role_by_name("Wizard").is_none());
    }

    #[test]
    fn test_keyword_hits() {
        let warden = role_by_type(9).unwrap();
        let text = "Obsessed with uptime, monitoring and resilient infrastructure.";
        assert_eq!(warden.keyword_hits(text), 4);

        let architect = role_by_type(1).unwrap();
        assert_eq!(architect.keyword_hits(text), 0);
    }

    #[test]
    fn test_keyword_hits_case_insensitive() {
        let catalyst = role_by_type(7).unwrap();
        assert_eq!(catalyst.keyword_hits("COMMUNITY first, Weekly calls"), 2);
    }
}
