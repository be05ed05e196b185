/// Timed repetitions per (scenario, tool)
pub const REPETITIONS: usize = 3;

const SINGLE: &[&str] = &["lodash"];
const SMALL: &[&str] = &["lodash", "express", "react", "axios", "chalk"];
const MEDIUM: &[&str] = &[
    "lodash", "express", "react", "axios", "chalk", "commander", "dayjs", "uuid", "debug",
    "semver",
];

/// One fixed benchmark workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub packages: &'static [&'static str],
    /// Keep `node_modules` between timed runs after one untimed priming install
    pub warm_cache: bool,
}

impl Scenario {
    pub const fn cold(name: &'static str, packages: &'static [&'static str]) -> Self {
        Self {
            name,
            packages,
            warm_cache: false,
        }
    }
}

/// The standard set, in run order
pub fn standard() -> Vec<Scenario> {
    vec![
        Scenario::cold("single-package", SINGLE),
        Scenario::cold("small-project", SMALL),
        Scenario::cold("medium-project", MEDIUM),
        Scenario {
            name: "warm-cache",
            packages: SMALL,
            warm_cache: true,
        },
    ]
}
