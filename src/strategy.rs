// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

/// Register-allocation strategy selected when lowering IR to assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Naive,
    Greedy,
}

/// Order in which strategies are built and run for every case.
pub const DEFAULT_STRATEGY_ORDER: [Strategy; 2] = [Strategy::Naive, Strategy::Greedy];

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Greedy => "greedy",
        }
    }

    /// Flag passed to the build step to select this strategy.
    pub fn build_flag(self) -> &'static str {
        match self {
            Strategy::Naive => "--naive",
            Strategy::Greedy => "--greedy",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Strategy::Naive),
            "greedy" => Ok(Strategy::Greedy),
            other => Err(format!(
                "unknown strategy `{}`; expected `naive` or `greedy`",
                other
            )),
        }
    }
}
