use std::fmt;

/// Maximum number of upstream lookups allowed while resolving one alias chain.
///
/// Zero means unlimited. The configuration layer only ever produces positive
/// budgets, but the resolver honours the unlimited case for programmatic use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupBudget(u32);

impl LookupBudget {
    pub const DEFAULT: LookupBudget = LookupBudget(10);

    pub fn new(max_lookups: u32) -> Self {
        Self(max_lookups)
    }

    pub fn unlimited() -> Self {
        Self(0)
    }

    pub fn max_lookups(&self) -> u32 {
        self.0
    }

    pub fn is_unlimited(&self) -> bool {
        self.0 == 0
    }

    pub fn is_exhausted(&self, lookups_done: u32) -> bool {
        !self.is_unlimited() && lookups_done >= self.0
    }
}

impl Default for LookupBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LookupBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
