use crate::Amount;

/// What to do with the payer's own share of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfSharePolicy {
    /// Post only the other participants' shares.
    #[default]
    Skip,
    /// Also post the payer's share as a debt from the payer to themselves.
    Post,
}

/// Engine settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub self_share: SelfSharePolicy,
    /// Largest accepted gap between an exact split's amounts and its total.
    pub exact_tolerance: Amount,
}

impl EngineConfig {
    pub fn with_self_share(mut self, policy: SelfSharePolicy) -> Self {
        self.self_share = policy;
        self
    }

    pub fn with_exact_tolerance(mut self, tolerance: Amount) -> Self {
        self.exact_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_skips_self_share_and_has_no_tolerance() {
        let config = EngineConfig::default();
        assert_eq!(config.self_share, SelfSharePolicy::Skip);
        assert_eq!(config.exact_tolerance, Amount::ZERO);
    }

    #[test]
    fn builders_override_fields() {
        let config = EngineConfig::default()
            .with_self_share(SelfSharePolicy::Post)
            .with_exact_tolerance(Amount::from_cents(2));
        assert_eq!(config.self_share, SelfSharePolicy::Post);
        assert_eq!(config.exact_tolerance, Amount::from_cents(2));
    }
}
