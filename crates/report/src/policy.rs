//! Policy action lookup.

use std::collections::BTreeMap;

use socket_api::models::{Alert, SecurityPolicy};
use socket_core::types::PolicyAction;

/// Alert type -> action table built from an organization's security policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyTable {
    rules: BTreeMap<String, PolicyAction>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, alert_type: impl Into<String>, action: PolicyAction) -> Self {
        self.rules.insert(alert_type.into(), action);
        self
    }

    pub fn rule(&self, alert_type: &str) -> Option<PolicyAction> {
        self.rules.get(alert_type).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Action for an alert: the policy rule for its type, else the action the
    /// alert already carries, else the severity default.
    pub fn action_for(&self, alert: &Alert) -> PolicyAction {
        self.rule(&alert.alert_type)
            .or(alert.action)
            .unwrap_or_else(|| alert.severity.default_action())
    }
}

impl From<&SecurityPolicy> for PolicyTable {
    fn from(policy: &SecurityPolicy) -> Self {
        let rules = policy
            .security_policy_rules
            .iter()
            .filter_map(|(alert_type, rule)| rule.action.map(|action| (alert_type.clone(), action)))
            .collect();
        Self { rules }
    }
}
