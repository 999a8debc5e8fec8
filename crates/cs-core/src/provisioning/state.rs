use serde::{Deserialize, Serialize};

/// Resolved subscription / eligibility tier of the signed-in identity.
///
/// 当前身份解析出的订阅等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    /// Not signed in, or not resolved yet.
    #[default]
    Unknown,
    /// Signed in and eligible to claim the free tier.
    Available,
    /// Signed up for the free tier.
    Free,
    Pro,
    ProPlus,
    Business,
    Enterprise,
    /// Signed in but not eligible for any tier.
    Unavailable,
}

impl Entitlement {
    /// Paying tiers.
    pub fn is_paid(self) -> bool {
        matches!(
            self,
            Entitlement::Pro | Entitlement::ProPlus | Entitlement::Business | Entitlement::Enterprise
        )
    }

    /// Free or paid: the identity can use the provider without signing up first.
    pub fn is_signed_up(self) -> bool {
        self == Entitlement::Free || self.is_paid()
    }

    /// The identity may still claim the free tier.
    pub fn needs_free_sign_up(self) -> bool {
        !self.is_signed_up() && self != Entitlement::Unavailable
    }
}

/// Snapshot of the per-window provisioning facts.
///
/// 每个窗口的供应状态快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvisioningState {
    pub installed: bool,
    pub disabled: bool,
    pub untrusted: bool,
    pub hidden: bool,
    /// User deferred setup ("skip for now").
    pub later: bool,
    pub entitlement: Entitlement,
}

impl ProvisioningState {
    /// Installed, enabled, trusted and entitled beyond `Unknown`/`Available`.
    pub fn is_ready(&self) -> bool {
        self.installed
            && !self.disabled
            && !self.untrusted
            && !matches!(
                self.entitlement,
                Entitlement::Unknown | Entitlement::Available
            )
    }

    /// The provider package is installed and enabled.
    pub fn is_running(&self) -> bool {
        self.installed && !self.disabled
    }

    /// Merges `patch` into the state. Returns `true` when anything changed.
    pub fn apply(&mut self, patch: &ProvisioningPatch) -> bool {
        let before = *self;
        if let Some(installed) = patch.installed {
            self.installed = installed;
        }
        if let Some(disabled) = patch.disabled {
            self.disabled = disabled;
        }
        if let Some(untrusted) = patch.untrusted {
            self.untrusted = untrusted;
        }
        if let Some(hidden) = patch.hidden {
            self.hidden = hidden;
        }
        if let Some(later) = patch.later {
            self.later = later;
        }
        if let Some(entitlement) = patch.entitlement {
            self.entitlement = entitlement;
        }
        before != *self
    }
}

/// Partial update for [`ProvisioningState`]; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProvisioningPatch {
    pub installed: Option<bool>,
    pub disabled: Option<bool>,
    pub untrusted: Option<bool>,
    pub hidden: Option<bool>,
    pub later: Option<bool>,
    pub entitlement: Option<Entitlement>,
}

impl ProvisioningPatch {
    pub fn later(later: bool) -> Self {
        Self {
            later: Some(later),
            ..Self::default()
        }
    }

    pub fn entitlement(entitlement: Entitlement) -> Self {
        Self {
            entitlement: Some(entitlement),
            ..Self::default()
        }
    }

    pub fn installed(installed: bool) -> Self {
        Self {
            installed: Some(installed),
            ..Self::default()
        }
    }

    pub fn untrusted(untrusted: bool) -> Self {
        Self {
            untrusted: Some(untrusted),
            ..Self::default()
        }
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn with_untrusted(mut self, untrusted: bool) -> Self {
        self.untrusted = Some(untrusted);
        self
    }
}

/// One aggregated change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningChange {
    pub previous: ProvisioningState,
    pub current: ProvisioningState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entitlement_free_sign_up_only_for_unsigned_eligible_tiers() {
        assert!(Entitlement::Unknown.needs_free_sign_up());
        assert!(Entitlement::Available.needs_free_sign_up());
        assert!(!Entitlement::Free.needs_free_sign_up());
        assert!(!Entitlement::ProPlus.needs_free_sign_up());
        assert!(!Entitlement::Unavailable.needs_free_sign_up());
    }

    #[test]
    fn ready_requires_resolved_entitlement() {
        let mut state = ProvisioningState {
            installed: true,
            entitlement: Entitlement::Available,
            ..Default::default()
        };
        assert!(!state.is_ready());

        state.entitlement = Entitlement::Free;
        assert!(state.is_ready());

        state.untrusted = true;
        assert!(!state.is_ready());
    }

    #[test]
    fn apply_reports_net_change_only() {
        let mut state = ProvisioningState::default();
        assert!(!state.apply(&ProvisioningPatch::later(false)));
        assert!(state.apply(&ProvisioningPatch::installed(true).with_disabled(false)));
        assert!(state.installed);
    }
}
