//! Cloud provider seam.
//!
//! The launcher talks to EC2 through the `CloudProvider` trait: key-pair
//! enumeration, instance creation, state polling, and tagging. The
//! production implementation drives the `aws` CLI; tests use a scripted
//! mock. Everything is synchronous and returns `Result` — provider state is
//! the one external, non-deterministic input to a launch.

mod aws_cli;

#[cfg(test)]
pub(crate) mod mock;

pub use aws_cli::AwsCliProvider;

use crate::error::Result;

/// Parameters for one instance-creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSpec {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub security_group: String,
    pub zone: String,
    pub monitoring: bool,
    pub root_device: String,
    /// Root volume size in GB; 0 means "use the instance-type default".
    pub size_gb: u32,
    pub user_data: String,
}

/// Lifecycle state reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Other(String),
}

impl InstanceState {
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            other => InstanceState::Other(other.to_string()),
        }
    }
}

/// Snapshot of a launched instance.
#[derive(Debug, Clone)]
pub struct InstanceDescription {
    pub state: InstanceState,
    pub public_dns: Option<String>,
}

/// Result of key-pair auto-selection against live provider state.
///
/// Explicit by design: adopting a key silently is only allowed in the
/// unambiguous case, and the zero and many cases are distinguishable
/// failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPairChoice {
    /// Exactly one key pair exists; it is adopted.
    Exactly(String),
    /// The provider has no key pairs.
    None,
    /// More than one key pair exists; the caller must pick one.
    Ambiguous(Vec<String>),
}

/// Instance lifecycle operations the launcher needs from a cloud provider.
pub trait CloudProvider {
    /// Names of the key pairs available in the account/region.
    fn describe_key_pairs(&self) -> Result<Vec<String>>;

    /// Create one instance; returns its instance id.
    fn run_instance(&self, spec: &InstanceSpec) -> Result<String>;

    /// Current state and address of an instance.
    fn describe_instance(&self, instance_id: &str) -> Result<InstanceDescription>;

    /// Attach tags to an instance.
    fn create_tags(&self, instance_id: &str, tags: &[(String, String)]) -> Result<()>;
}

/// Classify the account's key pairs for auto-selection.
pub fn choose_key_pair(provider: &dyn CloudProvider) -> Result<KeyPairChoice> {
    let mut names = provider.describe_key_pairs()?;
    match names.len() {
        0 => Ok(KeyPairChoice::None),
        1 => Ok(KeyPairChoice::Exactly(names.remove(0))),
        _ => Ok(KeyPairChoice::Ambiguous(names)),
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockProvider;
    use super::*;

    #[test]
    fn instance_state_parses_known_names() {
        assert_eq!(InstanceState::from_name("pending"), InstanceState::Pending);
        assert_eq!(InstanceState::from_name("running"), InstanceState::Running);
        assert_eq!(
            InstanceState::from_name("shutting-down"),
            InstanceState::Other("shutting-down".to_string())
        );
    }

    #[test]
    fn single_key_pair_is_chosen_exactly() {
        let provider = MockProvider::new().with_key_pairs(&["deploy"]);
        assert_eq!(
            choose_key_pair(&provider).unwrap(),
            KeyPairChoice::Exactly("deploy".to_string())
        );
    }

    #[test]
    fn zero_and_many_key_pairs_are_distinct() {
        let provider = MockProvider::new();
        assert_eq!(choose_key_pair(&provider).unwrap(), KeyPairChoice::None);

        let provider = MockProvider::new().with_key_pairs(&["a", "b"]);
        assert_eq!(
            choose_key_pair(&provider).unwrap(),
            KeyPairChoice::Ambiguous(vec!["a".to_string(), "b".to_string()])
        );
    }
}
