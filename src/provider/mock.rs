//! Scripted provider for tests.

use super::{CloudProvider, InstanceDescription, InstanceSpec, InstanceState};
use crate::error::{Result, ShakerError};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Test double: key pairs and state transitions are scripted up front, and
/// every request is recorded for assertions.
pub(crate) struct MockProvider {
    key_pairs: Vec<String>,
    states: RefCell<VecDeque<InstanceState>>,
    pub(crate) launched: RefCell<Vec<InstanceSpec>>,
    pub(crate) tags: RefCell<Vec<(String, String)>>,
    fail_run: bool,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self {
            key_pairs: Vec::new(),
            states: RefCell::new(VecDeque::new()),
            launched: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            fail_run: false,
        }
    }

    pub(crate) fn with_key_pairs(mut self, names: &[&str]) -> Self {
        self.key_pairs = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Queue the states successive `describe_instance` calls will report.
    /// The last state repeats once the queue drains.
    pub(crate) fn with_states(self, states: &[InstanceState]) -> Self {
        *self.states.borrow_mut() = states.iter().cloned().collect();
        self
    }

    pub(crate) fn failing_run(mut self) -> Self {
        self.fail_run = true;
        self
    }
}

impl CloudProvider for MockProvider {
    fn describe_key_pairs(&self) -> Result<Vec<String>> {
        Ok(self.key_pairs.clone())
    }

    fn run_instance(&self, spec: &InstanceSpec) -> Result<String> {
        if self.fail_run {
            return Err(ShakerError::ProviderError(
                "scripted run-instances failure".to_string(),
            ));
        }
        self.launched.borrow_mut().push(spec.clone());
        Ok("i-mock0001".to_string())
    }

    fn describe_instance(&self, _instance_id: &str) -> Result<InstanceDescription> {
        let mut states = self.states.borrow_mut();
        let state = if states.len() > 1 {
            states.pop_front().unwrap()
        } else {
            states.front().cloned().unwrap_or(InstanceState::Pending)
        };
        let public_dns = match state {
            InstanceState::Running => Some("ec2-mock.compute-1.amazonaws.com".to_string()),
            _ => None,
        };
        Ok(InstanceDescription { state, public_dns })
    }

    fn create_tags(&self, _instance_id: &str, tags: &[(String, String)]) -> Result<()> {
        self.tags.borrow_mut().extend_from_slice(tags);
        Ok(())
    }
}
