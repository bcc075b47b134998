//! Launch gate and orchestrator.
//!
//! Validation gates the resolved configuration before any mutation of
//! provider state: image id present, size parseable, instance type known,
//! key pair unambiguous. Only then is the instance created, tagged, and
//! polled for readiness at a fixed interval until a hard timeout.
//!
//! Resolution never reaches the network; everything network-bound lives
//! here.

use crate::catalog::{ImageCatalog, PlatformFamily};
use crate::config::{ResolvedConfig, SizePolicy};
use crate::error::{Result, ShakerError};
use crate::provider::{
    CloudProvider, InstanceSpec, InstanceState, KeyPairChoice, choose_key_pair,
};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Fixed delay between readiness polls. No backoff: instance startup time
/// dominates and a tighter loop buys nothing.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Hard ceiling on the whole readiness wait.
pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Instance types shaker will agree to launch.
pub const KNOWN_INSTANCE_TYPES: &[&str] = &[
    "t1.micro",
    "m1.small",
    "m1.medium",
    "m1.large",
    "m1.xlarge",
    "m2.xlarge",
    "m2.2xlarge",
    "m2.4xlarge",
    "c1.medium",
    "c1.xlarge",
];

/// Validate the resolved configuration and assemble the instance request.
///
/// The key-pair step consults live provider state and is therefore the one
/// non-deterministic input: with no `ec2_key_name` configured, a single
/// available pair is adopted silently, while zero or several pairs are
/// distinct, terminal validation failures.
pub fn validate(
    config: &ResolvedConfig,
    provider: &dyn CloudProvider,
    size_policy: SizePolicy,
    user_data: String,
) -> Result<InstanceSpec> {
    let image_id = config.ec2_ami_id.clone().ok_or_else(|| {
        ShakerError::ValidationError(
            "no image id resolved: set ec2_ami_id or a known ec2_distro".to_string(),
        )
    })?;

    let size_gb = parse_size(&config.ec2_size, size_policy)?;

    if !KNOWN_INSTANCE_TYPES.contains(&config.ec2_instance_type.as_str()) {
        return Err(ShakerError::ValidationError(format!(
            "unknown instance type '{}' (known: {})",
            config.ec2_instance_type,
            KNOWN_INSTANCE_TYPES.join(", ")
        )));
    }

    let key_name = match &config.ec2_key_name {
        Some(name) => name.clone(),
        None => match choose_key_pair(provider)? {
            KeyPairChoice::Exactly(name) => {
                info!(key_name = %name, "adopted the only available key pair");
                name
            }
            KeyPairChoice::None => {
                return Err(ShakerError::ValidationError(
                    "no key pairs available; create one and set ec2_key_name".to_string(),
                ));
            }
            KeyPairChoice::Ambiguous(names) => {
                return Err(ShakerError::ValidationError(format!(
                    "several key pairs available, set ec2_key_name to one of: {}",
                    names.join(", ")
                )));
            }
        },
    };

    Ok(InstanceSpec {
        image_id,
        instance_type: config.ec2_instance_type.clone(),
        key_name,
        security_group: config.ec2_security_group.clone(),
        zone: config.ec2_zone.clone(),
        monitoring: config.ec2_monitoring_enabled,
        root_device: config.ec2_root_device.clone(),
        size_gb,
        user_data,
    })
}

/// Parse the root volume size, applying the invalid-size policy.
fn parse_size(size: &str, policy: SizePolicy) -> Result<u32> {
    match size.parse::<u32>() {
        Ok(gb) => Ok(gb),
        Err(_) => match policy {
            SizePolicy::Reject => Err(ShakerError::ValidationError(format!(
                "invalid ec2_size '{}': expected a non-negative integer",
                size
            ))),
            SizePolicy::Zero => {
                warn!(size, "invalid ec2_size coerced to 0 (instance-type default)");
                Ok(0)
            }
        },
    }
}

/// Validate, create, tag, and wait for the instance; report how to reach it.
pub fn launch(
    provider: &dyn CloudProvider,
    config: &ResolvedConfig,
    user_data: String,
    size_policy: SizePolicy,
) -> Result<()> {
    let spec = validate(config, provider, size_policy, user_data)?;

    info!(
        image_id = %spec.image_id,
        instance_type = %spec.instance_type,
        zone = %spec.zone,
        "requesting instance"
    );
    let instance_id = provider.run_instance(&spec)?;
    info!(%instance_id, "instance created");

    if let Err(e) = provider.create_tags(&instance_id, &build_tags(config)) {
        // Tags are cosmetic; the launch proceeds without them.
        warn!(%instance_id, error = %e, "failed to tag instance");
    }

    let description = wait_for_running(provider, &instance_id, POLL_INTERVAL, LAUNCH_TIMEOUT)?;
    report(config, &instance_id, description.public_dns.as_deref());
    Ok(())
}

/// Tags attached to every launched instance.
fn build_tags(config: &ResolvedConfig) -> Vec<(String, String)> {
    let name = config
        .salt_id
        .clone()
        .or_else(|| config.fqdn())
        .unwrap_or_else(|| "shaker minion".to_string());

    let mut tags = vec![
        ("Name".to_string(), name),
        (
            "shaker:created-at".to_string(),
            chrono::Utc::now().to_rfc3339(),
        ),
    ];
    if let Ok(host) = hostname::get() {
        tags.push((
            "shaker:created-by".to_string(),
            host.to_string_lossy().to_string(),
        ));
    }
    tags
}

/// Poll instance state at a fixed interval until it is running or the
/// timeout expires. A timeout is a provider failure: the launch is
/// unconfirmed, not rolled back.
pub fn wait_for_running(
    provider: &dyn CloudProvider,
    instance_id: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<ReadyInstance> {
    let started = Instant::now();
    loop {
        let description = provider.describe_instance(instance_id)?;
        match description.state {
            InstanceState::Running => {
                info!(instance_id, "instance is running");
                return Ok(ReadyInstance {
                    public_dns: description.public_dns,
                });
            }
            InstanceState::Pending => {}
            InstanceState::Other(ref state) => {
                // Terminated/stopping instances will never reach running.
                return Err(ShakerError::ProviderError(format!(
                    "instance {} entered unexpected state '{}'",
                    instance_id, state
                )));
            }
        }

        if started.elapsed() >= timeout {
            error!(
                instance_id,
                timeout_secs = timeout.as_secs(),
                "instance did not reach running state; launch unconfirmed"
            );
            return Err(ShakerError::ProviderError(format!(
                "instance {} did not reach running state within {}s",
                instance_id,
                timeout.as_secs()
            )));
        }
        thread::sleep(interval);
    }
}

/// A running instance's connection details.
#[derive(Debug, Clone)]
pub struct ReadyInstance {
    pub public_dns: Option<String>,
}

/// Default login user for the resolved distro's platform family.
fn login_user(config: &ResolvedConfig) -> String {
    if let Some(user) = &config.sudouser {
        return user.clone();
    }
    match ImageCatalog::embedded().family_of(&config.ec2_distro) {
        Some(PlatformFamily::Ubuntu) => "ubuntu".to_string(),
        Some(PlatformFamily::Debian) => "admin".to_string(),
        None => "root".to_string(),
    }
}

/// Print connection instructions for the user.
fn report(config: &ResolvedConfig, instance_id: &str, public_dns: Option<&str>) {
    println!("Instance {} is running.", instance_id);
    match public_dns {
        Some(dns) => {
            println!("Public DNS: {}", dns);
            println!();
            println!("Connect with:");
            println!("  ssh -p {} {}@{}", config.ssh_port, login_user(config), dns);
        }
        None => println!("No public DNS assigned yet; check the console."),
    }
}

/// DNS record assignment for the new minion.
///
/// Feature stub: recorded and skipped, never fatal.
/// TODO: wire up a Route 53 change-resource-record-sets call once the
/// record layout (zone id, TTL source) is decided.
pub fn assign_dns(config: &ResolvedConfig) {
    warn!(
        fqdn = %config.fqdn().unwrap_or_default(),
        "DNS assignment is not implemented; skipping"
    );
}
