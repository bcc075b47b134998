//! Configuration resolver: layered merge with strict precedence.
//!
//! Merge order, later wins:
//!
//! 1. built-in defaults
//! 2. persisted default profile
//! 3. persisted named profile (when a name is given)
//! 4. CLI overrides (only known keys, only truthy values)
//! 5. explicit distro request: catalog lookup overwrites the image id
//! 6. fallback: catalog lookup fills a still-missing image id from the
//!    merged distro value
//!
//! Resolution is pure over (defaults, file contents, overrides, catalog):
//! no network calls happen here. Key-pair auto-selection, which depends on
//! live provider state, belongs to the launch gate.

use super::model::{Profile, ResolvedConfig};
use super::store;
use crate::catalog::{DEFAULT_ARCHITECTURE, ImageCatalog, region_from_zone};
use crate::context::ConfigContext;
use crate::error::Result;
use tracing::{debug, info, warn};

/// Ephemeral caller-supplied overrides, consumed once by `resolve`.
///
/// Only parameters named here are eligible to override the merge; an empty
/// string counts as "not supplied".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub sudouser: Option<String>,
    pub ssh_port: Option<String>,
    pub ec2_ami_id: Option<String>,
    pub ec2_distro: Option<String>,
    pub ec2_size: Option<String>,
    pub ec2_key_name: Option<String>,
    pub ec2_security_group: Option<String>,
    pub ec2_zone: Option<String>,
    pub ec2_instance_type: Option<String>,
    /// Region for catalog lookups and provider calls; when unset, the
    /// region is derived from the merged zone.
    pub region: Option<String>,
}

impl CliOverrides {
    fn as_profile(&self) -> Profile {
        Profile {
            hostname: truthy(&self.hostname),
            domain: truthy(&self.domain),
            sudouser: truthy(&self.sudouser),
            ssh_port: truthy(&self.ssh_port),
            ec2_ami_id: truthy(&self.ec2_ami_id),
            ec2_distro: truthy(&self.ec2_distro),
            ec2_size: truthy(&self.ec2_size),
            ec2_key_name: truthy(&self.ec2_key_name),
            ec2_security_group: truthy(&self.ec2_security_group),
            ec2_zone: truthy(&self.ec2_zone),
            ec2_instance_type: truthy(&self.ec2_instance_type),
            ..Profile::default()
        }
    }
}

fn truthy(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Merge all configuration layers into one resolved configuration.
pub fn resolve(
    overrides: &CliOverrides,
    ctx: &ConfigContext,
    profile_name: Option<&str>,
) -> Result<ResolvedConfig> {
    let mut merged = Profile::builtin_defaults();

    // Layers 2 and 3: persisted profiles.
    merged.overlay(&store::ensure_default_profile(ctx)?);
    match profile_name {
        Some(name) => {
            if let Some(profile) = store::load_named_profile(ctx, name)? {
                merged.overlay(&profile);
            }
        }
        None => info!("no profile specified; using defaults and overrides"),
    }

    // Layer 4: CLI overrides for known keys.
    merged.overlay(&overrides.as_profile());

    let region = truthy(&overrides.region).unwrap_or_else(|| {
        region_from_zone(merged.ec2_zone.as_deref().unwrap_or("")).to_string()
    });
    let architecture = merged
        .ec2_architecture
        .clone()
        .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string());
    let catalog = ImageCatalog::embedded();

    // Layer 5: an explicitly requested distro overwrites any image id from
    // earlier layers; a miss is logged and the existing id stands.
    if let Some(distro) = truthy(&overrides.ec2_distro) {
        match catalog.lookup(&distro, &region, &architecture) {
            Some(image_id) => {
                debug!(%distro, %region, %architecture, image_id, "image selected for distro");
                merged.ec2_ami_id = Some(image_id.to_string());
            }
            None => warn!(
                %distro,
                %region,
                %architecture,
                "no image found for requested distro; keeping current image id"
            ),
        }
    }

    // Layer 6: fall back to the merged distro when no image id was set.
    if merged.ec2_ami_id.is_none()
        && let Some(distro) = merged.ec2_distro.clone()
        && let Some(image_id) = catalog.lookup(&distro, &region, &architecture)
    {
        debug!(%distro, %region, %architecture, image_id, "image selected by fallback");
        merged.ec2_ami_id = Some(image_id.to_string());
    }

    // The minion id defaults to the fully qualified hostname.
    if merged.salt_id.is_none()
        && let Some(host) = merged.hostname.clone()
    {
        merged.salt_id = Some(match &merged.domain {
            Some(domain) => format!("{}.{}", host, domain),
            None => host,
        });
    }

    ResolvedConfig::from_profile(merged, region)
}
