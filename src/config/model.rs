//! Profile struct definition, built-in defaults, and the resolved form.

use crate::catalog::DEFAULT_ARCHITECTURE;
use crate::error::{Result, ShakerError};
use serde::Serialize;
use serde_yaml::Value;

/// A provisioning parameter set.
///
/// Every field is optional: a persisted profile file only overrides the
/// keys it actually contains. Unknown keys in the file are ignored, and
/// merging is explicit field-by-field precedence (later layer wins only
/// where it supplies a value).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sudouser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_import: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_ami_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_distro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_security_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_monitoring_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_root_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relayhost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_master: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_id: Option<String>,
}

impl Profile {
    /// Built-in defaults: the keys every resolved configuration must carry.
    pub fn builtin_defaults() -> Self {
        Self {
            ssh_port: Some("22".to_string()),
            ec2_zone: Some("us-east-1b".to_string()),
            ec2_instance_type: Some("m1.small".to_string()),
            ec2_distro: Some("precise".to_string()),
            ec2_size: Some("0".to_string()),
            ec2_security_group: Some("default".to_string()),
            ec2_root_device: Some("/dev/sda1".to_string()),
            ..Self::default()
        }
    }

    /// Overlay another profile: fields present in `other` replace ours.
    pub fn overlay(&mut self, other: &Profile) {
        overlay_field(&mut self.hostname, &other.hostname);
        overlay_field(&mut self.domain, &other.domain);
        overlay_field(&mut self.sudouser, &other.sudouser);
        overlay_field(&mut self.ssh_import, &other.ssh_import);
        overlay_field(&mut self.ssh_port, &other.ssh_port);
        overlay_field(&mut self.timezone, &other.timezone);
        overlay_field(&mut self.ec2_zone, &other.ec2_zone);
        overlay_field(&mut self.ec2_instance_type, &other.ec2_instance_type);
        overlay_field(&mut self.ec2_ami_id, &other.ec2_ami_id);
        overlay_field(&mut self.ec2_distro, &other.ec2_distro);
        overlay_field(&mut self.ec2_size, &other.ec2_size);
        overlay_field(&mut self.ec2_key_name, &other.ec2_key_name);
        overlay_field(&mut self.ec2_security_group, &other.ec2_security_group);
        overlay_field(
            &mut self.ec2_monitoring_enabled,
            &other.ec2_monitoring_enabled,
        );
        overlay_field(&mut self.ec2_root_device, &other.ec2_root_device);
        overlay_field(&mut self.ec2_architecture, &other.ec2_architecture);
        overlay_field(&mut self.relayhost, &other.relayhost);
        overlay_field(&mut self.mailto, &other.mailto);
        overlay_field(&mut self.salt_master, &other.salt_master);
        overlay_field(&mut self.salt_id, &other.salt_id);
    }

    /// Parse a profile from YAML text.
    ///
    /// Profile files are hand-edited, so scalars arrive unquoted
    /// (`ssh_port: 22`, `ec2_monitoring_enabled: false`); numbers and
    /// booleans are accepted wherever a string is expected. Unknown keys
    /// are ignored. An empty or comment-only document is an empty profile.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ShakerError::UserError(format!("failed to parse profile YAML: {}", e)))?;

        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(m) => m,
            other => {
                return Err(ShakerError::UserError(format!(
                    "profile must be a mapping of key: value pairs, got {}",
                    yaml_type_name(&other)
                )));
            }
        };

        let mut profile = Self::default();
        for (key, value) in &mapping {
            let Some(key) = key.as_str() else { continue };
            match key {
                "hostname" => profile.hostname = scalar_to_string(value),
                "domain" => profile.domain = scalar_to_string(value),
                "sudouser" => profile.sudouser = scalar_to_string(value),
                "ssh_import" => profile.ssh_import = scalar_to_string(value),
                "ssh_port" => profile.ssh_port = scalar_to_string(value),
                "timezone" => profile.timezone = scalar_to_string(value),
                "ec2_zone" => profile.ec2_zone = scalar_to_string(value),
                "ec2_instance_type" => profile.ec2_instance_type = scalar_to_string(value),
                "ec2_ami_id" => profile.ec2_ami_id = scalar_to_string(value),
                "ec2_distro" => profile.ec2_distro = scalar_to_string(value),
                "ec2_size" => profile.ec2_size = scalar_to_string(value),
                "ec2_key_name" => profile.ec2_key_name = scalar_to_string(value),
                "ec2_security_group" => profile.ec2_security_group = scalar_to_string(value),
                "ec2_monitoring_enabled" => {
                    profile.ec2_monitoring_enabled = scalar_to_bool(value)
                }
                "ec2_root_device" => profile.ec2_root_device = scalar_to_string(value),
                "ec2_architecture" => profile.ec2_architecture = scalar_to_string(value),
                "relayhost" => profile.relayhost = scalar_to_string(value),
                "mailto" => profile.mailto = scalar_to_string(value),
                "salt_master" => profile.salt_master = scalar_to_string(value),
                "salt_id" => profile.salt_id = scalar_to_string(value),
                // Unknown keys are ignored: profiles are forward-compatible.
                _ => {}
            }
        }
        Ok(profile)
    }

    /// Serialize a profile to YAML, omitting unset keys.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ShakerError::UserError(format!("failed to serialize profile: {}", e)))
    }
}

fn overlay_field<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        *dst = src.clone();
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn yaml_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// The final merged parameter set consumed by rendering and launch.
///
/// Every key present in the built-in defaults is non-optional here: the
/// merge invariant ("defaults resolve to non-null or validation fails")
/// is realized in the type. Constructed once per invocation, owned by it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub sudouser: Option<String>,
    pub ssh_import: Option<String>,
    pub ssh_port: String,
    pub timezone: Option<String>,
    pub ec2_zone: String,
    pub ec2_instance_type: String,
    pub ec2_ami_id: Option<String>,
    pub ec2_distro: String,
    pub ec2_size: String,
    pub ec2_key_name: Option<String>,
    pub ec2_security_group: String,
    pub ec2_monitoring_enabled: bool,
    pub ec2_root_device: String,
    pub ec2_architecture: String,
    pub relayhost: Option<String>,
    pub mailto: Option<String>,
    pub salt_master: Option<String>,
    pub salt_id: Option<String>,
    /// Region used for catalog lookups and provider calls: the explicit
    /// `--region` flag when given, otherwise derived from the zone.
    pub region: String,
}

impl ResolvedConfig {
    /// Finalize a merged profile.
    ///
    /// Fails with a validation error if any built-in default key ended up
    /// unset, which can only happen if a profile file nulls one out.
    pub fn from_profile(profile: Profile, region: String) -> Result<Self> {
        Ok(Self {
            hostname: profile.hostname,
            domain: profile.domain,
            sudouser: profile.sudouser,
            ssh_import: profile.ssh_import,
            ssh_port: require(profile.ssh_port, "ssh_port")?,
            timezone: profile.timezone,
            ec2_zone: require(profile.ec2_zone, "ec2_zone")?,
            ec2_instance_type: require(profile.ec2_instance_type, "ec2_instance_type")?,
            ec2_ami_id: profile.ec2_ami_id,
            ec2_distro: require(profile.ec2_distro, "ec2_distro")?,
            ec2_size: require(profile.ec2_size, "ec2_size")?,
            ec2_key_name: profile.ec2_key_name,
            ec2_security_group: require(profile.ec2_security_group, "ec2_security_group")?,
            ec2_monitoring_enabled: profile.ec2_monitoring_enabled.unwrap_or(false),
            ec2_root_device: require(profile.ec2_root_device, "ec2_root_device")?,
            ec2_architecture: profile
                .ec2_architecture
                .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string()),
            relayhost: profile.relayhost,
            mailto: profile.mailto,
            salt_master: profile.salt_master,
            salt_id: profile.salt_id,
            region,
        })
    }

    /// Convert back to the persistable parameter-set form (for `--save`).
    pub fn to_profile(&self) -> Profile {
        Profile {
            hostname: self.hostname.clone(),
            domain: self.domain.clone(),
            sudouser: self.sudouser.clone(),
            ssh_import: self.ssh_import.clone(),
            ssh_port: Some(self.ssh_port.clone()),
            timezone: self.timezone.clone(),
            ec2_zone: Some(self.ec2_zone.clone()),
            ec2_instance_type: Some(self.ec2_instance_type.clone()),
            ec2_ami_id: self.ec2_ami_id.clone(),
            ec2_distro: Some(self.ec2_distro.clone()),
            ec2_size: Some(self.ec2_size.clone()),
            ec2_key_name: self.ec2_key_name.clone(),
            ec2_security_group: Some(self.ec2_security_group.clone()),
            ec2_monitoring_enabled: Some(self.ec2_monitoring_enabled),
            ec2_root_device: Some(self.ec2_root_device.clone()),
            ec2_architecture: Some(self.ec2_architecture.clone()),
            relayhost: self.relayhost.clone(),
            mailto: self.mailto.clone(),
            salt_master: self.salt_master.clone(),
            salt_id: self.salt_id.clone(),
        }
    }

    /// The minion's fully qualified name, when hostname is known.
    pub fn fqdn(&self) -> Option<String> {
        match (&self.hostname, &self.domain) {
            (Some(host), Some(domain)) => Some(format!("{}.{}", host, domain)),
            (Some(host), None) => Some(host.clone()),
            _ => None,
        }
    }
}

fn require(value: Option<String>, key: &str) -> Result<String> {
    value.ok_or_else(|| {
        ShakerError::ValidationError(format!(
            "'{}' has a built-in default but resolved to no value; check the profile file",
            key
        ))
    })
}
