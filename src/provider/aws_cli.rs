//! EC2 provider backed by the `aws` CLI.
//!
//! Every operation shells out to `aws ec2 ... --output json` and parses the
//! response with serde. Credentials and endpoint configuration are the
//! CLI's concern; shaker only supplies the region.

use super::{CloudProvider, InstanceDescription, InstanceSpec, InstanceState};
use crate::error::{Result, ShakerError};
use serde::Deserialize;
use std::process::Command;
use tracing::debug;

/// EC2 operations via the `aws` command-line tool.
#[derive(Debug, Clone)]
pub struct AwsCliProvider {
    region: String,
}

impl AwsCliProvider {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Run an `aws ec2` subcommand and capture stdout.
    fn run_ec2(&self, args: &[&str]) -> Result<String> {
        debug!(subcommand = *args.first().unwrap_or(&""), region = %self.region, "aws ec2 call");
        let output = Command::new("aws")
            .arg("ec2")
            .args(args)
            .args(["--region", &self.region, "--output", "json"])
            .output()
            .map_err(|e| {
                ShakerError::ProviderError(format!(
                    "failed to execute aws ec2 {}: {}",
                    args.first().unwrap_or(&""),
                    e
                ))
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ShakerError::ProviderError(format!(
                "aws ec2 {} failed (exit code {}): {}",
                args.first().unwrap_or(&""),
                output.status.code().unwrap_or(-1),
                stderr
            )))
        }
    }
}

// Response shapes, limited to the fields shaker reads.

#[derive(Debug, Deserialize)]
struct DescribeKeyPairsResponse {
    #[serde(rename = "KeyPairs", default)]
    key_pairs: Vec<KeyPairInfo>,
}

#[derive(Debug, Deserialize)]
struct KeyPairInfo {
    #[serde(rename = "KeyName")]
    key_name: String,
}

#[derive(Debug, Deserialize)]
struct RunInstancesResponse {
    #[serde(rename = "Instances", default)]
    instances: Vec<InstanceInfo>,
}

#[derive(Debug, Deserialize)]
struct DescribeInstancesResponse {
    #[serde(rename = "Reservations", default)]
    reservations: Vec<ReservationInfo>,
}

#[derive(Debug, Deserialize)]
struct ReservationInfo {
    #[serde(rename = "Instances", default)]
    instances: Vec<InstanceInfo>,
}

#[derive(Debug, Deserialize)]
struct InstanceInfo {
    #[serde(rename = "InstanceId")]
    instance_id: String,
    #[serde(rename = "State")]
    state: StateInfo,
    #[serde(rename = "PublicDnsName", default)]
    public_dns_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StateInfo {
    #[serde(rename = "Name")]
    name: String,
}

fn parse_json<T: for<'de> Deserialize<'de>>(operation: &str, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| {
        ShakerError::ProviderError(format!("unexpected {} response: {}", operation, e))
    })
}

impl CloudProvider for AwsCliProvider {
    fn describe_key_pairs(&self) -> Result<Vec<String>> {
        let json = self.run_ec2(&["describe-key-pairs"])?;
        let response: DescribeKeyPairsResponse = parse_json("describe-key-pairs", &json)?;
        Ok(response
            .key_pairs
            .into_iter()
            .map(|kp| kp.key_name)
            .collect())
    }

    fn run_instance(&self, spec: &InstanceSpec) -> Result<String> {
        let placement = format!("AvailabilityZone={}", spec.zone);
        let monitoring = format!("Enabled={}", spec.monitoring);
        let block_devices = serde_json::json!([{
            "DeviceName": spec.root_device,
            "Ebs": { "VolumeSize": spec.size_gb, "DeleteOnTermination": true }
        }])
        .to_string();

        let mut args: Vec<&str> = vec![
            "run-instances",
            "--image-id",
            &spec.image_id,
            "--instance-type",
            &spec.instance_type,
            "--key-name",
            &spec.key_name,
            "--security-groups",
            &spec.security_group,
            "--placement",
            &placement,
            "--monitoring",
            &monitoring,
            "--count",
            "1",
            "--user-data",
            &spec.user_data,
        ];
        // Size 0 keeps the image's default root volume.
        if spec.size_gb > 0 {
            args.extend(["--block-device-mappings", &block_devices]);
        }

        let json = self.run_ec2(&args)?;
        let response: RunInstancesResponse = parse_json("run-instances", &json)?;
        response
            .instances
            .into_iter()
            .next()
            .map(|i| i.instance_id)
            .ok_or_else(|| {
                ShakerError::ProviderError(
                    "run-instances returned no instances".to_string(),
                )
            })
    }

    fn describe_instance(&self, instance_id: &str) -> Result<InstanceDescription> {
        let json = self.run_ec2(&["describe-instances", "--instance-ids", instance_id])?;
        let response: DescribeInstancesResponse = parse_json("describe-instances", &json)?;
        let instance = response
            .reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .find(|i| i.instance_id == instance_id)
            .ok_or_else(|| {
                ShakerError::ProviderError(format!(
                    "instance {} not found in describe-instances response",
                    instance_id
                ))
            })?;

        Ok(InstanceDescription {
            state: InstanceState::from_name(&instance.state.name),
            public_dns: instance.public_dns_name.filter(|dns| !dns.is_empty()),
        })
    }

    fn create_tags(&self, instance_id: &str, tags: &[(String, String)]) -> Result<()> {
        let mut args: Vec<String> = vec![
            "create-tags".to_string(),
            "--resources".to_string(),
            instance_id.to_string(),
            "--tags".to_string(),
        ];
        for (key, value) in tags {
            args.push(format!("Key={},Value={}", key, value));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_ec2(&arg_refs)?;
        Ok(())
    }
}
