//! Static AMI catalog for EBS-backed distro images.
//!
//! The catalog is an embedded YAML table keyed by
//! `family -> release -> region -> architecture -> image id`, plus a
//! `release:` alias section mapping a family's short name to its current
//! default release (`ubuntu` -> `precise`). It is parsed once, never
//! mutated, and lookups are pure reads.
//!
//! A lookup miss is `None`, not an error: callers decide whether a missing
//! image is fatal for them.

use crate::error::{Result, ShakerError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Architecture assumed when a profile does not specify one.
pub const DEFAULT_ARCHITECTURE: &str = "i386";

/// Platform family of a release.
///
/// Downstream code (the user-data renderer in particular) branches on this
/// enum rather than comparing release-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    Ubuntu,
    Debian,
}

impl PlatformFamily {
    /// Families in catalog resolution order.
    pub const ALL: [PlatformFamily; 2] = [PlatformFamily::Ubuntu, PlatformFamily::Debian];
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFamily::Ubuntu => write!(f, "ubuntu"),
            PlatformFamily::Debian => write!(f, "debian"),
        }
    }
}

/// `release -> region -> architecture -> image id`
type FamilyTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    /// Alias section: family short name -> default release.
    release: BTreeMap<String, String>,
    ubuntu: FamilyTable,
    debian: FamilyTable,
}

/// Parsed, immutable image catalog.
#[derive(Debug)]
pub struct ImageCatalog {
    doc: CatalogDoc,
}

static EMBEDDED: LazyLock<ImageCatalog> = LazyLock::new(|| {
    ImageCatalog::from_yaml(EBS_IMAGES).expect("embedded image catalog must parse")
});

impl ImageCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> &'static ImageCatalog {
        &EMBEDDED
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let doc: CatalogDoc = serde_yaml::from_str(yaml)
            .map_err(|e| ShakerError::UserError(format!("failed to parse image catalog: {}", e)))?;
        Ok(Self { doc })
    }

    fn family_table(&self, family: PlatformFamily) -> &FamilyTable {
        match family {
            PlatformFamily::Ubuntu => &self.doc.ubuntu,
            PlatformFamily::Debian => &self.doc.debian,
        }
    }

    /// Normalize a release name through the alias table.
    ///
    /// `ubuntu` becomes the family's current default release; anything else
    /// passes through unchanged.
    pub fn normalize_release<'a>(&'a self, release: &'a str) -> &'a str {
        self.doc
            .release
            .get(release)
            .map(String::as_str)
            .unwrap_or(release)
    }

    /// Platform family that knows the given release name, if any.
    pub fn family_of(&self, release: &str) -> Option<PlatformFamily> {
        let release = self.normalize_release(release);
        PlatformFamily::ALL
            .into_iter()
            .find(|&family| self.family_table(family).contains_key(release))
    }

    /// Look up the image id for `(release, region, architecture)`.
    ///
    /// The release is alias-normalized first. Families are tried in catalog
    /// order; an absent nested path means not-found for that family.
    pub fn lookup(&self, release: &str, region: &str, architecture: &str) -> Option<&str> {
        let release = self.normalize_release(release);
        for family in PlatformFamily::ALL {
            if let Some(image_id) = self
                .family_table(family)
                .get(release)
                .and_then(|regions| regions.get(region))
                .and_then(|archs| archs.get(architecture))
            {
                return Some(image_id);
            }
        }
        None
    }
}

/// Derive the EC2 region from an availability zone by stripping the
/// trailing zone letter (`us-west-1a` -> `us-west-1`).
pub fn region_from_zone(zone: &str) -> &str {
    match zone.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => &zone[..zone.len() - 1],
        _ => zone,
    }
}

/// Embedded AMI table: EBS-backed images per family, release, region, and
/// architecture.
const EBS_IMAGES: &str = "\
# Amazon EC2 AMIs - EBS images
release:
  ubuntu: precise
  debian: squeeze

ubuntu:
  precise:
    ap-northeast-1:
      i386: ami-c047fac1
      x86_64: ami-c247fac3
    ap-southeast-1:
      i386: ami-eadb9ab8
      x86_64: ami-e8db9aba
    eu-west-1:
      i386: ami-cda0f2b9
      x86_64: ami-cfa0f2bb
    sa-east-1:
      i386: ami-4807d755
      x86_64: ami-4a07d757
    us-east-1:
      i386: ami-057bcf6c
      x86_64: ami-137bcf7a
    us-west-1:
      i386: ami-d50c2890
      x86_64: ami-d70c2892
    us-west-2:
      i386: ami-dc2311ec
      x86_64: ami-de2311ee
  oneiric:
    ap-northeast-1:
      i386: ami-e0fd4be1
      x86_64: ami-e2fd4be3
    ap-southeast-1:
      i386: ami-58cc890a
      x86_64: ami-5ecc890c
    eu-west-1:
      i386: ami-0fe3dc7b
      x86_64: ami-09e3dc7d
    sa-east-1:
      i386: ami-d220ffcf
      x86_64: ami-cc20ffd1
    us-east-1:
      i386: ami-6ba27502
      x86_64: ami-6fa27506
    us-west-1:
      i386: ami-3f94ca7a
      x86_64: ami-c594ca80
    us-west-2:
      i386: ami-e4b03dd4
      x86_64: ami-e6b03dd6
  natty:
    ap-northeast-1:
      i386: ami-00b10501
      x86_64: ami-02b10503
    ap-southeast-1:
      i386: ami-06255f54
      x86_64: ami-04255f56
    eu-west-1:
      i386: ami-a4f7c5d0
      x86_64: ami-a6f7c5d2
    us-east-1:
      i386: ami-e358958a
      x86_64: ami-fd589594
    us-west-1:
      i386: ami-43580406
      x86_64: ami-4d580408
    us-west-2:
      i386: ami-18f97428
      x86_64: ami-1af9742a

debian:
  squeeze:
    ap-northeast-1:
      i386: ami-3ccc663d
      x86_64: ami-5acc665b
    ap-southeast-1:
      i386: ami-b02d54e2
      x86_64: ami-da2d5488
    eu-west-1:
      i386: ami-e1013695
      x86_64: ami-0f01367b
    sa-east-1:
      i386: ami-d427f8c9
      x86_64: ami-3826f925
    us-east-1:
      i386: ami-1212ef7b
      x86_64: ami-e00df089
    us-west-1:
      i386: ami-77287b32
      x86_64: ami-75287b30
    us-west-2:
      i386: ami-fcf27fcc
      x86_64: ami-8ef27fbe
";
