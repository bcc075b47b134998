//! Exit code constants for the shaker CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unusable config directory)
//! - 2: Validation failure (missing AMI, bad size, unknown type, key pairs)
//! - 3: Template rendering failure
//! - 4: Cloud provider failure (EC2 call failed, readiness timeout)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an unusable configuration directory.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the resolved configuration cannot be launched.
pub const VALIDATION_FAILURE: i32 = 2;

/// Template rendering failure: user-data documents could not be produced.
pub const TEMPLATE_FAILURE: i32 = 3;

/// Cloud provider failure: EC2 request failed or the instance never came up.
pub const PROVIDER_FAILURE: i32 = 4;
