//! Version information for axon.

use crate::bridge::protocol::PROTOCOL_VERSION;

/// Axon version from Cargo.toml
pub const AXON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Versions in play on a kernel connection.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    /// Client library version.
    pub axon: &'static str,
    /// Registry protocol revision this client speaks.
    pub protocol: u32,
    /// Kernel version string, once a handshake has reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            axon: AXON_VERSION,
            protocol: PROTOCOL_VERSION,
            kernel: None,
        }
    }
}

impl VersionInfo {
    /// Version info for an unconnected client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the kernel version reported at handshake.
    pub fn with_kernel(mut self, version: String) -> Self {
        self.kernel = Some(version);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_defaults_to_unconnected() {
        let info = VersionInfo::new();
        assert_eq!(info.axon, AXON_VERSION);
        assert_eq!(info.protocol, PROTOCOL_VERSION);
        assert!(info.kernel.is_none());
    }

    #[test]
    fn version_info_records_kernel_version() {
        let info = VersionInfo::new().with_kernel("soma/2.4.1".to_string());
        assert_eq!(info.kernel, Some("soma/2.4.1".to_string()));
    }

    #[test]
    fn version_info_omits_absent_kernel_version() {
        let info = VersionInfo {
            axon: "0.1.0",
            protocol: 1,
            kernel: None,
        };
        insta::assert_json_snapshot!(info, @r###"
        {
          "axon": "0.1.0",
          "protocol": 1
        }
        "###);
    }
}
