use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{OfpError, Result};
use crate::version::ProtocolVersion;

/// First transaction id handed out is `base_xid + 1`.
pub const DEFAULT_BASE_XID: u32 = 100;

/// Transaction ids above this value wrap back to the base.
pub const LAST_XID: u32 = 0xffff_ff00;

/// Settings of a `MessageFactory`.
///
/// Every field has a default, so a partial TOML table is a valid config:
///
/// ```toml
/// strict_parsing = true
/// supported_versions = ["V1_0", "V1_3"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Reject messages whose body leaves unconsumed bytes instead of
    /// skipping them with a warning.
    pub strict_parsing: bool,
    /// Versions the factory will create and parse. `HELLO` and `ERROR`
    /// are exempt so that version negotiation can fail gracefully.
    pub supported_versions: BTreeSet<ProtocolVersion>,
    pub base_xid: u32,
}

impl Default for FactoryConfig {
    fn default() -> FactoryConfig {
        FactoryConfig {
            strict_parsing: false,
            supported_versions: ProtocolVersion::ALL.iter().cloned().collect(),
            base_xid: DEFAULT_BASE_XID,
        }
    }
}

impl FactoryConfig {
    /// Load a config from TOML text and validate it.
    pub fn from_toml(text: &str) -> Result<FactoryConfig> {
        let config: FactoryConfig =
            toml::from_str(text).map_err(|e| OfpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strict_parsing(mut self, strict: bool) -> FactoryConfig {
        self.strict_parsing = strict;
        self
    }

    pub fn with_versions(mut self, versions: &[ProtocolVersion]) -> FactoryConfig {
        self.supported_versions = versions.iter().cloned().collect();
        self
    }

    pub fn supports(&self, pv: ProtocolVersion) -> bool {
        self.supported_versions.contains(&pv)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported_versions.is_empty() {
            return Err(OfpError::Config("no supported protocol versions".to_string()));
        }
        if self.base_xid >= LAST_XID {
            return Err(OfpError::Config(format!("base xid {:#x} leaves no room below {:#x}",
                                                self.base_xid,
                                                LAST_XID)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion::*;

    #[test]
    fn defaults_are_lenient_and_cover_every_version() {
        let config = FactoryConfig::default();
        assert!(!config.strict_parsing);
        assert_eq!(config.base_xid, 100);
        for pv in ProtocolVersion::ALL.iter() {
            assert!(config.supports(*pv));
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FactoryConfig::from_toml("strict_parsing = true\n\
                                               supported_versions = [\"V1_0\", \"V1_3\"]\n")
            .unwrap();
        assert!(config.strict_parsing);
        assert!(config.supports(V1_0));
        assert!(!config.supports(V1_1));
        assert_eq!(config.base_xid, DEFAULT_BASE_XID);
    }

    #[test]
    fn rejects_unusable_configs() {
        assert!(FactoryConfig::from_toml("supported_versions = []").is_err());
        assert!(FactoryConfig::from_toml("base_xid = 4294967295").is_err());
        assert!(FactoryConfig::from_toml("strict_parsing = \"yes\"").is_err());
        let config = FactoryConfig::default().with_versions(&[]);
        assert!(config.validate().is_err());
    }
}
