//! Plugin identity and version.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{PluginError, Result};

/// Name the plugin is installed under.
pub const PLUGIN_NAME: &str = "spring-cloud-dataflow-for-pcf-cli-plugin";

/// Version of this build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lowest cf CLI version the plugin supports.
pub const MIN_CLI_VERSION: PluginVersion = PluginVersion {
    major: 6,
    minor: 7,
    build: 0,
};

/// Printed when the binary is run without a command.
pub const STANDALONE_NOTICE: &str = "This program is a plugin which expects to be installed into the cf CLI. It is not intended to be run stand-alone.";

/// A `major.minor.build` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PluginVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl FromStr for PluginVersion {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| PluginError::InvalidVersion {
            version: s.to_string(),
            message: message.to_string(),
        };

        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, build] = parts.as_slice() else {
            return Err(invalid("Expected 3 dot-separated integer components."));
        };

        let component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| invalid("Expected integer components."))
        };

        Ok(Self {
            major: component(*major)?,
            minor: component(*minor)?,
            build: component(*build)?,
        })
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// A command the plugin provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginCommand {
    pub name: &'static str,
    pub alias: &'static str,
    pub help_text: &'static str,
    pub usage: &'static str,
}

/// Everything the plugin reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub version: PluginVersion,
    pub min_cli_version: PluginVersion,
    pub commands: Vec<PluginCommand>,
}

/// Commands provided by the plugin.
pub fn commands() -> Vec<PluginCommand> {
    vec![
        PluginCommand {
            name: "dataflow-shell",
            alias: "dfsh",
            help_text: "Open a dataflow shell to a Spring Cloud Dataflow for PCF dataflow server",
            usage: "dataflow-plugin dataflow-shell [OPTIONS] SERVER",
        },
        PluginCommand {
            name: "skipper-shell",
            alias: "skipsh",
            help_text: "Open a skipper shell to a Spring Cloud Dataflow for PCF skipper server",
            usage: "dataflow-plugin skipper-shell [OPTIONS] SERVER",
        },
    ]
}

/// Get the metadata of this build.
pub fn metadata() -> Result<PluginMetadata> {
    Ok(PluginMetadata {
        name: PLUGIN_NAME,
        version: VERSION.parse()?,
        min_cli_version: MIN_CLI_VERSION,
        commands: commands(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_components() {
        let version: PluginVersion = "5.4.3".parse().unwrap();
        assert_eq!(
            version,
            PluginVersion {
                major: 5,
                minor: 4,
                build: 3
            }
        );
        assert_eq!(version.to_string(), "5.4.3");
    }

    #[test]
    fn wrong_number_of_components() {
        let err = "2.0".parse::<PluginVersion>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "pluginVersion \"2.0\" has invalid format. Expected 3 dot-separated integer components."
        );
    }

    #[test]
    fn non_integer_component() {
        let err = "2.0.".parse::<PluginVersion>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "pluginVersion \"2.0.\" has invalid format. Expected integer components."
        );

        assert!("1.2.3-SNAPSHOT".parse::<PluginVersion>().is_err());
    }

    #[test]
    fn versions_order() {
        let older: PluginVersion = "6.7.0".parse().unwrap();
        let newer: PluginVersion = "6.10.1".parse().unwrap();
        assert!(older < newer);
    }

    #[test]
    fn build_metadata() {
        let meta = metadata().unwrap();
        assert_eq!(meta.name, PLUGIN_NAME);
        assert_eq!(meta.version.to_string(), VERSION);
        assert_eq!(meta.min_cli_version.to_string(), "6.7.0");
        let names: Vec<_> = meta.commands.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["dataflow-shell", "skipper-shell"]);
    }

    #[test]
    fn metadata_serializes() {
        let json = serde_json::to_value(metadata().unwrap()).unwrap();
        assert_eq!(json["name"], PLUGIN_NAME);
        assert_eq!(json["min_cli_version"]["major"], 6);
        assert_eq!(json["commands"][0]["alias"], "dfsh");
    }
}
