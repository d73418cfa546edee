use crate::adjacency::{Symbols, View};
use crate::consts::*;
use crate::typedef::*;
use failure::ResultExt;
use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

/// How to start the debugger
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct GdbConfig {
    /// The gdb executable
    pub path: PathBuf,
    /// Extra command line arguments
    pub args: Vec<String>,
}

impl Default for GdbConfig {
    fn default() -> GdbConfig {
        GdbConfig {
            path: DEFAULT_GDB.into(),
            args: Vec::new(),
        }
    }
}

/// An adjacency dump taken whenever a breakpoint is hit in batch mode
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AutoDump {
    /// The breakpoint location, exactly as listed in `breakpoints`
    pub at: String,
    /// The view to dump
    pub view: View,
}

impl FromStr for AutoDump {
    type Err = ::failure::Error;

    /// Parses `<location>=<view>`
    fn from_str(s: &str) -> Result<AutoDump> {
        let mut parts = s.splitn(2, '=');

        match (parts.next(), parts.next()) {
            (Some(at), Some(view)) if !at.trim().is_empty() => Ok(AutoDump {
                at: at.trim().into(),
                view: view.parse()?,
            }),
            _ => bail!(InspectError::MalformedDump { request: s.into() }),
        }
    }
}

/// Everything needed to set up a debugging session
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// The program to debug
    pub program: Option<PathBuf>,
    /// The file redirected to the debuggee's stdin
    pub input: Option<PathBuf>,
    /// Breakpoint locations, inserted in this order
    pub breakpoints: Vec<String>,
    /// The versions of this tool the config was written for
    pub requires: Option<VersionReq>,
    /// The debugger
    pub gdb: GdbConfig,
    /// The variables read by adjacency dumps
    pub symbols: Symbols,
    /// Dumps taken in batch mode
    #[serde(rename = "dump")]
    pub dumps: Vec<AutoDump>,
    /// Whether a batch run fails when a breakpoint was never hit
    pub strict: bool,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            program: None,
            input: Some(DEFAULT_INPUT.into()),
            breakpoints: DEFAULT_BREAKPOINTS.iter().map(|&b| b.into()).collect(),
            requires: None,
            gdb: Default::default(),
            symbols: Default::default(),
            dumps: Vec::new(),
            strict: false,
        }
    }
}

impl SessionConfig {
    /// Parses a TOML config, filling everything missing with the defaults
    pub fn from_toml(text: &str) -> Result<SessionConfig> {
        let config: SessionConfig = toml::from_str(text)?;
        config.check_version()?;

        Ok(config)
    }

    /// Loads a TOML config from the given file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SessionConfig> {
        let path = path.as_ref();

        let text = fs::read_to_string(path)
            .with_context(|_| format!("unable to read {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|_| format!("invalid config {}", path.display()))?;

        info!(path = %path.display(), "loaded config");

        Ok(config)
    }

    /// Loads `explicit` if given, otherwise [`CONFIG_FILE_NAME`] from `dir` if it exists,
    /// otherwise returns the defaults
    pub fn discover<P: AsRef<Path>>(explicit: Option<&Path>, dir: P) -> Result<SessionConfig> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let implicit = dir.as_ref().join(CONFIG_FILE_NAME);

        if implicit.is_file() {
            Self::load(implicit)
        } else {
            debug!("no config file, using defaults");
            Ok(Default::default())
        }
    }

    /// Fails if the config requires a version of this tool other than the running one
    pub fn check_version(&self) -> Result<()> {
        if let Some(ref requires) = self.requires {
            ensure!(
                requires.matches(&*VERSION),
                InspectError::IncompatibleConfig {
                    required: requires.to_string(),
                    running: VERSION.to_string(),
                }
            );
        }

        Ok(())
    }

    /// The program to debug
    pub fn program(&self) -> Result<&Path> {
        match self.program {
            Some(ref program) => Ok(program),
            None => bail!(InspectError::MissingProgram),
        }
    }
}
