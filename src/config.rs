use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Key holding the broker list inside a consumer section.
pub const BOOTSTRAP_SERVERS_KEY: &str = "bootstrap.servers";

/// Section read when none is named on the command line.
pub const DEFAULT_SECTION: &str = "kcat";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config section [{section}] has no '{key}' entry", key = BOOTSTRAP_SERVERS_KEY)]
    MissingBootstrapServers { section: String },
}

/// Flat key/value entries of one config section, in key order.
pub type ConfigSection = BTreeMap<String, String>;

/// A sectioned key/value store loaded from a TOML file.
///
/// Every top-level table is a section. Write librdkafka property names as
/// quoted keys:
///
/// ```toml
/// [kcat]
/// "bootstrap.servers" = "host:9092"
/// "api.version.request" = true
/// "api.version.request.timeout.ms" = 10000
/// ```
///
/// Unquoted dotted keys become nested tables in TOML, which are flattened
/// back into dotted names. They cannot express a property that is a prefix
/// of another one, so quoting is the safe form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSections {
    sections: BTreeMap<String, ConfigSection>,
}

impl ConfigSections {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = raw.parse()?;
        let mut sections = BTreeMap::new();

        for (name, value) in table {
            // Top-level scalars have no section to live in.
            if let toml::Value::Table(entries) = value {
                let mut section = ConfigSection::new();
                flatten_into(&mut section, None, entries);
                sections.insert(name, section);
            }
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

fn flatten_into(out: &mut ConfigSection, prefix: Option<&str>, table: toml::Table) {
    for (key, value) in table {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };

        match value {
            toml::Value::Table(nested) => flatten_into(out, Some(&full_key), nested),
            other => {
                out.insert(full_key, scalar_to_string(&other));
            }
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        toml::Value::Table(_) => value.to_string(),
    }
}
