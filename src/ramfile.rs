use crate::errors::RamError;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Width or height of a slave, either a literal pixel count or an expression
/// string resolved at instantiation time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DimensionSpec {
    /// A plain number, used verbatim.
    Literal(u32),
    /// An expression string, substituted and then evaluated.
    Expr(String),
}

/// One derived artifact of a master: destination path and target dimensions,
/// as declared in the ramfile. Fields may still contain `{token}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlaveSpec {
    /// Destination path, possibly containing placeholders.
    pub path: String,
    /// Target width.
    pub width: DimensionSpec,
    /// Target height.
    pub height: DimensionSpec,
}

/// A reusable, named list of slave specifications. Immutable once parsed;
/// instantiation always produces fresh values.
#[derive(Debug, Clone)]
pub struct ConversionTemplate {
    /// The template's name as declared in the ramfile.
    pub name: String,
    /// Declared slave specifications, in declaration order.
    pub slaves: Vec<SlaveSpec>,
}

/// The binding of one master file to a template and/or an explicit slave
/// list, plus the parameter bag used for substitution.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Path of the master file, relative to the working directory.
    pub master: String,
    /// Name of the referenced template, if any. Validated to exist.
    pub template: Option<String>,
    /// Explicit slave list, if any.
    pub slaves: Option<Vec<SlaveSpec>>,
    /// The full raw conversion object. Arbitrary extra fields (`name`,
    /// `basewidth`, ...) are kept here for substitution.
    pub params: Map<String, Value>,
}

/// A parsed, validated ramfile: templates by name and conversions by master
/// path. Read-only during orchestration.
#[derive(Debug, Clone, Default)]
pub struct Ramfile {
    /// Templates by name.
    pub templates: HashMap<String, ConversionTemplate>,
    /// Conversions by master path.
    pub conversions: HashMap<String, Conversion>,
}

impl Ramfile {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails any of the validation rules in [`parse_conversions`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let json: Value = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid ramfile: {}", path.display()))
    }

    /// Builds a ramfile from already-parsed JSON. Both top-level sections are
    /// optional.
    ///
    /// # Errors
    /// Propagates validation failures from [`parse_templates`] and
    /// [`parse_conversions`].
    pub fn from_json(json: &Value) -> Result<Self, RamError> {
        let templates = match json.get("templates") {
            Some(raw) => parse_templates(raw)?,
            None => HashMap::new(),
        };
        let conversions = match json.get("conversions") {
            Some(raw) => parse_conversions(raw, &templates)?,
            None => HashMap::new(),
        };
        debug!(
            templates = templates.len(),
            conversions = conversions.len(),
            "parsed ramfile"
        );
        Ok(Self {
            templates,
            conversions,
        })
    }

    /// Resolves a conversion's template reference. Always `Some` when the
    /// conversion declares a template, since parsing validated the name.
    #[must_use]
    pub fn template_for(&self, conversion: &Conversion) -> Option<&ConversionTemplate> {
        conversion
            .template
            .as_deref()
            .and_then(|name| self.templates.get(name))
    }
}

/// Parses the `templates` section into named [`ConversionTemplate`] values.
///
/// # Errors
/// Fails with [`RamError::InvalidConversion`] when the section or any slave
/// entry is malformed.
pub fn parse_templates(raw: &Value) -> Result<HashMap<String, ConversionTemplate>, RamError> {
    let entries = raw
        .as_object()
        .ok_or_else(|| RamError::InvalidConversion("templates must be an object".into()))?;

    let mut templates = HashMap::new();
    for (name, body) in entries {
        let slaves = body
            .get("slaves")
            .ok_or_else(|| {
                RamError::InvalidConversion(format!("template {name} has no slaves"))
            })
            .and_then(parse_slaves)?;
        templates.insert(
            name.clone(),
            ConversionTemplate {
                name: name.clone(),
                slaves,
            },
        );
    }
    Ok(templates)
}

/// Parses the `conversions` section into a master-keyed map, validating each
/// entry against the declared templates.
///
/// Parsing is all-or-nothing: the first invalid entry aborts the whole parse.
///
/// # Errors
/// - [`RamError::UnnamedConversion`]: an entry has no `master` field
/// - [`RamError::TemplateNotFound`]: `template` names an unknown template
/// - [`RamError::InvalidConversion`]: any other structural problem, including
///   a duplicated master
pub fn parse_conversions(
    raw: &Value,
    templates: &HashMap<String, ConversionTemplate>,
) -> Result<HashMap<String, Conversion>, RamError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| RamError::InvalidConversion("conversions must be a sequence".into()))?;

    let mut conversions = HashMap::new();
    for entry in entries {
        let body = entry
            .as_object()
            .ok_or_else(|| RamError::InvalidConversion("conversion must be an object".into()))?;

        let master = match body.get("master") {
            None => return Err(RamError::UnnamedConversion),
            Some(value) => value
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    RamError::InvalidConversion("master must be a non-empty string".into())
                })?
                .to_string(),
        };

        let template = match body.get("template") {
            None => None,
            Some(value) => {
                let name = value.as_str().ok_or_else(|| {
                    RamError::InvalidConversion(format!("{master}: template must be a string"))
                })?;
                if !templates.contains_key(name) {
                    return Err(RamError::TemplateNotFound(name.to_string()));
                }
                Some(name.to_string())
            }
        };

        let slaves = match body.get("slaves") {
            None => None,
            Some(value) => {
                if !value.is_array() {
                    return Err(RamError::InvalidConversion(format!(
                        "{master}: slaves must be a sequence"
                    )));
                }
                Some(parse_slaves(value)?)
            }
        };

        if template.is_none() && slaves.is_none() {
            return Err(RamError::InvalidConversion(format!(
                "{master}: needs a template or a slaves list"
            )));
        }

        if conversions.contains_key(&master) {
            return Err(RamError::InvalidConversion(format!(
                "duplicate master: {master}"
            )));
        }

        conversions.insert(
            master.clone(),
            Conversion {
                master,
                template,
                slaves,
                params: body.clone(),
            },
        );
    }
    Ok(conversions)
}

fn parse_slaves(raw: &Value) -> Result<Vec<SlaveSpec>, RamError> {
    if !raw.is_array() {
        return Err(RamError::InvalidConversion("slaves must be a sequence".into()));
    }
    serde_json::from_value(raw.clone())
        .map_err(|err| RamError::InvalidConversion(format!("bad slave entry: {err}")))
}
