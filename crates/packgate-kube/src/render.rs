//! Template engine based on MiniJinja
//!
//! Renders every manifest template of a pack with the shared context
//! (`values`, `release`, `pack`) into one multi-document manifest. Undefined
//! variables are strict errors: a template referencing a value the request
//! did not carry must fail the deploy, not emit empty YAML.

use base64::Engine as _;
use minijinja::{Environment, Error as TemplateError, ErrorKind, UndefinedBehavior, Value};
use packgate_core::{LoadedPack, TemplateContext};

use crate::error::{KubeError, Result};

/// The template engine
pub struct Engine {
    strict: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a new engine with strict undefined behavior
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Create an engine that tolerates undefined variables
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        if self.strict {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(UndefinedBehavior::Lenient);
        }

        env.add_filter("toyaml", toyaml);
        env.add_filter("tojson", tojson);
        env.add_filter("b64encode", b64encode);
        env.add_filter("quote", quote);
        env.add_filter("indent", indent);
        env.add_filter("nindent", nindent);

        env
    }

    /// Render all manifest templates of a pack into one multi-document manifest.
    ///
    /// Helper templates are loaded into the environment so manifests can
    /// import their macros, but produce no output of their own. Templates
    /// that render to whitespace only are dropped.
    pub fn render_pack(&self, pack: &LoadedPack, context: &TemplateContext) -> Result<String> {
        let mut env = self.create_environment();

        for template in &pack.templates {
            env.add_template_owned(template.name.clone(), template.source.clone())
                .map_err(|e| template_error(&template.name, e))?;
        }

        let ctx = minijinja::context! {
            values => &context.values,
            release => &context.release,
            pack => &context.pack,
        };

        let mut documents = Vec::new();
        for template in &pack.templates {
            if !template.is_manifest() {
                continue;
            }

            let tmpl = env
                .get_template(&template.name)
                .map_err(|e| template_error(&template.name, e))?;
            let rendered = tmpl
                .render(&ctx)
                .map_err(|e| template_error(&template.name, e))?;

            if rendered.trim().is_empty() {
                continue;
            }
            documents.push(rendered.trim().to_string());
        }

        Ok(documents.join("\n---\n"))
    }
}

fn template_error(name: &str, err: TemplateError) -> KubeError {
    KubeError::Template(format!("{name}: {err:#}"))
}

/// Convert a value to YAML format
///
/// Usage: {{ values.labels | toyaml }}
fn toyaml(value: Value) -> std::result::Result<String, TemplateError> {
    let json_value: serde_json::Value = serde_json::to_value(&value)
        .map_err(|e| TemplateError::new(ErrorKind::InvalidOperation, e.to_string()))?;

    let yaml = serde_yaml::to_string(&json_value)
        .map_err(|e| TemplateError::new(ErrorKind::InvalidOperation, e.to_string()))?;

    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// Convert a value to JSON format
///
/// Usage: {{ values.containers | tojson }}
fn tojson(value: Value) -> std::result::Result<String, TemplateError> {
    let json_value: serde_json::Value = serde_json::to_value(&value)
        .map_err(|e| TemplateError::new(ErrorKind::InvalidOperation, e.to_string()))?;

    serde_json::to_string(&json_value)
        .map_err(|e| TemplateError::new(ErrorKind::InvalidOperation, e.to_string()))
}

/// Base64 encode a string
///
/// Usage: {{ values.global.tlsCert | b64encode }}
fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// Quote a string with double quotes
///
/// Usage: {{ name | quote }}
fn quote(value: Value) -> String {
    let s = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Indent every non-empty line
///
/// Usage: {{ content | indent(4) }}
fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent with a leading newline (YAML block insertion)
///
/// Usage: {{ values.labels | toyaml | nindent(4) }}
fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}
