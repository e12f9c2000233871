//! Draft-07 JSON Schema validation of configuration documents.

use jsonschema::error::ValidationErrorKind;
use jsonschema::paths::{JSONPointer, PathChunk};
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::error::{RegistryError, Result, Violation};

const MAX_REF_DEPTH: usize = 32;

/// A compiled, meta-schema checked configuration schema.
pub struct ConfigSchema {
    compiled: JSONSchema,
    document: Value,
}

impl std::fmt::Debug for ConfigSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSchema").finish_non_exhaustive()
    }
}

impl ConfigSchema {
    /// Compile a schema document, rejecting it if it is not a valid Draft-07 schema.
    pub fn compile(schema: &Value) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|error| RegistryError::SchemaInvalid {
                message: format!(
                    "{} at {}",
                    error,
                    display_path(&error.instance_path.to_string())
                ),
            })?;
        Ok(Self {
            compiled,
            document: schema.clone(),
        })
    }

    /// Validate a document and collect every violation, sorted by path.
    ///
    /// A `oneOf` or `anyOf` failure lists why each branch rejected the value.
    pub fn violations(&self, document: &Value) -> Vec<Violation> {
        let mut violations: Vec<Violation> = match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    let mut message = error.to_string();
                    if let Some(details) = self.branch_details(&error) {
                        message.push_str(&details);
                    }
                    Violation::new(pointer_to_path(&error.instance_path.to_string()), message)
                })
                .collect(),
        };
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        violations
    }

    pub fn validate(&self, document: &Value) -> Result<()> {
        let violations = self.violations(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::SchemaValidation { violations })
        }
    }

    /// ` (details: [0] ... | [1] ...)` for a failed `oneOf` or `anyOf`.
    fn branch_details(&self, error: &ValidationError<'_>) -> Option<String> {
        if !matches!(
            error.kind,
            ValidationErrorKind::OneOfNotValid | ValidationErrorKind::AnyOf
        ) {
            return None;
        }
        let branches = self.resolve(&error.schema_path)?.as_array()?;
        let mut details = Vec::with_capacity(branches.len());
        for (idx, branch) in branches.iter().enumerate() {
            let standalone = self.standalone(branch);
            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&standalone)
                .ok()?;
            if let Err(errors) = compiled.validate(&error.instance) {
                let messages: Vec<String> = errors.map(|failure| failure.to_string()).collect();
                details.push(format!("[{idx}] {}", messages.join("; ")));
            }
        }
        (!details.is_empty()).then(|| format!(" (details: {})", details.join(" | ")))
    }

    /// The subschema an error's schema path points at, following local `$ref`s.
    fn resolve(&self, path: &JSONPointer) -> Option<&Value> {
        let mut node = &self.document;
        for chunk in path.iter() {
            let node_ref = self.follow_refs(node)?;
            node = match chunk {
                PathChunk::Index(idx) => node_ref.get(*idx)?,
                PathChunk::Property(key) => node_ref.get(key.as_ref())?,
                PathChunk::Keyword(keyword) => node_ref.get(*keyword)?,
            };
        }
        Some(node)
    }

    fn follow_refs<'a>(&'a self, mut node: &'a Value) -> Option<&'a Value> {
        for _ in 0..MAX_REF_DEPTH {
            match node.get("$ref").and_then(Value::as_str) {
                Some(reference) => node = self.document.pointer(reference.strip_prefix('#')?)?,
                None => return Some(node),
            }
        }
        None
    }

    /// A branch that can be compiled on its own, carrying the root `definitions`.
    fn standalone(&self, branch: &Value) -> Value {
        let mut branch = branch.clone();
        if let (Value::Object(object), Some(definitions)) =
            (&mut branch, self.document.get("definitions"))
        {
            object
                .entry("definitions")
                .or_insert_with(|| definitions.clone());
        }
        branch
    }
}

/// `/0/units/1` -> `0/units/1`
fn pointer_to_path(pointer: &str) -> String {
    pointer.trim_start_matches('/').to_string()
}

fn display_path(pointer: &str) -> String {
    let path = pointer_to_path(pointer);
    if path.is_empty() {
        crate::error::ROOT_PATH.to_string()
    } else {
        path
    }
}
