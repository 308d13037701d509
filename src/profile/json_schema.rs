//! JSON Schema generation for profile documents.
//!
//! The schema mirrors the checks in [`schema`](super::schema) so editors can
//! flag most problems before the registry ever loads the file.

use serde_json::{json, Value};

use crate::profile::requirement::OsFamily;
use crate::profile::Category;
use crate::system::PackageManager;

/// Generates JSON Schema for profile documents.
pub struct ManifestSchema;

impl ManifestSchema {
    /// Create a new schema generator.
    pub fn new() -> Self {
        Self
    }

    /// Generate the complete JSON Schema for one profile document.
    pub fn generate(&self) -> Value {
        let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "devplan profile",
            "description": "A declarative bundle of components making up a development stack",
            "type": "object",
            "properties": {
                "id": self.id_schema("Unique profile id"),
                "name": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "category": { "type": "string", "enum": categories },
                "version": { "type": "string" },
                "requirements": self.requirements_schema(),
                "components": {
                    "type": "array",
                    "minItems": 1,
                    "items": self.component_schema()
                },
                "verification": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "command": { "type": "string" }
                        },
                        "required": ["name", "command"],
                        "additionalProperties": false
                    }
                },
                "sample_project": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "entrypoint": { "type": "string" }
                    },
                    "required": ["name", "description"],
                    "additionalProperties": false
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["id", "name", "category", "version", "requirements", "components"],
            "additionalProperties": false
        })
    }

    fn id_schema(&self, description: &str) -> Value {
        json!({
            "type": "string",
            "pattern": "^[a-z0-9][a-z0-9._-]*$",
            "description": description
        })
    }

    fn requirements_schema(&self) -> Value {
        let families: Vec<&str> = OsFamily::ALL.iter().map(|os| os.as_str()).collect();

        json!({
            "type": "object",
            "description": "Minimum machine resources",
            "properties": {
                "min_ram_gb": { "type": "number", "minimum": 0 },
                "min_disk_gb": { "type": "number", "minimum": 0 },
                "min_cpu_cores": { "type": "integer", "minimum": 0 },
                "gpu_required": { "type": "boolean", "default": false },
                "os": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "type": "string", "enum": families }
                }
            },
            "required": ["min_ram_gb", "min_disk_gb", "min_cpu_cores", "os"],
            "additionalProperties": false
        })
    }

    fn component_schema(&self) -> Value {
        let mut providers: Vec<&str> = PackageManager::ALL.iter().map(|pm| pm.as_str()).collect();
        providers.push("installer");

        json!({
            "type": "object",
            "properties": {
                "id": self.id_schema("Component id, unique within the profile"),
                "name": { "type": "string" },
                "version": { "type": "string" },
                "provider": { "type": "string", "enum": providers },
                "package": { "type": "string" },
                "size_mb": { "type": "integer", "minimum": 0 },
                "install_minutes": { "type": "integer", "minimum": 0 },
                "depends_on": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Components of the same profile installed first"
                },
                "conflicts_with": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Components of other profiles that cannot coexist"
                },
                "post_install_checks": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["id", "name", "version", "provider", "size_mb", "install_minutes"],
            "additionalProperties": false
        })
    }
}

impl Default for ManifestSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_draft_07_object_schema() {
        let schema = ManifestSchema::new().generate();
        assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn category_enum_lists_every_category() {
        let schema = ManifestSchema::new().generate();
        let values = schema["properties"]["category"]["enum"].as_array().unwrap();
        assert_eq!(values.len(), Category::ALL.len());
        assert!(values.contains(&json!("ml")));
    }

    #[test]
    fn provider_enum_includes_installer() {
        let schema = ManifestSchema::new().generate();
        let providers = &schema["properties"]["components"]["items"]["properties"]["provider"]["enum"];
        assert!(providers.as_array().unwrap().contains(&json!("installer")));
        assert!(providers.as_array().unwrap().contains(&json!("brew")));
    }

    #[test]
    fn versions_must_be_strings() {
        let schema = ManifestSchema::new().generate();
        assert_eq!(schema["properties"]["version"]["type"], json!("string"));
        let component = &schema["properties"]["components"]["items"]["properties"];
        assert_eq!(component["version"]["type"], json!("string"));
    }

    #[test]
    fn requirements_need_os_list() {
        let schema = ManifestSchema::new().generate();
        let required = schema["properties"]["requirements"]["required"]
            .as_array()
            .unwrap();
        assert!(required.contains(&json!("os")));
    }
}
