use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlanConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub fixes: Vec<FixDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FixDefinition {
    pub id: String,
    /// Target file, relative to the root the plan is applied against.
    pub file: String,
    pub action: Action,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    RemoveAttribute {
        element: String,
        attribute: String,
    },
    RenameAttribute {
        element: String,
        attribute: String,
        new_name: String,
    },
    RewriteAttribute {
        element: String,
        attribute: String,
        new_name: String,
        new_value: String,
    },
    RemoveJsonProperty {
        pointer: String,
        #[serde(default)]
        collapse_empty_parent: bool,
    },
    ReplaceJsonValue {
        pointer: String,
        value: serde_json::Value,
    },
}

impl Action {
    pub fn is_markup(&self) -> bool {
        matches!(
            self,
            Action::RemoveAttribute { .. }
                | Action::RenameAttribute { .. }
                | Action::RewriteAttribute { .. }
        )
    }

    pub fn is_json(&self) -> bool {
        !self.is_markup()
    }
}

impl PlanConfig {
    /// Check the plan for schema-level problems, reporting all of them at
    /// once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.fixes.is_empty() {
            issues.push(ValidationIssue::EmptyFixList);
        }

        for fix in &self.fixes {
            let id = || {
                if fix.id.trim().is_empty() {
                    None
                } else {
                    Some(fix.id.clone())
                }
            };
            if fix.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    fix_id: None,
                    field: "id",
                });
            }
            if fix.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    fix_id: id(),
                    field: "file",
                });
            }

            match &fix.action {
                Action::RemoveAttribute { element, attribute } => {
                    if element.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.element",
                        });
                    }
                    if attribute.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.attribute",
                        });
                    }
                }
                Action::RenameAttribute {
                    element,
                    attribute,
                    new_name,
                } => {
                    if element.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.element",
                        });
                    }
                    if attribute.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.attribute",
                        });
                    }
                    if new_name.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.new_name",
                        });
                    }
                }
                Action::RewriteAttribute {
                    element,
                    attribute,
                    new_name,
                    ..
                } => {
                    if element.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.element",
                        });
                    }
                    if attribute.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.attribute",
                        });
                    }
                    if new_name.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            fix_id: id(),
                            field: "action.new_name",
                        });
                    }
                }
                Action::RemoveJsonProperty { pointer, .. } => {
                    if !pointer.starts_with('/') {
                        issues.push(ValidationIssue::InvalidValue {
                            fix_id: id(),
                            message: format!(
                                "remove-json-property requires a property pointer, got '{pointer}'"
                            ),
                        });
                    }
                }
                Action::ReplaceJsonValue { pointer, .. } => {
                    if !pointer.is_empty() && !pointer.starts_with('/') {
                        issues.push(ValidationIssue::InvalidValue {
                            fix_id: id(),
                            message: format!(
                                "replace-json-value requires a JSON pointer, got '{pointer}'"
                            ),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyFixList,
    MissingField {
        fix_id: Option<String>,
        field: &'static str,
    },
    InvalidValue {
        fix_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFixList => write!(f, "plan contains no fixes"),
            ValidationIssue::MissingField { fix_id, field } => match fix_id {
                Some(id) => write!(f, "fix '{id}' missing required field '{field}'"),
                None => write!(f, "fix missing required field '{field}'"),
            },
            ValidationIssue::InvalidValue { fix_id, message } => match fix_id {
                Some(id) => write!(f, "fix '{id}' has an invalid value: {message}"),
                None => write!(f, "invalid value: {message}"),
            },
        }
    }
}
