use crate::model::PathNode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("the object {label} is not a path. Please select only path and Compounds.")]
    NotAPath { label: String },
}

/// Pre-render checks on the objects selected for export
#[derive(Debug, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Every exported object must carry path data. Nested non-path children
    /// (stock, machine definitions) are fine and skipped by the renderer.
    pub fn validate_objects(&self, objects: &[PathNode]) -> Result<(), ValidationError> {
        match objects.iter().find(|obj| !obj.has_path()) {
            Some(obj) => Err(ValidationError::NotAPath {
                label: obj.label().to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Command;

    #[test]
    fn test_first_offender_reported() {
        let objects = vec![
            PathNode::leaf("Profile", vec![Command::new("G1")]),
            PathNode::placeholder("Stock"),
            PathNode::placeholder("Fixture"),
        ];

        let err = Validator::new().validate_objects(&objects).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAPath {
                label: "Stock".to_string()
            }
        );
        assert!(err.to_string().contains("Stock is not a path"));
    }

    #[test]
    fn test_nested_placeholders_allowed() {
        let objects = vec![PathNode::group(
            "Project",
            vec![PathNode::placeholder("Stock")],
        )];
        assert!(Validator::new().validate_objects(&objects).is_ok());
    }

    #[test]
    fn test_empty_selection() {
        assert!(Validator::new().validate_objects(&[]).is_ok());
    }
}
