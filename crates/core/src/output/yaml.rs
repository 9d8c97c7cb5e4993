use crate::models::FoldMap;
use super::FormatError;

/// Convert FoldMap to YAML
pub fn to_yaml(fold_map: &FoldMap) -> Result<String, FormatError> {
    serde_yaml::to_string(fold_map).map_err(FormatError::from)
}
