//! Test utilities for SDK generation integration tests

// Internal imports (std, crate)
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// External imports (alphabetized)
use sdkgen_core::ApiModel;
use tempfile::TempDir;

/// Creates a temporary directory for test outputs
pub fn create_temp_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let temp_path = temp_dir.path().to_path_buf();
    Ok((temp_dir, temp_path))
}

/// Writes the test model document into `dir`
pub fn create_test_model_document(dir: &Path) -> anyhow::Result<PathBuf> {
    let model_path = dir.join("model.yaml");
    fs::write(&model_path, MODEL_DOCUMENT)?;
    Ok(model_path)
}

/// The test model, parsed and validated
pub fn test_model() -> anyhow::Result<Arc<ApiModel>> {
    Ok(Arc::new(ApiModel::from_str(MODEL_DOCUMENT)?))
}

/// Counts `{` and `}` in `content`
pub fn brace_counts(content: &str) -> (usize, usize) {
    let open = content.matches('{').count();
    let close = content.matches('}').count();
    (open, close)
}

const MODEL_DOCUMENT: &str = r#"
title: Pet Store
version: "4.0"
types:
  - kind: enum
    name: PetStatus
    description: Adoption state of a pet
    values: [available, pending, sold]
  - kind: object
    name: Tag
    properties:
      - name: id
        type: integer
      - name: label
        type: string
  - kind: object
    name: Pet
    description: A pet in the store
    properties:
      - name: id
        type: integer
        required: true
      - name: name
        type: string
        description: Display name
      - name: status
        type: PetStatus
      - name: tags
        type: { array_of: Tag }
      - name: born_at
        type: datetime
      - name: weight
        type: double
      - name: attributes
        type: { map_of: string }
      - name: default
        type: boolean
  - kind: object
    name: PetOwnerLink
    parent: Pet
    properties:
      - name: url
        type: uri
methods:
  - operation_id: all_pets
    http_verb: GET
    path: /pets
    summary: List pets
    parameters:
      - name: status
        type: PetStatus
        in: query
      - name: limit
        type: integer
        in: query
    response_type: { array_of: Pet }
  - operation_id: create_pet
    http_verb: POST
    path: /pets
    summary: Create a pet
    body_type: Pet
    response_type: Pet
  - operation_id: pet
    http_verb: GET
    path: /pets/{pet_id}
    parameters:
      - name: pet_id
        type: integer
        in: path
        required: true
        description: Id of the pet
    response_type: Pet
  - operation_id: delete_pet
    http_verb: DELETE
    path: /pets/{pet_id}
    parameters:
      - name: pet_id
        type: integer
        in: path
        required: true
"#;
