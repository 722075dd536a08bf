//! Model loader for catalog fragments stored on disk
//!
//! - Fragments live in a single directory as `*.json` files
//! - Each file holds a partial catalog (`{"enums": [...], "models": [...]}`)
//! - Files are merged in file-name order so loading is deterministic
//! - Malformed files, or a merged catalog that fails its structure check,
//!   abort loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::{Logger, ObservationScope};
use crate::schema::{SchemaError, SchemaResult};

use super::types::Catalog;

/// Reads catalog fragments from a directory and merges them.
pub struct ModelLoader {
    /// Directory containing fragment files
    model_dir: PathBuf,
    /// Catalog merged so far
    catalog: Catalog,
    /// Number of fragments merged
    fragments: usize,
}

impl ModelLoader {
    /// Creates a loader for the given directory.
    pub fn new(model_dir: &Path) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            catalog: Catalog::new(),
            fragments: 0,
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Loads every `*.json` fragment in the directory.
    ///
    /// A missing directory is an error: the caller asked for it explicitly.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let scope = ObservationScope::new("MODEL_LOAD");
        match self.load_dir() {
            Ok(()) => {
                scope.complete_with_fields(&[("fragments", &self.fragments.to_string())]);
                Ok(())
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn load_dir(&mut self) -> SchemaResult<()> {
        let entries = fs::read_dir(&self.model_dir).map_err(|e| {
            SchemaError::malformed_model(
                self.model_dir.display().to_string(),
                format!("Failed to read model directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_model(
                    self.model_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_fragment_file(&path)?;
        }

        Ok(())
    }

    fn load_fragment_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_model(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let fragment: Catalog = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_model(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let models = fragment.models.len().to_string();
        self.register(fragment)?;
        Logger::info(
            "MODEL_FRAGMENT_LOADED",
            &[("path", &path.display().to_string()), ("models", &models)],
        );
        Ok(())
    }

    /// Merges a fragment directly (for tests or programmatic catalogs).
    pub fn register(&mut self, fragment: Catalog) -> SchemaResult<()> {
        self.catalog.merge(fragment)?;
        self.fragments += 1;
        Ok(())
    }

    /// Writes a fragment as `<name>.json`. Existing files are never overwritten.
    pub fn save_fragment(&self, name: &str, fragment: &Catalog) -> SchemaResult<PathBuf> {
        let path = self.model_dir.join(format!("{}.json", name));
        if path.exists() {
            return Err(SchemaError::malformed_model(
                path.display().to_string(),
                "fragment file already exists",
            ));
        }

        fs::create_dir_all(&self.model_dir).map_err(|e| {
            SchemaError::malformed_model(
                self.model_dir.display().to_string(),
                format!("Failed to create model directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(fragment).map_err(|e| {
            SchemaError::malformed_model(
                path.display().to_string(),
                format!("Failed to serialize fragment: {}", e),
            )
        })?;
        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_model(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Returns the merged catalog after checking its structure.
    pub fn into_catalog(self) -> SchemaResult<Catalog> {
        self.catalog.validate_structure()?;
        Ok(self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelDef, RelationField, ScalarField};
    use tempfile::TempDir;

    fn authors() -> Catalog {
        Catalog::new().with_model(
            ModelDef::new("Author")
                .field(ScalarField::string("id").id())
                .relation(RelationField::has_many("posts", "Post", "author")),
        )
    }

    fn posts() -> Catalog {
        Catalog::new().with_model(
            ModelDef::new("Post")
                .field(ScalarField::string("id").id())
                .field(ScalarField::string("authorId"))
                .relation(RelationField::belongs_to(
                    "author",
                    "Author",
                    &["authorId"],
                    &["id"],
                    "posts",
                )),
        )
    }

    #[test]
    fn test_save_and_load_fragments() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ModelLoader::new(temp_dir.path());
        loader.save_fragment("01_authors", &authors()).unwrap();
        loader.save_fragment("02_posts", &posts()).unwrap();

        let mut loader = ModelLoader::new(temp_dir.path());
        loader.load_all().unwrap();
        assert_eq!(loader.fragment_count(), 2);

        let catalog = loader.into_catalog().unwrap();
        assert!(catalog.model("Author").is_some());
        assert!(catalog.model("Post").is_some());
    }

    #[test]
    fn test_incomplete_catalog_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ModelLoader::new(temp_dir.path());
        loader.register(authors()).unwrap();
        // Post is never declared
        assert!(loader.into_catalog().is_err());
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let mut loader = ModelLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert!(matches!(err, SchemaError::MalformedModel { .. }));
    }

    #[test]
    fn test_non_json_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.txt"), "notes").unwrap();

        let mut loader = ModelLoader::new(temp_dir.path());
        loader.load_all().unwrap();
        assert_eq!(loader.fragment_count(), 0);
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ModelLoader::new(temp_dir.path());
        loader.save_fragment("authors", &authors()).unwrap();
        assert!(loader.save_fragment("authors", &authors()).is_err());
    }

    #[test]
    fn test_missing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ModelLoader::new(&temp_dir.path().join("absent"));
        assert!(loader.load_all().is_err());
    }
}
