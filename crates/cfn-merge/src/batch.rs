//! File and directory orchestration around the merge engine.
//!
//! Reading and writing templates lives here so that [`FragmentMerger`] stays
//! a pure function of two trees.

use std::fs;
use std::path::{Path, PathBuf};

use cfn_yaml::DocumentNode;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::MergeError;
use crate::merge::FragmentMerger;

/// Serialization used when writing a merged document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Pick the format matching a file extension, defaulting to YAML.
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether a path names a template the merger can read.
pub fn is_template(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("yml" | "yaml" | "json"))
}

/// Read a YAML or JSON template from disk.
pub fn load_document(path: &Path) -> Result<DocumentNode, MergeError> {
    let text = fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;

    if OutputFormat::from_path(path) == OutputFormat::Json {
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| MergeError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        return Ok(cfn_yaml::from_json(value));
    }

    cfn_yaml::parse_file(&text, &path.display().to_string()).map_err(|source| MergeError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn render_document(doc: &DocumentNode, format: OutputFormat) -> String {
    match format {
        OutputFormat::Yaml => cfn_yaml::to_yaml_string(doc),
        OutputFormat::Json => format!("{:#}\n", cfn_yaml::to_json(doc)),
    }
}

/// Write a document, creating parent directories as needed.
pub fn write_document(path: &Path, doc: &DocumentNode, format: OutputFormat) -> Result<(), MergeError> {
    ensure_parent(path)?;
    fs::write(path, render_document(doc, format)).map_err(|e| MergeError::io(path, e))
}

fn ensure_parent(path: &Path) -> Result<(), MergeError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| MergeError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// All template files below `dir`, sorted so merges are deterministic.
pub fn collect_fragments(dir: &Path) -> Result<Vec<PathBuf>, MergeError> {
    let mut fragments = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_template(entry.path()) {
            fragments.push(entry.into_path());
        }
    }
    Ok(fragments)
}

/// Expand fragment arguments: directories become their sorted template files,
/// files are kept as given. Order across arguments is preserved.
pub fn expand_fragments(paths: &[PathBuf]) -> Result<Vec<PathBuf>, MergeError> {
    let mut fragments = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = collect_fragments(path)?;
            debug!(dir = %path.display(), count = found.len(), "expanded fragment directory");
            fragments.extend(found);
        } else {
            fragments.push(path.clone());
        }
    }
    Ok(fragments)
}

/// Hook run on the result of every single fragment merge.
///
/// Receives the merged tree and the path of the fragment that was merged in.
pub type PostMergeHook<'a> = Box<dyn Fn(DocumentNode, &Path) -> DocumentNode + 'a>;

/// Outcome of [`BatchMerge::merge_directory`], as paths relative to the
/// source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    pub merged: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
}

impl DirectoryReport {
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty() && self.copied.is_empty()
    }
}

pub struct BatchMerge<'a> {
    merger: &'a FragmentMerger,
    post_merge: Option<PostMergeHook<'a>>,
    dry_run: bool,
}

impl<'a> BatchMerge<'a> {
    pub fn new(merger: &'a FragmentMerger) -> Self {
        Self {
            merger,
            post_merge: None,
            dry_run: false,
        }
    }

    pub fn with_post_merge(
        mut self,
        hook: impl Fn(DocumentNode, &Path) -> DocumentNode + 'a,
    ) -> Self {
        self.post_merge = Some(Box::new(hook));
        self
    }

    /// When set, [`merge_directory`](Self::merge_directory) reports what it
    /// would do without touching the target directory.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn merge_one(&self, target: DocumentNode, fragment: DocumentNode, path: &Path) -> DocumentNode {
        let merged = self.merger.merge(target, fragment);
        match &self.post_merge {
            Some(hook) => hook(merged, path),
            None => merged,
        }
    }

    /// Fold every fragment into `base`, in the order given.
    pub fn merge_files(&self, base: &Path, fragments: &[PathBuf]) -> Result<DocumentNode, MergeError> {
        let mut doc = load_document(base)?;
        for fragment in fragments {
            debug!(fragment = %fragment.display(), "merging fragment");
            let source = load_document(fragment)?;
            doc = self.merge_one(doc, source, fragment);
        }
        Ok(doc)
    }

    /// Merge every template under `source_dir` into its counterpart under
    /// `target_dir`. Files without a counterpart are copied over.
    pub fn merge_directory(
        &self,
        source_dir: &Path,
        target_dir: &Path,
    ) -> Result<DirectoryReport, MergeError> {
        let mut report = DirectoryReport::default();

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source_path = entry.path();
            let relative = source_path
                .strip_prefix(source_dir)
                .unwrap_or(source_path)
                .to_path_buf();
            let target_path = target_dir.join(&relative);

            if is_template(source_path) && target_path.is_file() {
                let target = load_document(&target_path)?;
                let fragment = load_document(source_path)?;
                let merged = self.merge_one(target, fragment, source_path);

                if !self.dry_run {
                    write_document(&target_path, &merged, OutputFormat::from_path(&target_path))?;
                }
                info!(file = %relative.display(), dry_run = self.dry_run, "merged");
                report.merged.push(relative);
            } else {
                if !self.dry_run {
                    ensure_parent(&target_path)?;
                    fs::copy(source_path, &target_path)
                        .map_err(|e| MergeError::io(&target_path, e))?;
                }
                info!(file = %relative.display(), dry_run = self.dry_run, "copied");
                report.copied.push(relative);
            }
        }

        Ok(report)
    }
}
