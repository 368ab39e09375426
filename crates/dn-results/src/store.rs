//! Run storage on disk: `<root>/<run_id>/{manifest.json, hours.jsonl}`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{AnnualResults, HourRecord, RunManifest};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const HOURS_FILE: &str = "hours.jsonl";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a project file, under `.dn/runs`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        Self::new(project_dir.join(".dn").join("runs"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, records: &[HourRecord]) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }
        fs::write(run_dir.join(HOURS_FILE), lines)?;

        // manifest last: its presence marks a complete run
        fs::write(
            run_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(manifest)?,
        )?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.run_dir(run_id).join(MANIFEST_FILE);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_hours(&self, run_id: &str) -> ResultsResult<Vec<HourRecord>> {
        let path = self.run_dir(run_id).join(HOURS_FILE);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ResultsError::from))
            .collect()
    }

    pub fn load_run(&self, run_id: &str) -> ResultsResult<AnnualResults> {
        Ok(AnnualResults {
            manifest: self.load_manifest(run_id)?,
            records: self.load_hours(run_id)?,
        })
    }

    /// Manifests of every stored run of a project, in directory order.
    pub fn list_runs(&self, project_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        if !self.root_dir.exists() {
            return Ok(runs);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&run_id) {
                if manifest.project_name == project_name {
                    runs.push(manifest);
                }
            }
        }
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{manifest, records};

    fn temp_store(tag: &str) -> RunStore {
        let dir = std::env::temp_dir().join(format!("dn_store_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        RunStore::new(dir).unwrap()
    }

    #[test]
    fn save_and_load_run() {
        let store = temp_store("save");
        let m = manifest("run1", "demo");
        store.save_run(&m, &records()).unwrap();

        assert!(store.has_run("run1"));
        let run = store.load_run("run1").unwrap();
        assert_eq!(run.manifest, m);
        assert_eq!(run.records, records());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn missing_run_is_reported() {
        let store = temp_store("missing");
        assert!(!store.has_run("nope"));
        assert!(matches!(
            store.load_manifest("nope"),
            Err(ResultsError::RunNotFound { .. })
        ));
        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn list_filters_by_project() {
        let store = temp_store("list");
        store.save_run(&manifest("a", "demo"), &records()).unwrap();
        store.save_run(&manifest("b", "demo"), &records()).unwrap();
        store.save_run(&manifest("c", "other"), &records()).unwrap();

        let mut ids: Vec<_> = store
            .list_runs("demo")
            .unwrap()
            .into_iter()
            .map(|m| m.run_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);

        store.delete_run("a").unwrap();
        assert!(!store.has_run("a"));
        assert_eq!(store.list_runs("demo").unwrap().len(), 1);

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn project_store_lives_next_to_project() {
        let dir = std::env::temp_dir().join(format!("dn_store_proj_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let store = RunStore::for_project(&dir.join("net.yaml")).unwrap();
        assert_eq!(store.root(), dir.join(".dn").join("runs"));
        let _ = fs::remove_dir_all(&dir);
    }
}
