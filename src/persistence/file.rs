use super::{PersistenceError, PersistenceResult, ScheduleStore};
use crate::schedule::ScheduleRecord;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Directory-backed store: one pretty-printed JSON file per project, named
/// `{project_id}.json`.
pub struct FileScheduleStore {
    directory: PathBuf,
}

impl FileScheduleStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> PersistenceResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    fn path_for(&self, project_id: &str) -> PersistenceResult<PathBuf> {
        // Project ids become file names; anything that would escape the
        // store directory is rejected.
        if project_id.is_empty()
            || project_id.contains('/')
            || project_id.contains('\\')
            || project_id.contains("..")
        {
            return Err(PersistenceError::InvalidData(format!(
                "project id '{project_id}' is not a valid file name"
            )));
        }
        Ok(self.directory.join(format!("{project_id}.json")))
    }
}

impl ScheduleStore for FileScheduleStore {
    fn save(&self, record: &ScheduleRecord) -> PersistenceResult<()> {
        let path = self.path_for(&record.metadata.project_id)?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, record)?;
        Ok(())
    }

    fn load(&self, project_id: &str) -> PersistenceResult<Option<ScheduleRecord>> {
        let path = self.path_for(project_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let record: ScheduleRecord = serde_json::from_reader(file)?;
        Ok(Some(record))
    }

    fn delete(&self, project_id: &str) -> PersistenceResult<bool> {
        let path = self.path_for(project_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}
