use crate::constants::STORAGE_FILE_NAME;
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

pub struct AppPaths {
    pub data: PathBuf,
    pub storage_file: PathBuf,
}

impl AppPaths {
    pub fn from_project_dirs() -> Option<Self> {
        ProjectDirs::from("com", "ganttris", "Ganttris").map(|dirs| {
            let data = dirs.data_dir().to_path_buf();
            let storage_file = data.join(STORAGE_FILE_NAME);
            Self { data, storage_file }
        })
    }

    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data)
    }
}
