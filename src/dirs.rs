pub struct Dirs {
    project_dirs: directories::ProjectDirs,
}

impl Dirs {
    // None when there is no home directory to look in, which just means we
    // run with the default configuration
    pub fn new() -> Option<Self> {
        directories::ProjectDirs::from("", "", "livevote")
            .map(|project_dirs| Self { project_dirs })
    }

    fn config_dir(&self) -> &std::path::Path {
        self.project_dirs.config_dir()
    }

    pub fn config_file(&self, name: &str) -> Option<std::path::PathBuf> {
        let file = self.config_dir().join(name);
        if file.is_file() {
            Some(file)
        } else {
            None
        }
    }
}
