//! Class pools backed by directories and jar archives.

use std::{fs, path::PathBuf, sync::Arc};

use crate::classes::ClassFileReader;

use super::{Resolution, Resolver};

/// A pool that reads classes from a directory tree of `.class` files.
#[derive(Debug)]
pub struct DirectoryClassPool {
    directory: PathBuf,
    reader: Arc<dyn ClassFileReader>,
}

impl DirectoryClassPool {
    /// Creates a pool rooted at `directory`, delegating parsing to `reader`.
    pub fn new(directory: impl Into<PathBuf>, reader: Arc<dyn ClassFileReader>) -> Self {
        Self {
            directory: directory.into(),
            reader,
        }
    }

    fn class_file_path(&self, binary_name: &str) -> PathBuf {
        self.directory.join(binary_name).with_extension("class")
    }
}

impl Resolver for DirectoryClassPool {
    fn contains(&self, binary_name: &str) -> bool {
        self.class_file_path(binary_name).is_file()
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        let path = self.class_file_path(binary_name);
        if !path.is_file() {
            return Resolution::NotFound;
        }
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => return Resolution::FailedToRead(err.to_string()),
        };
        match self.reader.read(binary_name, &bytes) {
            Ok(class) => Resolution::Found(Arc::new(class)),
            Err(err) => Resolution::Invalid(err.message),
        }
    }

    fn class_names(&self) -> Vec<String> {
        walkdir::WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|it| it.path().extension().is_some_and(|ext| ext == "class"))
            .filter_map(|it| {
                it.path()
                    .strip_prefix(&self.directory)
                    .ok()?
                    .with_extension("")
                    .to_str()
                    .map(|name| name.replace(std::path::MAIN_SEPARATOR, "/"))
            })
            .collect()
    }

    fn class_path(&self) -> Vec<PathBuf> {
        vec![self.directory.clone()]
    }
}

/// A pool that reads classes from a jar archive.
#[cfg(feature = "jar")]
#[derive(Debug)]
pub struct JarClassPool {
    jar_file: PathBuf,
    reader: Arc<dyn ClassFileReader>,
}

#[cfg(feature = "jar")]
impl JarClassPool {
    /// Creates a pool over `jar_file`, delegating parsing to `reader`.
    pub fn new(jar_file: impl Into<PathBuf>, reader: Arc<dyn ClassFileReader>) -> Self {
        Self {
            jar_file: jar_file.into(),
            reader,
        }
    }

    fn open_archive(
        &self,
    ) -> Result<zip::ZipArchive<std::io::BufReader<fs::File>>, Resolution> {
        let jar_file = fs::File::open(&self.jar_file)
            .map_err(|err| Resolution::FailedToRead(err.to_string()))?;
        zip::ZipArchive::new(std::io::BufReader::new(jar_file)).map_err(|err| match err {
            zip::result::ZipError::Io(io_err) => Resolution::FailedToRead(io_err.to_string()),
            other => Resolution::Invalid(other.to_string()),
        })
    }
}

#[cfg(feature = "jar")]
impl Resolver for JarClassPool {
    fn contains(&self, binary_name: &str) -> bool {
        let Ok(archive) = self.open_archive() else {
            return false;
        };
        archive
            .index_for_name(&format!("{binary_name}.class"))
            .is_some()
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        use std::io::Read;

        let mut archive = match self.open_archive() {
            Ok(archive) => archive,
            Err(failure) => return failure,
        };
        let mut entry = match archive.by_name(&format!("{binary_name}.class")) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Resolution::NotFound,
            Err(zip::result::ZipError::Io(io_err)) => {
                return Resolution::FailedToRead(io_err.to_string());
            }
            Err(other) => return Resolution::Invalid(other.to_string()),
        };
        let mut bytes = Vec::new();
        if let Err(err) = entry.read_to_end(&mut bytes) {
            return Resolution::FailedToRead(err.to_string());
        }
        match self.reader.read(binary_name, &bytes) {
            Ok(class) => Resolution::Found(Arc::new(class)),
            Err(err) => Resolution::Invalid(err.message),
        }
    }

    fn class_names(&self) -> Vec<String> {
        let Ok(archive) = self.open_archive() else {
            return Vec::new();
        };
        let mut names: Vec<String> = archive
            .file_names()
            .filter_map(|it| it.strip_suffix(".class"))
            .map(ToOwned::to_owned)
            .collect();
        names.sort_unstable();
        names
    }

    fn class_path(&self) -> Vec<PathBuf> {
        vec![self.jar_file.clone()]
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        classes::{ClassNode, InvalidClassFile},
        tests::class,
    };

    use super::*;

    /// A reader for the tests' fake wire format: the bytes are the class name,
    /// or `!` to simulate a malformed file.
    #[derive(Debug)]
    struct NameEchoReader;

    impl ClassFileReader for NameEchoReader {
        fn read(&self, binary_name: &str, bytes: &[u8]) -> Result<ClassNode, InvalidClassFile> {
            if bytes == b"!" {
                return Err(InvalidClassFile {
                    class_name: binary_name.to_owned(),
                    message: "not a class file".into(),
                });
            }
            Ok(class(binary_name).build())
        }
    }

    #[test]
    fn directory_pool_resolves_and_enumerates() {
        let dir = std::env::temp_dir().join(format!(
            "percolator-pool-test-{}",
            std::process::id()
        ));
        fs::create_dir_all(dir.join("p")).unwrap();
        fs::write(dir.join("p/A.class"), b"ok").unwrap();
        fs::write(dir.join("p/Bad.class"), b"!").unwrap();

        let pool = DirectoryClassPool::new(&dir, Arc::new(NameEchoReader));
        assert!(pool.contains("p/A"));
        assert!(pool.resolve("p/A").is_found());
        assert!(matches!(pool.resolve("p/Bad"), Resolution::Invalid(_)));
        assert!(matches!(pool.resolve("p/Absent"), Resolution::NotFound));
        assert_eq!(pool.class_names(), vec!["p/A", "p/Bad"]);
        assert_eq!(pool.class_path(), vec![dir.clone()]);

        fs::remove_dir_all(dir).unwrap();
    }
}
