use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use itertools::Itertools;
use zip::ZipArchive;

use polygon_uploader_api::{FileType, ProblemService, ResourceAdvancedProperties, SolutionTag};
use polygon_uploader_format::{skip_on_error, FormatError};

/// All the paths matching any of the glob `patterns` relative to `directory`, sorted and without
/// duplicates.
pub fn take_all(directory: &Path, patterns: &[&str]) -> Vec<PathBuf> {
    patterns
        .iter()
        .flat_map(|pattern| {
            let pattern = directory.join(pattern);
            match glob::glob(&pattern.to_string_lossy()) {
                Ok(paths) => paths.filter_map(Result::ok).collect(),
                Err(e) => {
                    warn!("Invalid pattern {}: {}", pattern.display(), e);
                    vec![]
                }
            }
        })
        .filter(|path| path.is_file())
        .sorted()
        .dedup()
        .collect()
}

/// The file name of `path`, lossy.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The Polygon source type of a solution, from its extension.
pub fn source_type(name: &str) -> Option<&'static str> {
    match Path::new(name).extension()?.to_str()? {
        "cpp" | "cc" => Some("cpp.g++17"),
        "java" => Some("java8"),
        "py" => Some("python3"),
        _ => None,
    }
}

/// Upload a file of the problem, logging the failures. Returns whether it has been stored.
pub fn upload_file(
    service: &dyn ProblemService,
    path: &Path,
    name: &str,
    file_type: FileType,
    properties: Option<&ResourceAdvancedProperties>,
) -> bool {
    info!("problem.saveFile name = {}, type = {}", name, file_type);
    let result = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .and_then(|content| Ok(service.save_file(file_type, name, &content, properties)?));
    skip_on_error(name, result).is_some()
}

/// Upload a solution, logging the failures. Returns whether it has been stored.
pub fn upload_solution(
    service: &dyn ProblemService,
    path: &Path,
    name: &str,
    source_type: Option<&str>,
    tag: SolutionTag,
) -> bool {
    let content = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()));
    match skip_on_error(name, content) {
        Some(content) => save_solution(service, name, &content, source_type, tag),
        None => false,
    }
}

/// Save the source of a solution, logging the failures. Returns whether it has been stored.
pub fn save_solution(
    service: &dyn ProblemService,
    name: &str,
    content: &[u8],
    source_type: Option<&str>,
    tag: SolutionTag,
) -> bool {
    info!("problem.saveSolution name = {}, tag = {}", name, tag);
    skip_on_error(
        name,
        service.save_solution(name, content, source_type, tag),
    )
    .is_some()
}

/// Replace the HTML entities found in the code blocks of the judges' pages.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// A zip archive downloaded from a judge.
pub struct Archive {
    zip: ZipArchive<BufReader<File>>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Archive, Error> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let zip = ZipArchive::new(BufReader::new(file))
            .with_context(|| format!("{} is not a valid zip archive", path.display()))?;
        Ok(Archive { zip })
    }

    /// The names of the files in the archive, in archive order.
    pub fn names(&self) -> Vec<String> {
        self.zip
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(String::from)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    /// Extract the member `name` into `directory`, returning the path of the extracted file.
    pub fn extract(&mut self, name: &str, directory: &Path) -> Result<PathBuf, Error> {
        let mut member = match self.zip.by_name(name) {
            Ok(member) => member,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(FormatError::MissingArchiveMember(name.to_string()).into())
            }
            Err(e) => return Err(Error::new(e).context(format!("Failed to extract {}", name))),
        };
        let relative = member
            .enclosed_name()
            .ok_or_else(|| anyhow!("Refusing to extract {} outside of the directory", name))?;
        let dest = directory.join(relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file =
            File::create(&dest).with_context(|| format!("Failed to create {}", dest.display()))?;
        std::io::copy(&mut member, &mut file)
            .with_context(|| format!("Failed to extract {}", name))?;
        Ok(dest)
    }

    /// Extract all the members in `names` into `directory`.
    pub fn extract_all<S: AsRef<str>>(
        &mut self,
        names: &[S],
        directory: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        names
            .iter()
            .map(|name| self.extract(name.as_ref(), directory))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Write a zip archive with the given members.
    pub fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(std::fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
}
