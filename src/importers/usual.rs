use std::path::{Path, PathBuf};

use anyhow::{Context, Error};

use polygon_uploader_api::{FileType, ProblemService, SolutionTag};
use polygon_uploader_format::*;

use crate::importers::common::{file_name, source_type, take_all, upload_file, upload_solution};
use crate::opt::{RemoteOpt, UploadOpt, UsualOpt};
use crate::session::with_problem;

pub const DESCRIPTION: &str = "Imported by polygon_uploader from local directory
The solution probably uses files, instead of stdin/stdout
";

/// Upload a problem from a local directory.
pub fn main_usual(opt: UsualOpt, remote: &RemoteOpt, upload: &UploadOpt) -> Result<(), Error> {
    let options = upload.options(ErrorRecoveryPolicy::Skip);
    with_problem(remote, &opt.problem, &upload.test_set, |service| {
        import(&opt.directory, service, options).map(|_| ())
    })
}

/// Upload the tests in `<directory>/src`, the generators and checkers, the solutions in
/// `<directory>/solutions` and a general description.
pub fn import(
    directory: &Path,
    service: &dyn ProblemService,
    options: UploadOptions,
) -> Result<UploadReport, Error> {
    let groups = test_groups(&directory.join("src"))?;
    let report = Orchestrator::new(service, options).upload_groups(&groups)?;

    upload_sources(service, directory);
    upload_solutions(service, &directory.join("solutions"));

    info!("problem.saveGeneralDescription");
    skip_on_error(
        "General description",
        service.save_general_description(DESCRIPTION),
    );
    Ok(report)
}

/// The files ending with `sample` are the samples, the others form a single group worth 100
/// points.
pub fn test_groups(tests_dir: &Path) -> Result<Vec<Group>, Error> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(tests_dir)
        .with_context(|| format!("Failed to list the tests in {}", tests_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort_by(|a, b| {
        a.file_stem()
            .cmp(&b.file_stem())
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    debug!("Tests in {}: {:?}", tests_dir.display(), files);

    let (samples, tests): (Vec<_>, Vec<_>) = files.into_iter().partition(|path| is_sample(path));
    let to_test = |path: PathBuf| {
        let description = format!("polygon_uploader: filename = {}", file_name(&path));
        TestDescriptor::from_file(path, description)
    };
    Ok(vec![
        Group::new(
            0,
            samples
                .into_iter()
                .map(|path| to_test(path).in_statements())
                .collect(),
            GroupScoring::Sum,
        ),
        Group::new(
            100,
            tests.into_iter().map(to_test).collect(),
            GroupScoring::AllOrNothing,
        ),
    ])
}

fn is_sample(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.to_string_lossy().ends_with("sample"))
}

/// `testlib` goes into the resources, the generators and the checkers into the sources.
fn upload_sources(service: &dyn ProblemService, directory: &Path) {
    for path in take_all(directory, &["**/*testlib*"]) {
        upload_file(service, &path, &file_name(&path), FileType::Resource, None);
    }
    for path in take_all(
        directory,
        &["**/*gen*.*", "**/*Gen*.*", "**/*check*.*", "**/*Check*.*"],
    ) {
        if path.starts_with(directory.join("src")) || path.starts_with(directory.join("solutions"))
        {
            continue;
        }
        upload_file(service, &path, &file_name(&path), FileType::Source, None);
    }
}

/// The first solution is the main one, all the others are correct.
fn upload_solutions(service: &dyn ProblemService, directory: &Path) {
    let mut tag = SolutionTag::Main;
    for path in take_all(directory, &["*.java", "*.cpp", "*.py"]) {
        let name = file_name(&path);
        if upload_solution(service, &path, &name, source_type(&name), tag) {
            tag = SolutionTag::Ok;
        }
    }
}
