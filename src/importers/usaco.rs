use std::path::Path;

use anyhow::Error;
use regex::Regex;

use polygon_uploader_api::{ProblemService, SolutionTag};
use polygon_uploader_format::*;

use crate::download::{download_file_to, download_web_page};
use crate::importers::common::{save_solution, unescape_html, Archive};
use crate::opt::{RemoteOpt, UploadOpt, UsacoOpt};
use crate::scratch::ScratchDir;
use crate::session::with_problem;

lazy_static! {
    static ref INPUT_FILE: Regex = Regex::new(r"(?:^|/)(\d+)\.in$").expect("Invalid regex");
    static ref SOLUTION: Regex =
        Regex::new(r#"(?s)<pre[^>]*class\s*=\s*["'][^"']*prettyprint[^"']*["'][^>]*>(.*?)</pre>"#)
            .expect("Invalid regex");
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("Invalid regex");
}

/// The identifiers of a USACO problem: `cpid` for its page, `usaco_id` for its test data.
#[derive(Debug, Clone)]
pub struct UsacoProblem {
    pub cpid: String,
    pub usaco_id: String,
}

impl UsacoProblem {
    pub fn problem_url(&self) -> String {
        format!(
            "http://usaco.org/index.php?page=viewproblem2&cpid={}",
            self.cpid
        )
    }

    pub fn test_data_url(&self) -> String {
        format!("http://usaco.org/current/data/{}.zip", self.usaco_id)
    }

    pub fn tutorial_url(&self) -> String {
        format!("http://usaco.org/current/data/sol_{}.html", self.usaco_id)
    }

    fn description(&self) -> String {
        format!(
            "Imported by usaco-import from {}\nThe solution probably uses files, instead of stdin/stdout\n",
            self.problem_url()
        )
    }
}

/// Import a problem from usaco.org.
pub fn main_usaco(opt: UsacoOpt, remote: &RemoteOpt, upload: &UploadOpt) -> Result<(), Error> {
    let options = upload.options(ErrorRecoveryPolicy::Skip);
    let problem = UsacoProblem {
        cpid: opt.cpid,
        usaco_id: opt.usaco_id,
    };
    let scratch = ScratchDir::new("__usaco")?;
    with_problem(remote, &opt.problem, &upload.test_set, |service| {
        let archive = scratch.path().join(format!("{}.zip", problem.usaco_id));
        info!("Downloading {}", problem.test_data_url());
        download_file_to(&problem.test_data_url(), &archive)?;
        import(&problem, &archive, scratch.path(), service, options)?;
        download_solutions(service, &problem, &download_web_page);
        Ok(())
    })
}

/// A solution found in an analysis page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub name: String,
    pub source_type: &'static str,
    pub code: String,
}

/// The solutions in the code blocks of an analysis page, numbered from 1. The ones including a
/// header are C++, the others Java.
pub fn parse_solutions(page: &str) -> Vec<Solution> {
    SOLUTION
        .captures_iter(page)
        .enumerate()
        .map(|(index, captures)| {
            let code = unescape_html(&TAG.replace_all(&captures[1], ""));
            let (extension, source_type) = if code.contains("#include") {
                ("cpp", "cpp.g++17")
            } else {
                ("java", "java8")
            };
            Solution {
                name: format!("sol{}.{}", index + 1, extension),
                source_type,
                code,
            }
        })
        .collect()
}

/// Upload the solutions of the analysis page: the first one is the main solution. `fetch`
/// downloads a web page. Failures are logged and never fatal.
pub fn download_solutions(
    service: &dyn ProblemService,
    problem: &UsacoProblem,
    fetch: &dyn Fn(&str) -> Result<String, Error>,
) {
    let page = match skip_on_error("Solutions", fetch(&problem.tutorial_url())) {
        Some(page) => page,
        None => return,
    };
    let mut tag = SolutionTag::Main;
    for solution in parse_solutions(&page) {
        if save_solution(
            service,
            &solution.name,
            solution.code.as_bytes(),
            Some(solution.source_type),
            tag,
        ) {
            tag = SolutionTag::Ok;
        }
    }
}

/// Upload the tests in the archive: the first one is the sample, the others are worth 100 points
/// together. The checker compares the words of the output.
pub fn import(
    problem: &UsacoProblem,
    archive: &Path,
    work_dir: &Path,
    service: &dyn ProblemService,
    options: UploadOptions,
) -> Result<UploadReport, Error> {
    let mut archive = Archive::open(archive)?;
    let mut inputs: Vec<(u64, String)> = archive
        .names()
        .into_iter()
        .filter_map(|name| {
            let number = INPUT_FILE.captures(&name)?[1].parse().ok()?;
            Some((number, name))
        })
        .collect();
    inputs.sort();
    debug!("Tests: {:?}", inputs);

    let mut samples = vec![];
    let mut tests = vec![];
    for (number, name) in inputs {
        let path = archive.extract(&name, work_dir)?;
        let test = TestDescriptor::from_file(path, format!("usaco: {}", name));
        if number == 1 {
            samples.push(test.in_statements());
        } else {
            tests.push(test);
        }
    }
    let groups = vec![
        Group::new(0, samples, GroupScoring::Sum),
        Group::new(100, tests, GroupScoring::Sum),
    ];
    let report = Orchestrator::new(service, options).upload_groups(&groups)?;

    info!("problem.setChecker std::wcmp.cpp");
    skip_on_error("Checker", service.set_checker("std::wcmp.cpp"));
    info!("problem.saveGeneralDescription");
    skip_on_error(
        "General description",
        service.save_general_description(&problem.description()),
    );
    info!("problem.saveGeneralTutorial");
    skip_on_error(
        "General tutorial",
        service.save_general_tutorial(&problem.tutorial_url()),
    );
    info!("problem.saveTags");
    skip_on_error("Tags", service.save_tags(&["usaco".to_string()]));
    Ok(report)
}
