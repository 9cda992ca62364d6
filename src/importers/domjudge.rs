use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use regex::Regex;

use polygon_uploader_api::{FileType, ProblemInfo, ProblemService, SolutionTag, Statement};
use polygon_uploader_format::*;

use crate::importers::common::{file_name, take_all, upload_file, upload_solution};
use crate::opt::{DomjudgeOpt, RemoteOpt, UploadOpt};
use crate::session::with_problem;

pub const DESCRIPTION: &str = "Imported by domjudge-import
The statement shouldn't compile, edit it
The checker is set to wcmp by default, if not set custom checker/validator should be implemented, the original ones are uploaded to resource files
";

/// Memory limit of the DOMjudge problems, in MB.
const MEMORY_LIMIT: u32 = 512;

lazy_static! {
    static ref INPUT_BLOCK: Regex = latex_block("Input");
    static ref OUTPUT_BLOCK: Regex = latex_block("Output");
    static ref PROBLEM_NAME: Regex = latex_command("problemname");
}

fn latex_block(name: &str) -> Regex {
    Regex::new(&format!(r"(?s)\\begin\{{{name}\}}(.*)\\end\{{{name}\}}"))
        .expect("Invalid LaTeX block regex")
}

fn latex_command(name: &str) -> Regex {
    Regex::new(&format!(r"\\{name}\{{([^}}]*)\}}")).expect("Invalid LaTeX command regex")
}

/// The kind of a directory of `submissions/`.
fn submission_tag(category: &str) -> Option<SolutionTag> {
    match category {
        "accepted" => Some(SolutionTag::Ok),
        "wrong_answer" => Some(SolutionTag::WrongAnswer),
        "time_limit_exceeded" => Some(SolutionTag::TimeLimit),
        "run_time_error" => Some(SolutionTag::RuntimeError),
        _ => None,
    }
}

/// Upload a DOMjudge problem package.
pub fn main_domjudge(
    opt: DomjudgeOpt,
    remote: &RemoteOpt,
    upload: &UploadOpt,
) -> Result<(), Error> {
    let options = upload.options(ErrorRecoveryPolicy::Skip);
    with_problem(remote, &opt.problem, &upload.test_set, |service| {
        import(&opt.directory, service, options).map(|_| ())
    })
}

/// Upload the tests, the data files, the submissions, the statement, the validators, the limits
/// and the archive of the package in `directory`.
pub fn import(
    directory: &Path,
    service: &dyn ProblemService,
    options: UploadOptions,
) -> Result<UploadReport, Error> {
    let has_output_validators = directory.join("output_validators").is_dir();
    let groups = test_groups(directory, has_output_validators)?;
    let report = Orchestrator::new(service, options).upload_groups(&groups)?;

    for path in take_all(directory, &["data/*"]) {
        let name = file_name(&path);
        if !upload_file(service, &path, &name, FileType::Source, None) {
            upload_file(service, &path, &name, FileType::Resource, None);
        }
    }

    upload_submissions(service, &directory.join("submissions"));
    upload_statement(service, &directory.join("problem_statement"));

    if !has_output_validators {
        info!("problem.setChecker std::wcmp.cpp");
        skip_on_error("Checker", service.set_checker("std::wcmp.cpp"));
    }
    for validators in ["output_validators", "input_validators"] {
        for path in take_all(&directory.join(validators), &["*/*"]) {
            upload_file(service, &path, &file_name(&path), FileType::Resource, None);
        }
    }

    upload_info(service, directory)?;

    let archive = directory.join("archive.zip");
    if archive.is_file() {
        upload_file(service, &archive, "archive.zip", FileType::Aux, None);
    }
    Ok(report)
}

/// `data/sample` is the samples group, `data/secret` the group worth 100 points.
pub fn test_groups(directory: &Path, has_output_validators: bool) -> Result<Vec<Group>, Error> {
    let samples = tests_of(directory, "sample")?
        .into_iter()
        .map(|(path, test)| statement_io(&path, test.in_statements(), has_output_validators))
        .collect::<Result<Vec<_>, Error>>()?;
    let secret = tests_of(directory, "secret")?
        .into_iter()
        .map(|(_, test)| test)
        .collect();
    Ok(vec![
        Group::new(0, samples, GroupScoring::Sum),
        Group::new(100, secret, GroupScoring::Sum),
    ])
}

fn tests_of(directory: &Path, kind: &str) -> Result<Vec<(PathBuf, TestDescriptor)>, Error> {
    let mut files = take_all(&directory.join("data").join(kind), &["*.in"]);
    files.sort_by_key(|path| file_name(path));
    Ok(files
        .into_iter()
        .map(|path| {
            let description = format!("domjudge: {}/{}", kind, file_name(&path));
            (path.clone(), TestDescriptor::from_file(path, description))
        })
        .collect())
}

/// Fill what the statement shows for a sample: the dialogue of an interactive problem, or the
/// expected answer when a custom validator accepts other outputs.
fn statement_io(
    path: &Path,
    test: TestDescriptor,
    has_output_validators: bool,
) -> Result<TestDescriptor, Error> {
    let interaction = path.with_extension("interaction");
    if interaction.is_file() {
        let content = std::fs::read_to_string(&interaction)
            .with_context(|| format!("Failed to read {}", interaction.display()))?;
        let (input, output) = parse_interaction(&content);
        return Ok(test.with_statement_io(Some(input), Some(output), Some(false)));
    }
    let answer = path.with_extension("ans");
    if has_output_validators && answer.is_file() {
        let content = std::fs::read_to_string(&answer)
            .with_context(|| format!("Failed to read {}", answer.display()))?;
        return Ok(test.with_statement_io(None, Some(content), Some(false)));
    }
    Ok(test)
}

/// Split a `.interaction` file into what is sent to the solution (`>` lines) and what the
/// solution answers (`<` lines).
pub fn parse_interaction(content: &str) -> (String, String) {
    let mut input = String::new();
    let mut output = String::new();
    for line in content.lines() {
        if let Some(line) = line.strip_prefix('>') {
            input.push_str(line);
            input.push('\n');
        } else if let Some(line) = line.strip_prefix('<') {
            output.push_str(line);
            output.push('\n');
        }
    }
    (input, output)
}

/// Split a LaTeX statement into its sections. What is not recognized stays in the legend.
pub fn parse_statement(content: &str) -> Statement {
    let mut legend = content.to_string();
    let mut extract = |regex: &Regex| -> Option<String> {
        let found = regex.captures(&legend)?.get(1)?.as_str().to_string();
        legend = regex.replace_all(&legend, "").into_owned();
        Some(found)
    };
    let input = extract(&INPUT_BLOCK);
    let output = extract(&OUTPUT_BLOCK);
    let name = extract(&PROBLEM_NAME);
    Statement {
        encoding: Some("UTF-8".into()),
        name,
        input,
        output,
        legend: Some(legend),
        ..Default::default()
    }
}

/// The accepted submissions go first, and the first of them is the main one. The names of the
/// non-java files are prefixed with a counter, since different categories reuse the same names.
fn upload_submissions(service: &dyn ProblemService, directory: &Path) {
    let mut categories: Vec<PathBuf> = match std::fs::read_dir(directory) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_dir())
            .collect(),
        Err(_) => {
            debug!("No submissions in {}", directory.display());
            return;
        }
    };
    categories.sort_by_key(|path| (file_name(path) != "accepted", file_name(path)));

    let mut counter = 1;
    let mut need_main = true;
    for category in categories {
        let name = file_name(&category);
        let tag = match submission_tag(&name) {
            Some(tag) => tag,
            None => {
                warn!("Unknown submission category {}, skipping it", name);
                continue;
            }
        };
        for path in take_all(&category, &["*"]) {
            let mut solution_name = file_name(&path);
            if !solution_name.ends_with(".java") {
                solution_name = format!("{:02}_{}", counter, solution_name);
                counter += 1;
            }
            let tag = if need_main && tag == SolutionTag::Ok {
                SolutionTag::Main
            } else {
                tag
            };
            if upload_solution(service, &path, &solution_name, None, tag) && tag == SolutionTag::Main
            {
                need_main = false;
            }
        }
    }
}

fn upload_statement(service: &dyn ProblemService, directory: &Path) {
    if let Some(path) = take_all(directory, &["*en*.tex"]).into_iter().next() {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!("problem.saveStatement lang = english");
                skip_on_error(
                    "Statement",
                    service.save_statement("english", &parse_statement(&content)),
                );
            }
            Err(e) => warn!("Cannot read {}: {}", path.display(), e),
        }
    }

    let solution = directory.join("solution.tex");
    if let Ok(content) = std::fs::read_to_string(&solution) {
        info!("problem.saveStatement lang = english, tutorial");
        let statement = Statement {
            tutorial: Some(content),
            ..Default::default()
        };
        skip_on_error("Tutorial", service.save_statement("english", &statement));
    }

    for path in take_all(directory, &["*"]) {
        let result = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                info!(
                    "problem.saveStatementResource {}, size = {} bytes",
                    file_name(&path),
                    content.len()
                );
                Ok(service.save_statement_resource(&file_name(&path), &content)?)
            });
        skip_on_error(&file_name(&path), result);
    }
}

/// Time limit from `.timelimit`, interactivity from `problem.yaml`, which is also appended to the
/// general description.
fn upload_info(service: &dyn ProblemService, directory: &Path) -> Result<(), Error> {
    let mut info = ProblemInfo {
        interactive: Some(false),
        ..Default::default()
    };
    let time_limit = directory.join(".timelimit");
    if time_limit.is_file() {
        let content = std::fs::read_to_string(&time_limit)
            .with_context(|| format!("Failed to read {}", time_limit.display()))?;
        let seconds: f64 = content
            .trim()
            .parse()
            .with_context(|| format!("Invalid time limit {:?}", content.trim()))?;
        info.time_limit = Some((seconds * 1000.0).round() as u32);
        info.memory_limit = Some(MEMORY_LIMIT);
    }

    let mut description = DESCRIPTION.to_string();
    let problem_yaml = directory.join("problem.yaml");
    match std::fs::read_to_string(&problem_yaml) {
        Ok(content) => {
            info.interactive = Some(is_interactive(&content));
            description += "\n\n";
            description += content.trim();
        }
        Err(e) => warn!("Cannot read {}: {}", problem_yaml.display(), e),
    }

    info!("problem.updateInfo {:?}", info);
    skip_on_error("Problem info", service.update_info(&info));
    info!("problem.saveGeneralDescription");
    skip_on_error(
        "General description",
        service.save_general_description(&description),
    );
    Ok(())
}

/// Whether the `validation` of a `problem.yaml` mentions `interactive`.
pub fn is_interactive(problem_yaml: &str) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(problem_yaml) {
        Ok(yaml) => yaml
            .get("validation")
            .and_then(|validation| validation.as_str())
            .map_or(false, |validation| validation.contains("interactive")),
        Err(e) => {
            warn!("Invalid problem.yaml: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_statement() {
        let content = r"\problemname{Adjusted Average}
Some legend.
\begin{Input}
The input.
\end{Input}
\begin{Output}
The output.
\end{Output}
";
        let statement = parse_statement(content);
        assert_eq!(statement.name.as_deref(), Some("Adjusted Average"));
        assert_eq!(statement.input.as_deref(), Some("\nThe input.\n"));
        assert_eq!(statement.output.as_deref(), Some("\nThe output.\n"));
        assert_eq!(statement.legend.as_deref(), Some("\nSome legend.\n\n\n"));
        assert_eq!(statement.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_parse_statement_without_sections() {
        let statement = parse_statement("Just a legend");
        assert_eq!(statement.name, None);
        assert_eq!(statement.input, None);
        assert_eq!(statement.output, None);
        assert_eq!(statement.legend.as_deref(), Some("Just a legend"));
    }

    #[test]
    fn test_parse_interaction() {
        let (input, output) = parse_interaction(">5\n<3\n>correct\n<!\n");
        assert_eq!(input, "5\ncorrect\n");
        assert_eq!(output, "3\n!\n");
    }

    #[test]
    fn test_is_interactive() {
        assert!(is_interactive("name: Guess\nvalidation: custom interactive\n"));
        assert!(!is_interactive("name: Sum\nvalidation: custom\n"));
        assert!(!is_interactive("name: Sum\n"));
        assert!(!is_interactive("validation: [\n"));
    }

    #[test]
    fn test_submission_tag() {
        assert_eq!(submission_tag("accepted"), Some(SolutionTag::Ok));
        assert_eq!(submission_tag("wrong_answer"), Some(SolutionTag::WrongAnswer));
        assert_eq!(submission_tag("time_limit_exceeded"), Some(SolutionTag::TimeLimit));
        assert_eq!(submission_tag("run_time_error"), Some(SolutionTag::RuntimeError));
        assert_eq!(submission_tag("partially_accepted"), None);
    }
}
