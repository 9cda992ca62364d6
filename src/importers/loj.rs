use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use regex::Regex;
use serde::Deserialize;

use polygon_uploader_api::{
    Asset, FileType, ProblemInfo, ProblemService, ResourceAdvancedProperties, SolutionTag, Stage,
    Statement,
};
use polygon_uploader_format::*;

use crate::download::{download_file_to, download_web_page};
use crate::importers::common::{file_name, save_solution, unescape_html, upload_file, Archive};
use crate::opt::{LojOpt, RemoteOpt, UploadOpt};
use crate::scratch::ScratchDir;
use crate::session::with_problem;

lazy_static! {
    static ref SAMPLE: Regex =
        Regex::new(r"(?s)<pre[^<]*<code>([^<]*)</code>[^<]*</pre").expect("Invalid regex");
    static ref MEMORY_LIMIT: Regex =
        Regex::new(r"(?s)<span class[^>]*>[^0-9<]*(\d+)[^0-9<M]*MiB[^<]*</span>")
            .expect("Invalid regex");
    static ref TIME_LIMIT: Regex =
        Regex::new(r"(?s)<span class[^>]*>[^0-9<]*(\d+)[^0-9<m]*ms[^<]*</span>")
            .expect("Invalid regex");
    static ref TEST_NUMBER: Regex = Regex::new(r"(\d+)\.in$").expect("Invalid regex");
    static ref SUBMISSION_LINK: Regex =
        Regex::new(r#"href="/submission/(\d+)""#).expect("Invalid regex");
    static ref SPAN_TAG: Regex = Regex::new(r"</?span[^>]*>").expect("Invalid regex");
}

/// How many of the fastest submissions are uploaded as solutions.
const MAX_SOLUTIONS: usize = 3;

/// The description of the test data of a problem, `data.yml` in the archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataYml {
    /// Name of the input files, `#` is replaced by the name of the case.
    pub input_file: String,
    #[serde(default)]
    pub subtasks: Vec<DataSubtask>,
    #[serde(default)]
    pub special_judge: Option<SpecialJudge>,
    #[serde(default)]
    pub extra_source_files: Vec<ExtraSourceFiles>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSubtask {
    pub score: serde_yaml::Value,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub cases: Vec<serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialJudge {
    pub language: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtraSourceFiles {
    pub language: String,
    pub files: Vec<ExtraSourceFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtraSourceFile {
    /// Name in the archive.
    pub name: String,
    /// Name used when compiling.
    pub dest: String,
}

/// A subtask of `data.yml` after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub score: u32,
    pub scoring: GroupScoring,
    pub cases: Vec<String>,
}

/// A problem of loj.ac with its downloaded page and test data.
#[derive(Debug, Clone)]
pub struct LojProblem {
    pub id: String,
    pub page: String,
    pub archive: PathBuf,
}

pub fn problem_url(id: &str) -> String {
    format!("https://loj.ac/problem/{}", id)
}

fn test_data_url(id: &str) -> String {
    format!("https://loj.ac/problem/{}/testdata/download", id)
}

fn fastest_submissions_url(id: &str) -> String {
    format!("https://loj.ac/problem/{}/statistics/fastest", id)
}

fn submission_url(id: u64) -> String {
    format!("https://loj.ac/submission/{}", id)
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_score(subtask: usize, value: &serde_yaml::Value) -> Result<u32, FormatError> {
    let invalid = || FormatError::InvalidScore {
        subtask,
        score: yaml_scalar(value).unwrap_or_else(|| format!("{:?}", value)),
    };
    let text = yaml_scalar(value).ok_or_else(invalid)?;
    let text = text.trim();
    if let Ok(score) = text.parse::<u32>() {
        return Ok(score);
    }
    match text.parse::<f64>() {
        Ok(score) if score >= 0.0 && score.fract() == 0.0 && score <= f64::from(u32::MAX) => {
            Ok(score as u32)
        }
        _ => Err(invalid()),
    }
}

impl DataYml {
    pub fn parse(content: &str) -> Result<DataYml, Error> {
        serde_yaml::from_str(content).context("Invalid data.yml")
    }

    /// The validated subtasks, with the first zero-score one (the samples) moved to the front.
    pub fn subtasks(&self) -> Result<Vec<Subtask>, FormatError> {
        let mut subtasks = self
            .subtasks
            .iter()
            .enumerate()
            .map(|(index, subtask)| {
                let index = index + 1;
                let scoring = match subtask.kind.as_str() {
                    "min" => GroupScoring::AllOrNothing,
                    "sum" => GroupScoring::Sum,
                    _ => {
                        return Err(FormatError::UnsupportedSubtaskType {
                            subtask: index,
                            kind: subtask.kind.clone(),
                        })
                    }
                };
                Ok(Subtask {
                    score: parse_score(index, &subtask.score)?,
                    scoring,
                    cases: subtask.cases.iter().filter_map(yaml_scalar).collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(position) = subtasks.iter().position(|subtask| subtask.score == 0) {
            let samples = subtasks.remove(position);
            subtasks.insert(0, samples);
        }
        Ok(subtasks)
    }

    /// The name of the input file of a case.
    pub fn input_file(&self, case: &str) -> String {
        self.input_file.replace('#', case)
    }
}

impl LojProblem {
    /// Download the page and the test data of the problem into `directory`.
    pub fn download(id: &str, directory: &Path) -> Result<LojProblem, Error> {
        let page = download_web_page(&problem_url(id))?;
        let archive = directory.join("tests.zip");
        download_file_to(&test_data_url(id), &archive)?;
        Ok(LojProblem {
            id: id.to_string(),
            page,
            archive,
        })
    }

    pub fn url(&self) -> String {
        problem_url(&self.id)
    }

    /// The samples group, scraped from the problem page.
    fn sample_group(&self) -> Group {
        let description = format!("loj: parsed page {}", self.url());
        let tests = scrape_samples(&self.page)
            .into_iter()
            .map(|sample| TestDescriptor::from_memory(sample, description.clone()).in_statements())
            .collect();
        Group::new(0, tests, GroupScoring::Sum)
    }
}

/// The sample inputs of a problem page: the code blocks alternate between inputs and outputs.
pub fn scrape_samples(page: &str) -> Vec<String> {
    SAMPLE
        .captures_iter(page)
        .step_by(2)
        .map(|captures| format!("{}\n", unescape_html(&captures[1]).trim_end()))
        .collect()
}

/// The time and memory limits written in the problem page.
pub fn scrape_limits(page: &str) -> ProblemInfo {
    let number = |regex: &Regex| {
        regex
            .captures(page)
            .and_then(|captures| captures[1].parse().ok())
    };
    ProblemInfo {
        time_limit: number(&TIME_LIMIT),
        memory_limit: number(&MEMORY_LIMIT),
        ..Default::default()
    }
}

/// The LaTeX table with the score of each subtask, for the russian and the english statements.
pub fn scoring_tables(scores: &[u32]) -> Vec<(&'static str, String)> {
    [
        ("russian", "Подзадача", "баллов"),
        ("english", "Subtask", "points"),
    ]
    .into_iter()
    .map(|(lang, subtask, points)| {
        let mut table = String::from("\\begin{tabular}{ll}\n");
        for (group, score) in scores.iter().enumerate() {
            table += &format!(
                "\\textbf{{{} {} ({} {}):}} & \\\\\n",
                subtask,
                group + 1,
                score,
                points
            );
        }
        table += "\\end{tabular}\n";
        (lang, table)
    })
    .collect()
}

/// Split the tests in consecutive groups of the given sizes, worth what the tests would be worth
/// in a single group of 100 points. Without sizes all the tests form a single group.
pub fn split_into_groups(
    tests: Vec<TestDescriptor>,
    sizes: &[usize],
) -> Result<Vec<Group>, FormatError> {
    if sizes.is_empty() {
        return Ok(vec![Group::new(100, tests, GroupScoring::Sum)]);
    }
    let requested: usize = sizes.iter().sum();
    if requested > tests.len() {
        return Err(FormatError::TooManyTestsInGroups {
            requested,
            available: tests.len(),
        });
    }
    if requested < tests.len() {
        warn!(
            "{} tests are not in any group and will not be uploaded",
            tests.len() - requested
        );
    }
    let mut points = distribute_points(100, tests.len(), GroupScoring::Sum).into_iter();
    let mut tests = tests.into_iter();
    let mut groups = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let chunk: Vec<_> = tests.by_ref().take(size).collect();
        let score = points.by_ref().take(size).sum();
        groups.push(Group::new(score, chunk, GroupScoring::AllOrNothing));
    }
    Ok(groups)
}

fn content_hash(content: &str) -> blake3::Hash {
    blake3::hash(content.replace("\r\n", "\n").trim_end().as_bytes())
}

fn test_number(name: &str) -> u64 {
    TEST_NUMBER
        .captures(name)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(u64::MAX)
}

/// Import a problem from loj.ac.
pub fn main_loj(opt: LojOpt, remote: &RemoteOpt, upload: &UploadOpt) -> Result<(), Error> {
    let options = upload.options(ErrorRecoveryPolicy::RetryThenAsk);
    let scratch = ScratchDir::new(&format!("_loj_{}", opt.loj_id))?;
    with_problem(remote, &opt.problem, &upload.test_set, |service| {
        let problem = LojProblem::download(&opt.loj_id, scratch.path())?;
        import(&problem, &opt.group_sizes, scratch.path(), service, options)?;
        download_solutions(service, &problem.id, &download_web_page);
        Ok(())
    })
}

/// The ids of the submissions linked from a statistics page, in page order and without
/// duplicates.
pub fn submission_ids(page: &str) -> Vec<u64> {
    let mut ids: Vec<u64> = vec![];
    for captures in SUBMISSION_LINK.captures_iter(page) {
        if let Ok(id) = captures[1].parse() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// The source code embedded in a submission page, as the string literal of the line starting
/// with `const format`.
pub fn submission_code(page: &str) -> Option<String> {
    let line = page
        .lines()
        .find(|line| line.trim_start().starts_with("const format"))?;
    let start = line.find('"')?;
    let end = line.rfind('"')?;
    if end <= start {
        return None;
    }
    let code = unescape_js(&line[start + 1..end]);
    Some(SPAN_TAG.replace_all(&unescape_html(&code), "").into_owned())
}

/// Decode the escapes of a JavaScript string literal.
fn unescape_js(literal: &str) -> String {
    let mut result = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(digits @ ('u' | 'x')) => {
                let len = if digits == 'u' { 4 } else { 2 };
                let hex: String = chars.by_ref().take(len).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => {
                        result.push('\\');
                        result.push(digits);
                        result.push_str(&hex);
                    }
                }
            }
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

/// Upload the fastest accepted submissions of the problem as solutions: the first one is the
/// main solution. `fetch` downloads a web page. Failures are logged and never fatal.
pub fn download_solutions(
    service: &dyn ProblemService,
    id: &str,
    fetch: &dyn Fn(&str) -> Result<String, Error>,
) {
    let page = match skip_on_error("Solutions", fetch(&fastest_submissions_url(id))) {
        Some(page) => page,
        None => return,
    };
    let mut tag = SolutionTag::Main;
    let mut uploaded = 0;
    for submission in submission_ids(&page) {
        if uploaded >= MAX_SOLUTIONS {
            break;
        }
        let code = fetch(&submission_url(submission)).and_then(|page| {
            submission_code(&page)
                .ok_or_else(|| anyhow!("No source code in submission {}", submission))
        });
        let code = match skip_on_error("Solution", code) {
            Some(code) => code,
            None => continue,
        };
        let name = format!("{}.cpp", submission);
        if save_solution(service, &name, code.as_bytes(), Some("cpp.g++17"), tag) {
            tag = SolutionTag::Ok;
            uploaded += 1;
        }
    }
}

/// Upload the tests, the checker, the limits, the scoring of the subtasks and a description.
/// The archive members are extracted into `work_dir`.
pub fn import(
    problem: &LojProblem,
    group_sizes: &[usize],
    work_dir: &Path,
    service: &dyn ProblemService,
    options: UploadOptions,
) -> Result<UploadReport, Error> {
    let mut archive = Archive::open(&problem.archive)?;
    let tests_dir = work_dir.join("tests");

    let (report, scores) = if archive.contains("data.yml") {
        let path = archive.extract("data.yml", work_dir)?;
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data = DataYml::parse(&content)?;
        if !group_sizes.is_empty() {
            warn!(
                "The test data has a data.yml, the group sizes {:?} are ignored",
                group_sizes
            );
        }
        let groups = data_groups(problem, &data, &mut archive, &tests_dir)?;
        let report = Orchestrator::new(service, options).upload_groups(&groups)?;
        upload_special_judge(service, data.special_judge.as_ref(), &mut archive, work_dir)?;
        upload_extra_sources(service, &data.extra_source_files, &mut archive, work_dir)?;
        (report, scores_of(&groups))
    } else {
        info!("No data.yml in the test data, taking every .in file");
        let groups = plain_groups(problem, group_sizes, &mut archive, &tests_dir)?;
        let report = Orchestrator::new(service, options).upload_groups(&groups)?;
        upload_special_judge(service, None, &mut archive, work_dir)?;
        let scores = if group_sizes.is_empty() {
            vec![]
        } else {
            scores_of(&groups)
        };
        (report, scores)
    };

    let limits = scrape_limits(&problem.page);
    info!(
        "Set ML = {:?} MiB and TL = {:?} ms",
        limits.memory_limit, limits.time_limit
    );
    skip_on_error("Problem info", service.update_info(&limits));

    if !scores.is_empty() {
        for (lang, table) in scoring_tables(&scores) {
            info!("problem.saveStatement lang = {}", lang);
            let statement = Statement {
                output: Some(table),
                ..Default::default()
            };
            skip_on_error("Scoring", service.save_statement(lang, &statement));
        }
    }

    let description = format!(
        "Imported by lojacimport from {}\nStatements, group dependencies should be imported manually\n",
        problem.url()
    );
    info!("problem.saveGeneralDescription");
    skip_on_error(
        "General description",
        service.save_general_description(&description),
    );
    Ok(report)
}

/// The scores of all the groups but the samples.
fn scores_of(groups: &[Group]) -> Vec<u32> {
    groups.iter().skip(1).map(Group::score).collect()
}

/// One group per subtask of `data.yml`, preceded by the samples of the page when no subtask is
/// worth zero points.
fn data_groups(
    problem: &LojProblem,
    data: &DataYml,
    archive: &mut Archive,
    tests_dir: &Path,
) -> Result<Vec<Group>, Error> {
    let subtasks = data.subtasks()?;
    let mut groups = vec![];
    if subtasks.first().map_or(true, |subtask| subtask.score != 0) {
        info!("No group with score = 0, taking the samples from the problem page");
        groups.push(problem.sample_group());
    }

    let mut members = vec![];
    for (position, subtask) in subtasks.iter().enumerate() {
        let samples = position == 0 && subtask.score == 0;
        let mut tests = Vec::with_capacity(subtask.cases.len());
        for case in &subtask.cases {
            let name = data.input_file(case);
            let test = TestDescriptor::from_file(
                tests_dir.join(&name),
                format!("loj: filename = {}", name),
            );
            tests.push(if samples { test.in_statements() } else { test });
            members.push(name);
        }
        groups.push(Group::new(subtask.score, tests, subtask.scoring));
    }

    info!("Extracting {} tests to {}", members.len(), tests_dir.display());
    archive.extract_all(&members, tests_dir)?;
    Ok(groups)
}

/// The samples of the page followed by all the `.in` files of the archive that are not samples,
/// sorted by their number.
fn plain_groups(
    problem: &LojProblem,
    group_sizes: &[usize],
    archive: &mut Archive,
    tests_dir: &Path,
) -> Result<Vec<Group>, Error> {
    let samples = problem.sample_group();
    let sample_hashes: HashSet<_> = samples
        .tests()
        .iter()
        .map(|test| test.content().map(|content| content_hash(&content)))
        .collect::<Result<_, _>>()?;

    let mut names: Vec<String> = archive
        .names()
        .into_iter()
        .filter(|name| name.ends_with(".in"))
        .collect();
    names.sort_by_key(|name| (test_number(name), name.clone()));
    debug!("Tests: {:?}", names);
    let paths = archive.extract_all(&names, tests_dir)?;

    let mut tests = vec![];
    for (name, path) in names.iter().zip(paths) {
        let content =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        if sample_hashes.contains(&content_hash(&String::from_utf8_lossy(&content))) {
            info!("{} is a sample, skipping it", name);
            continue;
        }
        tests.push(TestDescriptor::from_file(
            path,
            format!("loj: filename = {}", name),
        ));
    }

    let mut groups = vec![samples];
    groups.extend(split_into_groups(tests, group_sizes)?);
    Ok(groups)
}

fn upload_special_judge(
    service: &dyn ProblemService,
    judge: Option<&SpecialJudge>,
    archive: &mut Archive,
    work_dir: &Path,
) -> Result<(), Error> {
    let judge = match judge {
        Some(judge) => judge,
        None => {
            info!("No special judge, setting std::ncmp.cpp as checker");
            skip_on_error("Checker", service.set_checker("std::ncmp.cpp"));
            return Ok(());
        }
    };
    let path = archive.extract(&judge.file_name, work_dir)?;
    let name = file_name(&path);
    info!(
        "Adding and setting checker file with name {} ({})",
        name, judge.language
    );
    if upload_file(service, &path, &name, FileType::Source, None) {
        info!("problem.setChecker {}", name);
        skip_on_error("Checker", service.set_checker(&name));
    }
    Ok(())
}

/// The extra files for C++ are needed to compile the solutions.
fn upload_extra_sources(
    service: &dyn ProblemService,
    extra: &[ExtraSourceFiles],
    archive: &mut Archive,
    work_dir: &Path,
) -> Result<(), Error> {
    if extra.is_empty() {
        return Ok(());
    }
    let cpp = match extra.iter().find(|extra| extra.language == "cpp") {
        Some(cpp) => cpp,
        None => {
            warn!("No extra source files for C++");
            return Ok(());
        }
    };
    let properties = ResourceAdvancedProperties {
        for_types: "cpp.*".into(),
        main: false,
        stages: vec![Stage::Compile],
        assets: vec![Asset::Solution],
    };
    for file in &cpp.files {
        let path = archive.extract(&file.name, work_dir)?;
        info!("Adding extra source file {}", file.dest);
        upload_file(service, &path, &file.dest, FileType::Resource, Some(&properties));
    }
    Ok(())
}
