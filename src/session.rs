use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context, Error};

use polygon_uploader_api::memory::MemoryState;
use polygon_uploader_api::{MemoryProblem, PolygonClient, Problem, ProblemFilter, ProblemService};

use crate::auth::{ask_credentials, AuthConfig};
use crate::opt::RemoteOpt;

/// How the destination problem is given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemRef {
    /// A numeric id of the problem.
    Id(u64),
    /// The short name of the problem.
    Name(String),
}

impl FromStr for ProblemRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse() {
            Ok(id) => ProblemRef::Id(id),
            Err(_) => ProblemRef::Name(s.to_string()),
        })
    }
}

impl Display for ProblemRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemRef::Id(id) => write!(f, "id = {}", id),
            ProblemRef::Name(name) => write!(f, "name = {}", name),
        }
    }
}

impl ProblemRef {
    /// The filter that selects this problem in `problems.list`.
    pub fn filter(&self) -> ProblemFilter {
        match self {
            ProblemRef::Id(id) => ProblemFilter {
                id: Some(*id),
                ..Default::default()
            },
            ProblemRef::Name(name) => ProblemFilter {
                name: Some(name.clone()),
                ..Default::default()
            },
        }
    }
}

/// Find the destination problem, creating it when allowed and it is given by name.
pub fn find_problem(
    client: &PolygonClient,
    problem: &ProblemRef,
    create: bool,
) -> Result<Problem, Error> {
    info!("problems.list {}", problem);
    let found = client
        .problems_list(&problem.filter())
        .with_context(|| format!("Failed to look up the problem {}", problem))?;
    if let Some(found) = found.into_iter().next() {
        debug!("Found problem {:?}", found);
        return Ok(found);
    }
    match problem {
        ProblemRef::Name(name) if create => {
            info!("problem.create name = {}", name);
            Ok(client.problem_create(name)?)
        }
        _ => bail!("Problem {} not found", problem),
    }
}

/// Turn on points and groups, needed by every importer.
pub fn prepare(service: &dyn ProblemService, test_set: &str) -> Result<(), Error> {
    info!("problem.enablePoints");
    service
        .enable_points(true)
        .context("Failed to enable the points")?;
    info!("problem.enableGroups");
    service
        .enable_groups(test_set, true)
        .context("Failed to enable the groups")?;
    Ok(())
}

/// Resolve the destination problem and run `import` on it.
///
/// With `--dry-run` nothing leaves the machine: the import runs against an in-memory problem and
/// a summary of what would have been uploaded is logged.
pub fn with_problem<F>(
    remote: &RemoteOpt,
    problem: &ProblemRef,
    test_set: &str,
    import: F,
) -> Result<(), Error>
where
    F: FnOnce(&dyn ProblemService) -> Result<(), Error>,
{
    if remote.dry_run {
        info!("Dry run, nothing is sent to Polygon for problem {}", problem);
        let memory = MemoryProblem::new();
        prepare(&memory, test_set)?;
        import(&memory)?;
        log_summary(&memory.state(), test_set);
        return Ok(());
    }

    let auth_file = match &remote.auth_file {
        Some(path) => path.clone(),
        None => AuthConfig::default_path()?,
    };
    let auth = AuthConfig::load_or_ask(&auth_file, ask_credentials)?;
    let client = auth.client()?;
    let found = find_problem(&client, problem, remote.create)?;
    let remote_problem = client.problem(found);
    prepare(&remote_problem, test_set)?;
    import(&remote_problem)
}

fn log_summary(state: &MemoryState, test_set: &str) {
    let tests = state.tests.get(test_set).map_or(0, |tests| tests.len());
    info!(
        "Would upload {} tests in {} groups, {} files, {} solutions and {} statements",
        tests,
        state.groups.len(),
        state.files.len(),
        state.solutions.len(),
        state.statements.len()
    );
    if let Some(checker) = &state.checker {
        info!("Would set the checker to {}", checker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_problem_ref() {
        assert_eq!("123123".parse::<ProblemRef>(), Ok(ProblemRef::Id(123123)));
        assert_eq!(
            "aplusb-light".parse::<ProblemRef>(),
            Ok(ProblemRef::Name("aplusb-light".into()))
        );
        assert_eq!("-1".parse::<ProblemRef>(), Ok(ProblemRef::Name("-1".into())));
    }

    #[test]
    fn test_filter() {
        assert_eq!(ProblemRef::Id(7).filter().id, Some(7));
        let filter = ProblemRef::Name("abc".into()).filter();
        assert_eq!(filter.id, None);
        assert_eq!(filter.name.as_deref(), Some("abc"));
        assert!(!filter.show_deleted);
    }

    #[test]
    fn test_prepare() {
        let problem = MemoryProblem::new();
        prepare(&problem, "tests").unwrap();
        let state = problem.state();
        assert!(state.points_enabled);
        assert!(state.groups_enabled);
        assert_eq!(
            state.calls,
            vec!["problem.enablePoints", "problem.enableGroups"]
        );
    }

    #[test]
    fn test_dry_run() {
        let remote = RemoteOpt {
            auth_file: None,
            create: false,
            dry_run: true,
        };
        let mut called = false;
        with_problem(&remote, &ProblemRef::Id(1), "tests", |service| {
            called = true;
            service.set_checker("std::wcmp.cpp")?;
            Ok(())
        })
        .unwrap();
        assert!(called);
    }
}
