use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use polygon_uploader_format::{ErrorRecoveryPolicy, UploadOptions};

use crate::session::ProblemRef;

const LONG_VERSION: &str = include_str!(concat!(env!("OUT_DIR"), "/version.txt"));

#[derive(Parser, Debug)]
#[command(
    name = "polygon-uploader",
    version,
    long_version = LONG_VERSION,
    about = "Import problems from other judges into Polygon"
)]
pub struct Opt {
    #[command(flatten)]
    pub logger: LoggerOpt,

    #[command(flatten)]
    pub remote: RemoteOpt,

    #[command(flatten)]
    pub upload: UploadOpt,

    /// Where to import the problem from
    #[command(subcommand)]
    pub importer: Importer,
}

#[derive(Args, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct RemoteOpt {
    /// File with the Polygon credentials, by default `~/.config/polygon_uploader/auth.yaml`
    #[arg(long = "auth-file")]
    pub auth_file: Option<PathBuf>,

    /// Create the problem if no problem with the given name exists
    #[arg(long = "create")]
    pub create: bool,

    /// Do not contact Polygon, only log what would be uploaded
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UploadOpt {
    /// What to do when Polygon refuses a test or a group.
    ///
    /// Defaults to `ask` for loj and to `skip` for the other importers.
    #[arg(long = "on-error", value_enum)]
    pub on_error: Option<OnError>,

    /// How many times a refused request is automatically retried
    #[arg(long = "retries", default_value_t = 0)]
    pub retries: u32,

    /// Send every test, even the ones already stored with the same content
    #[arg(long = "no-check-existing")]
    pub no_check_existing: bool,

    /// Name of the test set to upload the tests into
    #[arg(long = "test-set", default_value = "tests")]
    pub test_set: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Log the failure and continue with the next test
    Skip,
    /// Ask whether to retry, skip or terminate
    Ask,
    /// Stop at the first failure
    Abort,
}

#[derive(Subcommand, Debug)]
pub enum Importer {
    /// Upload a problem from a local directory with `src/` and `solutions/`
    Usual(UsualOpt),
    /// Upload a problem from a DOMjudge problem package
    Domjudge(DomjudgeOpt),
    /// Import a problem from loj.ac
    Loj(LojOpt),
    /// Import a problem from usaco.org
    Usaco(UsacoOpt),
}

#[derive(Args, Debug, Clone)]
pub struct UsualOpt {
    /// Directory of the problem
    pub directory: PathBuf,
    /// Id or name of the Polygon problem
    pub problem: ProblemRef,
}

#[derive(Args, Debug, Clone)]
pub struct DomjudgeOpt {
    /// Directory of the DOMjudge package, e.g. `bapc2022/adjustedaverage`
    pub directory: PathBuf,
    /// Id or name of the Polygon problem
    pub problem: ProblemRef,
}

#[derive(Args, Debug, Clone)]
pub struct LojOpt {
    /// Id of the problem on loj.ac
    pub loj_id: String,
    /// Id or name of the Polygon problem
    pub problem: ProblemRef,
    /// Number of tests in each group, comma separated. Used only when the test data has no
    /// `data.yml`.
    #[arg(value_delimiter = ',')]
    pub group_sizes: Vec<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct UsacoOpt {
    /// The `cpid` in the link to the problem, e.g. 1020 for
    /// `http://usaco.org/index.php?page=viewproblem2&cpid=1020`
    pub cpid: String,
    /// The name of the test data archive, e.g. `deleg_platinum_feb20` for
    /// `http://usaco.org/current/data/deleg_platinum_feb20.zip`
    pub usaco_id: String,
    /// Id or name of the Polygon problem
    pub problem: ProblemRef,
}

impl LoggerOpt {
    /// Set up the global logger: info by default, debug with `-v` and trace with `-vv`. The
    /// `RUST_LOG` environment variable takes precedence.
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
        }
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_timestamp(None)
            .init();
        better_panic::install();
    }
}

impl From<OnError> for ErrorRecoveryPolicy {
    fn from(on_error: OnError) -> Self {
        match on_error {
            OnError::Skip => ErrorRecoveryPolicy::Skip,
            OnError::Ask => ErrorRecoveryPolicy::RetryThenAsk,
            OnError::Abort => ErrorRecoveryPolicy::Abort,
        }
    }
}

impl UploadOpt {
    /// The options of the upload, using `default` when `--on-error` is not given.
    pub fn options(&self, default: ErrorRecoveryPolicy) -> UploadOptions {
        UploadOptions {
            test_set: self.test_set.clone(),
            check_existing: !self.no_check_existing,
            recovery: self.on_error.map(Into::into).unwrap_or(default),
            retries: self.retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Opt, clap::Error> {
        Opt::try_parse_from(std::iter::once("polygon-uploader").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_usual() {
        let opt = parse(&["-vv", "usual", "/tmp/aplusb", "123123"]).unwrap();
        assert_eq!(opt.logger.verbose, 2);
        match opt.importer {
            Importer::Usual(usual) => {
                assert_eq!(usual.directory, PathBuf::from("/tmp/aplusb"));
                assert_eq!(usual.problem, ProblemRef::Id(123123));
            }
            other => panic!("Unexpected importer {:?}", other),
        }
    }

    #[test]
    fn test_parse_loj_group_sizes() {
        let opt = parse(&["loj", "3208", "aplusb-light", "1,1,3,2"]).unwrap();
        match opt.importer {
            Importer::Loj(loj) => {
                assert_eq!(loj.loj_id, "3208");
                assert_eq!(loj.problem, ProblemRef::Name("aplusb-light".into()));
                assert_eq!(loj.group_sizes, vec![1, 1, 3, 2]);
            }
            other => panic!("Unexpected importer {:?}", other),
        }
        let opt = parse(&["loj", "3208", "aplusb-light"]).unwrap();
        match opt.importer {
            Importer::Loj(loj) => assert!(loj.group_sizes.is_empty()),
            other => panic!("Unexpected importer {:?}", other),
        }
    }

    #[test]
    fn test_upload_options() {
        let opt = parse(&["usual", "dir", "1"]).unwrap();
        let options = opt.upload.options(ErrorRecoveryPolicy::Skip);
        assert_eq!(options, UploadOptions::default());
        assert_eq!(
            opt.upload.options(ErrorRecoveryPolicy::RetryThenAsk).recovery,
            ErrorRecoveryPolicy::RetryThenAsk
        );

        let opt = parse(&[
            "--on-error",
            "abort",
            "--retries",
            "3",
            "--no-check-existing",
            "--test-set",
            "pretests",
            "usaco",
            "1020",
            "deleg_platinum_feb20",
            "42",
        ])
        .unwrap();
        let options = opt.upload.options(ErrorRecoveryPolicy::Skip);
        assert_eq!(options.recovery, ErrorRecoveryPolicy::Abort);
        assert_eq!(options.retries, 3);
        assert!(!options.check_existing);
        assert_eq!(options.test_set, "pretests");
    }

    #[test]
    fn test_usage_errors() {
        let err = parse(&["usual", "dir"]).unwrap_err();
        assert!(err.use_stderr());
        let err = parse(&["--on-error", "maybe", "usual", "dir", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let err = parse(&["--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
