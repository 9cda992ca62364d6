use anyhow::anyhow;
use clap::Parser;

use polygon_uploader::error::NiceError;
use polygon_uploader::importers::{main_domjudge, main_loj, main_usaco, main_usual};
use polygon_uploader::opt::{Importer, Opt};

/// Exit status for a wrong command line.
const USAGE_ERROR: i32 = 239;

fn main() {
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(e) => {
            // --help and --version are reported as errors too
            let code = if e.use_stderr() { USAGE_ERROR } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    opt.logger.enable_log();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("A crypto provider is already installed"))
        .nice_expect("Cannot set up TLS");

    match opt.importer {
        Importer::Usual(args) => main_usual(args, &opt.remote, &opt.upload),
        Importer::Domjudge(args) => main_domjudge(args, &opt.remote, &opt.upload),
        Importer::Loj(args) => main_loj(args, &opt.remote, &opt.upload),
        Importer::Usaco(args) => main_usaco(args, &opt.remote, &opt.upload),
    }
    .nice_unwrap()
}
