use std::path::Path;
use std::process::Command;

/// The package version, followed by the git revision when built from a checkout.
fn long_version() -> String {
    let version = env!("CARGO_PKG_VERSION").to_string();
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty=+dirty", "--long"])
        .output();
    let revision = match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        _ => return version,
    };
    if revision.is_empty() {
        version
    } else {
        format!("{version}\n\nRevision: {revision}")
    }
}

fn main() {
    let out_dir = std::env::var("OUT_DIR").expect("missing OUT_DIR");
    let path = Path::new(&out_dir).join("version.txt");
    if let Err(e) = std::fs::write(&path, long_version()) {
        panic!("Failed to write the version to {}: {}", path.display(), e);
    }
    println!("cargo:rerun-if-changed=.git/refs");
    println!("cargo:rerun-if-changed=.git/index");
}
