use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

type DynError = Box<dyn std::error::Error>;

const DEMOS: [&str; 8] = [
    "usart-hello",
    "eic-keypad",
    "ast-alarm",
    "aes-vectors",
    "xcl-lut",
    "pevc-event",
    "trng-read",
    "flash-at25",
];

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

fn try_main() -> Result<(), DynError> {
    let mut args = env::args();
    let task = args.nth(1);
    match task.as_deref() {
        Some("demos") => build_demos()?,
        Some("run") => run_demo(args.next())?,
        Some("test-all") => test_all()?,
        Some("doc") => doc()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        "Tasks:
demos                    build every demo binary (hosted)
run [demo]               run one demo binary, or all of them in sequence
test-all                 run the test suites of every workspace crate
doc                      build workspace documentation
"
    )
}

fn build_demos() -> Result<(), DynError> {
    let mut args = vec!["build", "--package", "demos"];
    for demo in DEMOS.iter() {
        args.push("--bin");
        args.push(demo);
    }
    let status = Command::new(cargo()).current_dir(project_root()).args(&args).status()?;
    if !status.success() {
        return Err("cargo build failed".into());
    }
    Ok(())
}

fn run_demo(which: Option<String>) -> Result<(), DynError> {
    let selected: Vec<&str> = match which.as_deref() {
        Some(name) => match DEMOS.iter().find(|d| **d == name) {
            Some(demo) => vec![*demo],
            None => return Err(format!("unknown demo '{}'", name).into()),
        },
        None => DEMOS.to_vec(),
    };
    for demo in selected {
        let status = Command::new(cargo())
            .current_dir(project_root())
            .args(["run", "--package", "demos", "--bin", demo])
            .status()?;
        if !status.success() {
            return Err(format!("demo '{}' exited with failure", demo).into());
        }
    }
    Ok(())
}

fn test_all() -> Result<(), DynError> {
    let status = Command::new(cargo())
        .current_dir(project_root())
        .args(["test", "--workspace"])
        .status()?;
    if !status.success() {
        return Err("cargo test failed".into());
    }
    Ok(())
}

fn doc() -> Result<(), DynError> {
    let status = Command::new(cargo())
        .current_dir(project_root())
        .args(["doc", "--workspace", "--no-deps"])
        .status()?;
    if !status.success() {
        return Err("cargo doc failed".into());
    }
    Ok(())
}

fn cargo() -> String {
    env::var("CARGO").unwrap_or_else(|_| "cargo".to_string())
}

fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR")).ancestors().nth(1).unwrap().to_path_buf()
}
