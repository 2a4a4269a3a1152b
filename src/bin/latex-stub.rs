//! Stub LaTeX toolchain for development testing
//!
//! One binary plays the compiler, the bibliography processor and the code
//! runner (selected with `--role`), writing the same marker files the real
//! tools write so latex-workflow can be exercised without a TeX installation.
//!
//! Compiler behaviour is driven by the document source:
//! - `\thiscommanddoesnotexist` fails with exit code 1
//! - `\addbibresource` writes `<job>.bcf`; `\bibliography{` writes `\bibdata`
//! - `\usepackage{pythontex}` writes `<job>.pytxcode`
//! - `\ref{` asks for one rerun; `%always-rerun` asks on every run
//! - `%no-pdf` exits 0 without writing a PDF

use clap::{Arg, ArgAction, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let matches = Command::new("latex-stub")
        .version("0.3.0")
        .about("Stub LaTeX toolchain for testing")
        .arg(
            Arg::new("role")
                .long("role")
                .value_name("ROLE")
                .help("Tool to imitate")
                .value_parser(["compiler", "bibliography", "code"])
                .default_value("compiler"),
        )
        .arg(
            Arg::new("exit-code")
                .long("exit-code")
                .value_name("N")
                .help("Exit with this code after doing nothing")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("args")
                .help("Tool arguments; the last one is the target")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
        .get_matches();

    if let Some(code) = matches.get_one::<u8>("exit-code") {
        eprintln!("latex-stub: forced exit code {code}");
        return Ok(ExitCode::from(*code));
    }

    let target = matches
        .get_many::<String>("args")
        .and_then(|args| args.last())
        .cloned()
        .ok_or("missing target argument")?;
    let cwd = std::env::current_dir()?;

    let role = matches
        .get_one::<String>("role")
        .map_or("compiler", String::as_str);
    match role {
        "bibliography" => bibliography(&cwd, &target),
        "code" => code(&cwd, &target),
        _ => compiler(&cwd, &target),
    }
}

fn compiler(cwd: &Path, document: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(cwd.join(document))?;
    let job = Path::new(document)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("document has no file stem")?;

    println!("This is latex-stub, imitating LuaHBTeX");
    let mut log = format!("This is latex-stub\n(./{document}\n");

    if let Some(line) = source
        .lines()
        .position(|l| l.contains("\\thiscommanddoesnotexist"))
    {
        let message = format!("./{document}:{}: Undefined control sequence.", line + 1);
        log.push_str(&message);
        log.push('\n');
        fs::write(cwd.join(format!("{job}.log")), &log)?;
        println!("! {message}");
        return Ok(ExitCode::from(1));
    }

    let aux_path = cwd.join(format!("{job}.aux"));
    let first_run = !aux_path.exists();
    let mut aux = String::from("\\relax\n");

    if source.contains("\\addbibresource") {
        fs::write(cwd.join(format!("{job}.bcf")), "<bcf:controlfile/>\n")?;
    }
    if source.contains("\\bibliography{") {
        aux.push_str("\\bibdata{refs}\n");
    }
    if source.contains("\\usepackage{pythontex}") {
        fs::write(cwd.join(format!("{job}.pytxcode")), "=>PYTHONTEX#py#default\n")?;
    }
    if source.contains("\\ref{") && first_run {
        log.push_str(
            "LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right.\n",
        );
    }
    if source.contains("%always-rerun") {
        log.push_str("Package rerunfilecheck Warning: Rerun to get outlines right\n");
    }

    fs::write(&aux_path, aux)?;

    if !source.contains("%no-pdf") {
        let mut pdf = String::from("%PDF-1.5\n% latex-stub\n");
        if cwd.join(format!("{job}.bbl")).exists() {
            pdf.push_str("% bibliography: resolved\n");
        }
        if cwd.join(format!("pythontex-files-{job}")).is_dir() {
            pdf.push_str("% code: executed\n");
        }
        fs::write(cwd.join(format!("{job}.pdf")), pdf)?;
        log.push_str(&format!("Output written on {job}.pdf (1 page).\n"));
    }

    fs::write(cwd.join(format!("{job}.log")), &log)?;
    Ok(ExitCode::SUCCESS)
}

fn bibliography(cwd: &Path, job: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let has_marker = cwd.join(format!("{job}.bcf")).exists()
        || fs::read_to_string(cwd.join(format!("{job}.aux")))
            .is_ok_and(|aux| aux.contains("\\bibdata"));
    if !has_marker {
        eprintln!("ERROR - Cannot find control file '{job}.bcf'");
        return Ok(ExitCode::from(2));
    }

    fs::write(cwd.join(format!("{job}.bbl")), "\\entry{knuth1984}{book}{}\n")?;
    fs::write(cwd.join(format!("{job}.blg")), format!("INFO - Output to {job}.bbl\n"))?;
    println!("INFO - Output to {job}.bbl");
    Ok(ExitCode::SUCCESS)
}

fn code(cwd: &Path, pytxcode: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let job = pytxcode.trim_end_matches(".pytxcode");
    if !cwd.join(pytxcode).exists() {
        eprintln!("* PythonTeX error: missing file {pytxcode}");
        return Ok(ExitCode::from(1));
    }

    let dir = cwd.join(format!("pythontex-files-{job}"));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("{job}.pytxmcr")), "\\pytx@macro{4}\n")?;
    println!("PythonTeX:  {job} - 0 error(s), 0 warning(s)");
    Ok(ExitCode::SUCCESS)
}
