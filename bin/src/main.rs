use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

use parser::{printer, Expr};

/// Evaluate Lox expressions from a file or an interactive prompt.
#[derive(clap::Parser)]
struct Args {
    /// File containing a single expression. Starts a prompt if omitted.
    file: Option<PathBuf>,

    /// Print the parsed expression before evaluating it.
    #[arg(long, value_enum)]
    print: Option<AstFormat>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum AstFormat {
    /// Parenthesized prefix tree, one operand per line.
    Tree,
    /// Reverse polish notation.
    Rpn,
    /// Fully parenthesized infix source.
    Infix,
}

impl AstFormat {
    fn render(self, expr: &Expr) -> String {
        match self {
            AstFormat::Tree => printer::parenthesize(expr),
            AstFormat::Rpn => printer::rpn(expr),
            AstFormat::Infix => printer::infix(expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Success = 0,
    InvalidArguments = 1,
    UnknownError = 10,
    LoxError = 20,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status as u8)
    }
}

/// Runs one source text, printing the AST (if requested) and the result to
/// stdout and diagnostics to stderr. Returns whether it succeeded.
fn run(source: &str, print: Option<AstFormat>) -> anyhow::Result<bool> {
    let mut ast = None;
    let result =
        interpreter::run_source_with(source, |expr| ast = print.map(|format| format.render(expr)));

    let mut out = stdout();
    if let Some(ast) = ast {
        writeln!(out, "{ast}")?;
    }

    match result {
        Ok(value) => {
            writeln!(out, "Result> {value}")?;
            Ok(true)
        }
        Err(diagnostics) => {
            for diagnostic in diagnostics.iter() {
                eprintln!("{diagnostic}");
            }
            Ok(false)
        }
    }
}

fn run_file(source: &str, print: Option<AstFormat>) -> anyhow::Result<Status> {
    Ok(if run(source, print)? { Status::Success } else { Status::LoxError })
}

fn run_prompt(print: Option<AstFormat>) -> anyhow::Result<Status> {
    let mut had_error = false;
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            println!();
            println!("Bye bye!");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        had_error |= !run(&line, print)?;
    }
    Ok(if had_error { Status::LoxError } else { Status::Success })
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let status = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => {
                log::debug!("Running file {}", path.display());
                run_file(&source, args.print)
            }
            Err(e) => {
                eprintln!("Could not read {}: {e}", path.display());
                Ok(Status::InvalidArguments)
            }
        },
        None => run_prompt(args.print),
    };

    status
        .unwrap_or_else(|e| {
            eprintln!("{e:#}");
            Status::UnknownError
        })
        .into()
}
