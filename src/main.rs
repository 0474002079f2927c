use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::{Command as Process, ExitCode},
    rc::Rc,
    time::Instant,
};

use clap::{Parser, Subcommand};
use inkwell::context::Context;
use kari::{
    compiler::compiler::Compiler,
    display_error,
    errors::errors::{Error, ErrorImpl},
    interpreter::interpreter::DEFAULT_ENTRY,
    lexer::lexer::tokenize,
    parser::parser::parse,
    program::ProgramState,
    session::{ExecutionMode, Outcome, Session},
    type_checker::type_checker::{verify_all, VerifyMode},
    Position,
};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Kari - a small statically typed expression language
#[derive(Parser, Debug)]
#[command(name = "kari", version)]
#[command(about = "Check, run and compile kari programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a program and run its entry function on one input
    Run {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        input: i32,
        /// Entry function to run
        #[arg(long, default_value = DEFAULT_ENTRY)]
        entry: String,
        /// Run through the LLVM JIT instead of the interpreter
        #[arg(long)]
        jit: bool,
    },
    /// Verify a program and report failures
    Check {
        file: PathBuf,
        /// Report every failing definition instead of stopping at the first
        #[arg(long)]
        all: bool,
    },
    /// Compile a program to a native executable
    Compile {
        file: PathBuf,
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write textual LLVM IR instead of linking an executable
        #[arg(long)]
        emit_llvm: bool,
        /// Run LLVM cleanup passes before writing
        #[arg(short = 'O', long)]
        optimize: bool,
        /// Entry function called by the generated `main`
        #[arg(long, default_value = DEFAULT_ENTRY)]
        entry: String,
    },
    /// Start the interactive prompt
    Repl,
}

/// A failure together with the source it should be rendered against.
struct Failure {
    error: Error,
    source: String,
    file: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // KARI_LOG takes precedence over RUST_LOG; default to warnings only
    let filter = EnvFilter::try_from_env("KARI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Run {
            file,
            input,
            entry,
            jit,
        } => run(&file, input, &entry, jit),
        Command::Check { file, all } => check(&file, all),
        Command::Compile {
            file,
            output,
            emit_llvm,
            optimize,
            entry,
        } => compile(&file, output, emit_llvm, optimize, &entry),
        Command::Repl => repl(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            display_error(&failure.error, &failure.source, &failure.file);
            ExitCode::from(1)
        }
    }
}

/// Reads, tokenizes, parses and loads a program, logging each phase.
fn load_program(path: &Path) -> Result<(ProgramState, String, String), Failure> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let source = read_to_string(path).map_err(|error| Failure {
        error: Error::new(
            ErrorImpl::FileReadError {
                path: path.to_string_lossy().to_string(),
                message: error.to_string(),
            },
            Position::null(),
        ),
        source: String::new(),
        file: file_name.clone(),
    })?;

    let fail = |error: Error| Failure {
        error,
        source: source.clone(),
        file: file_name.clone(),
    };

    let start = Instant::now();
    let tokens = tokenize(source.clone(), Some(file_name.clone())).map_err(fail)?;
    info!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let statements = parse(tokens, Rc::new(file_name.clone())).map_err(fail)?;
    info!("Parsed in {:?}", parse_start.elapsed());

    let mut program = ProgramState::new();
    program.load(statements).map_err(fail)?;

    let verify_start = Instant::now();
    let report = verify_all(&program, VerifyMode::Batch);
    info!("Verified in {:?}", verify_start.elapsed());

    report.into_result().map_err(fail)?;

    Ok((program, source, file_name))
}

fn run(path: &Path, input: i32, entry: &str, jit: bool) -> Result<(), Failure> {
    let (program, source, file) = load_program(path)?;
    let mode = if jit {
        ExecutionMode::Jit
    } else {
        ExecutionMode::Interpret
    };

    let session = Session::from_program(program, &file);

    let start = Instant::now();
    let result = session.run_entry(entry, input, mode);
    info!("Ran in {:?}", start.elapsed());

    let output = result.map_err(|error| Failure {
        error,
        source,
        file,
    })?;

    println!("Input: {}", input);
    println!("Output: {}", output);

    Ok(())
}

fn check(path: &Path, all: bool) -> Result<(), Failure> {
    let file_name = path.to_string_lossy().to_string();
    let source = read_to_string(path).map_err(|error| Failure {
        error: Error::new(
            ErrorImpl::FileReadError {
                path: file_name.clone(),
                message: error.to_string(),
            },
            Position::null(),
        ),
        source: String::new(),
        file: file_name.clone(),
    })?;

    let program = ProgramState::from_source(&source, &file_name).map_err(|error| Failure {
        error,
        source: source.clone(),
        file: file_name.clone(),
    })?;

    let mode = if all {
        VerifyMode::Exhaustive
    } else {
        VerifyMode::Batch
    };

    let start = Instant::now();
    let report = verify_all(&program, mode);
    info!("Verified in {:?}", start.elapsed());

    if report.ok {
        println!("{}: {} definitions verified", file_name, program.len());
        return Ok(());
    }

    let mut failures = report.failures.into_iter();
    let last = failures.next_back();

    for (name, error) in failures {
        warn!("`{}` failed verification", name);
        display_error(&error, &source, &file_name);
    }

    match last {
        Some((name, error)) => {
            warn!("`{}` failed verification", name);
            Err(Failure {
                error,
                source,
                file: file_name,
            })
        }
        None => Ok(()),
    }
}

fn compile(
    path: &Path,
    output: Option<PathBuf>,
    emit_llvm: bool,
    optimize: bool,
    entry: &str,
) -> Result<(), Failure> {
    let (program, source, file) = load_program(path)?;
    let fail = |error: Error| Failure {
        error,
        source: source.clone(),
        file: file.clone(),
    };

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("out"));

    let start = Instant::now();
    let context = Context::create();
    let mut compiler = Compiler::new(&context, &stem);
    compiler.compile_executable(&program, entry).map_err(fail)?;
    compiler.verify().map_err(fail)?;
    if optimize {
        compiler.optimize();
    }
    info!("Compiled in {:?}", start.elapsed());

    if emit_llvm {
        let ir_path = output.unwrap_or_else(|| PathBuf::from(format!("{}.ll", stem)));
        compiler.write_ir(&ir_path).map_err(fail)?;
        println!("Wrote {}", ir_path.display());
        return Ok(());
    }

    let executable = output.unwrap_or_else(|| PathBuf::from(&stem));
    let object = executable.with_extension("o");
    compiler.write_object(&object).map_err(fail)?;

    let link_start = Instant::now();
    let linked = Process::new("cc")
        .arg(&object)
        .arg("-o")
        .arg(&executable)
        .output()
        .map_err(|error| fail(link_error(format!("could not run cc: {}", error))))?;

    if !linked.status.success() {
        return Err(fail(link_error(format!(
            "cc failed: {}",
            String::from_utf8_lossy(&linked.stderr)
        ))));
    }
    info!("Linked in {:?}", link_start.elapsed());

    if let Err(error) = std::fs::remove_file(&object) {
        warn!("could not remove {}: {}", object.display(), error);
    }

    println!("Wrote {}", executable.display());

    Ok(())
}

fn link_error(message: String) -> Error {
    Error::new(ErrorImpl::CodegenError { message }, Position::null())
}

fn repl() -> Result<(), Failure> {
    let mut session = Session::default();
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(">>> ".into()),
        DefaultPromptSegment::Empty,
    );

    println!("kari REPL - :defs lists definitions, :quit exits");

    loop {
        let signal = match line_editor.read_line(&prompt) {
            Ok(signal) => signal,
            Err(error) => {
                eprintln!("Reedline error: {error}");
                return Ok(());
            }
        };

        match signal {
            Signal::Success(buffer) => {
                let line = buffer.trim();

                match line {
                    "" => continue,
                    ":quit" | ":q" => return Ok(()),
                    ":defs" => {
                        for definition in session.listing() {
                            println!("{}", definition);
                        }
                        continue;
                    }
                    _ => {}
                }

                match session.execute(line) {
                    Ok(outcomes) => {
                        for outcome in outcomes {
                            report_outcome(outcome);
                        }
                    }
                    Err(error) => display_error(&error, line, "shell"),
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!();
                return Ok(());
            }
        }
    }
}

fn report_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Defined { name, broken } => {
            println!("defined {}", name);
            for dependent in broken {
                println!("  warning: {} no longer verifies", dependent);
            }
        }
        Outcome::Evaluated(value) => println!("{}", value),
    }
}
