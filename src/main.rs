use clap::{Arg, ArgAction, ArgMatches, Command, crate_name, crate_version, value_parser};
use clap_complete::Shell;
use rustyline::{DefaultEditor, error::ReadlineError};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use microml::{
    api, error,
    error::Diagnostic,
    lexer::{Lexer, TokenKind},
    parser::{self, parse},
    render::{Direction, RenderConfig, render_with},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    MicroMl(#[from] error::Error),

    #[error("{}", Diagnostic::new(.filename, .contents, .error))]
    Syntax {
        filename: String,
        contents: String,
        error: parser::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("source file, or '-' for stdin")
}

fn render_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("direction")
            .long("direction")
            .short('d')
            .default_value("TD")
            .value_parser(value_parser!(Direction))
            .help("graph direction: TD, LR, BT or RL"),
    )
    .arg(
        Arg::new("label-operands")
            .long("label-operands")
            .action(ArgAction::SetTrue)
            .help("label operator operand edges with L and R"),
    )
}

fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Render MicroML syntax trees as Mermaid flowcharts")
        .disable_colored_help(true)
        .disable_help_subcommand(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("tokens")
                .about("print the token stream")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("ast")
                .about("print the parsed expression")
                .arg(file_arg()),
        )
        .subcommand(render_args(
            Command::new("mermaid")
                .about("print the Mermaid graph of the syntax tree")
                .arg(file_arg()),
        ))
        .subcommand(render_args(
            Command::new("json").about("read {\"code\": ...} on stdin, write {\"mermaid\": ...}"),
        ))
        .subcommand(render_args(
            Command::new("repl").about("render each entered line"),
        ))
        .subcommand(
            Command::new("completions")
                .about("generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

fn render_config(matches: &ArgMatches) -> RenderConfig {
    RenderConfig {
        direction: matches
            .get_one::<Direction>("direction")
            .copied()
            .unwrap_or_default(),
        label_operands: matches.get_flag("label-operands"),
    }
}

fn read_source(matches: &ArgMatches) -> Result<(String, String)> {
    let path = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("-"));
    if path.as_os_str() == "-" {
        let mut contents = String::new();
        io::stdin().read_to_string(&mut contents)?;
        return Ok(("<stdin>".to_string(), contents));
    }
    let contents = fs::read_to_string(&path)?;
    debug!(path = %path.display(), bytes = contents.len(), "read source");
    Ok((path.display().to_string(), contents))
}

fn parse_source(filename: String, contents: String) -> Result<microml::Expr> {
    parse(&contents).map_err(|error| Error::Syntax {
        filename,
        contents,
        error,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Line(String),
    Skip,
    Quit,
}

/// Ctrl-C drops the current line and Ctrl-D ends the session. Any other
/// readline failure is an error.
fn repl_input(result: rustyline::Result<String>) -> Result<ReplInput> {
    match result {
        Ok(line) => Ok(ReplInput::Line(line)),
        Err(ReadlineError::Interrupted) => Ok(ReplInput::Skip),
        Err(ReadlineError::Eof) => Ok(ReplInput::Quit),
        Err(err) => Err(err.into()),
    }
}

fn run() -> Result<()> {
    let mut cmd = command();

    match cmd.try_get_matches_from_mut(std::env::args_os())?.subcommand() {
        Some(("tokens", sub_matches)) => {
            let (filename, contents) = read_source(sub_matches)?;
            let mut lexer = Lexer::new(&contents);
            loop {
                match lexer.next_token() {
                    Ok(token) if token.kind == TokenKind::Eof => break,
                    Ok(token) => println!(
                        "{}:{}:{}: {:?} {:?}",
                        filename, token.span.start.line, token.span.start.column, token.kind,
                        token.text
                    ),
                    Err(err) => {
                        return Err(Error::Syntax {
                            filename,
                            contents: contents.clone(),
                            error: err.into(),
                        });
                    }
                }
            }
        }

        Some(("ast", sub_matches)) => {
            let (filename, contents) = read_source(sub_matches)?;
            let ast = parse_source(filename, contents)?;
            println!("{ast}");
        }

        Some(("mermaid", sub_matches)) => {
            let config = render_config(sub_matches);
            let (filename, contents) = read_source(sub_matches)?;
            let ast = parse_source(filename, contents)?;
            info!(nodes = ast.size(), direction = %config.direction, "rendering");
            print!("{}", render_with(&ast, &config));
        }

        Some(("json", sub_matches)) => {
            let config = render_config(sub_matches);
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            let response = api::handle_json(&body, &config)?;
            println!("{response}");
        }

        Some(("repl", sub_matches)) => {
            let config = render_config(sub_matches);
            let mut rl = DefaultEditor::new()?;

            loop {
                let input = match repl_input(rl.readline("> "))? {
                    ReplInput::Line(line) => {
                        rl.add_history_entry(&line)?;
                        line
                    }
                    ReplInput::Skip => continue,
                    ReplInput::Quit => break,
                };

                if input.trim().is_empty() {
                    continue;
                }

                match parse(&input) {
                    Ok(ast) => print!("{}", render_with(&ast, &config)),
                    Err(err) => print!("{}", Diagnostic::new("<repl>", &input, &err)),
                }
            }
        }

        Some(("completions", sub_matches)) => {
            let shell = sub_matches
                .get_one::<Shell>("shell")
                .copied()
                .ok_or_else(|| cmd.error(clap::error::ErrorKind::MissingRequiredArgument, "shell"))?;
            clap_complete::generate(shell, &mut cmd, crate_name!(), &mut io::stdout());
        }

        _ => unreachable!(),
    };

    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "microml=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(error) = run() {
        match error {
            Error::Clap(error) => {
                let _ = error.print();
                match error.kind() {
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        std::process::exit(0)
                    }
                    _ => std::process::exit(1),
                }
            }
            _ => {
                eprintln!("{}", error.to_string().trim_end());
                std::process::exit(1);
            }
        }
    }
}
