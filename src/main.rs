//! Console Markup CLI
//!
//! Usage:
//!   console-markup [OPTIONS] [FILE] [-- ARGS...]
//!
//! Options:
//!   -m, --markup <TEXT>      Markup given inline instead of a file
//!   -n, --newline            Append a line break after the output
//!   -r, --read-line          Read one line of input afterwards and echo it
//!   -c, --check              Parse only and report diagnostics
//!   -s, --stylesheet <FILE>  Stylesheet file with color aliases (TOML format)
//!   -g, --grammar            Show markup reference
//!   -v, --verbose            More logging (repeat for trace)
//!   -h, --help               Print help

use std::fmt::Display;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use console_markup::interpreter;
use console_markup::parser::{self, Document};
use console_markup::terminal::{ConsoleTerminal, Terminal};
use console_markup::{Newline, ParseError, RenderError, Stylesheet};

#[derive(Parser)]
#[command(name = "console-markup")]
#[command(about = "Render console markup to the terminal")]
struct Cli {
    /// Input file (reads from stdin if neither FILE nor --markup is given)
    input: Option<PathBuf>,

    /// Markup given inline
    #[arg(short, long, conflicts_with = "input")]
    markup: Option<String>,

    /// Positional arguments for {0}, {1,-8}, ... placeholders
    #[arg(last = true)]
    args: Vec<String>,

    /// Append a line break after the output
    #[arg(short, long)]
    newline: bool,

    /// Read one line of input after rendering and echo it to stdout
    #[arg(short, long)]
    read_line: bool,

    /// Parse only and report diagnostics
    #[arg(short, long)]
    check: bool,

    /// Stylesheet file with color aliases (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Show markup reference
    #[arg(short, long)]
    grammar: bool,

    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.grammar {
        print_grammar();
        return;
    }

    if cli.input.is_none() && cli.markup.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Stylesheet::builtin(),
    };

    let (filename, template) = match read_template(&cli) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let template = if cli.newline {
        format!("{}\n", template)
    } else {
        template
    };

    let args: Vec<&dyn Display> = cli.args.iter().map(|a| a as &dyn Display).collect();
    let args = if args.is_empty() {
        None
    } else {
        Some(args.as_slice())
    };

    let (source, document) = match load(&template, args, &filename) {
        Ok(loaded) => loaded,
        Err(report) => {
            eprint!("{}", report);
            process::exit(1);
        }
    };

    if cli.check {
        debug!(nodes = document.nodes.len(), "markup is well-formed");
        return;
    }

    let mut terminal = ConsoleTerminal::new();
    if let Err(e) = run(&mut terminal, &document, &stylesheet, cli.read_line) {
        // Flush what was rendered before the failure so the report follows it
        let _ = terminal.flush();
        match e {
            RenderError::Value(e) => eprint!("{}", e.format(&source, &filename)),
            e => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    if let Err(err) = subscriber.try_init() {
        eprintln!("Warning: failed to initialize logging: {}", err);
    }
}

fn read_template(cli: &Cli) -> io::Result<(String, String)> {
    if let Some(markup) = &cli.markup {
        return Ok(("<markup>".to_string(), markup.clone()));
    }
    match &cli.input {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("reading file '{}': {}", path.display(), e),
                )
            })?;
            Ok((path.display().to_string(), content))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(("<stdin>".to_string(), buffer))
        }
    }
}

/// Prepare and parse, returning the parser input alongside the document
///
/// Diagnostics are rendered against the text they point into: placeholder
/// errors against the raw template, markup errors against the expanded one.
fn load(
    template: &str,
    args: Option<&[&dyn Display]>,
    filename: &str,
) -> Result<(String, Document), String> {
    let source = parser::prepare(template, args, Newline::Native)
        .map_err(|e| e.format(template, filename))?;
    match parser::parse(&source) {
        Ok(document) => Ok((source, document)),
        Err(errors) => Err(format_errors(&errors, &source, filename)),
    }
}

fn format_errors(errors: &[ParseError], source: &str, filename: &str) -> String {
    errors
        .iter()
        .map(|e| e.format(source, filename))
        .collect::<Vec<_>>()
        .join("\n")
}

fn run(
    terminal: &mut ConsoleTerminal,
    document: &Document,
    stylesheet: &Stylesheet,
    read_line: bool,
) -> Result<(), RenderError> {
    interpreter::execute(document, terminal, stylesheet)?;
    terminal.flush()?;
    if read_line {
        if let Some(line) = terminal.read_line()? {
            println!("{}", line);
        }
    }
    Ok(())
}

fn print_intro() {
    println!(
        r#"Console Markup - declarative formatting for terminal output

USAGE:
    console-markup [OPTIONS] [FILE] [-- ARGS...]
    console-markup -m '<markup>' [-- ARGS...]
    echo '<markup>' | console-markup

OPTIONS:
    -m, --markup       Markup given inline
    -n, --newline      Append a line break
    -r, --read-line    Read a line afterwards and echo it
    -c, --check        Parse only and report diagnostics
    -s, --stylesheet   Color aliases (TOML file)
    -g, --grammar      Show markup reference
    -v, --verbose      More logging
    -h, --help         Print help

QUICK START:
    console-markup -n -m '<color fg="Red">{{0}}</color> done' -- failed

Run --grammar for the element and attribute reference."#
    );
}

fn print_grammar() {
    println!(
        r#"CONSOLE MARKUP REFERENCE
========================

Templates are text with XML-style elements. Text is written as-is.
An element with content restores colors, cursor size, cursor visibility
and (unless it moved the cursor) the cursor position when it closes.
An empty element (<color fg="Red"/>) leaves its changes in place.
Unknown elements are transparent; element names are case-sensitive.

COLOR
-----
<color fg="..." bg="...">
    Colors: Black DarkBlue DarkGreen DarkCyan DarkRed DarkMagenta
            DarkYellow Gray DarkGray Blue Green Cyan Red Magenta
            Yellow White, or 0-15. Names are case-insensitive.
    Stylesheet aliases (error, warning, success, ...) also resolve.

CURSOR
------
<cursor x="N" y="N" dx="N" dy="N" size="1-100" show="true|false">
    x, y     Absolute column/row; negative counts back from the
             window's right/bottom edge
    dx, dy   Relative move; ignored on an axis where x/y is given

WINDOW
------
<window x="N" y="N" width="N" height="N" title="...">
<window bufwidth="N" bufheight="N">
    Window geometry, buffer size and title are never restored.

BEEP
----
<beep/>                              Default beep
<beep freq="37-32767" duration="MS"/> Tone

SUBSTITUTION
------------
With arguments, {{0}} and {{1,-10}} are replaced before parsing.
{{{{ and }}}} write literal braces. Without arguments braces are literal.

ESCAPES
-------
&lt; &gt; &amp; &quot; &apos; &#NN; &#xHH; and <![CDATA[ ... ]]>"#
    );
}
