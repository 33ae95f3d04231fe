//! Command line front end: convert a CSV file with a query program.
//!
//! Usage:
//!   csvconv -f <input> [-o <output>] [-d ',;'] [-n crlf] [-i] [-v] <program...>
//!
//! The program words are joined with spaces, so quoting the whole program
//! is optional. Without `-o` the result goes to stdout.

use std::process;

use clap::Parser;
use csvconv::{NewlineMode, Options, Pipeline, STDIN, convert_csv, parse_delimiters};
use log::{error, info};

const EXAMPLES: &str = "\
Examples:
   'select a,b,c'                       select columns by name
   'select 1,2,3'                       select columns by index
   'select a as x, b -> y'              select and rename columns
   'select a,b | filter a = 1'          filter rows by value
   'select a,b | filter a ~ \"[0-9]\"'    filter rows by regex
   'select a,b | sort a'                sort rows by string value
   'select a,b | sort:num a'            sort rows by number value
   'select a,b | sort:num:desc a'       sort rows by number value descending
   'select a,b | number:dot:comma a'    convert a number column
   'select a,b | date:iso a'            convert a date column to ISO format
   'select a,b | numbers dot:comma'     convert all numbers
   'select a,b | dates iso'             convert all dates";

/// Convert CSV files with a pipe-separated query language.
#[derive(Parser)]
#[command(name = "csvconv", after_help = EXAMPLES)]
struct Cli {
    /// Input file, or - for stdin
    #[arg(short = 'f', long)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, default_value = "")]
    output: String,

    /// Overwrite the input file with the result
    #[arg(short, long)]
    inline: bool,

    /// Delimiter for input and output, or a pair like ",;" to change it
    #[arg(short, long, default_value = ",")]
    delim: String,

    /// Output newline mode (auto, nl, crlf)
    #[arg(short, long, default_value = "auto")]
    newline: String,

    /// Log every statement and its row counts on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Query program, e.g. "select a, b | filter a > 1"
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    program: Vec<String>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Check all arguments, reporting every problem rather than the first.
fn options(cli: &Cli) -> Result<Options, Vec<String>> {
    let mut errors = Vec::new();

    if cli.input.is_empty() {
        errors.push("input file is required".to_string());
    }
    if cli.inline && cli.input == STDIN {
        errors.push("stdin cannot be used with inline".to_string());
    }
    if cli.inline && !cli.output.is_empty() {
        errors.push("output cannot be used with inline".to_string());
    }
    let delimiters = parse_delimiters(&cli.delim)
        .inspect_err(|e| errors.push(e.to_string()))
        .ok();
    let newline = cli
        .newline
        .parse::<NewlineMode>()
        .inspect_err(|e| errors.push(e.to_string()))
        .ok();

    match (delimiters, newline) {
        (Some((src, dst)), Some(newline)) if errors.is_empty() => Ok(Options::new()
            .with_delimiters(src, dst)
            .with_newline(newline)
            .with_inline(cli.inline)),
        _ => Err(errors),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match options(&cli) {
        Ok(options) => options,
        Err(errors) => {
            for e in &errors {
                error!("argument error: {e}");
            }
            process::exit(1);
        }
    };

    let pipeline = match Pipeline::from_words(cli.program.as_slice()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("invalid program: {e}");
            process::exit(1);
        }
    };

    match convert_csv(&cli.input, &cli.output, &options, &pipeline) {
        Ok(trace) => {
            for stage in trace {
                info!(
                    "{}: {} -> {} rows",
                    stage.name, stage.input_count, stage.output_count
                );
            }
        }
        Err(e) => {
            error!("conversion failed: {e}");
            process::exit(1);
        }
    }
}
