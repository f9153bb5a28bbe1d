use std::fs;
use std::process;

use clap::Parser;

use lej::parsetree::render;
use lej::tokeniser::tokenise;
use lej::{Interpreter, LejError};

/// Interprets a Lej program and prints its final bindings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat `contents` as the path of a source file.
    #[arg(short, long)]
    file: bool,

    /// Print the parse tree before running.
    #[arg(long)]
    tree: bool,

    /// Print the token sequence before parsing.
    #[arg(long)]
    tokens: bool,

    contents: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let source = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|e| {
            eprintln!("Failed to read the input file '{}': {}", &args.contents, e);
            process::exit(1);
        })
    } else {
        args.contents.clone()
    };

    let mut interpreter = Interpreter::new().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let result = run(&mut interpreter, &source, &args);
    print!("{}", interpreter.bindings());
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

// Lexes and parses once; the dumps reuse the same tokens and tree.
fn run(interpreter: &mut Interpreter, source: &str, args: &Args) -> Result<(), LejError> {
    let tokens = tokenise(source)?;
    if args.tokens {
        println!("{}", render(&tokens));
    }

    let root = match interpreter.parse_tokens(tokens)? {
        Some(root) => root,
        None => return Ok(())
    };
    if args.tree {
        print!("{}", root.tree());
    }
    interpreter.run_tree(root)
}


#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn flags_and_inline_source() {
        let args = Args::try_parse_from(["lej", "--tree", "--tokens", "def int x as 2 * 3;"]).unwrap();
        assert!(args.tree && args.tokens && !args.file);

        let mut interpreter = Interpreter::new().unwrap();
        run(&mut interpreter, &args.contents, &args).unwrap();
        assert_eq!(interpreter.bindings().int("x"), Some(&BigInt::from(6)));
    }

    #[test]
    fn failures_keep_earlier_bindings() {
        let args = Args::try_parse_from(["lej", "def int x as 1; def int x as 2;"]).unwrap();
        let mut interpreter = Interpreter::new().unwrap();
        let err = run(&mut interpreter, &args.contents, &args).unwrap_err();
        assert!(matches!(err, LejError::Runtime{..}));
        assert_eq!(interpreter.bindings().len(), 1);
    }

    #[test]
    fn empty_source_runs_nothing() {
        let args = Args::try_parse_from(["lej", "--tree", "` nothing `"]).unwrap();
        let mut interpreter = Interpreter::new().unwrap();
        run(&mut interpreter, &args.contents, &args).unwrap();
        assert!(interpreter.bindings().is_empty());
    }
}
