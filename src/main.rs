// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Sketchmaid CLI entrypoint.
//!
//! Normalizes Mermaid text from a file or stdin: structural defects like
//! glued headers, adjacent node definitions and multi-line labels are
//! repaired in place, label text is preserved.

use std::error::Error;
use std::io::Read;

use sketchmaid::format::mermaid::{extract_mermaid, normalize_mermaid};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file>] [--extract] [--check]\n  {program} <file> --write [--extract]\n\nReads Mermaid text from <file> (or stdin when omitted) and prints the\nnormalized form.\n\n--extract first pulls the diagram out of surrounding text (code fences,\ncommentary).\n--write rewrites <file> in place instead of printing.\n--check prints nothing and exits with status 1 when the input is not\nalready normalized."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    file: Option<String>,
    write: bool,
    extract: bool,
    check: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--write" => {
                if options.write {
                    return Err(());
                }
                options.write = true;
            }
            "--extract" => {
                if options.extract {
                    return Err(());
                }
                options.extract = true;
            }
            "--check" => {
                if options.check {
                    return Err(());
                }
                options.check = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.file.is_some() {
                    return Err(());
                }
                options.file = Some(arg);
            }
        }
    }

    if options.write && options.file.is_none() {
        return Err(());
    }

    if options.write && options.check {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "sketchmaid".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    let result = (|| -> Result<(), Box<dyn Error>> {
        let input = match &options.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let source = if options.extract {
            extract_mermaid(&input)
        } else {
            input.clone()
        };
        let normalized = normalize_mermaid(&source);

        if options.check {
            if normalized != source.trim() {
                std::process::exit(1);
            }
            return Ok(());
        }

        if options.write {
            let path = options.file.as_deref().unwrap_or_default();
            std::fs::write(path, format!("{normalized}\n"))?;
        } else {
            println!("{normalized}");
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("{program}: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_positional_file() {
        let options = parse_options(["diagram.mmd".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.file.as_deref(), Some("diagram.mmd"));
        assert!(!options.write);
        assert!(!options.extract);
    }

    #[test]
    fn parses_flags_in_any_order() {
        let options = parse_options(
            ["--extract".to_owned(), "diagram.mmd".to_owned(), "--write".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert!(options.write);
        assert!(options.extract);
        assert_eq!(options.file.as_deref(), Some("diagram.mmd"));
    }

    #[test]
    fn rejects_write_without_file() {
        parse_options(["--write".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_write_with_check() {
        parse_options(
            ["diagram.mmd".to_owned(), "--write".to_owned(), "--check".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(["--extract".to_owned(), "--extract".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_multiple_positional_files() {
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
    }
}
