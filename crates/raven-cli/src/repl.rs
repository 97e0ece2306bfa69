//! Line REPL
//!
//! Every line is checked and run in one [`Session`], so definitions carry
//! over. Expression statements echo their value.

use std::path::Path;

use anyhow::Result;
use raven::{EvalContext, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::{print_faults, read_script};

const PROMPT: &str = "raven> ";

/// What a line of input asks for.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Load(&'a str),
    Source(&'a str),
    Blank,
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        ":q" | ":quit" => Input::Quit,
        _ => match line.strip_prefix(":l ") {
            Some(path) => Input::Load(path.trim()),
            None => Input::Source(line),
        },
    }
}

/// Run the REPL until `:q` or end of input.
pub fn run(mut ctx: EvalContext) -> Result<()> {
    ctx.echo = true;
    let mut session = Session::new(ctx);
    let mut editor = DefaultEditor::new()?;

    println!("Raven {} (:q to quit, :l <file> to load)", raven::VERSION);

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        match classify(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Load(path) => {
                editor.add_history_entry(line.as_str())?;
                match read_script(Path::new(path)) {
                    Ok(source) => run_line(&mut session, &source),
                    Err(err) => eprintln!("{:#}", err),
                }
            }
            Input::Source(source) => {
                editor.add_history_entry(line.as_str())?;
                run_line(&mut session, source);
            }
        }
    }

    debug!("leaving REPL");
    Ok(())
}

fn run_line(session: &mut Session, source: &str) {
    session.interpreter().context().reset_interrupt();
    let status = session.run(source);
    print_faults(&status, source);
    if let raven::RunStatus::Exited { code, .. } = status {
        println!("(exit {})", code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_commands() {
        assert_eq!(classify("  :q "), Input::Quit);
        assert_eq!(classify(":l demo.rv"), Input::Load("demo.rv"));
        assert_eq!(classify("   "), Input::Blank);
        assert_eq!(classify("print(1)"), Input::Source("print(1)"));
    }
}
