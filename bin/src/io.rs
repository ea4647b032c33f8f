use std::io::Read;

use anyhow::Context;

/// Writes `output` to the named file, or to stdout when no file was given.
pub fn to_file_or_stdout(maybe_file_name: Option<&String>, output: &str) -> anyhow::Result<()> {
    if let Some(file_name) = maybe_file_name {
        std::fs::write(file_name, output)
            .with_context(|| format!("cannot open file: {file_name}"))?;
    } else {
        println!("{output}");
    }
    Ok(())
}

/// Reads the named file, or stdin to exhaustion when no file was given.
pub fn from_file_or_stdin(maybe_file_name: Option<&String>) -> anyhow::Result<String> {
    match maybe_file_name {
        Some(file_name) => std::fs::read_to_string(file_name)
            .with_context(|| format!("cannot open file: {file_name}")),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf)
        }
    }
}
