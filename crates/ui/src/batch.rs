use crate::reporter::{render_json, render_text};
use evaluator::{evaluate_workflow_file, input_failure, EvaluateOptions, InputError};
use models::ValidationResult;
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Warnings also fail the run
    pub strict: bool,
    pub json: bool,
    pub evaluate: EvaluateOptions,
}

fn render(result: &ValidationResult, options: &ValidateOptions, out: &mut dyn Write) -> io::Result<()> {
    if options.json {
        render_json(result, out)
    } else {
        render_text(result, out)
    }
}

fn exit_code(failed: bool) -> i32 {
    if failed {
        1
    } else {
        0
    }
}

/// Validate a file or every workflow under a directory, write the reports
/// and return the process exit code.
pub fn validate_path(path: &Path, options: &ValidateOptions, out: &mut dyn Write) -> io::Result<i32> {
    let display = path.display().to_string();

    if !path.exists() {
        let result = input_failure(&display, &InputError::NotFound(display.clone()));
        render(&result, options, out)?;
        return Ok(1);
    }

    if path.is_file() {
        let result = evaluate_workflow_file(path, &options.evaluate);
        render(&result, options, out)?;
        return Ok(exit_code(result.is_disqualified(options.strict)));
    }

    if !path.is_dir() {
        let result = input_failure(&display, &InputError::NotAFileOrDirectory(display.clone()));
        render(&result, options, out)?;
        return Ok(1);
    }

    let files = utils::find_workflow_files(path);
    logging::info(&format!(
        "Found {} workflow file(s) in {}",
        files.len(),
        display
    ));

    let results: Vec<ValidationResult> = files
        .par_iter()
        .map(|file| evaluate_workflow_file(file, &options.evaluate))
        .collect();

    for result in &results {
        render(result, options, out)?;
    }

    let passed = results
        .iter()
        .filter(|result| !result.is_disqualified(options.strict))
        .count();

    if !options.json {
        writeln!(out, "Summary: {}/{} files valid", passed, results.len())?;
    }

    Ok(exit_code(passed < results.len()))
}
