use crate::cli::CheckArgs;
use dbal::TABLE_PREFIX_MARKER;
use dbal_check::{Strictness, detect_statement_kind, split_script, validate};
use std::io::Read;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub rejected: usize,
    pub lines: Vec<String>,
}

/// Split `text` into statements and run the guard over each.
///
/// The table-prefix marker is dropped first: the splitter reads `#` as a comment.
pub fn check_text(source: &str, text: &str, strictness: Strictness) -> CheckSummary {
    let text = text.replace(TABLE_PREFIX_MARKER, "");
    let mut summary = CheckSummary::default();

    for (idx, stmt) in split_script(&text).iter().enumerate() {
        let header = format!("{source}:stmt{}", idx + 1);
        let kind = detect_statement_kind(stmt);
        summary.checked += 1;
        match validate(stmt, strictness) {
            Ok(()) => summary.lines.push(format!("{header}: ok ({})", kind.as_str())),
            Err(rejection) => {
                summary.rejected += 1;
                summary
                    .lines
                    .push(format!("{header}: rejected {rejection}"));
            }
        }
    }

    summary
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let strictness = if args.lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };

    let mut inputs: Vec<(String, String)> = Vec::new();
    if let Some(sql) = args.sql {
        inputs.push(("arg".to_string(), sql));
    } else if args.files.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;
        inputs.push(("stdin".to_string(), buf));
    } else {
        for file in &args.files {
            let content = std::fs::read_to_string(file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            inputs.push((file.display().to_string(), content));
        }
    }

    let mut checked = 0;
    let mut rejected = 0;
    for (source, text) in &inputs {
        let summary = check_text(source, text, strictness);
        if summary.checked == 0 {
            anyhow::bail!("no SQL statements found in {source}");
        }
        for line in &summary.lines {
            println!("{line}");
        }
        checked += summary.checked;
        rejected += summary.rejected;
    }

    tracing::debug!(checked, rejected, ?strictness, "guard check finished");

    if rejected > 0 {
        anyhow::bail!("{rejected} of {checked} statement(s) rejected");
    }
    Ok(())
}
