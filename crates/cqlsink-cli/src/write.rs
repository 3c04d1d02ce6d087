use crate::cli::WriteArgs;
use crate::config::ProjectConfig;
use cqlsink::{ChangeRecord, Destination, RecordingSession};
use std::io::{BufRead, BufReader, Read};
use tracing::info;

pub async fn run(args: WriteArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config)?;
    let config = &project.file.destination;

    let records = match &args.input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.display()))?;
            read_records(file)?
        }
        None => read_records(std::io::stdin().lock())?,
    };

    if args.dry_run {
        let destination = Destination::from_config(config, RecordingSession::new())?;
        let result = destination.write(&records).await;
        if let Some(session) = destination.session() {
            for statement in session.executed() {
                println!("{}", serde_json::to_string(&statement)?);
            }
        }
        result?;
        return Ok(());
    }

    let mut destination = Destination::open(config).await?;
    let result = destination.write(&records).await;
    if let Some(session) = destination.session() {
        let stats = session.stats();
        info!(
            executed = stats.executed,
            failed = stats.failed,
            not_applied = stats.not_applied,
            total_ms = stats.total_duration.as_millis() as u64,
            "session stats"
        );
    }
    destination.teardown()?;

    match result {
        Ok(written) => {
            println!("wrote {written} records");
            Ok(())
        }
        Err(e) => {
            let written = e.written().unwrap_or(0);
            Err(anyhow::Error::new(e)
                .context(format!("wrote {written} of {} records", records.len())))
        }
    }
}

/// Parse newline-delimited JSON change records, skipping blank lines.
fn read_records(input: impl Read) -> anyhow::Result<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    for (i, line) in BufReader::new(input).lines().enumerate() {
        let line = line.map_err(|e| anyhow::anyhow!("failed to read input: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| anyhow::anyhow!("line {}: invalid change record: {e}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlsink::Operation;

    #[test]
    fn read_records_skips_blank_lines() {
        let input = concat!(
            r#"{"position":"1","operation":"create","key":{"id":1},"payload":{"after":{"id":1,"name":"a"}}}"#,
            "\n\n",
            r#"{"position":"2","operation":"delete","key":{"id":1}}"#,
            "\n",
        );
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operation, Operation::Create);
        assert_eq!(records[1].position, "2");
    }

    #[test]
    fn read_records_keeps_odd_shapes_for_the_destination() {
        let input = concat!(
            r#"{"position":"1","operation":"update","key":null,"payload":{"after":{"a":1}}}"#,
            "\n",
            r#"{"position":"2","operation":"create","key":{"id":1},"payload":{"after":[1,2]}}"#,
            "\n",
        );
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].key.as_structured().is_none());
        assert!(records[1].payload.after.as_ref().and_then(|d| d.as_structured()).is_none());
    }

    #[test]
    fn read_records_reports_line_number() {
        let input = "{\"operation\":\"delete\",\"key\":{}}\nnot json\n";
        let err = read_records(input.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 2: invalid change record"));
    }
}
