//! File, stdin and stdout plumbing around a pipeline run.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::{ConvertError, Result};
use crate::executor::{Pipeline, StageInfo};
use crate::io::{detect_newline, read_csv, write_csv};
use crate::options::Options;

/// Source name that reads from stdin.
pub const STDIN: &str = "-";

/// Convert CSV `data` with `pipeline`, returning the written bytes and the
/// per-statement trace.
pub fn convert_bytes(
    data: &[u8],
    options: &Options,
    pipeline: &Pipeline,
) -> Result<(Vec<u8>, Vec<StageInfo>)> {
    let detected = detect_newline(data);
    let table = read_csv(options.src_delimiter, data)?;
    debug!("read {} rows, newline: {detected}", table.rows().len());

    let (table, trace) = pipeline.run_traced(table)?;

    let newline = options.newline.or(detected);
    debug!("writing {} rows, newline: {newline}", table.rows().len());
    let out = write_csv(options.dst_delimiter, newline, &table)?;
    Ok((out, trace))
}

/// Read `src`, run `pipeline` and write the result to `dst`.
///
/// `src` of `-` reads stdin, an empty `dst` writes stdout, and with
/// `options.inline` the result replaces `src`.
pub fn convert_csv(
    src: &str,
    dst: &str,
    options: &Options,
    pipeline: &Pipeline,
) -> Result<Vec<StageInfo>> {
    let dst = if options.inline {
        if src == STDIN {
            return Err(ConvertError::InvalidOption(
                "stdin cannot be edited inline".to_string(),
            ));
        }
        if !dst.is_empty() {
            return Err(ConvertError::InvalidOption(
                "an output file cannot be used with inline".to_string(),
            ));
        }
        src
    } else {
        dst
    };

    info!(
        "converting {} -> {} (delimiters '{}' '{}', newline {})",
        if src == STDIN { "(stdin)" } else { src },
        if dst.is_empty() { "(stdout)" } else { dst },
        options.src_delimiter as char,
        options.dst_delimiter as char,
        options.newline
    );

    let data = read_source(src)?;
    let (out, trace) = convert_bytes(&data, options, pipeline)?;
    write_destination(dst, &out)?;
    Ok(trace)
}

fn read_source(src: &str) -> Result<Vec<u8>> {
    if src == STDIN {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        return Ok(data);
    }
    Ok(fs::read(src)?)
}

fn write_destination(dst: &str, data: &[u8]) -> Result<()> {
    if dst.is_empty() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()?;
        return Ok(());
    }
    if let Some(parent) = Path::new(dst).parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(dst, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NewlineMode;

    fn pipeline(program: &str) -> Pipeline {
        Pipeline::parse(program).unwrap()
    }

    #[test]
    fn test_convert_bytes_keeps_newline() {
        let (out, trace) = convert_bytes(
            b"a,b\r\n1,x\r\n2,y\r\n",
            &Options::new(),
            &pipeline("filter a > 1"),
        )
        .unwrap();
        assert_eq!(out, b"a,b\r\n2,y\r\n");
        assert_eq!(trace.len(), 1);
        assert_eq!((trace[0].input_count, trace[0].output_count), (2, 1));
    }

    #[test]
    fn test_convert_bytes_forced_newline_and_delimiters() {
        let options = Options::new()
            .with_delimiters(b',', b';')
            .with_newline(NewlineMode::Lf);
        let (out, _) = convert_bytes(b"a,b\r\n1.5,2\r\n", &options, &pipeline("numbers dot:comma")).unwrap();
        assert_eq!(out, b"a;b\n1,5;2\n");
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        let dst = dir.path().join("out/result.csv");
        fs::write(&src, "name,age\nAlice,30\nBob,17\n").unwrap();

        convert_csv(
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
            &Options::new(),
            &pipeline("filter age >= 18 | select name"),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "name\nAlice\n");
    }

    #[test]
    fn test_convert_inline() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data.csv");
        fs::write(&src, "d\n2023-03-04\n").unwrap();
        let src = src.to_str().unwrap();

        let options = Options::new().with_inline(true);
        convert_csv(src, "", &options, &pipeline("date:iso:dot d")).unwrap();
        assert_eq!(fs::read_to_string(src).unwrap(), "d\n04.03.2023\n");

        assert!(matches!(
            convert_csv(src, "other.csv", &options, &pipeline("")),
            Err(ConvertError::InvalidOption(_))
        ));
        assert!(matches!(
            convert_csv(STDIN, "", &options, &pipeline("")),
            Err(ConvertError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_failed_program_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        let dst = dir.path().join("out.csv");
        fs::write(&src, "a\n1\n").unwrap();

        let result = convert_csv(
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
            &Options::new(),
            &pipeline("sort b"),
        );
        assert!(matches!(result, Err(ConvertError::ColumnNotFound { .. })));
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("missing.csv");
        assert!(matches!(
            convert_csv(src.to_str().unwrap(), "", &Options::new(), &pipeline("")),
            Err(ConvertError::Io(_))
        ));
    }
}
