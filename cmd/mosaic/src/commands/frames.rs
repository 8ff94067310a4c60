//! Analyzer frame text format: one frame per non-empty line, values
//! separated by whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, bail};

/// Parses one line; blank lines yield `None`.
pub fn parse_frame(line: &str, line_no: usize) -> anyhow::Result<Option<Vec<f32>>> {
    let frame = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f32>()
                .with_context(|| format!("line {line_no}: malformed number {tok:?}"))
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;
    Ok((!frame.is_empty()).then_some(frame))
}

/// Reads every frame from `reader`.
pub fn read_frames<R: BufRead>(reader: R) -> anyhow::Result<Vec<Vec<f32>>> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(frame) = parse_frame(&line?, i + 1)? {
            frames.push(frame);
        }
    }
    if frames.is_empty() {
        bail!("no frames found");
    }
    Ok(frames)
}

pub fn load_frames(path: &Path) -> anyhow::Result<Vec<Vec<f32>>> {
    let file = File::open(path).with_context(|| format!("open frames {}", path.display()))?;
    read_frames(BufReader::new(file)).with_context(|| format!("read frames {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_frame() {
        assert_eq!(parse_frame("1 2.5\t-3", 1).unwrap(), Some(vec![1.0, 2.5, -3.0]));
        assert_eq!(parse_frame("   ", 1).unwrap(), None);
        let err = parse_frame("1 x", 7).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_read_frames_skips_blank_lines() {
        let frames = read_frames("0 1\n\n2 3\n".as_bytes()).unwrap();
        assert_eq!(frames, vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
    }

    #[test]
    fn test_read_frames_empty() {
        assert!(read_frames("\n\n".as_bytes()).is_err());
    }

    #[test]
    fn test_load_frames() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.5 0.5 0.5").unwrap();
        let frames = load_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(load_frames(Path::new("/nonexistent/frames.txt")).is_err());
    }
}
