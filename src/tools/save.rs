use super::Tool;
use crate::error::AssistantError;
use crate::Result;
use chrono::Local;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

/// Appends research output to a local text file.
///
/// Writes go through a mutex so blocks from concurrent sessions never
/// interleave. There is no rotation or size limit.
pub struct SaveTool {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SaveTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

/// One appended block: header, timestamp, blank line, data, blank line.
pub fn format_block(data: &str, timestamp: &str) -> String {
    format!(
        "--- Research Output ---\nTimestamp: {}\n\n{}\n\n",
        timestamp, data
    )
}

#[async_trait::async_trait]
impl Tool for SaveTool {
    fn name(&self) -> &'static str {
        "save_tool"
    }

    fn description(&self) -> &'static str {
        "Saves structured research data to a text file."
    }

    fn parameter(&self) -> &'static str {
        "data"
    }

    async fn run(&self, input: &str) -> Result<String> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let block = format_block(input, &timestamp);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AssistantError::ToolError(format!(
                    "cannot open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(block.as_bytes()).await?;
        file.flush().await?;

        info!(path = %self.path.display(), bytes = block.len(), "Research output saved");

        Ok(format!(
            "Data successfully saved to {}",
            self.path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        assert_eq!(
            format_block("hello", "2024-01-02 03:04:05"),
            "--- Research Output ---\nTimestamp: 2024-01-02 03:04:05\n\nhello\n\n"
        );
    }

    #[test]
    fn test_tool_name_and_parameter() {
        let tool = SaveTool::new("unused.txt");
        assert_eq!(tool.name(), "save_tool");
        assert_eq!(tool.parameter(), "data");
    }

    #[tokio::test]
    async fn test_appends_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("research_output.txt");
        let tool = SaveTool::new(&path);

        let first = tool.run("first finding").await.unwrap();
        tool.run("second finding").await.unwrap();

        assert_eq!(
            first,
            format!("Data successfully saved to {}", path.display())
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("--- Research Output ---\nTimestamp: ").count(), 2);
        let first_at = contents.find("first finding").unwrap();
        let second_at = contents.find("second finding").unwrap();
        assert!(first_at < second_at);
        assert!(contents.ends_with("second finding\n\n"));
    }

    #[tokio::test]
    async fn test_timestamp_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        SaveTool::new(&path).run("x").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let stamp_line = contents.lines().nth(1).unwrap();
        let stamp = stamp_line.strip_prefix("Timestamp: ").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[tokio::test]
    async fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let err = SaveTool::new(path).run("x").await.unwrap_err();
        assert!(matches!(err, AssistantError::ToolError(_)));
    }
}
