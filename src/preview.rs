//! Preview rendering and external viewer commands.
//!
//! The selected post's HTML body goes to a single scratch file. An inline
//! renderer turns it into plain text for the preview pane; the full-screen
//! viewers are described as [`ExternalLaunch`] values and run by the UI loop
//! once it has handed the terminal over.

use crate::config::Config;
use crate::feed::PostDetail;
use crate::util::strip_control_chars;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

pub const SCRATCH_FILE_NAME: &str = "preview.html";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Empty {0} command")]
    EmptyCommand(&'static str),

    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer timed out after {0}s")]
    Timeout(u64),
}

// ============================================================================
// Command Templates
// ============================================================================

/// A whitespace-split command line with `{cols}`, `{file}` and `{url}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(line: &str, what: &'static str) -> Result<Self, PreviewError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(PreviewError::EmptyCommand(what))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Substitute placeholders. `target` replaces `placeholder` (`{file}` or
    /// `{url}`), or is appended as the last argument when the template does
    /// not mention it.
    pub fn expand(&self, placeholder: &str, target: &str, cols: u16) -> Vec<String> {
        let cols = cols.to_string();
        let mut used_target = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(placeholder) {
                    used_target = true;
                }
                arg.replace(placeholder, target).replace("{cols}", &cols)
            })
            .collect();
        if !used_target {
            args.push(target.to_string());
        }
        args
    }
}

// ============================================================================
// External Launches
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    /// Plain-text viewer on the scratch file (Enter on a post).
    Preview,
    /// Text browser on the post URL (`o`).
    Browser,
}

/// A full-screen child process to run with the terminal handed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLaunch {
    pub kind: LaunchKind,
    pub program: String,
    pub args: Vec<String>,
    /// Index of the post in the loaded stream.
    pub index: usize,
    pub post_id: String,
}

impl ExternalLaunch {
    pub fn failure_message(&self) -> &'static str {
        match self.kind {
            LaunchKind::Preview => "Failed to preview the post",
            LaunchKind::Browser => "Failed to open the post",
        }
    }

    /// Run the child with inherited stdio and wait for it. Returns whether
    /// it exited with status 0.
    pub async fn run(&self) -> Result<bool, PreviewError> {
        tracing::info!(program = %self.program, kind = ?self.kind, "Launching external viewer");
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .status()
            .await
            .map_err(|source| PreviewError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            tracing::warn!(program = %self.program, %status, "External viewer failed");
        }
        Ok(status.success())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

pub struct PreviewPipeline {
    scratch: PathBuf,
    renderer: CommandTemplate,
    viewer: CommandTemplate,
    browser: CommandTemplate,
    timeout: Duration,
}

impl PreviewPipeline {
    /// `text_browser` is the resolved browser command (config or $BROWSER).
    /// Creates `tmp_dir` if needed.
    pub fn new(tmp_dir: &Path, config: &Config, text_browser: &str) -> Result<Self, PreviewError> {
        std::fs::create_dir_all(tmp_dir)?;
        Ok(Self {
            scratch: tmp_dir.join(SCRATCH_FILE_NAME),
            renderer: CommandTemplate::parse(&config.preview_renderer, "preview renderer")?,
            viewer: CommandTemplate::parse(&config.plain_text_viewer, "plain-text viewer")?,
            browser: CommandTemplate::parse(text_browser, "text browser")?,
            timeout: Duration::from_secs(config.render_timeout_secs.max(1)),
        })
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch
    }

    /// Overwrite the scratch file with `content`.
    pub async fn write_scratch(&self, content: &str) -> Result<(), PreviewError> {
        tokio::fs::write(&self.scratch, content).await?;
        Ok(())
    }

    /// Remove the scratch file. A file that is already gone is not an error.
    pub async fn remove_scratch(&self) {
        match tokio::fs::remove_file(&self.scratch).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.scratch.display(), error = %e, "Failed to remove scratch file");
            }
        }
    }

    /// Write `content` to the scratch file and render it `cols` wide.
    ///
    /// Returns the renderer's full stdout with control sequences removed.
    /// A renderer that prints nothing yields an empty string. The child is
    /// killed if it outlives the configured timeout.
    pub async fn render(&self, content: &str, cols: u16) -> Result<String, PreviewError> {
        self.write_scratch(content).await?;

        let file = self.scratch.to_string_lossy();
        let args = self.renderer.expand("{file}", &file, cols);
        let program = self.renderer.program();
        tracing::debug!(%program, cols, "Rendering preview");

        let child = tokio::process::Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PreviewError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| PreviewError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            tracing::warn!(%program, status = %output.status, "Preview renderer exited with failure");
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(strip_control_chars(&text).into_owned())
    }

    /// Full-screen plain-text view of `detail`, written to the scratch file.
    pub async fn preview_launch(
        &self,
        detail: &PostDetail,
        index: usize,
    ) -> Result<ExternalLaunch, PreviewError> {
        self.write_scratch(&detail.content).await?;
        let file = self.scratch.to_string_lossy();
        Ok(ExternalLaunch {
            kind: LaunchKind::Preview,
            program: self.viewer.program().to_string(),
            args: self.viewer.expand("{file}", &file, 0),
            index,
            post_id: detail.id.clone(),
        })
    }

    /// Text browser pointed at the post's URL.
    pub fn browser_launch(&self, detail: &PostDetail, index: usize) -> ExternalLaunch {
        ExternalLaunch {
            kind: LaunchKind::Browser,
            program: self.browser.program().to_string(),
            args: self.browser.expand("{url}", &detail.origin_url, 0),
            index,
            post_id: detail.id.clone(),
        }
    }
}
