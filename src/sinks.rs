use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use logdeck_logs::{FocusSink, NavigationSink, ObjectRef};
use logdeck_tui::Action;

/// Opens source locations with an external command, or reports them as a notice
pub struct CommandNavigator {
    /// Command template with `{path}` and `{line}` placeholders
    template: Option<String>,

    /// Relative paths are joined onto this
    project_root: Option<PathBuf>,

    notices: UnboundedSender<Action>,
}

impl CommandNavigator {
    pub fn new(
        template: Option<String>,
        project_root: Option<PathBuf>,
        notices: UnboundedSender<Action>,
    ) -> Self {
        Self {
            template,
            project_root,
            notices,
        }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn notice(&self, msg: String) {
        let _ = self.notices.send(Action::ShowNotice(msg));
    }
}

/// Fill in a command template, split on whitespace
fn expand_template(template: &str, path: &Path, line: u32) -> Vec<String> {
    let path = path.display().to_string();
    template
        .split_whitespace()
        .map(|part| {
            part.replace("{path}", &path)
                .replace("{line}", &line.to_string())
        })
        .collect()
}

impl NavigationSink for CommandNavigator {
    fn open_at_location(&self, path: &str, line: u32) {
        let resolved = self.resolve_path(path);

        let Some(template) = &self.template else {
            self.notice(format!("{}:{}", resolved.display(), line));
            return;
        };

        let argv = expand_template(template, &resolved, line);
        let Some((program, args)) = argv.split_first() else {
            self.notice("open_command is empty".to_string());
            return;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(mut child) => {
                // Reap the editor so it does not linger as a zombie
                let program = program.clone();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            tracing::warn!(program = %program, %status, "open command failed");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(program = %program, error = %e, "failed to wait for open command");
                        }
                    }
                });
                tracing::info!(path = %resolved.display(), line, "opened source location");
                self.notice(format!("Opened {}:{}", resolved.display(), line));
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "failed to run open command");
                self.notice(format!("Failed to run {}: {}", program, e));
            }
        }
    }
}

/// Reports the context handle of a selected record
pub struct NoticeFocus {
    notices: UnboundedSender<Action>,
}

impl NoticeFocus {
    pub fn new(notices: UnboundedSender<Action>) -> Self {
        Self { notices }
    }
}

impl FocusSink for NoticeFocus {
    fn focus_object(&self, context: ObjectRef) {
        tracing::info!(context = context.0, "focus object");
        let _ = self
            .notices
            .send(Action::ShowNotice(format!("Context object #{}", context.0)));
    }
}
