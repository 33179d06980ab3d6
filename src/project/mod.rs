//! Workspace-facing collaborators: the file-system boundary, editor
//! settings and the workspace scan.

mod config;
mod fs;
mod workspace_loader;

pub use config::{
    CompletionSettings, ConfigError, DiagnosticSettings, DialectSettings, EditorSettings, LintLevel, LintSettings,
    MixinStyle, Settings, WorkspaceSettings,
};
pub use fs::{FileStat, FileSystem, FileType, FsError, MemoryFileSystem, OsFileSystem};
pub use workspace_loader::{LoadError, LoadSummary, WorkspaceLoader};
