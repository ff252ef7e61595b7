use pnsynth::engine::config::SearchConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub show_tree: bool,
    pub core_config: SearchConfig,
}
