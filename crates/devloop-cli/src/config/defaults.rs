use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_site_dir() -> PathBuf {
    PathBuf::from("demo")
}

pub fn default_entry_page() -> String {
    "index.html".to_string()
}

pub fn default_styles_dir() -> PathBuf {
    PathBuf::from("demo/css")
}

pub fn default_markup_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

pub fn default_style_extensions() -> Vec<String> {
    vec!["css".to_string()]
}

pub fn default_native_command() -> String {
    "wasm-pack".to_string()
}

pub fn default_native_crate_dir() -> PathBuf {
    PathBuf::from("demo/wasm")
}

pub fn default_native_target() -> String {
    "web".to_string()
}

/// wasm-pack resolves `--out-dir` against the crate directory.
pub fn default_native_out_dir() -> PathBuf {
    PathBuf::from("../pkg")
}

pub fn default_native_artifact() -> PathBuf {
    PathBuf::from("demo/pkg/tess2_wasm_bg.wasm")
}

pub fn default_native_sources() -> Vec<PathBuf> {
    vec![PathBuf::from("src"), PathBuf::from("demo/wasm/src")]
}

pub fn default_native_extensions() -> Vec<String> {
    vec!["rs".to_string()]
}

pub fn default_script_command() -> String {
    "esbuild".to_string()
}

pub fn default_script_entry() -> PathBuf {
    PathBuf::from("demo/src/main.ts")
}

pub fn default_script_out_dir() -> PathBuf {
    PathBuf::from("demo/dist")
}

pub fn default_script_sources() -> PathBuf {
    PathBuf::from("demo/src")
}

pub fn default_script_extensions() -> Vec<String> {
    vec!["ts".to_string(), "js".to_string()]
}

pub fn default_watch_enabled() -> bool {
    true
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_keep_alive_secs() -> u64 {
    30
}
