use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn doxtree_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("doxtree"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("DOXTREE_LOG");
	cmd
}

/// Write `files` below a fresh temporary directory.
pub fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	for (path, content) in files {
		let full = tmp.path().join(path);
		if let Some(parent) = full.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
		}
		std::fs::write(&full, content).unwrap_or_else(|e| panic!("write {path}: {e}"));
	}
	tmp
}
