//! Unit tests for CLI argument parsing
#[cfg(test)]
mod tests {
	use media_ingest::cli::args::{parse_args, Command};

	fn make_args(raw: &[&str]) -> Vec<String> {
		raw.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn parse_scan_with_all_options() {
		let argv = make_args(&[
			"mingest",
			"scan",
			"/tmp/photos",
			"--sorted",
			"--json",
			"--snapshot",
			"out.parquet",
			"--config",
			"mingest.json",
			"--quiet",
		]);

		let parsed = parse_args(&argv).expect("parse scan args");
		let Command::Scan(scan) = parsed.command else {
			panic!("expected scan command");
		};

		assert_eq!(scan.path, "/tmp/photos");
		assert!(scan.sorted);
		assert!(scan.json);
		assert!(scan.quiet);
		assert_eq!(scan.snapshot.as_deref(), Some("out.parquet"));
		assert_eq!(scan.config.as_deref(), Some("mingest.json"));
	}

	#[test]
	fn parse_scan_defaults() {
		let argv = make_args(&["mingest", "scan", "/tmp/photos"]);

		let Command::Scan(scan) = parse_args(&argv).unwrap().command else {
			panic!("expected scan command");
		};

		assert!(!scan.sorted);
		assert!(!scan.json);
		assert!(scan.snapshot.is_none());
	}

	#[test]
	fn parse_view_with_json() {
		let argv = make_args(&["mingest", "view", "photos.parquet", "--json"]);

		let Command::View(view) = parse_args(&argv).unwrap().command else {
			panic!("expected view command");
		};

		assert_eq!(view.from_snapshot, "photos.parquet");
		assert!(view.json);
	}

	#[test]
	fn parse_ingest_flags() {
		let argv = make_args(&[
			"mingest",
			"ingest",
			"/tmp/photos",
			"--catalog",
			"catalog.parquet",
			"--upload",
			"--full-sync",
		]);

		let Command::Ingest(ingest) = parse_args(&argv).unwrap().command else {
			panic!("expected ingest command");
		};

		assert_eq!(ingest.path, "/tmp/photos");
		assert_eq!(ingest.catalog.as_deref(), Some("catalog.parquet"));
		assert!(ingest.upload);
		assert!(ingest.full_sync);
		assert!(ingest.config.is_none());
	}

	#[test]
	fn missing_option_value_is_reported() {
		let argv = make_args(&["mingest", "scan", "/tmp/photos", "--snapshot"]);
		let err = parse_args(&argv).unwrap_err();
		assert!(err.contains("--snapshot requires"), "{err}");
	}

	#[test]
	fn missing_directory_is_reported() {
		let argv = make_args(&["mingest", "ingest", "--upload"]);
		let err = parse_args(&argv).unwrap_err();
		assert!(err.contains("DIR"), "{err}");
	}

	#[test]
	fn unknown_command_and_options_are_rejected() {
		assert!(parse_args(&make_args(&["mingest", "upload"])).is_err());
		assert!(parse_args(&make_args(&["mingest", "view", "a.parquet", "--top", "3"])).is_err());
		assert!(parse_args(&make_args(&["mingest", "scan", "a", "b"])).is_err());
		assert!(parse_args(&make_args(&["mingest"])).is_err());
	}
}
