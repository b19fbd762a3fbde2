mod common;

use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use mdref_cli::MdrefCli;
use mdref_core::AnyEmptyResult;
use mdref_core::RefOptions;
use similar_asserts::assert_eq;

#[test]
fn positional_input_and_output() -> AnyEmptyResult {
	let cli = MdrefCli::try_parse_from(["mdref", "docs", "site"])?;

	assert_eq!(cli.input, Some(PathBuf::from("docs")));
	assert_eq!(cli.output, Some(PathBuf::from("site")));
	assert!(!cli.no_check);

	Ok(())
}

#[test]
fn flags_override_config_values() -> AnyEmptyResult {
	let cli = MdrefCli::try_parse_from([
		"mdref",
		"--repo",
		"../service",
		"--head",
		"main",
		"--no-check",
	])?;
	let base = RefOptions {
		repository: Some(PathBuf::from("/from/config")),
		head: "develop".into(),
		exclude_patterns: vec!["drafts/".into()],
		..RefOptions::default()
	};
	let options = cli.apply_flags(base);

	assert_eq!(options.repository.as_deref(), Some(Path::new("../service")));
	assert_eq!(options.head, "main");
	assert!(!options.check_stale);
	assert_eq!(options.exclude_patterns, vec!["drafts/".to_string()]);

	Ok(())
}

#[test]
fn config_values_survive_without_flags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_doc(
		tmp.path(),
		".mdref.toml",
		"head = \"trunk\"\ncheck_stale = false\n",
	)?;

	let cli = MdrefCli::try_parse_from(["mdref"])?;
	let options = cli.resolve_options(tmp.path())?;

	assert_eq!(options.head, "trunk");
	assert!(!options.check_stale);
	assert_eq!(options.program, "git");

	Ok(())
}

#[test]
fn verbosity_selects_log_filter() -> AnyEmptyResult {
	let quiet = MdrefCli::try_parse_from(["mdref", "--quiet"])?;
	let verbose = MdrefCli::try_parse_from(["mdref", "-v"])?;
	let default = MdrefCli::try_parse_from(["mdref"])?;

	assert_eq!(quiet.log_filter(), "mdref=warn,mdref_core=warn");
	assert_eq!(verbose.log_filter(), "mdref=debug,mdref_core=debug");
	assert_eq!(default.log_filter(), "mdref=info,mdref_core=info");
	assert!(MdrefCli::try_parse_from(["mdref", "--quiet", "--verbose"]).is_err());

	Ok(())
}
