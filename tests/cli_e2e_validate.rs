//! End-to-end tests for the `validate` command.
//!
//! These tests invoke the actual CLI binary and validate the behavior of the
//! `validate` subcommand from a user's perspective.

mod common;

use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_prints_resolved_mapping() {
    let fixture = TemplateFixture::new().with_minimal_template();

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "src/project_pkg/version.py -> IfMissing",
        ))
        .stdout(predicate::str::contains("<default> -> Overwrite"))
        .stdout(predicate::str::contains("Context reader: RollupConf"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_with_context() {
    let fixture = TemplateFixture::new().with_minimal_template();

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .args(["--context", "package=other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/other/version.py -> IfMissing"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_unknown_strategy_suggests_name() {
    let fixture = TemplateFixture::new()
        .with_template_file(
            "rollup.yaml",
            "default_strategy: template_rollup.strategies.IfMisssing\n",
        )
        .with_template_file("cookiecutter.json", templates::COOKIECUTTER_JSON);

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'IfMissing'?"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_rejects_abstract_strategy() {
    let fixture = TemplateFixture::new()
        .with_template_file("rollup.yaml", "default_strategy: strategies.Strategy\n")
        .with_template_file("cookiecutter.json", templates::COOKIECUTTER_JSON);

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_unknown_config_key() {
    let fixture = TemplateFixture::new()
        .with_template_file(
            "rollup.yaml",
            "default_strategy:\n  strategy: strategies.SortedUniqueLines\n  config:\n    coment_pattern: '^#'\n",
        )
        .with_template_file("cookiecutter.json", templates::COOKIECUTTER_JSON);

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("coment_pattern"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_missing_config() {
    let fixture = TemplateFixture::new();

    fixture
        .command()
        .arg("validate")
        .arg(fixture.template_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template configuration not found"));
}
