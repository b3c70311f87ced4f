//! Ders Planlayıcı Android CLI
//!
//! Release signing, build configuration and Gradle builds for the Android app.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dersplan_android::build_config::{render_gradle_kts, validate_app_config};
use dersplan_android::gradle::{self, Artifact, BuildType};
use dersplan_android::key_properties::{remove_key_properties, write_key_properties};
use dersplan_android::keystore::inspect_keystore;
use dersplan_android::signing::{self, load_signing_credentials, preflight_release, SigningCredentials};
use dersplan_android::vcs::check_ignored;
use dersplan_cli::output::{self, format_count, Status};
use dersplan_cli::progress;
use dersplan_core::config::{AndroidConfig, Config};
use dersplan_core::error::{exit_codes, Error, ErrorCode};
use dersplan_core::properties::MalformedLinePolicy;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dersplan-android")]
#[command(about = "Release signing and build tools for the Ders Planlayıcı Android app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Android project directory
    #[arg(long, global = true, env = "DERSPLAN_ANDROID_DIR")]
    project_dir: Option<PathBuf>,

    /// Signing credentials file, relative to the Android project directory
    #[arg(long, global = true, env = "DERSPLAN_KEY_PROPERTIES")]
    key_properties: Option<String>,

    /// Fail on malformed lines in the credentials file instead of skipping them
    #[arg(long, global = true)]
    strict_properties: bool,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage release signing credentials
    Signing {
        #[command(subcommand)]
        action: SigningAction,
    },

    /// Inspect the Android build configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Build the app with Gradle
    Build {
        /// Build the release variant
        #[arg(long)]
        release: bool,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
    },

    /// Diagnose environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SigningAction {
    /// Show the loaded credentials with passwords masked
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that release signing can be resolved
    Check,
    /// Write key.properties
    Init {
        /// Key alias
        #[arg(long)]
        alias: String,
        /// Key store path (relative paths resolve against the app module)
        #[arg(long)]
        store_file: String,
        /// Key store password
        #[arg(long, env = "DERSPLAN_STORE_PASSWORD", hide_env_values = true)]
        store_password: Option<String>,
        /// Key password (defaults to the store password)
        #[arg(long, env = "DERSPLAN_KEY_PASSWORD", hide_env_values = true)]
        key_password: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Delete key.properties
    Remove,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Validate the application build values
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Toml,
    Json,
    Gradle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(report(&e)),
    };
    apply_overrides(&mut config.schema.android, &cli);

    let android = &config.schema.android;
    let exit_code = match cli.command {
        Commands::Signing { action } => match action {
            SigningAction::Show { json } => run_signing_show(android, json),
            SigningAction::Check => run_signing_check(android, cli.quiet),
            SigningAction::Init {
                alias,
                store_file,
                store_password,
                key_password,
                force,
            } => run_signing_init(android, alias, store_file, store_password, key_password, force),
            SigningAction::Remove => run_signing_remove(android),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => run_config_show(&config, format),
            ConfigAction::Validate => run_config_validate(&config, cli.quiet),
        },
        Commands::Build { release, bundle, clean } => {
            run_build(android, release, bundle, clean, cli.quiet)
        }
        Commands::Doctor { json } => run_doctor(android, json),
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn apply_overrides(android: &mut AndroidConfig, cli: &Cli) {
    if let Some(dir) = &cli.project_dir {
        android.project_dir = dir.clone();
    }
    if let Some(file) = &cli.key_properties {
        android.key_properties = file.clone();
    }
    if cli.strict_properties {
        android.malformed_lines = MalformedLinePolicy::Fail;
    }
}

/// Print an error with its context and suggestion, returning the exit code
fn report(err: &Error) -> i32 {
    Status::error(&format!("[{}] {}", err.code, err.message));
    if let Some(context) = &err.context {
        Status::hint(context);
    }
    if let Some(suggestion) = &err.suggestion {
        Status::hint(suggestion);
    }
    err.code.exit_code()
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            exit_codes::SUCCESS
        }
        Err(e) => report(&Error::from(e)),
    }
}

#[derive(Serialize)]
struct SigningReport {
    path: PathBuf,
    file_present: bool,
    #[serde(flatten)]
    credentials: signing::CredentialsSummary,
}

fn run_signing_show(android: &AndroidConfig, json: bool) -> i32 {
    let path = android.key_properties_path();
    let credentials = match load_signing_credentials(&path, android.malformed_lines) {
        Ok(credentials) => credentials,
        Err(e) => return report(&e),
    };

    let summary = credentials.summary();
    if json {
        return print_json(&SigningReport {
            path: path.clone(),
            file_present: path.is_file(),
            credentials: summary,
        });
    }

    Status::header(&format!("Signing credentials ({})", path.display()));
    if !path.is_file() {
        Status::warning("Credentials file not found; release signing is unavailable");
    }
    output::field(signing::KEY_ALIAS, summary.key_alias.as_deref());
    output::field(signing::KEY_PASSWORD, summary.key_password.as_deref());
    output::field(signing::STORE_FILE, summary.store_file.as_deref());
    output::field(signing::STORE_PASSWORD, summary.store_password.as_deref());
    println!();

    if summary.complete {
        Status::success("Credentials complete");
    } else {
        Status::warning(&format!("Missing: {}", summary.missing.join(", ")));
    }
    exit_codes::SUCCESS
}

fn run_signing_check(android: &AndroidConfig, quiet: bool) -> i32 {
    let credentials =
        match load_signing_credentials(&android.key_properties_path(), android.malformed_lines) {
            Ok(credentials) => credentials,
            Err(e) => return report(&e),
        };

    let config = match preflight_release(&credentials, &android.app_module_dir()) {
        Ok(config) => config,
        Err(e) => return report(&e),
    };

    let keystore = match inspect_keystore(&config.store_file) {
        Ok(info) => info,
        Err(e) => return report(&e),
    };

    if !quiet {
        Status::success(&format!(
            "Release signing config '{}' resolved (alias {})",
            config.name, config.key_alias
        ));
        Status::info(&format!(
            "Key store: {} ({}, {} bytes)",
            keystore.path.display(),
            keystore.keystore_type,
            keystore.size_bytes
        ));
    }

    gitignore_exit_code(android, quiet)
}

fn gitignore_exit_code(android: &AndroidConfig, quiet: bool) -> i32 {
    match check_ignored(&android.project_dir, &android.key_properties) {
        Ok(status) if status.is_ignored() => {
            if !quiet {
                Status::success(&format!(
                    "{} is ignored by {}",
                    android.key_properties,
                    status.source().unwrap_or_default()
                ));
            }
            exit_codes::SUCCESS
        }
        Ok(_) if android.require_gitignore => report(
            &Error::new(
                ErrorCode::CredentialsNotIgnored,
                format!("{} is not excluded by .gitignore", android.key_properties),
            )
            .with_suggestion(format!(
                "Add '{}' to {}",
                android.key_properties,
                android.project_dir.join(".gitignore").display()
            )),
        ),
        Ok(_) => {
            Status::warning(&format!("{} is not excluded by .gitignore", android.key_properties));
            exit_codes::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_signing_init(
    android: &AndroidConfig,
    alias: String,
    store_file: String,
    store_password: Option<String>,
    key_password: Option<String>,
    force: bool,
) -> i32 {
    let Some(store_password) = store_password else {
        return report(
            &Error::new(ErrorCode::InvalidInput, "Key store password is required")
                .with_suggestion("Pass --store-password or set DERSPLAN_STORE_PASSWORD"),
        );
    };
    let key_password = key_password.unwrap_or_else(|| store_password.clone());

    let credentials = SigningCredentials::new(alias, key_password, store_file, store_password);
    let path = android.key_properties_path();

    if let Err(e) = write_key_properties(&path, &credentials, force) {
        return report(&e);
    }
    Status::success(&format!("Wrote {}", path.display()));

    if let Err(e) = preflight_release(&credentials, &android.app_module_dir()) {
        Status::warning(&e.message);
    }
    if check_ignored(&android.project_dir, &android.key_properties).is_ok_and(|s| !s.is_ignored()) {
        Status::warning(&format!(
            "{} is not excluded by .gitignore; do not commit it",
            android.key_properties
        ));
    }
    exit_codes::SUCCESS
}

fn run_signing_remove(android: &AndroidConfig) -> i32 {
    let path = android.key_properties_path();
    match remove_key_properties(&path) {
        Ok(true) => {
            Status::success(&format!("Removed {}", path.display()));
            exit_codes::SUCCESS
        }
        Ok(false) => {
            Status::info(&format!("{} does not exist", path.display()));
            exit_codes::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_config_show(config: &Config, format: ConfigFormat) -> i32 {
    match format {
        ConfigFormat::Toml => match config.to_toml() {
            Ok(text) => {
                print!("{}", text);
                exit_codes::SUCCESS
            }
            Err(e) => report(&e),
        },
        ConfigFormat::Json => print_json(&config.schema),
        ConfigFormat::Gradle => {
            print!("{}", render_gradle_kts(&config.schema.android, &config.schema.app));
            exit_codes::SUCCESS
        }
    }
}

fn run_config_validate(config: &Config, quiet: bool) -> i32 {
    let result = validate_app_config(&config.schema.app);

    for warning in result.warnings() {
        Status::warning(&warning.to_string());
    }
    for error in result.errors() {
        Status::error(&error.to_string());
    }

    if result.is_valid() {
        if !quiet {
            Status::success(&format!(
                "Build configuration valid ({})",
                format_count(result.warnings().len(), "warning", "warnings")
            ));
        }
        exit_codes::SUCCESS
    } else {
        Status::error(&format!(
            "Build configuration invalid ({})",
            format_count(result.errors().len(), "error", "errors")
        ));
        exit_codes::VALIDATION_ERROR
    }
}

fn run_build(android: &AndroidConfig, release: bool, bundle: bool, clean: bool, quiet: bool) -> i32 {
    let build_type = if release { BuildType::Release } else { BuildType::Debug };
    let artifact = if bundle { Artifact::Bundle } else { Artifact::Apk };

    if clean {
        let pb = if quiet { progress::hidden() } else { progress::spinner("Cleaning...") };
        match gradle::clean(&android.project_dir) {
            Ok(result) if result.success => progress::finish_success(&pb, "Cleaned"),
            Ok(result) => {
                progress::finish_error(&pb, "Clean failed");
                eprintln!("{}", result.stderr);
                return exit_codes::FAILURE;
            }
            Err(e) => {
                progress::finish_error(&pb, "Clean failed");
                return report(&e);
            }
        }
    }

    let pb = if quiet {
        progress::hidden()
    } else {
        progress::spinner(&format!("Building {} {}...", build_type, artifact))
    };

    match gradle::build(android, build_type, artifact) {
        Ok(result) if result.success => {
            progress::finish_success(&pb, "Build succeeded");
            exit_codes::SUCCESS
        }
        Ok(result) => {
            progress::finish_error(&pb, "Build failed");
            eprintln!("{}", result.combined_output());
            exit_codes::FAILURE
        }
        Err(e) => {
            progress::finish_error(&pb, "Build failed");
            report(&e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckLevel {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    level: CheckLevel,
    message: String,
}

impl DoctorCheck {
    fn new(name: &'static str, level: CheckLevel, message: impl Into<String>) -> Self {
        Self {
            name,
            level,
            message: message.into(),
        }
    }
}

fn doctor_checks(android: &AndroidConfig) -> Vec<DoctorCheck> {
    use dersplan_core::process::which_command;

    let mut checks = Vec::new();

    checks.push(if gradle::has_wrapper(&android.project_dir) {
        DoctorCheck::new("gradle-wrapper", CheckLevel::Ok, "found")
    } else {
        DoctorCheck::new(
            "gradle-wrapper",
            CheckLevel::Error,
            format!("not found in {}", android.project_dir.display()),
        )
    });

    for tool in ["java", "keytool", "flutter"] {
        checks.push(match which_command(tool) {
            Some(path) => DoctorCheck::new(tool, CheckLevel::Ok, path.display().to_string()),
            None => DoctorCheck::new(tool, CheckLevel::Warn, "not found in PATH"),
        });
    }

    let path = android.key_properties_path();
    match load_signing_credentials(&path, android.malformed_lines) {
        Ok(credentials) if credentials.is_empty() => checks.push(DoctorCheck::new(
            "signing",
            CheckLevel::Warn,
            format!("{} absent; release builds cannot be signed", path.display()),
        )),
        Ok(credentials) => match preflight_release(&credentials, &android.app_module_dir()) {
            Ok(config) => checks.push(DoctorCheck::new(
                "signing",
                CheckLevel::Ok,
                format!("release config resolved ({})", config.store_file.display()),
            )),
            Err(e) => checks.push(DoctorCheck::new("signing", CheckLevel::Error, e.message)),
        },
        Err(e) => checks.push(DoctorCheck::new("signing", CheckLevel::Error, e.message)),
    }

    checks.push(match check_ignored(&android.project_dir, &android.key_properties) {
        Ok(status) if status.is_ignored() => DoctorCheck::new(
            "gitignore",
            CheckLevel::Ok,
            format!("ignored by {}", status.source().unwrap_or_default()),
        ),
        Ok(_) => DoctorCheck::new(
            "gitignore",
            if android.require_gitignore { CheckLevel::Error } else { CheckLevel::Warn },
            format!("{} is not excluded by .gitignore", android.key_properties),
        ),
        Err(e) => DoctorCheck::new("gitignore", CheckLevel::Error, e.message),
    });

    checks
}

fn run_doctor(android: &AndroidConfig, json: bool) -> i32 {
    let checks = doctor_checks(android);
    let failed = checks.iter().any(|c| c.level == CheckLevel::Error);

    if json {
        let code = print_json(&checks);
        return if failed { exit_codes::FAILURE } else { code };
    }

    Status::header("Environment Check");
    for check in &checks {
        let line = format!("{}: {}", check.name, check.message);
        match check.level {
            CheckLevel::Ok => Status::success(&line),
            CheckLevel::Warn => Status::warning(&line),
            CheckLevel::Error => Status::error(&line),
        }
    }

    if failed {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    }
}
