use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use thiserror::Error;

use gdmarshal::defaults::write_default_parameter_values;
use gdmarshal::driver::{declared_default, SynthesizedMember};
use gdmarshal::native_struct::write_default_initializer;
use gdmarshal::{
    apply_default_value, resolve_native_structure, ConfigError, Driver, DriverError, GeneratorConfig, IndentedWriter,
    MemberDescriptor, NativeStructureError, Parameter, ResolveError, SynthesisReport,
};

mod logging;

use logging::LoggingError;

/// CLI-specific errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Library error (wraps all gdmarshal errors)
    #[error(transparent)]
    Library(#[from] gdmarshal::Error),

    /// Logging could not be set up
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Member descriptors could not be loaded
    #[error("{0:#}")]
    Input(#[from] anyhow::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Some members were skipped
    #[error("{failed} of {total} members could not be synthesized")]
    Incomplete { failed: usize, total: usize },
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::Library(e.into())
    }
}

impl From<DriverError> for AppError {
    fn from(e: DriverError) -> Self {
        Self::Library(e.into())
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        Self::Library(e.into())
    }
}

impl From<NativeStructureError> for AppError {
    fn from(e: NativeStructureError) -> Self {
        Self::Library(e.into())
    }
}

impl From<gdmarshal::DefaultValueError> for AppError {
    fn from(e: gdmarshal::DefaultValueError) -> Self {
        Self::Library(e.into())
    }
}

#[derive(Parser)]
#[command(name = "gdmarshal")]
#[command(about = "Synthesize C# marshalling code for Godot engine members")]
struct Cli {
    /// Generator configuration file (TOML)
    #[arg(short, long, global = true, env = "GDMARSHAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize call bodies for a JSON array of member descriptors
    Synthesize {
        /// Path to the member descriptors
        #[arg(short, long)]
        members: PathBuf,

        /// Emit a JSON report instead of C# text
        #[arg(long)]
        json: bool,
    },

    /// Show how an engine type name resolves
    Resolve {
        /// Engine type name, e.g. `Vector2`, `enum::Node.ProcessMode`
        engine_name: String,

        /// Engine type metadata, e.g. `uint8`
        #[arg(long)]
        meta: Option<String>,
    },

    /// Translate an engine default value literal
    DefaultValue {
        /// Engine type name of the parameter
        engine_name: String,

        /// Default value literal as the engine reports it
        literal: String,

        /// Engine type metadata
        #[arg(long)]
        meta: Option<String>,

        /// Parameter name used in the emitted statements
        #[arg(long, default_value = "value")]
        name: String,
    },

    /// Resolve a native structure format
    NativeStruct {
        /// Format string, e.g. `Vector2 position;int shape = -1`
        format: String,
    },
}

/// Format an error for display with colors (if terminal supports it)
fn format_error(err: &AppError) -> String {
    use std::io::IsTerminal;

    let use_colors = std::io::stderr().is_terminal();

    let (red, yellow, reset) = if use_colors {
        ("\x1b[0;31m", "\x1b[0;33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = format!("{}Error:{} {}\n", red, reset, err);

    if let Some(hint) = get_error_hint(err) {
        output.push_str(&format!("{}Hint:{} {}\n", yellow, reset, hint));
    }

    output
}

/// Get a helpful hint for common errors
fn get_error_hint(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Library(lib) if lib.is_resolve() => {
            Some("Engine classes and enums must be listed under [types] in the configuration file")
        }
        AppError::Library(lib) if lib.is_config() => {
            Some("Check the configuration against the [logging], [types] and [synthesis] sections")
        }
        AppError::Library(gdmarshal::Error::Driver(DriverError::Member { .. })) => {
            Some("Set synthesis.abort_on_error = false to skip failing members")
        }
        AppError::Input(_) => Some("Members are read as a JSON array of descriptors"),
        AppError::Incomplete { .. } => Some("The skipped members are logged as warnings"),
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprint!("{}", format_error(&err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    logging::init(&config.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    let driver = Driver::new(&config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Synthesize { members, json } => {
            let members = load_members(&members)?;
            let report = driver.synthesize(&members)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report_to_json(&report))?)?;
            } else {
                for member in &report.members {
                    write_member(&mut out, member)?;
                }
            }
            if !report.is_complete() {
                return Err(AppError::Incomplete {
                    failed: report.failures.len(),
                    total: members.len(),
                });
            }
            Ok(())
        }
        Commands::Resolve { engine_name, meta } => {
            let db = driver.db();
            let ty = db.resolve_by_engine_name(&engine_name, meta.as_deref())?;
            let unmanaged = db
                .resolve_unmanaged(&ty)
                .map(|u| u.full_name_with_global())
                .unwrap_or_else(|_| "-".to_string());
            writeln!(out, "managed:   {}", ty.full_name_with_global())?;
            writeln!(out, "unmanaged: {}", unmanaged)?;
            writeln!(out, "ptrcall:   {}", yes_no(db.ptr_marshaller(&ty).is_ok()))?;
            writeln!(out, "variant:   {}", yes_no(db.variant_marshaller(&ty).is_ok()))?;
            writeln!(out, "default:   {}", yes_no(db.default_parser(&ty).is_some()))?;
            Ok(())
        }
        Commands::DefaultValue {
            engine_name,
            literal,
            meta,
            name,
        } => {
            let db = driver.db();
            let ty = db.resolve_by_engine_name(&engine_name, meta.as_deref())?;
            let plan = apply_default_value(db, &ty, &literal)?;
            let declared = match &plan.declared_value {
                Some(value) => format!(
                    "{} {} = {}",
                    plan.parameter_type.full_name_with_global(),
                    name,
                    declared_default(&plan.parameter_type, value.clone())
                ),
                None => format!("{} {}", plan.parameter_type.full_name_with_global(), name),
            };
            writeln!(out, "{}", declared)?;
            if plan.needs_runtime_assignment {
                let parameter = Parameter::new(&name, plan.parameter_type).with_default(&literal);
                let mut writer = IndentedWriter::new();
                write_default_parameter_values(&mut writer, db, std::slice::from_ref(&parameter))?;
                write!(out, "{}", writer.as_str())?;
            }
            Ok(())
        }
        Commands::NativeStruct { format } => {
            let fields = resolve_native_structure(driver.db(), &format)?;
            for field in &fields {
                match &field.default {
                    Some(default) => writeln!(out, "{} {} = {};", field.ty.full_name_with_global(), field.name, default)?,
                    None => writeln!(out, "{} {};", field.ty.full_name_with_global(), field.name)?,
                }
            }
            let mut writer = IndentedWriter::new();
            write_default_initializer(&fields, &mut writer);
            writeln!(out)?;
            write!(out, "{}", writer.as_str())?;
            Ok(())
        }
    }
}

/// Read a JSON array of member descriptors.
fn load_members(path: &Path) -> anyhow::Result<Vec<MemberDescriptor>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read members from '{}'", path.display()))?;
    let members: Vec<MemberDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse members in '{}'", path.display()))?;
    tracing::info!(count = members.len(), path = %path.display(), "loaded member descriptors");
    Ok(members)
}

fn write_member(out: &mut impl Write, member: &SynthesizedMember) -> std::io::Result<()> {
    let parameters = member
        .parameters
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{} {} = {}", p.ty.full_name_with_global(), p.name, default),
            None => format!("{} {}", p.ty.full_name_with_global(), p.name),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let return_type = member
        .return_type
        .as_ref()
        .map(|t| t.full_name_with_global())
        .unwrap_or_else(|| "void".to_string());

    let mut modifiers = Vec::new();
    if member.is_static {
        modifiers.push("static");
    }
    if member.requires_unsafe {
        modifiers.push("unsafe");
    }

    write!(out, "// ")?;
    if !modifiers.is_empty() {
        write!(out, "{} ", modifiers.join(" "))?;
    }
    write!(out, "{} ", return_type)?;
    if let Some(class) = &member.class {
        write!(out, "{}.", class)?;
    }
    writeln!(out, "{}({})", member.name, parameters)?;
    write!(out, "{}", member.body)?;
    writeln!(out)
}

fn report_to_json(report: &SynthesisReport) -> serde_json::Value {
    let members: Vec<_> = report
        .members
        .iter()
        .map(|m| {
            let parameters: Vec<_> = m
                .parameters
                .iter()
                .map(|p| json!({ "name": p.name, "type": p.ty.full_name_with_global(), "default": p.default }))
                .collect();
            let return_type = m.return_type.as_ref().map(|t| t.full_name_with_global());
            json!({
                "name": m.name,
                "class": m.class,
                "static": m.is_static,
                "unsafe": m.requires_unsafe,
                "return_type": return_type,
                "parameters": parameters,
                "guarded": m.outline.guarded,
                "freed": m.outline.freed,
                "body": m.body,
            })
        })
        .collect();
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| json!({ "member": f.member, "error": f.error.to_string() }))
        .collect();
    json!({ "members": members, "failures": failures })
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
