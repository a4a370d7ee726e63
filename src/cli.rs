//! Minimal CLI: schema files → `.d.ts` declarations
use std::path::{Path, PathBuf};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use json_tsd::{Options, path_de};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile JSON Schema documents into TypeScript declarations
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile each input into its own declaration file
    Compile(CompileOut),
    /// only run the structural checks and print diagnostics
    Validate(ValidateOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OptionSettings {
    /// JSON file with compile options (camelCase keys); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// text emitted above the declarations
    #[arg(long)]
    banner: Option<String>,

    /// use `any` instead of `unknown` for unconstrained positions
    #[arg(long)]
    any: bool,

    /// object schemas without `additionalProperties` accept extra keys
    #[arg(long)]
    additional_properties: bool,

    /// only declare the root record, not records it references
    #[arg(long)]
    no_declare_external: bool,

    /// emit `const enum` declarations
    #[arg(long)]
    const_enums: bool,

    /// largest maxItems - minItems span kept as a bounded tuple (-1: no limit)
    #[arg(long, allow_hyphen_values = true)]
    max_items: Option<i64>,

    /// drop minItems / maxItems before compiling
    #[arg(long)]
    ignore_min_and_max_items: bool,

    /// trailing space after index-signature value types
    #[arg(long)]
    strict_index_signatures: bool,

    /// also declare `$defs` entries nothing references
    #[arg(long)]
    unreachable_definitions: bool,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    option_settings: OptionSettings,

    /// root declaration name (defaults to each file's stem)
    #[arg(long)]
    name: Option<String>,

    /// directory for `<stem>.d.ts` files (stdout if omitted)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl OptionSettings {
    fn load(&self) -> anyhow::Result<Options> {
        let mut options = match self.config.as_ref() {
            Some(path) => path_de::read_json::<Options>(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Options::default(),
        };
        if let Some(banner) = self.banner.as_ref() {
            options.banner_comment = banner.clone();
        }
        options.unknown_any &= !self.any;
        options.additional_properties |= self.additional_properties;
        options.declare_externally_referenced &= !self.no_declare_external;
        options.enable_const_enums |= self.const_enums;
        options.ignore_min_and_max_items |= self.ignore_min_and_max_items;
        options.strict_index_signatures |= self.strict_index_signatures;
        options.unreachable_definitions |= self.unreachable_definitions;
        if let Some(max_items) = self.max_items {
            options.max_items = max_items;
        }
        Ok(options)
    }
}

impl CompileOut {
    fn compile_one(&self, path: &Path, options: &Options) -> anyhow::Result<String> {
        match self.name.as_deref() {
            None => json_tsd::compile_from_file(path, options).map_err(Into::into),
            Some(name) => {
                let schema: Value = path_de::read_json(path)?;
                Ok(json_tsd::compile(&schema, Some(name), options)?)
            }
        }
    }

    fn run(&self) -> anyhow::Result<()> {
        let options = self.option_settings.load()?;
        let source_paths = resolve_file_path_patterns(&self.input_settings.input)
            .context("failed to resolve input file paths")?;

        // each input is compiled independently, with its own compile context
        let results: Vec<(&PathBuf, anyhow::Result<String>)> = source_paths
            .par_iter()
            .map(|path| (path, self.compile_one(path, &options)))
            .collect();

        let mut failures = 0usize;
        for (source_path, result) in results {
            let declarations = match result {
                Ok(x) => x,
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {error:#}", "error".red().bold(), source_path.display());
                    continue;
                }
            };
            match self.out_dir.as_ref() {
                Some(out_dir) => {
                    std::fs::create_dir_all(out_dir)
                        .with_context(|| format!("failed to create {}", out_dir.display()))?;
                    let stem = source_path.file_stem().unwrap_or(source_path.as_os_str());
                    let out = out_dir.join(format!("{}.d.ts", stem.to_string_lossy()));
                    std::fs::write(&out, &declarations)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    eprintln!("{} {}", "wrote".green(), out.display());
                }
                None => print!("{declarations}"),
            }
        }
        if failures > 0 {
            bail!("{failures} of {} input(s) failed to compile", source_paths.len());
        }
        Ok(())
    }
}

impl ValidateOut {
    fn run(&self) -> anyhow::Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input_settings.input)
            .context("failed to resolve input file paths")?;
        let mut failures = 0usize;
        for source_path in &source_paths {
            let schema: Value = path_de::read_json(source_path)?;
            let label = source_path.to_string_lossy();
            let diagnostics = json_tsd::validate_document(&schema, &label);
            if diagnostics.is_empty() {
                eprintln!("{} {label}", "ok".green());
                continue;
            }
            failures += 1;
            for diagnostic in diagnostics {
                eprintln!("{} {diagnostic}", "invalid".red().bold());
            }
        }
        if failures > 0 {
            bail!("{failures} of {} input(s) failed validation", source_paths.len());
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "json_tsd=debug,warn",
            _ => "json_tsd=trace,debug",
        }
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Compile(target) => target.run(),
            Command::Validate(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_defaults() {
        let cli = CommandLineInterface::try_parse_from([
            "json-tsd", "compile", "-i", "a.json", "--any", "--const-enums", "--max-items", "-1",
        ])
        .unwrap();
        let Command::Compile(target) = &cli.cmd else { panic!() };
        let options = target.option_settings.load().unwrap();
        assert!(!options.unknown_any);
        assert!(options.enable_const_enums);
        assert_eq!(options.max_items, -1);
        assert!(options.declare_externally_referenced);
    }

    #[test]
    fn globs_expand_and_literals_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let paths = resolve_file_path_patterns([pattern.as_str(), "literal.json"]).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], PathBuf::from("literal.json"));

        let missing = format!("{}/*.yaml", dir.path().display());
        assert!(resolve_file_path_patterns([missing.as_str()]).is_err());
    }

    #[test]
    fn compile_writes_one_file_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pet.json");
        std::fs::write(&input, r#"{"properties": {"name": {"type": "string"}}, "required": ["name"]}"#).unwrap();
        let out_dir = dir.path().join("out");
        let cli = CommandLineInterface::try_parse_from([
            "json-tsd".to_string(),
            "compile".into(),
            "-i".into(),
            input.display().to_string(),
            "--out-dir".into(),
            out_dir.display().to_string(),
        ])
        .unwrap();
        cli.run().unwrap();
        let written = std::fs::read_to_string(out_dir.join("pet.d.ts")).unwrap();
        assert_eq!(written, "export interface Pet {\nname: string\n}\n");
    }
}
